use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::game::settings::GameSettings;
use crate::ui::theme::Theme;

/// Rows on the start screen, top to bottom.
pub const ROW_DIFFICULTY: usize = 0;
pub const ROW_OPERATION: usize = 1;
pub const ROW_START: usize = 2;
pub const ROW_COUNT: usize = 3;

pub struct StartMenu<'a> {
    settings: &'a GameSettings,
    selected: usize,
    theme: &'a Theme,
}

impl<'a> StartMenu<'a> {
    pub fn new(settings: &'a GameSettings, selected: usize, theme: &'a Theme) -> Self {
        Self {
            settings,
            selected,
            theme,
        }
    }

    fn row(&self, idx: usize, label: &str, value: String, hint: &str) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let is_selected = idx == self.selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_style = Style::default()
            .fg(if is_selected {
                colors.accent()
            } else {
                colors.fg()
            })
            .add_modifier(if is_selected {
                Modifier::BOLD
            } else {
                Modifier::empty()
            });

        vec![
            Line::from(Span::styled(format!("{indicator}{label}"), label_style)),
            Line::from(vec![
                Span::styled(
                    format!("     < {value} >"),
                    Style::default().fg(if is_selected {
                        colors.warning()
                    } else {
                        colors.text_dim()
                    }),
                ),
                Span::styled(
                    format!("  {hint}"),
                    Style::default().fg(colors.text_dim()),
                ),
            ]),
            Line::from(""),
        ]
    }
}

impl Widget for StartMenu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "math dojo",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Two minutes of arithmetic. Earn XP, climb the belts.",
                Style::default().fg(colors.fg()),
            )),
            Line::from(""),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let mut lines = self.row(
            ROW_DIFFICULTY,
            "Difficulty",
            self.settings.difficulty.label().to_string(),
            self.settings.difficulty.description(),
        );
        lines.extend(self.row(
            ROW_OPERATION,
            "Operations",
            self.settings.operation.label().to_string(),
            "",
        ));

        let start_selected = self.selected == ROW_START;
        lines.push(Line::from(Span::styled(
            if start_selected {
                " > Start training"
            } else {
                "   Start training"
            },
            Style::default()
                .fg(if start_selected {
                    colors.success()
                } else {
                    colors.fg()
                })
                .add_modifier(if start_selected {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                }),
        )));

        Paragraph::new(lines).render(layout[1], buf);

        let footer = Paragraph::new(Line::from(Span::styled(
            " [Enter] Start  [\u{2190}/\u{2192}] Change  [l] Leaderboard  [q] Quit ",
            Style::default().fg(colors.text_dim()),
        )));
        footer.render(layout[2], buf);
    }
}
