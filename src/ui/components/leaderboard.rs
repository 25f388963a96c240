use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::api::GameResult;
use crate::ui::layout::format_clock;
use crate::ui::theme::Theme;

pub enum LeaderboardView<'a> {
    Loading,
    Loaded(&'a [GameResult]),
    Failed(&'a str),
}

pub struct Leaderboard<'a> {
    view: LeaderboardView<'a>,
    theme: &'a Theme,
}

impl<'a> Leaderboard<'a> {
    pub fn new(view: LeaderboardView<'a>, theme: &'a Theme) -> Self {
        Self { view, theme }
    }
}

impl Widget for Leaderboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Leaderboard ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(inner);

        match self.view {
            LeaderboardView::Loading => {
                Paragraph::new(Line::from(Span::styled(
                    "Fetching top rounds...",
                    Style::default().fg(colors.text_dim()),
                )))
                .alignment(Alignment::Center)
                .render(layout[0], buf);
            }
            LeaderboardView::Failed(message) => {
                let lines = vec![
                    Line::from(Span::styled(
                        "Could not fetch the leaderboard",
                        Style::default().fg(colors.error()),
                    )),
                    Line::from(Span::styled(
                        message.to_string(),
                        Style::default().fg(colors.text_dim()),
                    )),
                ];
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .render(layout[0], buf);
            }
            LeaderboardView::Loaded(rows) => {
                let mut lines = vec![
                    Line::from(Span::styled(
                        format!(
                            "  {:<4} {:>7} {:>10} {:>8} {:>8}",
                            "#", "Score", "Accuracy", "Time", "XP"
                        ),
                        Style::default()
                            .fg(colors.text_dim())
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                ];

                if rows.is_empty() {
                    lines.push(Line::from(Span::styled(
                        "  No rounds played yet.",
                        Style::default().fg(colors.text_dim()),
                    )));
                }

                for (i, row) in rows.iter().enumerate() {
                    let style = if i == 0 {
                        Style::default()
                            .fg(colors.warning())
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(colors.fg())
                    };
                    lines.push(Line::from(Span::styled(
                        format!(
                            "  {:<4} {:>7} {:>9.1}% {:>8} {:>8}",
                            i + 1,
                            row.score,
                            row.accuracy,
                            format_clock(row.time_taken),
                            row.xp_earned,
                        ),
                        style,
                    )));
                }

                Paragraph::new(lines).render(layout[0], buf);
            }
        }

        let footer = Paragraph::new(Line::from(Span::styled(
            " [r] Refresh  [Esc] Back ",
            Style::default().fg(colors.text_dim()),
        )));
        footer.render(layout[1], buf);
    }
}
