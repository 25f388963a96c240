use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::game::play::{Phase, PlayState};
use crate::ui::theme::Theme;

/// Main panel of the play screen: the current problem, the answer buffer,
/// and the transient correctness feedback.
pub struct PlayArea<'a> {
    play: &'a PlayState,
    theme: &'a Theme,
}

impl<'a> PlayArea<'a> {
    pub fn new(play: &'a PlayState, theme: &'a Theme) -> Self {
        Self { play, theme }
    }
}

impl Widget for PlayArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        match &self.play.phase {
            Phase::Loading => {
                let lines = vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        "Contacting the dojo...",
                        Style::default().fg(colors.text_dim()),
                    )),
                ];
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .render(inner, buf);
            }
            Phase::Failed(message) => {
                let lines = vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        "Could not reach the backend",
                        Style::default()
                            .fg(colors.error())
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        message.clone(),
                        Style::default().fg(colors.text_dim()),
                    )),
                    Line::from(""),
                    Line::from(Span::styled(
                        "[r] Retry  [Esc] Main menu",
                        Style::default().fg(colors.accent()),
                    )),
                ];
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .render(inner, buf);
            }
            Phase::Active | Phase::Finishing => {
                self.render_problem(inner, buf);
            }
        }
    }
}

impl PlayArea<'_> {
    fn render_problem(&self, inner: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(1),
            ])
            .split(inner);

        let problem = Paragraph::new(Line::from(Span::styled(
            format!("{} = ?", self.play.problem),
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        problem.render(layout[1], buf);

        // Answer buffer with a block cursor while input is accepted.
        let mut answer_spans = vec![Span::styled(
            self.play.answer.clone(),
            Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
        )];
        if self.play.accepts_input() {
            answer_spans.push(Span::styled(
                "\u{2588}",
                Style::default().fg(colors.accent()),
            ));
        }
        Paragraph::new(Line::from(answer_spans))
            .alignment(Alignment::Center)
            .render(layout[2], buf);

        let status_line = if let Some(fb) = &self.play.feedback {
            if fb.correct {
                Line::from(Span::styled(
                    "Correct!",
                    Style::default()
                        .fg(colors.success())
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                let answer_text = fb
                    .correct_answer
                    .map(|a| format!("The answer was {a}"))
                    .unwrap_or_else(|| "Not quite".to_string());
                Line::from(Span::styled(
                    answer_text,
                    Style::default()
                        .fg(colors.error())
                        .add_modifier(Modifier::BOLD),
                ))
            }
        } else if let Some(notice) = &self.play.notice {
            Line::from(Span::styled(
                notice.clone(),
                Style::default().fg(colors.warning()),
            ))
        } else {
            Line::from(Span::styled(
                "Type the answer and press Enter",
                Style::default().fg(colors.text_dim()),
            ))
        };
        Paragraph::new(status_line)
            .alignment(Alignment::Center)
            .render(layout[3], buf);
    }
}
