use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::api::{GameResult, RankInfo};
use crate::ui::layout::format_clock;
use crate::ui::theme::Theme;

/// Qualitative tier shown at the top of the results screen, keyed off
/// accuracy thresholds.
pub fn performance_message(accuracy: f64) -> &'static str {
    if accuracy >= 90.0 {
        "Ninja mastery!"
    } else if accuracy >= 75.0 {
        "Great work!"
    } else if accuracy >= 60.0 {
        "Good job!"
    } else {
        "Keep training!"
    }
}

pub struct ResultsPanel<'a> {
    result: &'a GameResult,
    rank: Option<&'a RankInfo>,
    theme: &'a Theme,
}

impl<'a> ResultsPanel<'a> {
    pub fn new(result: &'a GameResult, rank: Option<&'a RankInfo>, theme: &'a Theme) -> Self {
        Self {
            result,
            rank,
            theme,
        }
    }
}

impl Widget for ResultsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Round Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(inner);

        let title = Paragraph::new(Line::from(Span::styled(
            performance_message(self.result.accuracy),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        title.render(layout[0], buf);

        let score_text = format!("{}/{}", self.result.score, self.result.total_problems);
        let score_line = Line::from(vec![
            Span::styled("  Solved:   ", Style::default().fg(colors.fg())),
            Span::styled(
                score_text,
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(score_line).render(layout[1], buf);

        let acc_color = if self.result.accuracy >= 90.0 {
            colors.success()
        } else if self.result.accuracy >= 60.0 {
            colors.warning()
        } else {
            colors.error()
        };
        let acc_line = Line::from(vec![
            Span::styled("  Accuracy: ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{:.1}%", self.result.accuracy),
                Style::default().fg(acc_color).add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(acc_line).render(layout[2], buf);

        let time_line = Line::from(vec![
            Span::styled("  Time:     ", Style::default().fg(colors.fg())),
            Span::styled(
                format_clock(self.result.time_taken),
                Style::default().fg(colors.fg()),
            ),
        ]);
        Paragraph::new(time_line).render(layout[3], buf);

        let xp_line = Line::from(vec![
            Span::styled("  XP:       ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("+{}", self.result.xp_earned),
                Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(xp_line).render(layout[4], buf);

        // Rank renders only once the lookup has resolved; absent on failure.
        if let Some(rank) = self.rank {
            let rank_line = Line::from(vec![
                Span::styled("  Rank:     ", Style::default().fg(colors.fg())),
                Span::styled(
                    format!("{} \u{00b7} Level {}", rank.belt.label(), rank.level),
                    Style::default()
                        .fg(colors.warning())
                        .add_modifier(Modifier::BOLD),
                ),
            ]);
            Paragraph::new(rank_line).render(layout[5], buf);
        }

        let help = Paragraph::new(Line::from(vec![
            Span::styled("  [r] Train again  ", Style::default().fg(colors.accent())),
            Span::styled("[q] Main menu", Style::default().fg(colors.accent())),
        ]));
        help.render(layout[7], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn performance_tiers_follow_accuracy_thresholds() {
        assert_eq!(performance_message(100.0), "Ninja mastery!");
        assert_eq!(performance_message(90.0), "Ninja mastery!");
        assert_eq!(performance_message(89.9), "Great work!");
        assert_eq!(performance_message(75.0), "Great work!");
        assert_eq!(performance_message(60.0), "Good job!");
        assert_eq!(performance_message(59.9), "Keep training!");
        assert_eq!(performance_message(0.0), "Keep training!");
    }
}
