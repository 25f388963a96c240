use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// Horizontal bar showing how much of the round has elapsed. Turns to the
/// warning color for the last 30 seconds.
pub struct TimeBar<'a> {
    pub ratio: f64,
    pub label: String,
    pub urgent: bool,
    pub theme: &'a Theme,
}

impl<'a> TimeBar<'a> {
    pub fn new(ratio: f64, label: String, urgent: bool, theme: &'a Theme) -> Self {
        Self {
            ratio: ratio.clamp(0.0, 1.0),
            label,
            urgent,
            theme,
        }
    }
}

impl Widget for TimeBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Time ")
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let fill_color = if self.urgent {
            colors.error()
        } else {
            colors.bar_filled()
        };
        let filled_width = (self.ratio * inner.width as f64) as u16;

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(fill_color)
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label_x = inner.x + (inner.width.saturating_sub(self.label.len() as u16)) / 2;
        buf.set_string(label_x, inner.y, &self.label, Style::default().fg(colors.fg()));
    }
}
