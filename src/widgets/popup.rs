//! A read-only scrollable overlay for arbitrary pre-formatted text: filter
//! errors, row inspection, statistics, and the help screen.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Clear, Widget},
};

use crate::config::Theme;
use crate::layout::clamp;

/// Inner (content) size of a popup on a terminal of the given size: aim for
/// 120 columns but stay within the terminal, and tall enough for the content
/// up to the terminal height.
pub fn popup_size(term_width: u16, term_height: u16, content_lines: usize) -> (u16, u16) {
    let width = clamp(120, 50, term_width as isize - 15) as u16;
    let height = clamp(content_lines as isize, 10, term_height as isize - 5) as u16;
    (width, height)
}

pub struct Popup<'a> {
    pub lines: &'a [String],
    pub offset_x: usize,
    pub offset_y: usize,
    pub theme: &'a Theme,
}

impl Widget for Popup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (width, height) = popup_size(area.width, area.height, self.lines.len());
        let outer = Rect {
            x: area.x + (area.width.saturating_sub(width + 2)) / 2,
            y: area.y + (area.height.saturating_sub(height + 2)) / 2,
            width: (width + 2).min(area.width),
            height: (height + 2).min(area.height),
        };

        Clear.render(outer, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.popup_border));
        let inner = block.inner(outer);
        block.render(outer, buf);

        for y in 0..inner.height {
            let Some(line) = self.lines.get(self.offset_y + y as usize) else {
                break;
            };
            let text: String = line.chars().skip(self.offset_x).collect();
            buf.set_stringn(
                inner.x,
                inner.y + y,
                &text,
                inner.width as usize,
                Style::default(),
            );
        }
    }
}
