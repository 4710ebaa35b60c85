//! The one-line mode strip at the bottom of the screen: active mode label,
//! any in-progress prompt text (with a block cursor), and row counts on the
//! right.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::config::Theme;

pub struct ModeLine<'a> {
    pub label: &'a str,
    pub text: &'a str,
    /// Draw a block cursor after `text` (prompt modes).
    pub cursor: bool,
    pub visible_rows: usize,
    pub total_rows: usize,
    pub theme: &'a Theme,
}

impl Widget for ModeLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        buf.set_style(area, Style::default().bg(self.theme.mode_line));

        let left = if self.text.is_empty() && !self.cursor {
            format!("[{}]", self.label)
        } else {
            format!("[{}] {}", self.label, self.text)
        };
        buf.set_stringn(
            area.x,
            area.y,
            &left,
            area.width as usize,
            Style::default().add_modifier(Modifier::BOLD),
        );

        if self.cursor {
            let x = area.x + (left.chars().count() as u16).min(area.width.saturating_sub(1));
            buf.set_string(x, area.y, " ", Style::default().add_modifier(Modifier::REVERSED));
        }

        let info = format!("{} of {} rows", self.visible_rows, self.total_rows);
        let info_len = info.chars().count() as u16;
        if info_len + left.chars().count() as u16 + 2 <= area.width {
            buf.set_string(
                area.x + area.width - info_len,
                area.y,
                &info,
                Style::default(),
            );
        }
    }
}
