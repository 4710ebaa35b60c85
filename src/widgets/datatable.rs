//! The data grid: header line plus one line per visible row, laid out by the
//! layout engine's column runs so pinned columns stay put while the rest
//! scroll horizontally.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::config::Theme;
use crate::data::{ColumnDisplay, Dataset};
use crate::layout;

pub const ROW_INDICATOR: char = '▶';

pub struct DataTable<'a> {
    pub data: &'a Dataset,
    pub visible: &'a [usize],
    pub offset_x: usize,
    pub offset_y: usize,
    pub zebra: bool,
    /// Index into `visible` of the row-select cursor, when active.
    pub row_cursor: Option<usize>,
    pub theme: &'a Theme,
}

/// Pad or truncate `text` to exactly `width` characters; `right` justifies
/// numeric-looking content for aligned columns.
fn field(text: &str, width: usize, right: bool) -> String {
    let truncated: String = text.chars().take(width).collect();
    if right {
        format!("{:>width$}", truncated, width = width)
    } else {
        format!("{:<width$}", truncated, width = width)
    }
}

fn cell_text(data: &Dataset, col: usize, row: usize) -> (String, bool) {
    let cell = &data.rows[row][col];
    match data.columns[col].display {
        ColumnDisplay::Collapsed => ("…".to_string(), false),
        ColumnDisplay::Aligned => {
            let numeric = cell.trim().parse::<f64>().is_ok();
            (cell.clone(), numeric)
        }
        _ => (cell.clone(), false),
    }
}

impl Widget for DataTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let runs = layout::visible_runs(&self.data.columns, self.offset_x, area.width as usize);
        let header_style = Style::default()
            .fg(self.theme.header)
            .add_modifier(Modifier::BOLD);

        for run in &runs {
            let col = &self.data.columns[run.col];
            let width = layout::effective_width(col);
            let mut text = field(&col.name, width, false);
            text.push_str(" │ ");
            let text: String = text.chars().skip(run.skip).collect();
            buf.set_stringn(
                area.x + run.x as u16,
                area.y,
                &text,
                run.take,
                header_style,
            );
        }

        let data_height = (area.height - 1) as usize;
        for y in 0..data_height {
            let visible_idx = self.offset_y + y;
            let Some(&row) = self.visible.get(visible_idx) else {
                break;
            };
            let line_y = area.y + 1 + y as u16;

            for run in &runs {
                let col = &self.data.columns[run.col];
                let width = layout::effective_width(col);
                let (cell, right) = cell_text(self.data, run.col, row);
                let mut text = field(&cell, width, right);
                text.push_str(" │ ");
                let text: String = text.chars().skip(run.skip).collect();
                buf.set_stringn(
                    area.x + run.x as u16,
                    line_y,
                    &text,
                    run.take,
                    Style::default(),
                );
            }

            if self.zebra && visible_idx % 2 == 1 {
                let stripe = Rect::new(area.x, line_y, area.width, 1);
                buf.set_style(stripe, Style::default().bg(self.theme.zebra));
            }

            if self.row_cursor == Some(visible_idx) {
                let cursor_style = Style::default()
                    .fg(self.theme.cursor)
                    .add_modifier(Modifier::BOLD);
                buf.set_string(area.x, line_y, ROW_INDICATOR.to_string(), cursor_style);
                let line = Rect::new(area.x, line_y, area.width, 1);
                buf.set_style(line, Style::default().add_modifier(Modifier::BOLD));
            }
        }

        // Column-select highlight over header and data alike.
        for run in &runs {
            if !self.data.columns[run.col].highlighted {
                continue;
            }
            let highlight = Rect::new(
                area.x + run.x as u16,
                area.y,
                run.take.min(u16::MAX as usize) as u16,
                area.height,
            );
            buf.set_style(
                highlight,
                Style::default()
                    .fg(self.theme.highlight)
                    .add_modifier(Modifier::BOLD),
            );
        }
    }
}
