//! Pure viewport arithmetic: effective column widths, the render order of
//! pinned and unpinned columns, and the mapping from scroll offsets to the
//! screen runs the data table draws. No input handling, no state.

use crate::data::{Column, ColumnDisplay};

/// Default-mode columns are truncated to this many cells; `Expanded` lifts it.
pub const DEFAULT_WIDTH_CAP: usize = 20;

/// Width of the ` │ ` separator drawn after every column field.
pub const SEPARATOR_WIDTH: usize = 3;

/// Upper bound for horizontal scrolling in popups. Lines vary in length, so
/// scrolling into blank space is allowed up to this cap.
pub const POPUP_MAX_X_OFFSET: usize = 9999;

pub fn clamp(value: isize, min: isize, max: isize) -> isize {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Width of a column as rendered under its current display mode.
pub fn effective_width(col: &Column) -> usize {
    match col.display {
        ColumnDisplay::Default | ColumnDisplay::Aligned => {
            clamp(col.width as isize, 1, DEFAULT_WIDTH_CAP as isize) as usize
        }
        ColumnDisplay::Collapsed => 1,
        ColumnDisplay::Expanded => col.width.max(1),
    }
}

/// Column indices in render order: pinned columns first (in logical order),
/// then the rest.
pub fn render_order(columns: &[Column]) -> Vec<usize> {
    let pinned = columns.iter().enumerate().filter(|(_, c)| c.pinned);
    let unpinned = columns.iter().enumerate().filter(|(_, c)| !c.pinned);
    pinned.chain(unpinned).map(|(i, _)| i).collect()
}

/// Width of the fixed left region occupied by pinned columns (separators
/// included).
pub fn pinned_width(columns: &[Column]) -> usize {
    columns
        .iter()
        .filter(|c| c.pinned)
        .map(|c| effective_width(c) + SEPARATOR_WIDTH)
        .sum()
}

/// Start/end of an unpinned column's field within the scrolled virtual line.
/// `None` for pinned columns, which do not scroll.
pub fn unpinned_extent(columns: &[Column], idx: usize) -> Option<(usize, usize)> {
    if columns.get(idx)?.pinned {
        return None;
    }
    let mut offset = 0;
    for (i, col) in columns.iter().enumerate() {
        if col.pinned {
            continue;
        }
        let end = offset + effective_width(col) + SEPARATOR_WIDTH;
        if i == idx {
            return Some((offset, end));
        }
        offset = end;
    }
    None
}

/// Largest valid horizontal offset: the scrolled line's width minus the
/// viewport left over after the pinned region. Never negative.
pub fn max_x_offset(columns: &[Column], view_width: usize) -> usize {
    let scrolled: usize = columns
        .iter()
        .filter(|c| !c.pinned)
        .map(|c| effective_width(c) + SEPARATOR_WIDTH)
        .sum();
    let avail = view_width.saturating_sub(pinned_width(columns));
    scrolled.saturating_sub(avail)
}

/// Largest valid vertical offset for a visible set of `rows` rows.
pub fn max_y_offset(rows: usize, view_height: usize) -> usize {
    rows.saturating_sub(view_height)
}

/// One column's slice of the current frame: draw `col`'s padded field plus its
/// separator, skipping `skip` leading characters, `take` characters wide,
/// starting at screen column `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub col: usize,
    pub x: usize,
    pub skip: usize,
    pub take: usize,
}

/// Map the render order onto the screen for the given horizontal offset.
/// Pinned columns land first and ignore the offset; the remaining columns are
/// clipped against it. Runs cover at most `view_width` cells.
pub fn visible_runs(columns: &[Column], offset_x: usize, view_width: usize) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut x = 0;

    for (idx, col) in columns.iter().enumerate().filter(|(_, c)| c.pinned) {
        let field = effective_width(col) + SEPARATOR_WIDTH;
        if x >= view_width {
            return runs;
        }
        runs.push(Run {
            col: idx,
            x,
            skip: 0,
            take: field.min(view_width - x),
        });
        x += field;
    }

    let fixed = x;
    let mut virt = 0;
    for (idx, col) in columns.iter().enumerate().filter(|(_, c)| !c.pinned) {
        let field = effective_width(col) + SEPARATOR_WIDTH;
        let start = virt;
        virt += field;
        if virt <= offset_x {
            continue;
        }
        let skip = offset_x.saturating_sub(start);
        let x = fixed + start + skip - offset_x;
        if x >= view_width {
            break;
        }
        runs.push(Run {
            col: idx,
            x,
            skip,
            take: (field - skip).min(view_width - x),
        });
    }

    runs
}
