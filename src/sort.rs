//! Stable, numeric-aware sorting of the visible row-index list.

use std::cmp::Ordering;

use crate::data::Dataset;

/// Stable-sort `visible` by the given column. Cells that both parse as
/// numbers compare numerically, everything else compares as strings. Rows
/// with equal keys keep their relative order, so repeated application with
/// the same key and direction does not reorder anything.
pub fn sort_visible(data: &Dataset, visible: &mut [usize], column: usize, descending: bool) {
    visible.sort_by(|&a, &b| {
        let ordering = compare_cells(&data.rows[a][column], &data.rows[b][column]);
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

fn compare_cells(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}
