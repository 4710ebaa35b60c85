/// Per-column rendering policy. The modes are mutually exclusive; toggling a
/// mode that is already set returns the column to `Default`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDisplay {
    #[default]
    Default,
    /// Single-cell `…` placeholder.
    Collapsed,
    /// Full content width, no cap.
    Expanded,
    /// Default width, numeric cells right-justified.
    Aligned,
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    /// Max observed cell length (seeded with the name length). Grows
    /// monotonically while rows are scanned and is never shrunk afterwards.
    pub width: usize,
    pub display: ColumnDisplay,
    pub pinned: bool,
    pub highlighted: bool,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let width = name.chars().count().max(1);
        Self {
            name,
            width,
            display: ColumnDisplay::Default,
            pinned: false,
            highlighted: false,
        }
    }

    pub fn toggle_display(&mut self, display: ColumnDisplay) {
        self.display = if self.display == display {
            ColumnDisplay::Default
        } else {
            display
        };
    }
}

/// The loaded table. Built once by a reader and read-only for the rest of the
/// session, with one documented exception: the shell-pipe transform overwrites
/// the cells of a single column in this in-memory copy (never the source).
#[derive(Debug, Default, Clone)]
pub struct Dataset {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Re-scan one column's cells and grow its width to fit. Widths never
    /// shrink; a shell transform that shortened every cell leaves the layout
    /// alone.
    pub fn grow_column_width(&mut self, column: usize) {
        let max = self
            .rows
            .iter()
            .map(|row| row[column].chars().count())
            .max()
            .unwrap_or(0);
        let col = &mut self.columns[column];
        col.width = col.width.max(max);
    }

    /// Append a row, growing column widths to fit. The caller has already
    /// verified the cell count matches the column count.
    pub fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.columns.len());
        for (cell, col) in row.iter().zip(self.columns.iter_mut()) {
            col.width = col.width.max(cell.chars().count());
        }
        self.rows.push(row);
    }
}
