//! Terminal Grid
//!
//! A 2D buffer of cells representing the visible terminal area. Rows are
//! stored sparsely: a row only holds cells up to the last column that has
//! been written, and never more than the configured column count.

use serde::{Deserialize, Serialize};

use super::cell::Cell;

/// A row of cells in the terminal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// The cells in this row, growing lazily as columns are written
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from plain text
    pub fn from_text(text: &str) -> Self {
        Self {
            cells: text.chars().map(Cell::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Drop every cell at or after `col`
    pub fn truncate(&mut self, col: usize) {
        self.cells.truncate(col);
    }

    /// Blank cells from start to end (inclusive) without changing the length
    pub fn blank_range(&mut self, start: usize, end: usize) {
        let end = end.min(self.cells.len().saturating_sub(1));
        for cell in self.cells.iter_mut().take(end + 1).skip(start) {
            *cell = Cell::default();
        }
    }

    /// The row's runes as a string
    pub fn text(&self) -> String {
        self.cells.iter().map(|c| c.ch).collect()
    }
}

/// The terminal grid - a fixed number of rows, each at most `cols` wide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// The rows in the grid
    rows: Vec<Row>,
    /// Number of columns
    cols: usize,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: vec![Row::new(); rows],
            cols,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Get a reference to a row
    pub fn row(&self, row: usize) -> Option<&Row> {
        self.rows.get(row)
    }

    /// Get a mutable reference to a row
    pub fn row_mut(&mut self, row: usize) -> Option<&mut Row> {
        self.rows.get_mut(row)
    }

    /// Get a reference to a cell
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    /// Iterate over all rows, top to bottom
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Write a cell, padding any gap before it with blanks.
    /// Positions outside the grid are ignored.
    pub fn write(&mut self, row: usize, col: usize, cell: Cell) {
        if col >= self.cols {
            return;
        }
        let Some(r) = self.rows.get_mut(row) else {
            return;
        };
        if col >= r.cells.len() {
            r.cells.resize(col + 1, Cell::default());
        }
        r.cells[col] = cell;
    }

    /// Resize the grid. Rows beyond the new height are dropped and rows
    /// wider than the new width are truncated.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.rows.resize(rows, Row::new());
        for row in &mut self.rows {
            row.truncate(cols);
        }
        self.cols = cols;
    }

    /// Clear the entire grid
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
    }

    /// Shift rows in `top..=bottom` up by n. The top n rows of the region
    /// are discarded and the bottom n come back blank.
    pub fn scroll_up(&mut self, top: usize, bottom: usize, n: usize) {
        let Some(region) = self.region_mut(top, bottom) else {
            return;
        };
        let n = n.min(region.len());
        region.rotate_left(n);
        let len = region.len();
        for row in &mut region[len - n..] {
            row.clear();
        }
    }

    /// Shift rows in `top..=bottom` down by n. The bottom n rows of the
    /// region are discarded and the top n come back blank.
    pub fn scroll_down(&mut self, top: usize, bottom: usize, n: usize) {
        let Some(region) = self.region_mut(top, bottom) else {
            return;
        };
        let n = n.min(region.len());
        region.rotate_right(n);
        for row in &mut region[..n] {
            row.clear();
        }
    }

    /// Insert n blank cells at position, shifting the row tail right and
    /// dropping anything pushed past the last column
    pub fn insert_cells(&mut self, row: usize, col: usize, n: usize) {
        let cols = self.cols;
        if let Some(r) = self.rows.get_mut(row) {
            if col < r.cells.len() {
                let n = n.min(cols.saturating_sub(col));
                r.cells
                    .splice(col..col, std::iter::repeat(Cell::default()).take(n));
                r.cells.truncate(cols);
            }
        }
    }

    /// Delete n cells at position, shifting the row tail left
    pub fn delete_cells(&mut self, row: usize, col: usize, n: usize) {
        if let Some(r) = self.rows.get_mut(row) {
            if col < r.cells.len() {
                let end = col.saturating_add(n).min(r.cells.len());
                r.cells.drain(col..end);
            }
        }
    }

    /// All rows as text joined by newlines, without trailing empty rows
    pub fn text(&self) -> String {
        let used = self
            .rows
            .iter()
            .rposition(|r| !r.is_empty())
            .map(|i| i + 1)
            .unwrap_or(0);
        self.rows[..used]
            .iter()
            .map(Row::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn region_mut(&mut self, top: usize, bottom: usize) -> Option<&mut [Row]> {
        if top > bottom || bottom >= self.rows.len() {
            return None;
        }
        Some(&mut self.rows[top..=bottom])
    }
}
