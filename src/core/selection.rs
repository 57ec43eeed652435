//! Text selection over the grid
//!
//! Selections are recorded with 1-based (row, col) endpoints, the way a
//! host maps pointer positions to cells. They are normalized to 0-based,
//! ordered bounds before any text is extracted.

use serde::{Deserialize, Serialize};

use super::grid::{Grid, Row};

/// A 1-based cell position used for selection endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPoint {
    pub row: usize,
    pub col: usize,
}

impl SelectionPoint {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A selection in progress: where the drag started and where it is now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    /// Where the selection started
    pub anchor: SelectionPoint,
    /// Where the selection currently ends
    pub extent: SelectionPoint,
    /// Rectangular selection instead of a linear span
    pub block: bool,
}

impl SelectionRange {
    /// Start a selection with both endpoints at `anchor`
    pub fn new(anchor: SelectionPoint, block: bool) -> Self {
        Self {
            anchor,
            extent: anchor,
            block,
        }
    }

    /// 0-based, ordered bounds of this selection
    pub fn bounds(&self) -> Bounds {
        normalize_range(self.anchor, self.extent, self.block)
    }

    /// The selected text in `grid`
    pub fn text(&self, grid: &Grid) -> String {
        extract_text(grid, &self.bounds(), self.block)
    }
}

/// Normalized, 0-based, inclusive selection bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

/// Convert 1-based endpoints to ordered 0-based bounds.
///
/// A linear selection dragged backwards swaps its endpoints wholesale. A
/// block selection is a rectangle, so rows and columns are ordered
/// independently.
pub fn normalize_range(anchor: SelectionPoint, extent: SelectionPoint, block: bool) -> Bounds {
    let (start, end) = if block {
        (
            SelectionPoint::new(anchor.row.min(extent.row), anchor.col.min(extent.col)),
            SelectionPoint::new(anchor.row.max(extent.row), anchor.col.max(extent.col)),
        )
    } else if (anchor.row, anchor.col) > (extent.row, extent.col) {
        (extent, anchor)
    } else {
        (anchor, extent)
    };

    Bounds {
        start_row: start.row.saturating_sub(1),
        start_col: start.col.saturating_sub(1),
        end_row: end.row.saturating_sub(1),
        end_col: end.col.saturating_sub(1),
    }
}

/// Columns `start..=end` of a row as text, clamped to the row's cells
fn slice(row: &Row, start: usize, end: usize) -> String {
    row.cells
        .iter()
        .take(end.saturating_add(1))
        .skip(start)
        .map(|c| c.ch)
        .collect()
}

/// Extract the text covered by `bounds`.
///
/// Rows past the bottom of the grid are ignored. A single-row selection
/// yields `start_col..=end_col`. Otherwise block mode yields the same
/// column slice of every row, and linear mode yields the first row from
/// `start_col` on, whole middle rows, and the last row up to `end_col`.
pub fn extract_text(grid: &Grid, bounds: &Bounds, block: bool) -> String {
    if bounds.start_row >= grid.rows() {
        return String::new();
    }
    let mut end_row = bounds.end_row;
    let mut end_col = bounds.end_col;
    if end_row >= grid.rows() {
        end_row = grid.rows() - 1;
        end_col = usize::MAX;
    }

    let row = |r: usize| grid.row(r).cloned().unwrap_or_default();

    if bounds.start_row == end_row {
        return slice(&row(end_row), bounds.start_col, end_col);
    }

    let lines: Vec<String> = (bounds.start_row..=end_row)
        .map(|r| {
            let line = row(r);
            if block {
                slice(&line, bounds.start_col, end_col)
            } else if r == bounds.start_row {
                slice(&line, bounds.start_col, usize::MAX)
            } else if r == end_row {
                slice(&line, 0, end_col)
            } else {
                line.text()
            }
        })
        .collect();
    lines.join("\n")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// Expand a double-click at 1-based (row, col) to the surrounding word.
///
/// Returns `None` when the hit cell is outside the written part of the
/// row or is not a letter or digit.
pub fn word_at(grid: &Grid, row: usize, col: usize) -> Option<SelectionRange> {
    if row == 0 || col == 0 {
        return None;
    }
    let cells = &grid.row(row - 1)?.cells;
    let hit = col - 1;
    if !is_word_char(cells.get(hit)?.ch) {
        return None;
    }

    let mut start = hit;
    while start > 0 && is_word_char(cells[start - 1].ch) {
        start -= 1;
    }
    let mut end = hit;
    while end + 1 < cells.len() && is_word_char(cells[end + 1].ch) {
        end += 1;
    }

    Some(SelectionRange {
        anchor: SelectionPoint::new(row, start + 1),
        extent: SelectionPoint::new(row, end + 1),
        block: false,
    })
}
