//! Screen model implementation
//!
//! The screen owns the visible grid plus everything that decides where and
//! how the next rune lands: cursor, saved cursor, scroll region, mode flags,
//! the current pen style and the G0/G1 charsets. It supports a primary and
//! an alternate buffer.
//!
//! Every mutation keeps these invariants:
//! - `cursor.row < rows` and `cursor.col <= cols` (col == cols is a pending wrap)
//! - `scroll_top <= scroll_bottom < rows`
//! - no row holds more than `cols` cells
//!
//! A screen with zero rows or columns is inert: every operation is a no-op.

use serde::{Deserialize, Serialize};

use super::cell::{Cell, Style};
use super::charset::CharsetState;
use super::grid::Grid;
use super::modes::Modes;

/// A cursor position, 0-based
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

/// Which part of a line or display an erase targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseMode {
    /// From the cursor to the end
    ToEnd,
    /// From the start to the cursor (inclusive)
    ToStart,
    /// Everything
    All,
}

impl EraseMode {
    /// Map an `J`/`K` parameter to an erase mode
    pub fn from_param(param: u32) -> Option<Self> {
        match param {
            0 => Some(EraseMode::ToEnd),
            1 => Some(EraseMode::ToStart),
            2 => Some(EraseMode::All),
            _ => None,
        }
    }
}

/// The main screen structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screen {
    /// The grid being drawn to
    grid: Grid,
    /// Primary grid, parked while the alternate screen is active
    primary: Option<Grid>,
    cursor: Cursor,
    saved_cursor: Cursor,
    scroll_top: usize,
    scroll_bottom: usize,
    /// Mode flags
    pub modes: Modes,
    /// Style applied to subsequently written cells
    pub pen: Style,
    /// G0/G1 charset selection
    pub charsets: CharsetState,
    /// Set whenever the cursor is explicitly moved
    #[serde(skip)]
    cursor_moved: bool,
}

impl Screen {
    /// Create a new screen with the given dimensions
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            grid: Grid::new(rows, cols),
            primary: None,
            cursor: Cursor::default(),
            saved_cursor: Cursor::default(),
            scroll_top: 0,
            scroll_bottom: rows.saturating_sub(1),
            modes: Modes::default(),
            pen: Style::default(),
            charsets: CharsetState::default(),
            cursor_moved: false,
        }
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    /// The grid currently displayed
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn saved_cursor(&self) -> Cursor {
        self.saved_cursor
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    pub fn scroll_bottom(&self) -> usize {
        self.scroll_bottom
    }

    /// Report and clear whether the cursor was moved since the last call
    pub fn take_cursor_moved(&mut self) -> bool {
        std::mem::take(&mut self.cursor_moved)
    }

    fn is_inert(&self) -> bool {
        self.rows() == 0 || self.cols() == 0
    }

    /// Write a rune at the cursor through the active charset and advance.
    ///
    /// When the cursor sits past the last column the rune wraps to the next
    /// line, or overwrites the last column if autowrap is off.
    pub fn write_rune(&mut self, c: char) {
        if self.is_inert() {
            return;
        }
        let cols = self.cols();
        if self.cursor.col >= cols {
            if self.modes.autowrap {
                self.cursor.col = 0;
                self.linefeed();
            } else {
                self.cursor.col = cols - 1;
            }
        }

        let ch = self.charsets.translate(c);
        self.grid
            .write(self.cursor.row, self.cursor.col, Cell::with_style(ch, self.pen));
        self.cursor.col += 1;
    }

    /// Move the cursor, clamping to the grid
    pub fn move_cursor(&mut self, row: usize, col: usize) {
        if self.is_inert() {
            return;
        }
        self.cursor.row = row.min(self.rows() - 1);
        self.cursor.col = col.min(self.cols() - 1);
        self.cursor_moved = true;
    }

    /// Handle carriage return (CR)
    pub fn carriage_return(&mut self) {
        self.move_cursor(self.cursor.row, 0);
    }

    /// Handle backspace (BS). Does nothing on a row that holds no cells.
    pub fn backspace(&mut self) {
        let has_cells = self
            .grid
            .row(self.cursor.row)
            .is_some_and(|r| !r.is_empty());
        if !has_cells {
            return;
        }
        self.move_cursor(self.cursor.row, self.cursor.col.saturating_sub(1));
    }

    /// Handle linefeed (LF, VT, FF) - scroll when at the bottom of the region
    pub fn linefeed(&mut self) {
        if self.is_inert() {
            return;
        }
        if self.cursor.row == self.scroll_bottom {
            self.grid.scroll_up(self.scroll_top, self.scroll_bottom, 1);
            if self.modes.newline {
                self.move_cursor(self.cursor.row, 0);
            }
            return;
        }
        let col = if self.modes.newline { 0 } else { self.cursor.col };
        self.move_cursor(self.cursor.row + 1, col);
    }

    /// Handle horizontal tab (HT).
    ///
    /// Advances to the next multiple of `width`. A stop at or past the end
    /// of the row parks the cursor in the pending-wrap column, so the next
    /// rune wraps. Cells skipped past the end of the row are filled with
    /// blanks; cells already written are kept.
    pub fn tab(&mut self, width: usize) {
        if self.is_inert() || width == 0 {
            return;
        }
        let cols = self.cols();
        let col = self.cursor.col;
        if col >= cols {
            return;
        }
        let target = ((col / width + 1) * width).min(cols);
        let row_len = self.grid.row(self.cursor.row).map_or(0, |r| r.len());
        for c in row_len.max(col)..target {
            self.grid
                .write(self.cursor.row, c, Cell::with_style(' ', self.pen));
        }
        self.cursor.col = target;
        self.cursor_moved = true;
    }

    /// Index (ESC D) - shift the region up one line. The cursor stays put.
    pub fn index(&mut self) {
        if self.is_inert() {
            return;
        }
        self.grid.scroll_up(self.scroll_top, self.scroll_bottom, 1);
    }

    /// Reverse index (ESC M) - shift the region down one line. The cursor
    /// stays put.
    pub fn reverse_index(&mut self) {
        if self.is_inert() {
            return;
        }
        self.grid.scroll_down(self.scroll_top, self.scroll_bottom, 1);
    }

    /// Scroll the region up by n lines (content moves up, blanks at bottom).
    /// The cursor row is then clamped into the region.
    pub fn scroll_up(&mut self, n: usize) {
        if self.is_inert() {
            return;
        }
        self.grid.scroll_up(self.scroll_top, self.scroll_bottom, n);
        self.cursor.row = self.cursor.row.clamp(self.scroll_top, self.scroll_bottom);
    }

    /// Scroll the region down by n lines (content moves down, blanks at top)
    pub fn scroll_down(&mut self, n: usize) {
        if self.is_inert() {
            return;
        }
        self.grid.scroll_down(self.scroll_top, self.scroll_bottom, n);
    }

    /// Set the scroll region (0-based, inclusive). The bottom is clamped to
    /// the last row; an inverted region is ignored.
    pub fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        if self.is_inert() {
            return;
        }
        let bottom = bottom.min(self.rows() - 1);
        if top > bottom {
            tracing::debug!("Ignoring inverted scroll region {}..={}", top, bottom);
            return;
        }
        self.scroll_top = top;
        self.scroll_bottom = bottom;
    }

    /// Reset the scroll region to the full screen
    pub fn reset_scroll_region(&mut self) {
        self.scroll_top = 0;
        self.scroll_bottom = self.rows().saturating_sub(1);
    }

    /// Erase in display (ED). `All` also homes the cursor.
    pub fn erase_display(&mut self, mode: EraseMode) {
        if self.is_inert() {
            return;
        }
        let Cursor { row, col } = self.cursor;
        match mode {
            EraseMode::ToEnd => {
                self.erase_line(EraseMode::ToEnd);
                for r in row + 1..self.rows() {
                    if let Some(line) = self.grid.row_mut(r) {
                        line.clear();
                    }
                }
            }
            EraseMode::ToStart => {
                for r in 0..row {
                    if let Some(line) = self.grid.row_mut(r) {
                        line.clear();
                    }
                }
                if let Some(line) = self.grid.row_mut(row) {
                    line.blank_range(0, col);
                }
            }
            EraseMode::All => {
                self.grid.clear();
                self.move_cursor(0, 0);
            }
        }
    }

    /// Erase in line (EL). Erasing to the end truncates the row.
    pub fn erase_line(&mut self, mode: EraseMode) {
        let Cursor { row, col } = self.cursor;
        if let Some(line) = self.grid.row_mut(row) {
            match mode {
                EraseMode::ToEnd => line.truncate(col),
                EraseMode::ToStart => line.blank_range(0, col),
                EraseMode::All => line.clear(),
            }
        }
    }

    /// Erase n cells from the cursor without shifting (ECH)
    pub fn erase_cells(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let Cursor { row, col } = self.cursor;
        if let Some(line) = self.grid.row_mut(row) {
            line.blank_range(col, col.saturating_add(n - 1));
        }
    }

    /// Insert n blank cells at the cursor (ICH)
    pub fn insert_cells(&mut self, n: usize) {
        self.grid.insert_cells(self.cursor.row, self.cursor.col, n);
    }

    /// Delete n cells at the cursor (DCH)
    pub fn delete_cells(&mut self, n: usize) {
        self.grid.delete_cells(self.cursor.row, self.cursor.col, n);
    }

    /// Insert n blank lines at the cursor row, pushing lines below it down
    /// and discarding those that fall past the bottom of the region (IL)
    pub fn insert_lines(&mut self, n: usize) {
        if self.cursor_in_region() {
            self.grid.scroll_down(self.cursor.row, self.scroll_bottom, n);
        }
    }

    /// Delete n lines at the cursor row, pulling lines below it up (DL)
    pub fn delete_lines(&mut self, n: usize) {
        if self.cursor_in_region() {
            self.grid.scroll_up(self.cursor.row, self.scroll_bottom, n);
        }
    }

    fn cursor_in_region(&self) -> bool {
        !self.is_inert() && (self.scroll_top..=self.scroll_bottom).contains(&self.cursor.row)
    }

    /// Save the cursor position (ESC 7, CSI s)
    pub fn save_cursor(&mut self) {
        self.saved_cursor = self.cursor;
    }

    /// Restore the saved cursor position (ESC 8, CSI u)
    pub fn restore_cursor(&mut self) {
        let saved = self.saved_cursor;
        self.move_cursor(saved.row, saved.col);
    }

    /// Switch between the primary and alternate buffers. The alternate
    /// buffer always starts blank.
    pub fn set_alternate_screen(&mut self, enable: bool) {
        if enable == self.modes.alternate_screen {
            return;
        }
        if enable {
            let blank = Grid::new(self.rows(), self.cols());
            self.primary = Some(std::mem::replace(&mut self.grid, blank));
        } else if let Some(primary) = self.primary.take() {
            self.grid = primary;
        }
        self.modes.alternate_screen = enable;
    }

    /// Resize the screen. A zero dimension is ignored.
    ///
    /// A scroll region that ended on the old last row (or was never set)
    /// follows the new last row; an explicit region is kept and clamped.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        if rows == 0 || cols == 0 {
            tracing::debug!("Ignoring resize to {}x{}", rows, cols);
            return;
        }
        let old_rows = self.rows();

        self.grid.resize(rows, cols);
        if let Some(primary) = self.primary.as_mut() {
            primary.resize(rows, cols);
        }

        if self.scroll_bottom == 0 || self.scroll_bottom + 1 == old_rows {
            self.scroll_bottom = rows - 1;
        }
        self.scroll_bottom = self.scroll_bottom.min(rows - 1);
        self.scroll_top = self.scroll_top.min(self.scroll_bottom);

        self.cursor.row = self.cursor.row.min(rows - 1);
        self.cursor.col = self.cursor.col.min(cols);
        self.saved_cursor.row = self.saved_cursor.row.min(rows - 1);
        self.saved_cursor.col = self.saved_cursor.col.min(cols - 1);
    }
}
