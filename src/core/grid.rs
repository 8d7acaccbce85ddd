//! Terminal Grid
//!
//! A fixed-size 2D array of byte cells representing the visible terminal
//! area. Cells are stored row-major, so the linear index of `(col, row)` is
//! `row * cols + col`.
//!
//! The grid does not clamp coordinates: callers pass positions that the
//! cursor model has already clamped.

use serde::{Deserialize, Serialize};

use super::cursor::Cursor;

/// The blank cell value
pub const BLANK: u8 = b' ';

/// The terminal grid - a matrix of single-byte cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Row-major cell storage
    cells: Vec<u8>,
    /// Number of columns
    cols: usize,
    /// Number of rows
    rows: usize,
}

impl Grid {
    /// Create a blank grid. Dimensions are fixed for the lifetime of the grid.
    pub fn new(cols: usize, rows: usize) -> Self {
        assert!(cols > 0 && rows > 0, "grid dimensions must be non-zero");
        Self {
            cells: vec![BLANK; cols * rows],
            cols,
            rows,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    fn index(&self, col: usize, row: usize) -> usize {
        row * self.cols + col
    }

    /// Read the cell at `(col, row)`
    pub fn read_cell(&self, col: usize, row: usize) -> u8 {
        self.cells[self.index(col, row)]
    }

    /// Write a byte into the cell at `(col, row)`
    pub fn write_cell(&mut self, col: usize, row: usize, code: u8) {
        let i = self.index(col, row);
        self.cells[i] = code;
    }

    /// Get the cells of a row
    pub fn row(&self, row: usize) -> &[u8] {
        let start = row * self.cols;
        &self.cells[start..start + self.cols]
    }

    /// Iterate over all rows, top to bottom
    pub fn iter_rows(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.chunks(self.cols)
    }

    /// Row contents as text with trailing blanks trimmed
    pub fn row_text(&self, row: usize) -> String {
        let cells = self.row(row);
        let len = cells
            .iter()
            .rposition(|&c| c != BLANK)
            .map(|i| i + 1)
            .unwrap_or(0);
        cells[..len].iter().map(|&b| b as char).collect()
    }

    /// Whether every cell is blank
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|&c| c == BLANK)
    }

    /// Fill every cell with a space
    pub fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    /// Shift every row up by one; the top row is discarded and the bottom
    /// row becomes blank.
    pub fn scroll_up_by_one(&mut self) {
        self.cells.copy_within(self.cols.., 0);
        let last = self.index(0, self.rows - 1);
        self.cells[last..].fill(BLANK);
    }

    /// Scroll up `n` times
    pub fn scroll_up(&mut self, n: usize) {
        if n >= self.rows {
            self.clear();
            return;
        }
        for _ in 0..n {
            self.scroll_up_by_one();
        }
    }

    /// Erase from the cursor (inclusive) to the end of the screen
    pub fn erase_to_end_of_screen(&mut self, at: Cursor) {
        let start = self.index(at.col, at.row);
        self.cells[start..].fill(BLANK);
    }

    /// Erase from the start of the screen to the cursor (inclusive)
    pub fn erase_from_start_of_screen(&mut self, at: Cursor) {
        let end = self.index(at.col, at.row);
        self.cells[..=end].fill(BLANK);
    }

    /// Erase the whole screen
    pub fn erase_screen(&mut self) {
        self.clear();
    }

    /// Erase from the cursor (inclusive) to the end of its line
    pub fn erase_to_end_of_line(&mut self, at: Cursor) {
        let start = self.index(at.col, at.row);
        let end = self.index(0, at.row) + self.cols;
        self.cells[start..end].fill(BLANK);
    }

    /// Erase from the start of the cursor's line to the cursor (inclusive)
    pub fn erase_from_start_of_line(&mut self, at: Cursor) {
        let start = self.index(0, at.row);
        let end = self.index(at.col, at.row);
        self.cells[start..=end].fill(BLANK);
    }

    /// Erase the cursor's whole line
    pub fn erase_line(&mut self, at: Cursor) {
        let start = self.index(0, at.row);
        self.cells[start..start + self.cols].fill(BLANK);
    }
}
