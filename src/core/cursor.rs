//! Cursor position model
//!
//! The cursor names the next cell that will receive a placed character.
//! Every motion takes the grid bounds and clamps, so `col < cols` and
//! `row < rows` hold after any call.

use serde::{Deserialize, Serialize};

/// Cursor position (0-indexed)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor {
    /// Column position
    pub col: usize,
    /// Row position
    pub row: usize,
}

impl Cursor {
    /// Create a cursor at the home position
    pub fn new() -> Self {
        Self::default()
    }

    /// Move cursor to absolute position, clamping to bounds
    pub fn move_to(&mut self, col: usize, row: usize, cols: usize, rows: usize) {
        self.col = col.min(cols.saturating_sub(1));
        self.row = row.min(rows.saturating_sub(1));
    }

    /// Move cursor up by n rows, stopping at row 0
    pub fn move_up(&mut self, n: usize) {
        self.row = self.row.saturating_sub(n);
    }

    /// Move cursor down by n rows, stopping at the last row
    pub fn move_down(&mut self, n: usize, rows: usize) {
        self.row = self.row.saturating_add(n).min(rows.saturating_sub(1));
    }

    /// Move cursor left by n columns, stopping at column 0
    pub fn move_left(&mut self, n: usize) {
        self.col = self.col.saturating_sub(n);
    }

    /// Move cursor right by n columns, stopping at the last column
    pub fn move_right(&mut self, n: usize, cols: usize) {
        self.col = self.col.saturating_add(n).min(cols.saturating_sub(1));
    }

    /// Move cursor to column (0-indexed)
    pub fn set_col(&mut self, col: usize, cols: usize) {
        self.col = col.min(cols.saturating_sub(1));
    }

    /// Carriage return - move to column 0
    pub fn carriage_return(&mut self) {
        self.col = 0;
    }

    /// Whether the cursor sits in the last column
    pub fn at_last_col(&self, cols: usize) -> bool {
        self.col + 1 >= cols
    }

    /// Whether the cursor sits in the last row
    pub fn at_last_row(&self, rows: usize) -> bool {
        self.row + 1 >= rows
    }
}
