//! Deterministic snapshot generation
//!
//! Snapshots capture the grid text and cursor in a serializable format
//! for testing and the headless runner. Given the same byte stream, the
//! terminal must produce identical snapshots.

use serde::{Deserialize, Serialize};

use super::cursor::Cursor;
use super::grid::Grid;

/// A snapshot of the visible terminal state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Screen dimensions
    pub cols: usize,
    pub rows: usize,
    /// Cursor position
    pub cursor_col: usize,
    pub cursor_row: usize,
    /// One string per row, trailing blanks trimmed
    pub text: Vec<String>,
}

impl Snapshot {
    /// Capture the grid and cursor
    pub fn capture(grid: &Grid, cursor: &Cursor) -> Self {
        Self {
            cols: grid.cols(),
            rows: grid.rows(),
            cursor_col: cursor.col,
            cursor_row: cursor.row,
            text: (0..grid.rows()).map(|row| grid.row_text(row)).collect(),
        }
    }

    /// Render the grid as plain text, one line per row, with trailing empty
    /// rows dropped
    pub fn to_text(&self) -> String {
        let last = self
            .text
            .iter()
            .rposition(|line| !line.is_empty())
            .map(|i| i + 1)
            .unwrap_or(0);
        self.text[..last].join("\n")
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a snapshot from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
