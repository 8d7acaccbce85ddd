//! Terminal Stream Interpreter
//!
//! Consumes the byte stream produced by the shell and applies it to the
//! grid and cursor: literal characters are placed, `\n \r \b \t` move the
//! cursor, and `ESC`-introduced runs go through the decoder.
//!
//! A sequence split across two reads is not lost. The unresolved tail is
//! kept and decoded again once more bytes arrive, so feeding a stream in
//! arbitrary chunks produces the same grid as feeding it whole.

use tracing::debug;

use crate::core::{Cursor, Grid, BLANK};
use crate::parser::{decode, decode_window, Decoded, EscapeCommand, SequenceKind, ESC};

/// Upper bound on an escape tail carried between reads. A longer tail is
/// resolved as if the stream ended there.
pub const MAX_PENDING_ESCAPE: usize = 4096;

const TAB_WIDTH: usize = 8;

/// Whether a byte is a C0 control or DEL
pub fn is_control(byte: u8) -> bool {
    byte <= 0x1F || byte == 0x7F
}

/// Terminal state driven by shell output
#[derive(Debug, Clone)]
pub struct Terminal {
    grid: Grid,
    cursor: Cursor,
    /// Place control bytes into the grid instead of dropping them
    display_control_chars: bool,
    /// Unresolved escape tail from the previous call
    pending: Vec<u8>,
    /// Set by every non-empty `process` call, cleared by `take_redraw`
    redraw: bool,
}

impl Terminal {
    /// Create a terminal with a blank grid of the given dimensions
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            grid: Grid::new(cols, rows),
            cursor: Cursor::new(),
            display_control_chars: false,
            pending: Vec::new(),
            redraw: true,
        }
    }

    /// Enable or disable placing raw control characters into the grid
    pub fn set_display_control_chars(&mut self, enabled: bool) {
        self.display_control_chars = enabled;
    }

    pub fn display_control_chars(&self) -> bool {
        self.display_control_chars
    }

    /// Get a reference to the grid
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Get the cursor position
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Bytes held back waiting for the rest of an escape sequence
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Returns whether anything was processed since the last call, and
    /// clears the flag
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    /// Process output bytes from the shell
    pub fn process(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.redraw = true;

        if self.pending.is_empty() {
            let consumed = self.run(data, false);
            self.pending.extend_from_slice(&data[consumed..]);
        } else {
            let mut buf = std::mem::take(&mut self.pending);
            buf.extend_from_slice(data);
            let consumed = self.run(&buf, false);
            buf.drain(..consumed);
            self.pending = buf;
        }
    }

    /// Resolve any held-back escape tail as if the stream ended here
    pub fn finish(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let buf = std::mem::take(&mut self.pending);
        self.run(&buf, true);
        self.redraw = true;
    }

    /// Interpret `bytes`, returning how many were consumed. Anything after
    /// that is an unresolved escape tail.
    fn run(&mut self, bytes: &[u8], at_end: bool) -> usize {
        let mut i = 0;
        while i < bytes.len() {
            let byte = bytes[i];
            match byte {
                b'\n' => self.linefeed(),
                b'\r' => self.cursor.carriage_return(),
                0x08 => self.backspace(),
                b'\t' => self.tab(),
                ESC => {
                    let window = &bytes[i..];
                    let mut decoded = if at_end {
                        decode_window(window)
                    } else {
                        decode(window)
                    };
                    if decoded.is_incomplete() {
                        if window.len() <= MAX_PENDING_ESCAPE {
                            return i;
                        }
                        debug!(len = window.len(), "Escape tail too long, resolving");
                        decoded = decode_window(window);
                    }
                    match decoded {
                        Decoded::Command(cmd) => {
                            self.execute(cmd);
                            i += cmd.len;
                            continue;
                        }
                        _ => self.place(byte),
                    }
                }
                _ => self.place(byte),
            }
            i += 1;
        }
        bytes.len()
    }

    /// Apply a decoded escape sequence
    fn execute(&mut self, cmd: EscapeCommand) {
        if cmd.kind == SequenceKind::Osc {
            debug!(len = cmd.len, "OSC sequence ignored");
            return;
        }

        let cols = self.grid.cols();
        let rows = self.grid.rows();
        let n = cmd.param_or_default(0, 1) as usize;

        match cmd.final_byte {
            b'A' => self.cursor.move_up(n),
            b'B' => self.cursor.move_down(n, rows),
            b'C' => self.cursor.move_right(n, cols),
            b'D' => self.cursor.move_left(n),
            b'E' => {
                // CNL - Cursor Next Line
                self.cursor.carriage_return();
                self.cursor.move_down(n, rows);
            }
            b'F' => {
                // CPL - Cursor Previous Line
                self.cursor.carriage_return();
                self.cursor.move_up(n);
            }
            b'G' => {
                // Column taken as given, 1 when omitted
                self.cursor.set_col(n, cols);
            }
            b'H' => {
                // CUP - 1-based row;col
                let row = cmd.param(0).saturating_sub(1) as usize;
                let col = cmd.param(1).saturating_sub(1) as usize;
                self.cursor.move_to(col, row, cols, rows);
            }
            b'J' => match cmd.param(0) {
                0 => self.grid.erase_to_end_of_screen(self.cursor),
                1 => self.grid.erase_from_start_of_screen(self.cursor),
                2 | 3 => self.grid.erase_screen(),
                mode => debug!(mode, "Unknown erase-in-display mode"),
            },
            b'K' => match cmd.param(0) {
                0 => self.grid.erase_to_end_of_line(self.cursor),
                1 => self.grid.erase_from_start_of_line(self.cursor),
                2 => self.grid.erase_line(self.cursor),
                mode => debug!(mode, "Unknown erase-in-line mode"),
            },
            b'S' => self.grid.scroll_up(n),
            other => {
                debug!(
                    final_byte = %(other as char),
                    params = ?cmd.params,
                    "Unhandled CSI"
                );
            }
        }
    }

    fn linefeed(&mut self) {
        let rows = self.grid.rows();
        if self.cursor.at_last_row(rows) {
            self.grid.scroll_up_by_one();
        } else {
            self.cursor.row += 1;
        }
        self.cursor.col = 0;
    }

    fn backspace(&mut self) {
        let row = self.cursor.row;
        self.grid.write_cell(self.cursor.col.saturating_sub(1), row, BLANK);
        self.cursor.move_left(1);
    }

    fn tab(&mut self) {
        let next = (self.cursor.col / TAB_WIDTH + 1) * TAB_WIDTH;
        self.cursor.set_col(next, self.grid.cols());
    }

    /// Place a byte at the cursor and advance, wrapping and scrolling at
    /// the edges
    fn place(&mut self, byte: u8) {
        if is_control(byte) && !self.display_control_chars {
            return;
        }

        self.grid.write_cell(self.cursor.col, self.cursor.row, byte);

        let cols = self.grid.cols();
        let rows = self.grid.rows();
        if !self.cursor.at_last_col(cols) {
            self.cursor.col += 1;
        } else if self.cursor.at_last_row(rows) {
            self.grid.scroll_up_by_one();
            self.cursor.col = 0;
        } else {
            self.cursor.col = 0;
            self.cursor.row += 1;
        }
    }
}
