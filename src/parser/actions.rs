//! Decoded escape sequences
//!
//! These types carry the result of decoding one `ESC`-introduced run of
//! bytes. They live only for a single dispatch step.

use serde::{Deserialize, Serialize};

/// Escape byte
pub const ESC: u8 = 0x1B;
/// Bell, the OSC terminator
pub const BEL: u8 = 0x07;

/// Sequence family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequenceKind {
    /// Control Sequence Introducer: `ESC [`
    Csi,
    /// Operating System Command: `ESC ]`
    Osc,
}

/// A recognized escape sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscapeCommand {
    pub kind: SequenceKind,
    /// Final letter for CSI, `BEL` for OSC
    pub final_byte: u8,
    /// First two numeric parameters; a missing parameter is 0
    pub params: [u32; 2],
    /// Bytes consumed, counting the leading `ESC`
    pub len: usize,
}

impl EscapeCommand {
    /// Get parameter at index, or 0 when absent
    pub fn param(&self, index: usize) -> u32 {
        self.params.get(index).copied().unwrap_or(0)
    }

    /// Get parameter at index, substituting `default` for 0
    pub fn param_or_default(&self, index: usize, default: u32) -> u32 {
        match self.param(index) {
            0 => default,
            n => n,
        }
    }
}

/// Outcome of decoding a byte window that starts at `ESC`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decoded {
    /// A complete, recognized sequence
    Command(EscapeCommand),
    /// The window ended before the sequence was resolved
    Incomplete,
    /// Not a recognized sequence; the `ESC` is a literal byte
    Invalid,
}

impl Decoded {
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Decoded::Incomplete)
    }

    pub fn command(self) -> Option<EscapeCommand> {
        match self {
            Decoded::Command(cmd) => Some(cmd),
            _ => None,
        }
    }
}
