//! Terminal escape sequence decoder
//!
//! Turns an `ESC`-prefixed byte window into a structured command.
//! Only the CSI and OSC families are recognized.

mod actions;
mod decoder;

pub use actions::{Decoded, EscapeCommand, SequenceKind, BEL, ESC};
pub use decoder::{decode, decode_window};
