//! Gridterm Terminal Emulator Library
//!
//! A small terminal emulator that drives a shell over a pseudoterminal and
//! keeps its output in a fixed grid of byte cells.
//!
//! - `core`: Grid, cursor, snapshots
//! - `parser`: CSI/OSC escape sequence decoder
//! - `terminal`: Stream interpreter applying shell output to the grid
//! - `input`: Key encoding and the bounded input accumulator
//! - `pty`: Unix PTY management
//! - `session`: Per-frame dispatch cycle tying the pieces together
//! - `app`: Configuration and logging setup

pub mod app;
pub mod core;
pub mod input;
pub mod parser;
pub mod pty;
pub mod session;
pub mod terminal;

pub use session::{Renderer, SessionError, TerminalSession};
pub use terminal::Terminal;
