//! Terminal Core Module
//!
//! Platform-independent terminal state. This module contains:
//! - The fixed-size byte grid and its scroll/erase operations
//! - Cursor position and clamping
//! - Deterministic snapshot generation
//!
//! The core is deterministic: given the same sequence of mutations, it
//! always produces the same state.

mod cursor;
mod grid;
mod snapshot;

pub use cursor::Cursor;
pub use grid::{Grid, BLANK};
pub use snapshot::Snapshot;
