//! Input Encoding Module
//!
//! Translates key presses into the bytes the shell expects, and stages them
//! in a bounded accumulator until the next flush.
//!
//! # Keyboard Encoding
//!
//! - Printable characters are sent UTF-8 encoded
//! - Tab, Backspace and Enter map to `\t`, `\b` and `\n`
//! - Ctrl+letter maps to the letter's code minus 64
//! - Arrow keys map to `ESC [ A|B|C|D`

use tracing::debug;

/// Capacity of the input accumulator, in bytes
pub const INPUT_CAPACITY: usize = 100;

/// A key press delivered by the key translator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character
    Char(char),
    Tab,
    Backspace,
    Enter,
    /// Ctrl held with a letter key (case-insensitive)
    Ctrl(char),
    Up,
    Down,
    Right,
    Left,
}

/// Encode a key press into terminal input bytes
pub fn encode_key(key: Key) -> Vec<u8> {
    match key {
        Key::Char(c) => {
            let mut buf = [0u8; 4];
            c.encode_utf8(&mut buf).as_bytes().to_vec()
        }
        Key::Tab => vec![b'\t'],
        Key::Backspace => vec![0x08],
        Key::Enter => vec![b'\n'],
        Key::Ctrl(c) if c.is_ascii_alphabetic() => vec![c.to_ascii_uppercase() as u8 - 64],
        Key::Ctrl(_) => Vec::new(),
        Key::Up => encode_cursor_key(b'A'),
        Key::Down => encode_cursor_key(b'B'),
        Key::Right => encode_cursor_key(b'C'),
        Key::Left => encode_cursor_key(b'D'),
    }
}

fn encode_cursor_key(final_byte: u8) -> Vec<u8> {
    vec![0x1B, b'[', final_byte]
}

/// Bounded staging buffer for encoded keystrokes
///
/// Bytes pushed beyond the capacity are dropped and counted.
#[derive(Debug, Clone)]
pub struct InputAccumulator {
    buf: Vec<u8>,
    capacity: usize,
    dropped: usize,
}

impl Default for InputAccumulator {
    fn default() -> Self {
        Self::new(INPUT_CAPACITY)
    }
}

impl InputAccumulator {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Append bytes, dropping whatever does not fit
    pub fn push(&mut self, bytes: &[u8]) {
        let room = self.capacity - self.buf.len();
        let take = bytes.len().min(room);
        self.buf.extend_from_slice(&bytes[..take]);
        if take < bytes.len() {
            let lost = bytes.len() - take;
            self.dropped += lost;
            debug!(lost, "Input accumulator full, dropping bytes");
        }
    }

    /// Encode and append a key press
    pub fn push_key(&mut self, key: Key) {
        self.push(&encode_key(key));
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes dropped since the last clear
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Empty the buffer for the next collection cycle
    pub fn clear(&mut self) {
        self.buf.clear();
        self.dropped = 0;
    }
}
