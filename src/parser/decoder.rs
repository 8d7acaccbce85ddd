//! Escape Sequence Decoder
//!
//! Classifies the byte window that starts at an `ESC` and parses the two
//! families the terminal understands:
//!
//! - CSI: `ESC [ ?? <digits>? (; <digits>?)? <letter>`
//! - OSC: `ESC ] ... BEL`
//!
//! Decoding is a pure function of the window. A window that ends before the
//! sequence resolves yields [`Decoded::Incomplete`], which lets the caller
//! carry the tail over to the next read.

use super::actions::{Decoded, EscapeCommand, SequenceKind, BEL, ESC};

/// Scanner position inside a CSI body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CsiState {
    Entry,
    FirstParam,
    SecondParam,
}

/// Decode the sequence at the start of `window`
///
/// `window[0]` is expected to be `ESC`; anything else is `Invalid`.
pub fn decode(window: &[u8]) -> Decoded {
    match window {
        [] => Decoded::Invalid,
        [first, ..] if *first != ESC => Decoded::Invalid,
        [_] => Decoded::Incomplete,
        [_, b']', ..] => decode_osc(window),
        [_, b'[', ..] => decode_csi(window),
        _ => Decoded::Invalid,
    }
}

/// Decode with the window treated as final: nothing more will arrive.
///
/// An unterminated OSC consumes the rest of the window; any other
/// unresolved sequence is `Invalid`.
pub fn decode_window(window: &[u8]) -> Decoded {
    match decode(window) {
        Decoded::Incomplete if window.get(1) == Some(&b']') => Decoded::Command(osc(window.len())),
        Decoded::Incomplete => Decoded::Invalid,
        decoded => decoded,
    }
}

fn osc(len: usize) -> EscapeCommand {
    EscapeCommand {
        kind: SequenceKind::Osc,
        final_byte: BEL,
        params: [0, 0],
        len,
    }
}

fn decode_osc(window: &[u8]) -> Decoded {
    match window[2..].iter().position(|&b| b == BEL) {
        Some(offset) => Decoded::Command(osc(offset + 3)),
        None => Decoded::Incomplete,
    }
}

fn decode_csi(window: &[u8]) -> Decoded {
    let mut state = CsiState::Entry;
    let mut params = [0u32; 2];
    let mut i = 2;

    while let Some(&byte) = window.get(i) {
        match (state, byte) {
            (CsiState::Entry, b'?') => {
                state = CsiState::FirstParam;
            }
            (CsiState::Entry | CsiState::FirstParam, b'0'..=b'9') => {
                state = CsiState::FirstParam;
                params[0] = push_digit(params[0], byte);
            }
            (CsiState::SecondParam, b'0'..=b'9') => {
                params[1] = push_digit(params[1], byte);
            }
            (CsiState::Entry | CsiState::FirstParam, b';') => {
                state = CsiState::SecondParam;
            }
            (_, b'a'..=b'z' | b'A'..=b'Z') => {
                return Decoded::Command(EscapeCommand {
                    kind: SequenceKind::Csi,
                    final_byte: byte,
                    params,
                    len: i + 1,
                });
            }
            _ => return Decoded::Invalid,
        }
        i += 1;
    }

    Decoded::Incomplete
}

fn push_digit(value: u32, digit: u8) -> u32 {
    value
        .saturating_mul(10)
        .saturating_add((digit - b'0') as u32)
}
