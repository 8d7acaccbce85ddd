//! Golden tests for the stream interpreter
//!
//! Each test feeds a byte sequence captured from (or modelled on) real shell
//! output and compares the resulting grid snapshot against the expected
//! state. The chunked variants check that splitting the stream at arbitrary
//! points does not change the result.

use gridterm::core::Snapshot;
use gridterm::Terminal;

/// Helper to run a golden test
fn run_golden_test(input: &[u8], cols: usize, rows: usize) -> Snapshot {
    let mut terminal = Terminal::new(cols, rows);
    terminal.process(input);
    terminal.finish();
    Snapshot::capture(terminal.grid(), &terminal.cursor())
}

/// Helper to run a golden test with chunked input (tests streaming)
fn run_golden_test_chunked(input: &[u8], cols: usize, rows: usize, chunk_size: usize) -> Snapshot {
    let mut terminal = Terminal::new(cols, rows);
    for chunk in input.chunks(chunk_size) {
        terminal.process(chunk);
    }
    terminal.finish();
    Snapshot::capture(terminal.grid(), &terminal.cursor())
}

fn assert_chunking_transparent(input: &[u8], cols: usize, rows: usize) {
    let whole = run_golden_test(input, cols, rows);
    for chunk_size in 1..=input.len().min(16) {
        assert_eq!(
            run_golden_test_chunked(input, cols, rows, chunk_size),
            whole,
            "chunk size {}",
            chunk_size
        );
    }
}

// ============================================================================
// Printing and control bytes
// ============================================================================

#[test]
fn test_simple_text() {
    let snapshot = run_golden_test(b"Hello, World!", 80, 20);

    assert_eq!(snapshot.cursor_row, 0);
    assert_eq!(snapshot.cursor_col, 13);
    assert_eq!(snapshot.text[0], "Hello, World!");
}

#[test]
fn test_newline_returns_to_column_zero() {
    let snapshot = run_golden_test(b"Line 1\nLine 2\nLine 3", 80, 20);

    assert_eq!(snapshot.text[0], "Line 1");
    assert_eq!(snapshot.text[1], "Line 2");
    assert_eq!(snapshot.text[2], "Line 3");
    assert_eq!((snapshot.cursor_col, snapshot.cursor_row), (6, 2));
}

#[test]
fn test_crlf_shell_output() {
    let snapshot = run_golden_test(b"total 0\r\n$ ", 80, 20);

    assert_eq!(snapshot.to_text(), "total 0\n$");
    assert_eq!((snapshot.cursor_col, snapshot.cursor_row), (2, 1));
}

#[test]
fn test_carriage_return_overwrites() {
    let snapshot = run_golden_test(b"Hello\rJ", 80, 20);

    assert_eq!(snapshot.text[0], "Jello");
    assert_eq!(snapshot.cursor_col, 1);
}

#[test]
fn test_backspace_erases_previous_cell() {
    let snapshot = run_golden_test(b"abc\x08", 80, 20);

    assert_eq!(snapshot.text[0], "ab");
    assert_eq!(snapshot.cursor_col, 2);
}

#[test]
fn test_backspace_at_column_zero() {
    let snapshot = run_golden_test(b"x\r\x08", 80, 20);

    assert_eq!(snapshot.text[0], "");
    assert_eq!((snapshot.cursor_col, snapshot.cursor_row), (0, 0));
}

#[test]
fn test_tab_stops() {
    let snapshot = run_golden_test(b"a\tb\tc", 80, 20);

    assert_eq!(snapshot.text[0], "a       b       c");
    assert_eq!(snapshot.cursor_col, 17);
}

#[test]
fn test_tab_clamps_at_right_edge() {
    let snapshot = run_golden_test(b"\x1b[1;78H\t", 80, 20);
    assert_eq!(snapshot.cursor_col, 79);
}

#[test]
fn test_bell_is_not_placed() {
    let snapshot = run_golden_test(b"a\x07b", 80, 20);

    assert_eq!(snapshot.text[0], "ab");
}

#[test]
fn test_control_chars_displayed_when_enabled() {
    let mut terminal = Terminal::new(80, 20);
    terminal.set_display_control_chars(true);
    terminal.process(b"a\x07b\x7f");

    assert_eq!(terminal.grid().row(0)[..4], [b'a', 0x07, b'b', 0x7f]);
    assert_eq!(terminal.cursor().col, 4);
}

// ============================================================================
// Wrapping and scrolling
// ============================================================================

#[test]
fn test_line_wrap() {
    let snapshot = run_golden_test(b"ABCDEFGHIJ", 5, 3);

    assert_eq!(snapshot.text[0], "ABCDE");
    assert_eq!(snapshot.text[1], "FGHIJ");
    assert_eq!((snapshot.cursor_col, snapshot.cursor_row), (0, 2));
}

#[test]
fn test_wrap_at_bottom_right_scrolls() {
    let snapshot = run_golden_test(b"\x1b[20;80HZ", 80, 20);

    assert_eq!(snapshot.text[18], format!("{:>80}", "Z"));
    assert_eq!(snapshot.text[19], "");
    assert_eq!((snapshot.cursor_col, snapshot.cursor_row), (0, 19));
}

#[test]
fn test_linefeed_scrolls_on_last_row() {
    let mut input = Vec::new();
    for i in 0..25 {
        input.extend_from_slice(format!("line {}\n", i).as_bytes());
    }
    let snapshot = run_golden_test(&input, 80, 20);

    assert_eq!(snapshot.text[0], "line 6");
    assert_eq!(snapshot.text[18], "line 24");
    assert_eq!(snapshot.text[19], "");
    assert_eq!((snapshot.cursor_col, snapshot.cursor_row), (0, 19));
}

#[test]
fn test_scroll_up_sequence() {
    let snapshot = run_golden_test(b"one\ntwo\nthree\x1b[2S", 80, 20);

    assert_eq!(snapshot.text[0], "three");
    assert_eq!(snapshot.text[1], "");
    // Scrolling leaves the cursor where it was
    assert_eq!((snapshot.cursor_col, snapshot.cursor_row), (5, 2));
}

#[test]
fn test_scroll_up_default_is_one() {
    let snapshot = run_golden_test(b"one\ntwo\x1b[S", 80, 20);

    assert_eq!(snapshot.text[0], "two");
}

// ============================================================================
// CSI cursor motion
// ============================================================================

#[test]
fn test_csi_cursor_position() {
    let snapshot = run_golden_test(b"\x1b[5;10HX", 80, 20);

    assert_eq!(snapshot.text[4], "         X");
    assert_eq!((snapshot.cursor_col, snapshot.cursor_row), (10, 4));
}

#[test]
fn test_csi_cursor_position_defaults_home() {
    let snapshot = run_golden_test(b"abc\ndef\x1b[H", 80, 20);
    assert_eq!((snapshot.cursor_col, snapshot.cursor_row), (0, 0));
}

#[test]
fn test_csi_cursor_position_clamped() {
    let snapshot = run_golden_test(b"\x1b[500;500H", 80, 20);
    assert_eq!((snapshot.cursor_col, snapshot.cursor_row), (79, 19));
}

#[test]
fn test_csi_relative_motion() {
    let snapshot = run_golden_test(b"\x1b[10;10H\x1b[3A\x1b[2B\x1b[5C\x1b[D", 80, 20);
    assert_eq!((snapshot.cursor_col, snapshot.cursor_row), (13, 8));
}

#[test]
fn test_csi_motion_saturates_at_edges() {
    let snapshot = run_golden_test(b"\x1b[100A\x1b[100D", 80, 20);
    assert_eq!((snapshot.cursor_col, snapshot.cursor_row), (0, 0));

    let snapshot = run_golden_test(b"\x1b[100B\x1b[100C", 80, 20);
    assert_eq!((snapshot.cursor_col, snapshot.cursor_row), (79, 19));
}

#[test]
fn test_csi_next_and_previous_line() {
    let snapshot = run_golden_test(b"\x1b[5;10H\x1b[2E", 80, 20);
    assert_eq!((snapshot.cursor_col, snapshot.cursor_row), (0, 6));

    let snapshot = run_golden_test(b"\x1b[5;10H\x1b[F", 80, 20);
    assert_eq!((snapshot.cursor_col, snapshot.cursor_row), (0, 3));
}

#[test]
fn test_csi_column_absolute() {
    let snapshot = run_golden_test(b"\x1b[3;3H\x1b[12G", 80, 20);
    assert_eq!((snapshot.cursor_col, snapshot.cursor_row), (12, 2));

    let snapshot = run_golden_test(b"\x1b[3;3H\x1b[999G", 80, 20);
    assert_eq!(snapshot.cursor_col, 79);
}

// ============================================================================
// CSI erase
// ============================================================================

fn filled(cols: usize, rows: usize) -> Vec<u8> {
    let mut input = Vec::new();
    for row in 0..rows {
        let c = b'a' + row as u8;
        input.extend(std::iter::repeat(c).take(cols));
    }
    input
}

#[test]
fn test_erase_to_end_of_screen() {
    let mut input = filled(5, 3);
    input.extend_from_slice(b"\x1b[2;3H\x1b[J");
    let snapshot = run_golden_test(&input, 5, 4);

    assert_eq!(snapshot.text[0], "aaaaa");
    assert_eq!(snapshot.text[1], "bb");
    assert_eq!(snapshot.text[2], "");
    assert_eq!((snapshot.cursor_col, snapshot.cursor_row), (2, 1));
}

#[test]
fn test_erase_from_start_of_screen() {
    let mut input = filled(5, 3);
    input.extend_from_slice(b"\x1b[2;3H\x1b[1J");
    let snapshot = run_golden_test(&input, 5, 4);

    assert_eq!(snapshot.text[0], "");
    assert_eq!(snapshot.text[1], "   bb");
    assert_eq!(snapshot.text[2], "ccccc");
}

#[test]
fn test_erase_whole_screen() {
    let mut input = filled(5, 3);
    input.extend_from_slice(b"\x1b[2;3H\x1b[2J");
    let snapshot = run_golden_test(&input, 5, 4);

    assert_eq!(snapshot.to_text(), "");
    // Erasing never moves the cursor
    assert_eq!((snapshot.cursor_col, snapshot.cursor_row), (2, 1));
}

#[test]
fn test_erase_in_line_modes() {
    let snapshot = run_golden_test(b"Hello World\x1b[1;6H\x1b[K", 80, 20);
    assert_eq!(snapshot.text[0], "Hello");

    let snapshot = run_golden_test(b"Hello World\x1b[1;6H\x1b[1K", 80, 20);
    assert_eq!(snapshot.text[0], "      World");

    let snapshot = run_golden_test(b"Hello World\x1b[1;6H\x1b[2K", 80, 20);
    assert_eq!(snapshot.text[0], "");
    assert_eq!(snapshot.cursor_col, 5);
}

#[test]
fn test_clear_and_redraw_prompt() {
    // What `clear` followed by a fresh prompt looks like on the wire
    let snapshot = run_golden_test(b"old output\n\x1b[H\x1b[2J$ ", 80, 20);

    assert_eq!(snapshot.to_text(), "$");
    assert_eq!((snapshot.cursor_col, snapshot.cursor_row), (2, 0));
}

// ============================================================================
// OSC, malformed and unknown sequences
// ============================================================================

#[test]
fn test_osc_title_consumed() {
    let snapshot = run_golden_test(b"\x1b]0;user@host: ~\x07$ ", 80, 20);

    assert_eq!(snapshot.text[0], "$");
    assert_eq!(snapshot.cursor_col, 2);
}

#[test]
fn test_unterminated_osc_swallows_rest() {
    let snapshot = run_golden_test(b"ab\x1b]0;title without end", 80, 20);

    assert_eq!(snapshot.to_text(), "ab");
    assert_eq!(snapshot.cursor_col, 2);
}

#[test]
fn test_unknown_csi_final_ignored() {
    let snapshot = run_golden_test(b"a\x1b[31mb\x1b[?25lc", 80, 20);

    assert_eq!(snapshot.text[0], "abc");
}

#[test]
fn test_malformed_csi_prints_literally() {
    // ESC is dropped as a control byte; the rest of the bytes are text
    let snapshot = run_golden_test(b"\x1b[1;2;3H", 80, 20);
    assert_eq!(snapshot.text[0], "[1;2;3H");

    let snapshot = run_golden_test(b"\x1b(B", 80, 20);
    assert_eq!(snapshot.text[0], "(B");
}

#[test]
fn test_truncated_csi_at_end_of_stream() {
    let snapshot = run_golden_test(b"x\x1b[12", 80, 20);
    assert_eq!(snapshot.text[0], "x[12");
}

// ============================================================================
// Chunk boundaries
// ============================================================================

#[test]
fn test_chunk_boundary_cursor_position() {
    let snapshot = run_golden_test_chunked(b"ab\x1b[3;4Hq", 80, 20, 1);

    assert_eq!(snapshot.text[0], "ab");
    assert_eq!(snapshot.text[2], "   q");
}

#[test]
fn test_chunking_transparent_for_shell_session() {
    let input = b"\x1b]0;~\x07$ ls\r\nfoo  bar\r\n\x1b[1;5H\x1b[K\x1b[2S\tX\x08\x1b[10G!";
    assert_chunking_transparent(input, 80, 20);
}

#[test]
fn test_chunking_transparent_for_malformed_input() {
    let input = b"\x1b[1;2;3Hz\x1b(B\x1b]unterminated";
    assert_chunking_transparent(input, 20, 4);
}

#[test]
fn test_snapshot_json_shape() {
    let snapshot = run_golden_test(b"hi", 4, 2);
    let json: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();

    assert_eq!(json["cols"], 4);
    assert_eq!(json["rows"], 2);
    assert_eq!(json["cursor_col"], 2);
    assert_eq!(json["text"][0], "hi");
}
