//! Terminal Session
//!
//! Owns everything one emulator run needs: the interpreter state, the
//! channel to the shell, and the input/output staging buffers. One call to
//! [`TerminalSession::frame`] is one dispatch cycle:
//!
//! 1. collect pending keystrokes into the input accumulator
//! 2. flush the accumulator to the shell
//! 3. drain every byte the shell has produced into the grid
//! 4. ask the renderer to redraw if step 3 changed anything

use tracing::{debug, trace, warn};

use crate::core::{Cursor, Grid};
use crate::input::{InputAccumulator, Key};
use crate::pty::{Channel, PtyError};
use crate::terminal::Terminal;

/// Size of a single read from the shell, in bytes
pub const OUTPUT_CAPACITY: usize = 100;

/// Draws the grid. Called only on frames where the grid changed.
pub trait Renderer {
    fn render(&mut self, grid: &Grid, cursor: Cursor) -> std::io::Result<()>;
}

/// Errors ending a dispatch cycle
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Channel(#[from] PtyError),

    #[error("Render failed: {0}")]
    Render(#[from] std::io::Error),
}

/// A running emulator: interpreter + channel + accumulators
pub struct TerminalSession<C> {
    terminal: Terminal,
    channel: C,
    input: InputAccumulator,
    output: [u8; OUTPUT_CAPACITY],
}

impl<C: Channel> TerminalSession<C> {
    pub fn new(terminal: Terminal, channel: C) -> Self {
        Self {
            terminal,
            channel,
            input: InputAccumulator::default(),
            output: [0; OUTPUT_CAPACITY],
        }
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Bytes staged for the shell
    pub fn pending_input(&self) -> &[u8] {
        self.input.as_bytes()
    }

    /// Start a collection cycle with this frame's key presses
    pub fn collect_input<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = Key>,
    {
        self.input.clear();
        for key in keys {
            self.input.push_key(key);
        }
        if self.input.dropped() > 0 {
            debug!(dropped = self.input.dropped(), "Keystrokes dropped this cycle");
        }
    }

    /// Start a collection cycle with raw, already-encoded input bytes
    pub fn collect_raw_input(&mut self, bytes: &[u8]) {
        self.input.clear();
        self.input.push(bytes);
    }

    /// Write the staged input in one best-effort attempt. Bytes the channel
    /// does not accept, including all of them when the write fails, are
    /// discarded. Returns the number of bytes written.
    pub fn flush_input(&mut self) -> usize {
        if self.input.is_empty() {
            return 0;
        }
        let written = match self.channel.write(self.input.as_bytes()) {
            Ok(n) => n,
            Err(e) => {
                warn!(discarded = self.input.len(), "Write to shell failed: {}", e);
                0
            }
        };
        if 0 < written && written < self.input.len() {
            debug!(
                written,
                discarded = self.input.len() - written,
                "Short write to shell"
            );
        }
        self.input.clear();
        written
    }

    /// Read and interpret everything the shell has produced so far.
    /// Returns the number of bytes interpreted.
    pub fn drain_output(&mut self) -> Result<usize, PtyError> {
        let mut total = 0;
        loop {
            let n = match self.channel.read(&mut self.output) {
                Ok(n) => n,
                Err(e) => {
                    warn!(total, "Read from shell failed: {}", e);
                    return Err(e);
                }
            };
            if n == 0 {
                break;
            }
            trace!(n, "Read from shell");
            self.terminal.process(&self.output[..n]);
            total += n;
        }
        Ok(total)
    }

    /// Run one dispatch cycle. Returns whether the renderer was invoked.
    pub fn frame<I, R>(&mut self, keys: I, renderer: &mut R) -> Result<bool, SessionError>
    where
        I: IntoIterator<Item = Key>,
        R: Renderer + ?Sized,
    {
        self.collect_input(keys);
        self.finish_frame(renderer)
    }

    /// Steps 2-4 of a cycle, for callers that staged input themselves
    pub fn finish_frame<R>(&mut self, renderer: &mut R) -> Result<bool, SessionError>
    where
        R: Renderer + ?Sized,
    {
        self.flush_input();
        self.drain_output()?;
        if self.terminal.take_redraw() {
            renderer.render(self.terminal.grid(), self.terminal.cursor())?;
            return Ok(true);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// In-memory channel: scripted reads, recorded writes
    #[derive(Default)]
    struct MockChannel {
        reads: VecDeque<Vec<u8>>,
        written: Vec<u8>,
        write_limit: Option<usize>,
        read_sizes: Vec<usize>,
        fail_reads: bool,
        fail_writes: bool,
    }

    impl Channel for MockChannel {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, PtyError> {
            self.read_sizes.push(buf.len());
            if self.fail_reads && self.reads.is_empty() {
                return Err(PtyError::Read(nix::errno::Errno::EBADF));
            }
            match self.reads.pop_front() {
                Some(chunk) => {
                    let n = chunk.len().min(buf.len());
                    buf[..n].copy_from_slice(&chunk[..n]);
                    if n < chunk.len() {
                        self.reads.push_front(chunk[n..].to_vec());
                    }
                    Ok(n)
                }
                None => Ok(0),
            }
        }

        fn write(&mut self, data: &[u8]) -> Result<usize, PtyError> {
            if self.fail_writes {
                return Err(PtyError::Write(nix::errno::Errno::EIO));
            }
            let n = self.write_limit.map_or(data.len(), |l| l.min(data.len()));
            self.written.extend_from_slice(&data[..n]);
            Ok(n)
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        frames: Vec<(String, Cursor)>,
    }

    impl Renderer for RecordingRenderer {
        fn render(&mut self, grid: &Grid, cursor: Cursor) -> std::io::Result<()> {
            self.frames.push((grid.row_text(0), cursor));
            Ok(())
        }
    }

    fn session(reads: &[&[u8]]) -> TerminalSession<MockChannel> {
        let channel = MockChannel {
            reads: reads.iter().map(|r| r.to_vec()).collect(),
            ..Default::default()
        };
        TerminalSession::new(Terminal::new(80, 20), channel)
    }

    #[test]
    fn test_frame_order_and_redraw() {
        let mut session = session(&[b"$ "]);
        let mut renderer = RecordingRenderer::default();

        let drawn = session
            .frame([Key::Char('l'), Key::Char('s'), Key::Enter], &mut renderer)
            .unwrap();

        assert!(drawn);
        assert_eq!(session.channel().written, b"ls\n");
        assert!(session.pending_input().is_empty());
        assert_eq!(renderer.frames, vec![("$".to_string(), Cursor { col: 2, row: 0 })]);

        // Nothing new from the shell: no redraw
        let drawn = session.frame(std::iter::empty(), &mut renderer).unwrap();
        assert!(!drawn);
        assert_eq!(renderer.frames.len(), 1);
    }

    #[test]
    fn test_drain_reads_everything_in_bounded_chunks() {
        let big = vec![b'x'; 250];
        let mut session = session(&[&big[..], b"yz"]);

        let n = session.drain_output().unwrap();

        assert_eq!(n, 252);
        assert!(session.channel().read_sizes.iter().all(|&s| s == OUTPUT_CAPACITY));
        assert_eq!(session.terminal().cursor(), Cursor { col: 12, row: 3 });
    }

    #[test]
    fn test_drain_resumes_split_sequence() {
        let mut session = session(&[b"ab\x1b[", b"3;4", b"Hq"]);
        session.channel_mut().reads.insert(1, Vec::new());

        // The empty read ends the first drain mid-sequence
        session.drain_output().unwrap();
        assert_eq!(session.terminal().pending(), b"\x1b[");

        session.drain_output().unwrap();
        assert_eq!(session.terminal().grid().read_cell(3, 2), b'q');
        assert_eq!(session.terminal().grid().row_text(0), "ab");
    }

    #[test]
    fn test_short_write_discards_rest() {
        let mut session = session(&[]);
        session.channel_mut().write_limit = Some(2);

        session.collect_raw_input(b"hello");
        assert_eq!(session.flush_input(), 2);

        assert_eq!(session.channel().written, b"he");
        assert!(session.pending_input().is_empty());
    }

    #[test]
    fn test_collect_input_bounded() {
        let mut session = session(&[]);
        session.collect_input(std::iter::repeat(Key::Up).take(40));

        // 33 whole arrows plus one partial sequence fit in 100 bytes
        assert_eq!(session.pending_input().len(), 100);
    }

    #[test]
    fn test_read_error_ends_frame() {
        let mut session = session(&[b"ok"]);
        session.channel_mut().fail_reads = true;
        let mut renderer = RecordingRenderer::default();

        let err = session.frame(std::iter::empty(), &mut renderer).unwrap_err();

        assert!(matches!(err, SessionError::Channel(PtyError::Read(_))));
        // Bytes read before the failure were still interpreted
        assert_eq!(session.terminal().grid().row_text(0), "ok");
        assert!(renderer.frames.is_empty());
    }

    #[test]
    fn test_failed_write_discards_input_and_still_drains() {
        let mut session = session(&[b"$ "]);
        session.channel_mut().fail_writes = true;
        let mut renderer = RecordingRenderer::default();

        let drawn = session.frame([Key::Char('x')], &mut renderer).unwrap();

        assert!(drawn);
        assert!(session.pending_input().is_empty());
        assert!(session.channel().written.is_empty());
        assert_eq!(renderer.frames, vec![("$".to_string(), Cursor { col: 2, row: 0 })]);
    }
}
