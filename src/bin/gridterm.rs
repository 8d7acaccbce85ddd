//! Gridterm
//!
//! Runs a shell on a pseudoterminal and draws its grid on the host terminal.
//! The host terminal is switched to raw mode so every keystroke reaches the
//! key translator, and the grid is repainted with ANSI sequences whenever the
//! shell's output changes it.

use std::io::{self, Write};
use std::os::unix::io::RawFd;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::libc;
use nix::sys::termios::{cfmakeraw, tcsetattr, SetArg, Termios};

use gridterm::app::{init_logging, Config};
use gridterm::core::{Cursor, Grid};
use gridterm::input::Key;
use gridterm::pty::{host_termios, set_non_blocking, Pty};
use gridterm::terminal::is_control;
use gridterm::{Renderer, Terminal, TerminalSession};

const STDIN_FD: RawFd = libc::STDIN_FILENO;

fn main() -> ExitCode {
    init_logging("info");

    let config = Config::load_or_default();
    if let Err(e) = config.validate() {
        eprintln!("gridterm: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(status) => {
            tracing::info!("Shell exited with status {}", status);
            ExitCode::SUCCESS
        },
        Err(e) => {
            tracing::error!("Fatal: {}", e);
            eprintln!("gridterm: {}", e);
            ExitCode::FAILURE
        },
    }
}

fn run(config: &Config) -> Result<i32, Box<dyn std::error::Error>> {
    let pty = Pty::spawn_shell(
        &config.shell,
        config.rows,
        config.columns,
        config.cell_width_px,
        config.cell_height_px,
        &config.term,
    )?;
    tracing::info!(
        "Spawned {} (pid {}) on a {}x{} grid",
        config.shell,
        pty.child_pid(),
        config.columns,
        config.rows
    );

    let mut terminal = Terminal::new(config.columns as usize, config.rows as usize);
    terminal.set_display_control_chars(config.display_control_chars);
    let mut session = TerminalSession::new(terminal, pty);

    let _host = HostTerminalGuard::new()?;
    let mut renderer = AnsiRenderer::new(io::stdout());
    let frame_time = Duration::from_secs_f64(1.0 / config.frame_rate as f64);
    let mut stdin_buf = [0u8; 256];
    let mut translator = KeyTranslator::default();

    loop {
        let start = Instant::now();

        let keys = match read_stdin(&mut stdin_buf)? {
            Some(n) => translator.translate(&stdin_buf[..n]),
            None => break,
        };
        session.frame(keys, &mut renderer)?;

        if !session.channel_mut().is_alive() {
            // Pick up whatever the shell printed on its way out
            session.frame(std::iter::empty(), &mut renderer)?;
            break;
        }

        if let Some(rest) = frame_time.checked_sub(start.elapsed()) {
            thread::sleep(rest);
        }
    }

    renderer.restore()?;
    Ok(session.channel_mut().wait()?)
}

/// Read whatever stdin has buffered. `None` means end of input.
fn read_stdin(buf: &mut [u8]) -> Result<Option<usize>, Errno> {
    match nix::unistd::read(STDIN_FD, buf) {
        Ok(0) => Ok(None),
        Ok(n) => Ok(Some(n)),
        Err(Errno::EAGAIN) | Err(Errno::EINTR) => Ok(Some(0)),
        Err(e) => Err(e),
    }
}

/// Turns host keystrokes into key presses across reads
///
/// A UTF-8 character split between two reads is held back until its
/// remaining bytes arrive.
#[derive(Default)]
struct KeyTranslator {
    carry: Vec<u8>,
}

impl KeyTranslator {
    fn translate(&mut self, bytes: &[u8]) -> Vec<Key> {
        self.carry.extend_from_slice(bytes);
        let complete = match std::str::from_utf8(&self.carry) {
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            _ => self.carry.len(),
        };
        let keys = translate_keys(&self.carry[..complete]);
        self.carry.drain(..complete);
        keys
    }
}

/// Turn raw host keystrokes into key presses
fn translate_keys(bytes: &[u8]) -> Vec<Key> {
    let text = String::from_utf8_lossy(bytes);
    let mut keys = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        let key = match c {
            '\r' | '\n' => Key::Enter,
            '\t' => Key::Tab,
            '\u{7f}' | '\u{08}' => Key::Backspace,
            '\u{1b}' if chars.peek() == Some(&'[') => {
                chars.next();
                match chars.next() {
                    Some('A') => Key::Up,
                    Some('B') => Key::Down,
                    Some('C') => Key::Right,
                    Some('D') => Key::Left,
                    // Sequences we have no key for are passed through as typed
                    Some(other) => {
                        keys.push(Key::Char('\u{1b}'));
                        keys.push(Key::Char('['));
                        Key::Char(other)
                    },
                    None => {
                        keys.push(Key::Char('\u{1b}'));
                        Key::Char('[')
                    },
                }
            },
            '\u{01}'..='\u{1a}' => Key::Ctrl((b'a' + c as u8 - 1) as char),
            c => Key::Char(c),
        };
        keys.push(key);
    }

    keys
}

/// Puts stdin into raw, non-blocking mode and restores it on drop
struct HostTerminalGuard {
    original: Option<Termios>,
    flags: OFlag,
}

impl HostTerminalGuard {
    fn new() -> io::Result<Self> {
        let flags = fcntl(STDIN_FD, FcntlArg::F_GETFL).map_err(io::Error::from)?;
        let flags = OFlag::from_bits_truncate(flags);

        let original = host_termios();
        if let Some(original) = &original {
            let mut raw = original.clone();
            cfmakeraw(&mut raw);
            tcsetattr(io::stdin(), SetArg::TCSANOW, &raw).map_err(io::Error::from)?;
        }

        let guard = Self { original, flags };
        set_non_blocking(STDIN_FD).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(guard)
    }
}

impl Drop for HostTerminalGuard {
    fn drop(&mut self) {
        let _ = fcntl(STDIN_FD, FcntlArg::F_SETFL(self.flags));
        if let Some(original) = &self.original {
            let _ = tcsetattr(io::stdin(), SetArg::TCSANOW, original);
        }
    }
}

/// Paints the grid onto the host terminal with ANSI sequences
struct AnsiRenderer<W: Write> {
    out: W,
    frame: Vec<u8>,
    started: bool,
}

impl<W: Write> AnsiRenderer<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            frame: Vec::new(),
            started: false,
        }
    }

    /// Clear the screen and show the host cursor again
    fn restore(&mut self) -> io::Result<()> {
        if self.started {
            self.out.write_all(b"\x1b[0m\x1b[2J\x1b[H\x1b[?25h")?;
            self.out.flush()?;
        }
        Ok(())
    }
}

impl<W: Write> Renderer for AnsiRenderer<W> {
    fn render(&mut self, grid: &Grid, cursor: Cursor) -> io::Result<()> {
        self.frame.clear();
        if !self.started {
            self.frame.extend_from_slice(b"\x1b[?25l\x1b[2J");
            self.started = true;
        }
        self.frame.extend_from_slice(b"\x1b[H");

        for (row, cells) in grid.iter_rows().enumerate() {
            if row > 0 {
                self.frame.extend_from_slice(b"\r\n");
            }
            for (col, &code) in cells.iter().enumerate() {
                let is_cursor = cursor.row == row && cursor.col == col;
                if is_cursor {
                    self.frame.extend_from_slice(b"\x1b[7m");
                }
                if is_control(code) {
                    // Control codes show as their caret letter, dimmed
                    self.frame.extend_from_slice(b"\x1b[2m");
                    self.frame.push(code ^ 0x40);
                    self.frame.extend_from_slice(b"\x1b[22m");
                } else if code.is_ascii() {
                    self.frame.push(code);
                } else {
                    self.frame.push(b'?');
                }
                if is_cursor {
                    self.frame.extend_from_slice(b"\x1b[27m");
                }
            }
        }

        self.out.write_all(&self.frame)?;
        self.out.flush()
    }
}
