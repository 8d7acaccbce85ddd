//! Unix PTY implementation
//!
//! Implements PTY creation and child process management using POSIX APIs.

use std::convert::Infallible;
use std::ffi::CString;
use std::io;
use std::os::fd::BorrowedFd;
use std::os::unix::io::{AsRawFd, RawFd};

use nix::errno::Errno;
use nix::fcntl::{fcntl, open, FcntlArg, OFlag};
use nix::libc::{self, STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO};
use nix::poll::{poll, PollFd, PollFlags};
use nix::pty::{grantpt, posix_openpt, unlockpt, PtyMaster};
use nix::sys::stat::Mode;
use nix::sys::termios::{tcgetattr, tcsetattr, SetArg, Termios};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{close, dup2, execvp, fork, isatty, read, setsid, write, ForkResult, Pid};
use tracing::debug;

use super::{Channel, PtyError, PtyResult, WindowSize};

/// A pseudoterminal with a spawned child process
pub struct Pty {
    /// The PTY master file descriptor
    master: PtyMaster,
    /// The child process ID
    child_pid: Pid,
    /// Whether the child is still running
    child_alive: bool,
    /// How the child ended, once it has been reaped
    exit_status: Option<WaitStatus>,
}

impl Pty {
    /// Spawn `shell` on a new PTY
    ///
    /// The child gets the host terminal's line-discipline settings when
    /// stdin is a terminal, the given window size, and `TERM=term`. The
    /// master side is non-blocking.
    pub fn spawn(shell: &str, args: &[&str], size: WindowSize, term: &str) -> PtyResult<Self> {
        let shell = CString::new(shell)?;
        let mut argv: Vec<CString> = Vec::with_capacity(args.len() + 1);
        argv.push(shell.clone());
        for arg in args {
            argv.push(CString::new(*arg)?);
        }
        let termios = host_termios();

        // Open PTY master
        let master = posix_openpt(OFlag::O_RDWR | OFlag::O_NOCTTY).map_err(PtyError::OpenMaster)?;
        grantpt(&master).map_err(PtyError::GrantPty)?;
        unlockpt(&master).map_err(PtyError::UnlockPty)?;

        let slave_name = slave_name(&master)?;

        set_window_size(master.as_raw_fd(), size)?;

        // SAFETY: the child only sets up its descriptors and execs
        match unsafe { fork() }.map_err(PtyError::Fork)? {
            ForkResult::Child => {
                drop(master);
                let err = match exec_child(&slave_name, &shell, &argv, term, termios.as_ref()) {
                    Err(err) => err,
                    Ok(never) => match never {},
                };
                eprintln!("gridterm: {}", err);
                // SAFETY: terminate the forked child without running the
                // parent's destructors
                unsafe { libc::_exit(1) }
            },
            ForkResult::Parent { child } => {
                set_non_blocking(master.as_raw_fd())?;
                debug!(pid = child.as_raw(), "Spawned shell");

                Ok(Pty {
                    master,
                    child_pid: child,
                    child_alive: true,
                    exit_status: None,
                })
            },
        }
    }

    /// Spawn a shell with the given logical size and cell size in pixels
    pub fn spawn_shell(
        shell: &str,
        rows: u16,
        cols: u16,
        cell_width_px: u16,
        cell_height_px: u16,
        term: &str,
    ) -> PtyResult<Self> {
        let size = WindowSize::with_pixels(cols, rows, cell_width_px, cell_height_px);
        Self::spawn(shell, &[], size, term)
    }

    /// Get the raw file descriptor of the PTY master
    pub fn master_fd(&self) -> RawFd {
        self.master.as_raw_fd()
    }

    /// Get the child process ID
    pub fn child_pid(&self) -> Pid {
        self.child_pid
    }

    /// Check if the child process is still running
    pub fn is_alive(&mut self) -> bool {
        if !self.child_alive {
            return false;
        }

        match waitpid(self.child_pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => true,
            Ok(status @ (WaitStatus::Exited(..) | WaitStatus::Signaled(..))) => {
                self.child_alive = false;
                self.exit_status = Some(status);
                false
            },
            Ok(_) => true,
            Err(e) => {
                debug!("waitpid failed: {}", e);
                self.child_alive = false;
                false
            },
        }
    }

    /// Wait for the child process to exit and return its exit code
    ///
    /// A child already reaped by [`Pty::is_alive`] reports the status
    /// collected there.
    pub fn wait(&mut self) -> PtyResult<i32> {
        while self.child_alive {
            match waitpid(self.child_pid, None).map_err(PtyError::Wait)? {
                status @ (WaitStatus::Exited(..) | WaitStatus::Signaled(..)) => {
                    self.child_alive = false;
                    self.exit_status = Some(status);
                },
                _ => continue,
            }
        }

        match self.exit_status {
            Some(WaitStatus::Exited(_, code)) => Ok(code),
            Some(WaitStatus::Signaled(_, signal, _)) => Err(PtyError::ChildSignaled(signal as i32)),
            _ => Ok(0),
        }
    }

    /// Read from the PTY master (non-blocking)
    ///
    /// Returns the number of bytes read, or 0 if no data is available or
    /// the child has closed its side.
    pub fn read(&self, buf: &mut [u8]) -> PtyResult<usize> {
        match read(self.master.as_raw_fd(), buf) {
            Ok(n) => Ok(n),
            // EAGAIN and EWOULDBLOCK are the same value on Linux
            Err(Errno::EAGAIN) => Ok(0),
            // The slave side hung up: the child has exited
            Err(Errno::EIO) => Ok(0),
            Err(e) => Err(PtyError::Read(e)),
        }
    }

    /// Write to the PTY master in a single attempt
    ///
    /// Returns the number of bytes written; 0 if the PTY would block.
    pub fn write(&self, data: &[u8]) -> PtyResult<usize> {
        match write(self.master.as_raw_fd(), data) {
            Ok(n) => Ok(n),
            Err(Errno::EAGAIN) => Ok(0),
            Err(e) => Err(PtyError::Write(e)),
        }
    }

    /// Poll for data available to read
    ///
    /// Returns true if data is available, false if timeout expired.
    pub fn poll_read(&self, timeout_ms: i32) -> PtyResult<bool> {
        // SAFETY: The master fd is valid for the lifetime of this Pty
        let borrowed_fd = unsafe { BorrowedFd::borrow_raw(self.master.as_raw_fd()) };
        let mut fds = [PollFd::new(&borrowed_fd, PollFlags::POLLIN)];
        let n = poll(&mut fds, timeout_ms).map_err(PtyError::Poll)?;
        Ok(n > 0
            && fds[0]
                .revents()
                .is_some_and(|r| r.contains(PollFlags::POLLIN)))
    }
}

impl Channel for Pty {
    fn read(&mut self, buf: &mut [u8]) -> PtyResult<usize> {
        Pty::read(self, buf)
    }

    fn write(&mut self, data: &[u8]) -> PtyResult<usize> {
        Pty::write(self, data)
    }
}

impl Drop for Pty {
    fn drop(&mut self) {
        // Try to reap the child process
        if self.child_alive {
            let _ = waitpid(self.child_pid, Some(WaitPidFlag::WNOHANG));
        }
    }
}

#[cfg(target_os = "linux")]
fn slave_name(master: &PtyMaster) -> PtyResult<String> {
    nix::pty::ptsname_r(master).map_err(PtyError::PtsName)
}

#[cfg(not(target_os = "linux"))]
fn slave_name(master: &PtyMaster) -> PtyResult<String> {
    // SAFETY: ptsname is not thread-safe; callers spawn from one thread
    unsafe { nix::pty::ptsname(master) }.map_err(PtyError::PtsName)
}

/// Child side of `spawn`: attach to the slave and exec the shell
fn exec_child(
    slave_name: &str,
    shell: &CString,
    argv: &[CString],
    term: &str,
    termios: Option<&Termios>,
) -> PtyResult<Infallible> {
    setsid().map_err(PtyError::Setsid)?;

    // Open slave - this becomes the controlling terminal
    let slave_fd =
        open(slave_name, OFlag::O_RDWR, Mode::empty()).map_err(PtyError::OpenSlave)?;

    // SAFETY: TIOCSCTTY is a valid ioctl for setting controlling terminal
    unsafe {
        if libc::ioctl(slave_fd, libc::TIOCSCTTY as _, 0) < 0 {
            // Non-fatal on some systems
            debug!("TIOCSCTTY failed (may be ok)");
        }
    }

    dup2(slave_fd, STDIN_FILENO).map_err(PtyError::Dup2)?;
    dup2(slave_fd, STDOUT_FILENO).map_err(PtyError::Dup2)?;
    dup2(slave_fd, STDERR_FILENO).map_err(PtyError::Dup2)?;

    if slave_fd > STDERR_FILENO {
        let _ = close(slave_fd);
    }

    // stdin is the slave now
    if let Some(termios) = termios {
        tcsetattr(io::stdin(), SetArg::TCSANOW, termios).map_err(PtyError::Termios)?;
    }

    std::env::set_var("TERM", term);

    execvp(shell, argv).map_err(PtyError::Exec)
}

/// Line-discipline settings of the controlling terminal on stdin, if any
pub fn host_termios() -> Option<Termios> {
    if !isatty(STDIN_FILENO).unwrap_or(false) {
        return None;
    }
    tcgetattr(io::stdin()).ok()
}

/// Make reads on `fd` return immediately when no data is available
pub fn set_non_blocking(fd: RawFd) -> PtyResult<()> {
    let flags = fcntl(fd, FcntlArg::F_GETFL).map_err(PtyError::SetNonBlocking)?;
    let flags = OFlag::from_bits_truncate(flags);
    fcntl(fd, FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK)).map_err(PtyError::SetNonBlocking)?;
    Ok(())
}

/// Set the window size on a PTY file descriptor
fn set_window_size(fd: RawFd, size: WindowSize) -> PtyResult<()> {
    let winsize = libc::winsize {
        ws_row: size.rows,
        ws_col: size.cols,
        ws_xpixel: size.pixel_width,
        ws_ypixel: size.pixel_height,
    };

    // SAFETY: TIOCSWINSZ is a valid ioctl for setting window size
    let result = unsafe { libc::ioctl(fd, libc::TIOCSWINSZ, &winsize) };

    if result < 0 {
        Err(PtyError::SetWinsize(Errno::last()))
    } else {
        Ok(())
    }
}

/// Get the window size from a PTY file descriptor
pub fn get_window_size(fd: RawFd) -> PtyResult<WindowSize> {
    let mut winsize = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };

    // SAFETY: TIOCGWINSZ is a valid ioctl for getting window size
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut winsize) };

    if result < 0 {
        Err(PtyError::SetWinsize(Errno::last()))
    } else {
        Ok(WindowSize {
            rows: winsize.ws_row,
            cols: winsize.ws_col,
            pixel_width: winsize.ws_xpixel,
            pixel_height: winsize.ws_ypixel,
        })
    }
}
