//! Terminal handles and their line discipline.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Stdin, Stdout, Write};
use std::os::fd::AsFd;
use std::time::Duration;

use nix::sys::termios::{self, LocalFlags, SetArg, SpecialCharacterIndices, Termios};

/// Access to a terminal's line-discipline settings.
///
/// [`crate::cursor::RawMode`] drives a terminal through this trait so the
/// save/restore sequence does not depend on a real device.
pub trait LineDiscipline {
    type Mode: Clone;

    /// Returns the settings currently in effect.
    fn current_mode(&self) -> io::Result<Self::Mode>;

    fn apply_mode(&mut self, mode: &Self::Mode) -> io::Result<()>;

    /// Derives non-canonical, no-echo settings from `mode` with signal
    /// characters disabled.
    ///
    /// Without a timeout reads block until a byte arrives; with one, an empty
    /// read means the timeout expired.
    fn raw_variant(&self, mode: &Self::Mode, timeout: Option<Duration>) -> Self::Mode;
}

/// A terminal seen through an input and an output handle.
pub struct Tty<I, O> {
    input: I,
    output: O,
}

impl<I: AsFd + Read, O: Write> Tty<I, O> {
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }
}

impl Tty<Stdin, Stdout> {
    /// The process' standard input and output.
    pub fn stdio() -> Self {
        Self::new(io::stdin(), io::stdout())
    }
}

impl Tty<File, File> {
    /// Opens the controlling terminal, independent of how stdio is redirected.
    pub fn controlling() -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open("/dev/tty")?;
        Ok(Self::new(file.try_clone()?, file))
    }
}

impl<I: Read, O> Read for Tty<I, O> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.input.read(buf)
    }
}

impl<I, O: Write> Write for Tty<I, O> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.output.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }
}

impl<I: AsFd, O> LineDiscipline for Tty<I, O> {
    type Mode = Termios;

    fn current_mode(&self) -> io::Result<Termios> {
        Ok(termios::tcgetattr(self.input.as_fd())?)
    }

    fn apply_mode(&mut self, mode: &Termios) -> io::Result<()> {
        Ok(termios::tcsetattr(self.input.as_fd(), SetArg::TCSANOW, mode)?)
    }

    fn raw_variant(&self, mode: &Termios, timeout: Option<Duration>) -> Termios {
        let mut raw = mode.clone();
        // ISIG off: Ctrl-C is read as a byte, so the mode is still restored
        raw.local_flags.remove(LocalFlags::ICANON | LocalFlags::ECHO | LocalFlags::ISIG);
        let (vmin, vtime) = read_limits(timeout);
        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = vmin;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = vtime;
        raw
    }
}

/// `VMIN`/`VTIME` pair for a read timeout. `VTIME` counts deciseconds.
pub(crate) fn read_limits(timeout: Option<Duration>) -> (u8, u8) {
    match timeout {
        None => (1, 0),
        Some(timeout) => {
            let deciseconds = timeout.as_millis().div_ceil(100).clamp(1, 255);
            (0, deciseconds as u8)
        }
    }
}
