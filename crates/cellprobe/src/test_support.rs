//! Test support utilities for cellprobe.
//!
//! A scripted terminal that records every mode change, for exercising the
//! cursor query without a real device.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::time::Duration;

use crate::tty::LineDiscipline;

/// Line-discipline settings of a [`FakeTerminal`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FakeMode {
    pub canonical: bool,
    pub echo: bool,
    pub timeout: Option<Duration>,
    /// Unrelated settings that must survive a raw-mode round trip untouched.
    pub other_bits: u32,
}

impl Default for FakeMode {
    fn default() -> Self {
        Self {
            canonical: true,
            echo: true,
            timeout: None,
            other_bits: 0xdead_beef,
        }
    }
}

/// In-memory terminal.
///
/// Bytes queued with [`FakeTerminal::reply`] are handed out once the cursor
/// request has been written; after that reads report EOF, or `read_error`.
#[derive(Default)]
pub struct FakeTerminal {
    pub mode: FakeMode,
    /// Every mode passed to `apply_mode`, in order.
    pub applied: Vec<FakeMode>,
    pub written: Vec<u8>,
    pub reply: VecDeque<u8>,
    pub read_error: Option<io::ErrorKind>,
    pub fail_get: bool,
    pub fail_raw: bool,
    pub fail_restore: bool,
}

impl FakeTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(reply: &[u8]) -> Self {
        Self {
            reply: reply.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn is_raw(&self) -> bool {
        !self.mode.canonical && !self.mode.echo
    }
}

impl LineDiscipline for FakeTerminal {
    type Mode = FakeMode;

    fn current_mode(&self) -> io::Result<FakeMode> {
        if self.fail_get {
            return Err(io::Error::from_raw_os_error(25));
        }
        Ok(self.mode.clone())
    }

    fn apply_mode(&mut self, mode: &FakeMode) -> io::Result<()> {
        let restoring = mode.canonical;
        if (restoring && self.fail_restore) || (!restoring && self.fail_raw) {
            return Err(io::Error::new(io::ErrorKind::Other, "tcsetattr refused"));
        }
        self.applied.push(mode.clone());
        self.mode = mode.clone();
        Ok(())
    }

    fn raw_variant(&self, mode: &FakeMode, timeout: Option<Duration>) -> FakeMode {
        FakeMode {
            canonical: false,
            echo: false,
            timeout,
            ..mode.clone()
        }
    }
}

impl Read for FakeTerminal {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        assert!(self.is_raw(), "read from a terminal that is not in raw mode");
        if buf.is_empty() || !self.written.ends_with(crate::cursor::CURSOR_REQUEST) {
            return Ok(0);
        }
        if let Some(byte) = self.reply.pop_front() {
            buf[0] = byte;
            return Ok(1);
        }
        match self.read_error {
            Some(kind) => Err(io::Error::new(kind, "read failed")),
            None => Ok(0),
        }
    }
}

impl Write for FakeTerminal {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
