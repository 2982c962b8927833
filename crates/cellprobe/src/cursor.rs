//! Cursor position report (`ESC [ 6 n`) exchange.
//!
//! The terminal is switched to raw mode for the exchange and put back by a
//! [`RawMode`] guard on every path out of [`query_cursor`].

use std::io::{self, Read, Write};
use std::ops::{Deref, DerefMut};
use std::time::Duration;

use log::{debug, warn};

use crate::error::{ProbeError, Result};
use crate::tty::LineDiscipline;

/// Device status report request for the cursor position.
pub const CURSOR_REQUEST: &[u8] = b"\x1b[6n";

const ESC: u8 = 0x1b;
const REPLY_PREFIX: &[u8] = b"\x1b[";
const REPLY_SEPARATOR: u8 = b';';
const REPLY_TERMINATOR: u8 = b'R';
const MAX_REPLY_LEN: usize = 32;
/// Ctrl-C, delivered as a byte while in raw mode.
const INTERRUPT: u8 = 0x03;

/// Cursor position as reported by the terminal (1-based).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorPosition {
    pub row: u32,
    pub col: u32,
}

/// Result of a completed cursor query.
#[derive(Debug)]
pub struct CursorQuery {
    pub position: CursorPosition,
    /// Set when the position was read but the terminal mode could not be put
    /// back afterwards.
    pub restore_warning: Option<ProbeError>,
}

/// Keeps a terminal in raw mode until restored or dropped.
///
/// The original settings are applied again exactly once: by [`RawMode::restore`]
/// or, if that was never called, when the guard is dropped.
pub struct RawMode<'a, T: LineDiscipline> {
    tty: &'a mut T,
    original: Option<T::Mode>,
}

impl<'a, T: LineDiscipline> RawMode<'a, T> {
    /// Snapshots the current settings and switches to raw mode. On failure the
    /// terminal is left as it was.
    pub fn enter(tty: &'a mut T, timeout: Option<Duration>) -> Result<Self> {
        let original = tty.current_mode().map_err(ProbeError::TerminalSetup)?;
        let raw = tty.raw_variant(&original, timeout);
        tty.apply_mode(&raw).map_err(ProbeError::TerminalSetup)?;
        Ok(Self {
            tty,
            original: Some(original),
        })
    }

    /// Puts the original settings back.
    pub fn restore(mut self) -> Result<()> {
        self.restore_original()
    }

    fn restore_original(&mut self) -> Result<()> {
        match self.original.take() {
            Some(mode) => self
                .tty
                .apply_mode(&mode)
                .map_err(ProbeError::TerminalRestore),
            None => Ok(()),
        }
    }
}

impl<T: LineDiscipline> Deref for RawMode<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.tty
    }
}

impl<T: LineDiscipline> DerefMut for RawMode<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.tty
    }
}

impl<T: LineDiscipline> Drop for RawMode<'_, T> {
    fn drop(&mut self) {
        if let Err(err) = self.restore_original() {
            warn!("{err}");
        }
    }
}

/// Asks the terminal where its cursor is.
///
/// Writes the request, waits for the `R`-terminated reply and parses it. The
/// wait is unbounded unless `timeout` is given.
pub fn query_cursor<T>(tty: &mut T, timeout: Option<Duration>) -> Result<CursorQuery>
where
    T: LineDiscipline + Read + Write,
{
    let mut raw = RawMode::enter(tty, timeout)?;
    raw.write_all(CURSOR_REQUEST)
        .and_then(|()| raw.flush())
        .map_err(ProbeError::TerminalProtocol)?;
    let reply = read_reply(&mut *raw, timeout.is_some())?;
    debug!("cursor reply: {}", reply.escape_ascii());
    let position = parse_cursor_reply(&reply)?;
    Ok(CursorQuery {
        position,
        restore_warning: raw.restore().err(),
    })
}

/// Reads until the reply terminator.
///
/// Keystrokes queued before the reply are dropped: the buffer restarts at
/// every `ESC`, and the length cap only applies from there on.
fn read_reply<R: Read>(input: &mut R, timed: bool) -> Result<Vec<u8>> {
    let mut reply = Vec::with_capacity(16);
    let mut skipped = 0usize;
    let mut byte = [0u8; 1];
    loop {
        match input.read(&mut byte) {
            Ok(0) if timed => {
                return Err(ProbeError::TerminalProtocol(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "no cursor position reply before the timeout",
                )))
            }
            Ok(0) => {
                return Err(ProbeError::TerminalProtocol(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "terminal input closed before the cursor position reply",
                )))
            }
            Ok(_) => match byte[0] {
                INTERRUPT => {
                    return Err(ProbeError::TerminalProtocol(io::Error::new(
                        io::ErrorKind::Interrupted,
                        "interrupted while waiting for the cursor position reply",
                    )))
                }
                ESC => {
                    skipped += reply.len();
                    reply.clear();
                    reply.push(ESC);
                }
                _ if reply.is_empty() => skipped += 1,
                b => {
                    reply.push(b);
                    if b == REPLY_TERMINATOR {
                        if skipped > 0 {
                            debug!("dropped {skipped} bytes of type-ahead");
                        }
                        return Ok(reply);
                    }
                    if reply.len() >= MAX_REPLY_LEN {
                        return Err(malformed(&reply));
                    }
                }
            },
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(ProbeError::TerminalProtocol(err)),
        }
    }
}

/// Parses an `ESC [ <row> ; <col> R` reply.
///
/// Bytes before the last `ESC [` are ignored, they are keystrokes that were
/// already queued on the terminal.
pub fn parse_cursor_reply(reply: &[u8]) -> Result<CursorPosition> {
    let start = reply
        .windows(REPLY_PREFIX.len())
        .rposition(|w| w == REPLY_PREFIX)
        .ok_or_else(|| malformed(reply))?;
    let body = reply[start + REPLY_PREFIX.len()..]
        .strip_suffix(&[REPLY_TERMINATOR])
        .ok_or_else(|| malformed(reply))?;
    let separator = body
        .iter()
        .position(|&b| b == REPLY_SEPARATOR)
        .ok_or_else(|| malformed(reply))?;
    let (row, col) = (&body[..separator], &body[separator + 1..]);
    Ok(CursorPosition {
        row: parse_number(row).ok_or_else(|| malformed(reply))?,
        col: parse_number(col).ok_or_else(|| malformed(reply))?,
    })
}

fn parse_number(digits: &[u8]) -> Option<u32> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}

fn malformed(reply: &[u8]) -> ProbeError {
    ProbeError::MalformedReply(reply.escape_ascii().to_string())
}
