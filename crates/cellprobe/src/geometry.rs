//! Terminal window size in character cells and pixels.

use std::io;
use std::os::fd::{AsFd, AsRawFd};

use log::debug;
use nix::errno::Errno;
use nix::libc;
use nix::pty::Winsize;

use crate::error::{ProbeError, Result};

/// Window size of a terminal. Every field is at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalGeometry {
    /// Number of rows (characters)
    pub rows: u16,
    /// Number of columns (characters)
    pub cols: u16,
    /// Width in pixels
    pub pixel_width: u16,
    /// Height in pixels
    pub pixel_height: u16,
}

impl TerminalGeometry {
    /// Creates a geometry, replacing any zero dimension with 1.
    pub fn new(rows: u16, cols: u16, pixel_width: u16, pixel_height: u16) -> Self {
        Self {
            rows,
            cols,
            pixel_width,
            pixel_height,
        }
        .clamped()
    }

    /// Some terminals report 0 pixels (or even 0 cells); treat those as 1.
    pub fn clamped(self) -> Self {
        Self {
            rows: self.rows.max(1),
            cols: self.cols.max(1),
            pixel_width: self.pixel_width.max(1),
            pixel_height: self.pixel_height.max(1),
        }
    }
}

impl From<Winsize> for TerminalGeometry {
    fn from(ws: Winsize) -> Self {
        Self::new(ws.ws_row, ws.ws_col, ws.ws_xpixel, ws.ws_ypixel)
    }
}

/// Standard streams that may be connected to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometrySource {
    Stdout,
    Stdin,
    Stderr,
}

impl GeometrySource {
    /// Probe order used unless configured otherwise.
    pub const DEFAULT_ORDER: [GeometrySource; 3] = [
        GeometrySource::Stdout,
        GeometrySource::Stdin,
        GeometrySource::Stderr,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GeometrySource::Stdout => "stdout",
            GeometrySource::Stdin => "stdin",
            GeometrySource::Stderr => "stderr",
        }
    }

    fn window_size(self) -> nix::Result<TerminalGeometry> {
        match self {
            GeometrySource::Stdout => window_size(io::stdout()),
            GeometrySource::Stdin => window_size(io::stdin()),
            GeometrySource::Stderr => window_size(io::stderr()),
        }
    }
}

/// Get the window size of the terminal behind `fd` using ioctl.
pub fn window_size<Fd: AsFd>(fd: Fd) -> nix::Result<TerminalGeometry> {
    let mut ws = Winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };

    // SAFETY: TIOCGWINSZ only writes a winsize into the struct we pass
    let result = unsafe { libc::ioctl(fd.as_fd().as_raw_fd(), libc::TIOCGWINSZ, &mut ws) };
    if result < 0 {
        return Err(Errno::last());
    }
    Ok(ws.into())
}

/// Asks each source in turn for the window size; the first answer wins.
///
/// Fails with [`ProbeError::NotATerminal`] if no source is a terminal, or with
/// [`ProbeError::IoCtl`] if a source failed for another reason.
pub fn query_geometry(order: &[GeometrySource]) -> Result<TerminalGeometry> {
    let mut failure = None;
    for source in order {
        match source.window_size() {
            Ok(geometry) => {
                debug!("window size from {}: {geometry:?}", source.name());
                return Ok(geometry);
            }
            Err(Errno::ENOTTY) => debug!("{} is not a terminal", source.name()),
            Err(errno) => {
                debug!("window size from {} failed: {errno}", source.name());
                failure.get_or_insert(errno);
            }
        }
    }

    match failure {
        Some(errno) => Err(ProbeError::IoCtl(errno)),
        None => {
            let tried: Vec<_> = order.iter().map(|s| s.name()).collect();
            Err(ProbeError::NotATerminal(if tried.is_empty() {
                "nothing".into()
            } else {
                tried.join(", ")
            }))
        }
    }
}
