//! cellprobe: how many terminal cells does an image cover, and where is the
//! cursor?
//!
//! Reads an image header, asks the terminal for its window size in cells and
//! pixels, converts the image to cells and optionally queries the cursor
//! position with an `ESC [ 6 n` round trip.

pub mod cells;
pub mod cursor;
mod error;
pub mod geometry;
pub mod header;
pub mod pipeline;
mod report;
pub mod tty;

pub use cells::{CellExtent, CellSize, ScaleFactors};
pub use cursor::{query_cursor, CursorPosition, CursorQuery, RawMode};
pub use error::{ProbeError, Result};
pub use geometry::{query_geometry, GeometrySource, TerminalGeometry};
pub use header::{open_header, read_header, ImageHeader, ImageKind};
pub use pipeline::{CursorOptions, Outcome, Pipeline};
pub use report::Report;
pub use tty::{LineDiscipline, Tty};

// Test utilities
pub mod test_support;
