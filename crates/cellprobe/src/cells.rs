//! Pixel to character-cell conversion.

use crate::{geometry::TerminalGeometry, header::ImageHeader};

/// Smallest accepted font scale factor.
pub const MIN_SCALE: f64 = 0.01;

/// Font scale multipliers applied to the terminal's cell size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleFactors {
    pub width: f64,
    pub height: f64,
}

impl ScaleFactors {
    /// Creates scale factors, raising anything below [`MIN_SCALE`] (or NaN) to it.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(MIN_SCALE),
            height: height.max(MIN_SCALE),
        }
    }
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
        }
    }
}

/// Pixel size of one terminal character cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSize {
    pub width: u32,
    pub height: u32,
}

impl CellSize {
    /// Derives the cell size from the terminal geometry.
    ///
    /// Both axes round up so an image that does not divide evenly is never
    /// reported smaller than the area it needs.
    pub fn from_geometry(geometry: &TerminalGeometry, scale: ScaleFactors) -> Self {
        let geometry = geometry.clamped();
        let scale = ScaleFactors::new(scale.width, scale.height);
        Self {
            width: cell_extent(geometry.pixel_width, scale.width, geometry.cols),
            height: cell_extent(geometry.pixel_height, scale.height, geometry.rows),
        }
    }

    /// Number of whole cells the image spans on each axis.
    pub fn cells_for(&self, header: &ImageHeader) -> CellExtent {
        CellExtent {
            cols: header.width / self.width.max(1),
            rows: header.height / self.height.max(1),
        }
    }
}

fn cell_extent(pixels: u16, scale: f64, cells: u16) -> u32 {
    let size = (f64::from(pixels) * scale / f64::from(cells)).ceil();
    // float to int casts saturate
    (size as u32).max(1)
}

/// Size of an image measured in terminal cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellExtent {
    pub cols: u32,
    pub rows: u32,
}
