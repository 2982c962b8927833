//! The measuring pipeline: geometry, conversion and the optional cursor query.

use std::io::{Read, Write};
use std::time::Duration;

use crate::cells::{CellExtent, CellSize, ScaleFactors};
use crate::cursor::query_cursor;
use crate::error::{ProbeError, Result};
use crate::geometry::{query_geometry, GeometrySource, TerminalGeometry};
use crate::header::ImageHeader;
use crate::report::Report;
use crate::tty::LineDiscipline;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CursorOptions {
    /// Upper bound for the wait on the terminal's reply; `None` blocks.
    pub timeout: Option<Duration>,
}

/// How a run is configured.
#[derive(Clone, Debug, PartialEq)]
pub struct Pipeline {
    pub scale: ScaleFactors,
    /// Streams asked for the window size, in order.
    pub geometry_order: Vec<GeometrySource>,
    /// `None` skips the cursor query and reports only the image size.
    pub cursor: Option<CursorOptions>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            scale: ScaleFactors::default(),
            geometry_order: GeometrySource::DEFAULT_ORDER.to_vec(),
            cursor: Some(CursorOptions::default()),
        }
    }
}

#[derive(Debug)]
pub struct Outcome {
    pub report: Report,
    /// Non-fatal: the terminal mode could not be restored after the query.
    pub restore_warning: Option<ProbeError>,
}

impl Pipeline {
    pub fn measure_with(&self, header: &ImageHeader, geometry: &TerminalGeometry) -> CellExtent {
        CellSize::from_geometry(geometry, self.scale).cells_for(header)
    }

    /// Queries the window size, then continues as [`Pipeline::run_with`].
    pub fn run<T>(&self, header: &ImageHeader, tty: &mut T) -> Result<Outcome>
    where
        T: LineDiscipline + Read + Write,
    {
        let geometry = query_geometry(&self.geometry_order)?;
        self.run_with(header, &geometry, tty)
    }

    /// Converts `header` to cells and, if enabled, asks `tty` for the cursor.
    pub fn run_with<T>(
        &self,
        header: &ImageHeader,
        geometry: &TerminalGeometry,
        tty: &mut T,
    ) -> Result<Outcome>
    where
        T: LineDiscipline + Read + Write,
    {
        let extent = self.measure_with(header, geometry);
        let Some(options) = self.cursor else {
            return Ok(Outcome {
                report: Report {
                    extent,
                    cursor: None,
                },
                restore_warning: None,
            });
        };

        let query = query_cursor(tty, options.timeout)?;
        Ok(Outcome {
            report: Report {
                extent,
                cursor: Some(query.position),
            },
            restore_warning: query.restore_warning,
        })
    }
}
