use std::fmt;

use crate::{cells::CellExtent, cursor::CursorPosition};

/// One output line: the image size in cells, optionally followed by the
/// cursor row and column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Report {
    pub extent: CellExtent,
    pub cursor: Option<CursorPosition>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.extent.cols, self.extent.rows)?;
        if let Some(cursor) = self.cursor {
            write!(f, " {} {}", cursor.row, cursor.col)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_without_cursor() {
        let report = Report {
            extent: CellExtent { cols: 30, rows: 96 },
            cursor: None,
        };
        assert_eq!(report.to_string(), "30 96");
    }

    #[test]
    fn formats_with_cursor() {
        let report = Report {
            extent: CellExtent { cols: 30, rows: 96 },
            cursor: Some(CursorPosition { row: 39, col: 1 }),
        };
        assert_eq!(report.to_string(), "30 96 39 1");
    }
}
