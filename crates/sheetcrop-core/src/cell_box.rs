//! 1-based inclusive cell boxes
//!
//! A [`CellBox`] names the rectangle an export covers. It uses the row and
//! column numbers a spreadsheet user sees (A1 is row 1, column 1), unlike
//! [`CellAddress`] which is 0-based.

use std::fmt;

use crate::cell::{CellAddress, CellRange};
use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// Normalized, inclusive rectangle of a sheet's row/column grid
///
/// Always satisfies `1 <= row_start <= row_end <= MAX_ROWS` and
/// `1 <= col_start <= col_end <= MAX_COLS`. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellBox {
    row_start: u32,
    col_start: u16,
    row_end: u32,
    col_end: u16,
}

impl CellBox {
    /// Create a box from 1-based inclusive bounds
    ///
    /// # Examples
    /// ```
    /// use sheetcrop_core::CellBox;
    ///
    /// let b = CellBox::new(2, 2, 10, 4).unwrap();
    /// assert_eq!(b.to_string(), "B2:D10");
    /// assert!(CellBox::new(5, 1, 4, 1).is_err());
    /// ```
    pub fn new(row_start: u32, col_start: u16, row_end: u32, col_end: u16) -> Result<Self> {
        if row_start == 0 || col_start == 0 {
            return Err(Error::InvalidRange(format!(
                "box bounds are 1-based, got row {} col {}",
                row_start, col_start
            )));
        }
        if row_start > row_end || col_start > col_end {
            return Err(Error::InvalidRange(format!(
                "box start ({}, {}) is after end ({}, {})",
                row_start, col_start, row_end, col_end
            )));
        }
        if row_end > MAX_ROWS {
            return Err(Error::RowOutOfBounds {
                row: row_end,
                max: MAX_ROWS,
            });
        }
        if col_end > MAX_COLS {
            return Err(Error::ColumnOutOfBounds {
                col: col_end,
                max: MAX_COLS,
            });
        }

        Ok(Self {
            row_start,
            col_start,
            row_end,
            col_end,
        })
    }

    /// Box spanning two 0-based corners given in any order
    pub fn from_corners(a: CellAddress, b: CellAddress) -> Self {
        Self::from_range(&CellRange::new(a, b))
    }

    /// Box covering a (0-based, normalized) range
    pub fn from_range(range: &CellRange) -> Self {
        Self {
            row_start: range.start.row + 1,
            col_start: range.start.col + 1,
            row_end: range.end.row + 1,
            col_end: range.end.col + 1,
        }
    }

    /// The same rectangle as a 0-based range
    pub fn to_range(&self) -> CellRange {
        CellRange::from_indices(
            self.row_start - 1,
            self.col_start - 1,
            self.row_end - 1,
            self.col_end - 1,
        )
    }

    pub fn row_start(&self) -> u32 {
        self.row_start
    }

    pub fn col_start(&self) -> u16 {
        self.col_start
    }

    pub fn row_end(&self) -> u32 {
        self.row_end
    }

    pub fn col_end(&self) -> u16 {
        self.col_end
    }

    /// Number of rows covered
    pub fn row_count(&self) -> u32 {
        self.row_end - self.row_start + 1
    }

    /// Number of columns covered
    pub fn col_count(&self) -> u16 {
        self.col_end - self.col_start + 1
    }

    /// Check whether a 1-based (row, col) lies inside the box
    pub fn contains(&self, row: u32, col: u16) -> bool {
        (self.row_start..=self.row_end).contains(&row)
            && (self.col_start..=self.col_end).contains(&col)
    }

    /// Overlap of two boxes, if any
    pub fn intersect(&self, other: &CellBox) -> Option<CellBox> {
        let row_start = self.row_start.max(other.row_start);
        let col_start = self.col_start.max(other.col_start);
        let row_end = self.row_end.min(other.row_end);
        let col_end = self.col_end.min(other.col_end);

        (row_start <= row_end && col_start <= col_end).then_some(CellBox {
            row_start,
            col_start,
            row_end,
            col_end,
        })
    }

    /// Map a 1-based source position to its position in a sheet cropped to
    /// this box, where `(row_start, col_start)` becomes `(1, 1)`
    pub fn translate_into(&self, row: u32, col: u16) -> Option<(u32, u16)> {
        self.contains(row, col)
            .then(|| (row - self.row_start + 1, col - self.col_start + 1))
    }

    /// Map a 0-based source range into cropped coordinates (0-based),
    /// clipping it to the box first
    pub fn translate_range(&self, range: &CellRange) -> Option<CellRange> {
        let clipped = self.to_range().intersect(range)?;
        let (row_off, col_off) = (self.row_start - 1, self.col_start - 1);
        Some(CellRange::from_indices(
            clipped.start.row - row_off,
            clipped.start.col - col_off,
            clipped.end.row - row_off,
            clipped.end.col - col_off,
        ))
    }
}

impl fmt::Display for CellBox {
    /// Always two corners, so "B2:B2" stays distinguishable from a bare address
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let to_range = self.to_range();
        write!(f, "{}:{}", to_range.start, to_range.end)
    }
}
