//! Sheet grid geometry in EMUs
//!
//! Drawing anchors are expressed in EMUs while the sheet stores column widths
//! in characters and row heights in points. Everything is converted to whole
//! EMUs so boundary comparisons are exact.

use sheetcrop_core::{Worksheet, MAX_COLS, MAX_ROWS};

/// EMUs per screen pixel at 96 DPI
pub const EMU_PER_PIXEL: i64 = 9525;

/// EMUs per typographic point
pub const EMU_PER_POINT: i64 = 12700;

/// Maximum digit width of the default font (Calibri 11pt) in pixels
pub const MAX_DIGIT_WIDTH_PX: f64 = 7.0;

/// Cell padding added to every non-zero column width, in pixels
pub const COLUMN_PADDING_PX: f64 = 5.0;

/// Convert a column width in characters to pixels
///
/// 8.43 characters (the default) is 64 pixels.
pub fn column_width_px(chars: f64) -> f64 {
    if chars <= 0.0 {
        0.0
    } else {
        (chars * MAX_DIGIT_WIDTH_PX + COLUMN_PADDING_PX).floor()
    }
}

/// Convert a row height in points to pixels (96 DPI)
pub fn row_height_px(points: f64) -> f64 {
    points.max(0.0) * 96.0 / 72.0
}

/// Read-only view of a worksheet's grid sizes
///
/// Hidden rows and columns have zero size: they are not drawn, so an anchor
/// offset can never land inside one.
#[derive(Debug, Clone, Copy)]
pub struct SheetGeometry<'a> {
    sheet: &'a Worksheet,
}

impl<'a> SheetGeometry<'a> {
    pub fn new(sheet: &'a Worksheet) -> Self {
        Self { sheet }
    }

    /// Width of a column in EMUs
    pub fn column_width_emu(&self, col: u16) -> i64 {
        if self.sheet.is_column_hidden(col) {
            return 0;
        }
        column_width_px(self.sheet.column_width(col)) as i64 * EMU_PER_PIXEL
    }

    /// Height of a row in EMUs
    pub fn row_height_emu(&self, row: u32) -> i64 {
        if self.sheet.is_row_hidden(row) {
            return 0;
        }
        (self.sheet.row_height(row).max(0.0) * EMU_PER_POINT as f64).round() as i64
    }

    /// Column containing a point `offset` EMUs right of `col`'s left edge
    ///
    /// A point exactly on a column boundary belongs to the column on its
    /// right, which is what a chart's left edge needs.
    pub fn column_starting_at(&self, col: u16, offset: i64) -> u16 {
        walk(u32::from(col), offset, u32::from(MAX_COLS) - 1, true, |c| {
            self.column_width_emu(c as u16)
        }) as u16
    }

    /// Column containing a point `offset` EMUs right of `col`'s left edge
    ///
    /// A point exactly on a column boundary belongs to the column on its
    /// left, which is what a chart's right edge needs.
    pub fn column_ending_at(&self, col: u16, offset: i64) -> u16 {
        walk(u32::from(col), offset, u32::from(MAX_COLS) - 1, false, |c| {
            self.column_width_emu(c as u16)
        }) as u16
    }

    /// Row counterpart of [`column_starting_at`](Self::column_starting_at)
    pub fn row_starting_at(&self, row: u32, offset: i64) -> u32 {
        walk(row, offset, MAX_ROWS - 1, true, |r| self.row_height_emu(r))
    }

    /// Row counterpart of [`column_ending_at`](Self::column_ending_at)
    pub fn row_ending_at(&self, row: u32, offset: i64) -> u32 {
        walk(row, offset, MAX_ROWS - 1, false, |r| self.row_height_emu(r))
    }
}

/// Advance from `index` while `offset` lies beyond the current cell
///
/// `leading` decides which side owns a point on a boundary. The result never
/// passes `last`, so anchors that run off the grid are clamped to it.
fn walk(mut index: u32, offset: i64, last: u32, leading: bool, size: impl Fn(u32) -> i64) -> u32 {
    let mut remaining = offset.max(0);
    index = index.min(last);

    while index < last {
        let current = size(index);
        let past_cell = if leading {
            remaining >= current
        } else {
            remaining > current
        };
        if !past_cell {
            break;
        }
        remaining -= current;
        index += 1;
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sizes() {
        assert_eq!(column_width_px(8.43), 64.0);
        assert_eq!(column_width_px(0.0), 0.0);
        assert_eq!(row_height_px(15.0), 20.0);

        let sheet = Worksheet::new("Sheet1");
        let geometry = SheetGeometry::new(&sheet);
        assert_eq!(geometry.column_width_emu(0), 64 * EMU_PER_PIXEL);
        assert_eq!(geometry.row_height_emu(0), 15 * EMU_PER_POINT);
    }

    #[test]
    fn test_hidden_are_zero_sized() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_column_hidden(2, true);
        sheet.set_row_hidden(4, true);

        let geometry = SheetGeometry::new(&sheet);
        assert_eq!(geometry.column_width_emu(2), 0);
        assert_eq!(geometry.row_height_emu(4), 0);
    }

    #[test]
    fn test_boundary_ownership() {
        let sheet = Worksheet::new("Sheet1");
        let geometry = SheetGeometry::new(&sheet);
        let width = geometry.column_width_emu(0);

        assert_eq!(geometry.column_starting_at(0, 0), 0);
        assert_eq!(geometry.column_starting_at(0, width - 1), 0);
        assert_eq!(geometry.column_starting_at(0, width), 1);

        assert_eq!(geometry.column_ending_at(0, width), 0);
        assert_eq!(geometry.column_ending_at(0, width + 1), 1);
        assert_eq!(geometry.column_ending_at(0, 3 * width), 2);
    }

    #[test]
    fn test_walk_skips_hidden_rows() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_row_hidden(1, true);
        let geometry = SheetGeometry::new(&sheet);
        let height = geometry.row_height_emu(0);

        // Just past row 0 the hidden row 1 has no height, so the point is in row 2
        assert_eq!(geometry.row_starting_at(0, height), 2);
        assert_eq!(geometry.row_ending_at(0, height + 1), 2);
    }

    #[test]
    fn test_walk_clamps_to_grid() {
        let sheet = Worksheet::new("Sheet1");
        let geometry = SheetGeometry::new(&sheet);

        assert_eq!(geometry.column_ending_at(MAX_COLS - 2, i64::MAX / 2), MAX_COLS - 1);
        assert_eq!(geometry.row_starting_at(MAX_ROWS + 10, 0), MAX_ROWS - 1);
        assert_eq!(geometry.column_starting_at(3, -500), 3);
    }
}
