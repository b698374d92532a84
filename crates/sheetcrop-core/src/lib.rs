//! # sheetcrop-core
//!
//! Workbook model shared by the sheetcrop crates.
//!
//! This crate provides the types the exporter reads from and builds:
//! - [`CellValue`] - Cell values (numbers, strings, booleans, errors, formulas)
//! - [`CellAddress`] and [`CellRange`] - 0-based cell addressing
//! - [`CellBox`] - 1-based inclusive box used to describe an export region
//! - [`Style`] - Cell formatting (fonts, fills, borders, alignment, number formats)
//! - [`Workbook`], [`Worksheet`] - The document structures
//! - [`SheetChart`] and [`ChartAnchor`] - Chart placement and series data
//!
//! ## Example
//!
//! ```rust
//! use sheetcrop_core::{CellBox, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("B2", 1.0).unwrap();
//! sheet.set_cell_value("D10", "total").unwrap();
//!
//! let used = CellBox::from_range(&sheet.used_range().unwrap());
//! assert_eq!(used.to_string(), "B2:D10");
//! ```

pub mod cell;
pub mod cell_box;
pub mod drawing;
pub mod error;
pub mod style;
pub mod workbook;
pub mod worksheet;

pub use cell::{CellAddress, CellData, CellError, CellRange, CellValue};
pub use cell_box::CellBox;
pub use drawing::{
    AnchorExtent, AnchorMarker, ChartAnchor, ChartKind, ChartSeries, SeriesData, SheetChart,
};
pub use error::{Error, Result};
pub use workbook::Workbook;
pub use worksheet::{PageOrientation, PageSetup, Worksheet};

pub use style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, FillStyle, FontStyle,
    HorizontalAlignment, NumberFormat, Style, StylePool, VerticalAlignment,
};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Default row height in points
pub const DEFAULT_ROW_HEIGHT: f64 = 15.0;

/// Default column width in characters
pub const DEFAULT_COLUMN_WIDTH: f64 = 8.43;
