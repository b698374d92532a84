//! # sheetcrop-xlsx
//!
//! Writes sheetcrop workbooks as XLSX (Office Open XML) packages that
//! LibreOffice can convert. Values, styles, merges, column widths, row
//! heights, hidden flags, page setup and charts (with literal series data)
//! are written.

pub mod error;
pub mod writer;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use writer::{WriteOptions, XlsxWriter};
