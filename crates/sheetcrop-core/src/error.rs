//! Errors raised by the workbook model

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A1-style address that does not parse
    #[error("bad cell address: {0}")]
    InvalidAddress(String),

    /// Range, box or data reference whose corners do not form a region
    #[error("bad cell range: {0}")]
    InvalidRange(String),

    #[error("row {row} is past the last row ({max})")]
    RowOutOfBounds { row: u32, max: u32 },

    #[error("column {col} is past the last column ({max})")]
    ColumnOutOfBounds { col: u16, max: u16 },

    #[error("no sheet named '{0}'")]
    SheetNotFound(String),

    #[error("sheet name rejected: {0}")]
    InvalidSheetName(String),

    #[error("a sheet named '{0}' already exists")]
    DuplicateSheetName(String),

    /// The new merge would overlap the region named here
    #[error("overlaps merged region {0}")]
    MergeOverlap(String),

    /// A cell points at a style the sheet's pool does not hold
    #[error("style index {0} is not in the sheet's style pool")]
    StyleNotFound(u32),
}
