//! XLSX error types

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur while writing an XLSX package
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The requested sheet index does not exist
    #[error("Sheet index {index} out of range (workbook has {count} sheets)")]
    SheetOutOfRange { index: usize, count: usize },

    /// A chart's series names cells that cannot be read
    #[error("Chart data on sheet '{sheet}' cannot be read: {source}")]
    ChartData {
        sheet: String,
        #[source]
        source: sheetcrop_core::Error,
    },

    /// A workbook with no sheets cannot be written
    #[error("Workbook has no worksheets")]
    EmptyWorkbook,
}
