//! Error types for chart lookup

use thiserror::Error;

/// Result type for chart lookup
pub type Result<T> = std::result::Result<T, LocateError>;

/// Errors that can occur while locating a chart
#[derive(Debug, Error)]
pub enum LocateError {
    /// No chart title (or drawing name) on the sheet equals the requested name
    #[error("Chart '{name}' not found on sheet '{sheet}'")]
    ChartNotFound { sheet: String, name: String },

    /// The anchor produced a box outside the sheet grid
    #[error("Chart anchor does not map to a valid cell box: {0}")]
    InvalidAnchor(#[from] sheetcrop_core::Error),
}
