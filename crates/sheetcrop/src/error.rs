//! Caller-facing error taxonomy.

use std::path::PathBuf;
use std::time::Duration;

use sheetcrop_chart::LocateError;
use sheetcrop_render::{RenderError, Stage};
use sheetcrop_xlsx::XlsxError;
use thiserror::Error;

/// Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// Every way an export call can fail. None of them are retried internally.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Invalid range '{expression}': {reason}")]
    InvalidRange { expression: String, reason: String },

    #[error("Sheet '{sheet}' has no populated cells")]
    EmptySheet { sheet: String },

    #[error("Sheet not found: {sheet}")]
    SheetNotFound { sheet: String },

    #[error("Chart '{chart}' not found on sheet '{sheet}'")]
    ChartNotFound { sheet: String, chart: String },

    /// A cell, merge or sheet could not be reproduced in the derived workbook
    #[error("Failed to copy {location} into the derived workbook: {source}")]
    StyleCopy {
        location: String,
        #[source]
        source: sheetcrop_core::Error,
    },

    /// A chart carried into the derived workbook names data that cannot be read
    #[error("Failed to read the data of chart '{chart}': {source}")]
    ChartData {
        chart: String,
        #[source]
        source: sheetcrop_core::Error,
    },

    #[error("Failed to write temporary workbook: {0}")]
    Serialization(#[source] XlsxError),

    #[error("Page conversion failed ({}): {stderr}", exit_status(.exit_code))]
    Conversion {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Raster conversion failed ({}): {stderr}", exit_status(.exit_code))]
    RasterConversion {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Expected a single page, raster conversion produced {pages}")]
    UnexpectedPageCount { pages: usize },

    #[error("{stage} did not finish within {timeout:?}")]
    ConversionTimeout { stage: Stage, timeout: Duration },

    #[error("Failed to write output file {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output path must not be empty")]
    InvalidOutputPath,
}

/// Fieldless mirror of [`ExportError`] for matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidRange,
    EmptySheet,
    SheetNotFound,
    ChartNotFound,
    StyleCopy,
    ChartData,
    Serialization,
    Conversion,
    RasterConversion,
    UnexpectedPageCount,
    ConversionTimeout,
    OutputWrite,
    InvalidOutputPath,
}

impl ExportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExportError::InvalidRange { .. } => ErrorKind::InvalidRange,
            ExportError::EmptySheet { .. } => ErrorKind::EmptySheet,
            ExportError::SheetNotFound { .. } => ErrorKind::SheetNotFound,
            ExportError::ChartNotFound { .. } => ErrorKind::ChartNotFound,
            ExportError::StyleCopy { .. } => ErrorKind::StyleCopy,
            ExportError::ChartData { .. } => ErrorKind::ChartData,
            ExportError::Serialization(_) => ErrorKind::Serialization,
            ExportError::Conversion { .. } => ErrorKind::Conversion,
            ExportError::RasterConversion { .. } => ErrorKind::RasterConversion,
            ExportError::UnexpectedPageCount { .. } => ErrorKind::UnexpectedPageCount,
            ExportError::ConversionTimeout { .. } => ErrorKind::ConversionTimeout,
            ExportError::OutputWrite { .. } => ErrorKind::OutputWrite,
            ExportError::InvalidOutputPath => ErrorKind::InvalidOutputPath,
        }
    }
}

impl From<RenderError> for ExportError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Serialization(e) => ExportError::Serialization(e),
            RenderError::Conversion { exit_code, stderr } => {
                ExportError::Conversion { exit_code, stderr }
            }
            RenderError::RasterConversion { exit_code, stderr } => {
                ExportError::RasterConversion { exit_code, stderr }
            }
            RenderError::UnexpectedPageCount { pages } => {
                ExportError::UnexpectedPageCount { pages }
            }
            RenderError::ConversionTimeout { stage, timeout } => {
                ExportError::ConversionTimeout { stage, timeout }
            }
            RenderError::OutputWrite { path, source } => ExportError::OutputWrite { path, source },
        }
    }
}

impl From<LocateError> for ExportError {
    fn from(err: LocateError) -> Self {
        match err {
            LocateError::ChartNotFound { sheet, name } => {
                ExportError::ChartNotFound { sheet, chart: name }
            }
            LocateError::InvalidAnchor(source) => ExportError::InvalidRange {
                expression: "chart anchor".to_string(),
                reason: source.to_string(),
            },
        }
    }
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}
