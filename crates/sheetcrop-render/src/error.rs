//! Error types for the conversion pipeline.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use sheetcrop_xlsx::XlsxError;
use thiserror::Error;

/// Pipeline stage, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Persist,
    ConvertToPage,
    ConvertToRaster,
    Finalize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Persist => "PERSIST",
            Stage::ConvertToPage => "CONVERT_TO_PAGE",
            Stage::ConvertToRaster => "CONVERT_TO_RASTER",
            Stage::Finalize => "FINALIZE",
        })
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing the temporary workbook (or its working directory) failed
    #[error("Failed to write temporary workbook: {0}")]
    Serialization(#[from] XlsxError),

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
}

pub type Result<T> = std::result::Result<T, RenderError>;

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// How an external tool failed
#[derive(Debug, Error)]
pub enum ToolFailure {
    #[error("{program} exited unsuccessfully ({}): {stderr}", exit_status(.exit_code))]
    Exited {
        program: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("{program} did not finish within {limit:?}")]
    TimedOut { program: String, limit: Duration },

    #[error("{0} not found. Install it and ensure it is in PATH.")]
    NotFound(String),

    #[error("Failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl ToolFailure {
    /// Map to the pipeline error for the stage that invoked the tool
    pub(crate) fn into_render_error(self, stage: Stage) -> RenderError {
        let (exit_code, stderr) = match self {
            ToolFailure::TimedOut { limit, .. } => {
                return RenderError::ConversionTimeout {
                    stage,
                    timeout: limit,
                }
            }
            ToolFailure::Exited {
                exit_code, stderr, ..
            } => (exit_code, stderr),
            other => (None, other.to_string()),
        };

        match stage {
            Stage::ConvertToRaster => RenderError::RasterConversion { exit_code, stderr },
            _ => RenderError::Conversion { exit_code, stderr },
        }
    }
}
