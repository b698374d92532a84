//! Export requests.

use std::path::{Path, PathBuf};

pub use sheetcrop_render::OutputKind;

/// Which part of the sheet to export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Two-corner range expression, e.g. `"B2:D10"`
    Range(String),
    /// Chart title (or drawing name for untitled charts)
    Chart(String),
    /// Every populated cell of the sheet
    WholeSheet,
}

/// One export call: sheet, region, destination and format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub sheet_name: String,
    pub selector: Selector,
    pub output_path: PathBuf,
    pub output_kind: OutputKind,
}

impl ExportRequest {
    pub fn new(
        sheet_name: impl Into<String>,
        selector: Selector,
        output_path: impl Into<PathBuf>,
        output_kind: OutputKind,
    ) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            selector,
            output_path: output_path.into(),
            output_kind,
        }
    }

    pub fn range(
        sheet_name: impl Into<String>,
        expression: impl Into<String>,
        output_path: impl Into<PathBuf>,
        output_kind: OutputKind,
    ) -> Self {
        Self::new(
            sheet_name,
            Selector::Range(expression.into()),
            output_path,
            output_kind,
        )
    }

    pub fn chart(
        sheet_name: impl Into<String>,
        chart_name: impl Into<String>,
        output_path: impl Into<PathBuf>,
        output_kind: OutputKind,
    ) -> Self {
        Self::new(
            sheet_name,
            Selector::Chart(chart_name.into()),
            output_path,
            output_kind,
        )
    }

    pub fn whole_sheet(
        sheet_name: impl Into<String>,
        output_path: impl Into<PathBuf>,
        output_kind: OutputKind,
    ) -> Self {
        Self::new(sheet_name, Selector::WholeSheet, output_path, output_kind)
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}
