//! The six export operations over one source workbook.

use std::path::{Path, PathBuf};

use sheetcrop_chart::ChartLocator;
use sheetcrop_core::{CellBox, Workbook};
use sheetcrop_render::{LibreOfficeRenderer, RenderConfig, RenderPipeline, Renderer};
use sheetcrop_xlsx::WriteOptions;
use tracing::info;

use crate::builder::SubWorkbookBuilder;
use crate::error::{ExportError, Result};
use crate::range::RangeResolver;
use crate::request::{ExportRequest, OutputKind, Selector};

/// Exports ranges, whole sheets and chart footprints of a workbook.
///
/// The workbook is only read. Each call gets its own working directory, so
/// one exporter may serve any number of calls.
///
/// # Example
///
/// ```rust,no_run
/// use sheetcrop::prelude::*;
///
/// # fn example() -> sheetcrop::Result<()> {
/// let mut workbook = Workbook::new();
/// let sheet = workbook.worksheet_mut(0).unwrap();
/// sheet.set_cell_value("A1", 1.0).unwrap();
/// sheet.set_cell_value("B2", 4.0).unwrap();
///
/// let exporter = ExcelExporter::new(&workbook);
/// exporter.range_to_pdf("Sheet1", "A1:B2", "/tmp/range.pdf")?;
/// # Ok(())
/// # }
/// ```
pub struct ExcelExporter<'a, R = LibreOfficeRenderer> {
    workbook: &'a Workbook,
    pipeline: RenderPipeline<R>,
}

impl<'a> ExcelExporter<'a, LibreOfficeRenderer> {
    /// Exporter using LibreOffice and pdftoppm from PATH
    pub fn new(workbook: &'a Workbook) -> Self {
        Self::with_config(workbook, RenderConfig::default())
    }

    pub fn with_config(workbook: &'a Workbook, config: RenderConfig) -> Self {
        Self {
            workbook,
            pipeline: RenderPipeline::from_config(config),
        }
    }
}

impl<'a, R: Renderer> ExcelExporter<'a, R> {
    pub fn with_renderer(workbook: &'a Workbook, renderer: R) -> Self {
        Self::with_pipeline(workbook, RenderPipeline::new(renderer))
    }

    pub fn with_pipeline(workbook: &'a Workbook, pipeline: RenderPipeline<R>) -> Self {
        Self { workbook, pipeline }
    }

    pub fn workbook(&self) -> &Workbook {
        self.workbook
    }

    pub fn pipeline(&self) -> &RenderPipeline<R> {
        &self.pipeline
    }

    /// Run one export request, returning the path written
    pub fn export(&self, request: &ExportRequest) -> Result<PathBuf> {
        if request.output_path.as_os_str().is_empty() {
            return Err(ExportError::InvalidOutputPath);
        }
        let sheet_not_found = || ExportError::SheetNotFound {
            sheet: request.sheet_name.clone(),
        };
        let sheet_index = self
            .workbook
            .sheet_index(&request.sheet_name)
            .ok_or_else(sheet_not_found)?;
        let sheet = self
            .workbook
            .worksheet(sheet_index)
            .ok_or_else(sheet_not_found)?;

        info!(
            sheet = %request.sheet_name,
            selector = ?request.selector,
            output = %request.output_path.display(),
            kind = ?request.output_kind,
            "Starting export"
        );

        match &request.selector {
            Selector::WholeSheet => {
                RangeResolver::resolve_whole(sheet)?;
                // Formulas may refer into sheets the package leaves out
                Ok(self.pipeline.render_sheet(
                    self.workbook,
                    sheet_index,
                    WriteOptions::fit_to_page().with_cached_values(),
                    &request.output_path,
                    request.output_kind,
                )?)
            }
            Selector::Range(expression) => {
                let cell_box = RangeResolver::resolve(sheet, expression)?;
                self.render_box(request, &cell_box)
            }
            Selector::Chart(chart_name) => {
                let cell_box = ChartLocator::locate(sheet, chart_name)?;
                self.render_box(request, &cell_box)
            }
        }
    }

    fn render_box(&self, request: &ExportRequest, cell_box: &CellBox) -> Result<PathBuf> {
        let derived = SubWorkbookBuilder::build(self.workbook, &request.sheet_name, cell_box)?;
        Ok(self
            .pipeline
            .render(&derived, &request.output_path, request.output_kind)?)
    }

    pub fn range_to_pdf(
        &self,
        sheet_name: &str,
        range: &str,
        output_path: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        self.export(&ExportRequest::range(
            sheet_name,
            range,
            output_path.as_ref(),
            OutputKind::Page,
        ))
    }

    pub fn range_to_image(
        &self,
        sheet_name: &str,
        range: &str,
        output_path: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        self.export(&ExportRequest::range(
            sheet_name,
            range,
            output_path.as_ref(),
            OutputKind::Raster,
        ))
    }

    pub fn sheet_to_pdf(&self, sheet_name: &str, output_path: impl AsRef<Path>) -> Result<PathBuf> {
        self.export(&ExportRequest::whole_sheet(
            sheet_name,
            output_path.as_ref(),
            OutputKind::Page,
        ))
    }

    pub fn sheet_to_image(
        &self,
        sheet_name: &str,
        output_path: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        self.export(&ExportRequest::whole_sheet(
            sheet_name,
            output_path.as_ref(),
            OutputKind::Raster,
        ))
    }

    pub fn chart_to_pdf(
        &self,
        sheet_name: &str,
        chart_name: &str,
        output_path: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        self.export(&ExportRequest::chart(
            sheet_name,
            chart_name,
            output_path.as_ref(),
            OutputKind::Page,
        ))
    }

    pub fn chart_to_image(
        &self,
        sheet_name: &str,
        chart_name: &str,
        output_path: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        self.export(&ExportRequest::chart(
            sheet_name,
            chart_name,
            output_path.as_ref(),
            OutputKind::Raster,
        ))
    }
}
