//! Linear conversion pipeline: PERSIST -> CONVERT_TO_PAGE ->
//! [CONVERT_TO_RASTER] -> FINALIZE.
//!
//! Every call works inside its own scoped temporary directory, removed on
//! every exit path. Only the final artifact leaves it, by being moved to the
//! caller's output path.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sheetcrop_core::Workbook;
use sheetcrop_xlsx::{WriteOptions, XlsxError, XlsxResult, XlsxWriter};
use tempfile::TempDir;
use tracing::{info, warn};

use crate::config::RenderConfig;
use crate::error::{RenderError, Result, Stage};
use crate::renderer::{LibreOfficeRenderer, Renderer};

/// Name of the workbook written during PERSIST
const WORKBOOK_FILE: &str = "export.xlsx";
/// What the page converter names its output for [`WORKBOOK_FILE`]
const PAGE_FILE: &str = "export.pdf";
/// File name prefix handed to the raster converter
const RASTER_PREFIX: &str = "page";

/// Kind of artifact the caller receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Page-description document (PDF)
    Page,
    /// Raster image
    Raster,
}

/// Runs the external conversion chain with an injected [`Renderer`].
#[derive(Debug, Clone)]
pub struct RenderPipeline<R> {
    renderer: R,
    work_dir_root: Option<PathBuf>,
}

impl RenderPipeline<LibreOfficeRenderer> {
    /// LibreOffice + pdftoppm pipeline, using the config's working directory root
    pub fn from_config(config: RenderConfig) -> Self {
        let work_dir_root = config.work_dir_root.clone();
        Self {
            renderer: LibreOfficeRenderer::new(config),
            work_dir_root,
        }
    }
}

impl<R: Renderer> RenderPipeline<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            work_dir_root: None,
        }
    }

    /// Create per-call working directories under `root` instead of the
    /// system temp dir
    pub fn with_work_dir_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.work_dir_root = Some(root.into());
        self
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Render every sheet of `workbook` to `output_path`.
    pub fn render(
        &self,
        workbook: &Workbook,
        output_path: &Path,
        kind: OutputKind,
    ) -> Result<PathBuf> {
        self.run(|path| XlsxWriter::write_file(workbook, path), output_path, kind)
    }

    /// Render only the sheet at `sheet_index`, applying `options` to the
    /// written copy.
    pub fn render_sheet(
        &self,
        workbook: &Workbook,
        sheet_index: usize,
        options: WriteOptions,
        output_path: &Path,
        kind: OutputKind,
    ) -> Result<PathBuf> {
        self.run(
            |path| XlsxWriter::write_sheet_file(workbook, sheet_index, options, path),
            output_path,
            kind,
        )
    }

    fn run<F>(&self, persist: F, output_path: &Path, kind: OutputKind) -> Result<PathBuf>
    where
        F: FnOnce(&Path) -> XlsxResult<()>,
    {
        let work_dir = self.create_work_dir()?;
        let result = self.run_stages(work_dir.path(), persist, output_path, kind);

        let dir = work_dir.path().to_path_buf();
        if let Err(e) = work_dir.close() {
            warn!(dir = %dir.display(), error = %e, "Failed to remove working directory");
        }
        result
    }

    fn create_work_dir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("sheetcrop-");
        let dir = match &self.work_dir_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.map_err(|e| RenderError::Serialization(XlsxError::Io(e)))
    }

    fn run_stages<F>(
        &self,
        dir: &Path,
        persist: F,
        output_path: &Path,
        kind: OutputKind,
    ) -> Result<PathBuf>
    where
        F: FnOnce(&Path) -> XlsxResult<()>,
    {
        info!(stage = %Stage::Persist, dir = %dir.display(), "Writing temporary workbook");
        let workbook_path = dir.join(WORKBOOK_FILE);
        persist(&workbook_path)?;

        info!(stage = %Stage::ConvertToPage, "Converting workbook to PDF");
        let output = self
            .renderer
            .convert_to_page(&workbook_path, dir)
            .map_err(|f| f.into_render_error(Stage::ConvertToPage))?;
        let page_path = dir.join(PAGE_FILE);
        if !page_path.is_file() {
            return Err(RenderError::Conversion {
                exit_code: output.exit_code,
                stderr: missing_output(&output.stderr, PAGE_FILE),
            });
        }

        let artifact = match kind {
            OutputKind::Page => page_path,
            OutputKind::Raster => {
                info!(stage = %Stage::ConvertToRaster, "Rasterizing PDF");
                let output = self
                    .renderer
                    .convert_to_raster(&page_path, &dir.join(RASTER_PREFIX))
                    .map_err(|f| f.into_render_error(Stage::ConvertToRaster))?;

                let mut images = raster_outputs(dir, RASTER_PREFIX).map_err(|e| {
                    RenderError::RasterConversion {
                        exit_code: output.exit_code,
                        stderr: e.to_string(),
                    }
                })?;
                match images.len() {
                    0 => {
                        return Err(RenderError::RasterConversion {
                            exit_code: output.exit_code,
                            stderr: missing_output(&output.stderr, RASTER_PREFIX),
                        })
                    }
                    1 => images.remove(0),
                    pages => return Err(RenderError::UnexpectedPageCount { pages }),
                }
            }
        };

        info!(stage = %Stage::Finalize, output = %output_path.display(), "Moving artifact into place");
        move_file(&artifact, output_path).map_err(|source| RenderError::OutputWrite {
            path: output_path.to_path_buf(),
            source,
        })?;

        info!(output = %output_path.display(), "Export written");
        Ok(output_path.to_path_buf())
    }
}

fn missing_output(stderr: &str, expected: &str) -> String {
    if stderr.is_empty() {
        format!("no {expected} output was produced")
    } else {
        format!("no {expected} output was produced: {stderr}")
    }
}

/// Files named `<prefix>-<digits>.<ext>` in `dir`, sorted
fn raster_outputs(dir: &Path, prefix: &str) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(rest) = name.strip_prefix(prefix).and_then(|r| r.strip_prefix('-')) else {
            continue;
        };
        let page = rest.split('.').next().unwrap_or_default();
        if !page.is_empty() && page.bytes().all(|b| b.is_ascii_digit()) && entry.path().is_file() {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

/// Move `from` to `to`, overwriting `to` and creating its parent directories.
/// Falls back to copy + delete when a rename is not possible.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    if to.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            "output path is a directory",
        ));
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}
