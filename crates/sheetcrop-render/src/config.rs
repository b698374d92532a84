//! Configuration for the external conversion tools.

use std::path::PathBuf;
use std::time::Duration;

/// Raster encoding produced by the page-to-image converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RasterFormat {
    #[default]
    Png,
    Jpeg,
    Tiff,
}

impl RasterFormat {
    /// pdftoppm output selector
    pub fn pdftoppm_flag(&self) -> &'static str {
        match self {
            RasterFormat::Png => "-png",
            RasterFormat::Jpeg => "-jpeg",
            RasterFormat::Tiff => "-tiff",
        }
    }

    /// Extension pdftoppm gives the files it writes
    pub fn extension(&self) -> &'static str {
        match self {
            RasterFormat::Png => "png",
            RasterFormat::Jpeg => "jpg",
            RasterFormat::Tiff => "tif",
        }
    }
}

/// Configuration for [`LibreOfficeRenderer`](crate::LibreOfficeRenderer) and
/// the pipeline's working directory.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Path to the `soffice` executable. If None, searches PATH.
    pub soffice_path: Option<PathBuf>,
    /// Path to the `pdftoppm` executable. If None, searches PATH.
    pub pdftoppm_path: Option<PathBuf>,
    /// Wall-clock limit per subprocess. None waits indefinitely.
    pub timeout: Option<Duration>,
    /// Raster resolution in dots per inch. Default: 150.
    pub resolution_dpi: u32,
    /// Raster encoding. Default: PNG.
    pub raster_format: RasterFormat,
    /// Extra arguments passed to soffice before the input file.
    pub extra_soffice_args: Vec<String>,
    /// Parent of the per-call working directory. None uses the system temp dir.
    pub work_dir_root: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            soffice_path: None,
            pdftoppm_path: None,
            timeout: None,
            resolution_dpi: 150,
            raster_format: RasterFormat::Png,
            extra_soffice_args: Vec::new(),
            work_dir_root: None,
        }
    }
}

impl RenderConfig {
    pub fn with_soffice_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.soffice_path = Some(path.into());
        self
    }

    pub fn with_pdftoppm_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.pdftoppm_path = Some(path.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_resolution_dpi(mut self, dpi: u32) -> Self {
        self.resolution_dpi = dpi;
        self
    }

    pub fn with_raster_format(mut self, format: RasterFormat) -> Self {
        self.raster_format = format;
        self
    }

    pub fn with_extra_soffice_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_soffice_args.push(arg.into());
        self
    }

    pub fn with_work_dir_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.work_dir_root = Some(root.into());
        self
    }

    /// Executable used for page conversion
    pub fn soffice(&self) -> PathBuf {
        self.soffice_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("soffice"))
    }

    /// Executable used for raster conversion
    pub fn pdftoppm(&self) -> PathBuf {
        self.pdftoppm_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("pdftoppm"))
    }
}
