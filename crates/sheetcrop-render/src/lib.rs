//! External rendering pipeline for sheetcrop.
//!
//! The pipeline writes a workbook to a scoped temporary directory, converts it
//! to PDF with headless LibreOffice, optionally rasterizes the PDF with
//! `pdftoppm`, and moves the single resulting artifact to the caller's path.
//!
//! ```text
//! PERSIST -> CONVERT_TO_PAGE -> [CONVERT_TO_RASTER] -> FINALIZE
//! ```
//!
//! The converters sit behind the [`Renderer`] trait so tests can swap in a
//! fake.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::time::Duration;
//!
//! use sheetcrop_core::Workbook;
//! use sheetcrop_render::{LibreOfficeRenderer, OutputKind, RenderConfig, RenderPipeline};
//!
//! # fn example() -> sheetcrop_render::Result<()> {
//! let config = RenderConfig::default().with_timeout(Duration::from_secs(60));
//! let pipeline = RenderPipeline::new(LibreOfficeRenderer::new(config));
//!
//! let mut workbook = Workbook::new();
//! workbook.worksheet_mut(0).unwrap().set_cell_value("A1", 42.0).unwrap();
//!
//! pipeline.render(&workbook, Path::new("/tmp/out.pdf"), OutputKind::Page)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod renderer;

pub use config::{RasterFormat, RenderConfig};
pub use error::{RenderError, Result, Stage, ToolFailure};
pub use pipeline::{OutputKind, RenderPipeline};
pub use renderer::{LibreOfficeRenderer, Renderer, ToolOutput};
