//! # sheetcrop
//!
//! Export part of a spreadsheet to PDF or a raster image: an explicit cell
//! range, a whole sheet, or exactly the cells a named chart covers.
//!
//! The external renderer (headless LibreOffice) can only print whole sheets,
//! so a range or chart export first builds a minimal derived workbook holding
//! only the selected cells, with their styles, dimensions, merges and the
//! charts drawn over them, and prints that on a single page.
//!
//! ```text
//! ExportRequest
//!   -> RangeResolver | ChartLocator      (CellBox)
//!   -> SubWorkbookBuilder                (derived workbook, skipped for whole sheets)
//!   -> RenderPipeline                    (xlsx -> pdf -> [png])
//!   -> output file
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use sheetcrop::prelude::*;
//!
//! # fn example() -> sheetcrop::Result<()> {
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", "Region").unwrap();
//! sheet.set_cell_value("B1", 1250.0).unwrap();
//! sheet.add_chart(
//!     SheetChart::new(ChartAnchor::two_cell(
//!         AnchorMarker::at(2, 2),
//!         AnchorMarker::at(14, 5),
//!     ))
//!     .with_title("Sales Chart")
//!     .with_series(ChartSeries::new(SeriesData::reference("B1:B1")).with_name("Total")),
//! );
//!
//! let exporter = ExcelExporter::new(&workbook);
//! exporter.range_to_pdf("Sheet1", "A1:B1", "/tmp/header.pdf")?;
//! exporter.chart_to_image("Sheet1", "Sales Chart", "/tmp/chart.png")?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod error;
pub mod exporter;
pub mod prelude;
pub mod range;
pub mod request;

pub use builder::SubWorkbookBuilder;
pub use error::{ErrorKind, ExportError, Result};
pub use exporter::ExcelExporter;
pub use range::RangeResolver;
pub use request::{ExportRequest, OutputKind, Selector};

pub use sheetcrop_chart::{ChartLocator, SheetGeometry};
pub use sheetcrop_core::{
    AnchorExtent, AnchorMarker, CellAddress, CellBox, CellRange, CellValue, ChartAnchor, ChartKind,
    ChartSeries, Color, PageOrientation, PageSetup, SeriesData, SheetChart, Style, Workbook,
    Worksheet,
};
pub use sheetcrop_render::{
    LibreOfficeRenderer, RasterFormat, RenderConfig, RenderPipeline, Renderer, Stage, ToolFailure,
    ToolOutput,
};
pub use sheetcrop_xlsx::{WriteOptions, XlsxWriter};
