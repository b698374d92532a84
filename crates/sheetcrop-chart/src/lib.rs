//! # sheetcrop-chart
//!
//! Turns a chart's drawing anchor into the [`CellBox`](sheetcrop_core::CellBox)
//! of cells it covers.
//!
//! Charts are positioned by a starting cell plus an EMU offset, and end either
//! at another cell + offset or after a fixed EMU extent. [`ChartLocator`] maps
//! those to whole cells using the sheet's column widths and row heights,
//! rounding outward so the box always contains every pixel of the chart.

mod error;
pub mod geometry;
mod locator;

pub use error::{LocateError, Result};
pub use geometry::SheetGeometry;
pub use locator::ChartLocator;
