//! Prelude module - common imports for sheetcrop users
//!
//! ```rust
//! use sheetcrop::prelude::*;
//! ```

pub use crate::{
    // Model
    AnchorMarker,
    CellBox,
    CellValue,
    ChartAnchor,
    ChartKind,
    ChartSeries,
    SeriesData,
    SheetChart,
    Style,
    Workbook,
    Worksheet,

    // Export
    ErrorKind,
    ExcelExporter,
    ExportError,
    ExportRequest,
    OutputKind,
    Selector,

    // Rendering
    LibreOfficeRenderer,
    RasterFormat,
    RenderConfig,
    Renderer,
};
