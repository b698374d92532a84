//! Chart placement metadata
//!
//! Charts live in a sheet's drawing part and are positioned by anchors, not
//! by cell ranges. An anchor names a starting cell plus an offset into it
//! and either an ending cell (two-cell anchor) or an absolute extent
//! (one-cell anchor). Offsets and extents are in EMUs (English Metric
//! Units, 914400 per inch).

/// A cell position inside a drawing anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnchorMarker {
    /// Row index (0-based)
    pub row: u32,
    /// Column index (0-based)
    pub col: u16,
    /// Offset into the row from its top edge, in EMUs
    pub row_offset_emu: i64,
    /// Offset into the column from its left edge, in EMUs
    pub col_offset_emu: i64,
}

impl AnchorMarker {
    /// Marker at the top-left corner of a cell
    pub fn at(row: u32, col: u16) -> Self {
        Self {
            row,
            col,
            row_offset_emu: 0,
            col_offset_emu: 0,
        }
    }

    /// Marker with sub-cell offsets
    pub fn with_offset(mut self, col_offset_emu: i64, row_offset_emu: i64) -> Self {
        self.col_offset_emu = col_offset_emu;
        self.row_offset_emu = row_offset_emu;
        self
    }
}

/// Where an anchored object ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnchorExtent {
    /// `xdr:twoCellAnchor` - ends at another marker
    To(AnchorMarker),
    /// `xdr:oneCellAnchor` - fixed width/height in EMUs
    Size { cx: i64, cy: i64 },
}

/// A chart's anchor within its sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartAnchor {
    pub from: AnchorMarker,
    pub extent: AnchorExtent,
}

impl ChartAnchor {
    /// Two-cell anchor
    pub fn two_cell(from: AnchorMarker, to: AnchorMarker) -> Self {
        Self {
            from,
            extent: AnchorExtent::To(to),
        }
    }

    /// One-cell anchor with an absolute size
    pub fn one_cell(from: AnchorMarker, cx: i64, cy: i64) -> Self {
        Self {
            from,
            extent: AnchorExtent::Size { cx, cy },
        }
    }

    /// The same anchor with `rows` rows and `cols` columns removed above and
    /// to the left. A marker that would land before the first row or column
    /// is pinned to its edge with no offset.
    pub fn translated(&self, rows: u32, cols: u16) -> Self {
        let shift = |m: AnchorMarker| AnchorMarker {
            row: m.row.saturating_sub(rows),
            col: m.col.saturating_sub(cols),
            row_offset_emu: if m.row < rows { 0 } else { m.row_offset_emu },
            col_offset_emu: if m.col < cols { 0 } else { m.col_offset_emu },
        };
        Self {
            from: shift(self.from),
            extent: match self.extent {
                AnchorExtent::To(to) => AnchorExtent::To(shift(to)),
                size => size,
            },
        }
    }
}

/// Plot type of a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChartKind {
    /// Vertical bars
    #[default]
    Column,
    /// Horizontal bars
    Bar,
    Line,
    Pie,
    Area,
    /// X/Y points; categories hold the X values
    Scatter,
}

/// Data behind one side of a series
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SeriesData {
    /// A1 reference such as `'Sales Data'!$B$2:$B$13`. Without a sheet
    /// prefix it points into the chart's own sheet
    Reference(String),
    /// Literal numbers; `None` is a gap
    Numbers(Vec<Option<f64>>),
    /// Literal labels
    Strings(Vec<String>),
}

impl SeriesData {
    pub fn reference<S: Into<String>>(reference: S) -> Self {
        SeriesData::Reference(reference.into())
    }

    pub fn numbers<I: IntoIterator<Item = f64>>(values: I) -> Self {
        SeriesData::Numbers(values.into_iter().map(Some).collect())
    }

    pub fn strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SeriesData::Strings(values.into_iter().map(Into::into).collect())
    }

    /// True once the data no longer depends on any cell
    pub fn is_literal(&self) -> bool {
        !matches!(self, SeriesData::Reference(_))
    }

    /// Number of points
    pub fn len(&self) -> Option<usize> {
        match self {
            SeriesData::Reference(_) => None,
            SeriesData::Numbers(values) => Some(values.len()),
            SeriesData::Strings(values) => Some(values.len()),
        }
    }
}

/// One plotted series
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartSeries {
    pub name: Option<String>,
    pub values: SeriesData,
    pub categories: Option<SeriesData>,
}

impl ChartSeries {
    pub fn new(values: SeriesData) -> Self {
        Self {
            name: None,
            values,
            categories: None,
        }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_categories(mut self, categories: SeriesData) -> Self {
        self.categories = Some(categories);
        self
    }

    /// True when neither side of the series refers to cells
    pub fn is_literal(&self) -> bool {
        self.values.is_literal() && self.categories.as_ref().map_or(true, SeriesData::is_literal)
    }
}

/// A chart placed on a worksheet
///
/// Holds what is needed to find the chart, crop to it, and draw it again in
/// a derived workbook: titles, the anchor, the plot type and its series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetChart {
    /// Title text shown on the chart, if it has one
    pub title: Option<String>,
    /// Drawing object name (`xdr:cNvPr@name`, e.g. "Chart 1")
    pub name: Option<String>,
    pub anchor: ChartAnchor,
    pub kind: ChartKind,
    pub series: Vec<ChartSeries>,
}

impl SheetChart {
    /// Create an empty column chart with no title or name
    pub fn new(anchor: ChartAnchor) -> Self {
        Self {
            title: None,
            name: None,
            anchor,
            kind: ChartKind::default(),
            series: Vec::new(),
        }
    }

    /// Set the chart title
    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the drawing object name
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_kind(mut self, kind: ChartKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_series(mut self, series: ChartSeries) -> Self {
        self.series.push(series);
        self
    }

    /// Name the chart is looked up by: its title, or the drawing object
    /// name for untitled charts
    pub fn display_name(&self) -> Option<&str> {
        self.title.as_deref().or(self.name.as_deref())
    }
}

/// Split `'My Sheet'!$B$2:$B$9` into its sheet name (if any) and range text
pub(crate) fn split_reference(reference: &str) -> (Option<String>, &str) {
    let reference = reference.trim();
    let reference = reference.strip_prefix('=').unwrap_or(reference);
    match reference.rsplit_once('!') {
        Some((sheet, range)) => {
            let sheet = match sheet.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
                Some(quoted) => quoted.replace("''", "'"),
                None => sheet.to_string(),
            };
            (Some(sheet), range)
        }
        None => (None, reference),
    }
}
