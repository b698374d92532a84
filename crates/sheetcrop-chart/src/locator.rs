//! Chart lookup and anchor-to-box resolution

use sheetcrop_core::{AnchorExtent, CellBox, ChartAnchor, SheetChart, Worksheet};
use tracing::{debug, warn};

use crate::error::{LocateError, Result};
use crate::geometry::SheetGeometry;

/// Finds charts on a sheet and computes the cells they cover
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartLocator;

impl ChartLocator {
    /// Box of cells fully containing the chart named `chart_name`
    ///
    /// Names match exactly (case-sensitive) against the chart title, or the
    /// drawing object name for charts without a title. When several charts
    /// match, the first in drawing order wins. The box is clamped to the
    /// sheet's populated extent, see [`ChartLocator::populated_extent`].
    pub fn locate(sheet: &Worksheet, chart_name: &str) -> Result<CellBox> {
        let chart = Self::find(sheet, chart_name)?;
        let anchored = Self::anchor_box(sheet, &chart.anchor)?;
        let cell_box = Self::clamp_to_populated(sheet, anchored)?;
        if cell_box != anchored {
            debug!(
                sheet = sheet.name(),
                chart = chart_name,
                anchored = %anchored,
                "chart extends past the populated cells"
            );
        }
        debug!(
            sheet = sheet.name(),
            chart = chart_name,
            cell_box = %cell_box,
            "located chart"
        );
        Ok(cell_box)
    }

    /// First chart on the sheet matching `chart_name`
    pub fn find<'a>(sheet: &'a Worksheet, chart_name: &str) -> Result<&'a SheetChart> {
        let mut matches = sheet
            .charts()
            .iter()
            .filter(|chart| chart.display_name() == Some(chart_name));

        let first = matches.next().ok_or_else(|| LocateError::ChartNotFound {
            sheet: sheet.name().to_string(),
            name: chart_name.to_string(),
        })?;

        let others = matches.count();
        if others > 0 {
            warn!(
                sheet = sheet.name(),
                chart = chart_name,
                duplicates = others,
                "several charts share this name, using the first"
            );
        }

        Ok(first)
    }

    /// Box of cells covered by an anchor, rounded outward
    ///
    /// The top-left cell is the one containing the anchor's start point. The
    /// bottom-right cell is the one containing its end point, where an end
    /// point on a cell boundary keeps the cell before it. The box therefore
    /// never cuts into the chart and exceeds it by at most one cell per edge.
    pub fn anchor_box(sheet: &Worksheet, anchor: &ChartAnchor) -> Result<CellBox> {
        let geometry = SheetGeometry::new(sheet);
        let from = anchor.from;

        let first_col = geometry.column_starting_at(from.col, from.col_offset_emu);
        let first_row = geometry.row_starting_at(from.row, from.row_offset_emu);

        let (last_col, last_row) = match anchor.extent {
            AnchorExtent::To(to) => (
                geometry.column_ending_at(to.col, to.col_offset_emu),
                geometry.row_ending_at(to.row, to.row_offset_emu),
            ),
            AnchorExtent::Size { cx, cy } => {
                let right = from.col_offset_emu.max(0).saturating_add(cx.max(0));
                let bottom = from.row_offset_emu.max(0).saturating_add(cy.max(0));
                (
                    geometry.column_ending_at(from.col, right),
                    geometry.row_ending_at(from.row, bottom),
                )
            }
        };

        // Degenerate anchors (end before start) collapse onto the start cell
        let last_col = last_col.max(first_col);
        let last_row = last_row.max(first_row);

        Ok(CellBox::new(
            first_row + 1,
            first_col + 1,
            last_row + 1,
            last_col + 1,
        )?)
    }

    /// Last row and column (1-based) holding anything that prints: stored
    /// cells, format-only ones included, and every chart's anchored box.
    /// An empty sheet has the extent A1.
    pub fn populated_extent(sheet: &Worksheet) -> Result<(u32, u16)> {
        let (mut max_row, mut max_col) = sheet
            .used_range()
            .map(|used| (used.end.row + 1, used.end.col + 1))
            .unwrap_or((1, 1));

        for chart in sheet.charts() {
            let covered = Self::anchor_box(sheet, &chart.anchor)?;
            max_row = max_row.max(covered.row_end());
            max_col = max_col.max(covered.col_end());
        }
        Ok((max_row, max_col))
    }

    /// Shrink `cell_box` so it ends within the sheet's populated extent.
    ///
    /// A box lying wholly past the extent collapses onto its last row or
    /// column. Charts count toward the extent, so a chart's own box is never
    /// cut.
    pub fn clamp_to_populated(sheet: &Worksheet, cell_box: CellBox) -> Result<CellBox> {
        let (max_row, max_col) = Self::populated_extent(sheet)?;

        let row_end = cell_box.row_end().min(max_row);
        let col_end = cell_box.col_end().min(max_col);
        Ok(CellBox::new(
            cell_box.row_start().min(row_end),
            cell_box.col_start().min(col_end),
            row_end,
            col_end,
        )?)
    }
}
