//! Minimal derived workbooks cropped to a [`CellBox`].

use sheetcrop_chart::ChartLocator;
use sheetcrop_core::{CellAddress, CellBox, CellRange, Workbook, Worksheet};
use tracing::debug;

use crate::error::{ExportError, Result};

/// Builds a single-sheet workbook holding only the cells inside a box.
///
/// The box's top-left cell becomes A1 of the derived sheet. Values, styles,
/// column widths, row heights, hidden flags and merges (clipped to the box)
/// are carried over; nothing outside the box is referenced. Formulas are
/// replaced by their cached results. Charts lying wholly inside the box are
/// re-anchored with their series turned into literal data. The derived sheet
/// is set to print on exactly one page covering exactly the box.
pub struct SubWorkbookBuilder;

impl SubWorkbookBuilder {
    pub fn build(source: &Workbook, sheet_name: &str, cell_box: &CellBox) -> Result<Workbook> {
        let sheet = source
            .worksheet_by_name(sheet_name)
            .ok_or_else(|| ExportError::SheetNotFound {
                sheet: sheet_name.to_string(),
            })?;

        let mut derived_sheet = Self::crop(sheet, cell_box)?;
        Self::carry_charts(source, sheet, cell_box, &mut derived_sheet)?;

        let mut derived = Workbook::empty();
        derived
            .add_existing_worksheet(derived_sheet)
            .map_err(|source| ExportError::StyleCopy {
                location: format!("sheet '{sheet_name}'"),
                source,
            })?;
        Ok(derived)
    }

    /// Copy the boxed cells of `sheet` into a new worksheet of the same name
    pub fn crop(sheet: &Worksheet, cell_box: &CellBox) -> Result<Worksheet> {
        let mut derived = Worksheet::new(sheet.name());
        derived.set_default_row_height(sheet.default_row_height());
        derived.set_default_column_width(sheet.default_column_width());

        let region = cell_box.to_range();
        let row_off = region.start.row;
        let col_off = region.start.col;

        for (row, col, cell) in sheet.iter_cells_in(region) {
            let (r, c) = (row - row_off, col - col_off);
            let copy_err = |source| ExportError::StyleCopy {
                location: format!("cell {}", CellAddress::new(row, col)),
                source,
            };

            // A formula would point at cells that moved or were left out
            derived
                .set_cell_value_at(r, c, cell.value.displayed())
                .map_err(copy_err)?;
            if cell.style_index != 0 {
                let style = sheet.style_by_index(cell.style_index).ok_or_else(|| {
                    copy_err(sheetcrop_core::Error::StyleNotFound(cell.style_index))
                })?;
                derived.set_cell_style_at(r, c, style).map_err(copy_err)?;
            }
        }

        let rows = region.start.row..=region.end.row;
        for (&row, &height) in sheet.custom_row_heights().range(rows.clone()) {
            derived.set_row_height(row - row_off, height);
        }
        for (&row, &hidden) in sheet.hidden_rows().range(rows) {
            derived.set_row_hidden(row - row_off, hidden);
        }

        let cols = region.start.col..=region.end.col;
        for (&col, &width) in sheet.custom_column_widths().range(cols.clone()) {
            derived.set_column_width(col - col_off, width);
        }
        for (&col, &hidden) in sheet.hidden_columns().range(cols) {
            derived.set_column_hidden(col - col_off, hidden);
        }

        for merge in sheet.merged_regions() {
            let Some(clipped) = cell_box.translate_range(merge) else {
                continue;
            };
            // A merge clipped down to one cell is no merge at all
            if clipped.start == clipped.end {
                continue;
            }
            derived
                .merge_cells(&clipped)
                .map_err(|source| ExportError::StyleCopy {
                    location: format!("merged region {merge}"),
                    source,
                })?;
        }

        let mut page_setup = sheet.page_setup().fit_to_single_page();
        page_setup.print_area = Some(CellRange::from_indices(
            0,
            0,
            cell_box.row_count() - 1,
            cell_box.col_count() - 1,
        ));
        *derived.page_setup_mut() = page_setup;

        debug!(
            sheet = sheet.name(),
            %cell_box,
            cells = derived.cell_count(),
            merges = derived.merged_regions().len(),
            "Built derived sheet"
        );
        Ok(derived)
    }

    /// Re-anchor the charts that fit inside `cell_box` onto `derived`.
    ///
    /// Series references are resolved against `source`. The cells they name
    /// may lie outside the box or on another sheet. Charts only partly inside
    /// the box are left out.
    fn carry_charts(
        source: &Workbook,
        sheet: &Worksheet,
        cell_box: &CellBox,
        derived: &mut Worksheet,
    ) -> Result<()> {
        let row_off = cell_box.row_start() - 1;
        let col_off = cell_box.col_start() - 1;

        for chart in sheet.charts() {
            let covered = ChartLocator::anchor_box(sheet, &chart.anchor)?;
            if cell_box.intersect(&covered) != Some(covered) {
                continue;
            }

            let mut carried = source.resolve_chart(sheet.name(), chart).map_err(|source| {
                ExportError::ChartData {
                    chart: chart.display_name().unwrap_or("untitled").to_string(),
                    source,
                }
            })?;
            carried.anchor = chart.anchor.translated(row_off, col_off);
            debug!(
                sheet = sheet.name(),
                chart = carried.display_name().unwrap_or("untitled"),
                covered = %covered,
                "Carried chart"
            );
            derived.add_chart(carried);
        }
        Ok(())
    }
}
