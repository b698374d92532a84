//! Range expressions and whole-sheet bounds.

use sheetcrop_core::{CellAddress, CellBox, Worksheet};
use tracing::debug;

use crate::error::{ExportError, Result};

/// Turns a user range expression or a whole-sheet request into a [`CellBox`].
pub struct RangeResolver;

impl RangeResolver {
    /// Resolve a two-corner expression such as `"B2:D10"`.
    ///
    /// Corners may be given in any order and may carry `$` markers. A single
    /// address without `:` is rejected; `"B2:B2"` is the single-cell form.
    /// The box is not clipped to the populated area.
    pub fn resolve(sheet: &Worksheet, expression: &str) -> Result<CellBox> {
        let invalid = |reason: String| ExportError::InvalidRange {
            expression: expression.to_string(),
            reason,
        };

        let (first, second) = expression
            .trim()
            .split_once(':')
            .ok_or_else(|| invalid("expected two corners separated by ':'".to_string()))?;
        if second.contains(':') {
            return Err(invalid("expected exactly two corners".to_string()));
        }

        let first = CellAddress::parse(first).map_err(|e| invalid(e.to_string()))?;
        let second = CellAddress::parse(second).map_err(|e| invalid(e.to_string()))?;

        let cell_box = CellBox::from_corners(first, second);
        debug!(sheet = sheet.name(), %expression, %cell_box, "Resolved range");
        Ok(cell_box)
    }

    /// Minimal box around every populated cell of the sheet.
    ///
    /// Cells that only carry formatting count as populated.
    pub fn resolve_whole(sheet: &Worksheet) -> Result<CellBox> {
        let used = sheet.used_range().ok_or_else(|| ExportError::EmptySheet {
            sheet: sheet.name().to_string(),
        })?;
        let cell_box = CellBox::from_range(&used);
        debug!(sheet = sheet.name(), %cell_box, "Resolved whole sheet");
        Ok(cell_box)
    }
}
