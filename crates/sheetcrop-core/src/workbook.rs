//! Workbook type - the main document structure

use crate::cell::{CellRange, CellValue};
use crate::drawing::{split_reference, ChartSeries, SeriesData, SheetChart};
use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// A workbook (spreadsheet document)
#[derive(Debug)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
}

impl Workbook {
    /// Create a new workbook with one worksheet named "Sheet1"
    pub fn new() -> Self {
        Self {
            worksheets: vec![Worksheet::new("Sheet1")],
        }
    }

    /// Create an empty workbook with no worksheets
    pub fn empty() -> Self {
        Self {
            worksheets: Vec::new(),
        }
    }

    /// Get the number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Check if the workbook has no worksheets
    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    /// Get a worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Get a mutable worksheet by index
    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Get a worksheet by exact name
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|ws| ws.name() == name)
    }

    /// Get a worksheet by name, failing with [`Error::SheetNotFound`]
    pub fn require_worksheet(&self, name: &str) -> Result<&Worksheet> {
        self.worksheet_by_name(name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))
    }

    /// Get the index of a worksheet by exact name
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.worksheets.iter().position(|ws| ws.name() == name)
    }

    /// Iterate over all worksheets
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Add a new worksheet with specified name, returning its index
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.validate_sheet_name(name)?;
        self.worksheets.push(Worksheet::new(name));
        Ok(self.worksheets.len() - 1)
    }

    /// Add an existing worksheet to the workbook
    pub fn add_existing_worksheet(&mut self, worksheet: Worksheet) -> Result<usize> {
        self.validate_sheet_name(worksheet.name())?;
        self.worksheets.push(worksheet);
        Ok(self.worksheets.len() - 1)
    }

    /// Rename a worksheet
    pub fn rename_worksheet(&mut self, index: usize, new_name: &str) -> Result<()> {
        if index >= self.worksheets.len() {
            return Err(Error::SheetNotFound(format!("index {}", index)));
        }
        self.validate_sheet_name_excluding(new_name, Some(index))?;
        self.worksheets[index].set_name(new_name);
        Ok(())
    }

    /// Replace a cell reference with the values its cells currently show.
    ///
    /// References without a sheet prefix point into `sheet`. Cells past the
    /// referenced sheet's last used row and column are dropped. Literal data
    /// comes back unchanged.
    pub fn resolve_series_data(&self, sheet: &str, data: &SeriesData) -> Result<SeriesData> {
        let SeriesData::Reference(reference) = data else {
            return Ok(data.clone());
        };
        let (target, range_text) = split_reference(reference);
        let worksheet = self.require_worksheet(target.as_deref().unwrap_or(sheet))?;
        let range = CellRange::parse(range_text)
            .map_err(|e| Error::InvalidRange(format!("{reference}: {e}")))?;

        let values: Vec<CellValue> = worksheet
            .used_range()
            .and_then(|used| {
                CellRange::from_indices(0, 0, used.end.row, used.end.col).intersect(&range)
            })
            .map(|populated| {
                populated
                    .cells()
                    .map(|addr| worksheet.get_value_at(addr.row, addr.col).displayed())
                    .collect()
            })
            .unwrap_or_default();

        let numeric = values
            .iter()
            .all(|v| matches!(v, CellValue::Number(_) | CellValue::Empty));
        Ok(if numeric {
            SeriesData::Numbers(values.iter().map(CellValue::as_number).collect())
        } else {
            SeriesData::Strings(values.iter().map(ToString::to_string).collect())
        })
    }

    /// Copy of `chart` with every series reference replaced by literal data
    pub fn resolve_chart(&self, sheet: &str, chart: &SheetChart) -> Result<SheetChart> {
        let series = chart
            .series
            .iter()
            .map(|s| {
                Ok(ChartSeries {
                    name: s.name.clone(),
                    values: self.resolve_series_data(sheet, &s.values)?,
                    categories: s
                        .categories
                        .as_ref()
                        .map(|c| self.resolve_series_data(sheet, c))
                        .transpose()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(SheetChart {
            series,
            ..chart.clone()
        })
    }

    fn validate_sheet_name(&self, name: &str) -> Result<()> {
        self.validate_sheet_name_excluding(name, None)
    }

    fn validate_sheet_name_excluding(&self, name: &str, exclude: Option<usize>) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name too long (max {} characters)",
                MAX_SHEET_NAME_LEN
            )));
        }

        const INVALID_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];
        if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name cannot contain '{}'",
                c
            )));
        }

        // Duplicates are case-insensitive
        let name_lower = name.to_lowercase();
        let duplicate = self
            .worksheets
            .iter()
            .enumerate()
            .any(|(i, ws)| Some(i) != exclude && ws.name().to_lowercase() == name_lower);
        if duplicate {
            return Err(Error::DuplicateSheetName(name.into()));
        }

        Ok(())
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_workbook() {
        let wb = Workbook::new();
        assert_eq!(wb.sheet_count(), 1);
        assert_eq!(wb.worksheet(0).unwrap().name(), "Sheet1");
        assert!(Workbook::empty().is_empty());
    }

    #[test]
    fn test_add_worksheets() {
        let mut wb = Workbook::new();

        let idx = wb.add_worksheet_with_name("Data").unwrap();
        assert_eq!(idx, 1);
        assert_eq!(wb.sheet_index("Data"), Some(1));
        assert_eq!(wb.worksheet(1).unwrap().name(), "Data");
    }

    #[test]
    fn test_duplicate_name() {
        let mut wb = Workbook::new();

        assert!(wb.add_worksheet_with_name("SHEET1").is_err());
        assert!(wb.add_worksheet_with_name("sheet1").is_err());
    }

    #[test]
    fn test_invalid_sheet_name() {
        let mut wb = Workbook::new();

        assert!(wb.add_worksheet_with_name("").is_err());
        assert!(wb.add_worksheet_with_name("Sheet/1").is_err());
        assert!(wb.add_worksheet_with_name("Sheet[1]").is_err());

        let long_name = "A".repeat(MAX_SHEET_NAME_LEN + 1);
        assert!(wb.add_worksheet_with_name(&long_name).is_err());
    }

    #[test]
    fn test_sheet_lookup_is_exact() {
        let mut wb = Workbook::new();
        wb.add_worksheet_with_name("Data").unwrap();

        assert!(wb.worksheet_by_name("Data").is_some());
        assert!(wb.worksheet_by_name("data").is_none());
        assert!(matches!(
            wb.require_worksheet("Missing"),
            Err(Error::SheetNotFound(name)) if name == "Missing"
        ));
    }

    #[test]
    fn test_rename_worksheet() {
        let mut wb = Workbook::new();
        wb.add_worksheet_with_name("Data").unwrap();

        wb.rename_worksheet(0, "Summary").unwrap();
        assert_eq!(wb.worksheet(0).unwrap().name(), "Summary");
        assert!(wb.rename_worksheet(1, "summary").is_err());
        assert!(wb.rename_worksheet(5, "Other").is_err());
    }

    fn chart_workbook() -> Workbook {
        let mut wb = Workbook::new();
        wb.add_worksheet_with_name("Sales Data").unwrap();
        let data = wb.worksheet_mut(1).unwrap();
        for (row, month, total) in [(1u32, "Jan", 10.0), (2, "Feb", 12.5), (3, "Mar", 9.0)] {
            data.set_cell_value_at(row, 0, month).unwrap();
            data.set_cell_value_at(row, 1, total).unwrap();
        }
        let doubled = CellValue::Formula {
            text: "=B2*2".into(),
            cached_value: Some(Box::new(CellValue::Number(20.0))),
        };
        data.set_cell_value("C2", doubled).unwrap();
        wb
    }

    #[test]
    fn test_resolve_series_reference() {
        let wb = chart_workbook();

        assert_eq!(
            wb.resolve_series_data("Sheet1", &SeriesData::reference("'Sales Data'!$B$2:$B$4"))
                .unwrap(),
            SeriesData::numbers([10.0, 12.5, 9.0])
        );
        assert_eq!(
            wb.resolve_series_data("Sales Data", &SeriesData::reference("A2:A4")).unwrap(),
            SeriesData::strings(["Jan", "Feb", "Mar"])
        );
        // Formulas give their cached result; cells past the data are dropped
        assert_eq!(
            wb.resolve_series_data("Sales Data", &SeriesData::reference("C2:C100")).unwrap(),
            SeriesData::Numbers(vec![Some(20.0), None, None])
        );
    }

    #[test]
    fn test_resolve_series_errors() {
        let wb = chart_workbook();

        assert!(matches!(
            wb.resolve_series_data("Sheet1", &SeriesData::reference("Nowhere!A1:A2")),
            Err(Error::SheetNotFound(name)) if name == "Nowhere"
        ));
        assert!(matches!(
            wb.resolve_series_data("Sheet1", &SeriesData::reference("B:B")),
            Err(Error::InvalidRange(_))
        ));
    }

    #[test]
    fn test_resolve_chart_keeps_placement() {
        use crate::drawing::{AnchorMarker, ChartAnchor, ChartKind};

        let anchor = ChartAnchor::two_cell(AnchorMarker::at(1, 1), AnchorMarker::at(5, 4));
        let chart = SheetChart::new(anchor)
            .with_title("Monthly")
            .with_kind(ChartKind::Line)
            .with_series(
                ChartSeries::new(SeriesData::reference("'Sales Data'!B2:B4"))
                    .with_name("Total")
                    .with_categories(SeriesData::reference("'Sales Data'!A2:A4")),
            );

        let resolved = chart_workbook().resolve_chart("Sheet1", &chart).unwrap();
        assert_eq!(resolved.anchor, chart.anchor);
        assert_eq!(resolved.kind, ChartKind::Line);
        assert!(resolved.series[0].is_literal());
        assert_eq!(resolved.series[0].name.as_deref(), Some("Total"));
    }
}
