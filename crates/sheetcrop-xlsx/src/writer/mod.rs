//! XLSX writer

mod chart;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use quick_xml::escape::escape;
use sheetcrop_core::{
    CellAddress, CellData, CellError, CellValue, PageSetup, SheetChart, Workbook, Worksheet,
    DEFAULT_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT,
};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::XlsxStyleTable;

/// Options for writing a single sheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Replace the sheet's scaling with fit-to-one-page
    pub fit_to_page: bool,
    /// Write formulas as their cached results, for a sheet lifted out of
    /// the workbook its formulas refer into
    pub cached_values: bool,
}

impl WriteOptions {
    pub fn fit_to_page() -> Self {
        Self {
            fit_to_page: true,
            ..Self::default()
        }
    }

    pub fn with_cached_values(mut self) -> Self {
        self.cached_values = true;
        self
    }
}

/// One worksheet as it will appear in the package
struct SheetPart<'a> {
    sheet: &'a Worksheet,
    page_setup: Cow<'a, PageSetup>,
    cached_values: bool,
    /// The sheet's charts with series resolved to literal data
    charts: Vec<SheetChart>,
}

impl<'a> SheetPart<'a> {
    fn new(
        workbook: &Workbook,
        sheet: &'a Worksheet,
        page_setup: Cow<'a, PageSetup>,
        cached_values: bool,
    ) -> XlsxResult<Self> {
        let charts = sheet
            .charts()
            .iter()
            .map(|chart| workbook.resolve_chart(sheet.name(), chart))
            .collect::<sheetcrop_core::Result<Vec<_>>>()
            .map_err(|source| XlsxError::ChartData {
                sheet: sheet.name().to_string(),
                source,
            })?;
        Ok(Self {
            sheet,
            page_setup,
            cached_values,
            charts,
        })
    }
}

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write every sheet of a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        let file = BufWriter::new(File::create(path)?);
        Self::write(workbook, file)
    }

    /// Write every sheet of a workbook to a writer
    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        let parts = workbook
            .worksheets()
            .map(|sheet| {
                SheetPart::new(workbook, sheet, Cow::Borrowed(sheet.page_setup()), false)
            })
            .collect::<XlsxResult<Vec<_>>>()?;
        Self::write_parts(&parts, writer)
    }

    /// Write a package holding only the sheet at `index` to a file path
    pub fn write_sheet_file<P: AsRef<Path>>(
        workbook: &Workbook,
        index: usize,
        options: WriteOptions,
        path: P,
    ) -> XlsxResult<()> {
        let file = BufWriter::new(File::create(path)?);
        Self::write_sheet(workbook, index, options, file)
    }

    /// Write a package holding only the sheet at `index`
    ///
    /// The source workbook is not modified; page setup overrides from
    /// `options` apply to the written copy only. Chart series that refer to
    /// other sheets are written as the values those cells hold.
    pub fn write_sheet<W: Write + Seek>(
        workbook: &Workbook,
        index: usize,
        options: WriteOptions,
        writer: W,
    ) -> XlsxResult<()> {
        let sheet = workbook.worksheet(index).ok_or(XlsxError::SheetOutOfRange {
            index,
            count: workbook.sheet_count(),
        })?;

        let page_setup = if options.fit_to_page {
            Cow::Owned(sheet.page_setup().fit_to_single_page())
        } else {
            Cow::Borrowed(sheet.page_setup())
        };

        let part = SheetPart::new(workbook, sheet, page_setup, options.cached_values)?;
        Self::write_parts(&[part], writer)
    }

    fn write_parts<W: Write + Seek>(parts: &[SheetPart<'_>], writer: W) -> XlsxResult<()> {
        if parts.is_empty() {
            return Err(XlsxError::EmptyWorkbook);
        }

        let mut zip = ZipWriter::new(writer);
        let sheets: Vec<&Worksheet> = parts.iter().map(|p| p.sheet).collect();
        let style_table = XlsxStyleTable::build(&sheets);

        Self::write_part(&mut zip, "[Content_Types].xml", &Self::content_types_xml(parts))?;
        Self::write_part(&mut zip, "_rels/.rels", ROOT_RELS)?;
        Self::write_part(&mut zip, "xl/workbook.xml", &Self::workbook_xml(parts))?;
        Self::write_part(
            &mut zip,
            "xl/_rels/workbook.xml.rels",
            &Self::workbook_rels_xml(parts.len()),
        )?;
        Self::write_part(&mut zip, "xl/styles.xml", &style_table.to_styles_xml())?;

        for (position, part) in parts.iter().enumerate() {
            let xml = Self::worksheet_xml(part, position, &style_table);
            Self::write_part(
                &mut zip,
                &format!("xl/worksheets/sheet{}.xml", position + 1),
                &xml,
            )?;
        }

        let mut chart_count = 0;
        for (position, part) in parts.iter().enumerate() {
            if part.charts.is_empty() {
                continue;
            }
            let drawing = position + 1;
            let numbers: Vec<usize> =
                (chart_count + 1..=chart_count + part.charts.len()).collect();
            chart_count += part.charts.len();

            Self::write_part(
                &mut zip,
                &format!("xl/worksheets/_rels/sheet{drawing}.xml.rels"),
                &chart::sheet_rels_xml(drawing),
            )?;
            Self::write_part(
                &mut zip,
                &format!("xl/drawings/drawing{drawing}.xml"),
                &chart::drawing_xml(&part.charts),
            )?;
            Self::write_part(
                &mut zip,
                &format!("xl/drawings/_rels/drawing{drawing}.xml.rels"),
                &chart::drawing_rels_xml(&numbers),
            )?;
            for (number, sheet_chart) in numbers.iter().zip(&part.charts) {
                Self::write_part(
                    &mut zip,
                    &format!("xl/charts/chart{number}.xml"),
                    &chart::chart_xml(sheet_chart),
                )?;
            }
        }

        zip.finish()?;
        debug!(sheets = parts.len(), charts = chart_count, "wrote xlsx package");
        Ok(())
    }

    fn write_part<W: Write + Seek>(
        zip: &mut ZipWriter<W>,
        name: &str,
        content: &str,
    ) -> XlsxResult<()> {
        zip.start_file(name, SimpleFileOptions::default())?;
        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn content_types_xml(parts: &[SheetPart<'_>]) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
        );

        for i in 1..=parts.len() {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i
            ));
        }

        let mut chart_number = 0;
        for (position, part) in parts.iter().enumerate() {
            if part.charts.is_empty() {
                continue;
            }
            content.push_str(&format!(
                "\n    <Override PartName=\"/xl/drawings/drawing{}.xml\" ContentType=\"{}\"/>",
                position + 1,
                chart::DRAWING_CONTENT_TYPE
            ));
            for _ in &part.charts {
                chart_number += 1;
                content.push_str(&format!(
                    "\n    <Override PartName=\"/xl/charts/chart{}.xml\" ContentType=\"{}\"/>",
                    chart_number,
                    chart::CHART_CONTENT_TYPE
                ));
            }
        }

        content.push_str("\n</Types>");
        content
    }

    fn workbook_xml(parts: &[SheetPart<'_>]) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>"#,
        );

        for (i, part) in parts.iter().enumerate() {
            content.push_str(&format!(
                r#"
        <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape(part.sheet.name()),
                i + 1,
                i + 1
            ));
        }
        content.push_str("\n    </sheets>");

        let print_areas: Vec<String> = parts
            .iter()
            .enumerate()
            .filter_map(|(i, part)| {
                let area = part.page_setup.print_area?;
                let reference = format!(
                    "'{}'!{}",
                    part.sheet.name().replace('\'', "''"),
                    absolute_range(&area.start, &area.end)
                );
                Some(format!(
                    r#"
        <definedName name="_xlnm.Print_Area" localSheetId="{}">{}</definedName>"#,
                    i,
                    escape(reference.as_str())
                ))
            })
            .collect();

        if !print_areas.is_empty() {
            content.push_str("\n    <definedNames>");
            content.push_str(&print_areas.concat());
            content.push_str("\n    </definedNames>");
        }

        content.push_str("\n</workbook>");
        content
    }

    fn workbook_rels_xml(sheet_count: usize) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        for i in 1..=sheet_count {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i, i
            ));
        }

        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#,
            sheet_count + 1
        ));
        content
    }

    fn worksheet_xml(part: &SheetPart<'_>, position: usize, style_table: &XlsxStyleTable) -> String {
        let sheet = part.sheet;
        let page_setup = part.page_setup.as_ref();

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );

        if page_setup.fits_to_pages() {
            content.push_str("\n    <sheetPr><pageSetUpPr fitToPage=\"1\"/></sheetPr>");
        }

        if let Some(used) = sheet.used_range() {
            content.push_str(&format!("\n    <dimension ref=\"{}\"/>", used));
        }

        Self::push_sheet_format(&mut content, sheet);
        Self::push_columns(&mut content, sheet);
        Self::push_sheet_data(&mut content, part, position, style_table);

        let merged_regions = sheet.merged_regions();
        if !merged_regions.is_empty() {
            content.push_str(&format!(
                "\n    <mergeCells count=\"{}\">",
                merged_regions.len()
            ));
            for range in merged_regions {
                content.push_str(&format!("\n        <mergeCell ref=\"{}\"/>", range));
            }
            content.push_str("\n    </mergeCells>");
        }

        Self::push_page_setup(&mut content, page_setup);

        if !part.charts.is_empty() {
            content.push_str("\n    <drawing r:id=\"rId1\"/>");
        }

        content.push_str("\n</worksheet>");
        content
    }

    fn push_sheet_format(content: &mut String, sheet: &Worksheet) {
        let mut attrs = format!(" defaultRowHeight=\"{}\"", sheet.default_row_height());
        if sheet.default_row_height() != DEFAULT_ROW_HEIGHT {
            attrs.push_str(" customHeight=\"1\"");
        }
        if sheet.default_column_width() != DEFAULT_COLUMN_WIDTH {
            attrs.push_str(&format!(
                " defaultColWidth=\"{}\"",
                column_width_attr(sheet.default_column_width())
            ));
        }
        content.push_str(&format!("\n    <sheetFormatPr{}/>", attrs));
    }

    fn push_columns(content: &mut String, sheet: &Worksheet) {
        let mut columns: BTreeMap<u16, (Option<f64>, bool)> = BTreeMap::new();
        for (&col, &width) in sheet.custom_column_widths() {
            columns.entry(col).or_default().0 = Some(width);
        }
        for (&col, &hidden) in sheet.hidden_columns() {
            columns.entry(col).or_default().1 = hidden;
        }
        if columns.is_empty() {
            return;
        }

        content.push_str("\n    <cols>");
        for (col, (width, hidden)) in columns {
            let width = width.unwrap_or_else(|| sheet.default_column_width());
            let n = u32::from(col) + 1;
            content.push_str(&format!(
                "\n        <col min=\"{}\" max=\"{}\" width=\"{}\" customWidth=\"1\"{}/>",
                n,
                n,
                column_width_attr(width),
                if hidden { " hidden=\"1\"" } else { "" }
            ));
        }
        content.push_str("\n    </cols>");
    }

    fn push_sheet_data(
        content: &mut String,
        part: &SheetPart<'_>,
        position: usize,
        style_table: &XlsxStyleTable,
    ) {
        let sheet = part.sheet;
        // Rows with only a custom height or hidden flag still need a <row>
        let mut rows: BTreeMap<u32, Vec<(u16, &CellData)>> = BTreeMap::new();
        for (row, col, cell) in sheet.iter_cells() {
            rows.entry(row).or_default().push((col, cell));
        }
        for &row in sheet.custom_row_heights().keys() {
            rows.entry(row).or_default();
        }
        for &row in sheet.hidden_rows().keys() {
            rows.entry(row).or_default();
        }

        if rows.is_empty() {
            content.push_str("\n    <sheetData/>");
            return;
        }

        content.push_str("\n    <sheetData>");
        for (row, cells) in rows {
            let mut attrs = format!(" r=\"{}\"", row + 1);
            if let Some(height) = sheet.custom_row_heights().get(&row) {
                attrs.push_str(&format!(" ht=\"{}\" customHeight=\"1\"", height));
            }
            if sheet.is_row_hidden(row) {
                attrs.push_str(" hidden=\"1\"");
            }

            if cells.is_empty() {
                content.push_str(&format!("\n        <row{}/>", attrs));
                continue;
            }

            content.push_str(&format!("\n        <row{}>", attrs));
            for (col, cell) in cells {
                let xf_id = style_table.xf_id_for(position, cell.style_index);
                let addr = CellAddress::new(row, col);
                if part.cached_values {
                    Self::push_cell(content, addr, xf_id, &cell.value.displayed());
                } else {
                    Self::push_cell(content, addr, xf_id, &cell.value);
                }
            }
            content.push_str("\n        </row>");
        }
        content.push_str("\n    </sheetData>");
    }

    fn push_cell(content: &mut String, addr: CellAddress, xf_id: u32, value: &CellValue) {
        let style_attr = if xf_id != 0 {
            format!(" s=\"{}\"", xf_id)
        } else {
            String::new()
        };
        let open = format!("\n            <c r=\"{}\"{}", addr, style_attr);

        match value {
            CellValue::Empty => content.push_str(&format!("{}/>", open)),
            CellValue::Formula { text, cached_value } => {
                let formula = text.strip_prefix('=').unwrap_or(text.as_str());
                let (type_attr, cached) = match cached_value.as_deref() {
                    Some(v) => scalar_parts(v),
                    None => ("", None),
                };
                content.push_str(&format!(
                    "{}{}><f>{}</f>{}</c>",
                    open,
                    type_attr,
                    escape(formula),
                    cached.map(|v| format!("<v>{}</v>", v)).unwrap_or_default()
                ));
            }
            CellValue::String(s) => content.push_str(&format!(
                "{} t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
                open,
                escape(s.as_str())
            )),
            scalar => {
                let (type_attr, v) = scalar_parts(scalar);
                content.push_str(&format!(
                    "{}{}><v>{}</v></c>",
                    open,
                    type_attr,
                    v.unwrap_or_default()
                ));
            }
        }
    }

    fn push_page_setup(content: &mut String, page_setup: &PageSetup) {
        if page_setup.print_gridlines {
            content.push_str("\n    <printOptions gridLines=\"1\"/>");
        }

        content.push_str(&format!(
            "\n    <pageMargins left=\"{}\" right=\"{}\" top=\"{}\" bottom=\"{}\" header=\"{}\" footer=\"{}\"/>",
            page_setup.left_margin,
            page_setup.right_margin,
            page_setup.top_margin,
            page_setup.bottom_margin,
            page_setup.header_margin,
            page_setup.footer_margin
        ));

        let mut attrs = format!(
            " paperSize=\"{}\" orientation=\"{}\"",
            page_setup.paper_size,
            page_setup.orientation.xml_value()
        );
        if page_setup.fits_to_pages() {
            attrs.push_str(&format!(
                " fitToWidth=\"{}\" fitToHeight=\"{}\"",
                page_setup.fit_to_width.unwrap_or(0),
                page_setup.fit_to_height.unwrap_or(0)
            ));
        } else {
            attrs.push_str(&format!(" scale=\"{}\"", page_setup.scale));
        }
        content.push_str(&format!("\n    <pageSetup{}/>", attrs));
    }
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

/// Type attribute and escaped `<v>` text for a non-formula value
fn scalar_parts(value: &CellValue) -> (&'static str, Option<String>) {
    match value {
        CellValue::Number(n) if n.is_finite() => ("", Some(n.to_string())),
        CellValue::Number(_) => (" t=\"e\"", Some(CellError::Num.as_str().to_string())),
        CellValue::Boolean(b) => (" t=\"b\"", Some(if *b { "1" } else { "0" }.to_string())),
        CellValue::Error(e) => (" t=\"e\"", Some(escape(e.as_str()).into_owned())),
        CellValue::String(s) => (" t=\"str\"", Some(escape(s.as_str()).into_owned())),
        CellValue::Empty | CellValue::Formula { .. } => ("", None),
    }
}

/// `$A$1:$B$2` form of a range
fn absolute_range(start: &CellAddress, end: &CellAddress) -> String {
    let abs = |a: &CellAddress| {
        format!(
            "${}${}",
            CellAddress::column_to_letters(a.col),
            a.row + 1
        )
    };
    format!("{}:{}", abs(start), abs(end))
}

/// Column width as stored in `<col width>`: display characters plus cell
/// padding, truncated to 1/256 of a character
fn column_width_attr(chars: f64) -> f64 {
    const DIGIT_PX: f64 = 7.0;
    const PADDING_PX: f64 = 5.0;
    if chars <= 0.0 {
        return 0.0;
    }
    ((chars * DIGIT_PX + PADDING_PX) / DIGIT_PX * 256.0).trunc() / 256.0
}
