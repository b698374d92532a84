//! End-to-end exports through `ExcelExporter` with a fake renderer.

mod common;

use std::fs;

use common::{sample_workbook, Dirs, FakeRenderer};
use pretty_assertions::assert_eq;
use sheetcrop::prelude::*;
use sheetcrop::{ChartLocator, RangeResolver, SubWorkbookBuilder};

#[test]
fn test_range_to_pdf_two_by_two_grid() {
    let dirs = Dirs::new();
    let workbook = sample_workbook();
    let renderer = FakeRenderer::new(dirs.capture.path());
    let output = dirs.output("grid.pdf");

    let written = dirs
        .exporter(&workbook, &renderer)
        .range_to_pdf("Sheet1", "A1:B2", &output)
        .unwrap();

    assert_eq!(written, output);
    assert_eq!(fs::read(&output).unwrap(), b"%PDF-1.7 fake");
    dirs.assert_work_dir_empty();

    let sheet_xml = renderer.last_part("xl/worksheets/sheet1.xml");
    for cell in [
        r#"<c r="A1"><v>1</v></c>"#,
        r#"<c r="B1"><v>2</v></c>"#,
        r#"<c r="A2"><v>3</v></c>"#,
        r#"<c r="B2"><v>4</v></c>"#,
    ] {
        assert!(sheet_xml.contains(cell), "missing {cell}");
    }
    assert_eq!(sheet_xml.matches("<c r=").count(), 4);
    assert!(sheet_xml.contains(r#"<pageSetUpPr fitToPage="1"/>"#));

    let workbook_xml = renderer.last_part("xl/workbook.xml");
    assert!(workbook_xml.contains("&apos;Sheet1&apos;!$A$1:$B$2"));
}

#[test]
fn test_chart_box_matches_anchor_span() {
    let workbook = sample_workbook();
    let sheet = workbook.worksheet_by_name("Dashboard").unwrap();

    let cell_box = ChartLocator::locate(sheet, "Sales Chart").unwrap();
    assert_eq!(cell_box.to_string(), "C3:F15");

    let derived = SubWorkbookBuilder::build(&workbook, "Dashboard", &cell_box).unwrap();
    let dst = derived.worksheet(0).unwrap();
    assert_eq!(dst.used_range().unwrap().to_string(), "A1:D13");
    assert_eq!(dst.page_setup().print_area.unwrap().to_string(), "A1:D13");

    // C3 = 3 * 3 in the source data block
    assert_eq!(dst.get_value("A1").unwrap(), CellValue::Number(9.0));
    assert!(dst.cell_style("A1").unwrap().unwrap().font.bold);
    // F15 = 15 * 6
    assert_eq!(dst.get_value("D13").unwrap(), CellValue::Number(90.0));
}

#[test]
fn test_chart_to_image_writes_one_raster() {
    let dirs = Dirs::new();
    let workbook = sample_workbook();
    let renderer = FakeRenderer::new(dirs.capture.path());
    let output = dirs.output("charts/sales.png");

    dirs.exporter(&workbook, &renderer)
        .chart_to_image("Dashboard", "Sales Chart", &output)
        .unwrap();

    assert_eq!(fs::read(&output).unwrap(), b"\x89PNG fake");
    dirs.assert_work_dir_empty();

    let sheet_xml = renderer.last_part("xl/worksheets/sheet1.xml");
    assert!(sheet_xml.contains(r#"<dimension ref="A1:D13"/>"#));
    assert!(!sheet_xml.contains(r#"r="E"#));
    assert!(!sheet_xml.contains(r#"<row r="14""#));
}

#[test]
fn test_chart_export_draws_the_chart() {
    let dirs = Dirs::new();
    let workbook = sample_workbook();
    let renderer = FakeRenderer::new(dirs.capture.path());

    dirs.exporter(&workbook, &renderer)
        .chart_to_pdf("Dashboard", "Sales Chart", dirs.output("sales.pdf"))
        .unwrap();

    let names = renderer.last_part_names();
    for part in [
        "xl/charts/chart1.xml",
        "xl/drawings/_rels/drawing1.xml.rels",
        "xl/drawings/drawing1.xml",
        "xl/worksheets/_rels/sheet1.xml.rels",
    ] {
        assert!(names.iter().any(|n| n == part), "missing {part}");
    }

    let sheet_xml = renderer.last_part("xl/worksheets/sheet1.xml");
    assert!(sheet_xml.contains(r#"<drawing r:id="rId1"/>"#));

    // Re-anchored at A1, keeping the offsets into the first cell
    let drawing = renderer.last_part("xl/drawings/drawing1.xml");
    assert!(drawing.contains(
        "<xdr:from><xdr:col>0</xdr:col><xdr:colOff>95250</xdr:colOff><xdr:row>0</xdr:row><xdr:rowOff>28575</xdr:rowOff></xdr:from>"
    ));
    assert!(drawing.contains("<xdr:to><xdr:col>3</xdr:col>"));

    // Column C of the source, including rows outside the exported box
    let chart = renderer.last_part("xl/charts/chart1.xml");
    assert!(chart.contains("<a:t>Sales Chart</a:t>"));
    assert!(chart.contains(r#"<c:pt idx="0"><c:v>3</c:v></c:pt>"#));
    assert!(chart.contains(r#"<c:pt idx="19"><c:v>60</c:v></c:pt>"#));
    assert!(!chart.contains("<c:f>"));

    let types = renderer.last_part("[Content_Types].xml");
    assert!(types.contains(r#"PartName="/xl/charts/chart1.xml""#));
}

#[test]
fn test_range_beside_chart_has_no_drawing() {
    let dirs = Dirs::new();
    let workbook = sample_workbook();
    let renderer = FakeRenderer::new(dirs.capture.path());

    dirs.exporter(&workbook, &renderer)
        .range_to_pdf("Dashboard", "A1:B20", dirs.output("left.pdf"))
        .unwrap();

    assert!(!renderer.last_part_names().iter().any(|n| n.starts_with("xl/charts/")));
    assert!(!renderer.last_part("xl/worksheets/sheet1.xml").contains("<drawing"));
}

#[test]
fn test_missing_chart_leaves_nothing_behind() {
    let dirs = Dirs::new();
    let workbook = sample_workbook();
    let renderer = FakeRenderer::new(dirs.capture.path());

    let err = dirs
        .exporter(&workbook, &renderer)
        .chart_to_pdf("Dashboard", "Nonexistent", dirs.output("missing.pdf"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ChartNotFound);
    assert!(err.to_string().contains("Nonexistent"));
    assert!(renderer.captured().is_empty());
    dirs.assert_no_outputs();
    dirs.assert_work_dir_empty();
}

#[test]
fn test_reversed_and_single_cell_ranges() {
    let workbook = sample_workbook();
    let sheet = workbook.worksheet_by_name("Sheet1").unwrap();

    assert_eq!(RangeResolver::resolve(sheet, "Z1:A1").unwrap().to_string(), "A1:Z1");
    let single = RangeResolver::resolve(sheet, "B2:B2").unwrap();
    assert_eq!((single.row_count(), single.col_count()), (1, 1));

    let dirs = Dirs::new();
    let renderer = FakeRenderer::new(dirs.capture.path());
    dirs.exporter(&workbook, &renderer)
        .range_to_pdf("Sheet1", "B2:B2", dirs.output("b2.pdf"))
        .unwrap();

    let sheet_xml = renderer.last_part("xl/worksheets/sheet1.xml");
    assert!(sheet_xml.contains(r#"<c r="A1"><v>4</v></c>"#));
    assert_eq!(sheet_xml.matches("<c r=").count(), 1);
}

#[test]
fn test_whole_sheet_writes_only_that_sheet_unchanged() {
    let dirs = Dirs::new();
    let workbook = sample_workbook();
    let renderer = FakeRenderer::new(dirs.capture.path());

    dirs.exporter(&workbook, &renderer)
        .sheet_to_pdf("Dashboard", dirs.output("dashboard.pdf"))
        .unwrap();

    assert_eq!(renderer.last_sheet_parts(), vec!["xl/worksheets/sheet1.xml"]);
    let workbook_xml = renderer.last_part("xl/workbook.xml");
    assert!(workbook_xml.contains(r#"name="Dashboard""#));
    assert!(!workbook_xml.contains(r#"name="Sheet1""#));

    let sheet_xml = renderer.last_part("xl/worksheets/sheet1.xml");
    assert!(sheet_xml.contains(r#"<dimension ref="A1:H20"/>"#));
    assert!(sheet_xml.contains(r#"<pageSetUpPr fitToPage="1"/>"#));

    // The source itself is not touched
    let source = workbook.worksheet_by_name("Dashboard").unwrap();
    assert!(!source.page_setup().fits_to_pages());
}

#[test]
fn test_whole_sheet_writes_formula_results() {
    let dirs = Dirs::new();
    let mut workbook = sample_workbook();
    let dashboard = workbook.sheet_index("Dashboard").unwrap();
    {
        let sheet = workbook.worksheet_mut(dashboard).unwrap();
        // Sheet1 is not part of the written package
        let cross_sheet = CellValue::Formula {
            text: "=Sheet1!B2".into(),
            cached_value: Some(Box::new(CellValue::Number(4.0))),
        };
        sheet.set_cell_value("A1", cross_sheet).unwrap();
        sheet.set_cell_formula("B1", "=A1*2").unwrap();
    }
    let renderer = FakeRenderer::new(dirs.capture.path());

    dirs.exporter(&workbook, &renderer)
        .sheet_to_pdf("Dashboard", dirs.output("dashboard.pdf"))
        .unwrap();

    let sheet_xml = renderer.last_part("xl/worksheets/sheet1.xml");
    assert!(sheet_xml.contains(r#"<c r="A1"><v>4</v></c>"#));
    assert!(sheet_xml.contains(r#"<c r="B1"/>"#));
    assert!(!sheet_xml.contains("<f>"));

    // The chart's categories pick up the cached result too
    let chart = renderer.last_part("xl/charts/chart1.xml");
    assert!(chart.contains(
        r#"<c:cat><c:numLit><c:formatCode>General</c:formatCode><c:ptCount val="20"/><c:pt idx="0"><c:v>4</c:v></c:pt>"#
    ));
}

#[test]
fn test_sheet_to_image() {
    let dirs = Dirs::new();
    let workbook = sample_workbook();
    let renderer = FakeRenderer::new(dirs.capture.path());
    let output = dirs.output("sheet1.png");

    dirs.exporter(&workbook, &renderer)
        .sheet_to_image("Sheet1", &output)
        .unwrap();

    assert!(output.is_file());
    dirs.assert_work_dir_empty();
}

#[test]
fn test_range_to_image() {
    let dirs = Dirs::new();
    let workbook = sample_workbook();
    let renderer = FakeRenderer::new(dirs.capture.path());
    let output = dirs.output("block.png");

    dirs.exporter(&workbook, &renderer)
        .range_to_image("Dashboard", "B2:C4", &output)
        .unwrap();

    assert!(output.is_file());
    let sheet_xml = renderer.last_part("xl/worksheets/sheet1.xml");
    assert_eq!(sheet_xml.matches("<c r=").count(), 6);
}

#[test]
fn test_whole_sheet_on_empty_sheet() {
    let dirs = Dirs::new();
    let mut workbook = sample_workbook();
    workbook.add_worksheet_with_name("Blank").unwrap();
    let renderer = FakeRenderer::new(dirs.capture.path());

    let err = dirs
        .exporter(&workbook, &renderer)
        .sheet_to_pdf("Blank", dirs.output("blank.pdf"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EmptySheet);
    assert!(renderer.captured().is_empty());
}

#[test]
fn test_unknown_sheet() {
    let dirs = Dirs::new();
    let workbook = sample_workbook();
    let renderer = FakeRenderer::new(dirs.capture.path());

    let err = dirs
        .exporter(&workbook, &renderer)
        .range_to_pdf("Summary", "A1:B2", dirs.output("x.pdf"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SheetNotFound);
    assert_eq!(err.to_string(), "Sheet not found: Summary");
}

#[test]
fn test_empty_output_path() {
    let dirs = Dirs::new();
    let workbook = sample_workbook();
    let renderer = FakeRenderer::new(dirs.capture.path());

    let err = dirs
        .exporter(&workbook, &renderer)
        .range_to_pdf("Sheet1", "A1:B2", "")
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidOutputPath);
    assert!(renderer.captured().is_empty());
}

#[test]
fn test_invalid_range_names_expression() {
    let dirs = Dirs::new();
    let workbook = sample_workbook();
    let renderer = FakeRenderer::new(dirs.capture.path());

    let err = dirs
        .exporter(&workbook, &renderer)
        .range_to_pdf("Sheet1", "B2", dirs.output("x.pdf"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidRange);
    assert!(err.to_string().contains("'B2'"));
    dirs.assert_no_outputs();
}

#[test]
fn test_conversion_failure_surfaces_stderr_and_cleans_up() {
    let dirs = Dirs::new();
    let workbook = sample_workbook();
    let renderer = FakeRenderer {
        fail_page: true,
        ..FakeRenderer::new(dirs.capture.path())
    };

    let err = dirs
        .exporter(&workbook, &renderer)
        .chart_to_pdf("Dashboard", "Sales Chart", dirs.output("chart.pdf"))
        .unwrap_err();

    match &err {
        ExportError::Conversion { exit_code, stderr } => {
            assert_eq!(*exit_code, Some(1));
            assert_eq!(stderr, "Error: source file could not be loaded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    dirs.assert_no_outputs();
    dirs.assert_work_dir_empty();
}

#[test]
fn test_multi_page_raster_is_rejected() {
    let dirs = Dirs::new();
    let workbook = sample_workbook();
    let renderer = FakeRenderer {
        raster_pages: 2,
        ..FakeRenderer::new(dirs.capture.path())
    };

    let err = dirs
        .exporter(&workbook, &renderer)
        .range_to_image("Dashboard", "A1:H20", dirs.output("big.png"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnexpectedPageCount);
    dirs.assert_no_outputs();
    dirs.assert_work_dir_empty();
}

#[test]
fn test_export_request_dispatch() {
    let dirs = Dirs::new();
    let workbook = sample_workbook();
    let renderer = FakeRenderer::new(dirs.capture.path());
    let exporter = dirs.exporter(&workbook, &renderer);

    let requests = [
        ExportRequest::range("Sheet1", "A1:A2", dirs.output("a.pdf"), OutputKind::Page),
        ExportRequest::chart("Dashboard", "Sales Chart", dirs.output("b.png"), OutputKind::Raster),
        ExportRequest::whole_sheet("Sheet1", dirs.output("c.pdf"), OutputKind::Page),
    ];
    for request in &requests {
        let written = exporter.export(request).unwrap();
        assert_eq!(written, request.output_path);
        assert!(written.is_file());
    }

    assert_eq!(renderer.captured().len(), 3);
    dirs.assert_work_dir_empty();
}

#[test]
fn test_concurrent_exports_use_separate_work_dirs() {
    let dirs = Dirs::new();
    let workbook = sample_workbook();

    std::thread::scope(|scope| {
        for i in 0..4 {
            let dirs = &dirs;
            let workbook = &workbook;
            scope.spawn(move || {
                let capture = tempfile::tempdir().unwrap();
                let renderer = FakeRenderer::new(capture.path());
                dirs.exporter(workbook, &renderer)
                    .range_to_pdf("Sheet1", "A1:B2", dirs.output(&format!("grid-{i}.pdf")))
                    .unwrap();
            });
        }
    });

    for i in 0..4 {
        assert!(dirs.output(&format!("grid-{i}.pdf")).is_file());
    }
    dirs.assert_work_dir_empty();
}
