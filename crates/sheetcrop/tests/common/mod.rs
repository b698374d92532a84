//! Shared fixtures for exporter tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use sheetcrop::prelude::*;
use sheetcrop::{ToolFailure, ToolOutput};
use sheetcrop_chart::geometry::EMU_PER_PIXEL;

/// Stands in for LibreOffice and pdftoppm.
///
/// Writes the files the real tools would and keeps a copy of every workbook
/// it was asked to convert.
pub struct FakeRenderer {
    pub fail_page: bool,
    pub raster_pages: usize,
    pub capture_dir: PathBuf,
    pub captured: RefCell<Vec<PathBuf>>,
}

impl FakeRenderer {
    pub fn new(capture_dir: &Path) -> Self {
        Self {
            fail_page: false,
            raster_pages: 1,
            capture_dir: capture_dir.to_path_buf(),
            captured: RefCell::new(Vec::new()),
        }
    }

    /// Copies of the workbooks handed to page conversion, in call order
    pub fn captured(&self) -> Vec<PathBuf> {
        self.captured.borrow().clone()
    }

    /// A part of the last converted workbook package
    pub fn last_part(&self, name: &str) -> String {
        let path = self.captured().pop().expect("no workbook was converted");
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut content = String::new();
        part.read_to_string(&mut content).unwrap();
        content
    }

    /// Every part name of the last converted workbook, sorted
    pub fn last_part_names(&self) -> Vec<String> {
        let path = self.captured().pop().expect("no workbook was converted");
        let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    /// Worksheet part names of the last converted workbook
    pub fn last_sheet_parts(&self) -> Vec<String> {
        self.last_part_names()
            .into_iter()
            .filter(|n| n.starts_with("xl/worksheets/sheet"))
            .collect()
    }
}

impl Renderer for FakeRenderer {
    fn convert_to_page(&self, input: &Path, out_dir: &Path) -> Result<ToolOutput, ToolFailure> {
        let mut captured = self.captured.borrow_mut();
        let copy = self.capture_dir.join(format!("converted-{}.xlsx", captured.len()));
        fs::copy(input, &copy).unwrap();
        captured.push(copy);

        if self.fail_page {
            return Err(ToolFailure::Exited {
                program: "soffice".into(),
                exit_code: Some(1),
                stderr: "Error: source file could not be loaded".into(),
            });
        }

        let stem = input.file_stem().unwrap().to_string_lossy().into_owned();
        fs::write(out_dir.join(format!("{stem}.pdf")), b"%PDF-1.7 fake").unwrap();
        Ok(ToolOutput::default())
    }

    fn convert_to_raster(&self, _pdf: &Path, prefix: &Path) -> Result<ToolOutput, ToolFailure> {
        let name = prefix.file_name().unwrap().to_string_lossy().into_owned();
        for page in 1..=self.raster_pages {
            fs::write(prefix.with_file_name(format!("{name}-{page}.png")), b"\x89PNG fake").unwrap();
        }
        Ok(ToolOutput::default())
    }
}

/// Temp directories for one test: where the pipeline works, where outputs
/// go, and where the fake keeps its copies
pub struct Dirs {
    pub work: tempfile::TempDir,
    pub out: tempfile::TempDir,
    pub capture: tempfile::TempDir,
}

impl Dirs {
    pub fn new() -> Self {
        Self {
            work: tempfile::tempdir().unwrap(),
            out: tempfile::tempdir().unwrap(),
            capture: tempfile::tempdir().unwrap(),
        }
    }

    pub fn exporter<'a>(
        &self,
        workbook: &'a Workbook,
        renderer: &'a FakeRenderer,
    ) -> ExcelExporter<'a, &'a FakeRenderer> {
        ExcelExporter::with_pipeline(
            workbook,
            sheetcrop::RenderPipeline::new(renderer).with_work_dir_root(self.work.path()),
        )
    }

    pub fn output(&self, name: &str) -> PathBuf {
        self.out.path().join(name)
    }

    pub fn assert_work_dir_empty(&self) {
        let leftovers: Vec<_> = fs::read_dir(self.work.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert!(leftovers.is_empty(), "temporary files left behind: {leftovers:?}");
    }

    pub fn assert_no_outputs(&self) {
        let outputs: Vec<_> = fs::read_dir(self.out.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert!(outputs.is_empty(), "unexpected output files: {outputs:?}");
    }
}

/// `Sheet1` holds a 2x2 grid (A1=1, B1=2, A2=3, B2=4). `Dashboard` holds a
/// 20x8 data block and a chart titled "Sales Chart" drawn from C3 into F15,
/// plotting column C against column A.
pub fn sample_workbook() -> Workbook {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.worksheet_mut(0).unwrap();
        sheet.set_cell_value("A1", 1.0).unwrap();
        sheet.set_cell_value("B1", 2.0).unwrap();
        sheet.set_cell_value("A2", 3.0).unwrap();
        sheet.set_cell_value("B2", 4.0).unwrap();
    }

    let dashboard = workbook.add_worksheet_with_name("Dashboard").unwrap();
    let sheet = workbook.worksheet_mut(dashboard).unwrap();
    for row in 0..20u32 {
        for col in 0..8u16 {
            sheet
                .set_cell_value_at(row, col, f64::from(row + 1) * f64::from(col + 1))
                .unwrap();
        }
    }
    sheet
        .set_cell_style("C3", &Style::new().bold(true).fill_color(sheetcrop::Color::YELLOW))
        .unwrap();
    sheet.add_chart(
        SheetChart::new(ChartAnchor::two_cell(
            AnchorMarker::at(2, 2).with_offset(10 * EMU_PER_PIXEL, 3 * EMU_PER_PIXEL),
            AnchorMarker::at(14, 5).with_offset(30 * EMU_PER_PIXEL, 5 * EMU_PER_PIXEL),
        ))
        .with_title("Sales Chart")
        .with_series(
            ChartSeries::new(SeriesData::reference("Dashboard!$C$1:$C$20"))
                .with_name("Sales")
                .with_categories(SeriesData::reference("Dashboard!$A$1:$A$20")),
        ),
    );
    workbook
}
