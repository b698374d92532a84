//! Pipeline behaviour with a fake renderer: stage ordering, error mapping and
//! working-directory cleanup on every exit path.

use std::cell::RefCell;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;

use pretty_assertions::assert_eq;
use sheetcrop_core::Workbook;
use sheetcrop_render::{
    OutputKind, RenderError, RenderPipeline, Renderer, Stage, ToolFailure, ToolOutput,
};
use sheetcrop_xlsx::{WriteOptions, XlsxError};

#[derive(Debug, Clone, Copy)]
enum Behaviour {
    Succeed,
    Fail,
    NoOutput,
    TimeOut,
}

/// Writes the files the real tools would, or fails on demand
struct FakeRenderer {
    page: Behaviour,
    raster: Behaviour,
    raster_pages: usize,
    /// Copy of the persisted workbook, kept for inspection
    captured_workbook: Option<PathBuf>,
    calls: RefCell<Vec<&'static str>>,
}

impl FakeRenderer {
    fn new() -> Self {
        Self {
            page: Behaviour::Succeed,
            raster: Behaviour::Succeed,
            raster_pages: 1,
            captured_workbook: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    fn outcome(behaviour: Behaviour, program: &str) -> Result<(), ToolFailure> {
        match behaviour {
            Behaviour::Fail => Err(ToolFailure::Exited {
                program: program.to_string(),
                exit_code: Some(1),
                stderr: format!("{program}: conversion failed"),
            }),
            Behaviour::TimeOut => Err(ToolFailure::TimedOut {
                program: program.to_string(),
                limit: Duration::from_secs(2),
            }),
            Behaviour::Succeed | Behaviour::NoOutput => Ok(()),
        }
    }
}

impl Renderer for FakeRenderer {
    fn convert_to_page(&self, input: &Path, out_dir: &Path) -> Result<ToolOutput, ToolFailure> {
        self.calls.borrow_mut().push("page");
        assert!(input.is_file(), "workbook should be persisted first");
        if let Some(capture) = &self.captured_workbook {
            fs::copy(input, capture).unwrap();
        }

        Self::outcome(self.page, "soffice")?;
        if let Behaviour::Succeed = self.page {
            let stem = input.file_stem().unwrap().to_string_lossy().into_owned();
            fs::write(out_dir.join(format!("{stem}.pdf")), b"%PDF-1.7 fake").unwrap();
        }
        Ok(ToolOutput::default())
    }

    fn convert_to_raster(&self, pdf: &Path, prefix: &Path) -> Result<ToolOutput, ToolFailure> {
        self.calls.borrow_mut().push("raster");
        assert!(pdf.is_file());

        Self::outcome(self.raster, "pdftoppm")?;
        if let Behaviour::Succeed = self.raster {
            let name = prefix.file_name().unwrap().to_string_lossy().into_owned();
            for page in 1..=self.raster_pages {
                let path = prefix.with_file_name(format!("{name}-{page}.png"));
                fs::write(path, b"\x89PNG fake").unwrap();
            }
        }
        Ok(ToolOutput::default())
    }
}

fn workbook() -> Workbook {
    let mut workbook = Workbook::new();
    let sheet = workbook.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", 1.0).unwrap();
    sheet.set_cell_value("B2", "two").unwrap();
    workbook
}

fn assert_empty(dir: &Path) {
    let leftovers: Vec<_> = fs::read_dir(dir).unwrap().map(|e| e.unwrap().path()).collect();
    assert!(leftovers.is_empty(), "left behind: {leftovers:?}");
}

struct Fixture {
    work_root: tempfile::TempDir,
    out_dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            work_root: tempfile::tempdir().unwrap(),
            out_dir: tempfile::tempdir().unwrap(),
        }
    }

    fn pipeline<'a>(&self, renderer: &'a FakeRenderer) -> RenderPipeline<&'a FakeRenderer> {
        RenderPipeline::new(renderer).with_work_dir_root(self.work_root.path())
    }

    fn output(&self, name: &str) -> PathBuf {
        self.out_dir.path().join(name)
    }
}

#[test]
fn test_page_export_moves_pdf_and_cleans_up() {
    let fx = Fixture::new();
    let renderer = FakeRenderer::new();
    let output = fx.output("range.pdf");

    let written = fx
        .pipeline(&renderer)
        .render(&workbook(), &output, OutputKind::Page)
        .unwrap();

    assert_eq!(written, output);
    assert_eq!(fs::read(&output).unwrap(), b"%PDF-1.7 fake");
    assert_eq!(renderer.calls(), vec!["page"]);
    assert_empty(fx.work_root.path());
}

#[test]
fn test_raster_export_moves_single_image() {
    let fx = Fixture::new();
    let renderer = FakeRenderer::new();
    let output = fx.output("chart.png");

    fx.pipeline(&renderer)
        .render(&workbook(), &output, OutputKind::Raster)
        .unwrap();

    assert_eq!(fs::read(&output).unwrap(), b"\x89PNG fake");
    assert_eq!(renderer.calls(), vec!["page", "raster"]);
    assert_empty(fx.work_root.path());
}

#[test]
fn test_output_parents_are_created_and_existing_file_overwritten() {
    let fx = Fixture::new();
    let renderer = FakeRenderer::new();
    let output = fx.output("reports/2024/q1.pdf");
    fs::create_dir_all(output.parent().unwrap()).unwrap();
    fs::write(&output, b"stale").unwrap();

    fx.pipeline(&renderer)
        .render(&workbook(), &output, OutputKind::Page)
        .unwrap();

    assert_eq!(fs::read(&output).unwrap(), b"%PDF-1.7 fake");
}

#[test]
fn test_page_conversion_failure_carries_exit_code_and_stderr() {
    let fx = Fixture::new();
    let renderer = FakeRenderer {
        page: Behaviour::Fail,
        ..FakeRenderer::new()
    };
    let output = fx.output("out.pdf");

    let err = fx
        .pipeline(&renderer)
        .render(&workbook(), &output, OutputKind::Raster)
        .unwrap_err();

    match err {
        RenderError::Conversion { exit_code, stderr } => {
            assert_eq!(exit_code, Some(1));
            assert_eq!(stderr, "soffice: conversion failed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(renderer.calls(), vec!["page"]);
    assert!(!output.exists());
    assert_empty(fx.work_root.path());
}

#[test]
fn test_missing_pdf_is_a_conversion_error() {
    let fx = Fixture::new();
    let renderer = FakeRenderer {
        page: Behaviour::NoOutput,
        ..FakeRenderer::new()
    };

    let err = fx
        .pipeline(&renderer)
        .render(&workbook(), &fx.output("out.pdf"), OutputKind::Page)
        .unwrap_err();

    assert!(matches!(err, RenderError::Conversion { .. }), "{err:?}");
    assert!(err.to_string().contains("no export.pdf output was produced"));
    assert_empty(fx.work_root.path());
}

#[test]
fn test_raster_failure_is_raster_conversion_error() {
    let fx = Fixture::new();
    let renderer = FakeRenderer {
        raster: Behaviour::Fail,
        ..FakeRenderer::new()
    };
    let output = fx.output("out.png");

    let err = fx
        .pipeline(&renderer)
        .render(&workbook(), &output, OutputKind::Raster)
        .unwrap_err();

    assert!(
        matches!(err, RenderError::RasterConversion { exit_code: Some(1), .. }),
        "{err:?}"
    );
    assert!(!output.exists());
    assert_empty(fx.work_root.path());
}

#[test]
fn test_no_image_is_raster_conversion_error() {
    let fx = Fixture::new();
    let renderer = FakeRenderer {
        raster: Behaviour::NoOutput,
        ..FakeRenderer::new()
    };

    let err = fx
        .pipeline(&renderer)
        .render(&workbook(), &fx.output("out.png"), OutputKind::Raster)
        .unwrap_err();

    assert!(matches!(err, RenderError::RasterConversion { .. }), "{err:?}");
    assert_empty(fx.work_root.path());
}

#[test]
fn test_several_images_is_unexpected_page_count() {
    let fx = Fixture::new();
    let renderer = FakeRenderer {
        raster_pages: 3,
        ..FakeRenderer::new()
    };
    let output = fx.output("out.png");

    let err = fx
        .pipeline(&renderer)
        .render(&workbook(), &output, OutputKind::Raster)
        .unwrap_err();

    assert!(matches!(err, RenderError::UnexpectedPageCount { pages: 3 }), "{err:?}");
    assert!(!output.exists());
    assert_empty(fx.work_root.path());
}

#[test]
fn test_timeout_reports_stage() {
    let fx = Fixture::new();
    let renderer = FakeRenderer {
        raster: Behaviour::TimeOut,
        ..FakeRenderer::new()
    };

    let err = fx
        .pipeline(&renderer)
        .render(&workbook(), &fx.output("out.png"), OutputKind::Raster)
        .unwrap_err();

    match err {
        RenderError::ConversionTimeout { stage, timeout } => {
            assert_eq!(stage, Stage::ConvertToRaster);
            assert_eq!(timeout, Duration::from_secs(2));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_empty(fx.work_root.path());
}

#[test]
fn test_serialization_failure_skips_conversion() {
    let fx = Fixture::new();
    let renderer = FakeRenderer::new();

    let err = fx
        .pipeline(&renderer)
        .render_sheet(
            &workbook(),
            5,
            WriteOptions::default(),
            &fx.output("out.pdf"),
            OutputKind::Page,
        )
        .unwrap_err();

    assert!(
        matches!(
            err,
            RenderError::Serialization(XlsxError::SheetOutOfRange { index: 5, count: 1 })
        ),
        "{err:?}"
    );
    assert!(renderer.calls().is_empty());
    assert_empty(fx.work_root.path());
}

#[test]
fn test_directory_output_path_is_output_write_error() {
    let fx = Fixture::new();
    let renderer = FakeRenderer::new();

    let err = fx
        .pipeline(&renderer)
        .render(&workbook(), fx.out_dir.path(), OutputKind::Page)
        .unwrap_err();

    assert!(matches!(err, RenderError::OutputWrite { .. }), "{err:?}");
    assert_empty(fx.work_root.path());
}

#[test]
fn test_render_sheet_persists_only_that_sheet() {
    let fx = Fixture::new();
    let capture = fx.out_dir.path().join("captured.xlsx");
    let renderer = FakeRenderer {
        captured_workbook: Some(capture.clone()),
        ..FakeRenderer::new()
    };

    let mut source = workbook();
    let notes = source.add_worksheet_with_name("Notes").unwrap();
    source
        .worksheet_mut(notes)
        .unwrap()
        .set_cell_value("A1", "only this")
        .unwrap();

    fx.pipeline(&renderer)
        .render_sheet(
            &source,
            notes,
            WriteOptions::fit_to_page(),
            &fx.output("notes.pdf"),
            OutputKind::Page,
        )
        .unwrap();

    let archive = zip::ZipArchive::new(File::open(&capture).unwrap()).unwrap();
    let mut sheets: Vec<&str> = archive
        .file_names()
        .filter(|n| n.starts_with("xl/worksheets/"))
        .collect();
    sheets.sort();
    assert_eq!(sheets, vec!["xl/worksheets/sheet1.xml"]);
}
