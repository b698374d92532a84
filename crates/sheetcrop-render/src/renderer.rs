//! External converters behind the [`Renderer`] capability.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::config::RenderConfig;
use crate::error::ToolFailure;

/// What a successful tool run left behind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub exit_code: Option<i32>,
    /// Captured standard error, trimmed
    pub stderr: String,
}

/// The two external conversions the pipeline needs.
///
/// Implementations only run the tool; the pipeline checks which files
/// appeared afterwards.
pub trait Renderer {
    /// Convert the spreadsheet at `input` to a PDF named `<stem>.pdf` in `out_dir`
    fn convert_to_page(&self, input: &Path, out_dir: &Path) -> Result<ToolOutput, ToolFailure>;

    /// Rasterize every page of `pdf` to `<prefix>-<n>.<ext>`
    fn convert_to_raster(&self, pdf: &Path, prefix: &Path) -> Result<ToolOutput, ToolFailure>;
}

impl<R: Renderer + ?Sized> Renderer for &R {
    fn convert_to_page(&self, input: &Path, out_dir: &Path) -> Result<ToolOutput, ToolFailure> {
        (**self).convert_to_page(input, out_dir)
    }

    fn convert_to_raster(&self, pdf: &Path, prefix: &Path) -> Result<ToolOutput, ToolFailure> {
        (**self).convert_to_raster(pdf, prefix)
    }
}

/// Headless LibreOffice for page conversion, poppler's `pdftoppm` for rasters
#[derive(Debug, Clone, Default)]
pub struct LibreOfficeRenderer {
    config: RenderConfig,
}

impl LibreOfficeRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn soffice_args(&self, input: &Path, out_dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "--headless",
            "--invisible",
            "--nodefault",
            "--nologo",
            "--nofirststartwizard",
            "--norestore",
        ]
        .iter()
        .map(OsString::from)
        .collect();

        // A private profile per call lets concurrent conversions run side by side
        args.push(format!("-env:UserInstallation={}", file_url(&out_dir.join("lo-profile"))).into());

        args.push("--convert-to".into());
        args.push("pdf".into());
        args.extend(self.config.extra_soffice_args.iter().map(OsString::from));
        args.push("--outdir".into());
        args.push(out_dir.into());
        args.push(input.into());
        args
    }

    fn pdftoppm_args(&self, pdf: &Path, prefix: &Path) -> Vec<OsString> {
        vec![
            self.config.raster_format.pdftoppm_flag().into(),
            "-r".into(),
            self.config.resolution_dpi.to_string().into(),
            pdf.into(),
            prefix.into(),
        ]
    }

    /// Run `program` to completion, killing it if the configured timeout expires
    fn run_tool(&self, program: &Path, args: &[OsString]) -> Result<ToolOutput, ToolFailure> {
        let name = program.display().to_string();
        tracing::debug!(program = %name, ?args, "Running external tool");

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| ToolFailure::Io {
                program: name.clone(),
                source,
            })?;

        runtime.block_on(self.wait_for(cmd, name))
    }

    async fn wait_for(&self, mut cmd: Command, name: String) -> Result<ToolOutput, ToolFailure> {
        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ToolFailure::NotFound(name.clone())
            } else {
                ToolFailure::Io {
                    program: name.clone(),
                    source: e,
                }
            }
        })?;

        // Dropping the wait future drops the child, which kills it
        let waited = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ToolFailure::TimedOut {
                    program: name.clone(),
                    limit,
                })?,
            None => child.wait_with_output().await,
        };
        let output = waited.map_err(|source| ToolFailure::Io {
            program: name.clone(),
            source,
        })?;

        let exit_code = output.status.code();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::debug!(program = %name, ?exit_code, "External tool finished");

        if output.status.success() {
            Ok(ToolOutput { exit_code, stderr })
        } else {
            Err(ToolFailure::Exited {
                program: name,
                exit_code,
                stderr,
            })
        }
    }
}

impl Renderer for LibreOfficeRenderer {
    fn convert_to_page(&self, input: &Path, out_dir: &Path) -> Result<ToolOutput, ToolFailure> {
        let args = self.soffice_args(input, out_dir);
        self.run_tool(&self.config.soffice(), &args)
    }

    fn convert_to_raster(&self, pdf: &Path, prefix: &Path) -> Result<ToolOutput, ToolFailure> {
        let args = self.pdftoppm_args(pdf, prefix);
        self.run_tool(&self.config.pdftoppm(), &args)
    }
}

/// `file://` URL for an absolute path
fn file_url(path: &Path) -> String {
    let path: PathBuf = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    };
    let text = path.display().to_string().replace('\\', "/").replace(' ', "%20");
    if text.starts_with('/') {
        format!("file://{text}")
    } else {
        format!("file:///{text}")
    }
}
