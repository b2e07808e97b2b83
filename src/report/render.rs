//! Turning staged files into the finished document.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::ReportError;

/// What a renderer is asked to produce.
#[derive(Clone, Debug)]
pub struct RenderRequest<'a> {
    /// Script token of the report type, e.g. `basic_report`.
    pub script: &'a str,
    /// Display name of the report.
    pub title: &'a str,
    /// Where the finished document goes.
    pub target: &'a Path,
    /// Staged files in rendering order.
    pub files: Vec<&'a Path>,
}

/// Renders staged tabular files into a document.
pub trait Renderer {
    /// Writes the document and returns its path.
    fn render(&self, request: &RenderRequest<'_>) -> Result<PathBuf, ReportError>;
}

/// Runs `{python} {scripts_dir}/{script}.py {title} {target} {files...}`.
///
/// The script is expected to exit with status 0; anything else fails the
/// generation with the script's stderr.
#[derive(Clone, Debug)]
pub struct ScriptRenderer {
    python: String,
    scripts_dir: PathBuf,
}

impl ScriptRenderer {
    pub fn new(python: impl Into<String>, scripts_dir: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            scripts_dir: scripts_dir.into(),
        }
    }

    pub fn script_path(&self, script: &str) -> PathBuf {
        self.scripts_dir.join(format!("{}.py", script))
    }
}

impl Renderer for ScriptRenderer {
    fn render(&self, request: &RenderRequest<'_>) -> Result<PathBuf, ReportError> {
        let script = self.script_path(request.script);
        tracing::debug!(
            python = %self.python,
            script = %script.display(),
            files = request.files.len(),
            "running report script"
        );

        let output = Command::new(&self.python)
            .arg(&script)
            .arg(request.title)
            .arg(request.target)
            .args(&request.files)
            .output()?;

        if !output.status.success() {
            return Err(ReportError::Render {
                script: request.script.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(request.target.to_path_buf())
    }
}

/// Concatenates the staged files into the target as-is.
///
/// Useful for CSV reports and wherever no script environment is available.
#[derive(Clone, Copy, Debug, Default)]
pub struct CsvRenderer;

impl Renderer for CsvRenderer {
    fn render(&self, request: &RenderRequest<'_>) -> Result<PathBuf, ReportError> {
        let mut out = BufWriter::new(File::create(request.target)?);
        for path in &request.files {
            let mut input = File::open(path)?;
            io::copy(&mut input, &mut out)?;
        }
        out.flush()?;
        Ok(request.target.to_path_buf())
    }
}
