//! File adapters: the filtered CSV extract and the PDF report with its charts.

pub mod chart;
pub mod csv;
pub mod legend;
pub mod pdf;

use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::DashboardError;
use crate::DashboardResult;

pub use self::chart::{render_chart_png, render_chart_png_in, ChartImage};
pub use self::legend::{chart_captions, CaptionLine};
pub use self::csv::{csv_file_name, export_csv, write_csv};
pub use self::pdf::{export_pdf, pdf_file_name, render_pdf};

/// A file written by an export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub bytes: usize,
    /// Data rows, for tabular exports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
}

/// Write `contents` to `dir/file_name` through a temp file in the same
/// directory, so a failed write never leaves a partial file behind.
pub(crate) fn write_atomically(dir: &Path, file_name: &str, contents: &[u8]) -> DashboardResult<PathBuf> {
    if !dir.is_dir() {
        return Err(DashboardError::Export(format!(
            "output directory {} does not exist",
            dir.display()
        )));
    }
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    let target = dir.join(file_name);
    tmp.persist(&target)
        .map_err(|e| DashboardError::Export(format!("{}: {}", target.display(), e.error)))?;
    Ok(target)
}
