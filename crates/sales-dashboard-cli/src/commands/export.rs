use chrono::Local;
use clap::Args;
use serde_json::{json, Value};
use std::path::PathBuf;

use sales_dashboard_core::dataset::DatasetCache;
use sales_dashboard_core::export;
use sales_dashboard_core::filter::apply_filters;
use sales_dashboard_core::report::build_dashboard;

use super::common::{load, ViewArgs};

/// Arguments for writing an export file
#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Directory the file is written to
    #[arg(long, default_value = ".")]
    pub out_dir: String,
}

pub fn run_export_csv(args: ExportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let view = args.view.resolve()?;
    let mut cache = DatasetCache::new(view.load_options()?);
    export_csv(&mut cache, &view, &PathBuf::from(args.out_dir))
}

pub fn run_export_pdf(args: ExportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let view = args.view.resolve()?;
    let mut cache = DatasetCache::new(view.load_options()?);
    export_pdf(&mut cache, &view, &PathBuf::from(args.out_dir))
}

/// Filtered rows, original columns.
pub fn export_csv(
    cache: &mut DatasetCache,
    view: &ViewArgs,
    out_dir: &std::path::Path,
) -> Result<Value, Box<dyn std::error::Error>> {
    let loaded = load(cache, view)?;
    let table = &loaded.result;
    let request = view.to_request(table);
    let filtered = apply_filters(table, &request.effective_criteria())?;
    let file = export::export_csv(out_dir, table, &filtered.result, Local::now().date_naive())?;
    Ok(json!({ "result": file, "warnings": filtered.warnings }))
}

/// The role's report as a PDF.
pub fn export_pdf(
    cache: &mut DatasetCache,
    view: &ViewArgs,
    out_dir: &std::path::Path,
) -> Result<Value, Box<dyn std::error::Error>> {
    let loaded = load(cache, view)?;
    let table = &loaded.result;
    let out = build_dashboard(table, &view.to_request(table))?;
    let file = export::export_pdf(out_dir, &out.result.report, Local::now().naive_local())?;
    Ok(json!({ "result": file, "warnings": out.warnings }))
}
