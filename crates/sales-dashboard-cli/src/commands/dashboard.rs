use clap::Args;
use serde_json::Value;

use sales_dashboard_core::dataset::DatasetCache;
use sales_dashboard_core::report::build_dashboard;

use super::common::{load, ViewArgs};

/// Arguments for rendering the live dashboard view
#[derive(Args)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub view: ViewArgs,
}

pub fn run_dashboard(args: DashboardArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let view = args.view.resolve()?;
    let mut cache = DatasetCache::new(view.load_options()?);
    render(&mut cache, &view)
}

/// One full pass: load (cached), filter, compute, compose.
pub fn render(cache: &mut DatasetCache, view: &ViewArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loaded = load(cache, view)?;
    let table = &loaded.result;
    let request = view.to_request(table);

    let mut out = build_dashboard(table, &request)?;
    let mut warnings = loaded.warnings.clone();
    warnings.append(&mut out.warnings);
    out.warnings = warnings;

    let kpi_lines = out.result.report.kpi_lines();
    let mut value = serde_json::to_value(&out)?;
    if let Some(result) = value.get_mut("result").and_then(Value::as_object_mut) {
        result.insert("kpi_lines".to_string(), serde_json::to_value(kpi_lines)?);
    }
    Ok(value)
}
