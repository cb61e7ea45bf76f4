use clap::Args;
use serde_json::{json, Value};

use sales_dashboard_core::dataset::{filter_options, DatasetCache};
use sales_dashboard_core::filter::criteria::ALL;

use super::common::{load, ViewArgs};

/// Arguments for listing the selectable filter values
#[derive(Args)]
pub struct OptionsArgs {
    #[command(flatten)]
    pub view: ViewArgs,
}

pub fn run_options(args: OptionsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let view = args.view.resolve()?;
    let mut cache = DatasetCache::new(view.load_options()?);
    options(&mut cache, &view)
}

/// Selector values, each list headed by "All".
pub fn options(cache: &mut DatasetCache, view: &ViewArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loaded = load(cache, view)?;
    let opts = filter_options(&loaded.result);
    let with_all = |values: Vec<String>| {
        std::iter::once(ALL.to_string())
            .chain(values)
            .collect::<Vec<String>>()
    };
    Ok(json!({
        "result": {
            "countries": with_all(opts.countries),
            "categories": with_all(opts.categories),
            "channels": with_all(opts.channels),
            "salespeople": with_all(opts.salespeople),
            "start": opts.date_bounds.start,
            "end": opts.date_bounds.end,
            "rows": loaded.result.len(),
        },
        "warnings": loaded.warnings,
    }))
}
