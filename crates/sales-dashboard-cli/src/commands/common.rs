use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;

use sales_dashboard_core::dataset::{DatasetCache, LoadOptions, LoadedDataset, SalesTable};
use sales_dashboard_core::filter::FilterCriteria;
use sales_dashboard_core::metrics::{
    Granularity, ManagerParams, MarketerParams, RoleRequest, SalespersonParams,
};
use sales_dashboard_core::report::DashboardRequest;
use sales_dashboard_core::{DateRange, Role};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleArg {
    Manager,
    Salesperson,
    Marketer,
}

impl From<RoleArg> for Role {
    fn from(r: RoleArg) -> Self {
        match r {
            RoleArg::Manager => Role::Manager,
            RoleArg::Salesperson => Role::Salesperson,
            RoleArg::Marketer => Role::Marketer,
        }
    }
}

/// Dataset, role and filter selection shared by every subcommand
#[derive(Args, Debug, Clone)]
#[command(allow_hyphen_values = true)]
pub struct ViewArgs {
    /// Path to a JSON or YAML request file (overrides individual flags)
    #[arg(long)]
    pub request: Option<String>,

    /// Sales data file
    #[arg(long, default_value = "sales_data.csv")]
    pub data: String,

    /// Field delimiter of the data file
    #[arg(long, default_value = ",")]
    pub delimiter: char,

    /// Dashboard role
    #[arg(long, value_enum, default_value = "manager")]
    pub role: RoleArg,

    /// Country filter ("All" for every country)
    #[arg(long)]
    pub country: Option<String>,

    /// Product category filter
    #[arg(long)]
    pub category: Option<String>,

    /// Sales channel filter
    #[arg(long)]
    pub channel: Option<String>,

    /// Case-insensitive search over product names and URLs
    #[arg(long)]
    pub keyword: Option<String>,

    /// Salesperson (Salesperson role only)
    #[arg(long)]
    pub salesperson: Option<String>,

    /// First day of the date range (YYYY-MM-DD), defaults to the earliest sale
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the date range (YYYY-MM-DD), defaults to the latest sale
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Revenue target (manager, salesperson) or URL visit target (marketer)
    #[arg(long)]
    pub target: Option<Decimal>,

    /// Trend bucket: daily, weekly, monthly, quarterly, yearly
    #[arg(long)]
    pub granularity: Option<Granularity>,
}

/// Request file / session line. Every field is optional and overrides the flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestOverrides {
    pub data: Option<String>,
    pub delimiter: Option<char>,
    pub role: Option<RoleArg>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub channel: Option<String>,
    pub keyword: Option<String>,
    pub salesperson: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub target: Option<Decimal>,
    pub granularity: Option<Granularity>,
}

impl ViewArgs {
    /// Apply `--request` (or JSON piped on stdin) on top of the flags.
    pub fn resolve(self) -> Result<ViewArgs, Box<dyn std::error::Error>> {
        if self.request.is_some() {
            return self.resolve_file();
        }
        let mut view = self;
        if let Some(overrides) = input::stdin::read_stdin::<RequestOverrides>()? {
            view.apply(overrides);
        }
        Ok(view)
    }

    /// Apply `--request` only. Used where stdin carries something else.
    pub fn resolve_file(mut self) -> Result<ViewArgs, Box<dyn std::error::Error>> {
        if let Some(ref path) = self.request {
            let overrides: RequestOverrides = input::file::read_request(path)?;
            self.apply(overrides);
        }
        Ok(self)
    }

    pub fn apply(&mut self, o: RequestOverrides) {
        fn set<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }
        if let Some(data) = o.data {
            self.data = data;
        }
        if let Some(d) = o.delimiter {
            self.delimiter = d;
        }
        if let Some(role) = o.role {
            self.role = role;
        }
        set(&mut self.country, o.country);
        set(&mut self.category, o.category);
        set(&mut self.channel, o.channel);
        set(&mut self.keyword, o.keyword);
        set(&mut self.salesperson, o.salesperson);
        set(&mut self.start, o.start);
        set(&mut self.end, o.end);
        set(&mut self.target, o.target);
        set(&mut self.granularity, o.granularity);
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data)
    }

    pub fn load_options(&self) -> Result<LoadOptions, Box<dyn std::error::Error>> {
        if !self.delimiter.is_ascii() {
            return Err(format!("--delimiter must be an ASCII character, got '{}'", self.delimiter).into());
        }
        Ok(LoadOptions {
            delimiter: self.delimiter as u8,
            ..Default::default()
        })
    }

    /// Turn the selection into a core request. Unset dates fall back to the
    /// table's bounds.
    pub fn to_request(&self, table: &SalesTable) -> DashboardRequest {
        let bounds = table.date_bounds;
        let mut criteria = FilterCriteria::new(DateRange::new(
            self.start.unwrap_or(bounds.start),
            self.end.unwrap_or(bounds.end),
        ));
        criteria.country = self.country.clone();
        criteria.category = self.category.clone();
        criteria.channel = self.channel.clone();
        criteria.keyword = self.keyword.clone();
        criteria.salesperson = self.salesperson.clone();

        let role = match Role::from(self.role) {
            Role::Manager => {
                let d = ManagerParams::default();
                RoleRequest::Manager(ManagerParams {
                    target: self.target.unwrap_or(d.target),
                    granularity: self.granularity.unwrap_or(d.granularity),
                })
            }
            Role::Salesperson => {
                let d = SalespersonParams::default();
                RoleRequest::Salesperson(SalespersonParams {
                    salesperson: self.salesperson.clone(),
                    target: self.target.unwrap_or(d.target),
                    granularity: self.granularity.unwrap_or(d.granularity),
                })
            }
            Role::Marketer => {
                let d = MarketerParams::default();
                RoleRequest::Marketer(MarketerParams {
                    url_target: self.target.unwrap_or(d.url_target),
                    granularity: self.granularity.unwrap_or(d.granularity),
                })
            }
        };

        DashboardRequest::new(criteria, role)
    }
}

/// Load (or reuse) the dataset named by the view.
pub fn load(
    cache: &mut DatasetCache,
    view: &ViewArgs,
) -> Result<std::sync::Arc<LoadedDataset>, Box<dyn std::error::Error>> {
    Ok(cache.get_or_load(&view.data_path())?)
}
