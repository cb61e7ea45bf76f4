use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::record::{SalesTable, TransactionRecord};
use crate::types::DateRange;

/// Values offered by the filter selectors for a loaded table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub countries: Vec<String>,
    pub categories: Vec<String>,
    pub channels: Vec<String>,
    pub salespeople: Vec<String>,
    pub date_bounds: DateRange,
}

/// Sorted distinct non-null values of each filterable column.
pub fn filter_options(table: &SalesTable) -> FilterOptions {
    FilterOptions {
        countries: distinct(&table.records, |r| r.country.as_deref()),
        categories: distinct(&table.records, |r| r.category.as_deref()),
        channels: distinct(&table.records, |r| r.sales_channel.as_deref()),
        salespeople: distinct(&table.records, |r| r.salesperson.as_deref()),
        date_bounds: table.date_bounds,
    }
}

fn distinct<F>(records: &[TransactionRecord], field: F) -> Vec<String>
where
    F: Fn(&TransactionRecord) -> Option<&str>,
{
    records
        .iter()
        .filter_map(field)
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
