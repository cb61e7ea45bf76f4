use serde::{Deserialize, Serialize};

use crate::dataset::SalesTable;
use crate::types::DateRange;

/// Selector value meaning "no restriction".
pub const ALL: &str = "All";

/// User-selected restrictions on the loaded table.
///
/// Every optional criterion is a no-op when unset, empty, or `"All"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Exact country match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Exact category match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Exact sales channel match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Case-insensitive substring of the product name or requested URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Exact salesperson match; only set for the Salesperson role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salesperson: Option<String>,
    /// Inclusive range applied to `sale_date`
    pub date_range: DateRange,
}

impl FilterCriteria {
    pub fn new(date_range: DateRange) -> Self {
        FilterCriteria {
            country: None,
            category: None,
            channel: None,
            keyword: None,
            salesperson: None,
            date_range,
        }
    }

    /// No restrictions beyond the table's own date bounds.
    pub fn for_table(table: &SalesTable) -> Self {
        FilterCriteria::new(table.date_bounds)
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn with_salesperson(mut self, salesperson: impl Into<String>) -> Self {
        self.salesperson = Some(salesperson.into());
        self
    }

    pub fn country(&self) -> Option<&str> {
        selected(&self.country)
    }

    pub fn category(&self) -> Option<&str> {
        selected(&self.category)
    }

    pub fn channel(&self) -> Option<&str> {
        selected(&self.channel)
    }

    pub fn salesperson(&self) -> Option<&str> {
        selected(&self.salesperson)
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// An active selector value, or `None` for unset / empty / "All".
pub fn selected(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != ALL)
}
