use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Validation failed: {field} — {reason}")]
    Validation { field: String, reason: String },

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for DashboardError {
    fn from(e: serde_json::Error) -> Self {
        DashboardError::SerializationError(e.to_string())
    }
}

impl From<csv::Error> for DashboardError {
    fn from(e: csv::Error) -> Self {
        DashboardError::Csv(e.to_string())
    }
}

impl From<std::io::Error> for DashboardError {
    fn from(e: std::io::Error) -> Self {
        DashboardError::Io(e.to_string())
    }
}

/// Conditions that are reported to the caller but never stop the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardWarning {
    /// Duplicate keys in a column expected to be unique.
    Integrity { column: String, duplicates: usize },
    /// A subset or aggregate came out empty; dependent sections degrade to placeholders.
    EmptyResult { context: String },
    /// No parsable `sale_date` values; the default calendar year is used as date bounds.
    DefaultDateRange { start: NaiveDate, end: NaiveDate },
}

impl DashboardWarning {
    pub fn empty(context: impl Into<String>) -> Self {
        DashboardWarning::EmptyResult {
            context: context.into(),
        }
    }
}

impl std::fmt::Display for DashboardWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DashboardWarning::Integrity { column, duplicates } => write!(
                f,
                "Duplicate values detected in '{}' ({} rows). Consider cleaning the dataset.",
                column, duplicates
            ),
            DashboardWarning::EmptyResult { context } => write!(f, "No data for {}", context),
            DashboardWarning::DefaultDateRange { start, end } => write!(
                f,
                "No valid dates found in 'sale_date'. Using default range {} to {}.",
                start, end
            ),
        }
    }
}
