pub mod dataset;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod report;
pub mod types;

#[cfg(feature = "export")]
pub mod export;

pub use error::{DashboardError, DashboardWarning};
pub use types::*;

/// Standard result type for all dashboard operations
pub type DashboardResult<T> = Result<T, DashboardError>;

#[cfg(test)]
pub(crate) mod test_support;
