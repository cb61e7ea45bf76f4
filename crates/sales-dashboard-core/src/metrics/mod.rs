//! Per-role KPI and chart aggregates over the filtered subsets.

pub mod aggregate;
pub mod granularity;
pub mod manager;
pub mod marketer;
pub mod salesperson;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::{DashboardError, DashboardWarning};
use crate::filter::Subsets;
use crate::types::{with_metadata, ComputationOutput, Role, MAX_AMOUNT};
use crate::DashboardResult;

pub use aggregate::{Point, SeriesPoint, Share};
pub use granularity::Granularity;
pub use manager::{ManagerMetrics, ManagerParams};
pub use marketer::{MarketerMetrics, MarketerParams};
pub use salesperson::{GaugeReading, GaugeStatus, SalespersonMetrics, SalespersonParams};

/// Shared capability of every role: turn subsets into that role's metrics.
pub trait RoleCalculator {
    type Metrics: Serialize;

    /// Compute the metrics, appending non-fatal conditions to `warnings`.
    fn compute_metrics(
        &self,
        subsets: &Subsets<'_>,
        warnings: &mut Vec<DashboardWarning>,
    ) -> DashboardResult<Self::Metrics>;
}

/// A role together with its role-specific parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RoleRequest {
    Manager(ManagerParams),
    Salesperson(SalespersonParams),
    Marketer(MarketerParams),
}

impl RoleRequest {
    pub fn role(&self) -> Role {
        match self {
            RoleRequest::Manager(_) => Role::Manager,
            RoleRequest::Salesperson(_) => Role::Salesperson,
            RoleRequest::Marketer(_) => Role::Marketer,
        }
    }

    /// Default targets and granularity for a role.
    pub fn default_for(role: Role) -> Self {
        match role {
            Role::Manager => RoleRequest::Manager(ManagerParams::default()),
            Role::Salesperson => RoleRequest::Salesperson(SalespersonParams::default()),
            Role::Marketer => RoleRequest::Marketer(MarketerParams::default()),
        }
    }

    /// The salesperson this request narrows to, if any.
    pub fn salesperson(&self) -> Option<&str> {
        match self {
            RoleRequest::Salesperson(p) => crate::filter::criteria::selected(&p.salesperson),
            _ => None,
        }
    }
}

/// Metrics for exactly one role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", content = "metrics", rename_all = "snake_case")]
pub enum MetricBundle {
    Manager(ManagerMetrics),
    Salesperson(SalespersonMetrics),
    Marketer(MarketerMetrics),
}

impl MetricBundle {
    pub fn role(&self) -> Role {
        match self {
            MetricBundle::Manager(_) => Role::Manager,
            MetricBundle::Salesperson(_) => Role::Salesperson,
            MetricBundle::Marketer(_) => Role::Marketer,
        }
    }
}

/// Dispatch to the calculator for the requested role.
pub fn compute_metrics(
    request: &RoleRequest,
    subsets: &Subsets<'_>,
) -> DashboardResult<ComputationOutput<MetricBundle>> {
    let start = Instant::now();
    let mut warnings: Vec<DashboardWarning> = Vec::new();

    let bundle = match request {
        RoleRequest::Manager(p) => MetricBundle::Manager(p.compute_metrics(subsets, &mut warnings)?),
        RoleRequest::Salesperson(p) => {
            MetricBundle::Salesperson(p.compute_metrics(subsets, &mut warnings)?)
        }
        RoleRequest::Marketer(p) => {
            MetricBundle::Marketer(p.compute_metrics(subsets, &mut warnings)?)
        }
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        &format!("{} metrics over the filtered subsets", request.role()),
        request,
        warnings,
        elapsed,
        bundle,
    ))
}

/// Targets must lie in `[0, MAX_AMOUNT]`.
pub fn ensure_amount(field: &str, value: Decimal) -> DashboardResult<()> {
    if value < Decimal::ZERO || value > MAX_AMOUNT {
        return Err(DashboardError::InvalidInput {
            field: field.to_string(),
            reason: format!("must be between 0 and {}", MAX_AMOUNT),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
