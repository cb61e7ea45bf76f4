use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::compose::compose_report;
use super::Report;
use crate::dataset::SalesTable;
use crate::error::DashboardWarning;
use crate::filter::{apply_filters, FilterCriteria};
use crate::metrics::{compute_metrics, MetricBundle, RoleRequest};
use crate::types::{with_metadata, ComputationOutput, Role};
use crate::DashboardResult;

/// One render request: what to filter and which role view to build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRequest {
    pub criteria: FilterCriteria,
    #[serde(flatten)]
    pub role: RoleRequest,
}

impl DashboardRequest {
    pub fn new(criteria: FilterCriteria, role: RoleRequest) -> Self {
        DashboardRequest { criteria, role }
    }

    /// Criteria as applied: the salesperson selector only counts for the
    /// Salesperson view.
    pub fn effective_criteria(&self) -> FilterCriteria {
        let mut criteria = self.criteria.clone();
        criteria.salesperson = match self.role.role() {
            Role::Salesperson => self
                .role
                .salesperson()
                .or(criteria.salesperson())
                .map(str::to_string),
            _ => None,
        };
        criteria
    }

    /// Role inputs as applied: a Salesperson view picks up the salesperson
    /// chosen in the criteria when its own selector is unset.
    pub fn effective_role(&self) -> RoleRequest {
        match &self.role {
            RoleRequest::Salesperson(params) if self.role.salesperson().is_none() => {
                let mut params = params.clone();
                params.salesperson = self.effective_criteria().salesperson;
                RoleRequest::Salesperson(params)
            }
            other => other.clone(),
        }
    }
}

/// Everything one render produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    pub report: Report,
    pub metrics: MetricBundle,
    pub working_rows: usize,
    pub purchase_rows: usize,
}

/// Full pass over a loaded table: validate, filter, compute, compose.
pub fn build_dashboard(
    table: &SalesTable,
    request: &DashboardRequest,
) -> DashboardResult<ComputationOutput<DashboardView>> {
    let start = Instant::now();
    let criteria = request.effective_criteria();
    let role = request.effective_role();

    let filtered = apply_filters(table, &criteria)?;
    let subsets = &filtered.result;
    let metrics = compute_metrics(&role, subsets)?;
    let report = compose_report(&metrics.result, criteria.date_range);

    let mut warnings: Vec<DashboardWarning> = filtered.warnings.clone();
    warnings.extend(metrics.warnings);
    for w in &warnings {
        tracing::warn!("{}", w);
    }
    tracing::info!(
        role = %role.role(),
        working = subsets.working.len(),
        purchases = subsets.purchases.len(),
        sections = report.sections.len(),
        "dashboard built"
    );

    let view = DashboardView {
        report,
        metrics: metrics.result,
        working_rows: subsets.working.len(),
        purchase_rows: subsets.purchases.len(),
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Filter, role metrics, report composition",
        request,
        warnings,
        elapsed,
        view,
    ))
}
