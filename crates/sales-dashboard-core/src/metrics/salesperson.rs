use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::aggregate::{customer_label, note_empty, sum_by, sum_by_pair, top_n, total_revenue};
use super::aggregate::{Point, SeriesPoint};
use super::granularity::Granularity;
use super::{ensure_amount, RoleCalculator};
use crate::error::DashboardWarning;
use crate::filter::criteria::selected;
use crate::filter::Subsets;
use crate::types::{Money, Rate, Role};
use crate::DashboardResult;

pub const TOP_CUSTOMERS: usize = 3;

/// Fraction of the target at which the gauge turns from red to the warning colour.
pub const NEAR_TARGET_RATIO: Decimal = dec!(0.9);

fn default_target() -> Money {
    dec!(1000)
}

/// Inputs for the Salesperson view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalespersonParams {
    /// Restrict to one salesperson; unset or "All" aggregates everyone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salesperson: Option<String>,
    #[serde(default = "default_target")]
    pub target: Money,
    #[serde(default)]
    pub granularity: Granularity,
}

impl Default for SalespersonParams {
    fn default() -> Self {
        SalespersonParams {
            salesperson: None,
            target: default_target(),
            granularity: Granularity::Monthly,
        }
    }
}

// ---------------------------------------------------------------------------
// Gauge
// ---------------------------------------------------------------------------

/// Where revenue stands against the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GaugeStatus {
    OnTarget,
    NearTarget,
    BelowTarget,
}

impl GaugeStatus {
    pub fn color(&self) -> &'static str {
        match self {
            GaugeStatus::OnTarget => "green",
            GaugeStatus::NearTarget => "magenta",
            GaugeStatus::BelowTarget => "red",
        }
    }
}

/// `OnTarget` at or above the target, `NearTarget` from 90% of it, else `BelowTarget`.
pub fn gauge_status(revenue: Money, target: Money) -> GaugeStatus {
    if revenue >= target {
        GaugeStatus::OnTarget
    } else if revenue >= target * NEAR_TARGET_RATIO {
        GaugeStatus::NearTarget
    } else {
        GaugeStatus::BelowTarget
    }
}

/// A shaded background range on the gauge axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeBand {
    pub from: Money,
    pub to: Money,
    pub color: String,
}

/// Everything needed to draw the progress gauge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeReading {
    pub value: Money,
    /// Threshold marker position
    pub target: Money,
    pub axis_max: Money,
    pub status: GaugeStatus,
    pub bands: Vec<GaugeBand>,
}

/// Axis runs to the larger of 1.5x target and 1.2x revenue; three bands split
/// the first 1.5x target at 0.5x and 1x.
pub fn gauge_reading(revenue: Money, target: Money) -> GaugeReading {
    let band = |from: Money, to: Money, color: &str| GaugeBand {
        from,
        to,
        color: color.to_string(),
    };
    GaugeReading {
        value: revenue,
        target,
        axis_max: (target * dec!(1.5)).max(revenue * dec!(1.2)),
        status: gauge_status(revenue, target),
        bands: vec![
            band(Decimal::ZERO, target * dec!(0.5), "lightgray"),
            band(target * dec!(0.5), target, "gray"),
            band(target, target * dec!(1.5), "darkgray"),
        ],
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// One salesperson's (or the whole team's) progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalespersonMetrics {
    /// `None` when aggregating every salesperson
    pub salesperson: Option<String>,
    pub number_of_sales: usize,
    pub revenue_achieved: Money,
    pub top_product: Option<Point>,
    /// Rows in the narrowed working subset
    pub total_events: usize,
    /// purchases / events, 0 when there are no events
    pub conversion_rate: Rate,
    pub target: Money,
    pub gauge: GaugeReading,
    /// Revenue per period
    pub performance: Vec<Point>,
    pub granularity: Granularity,
    /// Revenue per (product, country)
    pub breakdown: Vec<SeriesPoint>,
    pub revenue_by_product: Vec<Point>,
    pub top_customers: Vec<Point>,
}

impl RoleCalculator for SalespersonParams {
    type Metrics = SalespersonMetrics;

    fn compute_metrics(
        &self,
        subsets: &Subsets<'_>,
        warnings: &mut Vec<DashboardWarning>,
    ) -> DashboardResult<SalespersonMetrics> {
        ensure_amount("target", self.target)?;
        self.granularity.ensure_supported(Role::Salesperson)?;

        let person = selected(&self.salesperson);
        let narrowed = subsets.for_salesperson(person);
        let purchases = &narrowed.purchases;
        let granularity = self.granularity;

        let number_of_sales = purchases.len();
        let total_events = narrowed.working.len();
        let revenue_achieved = total_revenue(purchases);
        let conversion_rate = if total_events == 0 {
            Decimal::ZERO
        } else {
            Decimal::from(number_of_sales as u64) / Decimal::from(total_events as u64)
        };

        let revenue_by_product = sum_by(purchases, |r| r.product_name.clone());
        let performance = sum_by(purchases, |r| {
            r.sale_date.map(|d| granularity.period_label(d.date()))
        });
        let breakdown = sum_by_pair(
            purchases,
            |r| r.product_name.clone(),
            |r| r.country.clone(),
        );
        let top_customers = top_n(&sum_by(purchases, customer_label), TOP_CUSTOMERS);

        note_empty(warnings, &performance, "individual sales performance");
        note_empty(warnings, &breakdown, "performance breakdown by product and region");
        note_empty(warnings, &revenue_by_product, "sales by product");
        note_empty(warnings, &top_customers, "top customers");

        if let Some(name) = person {
            tracing::debug!(salesperson = name, sales = number_of_sales, "salesperson metrics");
        }

        Ok(SalespersonMetrics {
            salesperson: person.map(str::to_string),
            number_of_sales,
            revenue_achieved,
            top_product: top_n(&revenue_by_product, 1).into_iter().next(),
            total_events,
            conversion_rate,
            target: self.target,
            gauge: gauge_reading(revenue_achieved, self.target),
            performance,
            granularity,
            breakdown,
            revenue_by_product,
            top_customers,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
