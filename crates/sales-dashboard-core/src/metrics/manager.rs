use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::aggregate::{note_empty, rank_desc, shares, sum_by, sum_by_pair, top_n, total_revenue};
use super::aggregate::{Point, SeriesPoint, Share};
use super::granularity::Granularity;
use super::{ensure_amount, RoleCalculator};
use crate::dataset::{EventType, TransactionRecord};
use crate::error::DashboardWarning;
use crate::filter::Subsets;
use crate::types::{Money, Role};
use crate::DashboardResult;

pub const TOP_PRODUCTS: usize = 5;

fn default_target() -> Money {
    dec!(1000)
}

/// Inputs for the Sales Manager view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerParams {
    /// Revenue target per product, drawn as a reference line
    #[serde(default = "default_target")]
    pub target: Money,
    /// Bucket for the revenue trend chart
    #[serde(default)]
    pub granularity: Granularity,
}

impl Default for ManagerParams {
    fn default() -> Self {
        ManagerParams {
            target: default_target(),
            granularity: Granularity::Monthly,
        }
    }
}

/// Team-wide revenue picture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerMetrics {
    pub total_revenue: Money,
    /// Up to five products by revenue, highest first
    pub top_products: Vec<Point>,
    /// Every salesperson by revenue, highest first
    pub top_salespeople: Vec<Point>,
    /// Demo requests across all filtered events, not only sales
    pub demo_requests: usize,
    pub revenue_by_product: Vec<Point>,
    pub revenue_by_channel: Vec<Point>,
    pub salesperson_share: Vec<Share>,
    /// Revenue per (period, product)
    pub revenue_trend: Vec<SeriesPoint>,
    pub granularity: Granularity,
    pub target: Money,
}

impl ManagerMetrics {
    pub fn top_product(&self) -> Option<&Point> {
        self.top_products.first()
    }

    pub fn top_salesperson(&self) -> Option<&Point> {
        self.top_salespeople.first()
    }
}

impl RoleCalculator for ManagerParams {
    type Metrics = ManagerMetrics;

    fn compute_metrics(
        &self,
        subsets: &Subsets<'_>,
        warnings: &mut Vec<DashboardWarning>,
    ) -> DashboardResult<ManagerMetrics> {
        ensure_amount("target", self.target)?;
        self.granularity.ensure_supported(Role::Manager)?;

        let purchases = &subsets.purchases;
        let granularity = self.granularity;

        let revenue_by_product = sum_by(purchases, |r| r.product_name.clone());
        let revenue_by_salesperson = sum_by(purchases, |r| r.salesperson.clone());
        let revenue_by_channel = sum_by(purchases, |r| r.sales_channel.clone());
        let revenue_trend = sum_by_pair(
            purchases,
            |r| r.sale_date.map(|d| granularity.period_label(d.date())),
            |r| r.product_name.clone(),
        );

        let demo_requests = subsets
            .working
            .iter()
            .filter(|r| is_demo_request(r))
            .count();

        note_empty(warnings, &revenue_by_product, "revenue by product");
        note_empty(warnings, &revenue_by_channel, "sales by channel");
        note_empty(warnings, &revenue_by_salesperson, "sales by salesperson");
        note_empty(warnings, &revenue_trend, "sales trend over time");

        Ok(ManagerMetrics {
            total_revenue: total_revenue(purchases),
            top_products: top_n(&revenue_by_product, TOP_PRODUCTS),
            top_salespeople: rank_desc(&revenue_by_salesperson),
            demo_requests,
            salesperson_share: shares(&revenue_by_salesperson),
            revenue_by_product,
            revenue_by_channel,
            revenue_trend,
            granularity,
            target: self.target,
        })
    }
}

fn is_demo_request(record: &TransactionRecord) -> bool {
    record.event_type == Some(EventType::DemoRequest)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
