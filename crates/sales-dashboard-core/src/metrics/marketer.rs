use chrono::Timelike;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::aggregate::{count_by, count_by_pair, customer_label, note_empty, rank_desc, shares};
use super::aggregate::{sum_by, sum_by_pair, top_n, Point, SeriesPoint, Share};
use super::granularity::Granularity;
use super::{ensure_amount, RoleCalculator};
use crate::dataset::TransactionRecord;
use crate::error::DashboardWarning;
use crate::filter::Subsets;
use crate::types::Role;
use crate::DashboardResult;

pub const TOP_CLIENTS: usize = 5;

/// Age group labels in axis order.
pub const AGE_BUCKETS: [&str; 5] = ["0-20", "21-30", "31-40", "41-50", "51+"];

fn default_url_target() -> Decimal {
    dec!(100)
}

/// Inputs for the Sales Marketer view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketerParams {
    /// Visits per URL per period, drawn on the URL trend chart
    #[serde(default = "default_url_target")]
    pub url_target: Decimal,
    #[serde(default)]
    pub granularity: Granularity,
}

impl Default for MarketerParams {
    fn default() -> Self {
        MarketerParams {
            url_target: default_url_target(),
            granularity: Granularity::Monthly,
        }
    }
}

/// Traffic and audience picture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketerMetrics {
    /// Distinct session ids; a missing id counts as one session
    pub total_visits: usize,
    /// Mean over sessions of each session's mean response time
    pub avg_session_length_ms: Decimal,
    /// Most frequent hour of `timestamp`, smallest on ties
    pub most_active_hour: Option<u32>,
    pub total_log_requests: usize,
    pub geo_revenue: Vec<Point>,
    /// Revenue per (age bucket, product)
    pub sales_by_age: Vec<SeriesPoint>,
    /// Revenue per (occupation, product)
    pub sales_by_occupation: Vec<SeriesPoint>,
    pub top_customers: Vec<Point>,
    /// Request count per URL, busiest first
    pub url_visits: Vec<Point>,
    /// Each URL's fraction of all requests, same order as `url_visits`
    pub url_share: Vec<Share>,
    /// Requests per (period, URL)
    pub url_trend: Vec<SeriesPoint>,
    pub url_target: Decimal,
    pub granularity: Granularity,
}

impl RoleCalculator for MarketerParams {
    type Metrics = MarketerMetrics;

    fn compute_metrics(
        &self,
        subsets: &Subsets<'_>,
        warnings: &mut Vec<DashboardWarning>,
    ) -> DashboardResult<MarketerMetrics> {
        ensure_amount("url_target", self.url_target)?;
        self.granularity.ensure_supported(Role::Marketer)?;

        let working = &subsets.working;
        let purchases = &subsets.purchases;
        let granularity = self.granularity;

        let total_visits = working
            .iter()
            .map(|r| r.session_id.as_deref())
            .collect::<BTreeSet<Option<&str>>>()
            .len();

        let avg_session_length_ms = match mean_of_session_means(working) {
            Some(mean) => mean,
            None => {
                warnings.push(DashboardWarning::empty("session length"));
                Decimal::ZERO
            }
        };

        let geo_revenue = sum_by(purchases, |r| r.country.clone());
        let sales_by_age = sum_by_pair(
            purchases,
            |r| r.customer_age.and_then(age_bucket).map(str::to_string),
            |r| r.product_name.clone(),
        );
        let sales_by_occupation = sum_by_pair(
            purchases,
            |r| r.occupation.clone(),
            |r| r.product_name.clone(),
        );
        let top_customers = top_n(&sum_by(purchases, customer_label), TOP_CLIENTS);
        let url_visits = rank_desc(&count_by(working, |r| r.url_requested.clone()));
        let url_trend = count_by_pair(
            working,
            |r| r.timestamp.map(|t| granularity.period_label(t.date())),
            |r| r.url_requested.clone(),
        );

        note_empty(warnings, &geo_revenue, "geographic sales distribution");
        note_empty(warnings, &sales_by_age, "product sales by age");
        note_empty(warnings, &sales_by_occupation, "product sales by occupation");
        note_empty(warnings, &top_customers, "high-value clients");
        note_empty(warnings, &url_visits, "URL visits");
        note_empty(warnings, &url_trend, "URL trend over time");

        Ok(MarketerMetrics {
            total_visits,
            avg_session_length_ms,
            most_active_hour: modal_hour(working),
            total_log_requests: working.len(),
            geo_revenue,
            sales_by_age,
            sales_by_occupation,
            top_customers,
            url_share: shares(&url_visits),
            url_visits,
            url_trend,
            url_target: self.url_target,
            granularity,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Age group for a customer age. `[0,20]` is closed on both ends, later
/// groups are closed on the right; ages above 100 have no group.
pub fn age_bucket(age: Decimal) -> Option<&'static str> {
    if age < Decimal::ZERO {
        None
    } else if age <= dec!(20) {
        Some(AGE_BUCKETS[0])
    } else if age <= dec!(30) {
        Some(AGE_BUCKETS[1])
    } else if age <= dec!(40) {
        Some(AGE_BUCKETS[2])
    } else if age <= dec!(50) {
        Some(AGE_BUCKETS[3])
    } else if age <= dec!(100) {
        Some(AGE_BUCKETS[4])
    } else {
        None
    }
}

/// Mean of per-session mean response times. Rows without a session id and
/// sessions with no response times are skipped; `None` when nothing is left.
pub fn mean_of_session_means(rows: &[&TransactionRecord]) -> Option<Decimal> {
    let mut sessions: BTreeMap<&str, (Decimal, u64)> = BTreeMap::new();
    for &r in rows {
        if let (Some(id), Some(ms)) = (r.session_id.as_deref(), r.response_time_ms) {
            let entry = sessions.entry(id).or_insert((Decimal::ZERO, 0));
            entry.0 += ms;
            entry.1 += 1;
        }
    }
    if sessions.is_empty() {
        return None;
    }
    let sum: Decimal = sessions
        .values()
        .map(|(total, n)| *total / Decimal::from(*n))
        .sum();
    Some(sum / Decimal::from(sessions.len() as u64))
}

/// Most common hour of the day in `timestamp`; the earliest hour wins ties.
pub fn modal_hour(rows: &[&TransactionRecord]) -> Option<u32> {
    let mut counts = [0usize; 24];
    for r in rows {
        if let Some(ts) = r.timestamp {
            counts[ts.hour() as usize] += 1;
        }
    }
    let best = *counts.iter().max()?;
    if best == 0 {
        return None;
    }
    counts.iter().position(|&c| c == best).map(|h| h as u32)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
