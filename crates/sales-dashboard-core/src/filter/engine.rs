use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Instant;

use super::criteria::FilterCriteria;
use crate::dataset::{EventType, SalesTable, TransactionRecord};
use crate::error::{DashboardError, DashboardWarning};
use crate::types::{with_metadata, ComputationOutput, DateRange};
use crate::DashboardResult;

/// Status code of a request that completed normally.
pub const SUCCESS_STATUS: u16 = 200;

/// Rows left after filtering, and the successful sales among them.
#[derive(Debug, Clone, Serialize)]
pub struct Subsets<'a> {
    pub working: Vec<&'a TransactionRecord>,
    pub purchases: Vec<&'a TransactionRecord>,
}

impl<'a> Subsets<'a> {
    /// Build from a working subset, deriving purchases from it.
    pub fn from_working(working: Vec<&'a TransactionRecord>) -> Self {
        let purchases = working
            .iter()
            .copied()
            .filter(|r| is_successful_purchase(r))
            .collect();
        Subsets { working, purchases }
    }

    /// Keep only one salesperson's rows; `None` keeps everyone.
    pub fn for_salesperson(&self, salesperson: Option<&str>) -> Subsets<'a> {
        match salesperson {
            None => self.clone(),
            Some(name) => Subsets::from_working(
                self.working
                    .iter()
                    .copied()
                    .filter(|r| r.salesperson.as_deref() == Some(name))
                    .collect(),
            ),
        }
    }
}

/// The one definition of "a sale": positive price, a Purchase event, and a 200 status.
pub fn is_successful_purchase(record: &TransactionRecord) -> bool {
    matches!(record.total_price, Some(p) if p > Decimal::ZERO)
        && record.event_type == Some(EventType::Purchase)
        && record.status_code == Some(SUCCESS_STATUS)
}

/// Check the date range is ordered and inside the table's selectable bounds.
pub fn validate_criteria(criteria: &FilterCriteria, bounds: &DateRange) -> DashboardResult<()> {
    let range = &criteria.date_range;
    if range.start > range.end {
        return Err(DashboardError::InvalidInput {
            field: "date_range".to_string(),
            reason: format!("start {} is after end {}", range.start, range.end),
        });
    }
    if !bounds.covers(range) {
        return Err(DashboardError::InvalidInput {
            field: "date_range".to_string(),
            reason: format!("{} is outside the available dates {}", range, bounds),
        });
    }
    Ok(())
}

/// Apply every active criterion and derive the purchase subset.
///
/// Row order follows the table; the same table and criteria always give the
/// same rows.
pub fn apply_filters<'a>(
    table: &'a SalesTable,
    criteria: &FilterCriteria,
) -> DashboardResult<ComputationOutput<Subsets<'a>>> {
    let start = Instant::now();
    let mut warnings: Vec<DashboardWarning> = Vec::new();

    validate_criteria(criteria, &table.date_bounds)?;

    let keyword = criteria.keyword().map(str::to_lowercase);
    let working: Vec<&TransactionRecord> = table
        .records
        .iter()
        .filter(|r| matches_criteria(r, criteria, keyword.as_deref()))
        .collect();

    let subsets = Subsets::from_working(working);

    if subsets.working.is_empty() {
        warnings.push(DashboardWarning::empty(
            "the selected filters; adjust filters to include data",
        ));
    } else if subsets.purchases.is_empty() {
        warnings.push(DashboardWarning::empty(
            "successful purchases; purchase-related charts will be empty",
        ));
    }

    tracing::debug!(
        working = subsets.working.len(),
        purchases = subsets.purchases.len(),
        "filters applied"
    );

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Criteria filter with canonical successful-purchase predicate",
        criteria,
        warnings,
        elapsed,
        subsets,
    ))
}

fn matches_criteria(
    record: &TransactionRecord,
    criteria: &FilterCriteria,
    keyword_lower: Option<&str>,
) -> bool {
    let exact = |wanted: Option<&str>, actual: &Option<String>| match wanted {
        None => true,
        Some(w) => actual.as_deref() == Some(w),
    };

    if !exact(criteria.country(), &record.country)
        || !exact(criteria.category(), &record.category)
        || !exact(criteria.channel(), &record.sales_channel)
        || !exact(criteria.salesperson(), &record.salesperson)
    {
        return false;
    }

    if let Some(kw) = keyword_lower {
        let hit = |field: &Option<String>| {
            field
                .as_deref()
                .map(|v| v.to_lowercase().contains(kw))
                .unwrap_or(false)
        };
        if !hit(&record.product_name) && !hit(&record.url_requested) {
            return false;
        }
    }

    match record.sale_date {
        Some(dt) => criteria.date_range.contains(dt.date()),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, date, event, purchase, table};
    use rust_decimal_macros::dec;

    fn sample() -> SalesTable {
        let mut a = purchase("Laptop Pro", dec!(100));
        a.country = Some("USA".to_string());
        a.url_requested = Some("/products/laptop".to_string());
        a.sale_date = Some(at(2024, 1, 10, 9));

        let mut b = purchase("Phone", dec!(50));
        b.country = Some("Canada".to_string());
        b.url_requested = Some("/checkout".to_string());
        b.sale_date = Some(at(2024, 2, 1, 23));

        let mut c = event("Demo Request");
        c.country = Some("USA".to_string());
        c.product_name = Some("Tablet".to_string());
        c.url_requested = Some("/demo/LAPTOP".to_string());
        c.sale_date = Some(at(2024, 3, 5, 12));

        let mut d = purchase("Phone", dec!(20));
        d.status_code = Some(500);
        d.sale_date = None;

        table(vec![a, b, c, d])
    }

    fn criteria() -> FilterCriteria {
        FilterCriteria::new(DateRange::new(date(2024, 1, 1), date(2024, 12, 31)))
    }

    fn names(rows: &[&TransactionRecord]) -> Vec<String> {
        rows.iter()
            .map(|r| r.product_name.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_no_criteria_keeps_dated_rows_in_order() {
        let t = sample();
        let out = apply_filters(&t, &criteria()).unwrap();
        assert_eq!(names(&out.result.working), vec!["Laptop Pro", "Phone", "Tablet"]);
        assert_eq!(names(&out.result.purchases), vec!["Laptop Pro", "Phone"]);
    }

    #[test]
    fn test_country_exact_match() {
        let t = sample();
        let out = apply_filters(&t, &criteria().with_country("USA")).unwrap();
        assert_eq!(names(&out.result.working), vec!["Laptop Pro", "Tablet"]);
    }

    #[test]
    fn test_keyword_matches_product_or_url_case_insensitive() {
        let t = sample();
        let out = apply_filters(&t, &criteria().with_keyword("laptop")).unwrap();
        // "Laptop Pro" by product name, "Tablet" by its URL
        assert_eq!(names(&out.result.working), vec!["Laptop Pro", "Tablet"]);
    }

    #[test]
    fn test_date_range_inclusive_on_both_ends() {
        let t = sample();
        let c = FilterCriteria::new(DateRange::new(date(2024, 1, 10), date(2024, 2, 1)));
        let out = apply_filters(&t, &c).unwrap();
        assert_eq!(names(&out.result.working), vec!["Laptop Pro", "Phone"]);
        for r in &out.result.working {
            assert!(c.date_range.contains(r.sale_date.unwrap().date()));
        }
    }

    #[test]
    fn test_purchases_subset_of_working_and_satisfy_predicate() {
        let t = sample();
        let out = apply_filters(&t, &criteria()).unwrap();
        for p in &out.result.purchases {
            assert!(out.result.working.iter().any(|w| std::ptr::eq(*w, *p)));
            assert!(p.total_price.unwrap() > dec!(0));
            assert_eq!(p.event_type, Some(EventType::Purchase));
            assert_eq!(p.status_code, Some(200));
        }
    }

    #[test]
    fn test_idempotent() {
        let t = sample();
        let c = criteria().with_keyword("o");
        let first = apply_filters(&t, &c).unwrap().result;
        let second = apply_filters(&t, &c).unwrap().result;
        assert_eq!(names(&first.working), names(&second.working));
        assert_eq!(names(&first.purchases), names(&second.purchases));
    }

    #[test]
    fn test_empty_result_warns() {
        let t = sample();
        let out = apply_filters(&t, &criteria().with_country("Mars")).unwrap();
        assert!(out.result.working.is_empty());
        assert!(matches!(
            out.warnings[0],
            DashboardWarning::EmptyResult { .. }
        ));
    }

    #[test]
    fn test_reversed_range_rejected() {
        let t = sample();
        let c = FilterCriteria::new(DateRange::new(date(2024, 5, 1), date(2024, 4, 1)));
        assert!(matches!(
            apply_filters(&t, &c),
            Err(DashboardError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_range_outside_bounds_rejected() {
        let t = sample();
        let c = FilterCriteria::new(DateRange::new(date(2023, 12, 1), date(2024, 4, 1)));
        assert!(apply_filters(&t, &c).is_err());
    }

    #[test]
    fn test_purchase_predicate() {
        assert!(is_successful_purchase(&purchase("A", dec!(1))));
        assert!(!is_successful_purchase(&purchase("A", dec!(0))));
        let mut failed = purchase("A", dec!(10));
        failed.status_code = Some(404);
        assert!(!is_successful_purchase(&failed));
        assert!(!is_successful_purchase(&event("Demo Request")));
    }

    #[test]
    fn test_for_salesperson_restricts_both_subsets() {
        let mut a = purchase("A", dec!(10));
        a.salesperson = Some("Alice".to_string());
        let mut b = purchase("B", dec!(20));
        b.salesperson = Some("Bob".to_string());
        let t = table(vec![a, b]);
        let all = apply_filters(&t, &criteria()).unwrap().result;
        let alice = all.for_salesperson(Some("Alice"));
        assert_eq!(names(&alice.working), vec!["A"]);
        assert_eq!(names(&alice.purchases), vec!["A"]);
        assert_eq!(all.for_salesperson(None).working.len(), 2);
    }
}
