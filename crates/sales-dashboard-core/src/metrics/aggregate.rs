use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dataset::TransactionRecord;
use crate::error::DashboardWarning;
use crate::types::{Money, Rate};

// ---------------------------------------------------------------------------
// Aggregate shapes
// ---------------------------------------------------------------------------

/// One labelled value, e.g. revenue for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub label: String,
    pub value: Decimal,
}

impl Point {
    pub fn new(label: impl Into<String>, value: Decimal) -> Self {
        Point {
            label: label.into(),
            value,
        }
    }
}

/// One value in a two-dimensional grouping: `x` on the axis, `series` as colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub x: String,
    pub series: String,
    pub value: Decimal,
}

/// A slice of a whole, with its fraction of the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Share {
    pub label: String,
    pub value: Money,
    /// value / total (0 when the total is zero)
    pub share: Rate,
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

fn price(record: &TransactionRecord) -> Money {
    record.total_price.unwrap_or(Decimal::ZERO)
}

/// Sum of `total_price` over the rows.
pub fn total_revenue(rows: &[&TransactionRecord]) -> Money {
    rows.iter().copied().map(price).sum()
}

/// Revenue grouped by a key, ordered by key. Rows with no key are left out.
pub fn sum_by<K>(rows: &[&TransactionRecord], key: K) -> Vec<Point>
where
    K: Fn(&TransactionRecord) -> Option<String>,
{
    let mut groups: BTreeMap<String, Money> = BTreeMap::new();
    for &r in rows {
        if let Some(k) = key(r) {
            *groups.entry(k).or_insert(Decimal::ZERO) += price(r);
        }
    }
    groups
        .into_iter()
        .map(|(label, value)| Point { label, value })
        .collect()
}

/// Row count grouped by a key, ordered by key. Rows with no key are left out.
pub fn count_by<K>(rows: &[&TransactionRecord], key: K) -> Vec<Point>
where
    K: Fn(&TransactionRecord) -> Option<String>,
{
    let mut groups: BTreeMap<String, u64> = BTreeMap::new();
    for &r in rows {
        if let Some(k) = key(r) {
            *groups.entry(k).or_insert(0) += 1;
        }
    }
    groups
        .into_iter()
        .map(|(label, n)| Point::new(label, Decimal::from(n)))
        .collect()
}

/// Revenue grouped by two keys, ordered by `(x, series)`.
pub fn sum_by_pair<X, S>(rows: &[&TransactionRecord], x: X, series: S) -> Vec<SeriesPoint>
where
    X: Fn(&TransactionRecord) -> Option<String>,
    S: Fn(&TransactionRecord) -> Option<String>,
{
    let mut groups: BTreeMap<(String, String), Money> = BTreeMap::new();
    for &r in rows {
        if let (Some(xk), Some(sk)) = (x(r), series(r)) {
            *groups.entry((xk, sk)).or_insert(Decimal::ZERO) += price(r);
        }
    }
    groups
        .into_iter()
        .map(|((x, series), value)| SeriesPoint { x, series, value })
        .collect()
}

/// Row count grouped by two keys, ordered by `(x, series)`.
pub fn count_by_pair<X, S>(rows: &[&TransactionRecord], x: X, series: S) -> Vec<SeriesPoint>
where
    X: Fn(&TransactionRecord) -> Option<String>,
    S: Fn(&TransactionRecord) -> Option<String>,
{
    let mut groups: BTreeMap<(String, String), u64> = BTreeMap::new();
    for &r in rows {
        if let (Some(xk), Some(sk)) = (x(r), series(r)) {
            *groups.entry((xk, sk)).or_insert(0) += 1;
        }
    }
    groups
        .into_iter()
        .map(|((x, series), n)| SeriesPoint {
            x,
            series,
            value: Decimal::from(n),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Sort by value descending. The sort is stable, so equal values keep their
/// incoming (label-ascending) order.
pub fn rank_desc(points: &[Point]) -> Vec<Point> {
    let mut ranked = points.to_vec();
    ranked.sort_by(|a, b| b.value.cmp(&a.value));
    ranked
}

/// The `n` largest values, ties broken by label ascending.
pub fn top_n(points: &[Point], n: usize) -> Vec<Point> {
    let mut ranked = rank_desc(points);
    ranked.truncate(n);
    ranked
}

/// Each point's fraction of the sum of all points.
pub fn shares(points: &[Point]) -> Vec<Share> {
    let total: Decimal = points.iter().map(|p| p.value).sum();
    points
        .iter()
        .map(|p| Share {
            label: p.label.clone(),
            value: p.value,
            share: if total.is_zero() {
                Decimal::ZERO
            } else {
                p.value / total
            },
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// `"<id> (<type>)"`, or `None` when either part is missing.
pub fn customer_label(record: &TransactionRecord) -> Option<String> {
    match (&record.customer_id, &record.customer_type) {
        (Some(id), Some(kind)) => Some(format!("{} ({})", id, kind)),
        _ => None,
    }
}

/// Record an empty-aggregate warning when `items` is empty.
pub fn note_empty<T>(warnings: &mut Vec<DashboardWarning>, items: &[T], context: &str) {
    if items.is_empty() {
        warnings.push(DashboardWarning::empty(context));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::purchase;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn product(r: &TransactionRecord) -> Option<String> {
        r.product_name.clone()
    }

    #[test]
    fn test_sum_by_orders_by_key() {
        let rows = vec![
            purchase("Zeta", dec!(5)),
            purchase("Alpha", dec!(10)),
            purchase("Zeta", dec!(7)),
        ];
        let refs: Vec<&TransactionRecord> = rows.iter().collect();
        assert_eq!(
            sum_by(&refs, product),
            vec![Point::new("Alpha", dec!(10)), Point::new("Zeta", dec!(12))]
        );
    }

    #[test]
    fn test_null_keys_excluded() {
        let mut nameless = purchase("x", dec!(99));
        nameless.product_name = None;
        let rows = vec![nameless, purchase("A", dec!(1))];
        let refs: Vec<&TransactionRecord> = rows.iter().collect();
        assert_eq!(sum_by(&refs, product), vec![Point::new("A", dec!(1))]);
        assert_eq!(total_revenue(&refs), dec!(100));
    }

    #[test]
    fn test_top_n_ties_by_label() {
        let points = vec![
            Point::new("A", dec!(10)),
            Point::new("B", dec!(30)),
            Point::new("C", dec!(10)),
            Point::new("D", dec!(5)),
        ];
        assert_eq!(
            top_n(&points, 3),
            vec![
                Point::new("B", dec!(30)),
                Point::new("A", dec!(10)),
                Point::new("C", dec!(10)),
            ]
        );
    }

    #[test]
    fn test_shares_handle_zero_total() {
        let s = shares(&[Point::new("A", dec!(0))]);
        assert_eq!(s[0].share, dec!(0));
        let s = shares(&[Point::new("A", dec!(30)), Point::new("B", dec!(10))]);
        assert_eq!(s[0].share, dec!(0.75));
        assert_eq!(s[1].share, dec!(0.25));
    }

    #[test]
    fn test_count_by_pair() {
        let rows = vec![
            purchase("A", dec!(1)),
            purchase("A", dec!(1)),
            purchase("B", dec!(1)),
        ];
        let refs: Vec<&TransactionRecord> = rows.iter().collect();
        let counts = count_by_pair(&refs, |_| Some("2024-01".to_string()), product);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].value, dec!(2));
        assert_eq!(counts[1].series, "B");
    }

    #[test]
    fn test_customer_label() {
        let mut r = purchase("A", dec!(1));
        r.customer_id = Some("C001".to_string());
        assert_eq!(customer_label(&r), None);
        r.customer_type = Some("Retail".to_string());
        assert_eq!(customer_label(&r), Some("C001 (Retail)".to_string()));
    }
}
