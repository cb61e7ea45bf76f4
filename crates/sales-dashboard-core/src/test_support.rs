//! Record and table builders shared by the unit tests.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::dataset::{EventType, SalesTable, TransactionRecord};
use crate::types::DateRange;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
}

/// A successful purchase of `product` on 2024-01-15.
pub fn purchase(product: &str, amount: Decimal) -> TransactionRecord {
    TransactionRecord {
        sale_date: Some(at(2024, 1, 15, 10)),
        timestamp: Some(at(2024, 1, 15, 10)),
        product_name: Some(product.to_string()),
        total_price: Some(amount),
        event_type: Some(EventType::Purchase),
        status_code: Some(200),
        ..Default::default()
    }
}

/// A zero-value event of the given type on 2024-01-15.
pub fn event(kind: &str) -> TransactionRecord {
    TransactionRecord {
        sale_date: Some(at(2024, 1, 15, 10)),
        timestamp: Some(at(2024, 1, 15, 10)),
        total_price: Some(Decimal::ZERO),
        event_type: Some(EventType::parse(kind)),
        status_code: Some(200),
        ..Default::default()
    }
}

pub fn table(records: Vec<TransactionRecord>) -> SalesTable {
    SalesTable {
        source: "test".to_string(),
        columns: vec![],
        records,
        date_bounds: DateRange::new(date(2024, 1, 1), date(2024, 12, 31)),
    }
}
