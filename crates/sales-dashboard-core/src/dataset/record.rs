use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{DateRange, Money};

/// Columns every input file must carry, in the order they are reported when missing.
pub const REQUIRED_COLUMNS: [&str; 17] = [
    "sale_date",
    "country",
    "salesperson",
    "total_price",
    "category",
    "product_name",
    "sales_channel",
    "customer_age",
    "customer_gender",
    "event_type",
    "status_code",
    "customer_id",
    "customer_type",
    "occupation",
    "session_id",
    "response_time_ms",
    "url_requested",
];

/// Second datetime column. Parsed when present, null otherwise.
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Web/sales event classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Purchase,
    DemoRequest,
    Other(String),
}

impl EventType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Purchase" => EventType::Purchase,
            "Demo Request" => EventType::DemoRequest,
            other => EventType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventType::Purchase => "Purchase",
            EventType::DemoRequest => "Demo Request",
            EventType::Other(s) => s,
        }
    }
}

/// One row of the source table.
///
/// Every field is optional because the source may hold empty or unparsable
/// cells; only `total_price` and `customer_age` are range-checked at load.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransactionRecord {
    pub sale_date: Option<NaiveDateTime>,
    pub timestamp: Option<NaiveDateTime>,
    pub country: Option<String>,
    pub salesperson: Option<String>,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub sales_channel: Option<String>,
    pub total_price: Option<Money>,
    pub customer_id: Option<String>,
    pub customer_type: Option<String>,
    pub customer_age: Option<Decimal>,
    pub customer_gender: Option<String>,
    pub occupation: Option<String>,
    pub event_type: Option<EventType>,
    pub status_code: Option<u16>,
    pub session_id: Option<String>,
    pub response_time_ms: Option<Decimal>,
    pub url_requested: Option<String>,
    /// Cells exactly as read, aligned with `SalesTable::columns`.
    #[serde(skip)]
    pub raw: Vec<String>,
}

/// The validated, immutable table shared by every downstream stage.
#[derive(Debug, Clone, Serialize)]
pub struct SalesTable {
    /// Where the rows came from (file path or caller-supplied label)
    pub source: String,
    /// Header row in file order, including columns the dashboard does not use
    pub columns: Vec<String>,
    #[serde(skip)]
    pub records: Vec<TransactionRecord>,
    /// Selectable date range: earliest sale through the latest sale (capped at today)
    pub date_bounds: DateRange,
}

impl SalesTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
