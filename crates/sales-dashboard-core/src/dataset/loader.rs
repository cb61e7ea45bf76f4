use chrono::{Local, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use super::dates::parse_day_first;
use super::record::{EventType, SalesTable, TransactionRecord, REQUIRED_COLUMNS, TIMESTAMP_COLUMN};
use crate::error::{DashboardError, DashboardWarning};
use crate::types::{with_metadata, ComputationOutput, DateRange, MAX_AMOUNT};
use crate::DashboardResult;

/// A loaded table together with its load-time warnings.
pub type LoadedDataset = ComputationOutput<SalesTable>;

/// Cells read as null, matching common spreadsheet/dataframe conventions.
const NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan",
    "null", "-NaN", "-nan",
];

const MAX_CUSTOMER_AGE: Decimal = dec!(120);

/// Reader settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Field delimiter byte
    pub delimiter: u8,
    /// Reference "today" used to cap the latest selectable date; defaults to the local date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today: Option<NaiveDate>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            delimiter: b',',
            today: None,
        }
    }
}

/// Load and validate a delimited transaction file.
pub fn load_dataset(path: &Path, options: &LoadOptions) -> DashboardResult<LoadedDataset> {
    if !path.is_file() {
        return Err(DashboardError::DatasetNotFound(path.display().to_string()));
    }
    let file = File::open(path)?;
    load_from_reader(file, &path.display().to_string(), options)
}

/// Load and validate a transaction table from any reader.
///
/// Fatal conditions (missing columns, negative prices, impossible ages) return
/// an error; duplicate session ids and an unusable `sale_date` column are
/// reported as warnings and the load continues.
pub fn load_from_reader<R: Read>(
    reader: R,
    source: &str,
    options: &LoadOptions,
) -> DashboardResult<LoadedDataset> {
    let start = Instant::now();
    let mut warnings: Vec<DashboardWarning> = Vec::new();

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .from_reader(reader);

    let columns: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let index = ColumnIndex::resolve(&columns)?;

    let mut records: Vec<TransactionRecord> = Vec::new();
    let mut negative_prices = RangeViolations::default();
    let mut huge_prices = RangeViolations::default();
    let mut bad_ages = RangeViolations::default();

    for (i, row) in rdr.records().enumerate() {
        let row = row?;
        // Header is line 1
        let line = i + 2;
        let record = index.parse_row(&row, line)?;

        if let Some(price) = record.total_price {
            if price < Decimal::ZERO {
                negative_prices.record(line);
            } else if price > MAX_AMOUNT {
                huge_prices.record(line);
            }
        }
        if let Some(age) = record.customer_age {
            if age < Decimal::ZERO || age > MAX_CUSTOMER_AGE {
                bad_ages.record(line);
            }
        }

        records.push(record);
    }

    if let Some(first) = negative_prices.first_line {
        return Err(DashboardError::Validation {
            field: "total_price".to_string(),
            reason: format!(
                "Negative values found in 'total_price' ({} rows, first at line {})",
                negative_prices.count, first
            ),
        });
    }
    if let Some(first) = huge_prices.first_line {
        return Err(DashboardError::Validation {
            field: "total_price".to_string(),
            reason: format!(
                "Values above {} found in 'total_price' ({} rows, first at line {})",
                MAX_AMOUNT, huge_prices.count, first
            ),
        });
    }
    if let Some(first) = bad_ages.first_line {
        return Err(DashboardError::Validation {
            field: "customer_age".to_string(),
            reason: format!(
                "Invalid 'customer_age' values outside [0, 120] ({} rows, first at line {})",
                bad_ages.count, first
            ),
        });
    }

    let duplicates = count_duplicate_sessions(&records);
    if duplicates > 0 {
        tracing::warn!(duplicates, "duplicate session ids in {}", source);
        warnings.push(DashboardWarning::Integrity {
            column: "session_id".to_string(),
            duplicates,
        });
    }

    let today = options.today.unwrap_or_else(|| Local::now().date_naive());
    let date_bounds = match observed_date_bounds(&records, today) {
        Some(bounds) => bounds,
        None => {
            let fallback = default_date_bounds();
            tracing::warn!("no valid sale_date values in {}; using {}", source, fallback);
            warnings.push(DashboardWarning::DefaultDateRange {
                start: fallback.start,
                end: fallback.end,
            });
            fallback
        }
    };

    tracing::debug!(rows = records.len(), columns = columns.len(), "loaded {}", source);

    let table = SalesTable {
        source: source.to_string(),
        columns,
        records,
        date_bounds,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Delimited table load with schema, range and integrity validation",
        &serde_json::json!({
            "source": source,
            "delimiter": (options.delimiter as char).to_string(),
            "rows": table.len(),
            "date_convention": "day-first",
        }),
        warnings,
        elapsed,
        table,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RangeViolations {
    count: usize,
    first_line: Option<usize>,
}

impl RangeViolations {
    fn record(&mut self, line: usize) {
        self.count += 1;
        self.first_line.get_or_insert(line);
    }
}

/// Positions of the columns the dashboard reads.
struct ColumnIndex {
    sale_date: usize,
    timestamp: Option<usize>,
    country: usize,
    salesperson: usize,
    total_price: usize,
    category: usize,
    product_name: usize,
    sales_channel: usize,
    customer_age: usize,
    customer_gender: usize,
    event_type: usize,
    status_code: usize,
    customer_id: usize,
    customer_type: usize,
    occupation: usize,
    session_id: usize,
    response_time_ms: usize,
    url_requested: usize,
}

impl ColumnIndex {
    fn resolve(columns: &[String]) -> DashboardResult<Self> {
        let position = |name: &str| columns.iter().position(|c| c == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| position(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DashboardError::Schema { missing });
        }

        // All required positions exist past this point
        let at = |name: &str| position(name).unwrap_or_default();

        Ok(ColumnIndex {
            sale_date: at("sale_date"),
            timestamp: position(TIMESTAMP_COLUMN),
            country: at("country"),
            salesperson: at("salesperson"),
            total_price: at("total_price"),
            category: at("category"),
            product_name: at("product_name"),
            sales_channel: at("sales_channel"),
            customer_age: at("customer_age"),
            customer_gender: at("customer_gender"),
            event_type: at("event_type"),
            status_code: at("status_code"),
            customer_id: at("customer_id"),
            customer_type: at("customer_type"),
            occupation: at("occupation"),
            session_id: at("session_id"),
            response_time_ms: at("response_time_ms"),
            url_requested: at("url_requested"),
        })
    }

    fn parse_row(&self, row: &csv::StringRecord, line: usize) -> DashboardResult<TransactionRecord> {
        let cell = |i: usize| row.get(i).unwrap_or("");
        let text = |i: usize| non_null(cell(i)).map(str::to_string);

        Ok(TransactionRecord {
            sale_date: non_null(cell(self.sale_date)).and_then(parse_day_first),
            timestamp: self
                .timestamp
                .and_then(|i| non_null(cell(i)))
                .and_then(parse_day_first),
            country: text(self.country),
            salesperson: text(self.salesperson),
            product_name: text(self.product_name),
            category: text(self.category),
            sales_channel: text(self.sales_channel),
            total_price: strict_number(cell(self.total_price), "total_price", line)?,
            customer_id: text(self.customer_id),
            customer_type: text(self.customer_type),
            customer_age: strict_number(cell(self.customer_age), "customer_age", line)?,
            customer_gender: text(self.customer_gender),
            occupation: text(self.occupation),
            event_type: non_null(cell(self.event_type)).map(EventType::parse),
            status_code: lenient_number(cell(self.status_code))
                .filter(|d| d.fract().is_zero())
                .and_then(|d| d.to_u16()),
            session_id: text(self.session_id),
            response_time_ms: lenient_number(cell(self.response_time_ms))
                .filter(|ms| ms.abs() <= MAX_AMOUNT),
            url_requested: text(self.url_requested),
            raw: row.iter().map(str::to_string).collect(),
        })
    }
}

fn non_null(cell: &str) -> Option<&str> {
    let trimmed = cell.trim();
    if NULL_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_number(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Numeric cell that must be a number when present.
fn strict_number(cell: &str, field: &str, line: usize) -> DashboardResult<Option<Decimal>> {
    match non_null(cell) {
        None => Ok(None),
        Some(s) => parse_number(s).map(Some).ok_or_else(|| DashboardError::Validation {
            field: field.to_string(),
            reason: format!("non-numeric value '{}' at line {}", s, line),
        }),
    }
}

/// Numeric cell where anything unparsable is treated as null.
fn lenient_number(cell: &str) -> Option<Decimal> {
    non_null(cell).and_then(parse_number)
}

/// Rows whose session id repeats an earlier row's (nulls repeat each other).
fn count_duplicate_sessions(records: &[TransactionRecord]) -> usize {
    let mut seen: HashSet<Option<&str>> = HashSet::new();
    records
        .iter()
        .filter(|r| !seen.insert(r.session_id.as_deref()))
        .count()
}

/// Earliest sale date through the latest one, with the upper bound capped at today.
fn observed_date_bounds(records: &[TransactionRecord], today: NaiveDate) -> Option<DateRange> {
    let mut dates = records.iter().filter_map(|r| r.sale_date.map(|d| d.date()));
    let first = dates.next()?;
    let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    // Never let the cap push the end before the start
    let end = max.min(today).max(min);
    Some(DateRange::new(min, end))
}

/// One full listed calendar year, used when no sale date could be parsed.
pub fn default_date_bounds() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
