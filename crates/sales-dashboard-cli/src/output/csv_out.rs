use serde_json::Value;
use std::io;

use super::{kpi_lines, split_kpi_line};

/// Write output as CSV to stdout.
///
/// Dashboards become a `kpi,value` table; anything else is written as
/// `field,value` pairs of its result object.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    if let Some(lines) = kpi_lines(value) {
        let _ = wtr.write_record(["kpi", "value"]);
        for line in lines {
            let (title, val) = split_kpi_line(line);
            let _ = wtr.write_record([title, val]);
        }
        let _ = wtr.flush();
        return;
    }

    match value.get("result") {
        Some(Value::Object(result)) => {
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in result {
                let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
            }
        }
        Some(other) => {
            let _ = wtr.write_record([&format_csv_value(other)]);
        }
        None => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(format_csv_value)
            .collect::<Vec<_>>()
            .join("; "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
