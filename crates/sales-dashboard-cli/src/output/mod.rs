pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}

/// "Title: value (detail)" split at the first ": ".
pub(crate) fn split_kpi_line(line: &str) -> (&str, &str) {
    line.split_once(": ").unwrap_or((line, ""))
}

pub(crate) fn kpi_lines(value: &Value) -> Option<Vec<&str>> {
    value
        .get("result")?
        .get("kpi_lines")?
        .as_array()
        .map(|lines| lines.iter().filter_map(Value::as_str).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_kpi_line_keeps_detail() {
        assert_eq!(
            split_kpi_line("Top Product: Laptop (Revenue: $10.00)"),
            ("Top Product", "Laptop (Revenue: $10.00)")
        );
        assert_eq!(split_kpi_line("no separator"), ("no separator", ""));
    }

    #[test]
    fn test_kpi_lines_only_for_dashboard_values() {
        let v = json!({"result": {"kpi_lines": ["Total Revenue: $1.00"]}});
        assert_eq!(kpi_lines(&v), Some(vec!["Total Revenue: $1.00"]));
        assert_eq!(kpi_lines(&json!({"result": {"path": "x.csv"}})), None);
    }
}
