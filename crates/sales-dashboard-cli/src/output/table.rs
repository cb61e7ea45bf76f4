use serde_json::Value;
use tabled::{builder::Builder, Table};

use sales_dashboard_core::export::chart_captions;
use sales_dashboard_core::report::ChartSpec;
use sales_dashboard_core::DashboardWarning;

use super::{kpi_lines, split_kpi_line};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    if let Some(lines) = kpi_lines(value) {
        print_dashboard(value, &lines);
    } else if let Some(Value::Object(result)) = value.get("result") {
        print_fields(result);
    } else {
        println!("{}", value);
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                println!("  - {}", describe_warning(w));
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_dashboard(value: &Value, lines: &[&str]) {
    let report = &value["result"]["report"];
    if let Some(title) = report["title"].as_str() {
        println!("{}", title);
    }
    if let (Some(start), Some(end)) = (
        report["date_range"]["start"].as_str(),
        report["date_range"]["end"].as_str(),
    ) {
        println!("Date Range: {} to {}\n", start, end);
    }

    let mut kpis = Builder::default();
    kpis.push_record(["KPI", "Value"]);
    for line in lines {
        let (title, val) = split_kpi_line(line);
        kpis.push_record([title, val]);
    }
    println!("{}", Table::from(kpis));

    let Some(sections) = report["sections"].as_array() else {
        return;
    };
    let mut visuals = Builder::default();
    visuals.push_record(["Section", "Content"]);
    for section in sections {
        let body = &section["body"];
        let content = match body["type"].as_str() {
            Some("chart") => describe_chart(body),
            Some("placeholder") => body["message"].as_str().unwrap_or_default().to_string(),
            _ => continue,
        };
        visuals.push_record([
            section["title"].as_str().unwrap_or_default().to_string(),
            content,
        ]);
    }
    println!("\n{}", Table::from(visuals));
}

/// Chart kind and size, then the same captions the PDF prints.
fn describe_chart(body: &Value) -> String {
    let chart_type = body["chart_type"].as_str().unwrap_or("chart");
    let points = match &body["data"]["values"] {
        Value::Array(values) => values.len(),
        Value::Object(_) => 1,
        _ => 0,
    };
    let mut lines = vec![format!("{} chart, {} points", chart_type, points)];
    if let Ok(spec) = serde_json::from_value::<ChartSpec>(body.clone()) {
        lines.extend(chart_captions(&spec).into_iter().map(|c| c.text));
    }
    lines.join("\n")
}

fn print_fields(map: &serde_json::Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn describe_warning(w: &Value) -> String {
    match serde_json::from_value::<DashboardWarning>(w.clone()) {
        Ok(warning) => warning.to_string(),
        Err(_) => format_value(w),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use sales_dashboard_core::metrics::Point;
    use sales_dashboard_core::report::SectionBody;

    #[test]
    fn test_chart_cell_lists_captions() {
        let spec = ChartSpec::bar(vec![Point::new("Laptop", Decimal::from(100))]).axes("Product", "Revenue");
        let body = serde_json::to_value(SectionBody::Chart(spec)).unwrap();
        assert_eq!(
            describe_chart(&body),
            "bar chart, 1 points\nRevenue by Product\n1. Laptop: $100.00"
        );
    }
}
