use super::chart::ChartSpec;
use super::format::{format_grouped, format_hour, format_money, format_rate, NOT_AVAILABLE};
use super::{Report, ReportSection};
use crate::metrics::{ManagerMetrics, MarketerMetrics, MetricBundle, Point, SalespersonMetrics};
use crate::types::DateRange;

/// Lay out a bundle's KPIs and charts in display order.
///
/// No figures are computed here; sections only wrap and format what the
/// bundle already holds.
pub fn compose_report(bundle: &MetricBundle, date_range: DateRange) -> Report {
    let sections = match bundle {
        MetricBundle::Manager(m) => manager_sections(m),
        MetricBundle::Salesperson(m) => salesperson_sections(m),
        MetricBundle::Marketer(m) => marketer_sections(m),
    };
    let role = bundle.role();
    Report {
        role,
        title: format!("{} Dashboard Report", role.display_name()),
        date_range,
        sections,
    }
}

fn named_kpi(title: &str, point: Option<&Point>) -> ReportSection {
    match point {
        Some(p) => ReportSection::kpi_with_detail(title, p.label.clone(), format_money(p.value)),
        None => ReportSection::kpi(title, NOT_AVAILABLE),
    }
}

fn manager_sections(m: &ManagerMetrics) -> Vec<ReportSection> {
    vec![
        ReportSection::kpi("Total Revenue", format_money(m.total_revenue)),
        named_kpi("Top Product", m.top_product()),
        named_kpi("Top Salesperson", m.top_salesperson()),
        ReportSection::kpi("Demo Requests", m.demo_requests.to_string()),
        ReportSection::chart_or(
            "Total Revenue by Product",
            ChartSpec::bar(m.revenue_by_product.clone())
                .axes("Product", "Revenue")
                .with_target(m.target),
            "No product data.",
        ),
        ReportSection::chart_or(
            "Sales by Channel",
            ChartSpec::bar(m.revenue_by_channel.clone()).axes("Channel", "Revenue"),
            "No channel data.",
        ),
        ReportSection::chart_or(
            "Sales Distribution by Salesperson",
            ChartSpec::pie(m.salesperson_share.clone()).axes("Salesperson", "Revenue"),
            "No salesperson data.",
        ),
        ReportSection::chart_or(
            "Sales Trend Over Time by Product",
            ChartSpec::multi_line(m.revenue_trend.clone())
                .axes(m.granularity.axis_title(), "Revenue")
                .with_target(m.target),
            "No trend data.",
        ),
    ]
}

fn salesperson_sections(m: &SalespersonMetrics) -> Vec<ReportSection> {
    vec![
        ReportSection::kpi("Number of Sales", m.number_of_sales.to_string()),
        ReportSection::kpi("Revenue Achieved", format_money(m.revenue_achieved)),
        named_kpi("Top Product Sold", m.top_product.as_ref()),
        ReportSection::kpi("Conversion Rate", format_rate(m.conversion_rate)),
        ReportSection::chart_or(
            "Sales Progress",
            ChartSpec::gauge(m.gauge.clone()).axes("", "Revenue ($)"),
            "",
        ),
        ReportSection::chart_or(
            "Individual Sales Performance",
            ChartSpec::line(m.performance.clone())
                .axes(m.granularity.axis_title(), "Revenue")
                .with_target(m.target),
            "No sales data for the selected period.",
        ),
        ReportSection::chart_or(
            "Performance Breakdown by Product and Region",
            ChartSpec::grouped_bar(m.breakdown.clone())
                .axes("Product", "Revenue")
                .legend_title("Region"),
            "No sales data for performance breakdown.",
        ),
        ReportSection::chart_or(
            "Sales by Product",
            ChartSpec::bar(m.revenue_by_product.clone())
                .axes("Product", "Revenue")
                .with_target(m.target),
            "No product sales data.",
        ),
        ReportSection::chart_or(
            "Top 3 Customers",
            ChartSpec::bar(m.top_customers.clone()).axes("Customer", "Revenue"),
            "No customer sales data.",
        ),
    ]
}

fn marketer_sections(m: &MarketerMetrics) -> Vec<ReportSection> {
    vec![
        ReportSection::kpi("Total Visits", m.total_visits.to_string()),
        ReportSection::kpi(
            "Avg. Session Length (ms)",
            format_grouped(m.avg_session_length_ms),
        ),
        ReportSection::kpi("Most Active Hour", format_hour(m.most_active_hour)),
        ReportSection::kpi("Total Log Requests", m.total_log_requests.to_string()),
        ReportSection::chart_or(
            "Geographic Sales Distribution",
            ChartSpec::geo(m.geo_revenue.clone()).axes("Country", "Revenue"),
            "No geographic data.",
        ),
        ReportSection::chart_or(
            "Product Sales by Age",
            ChartSpec::grouped_bar(m.sales_by_age.clone()).axes("Age Group", "Revenue"),
            "No age data.",
        ),
        ReportSection::chart_or(
            "Product Sales by Occupation",
            ChartSpec::grouped_bar(m.sales_by_occupation.clone()).axes("Occupation", "Revenue"),
            "No occupation data.",
        ),
        ReportSection::chart_or(
            "Top 5 High-Value Clients",
            ChartSpec::bar(m.top_customers.clone()).axes("Customer", "Revenue"),
            "No client data.",
        ),
        ReportSection::chart_or(
            "Most Visited URLs",
            ChartSpec::pie(m.url_share.clone()).axes("URL", "Visits"),
            "No URL data.",
        ),
        ReportSection::chart_or(
            "URL Trend Over Time",
            ChartSpec::multi_line(m.url_trend.clone())
                .axes(m.granularity.axis_title(), "Visits")
                .with_target(m.url_target),
            "No URL trend data.",
        ),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Subsets;
    use crate::metrics::{compute_metrics, RoleRequest};
    use crate::report::SectionBody;
    use crate::test_support::{date, purchase};
    use crate::types::Role;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn report_for(role: Role, rows: &[crate::dataset::TransactionRecord]) -> Report {
        let subsets = Subsets::from_working(rows.iter().collect());
        let bundle = compute_metrics(&RoleRequest::default_for(role), &subsets)
            .unwrap()
            .result;
        compose_report(&bundle, DateRange::new(date(2024, 1, 1), date(2024, 12, 31)))
    }

    #[test]
    fn test_manager_kpi_lines() {
        let rows = vec![
            purchase("ProductA", dec!(100)),
            purchase("ProductA", dec!(50)),
            purchase("ProductB", dec!(30)),
        ];
        let report = report_for(Role::Manager, &rows);
        assert_eq!(report.title, "Sales Manager Dashboard Report");
        assert_eq!(
            report.kpi_lines(),
            vec![
                "Total Revenue: $180.00".to_string(),
                "Top Product: ProductA ($150.00)".to_string(),
                "Top Salesperson: N/A".to_string(),
                "Demo Requests: 0".to_string(),
            ]
        );
    }

    #[test]
    fn test_section_order_per_role() {
        let rows = vec![purchase("A", dec!(1))];
        let titles = |r: &Report| r.sections.iter().map(|s| s.title.clone()).collect::<Vec<_>>();

        let sp = report_for(Role::Salesperson, &rows);
        assert_eq!(
            titles(&sp),
            vec![
                "Number of Sales",
                "Revenue Achieved",
                "Top Product Sold",
                "Conversion Rate",
                "Sales Progress",
                "Individual Sales Performance",
                "Performance Breakdown by Product and Region",
                "Sales by Product",
                "Top 3 Customers",
            ]
        );

        let mk = report_for(Role::Marketer, &rows);
        assert_eq!(mk.kpi_lines().len(), 4);
        assert_eq!(mk.visual_sections().count(), 6);
    }

    #[test]
    fn test_empty_charts_become_placeholders() {
        let report = report_for(Role::Manager, &[]);
        match &report.section("Sales by Channel").unwrap().body {
            SectionBody::Placeholder { message } => assert_eq!(message, "No channel data."),
            other => panic!("expected placeholder, got {:?}", other),
        }
        assert_eq!(report.kpi_lines()[0], "Total Revenue: $0.00");
    }

    #[test]
    fn test_gauge_always_drawn() {
        let report = report_for(Role::Salesperson, &[]);
        assert!(matches!(
            report.section("Sales Progress").unwrap().body,
            SectionBody::Chart(_)
        ));
    }

    #[test]
    fn test_marketer_formats() {
        let report = report_for(Role::Marketer, &[purchase("A", dec!(1))]);
        let lines = report.kpi_lines();
        assert_eq!(lines[1], "Avg. Session Length (ms): 0.00");
        assert_eq!(lines[2], "Most Active Hour: 10:00");
    }
}
