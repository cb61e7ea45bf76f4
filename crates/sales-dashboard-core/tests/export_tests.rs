use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;

use sales_dashboard_core::dataset::{load_from_reader, LoadOptions, SalesTable};
use sales_dashboard_core::export::pdf::{layout, DrawOp};
use sales_dashboard_core::export::{chart_captions, export_csv, export_pdf, render_chart_png, render_pdf};
use sales_dashboard_core::filter::{apply_filters, FilterCriteria};
use sales_dashboard_core::metrics::{RoleRequest, SalespersonParams};
use sales_dashboard_core::report::{build_dashboard, DashboardRequest, SectionBody};
use sales_dashboard_core::{DashboardError, Role};

const DATA: &str = "\
sale_date,country,salesperson,total_price,category,product_name,sales_channel,customer_age,customer_gender,event_type,status_code,customer_id,customer_type,occupation,session_id,response_time_ms,url_requested,notes
05/01/2024,USA,Ann,100.50,Electronics,Laptop,Online,25,F,Purchase,200,C1,New,Engineer,S1,100,/products/laptop,\"first, sale\"
06/01/2024,Canada,Bob,50.00,Books,Novel,Retail,40,M,Purchase,200,C2,Returning,Teacher,S2,200,/products/novel,
07/01/2024,USA,Ann,0,Electronics,Phone,Online,33,F,Demo Request,200,C3,New,Artist,S3,150,/demo,
";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn generated_at() -> NaiveDateTime {
    date(2024, 3, 9).and_hms_opt(16, 30, 0).unwrap()
}

fn fixture() -> SalesTable {
    let options = LoadOptions {
        today: Some(date(2024, 12, 31)),
        ..Default::default()
    };
    load_from_reader(DATA.as_bytes(), "fixture", &options)
        .unwrap()
        .result
}

fn salesperson_request(table: &SalesTable, name: &str) -> DashboardRequest {
    DashboardRequest::new(
        FilterCriteria::for_table(table),
        RoleRequest::Salesperson(SalespersonParams {
            salesperson: Some(name.to_string()),
            ..Default::default()
        }),
    )
}

// ===========================================================================
// CSV
// ===========================================================================

#[test]
fn test_csv_export_keeps_columns_and_raw_cells() {
    let table = fixture();
    let criteria = FilterCriteria::for_table(&table).with_country("USA");
    let subsets = apply_filters(&table, &criteria).unwrap().result;
    let dir = tempfile::tempdir().unwrap();

    let file = export_csv(dir.path(), &table, &subsets, date(2024, 3, 9)).unwrap();
    assert_eq!(
        file.path.file_name().and_then(|n| n.to_str()),
        Some("filtered_sales_data_20240309.csv")
    );
    assert_eq!(file.rows, Some(2));

    let written = std::fs::read_to_string(&file.path).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert!(lines[0].ends_with("url_requested,notes"));
    assert_eq!(
        lines[1],
        "05/01/2024,USA,Ann,100.50,Electronics,Laptop,Online,25,F,Purchase,200,C1,New,Engineer,S1,100,/products/laptop,\"first, sale\""
    );
    assert!(lines[2].starts_with("07/01/2024,USA,Ann,0,"));
    assert_eq!(lines.len(), 3);
}

#[test]
fn test_csv_export_into_missing_directory_fails_cleanly() {
    let table = fixture();
    let subsets = apply_filters(&table, &FilterCriteria::for_table(&table))
        .unwrap()
        .result;
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent");

    let err = export_csv(&missing, &table, &subsets, date(2024, 3, 9)).unwrap_err();
    assert!(matches!(err, DashboardError::Export(_)));
    assert!(!missing.exists());
}

// ===========================================================================
// PDF
// ===========================================================================

#[test]
fn test_pdf_kpis_match_live_view() {
    let table = fixture();
    let view = build_dashboard(&table, &salesperson_request(&table, "Ann"))
        .unwrap()
        .result;
    let report = &view.report;

    let sizes: Vec<Option<(u32, u32)>> = report
        .visual_sections()
        .map(|s| match s.body {
            SectionBody::Chart(_) => Some((1000, 640)),
            _ => None,
        })
        .collect();
    let texts: Vec<String> = layout(report, generated_at(), &sizes)
        .into_iter()
        .filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text),
            DrawOp::Image { .. } => None,
        })
        .collect();

    let live = report.kpi_lines();
    assert_eq!(live.len(), 4);
    for line in &live {
        assert!(texts.contains(line), "PDF is missing KPI line {:?}", line);
    }
    assert_eq!(texts[0], "Salesperson Dashboard Report");
    assert_eq!(texts[1], "Generated on: 2024-03-09 16:30:00");
    assert_eq!(texts[2], "Date Range: 2024-01-05 to 2024-01-07");
}

#[test]
fn test_pdf_prints_chart_captions() {
    let table = fixture();
    let view = build_dashboard(&table, &salesperson_request(&table, "Ann"))
        .unwrap()
        .result;
    let report = &view.report;
    let sizes: Vec<Option<(u32, u32)>> = report
        .visual_sections()
        .map(|s| match s.body {
            SectionBody::Chart(_) => Some((1000, 300)),
            _ => None,
        })
        .collect();
    let texts: Vec<String> = layout(report, generated_at(), &sizes)
        .into_iter()
        .filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text),
            DrawOp::Image { .. } => None,
        })
        .collect();

    for section in report.visual_sections() {
        if let SectionBody::Chart(spec) = &section.body {
            for caption in chart_captions(spec) {
                assert!(texts.contains(&caption.text), "{}: missing {:?}", section.title, caption.text);
            }
        }
    }
    assert!(texts.contains(&"1. Laptop: $100.50".to_string()));
    assert!(texts.contains(&"Revenue by Product".to_string()));
}

#[test]
fn test_long_reports_spill_onto_more_pages() {
    let table = fixture();
    let view = build_dashboard(&table, &salesperson_request(&table, "Ann"))
        .unwrap()
        .result;
    let sizes: Vec<Option<(u32, u32)>> = view
        .report
        .visual_sections()
        .map(|_| Some((1000, 640)))
        .collect();
    let ops = layout(&view.report, generated_at(), &sizes);
    assert!(ops.iter().map(DrawOp::page).max().unwrap() >= 1);
}

#[test]
fn test_pdf_export_writes_document() {
    let table = fixture();
    let view = build_dashboard(&table, &salesperson_request(&table, "Ann"))
        .unwrap()
        .result;
    let dir = tempfile::tempdir().unwrap();

    let file = export_pdf(dir.path(), &view.report, generated_at()).unwrap();
    assert_eq!(
        file.path.file_name().and_then(|n| n.to_str()),
        Some("salesperson_report_20240309.pdf")
    );
    let bytes = std::fs::read(&file.path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(bytes.len(), file.bytes);
    assert_eq!(file.rows, None);
}

#[test]
fn test_empty_report_still_renders() {
    let table = fixture();
    let request = salesperson_request(&table, "Nobody");
    let view = build_dashboard(&table, &request).unwrap().result;
    assert_eq!(view.report.role, Role::Salesperson);

    let bytes = render_pdf(&view.report, generated_at()).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_chart_temp_file_removed_on_drop() {
    let table = fixture();
    let view = build_dashboard(&table, &salesperson_request(&table, "Ann"))
        .unwrap()
        .result;
    let spec = view
        .report
        .visual_sections()
        .find_map(|s| match &s.body {
            SectionBody::Chart(spec) => Some(spec.clone()),
            _ => None,
        })
        .unwrap();

    let image = render_chart_png(&spec).unwrap();
    let path = image.path().to_path_buf();
    assert!(path.exists());
    assert!(image.width > 0 && image.height > 0);
    drop(image);
    assert!(!path.exists());
}
