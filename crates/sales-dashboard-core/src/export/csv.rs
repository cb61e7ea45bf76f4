use chrono::NaiveDate;
use std::io::Write;
use std::path::Path;

use super::{write_atomically, ExportedFile};
use crate::dataset::{SalesTable, TransactionRecord};
use crate::filter::Subsets;
use crate::DashboardResult;

pub fn csv_file_name(date: NaiveDate) -> String {
    format!("filtered_sales_data_{}.csv", date.format("%Y%m%d"))
}

/// Write the header and each row's original cells. Returns the row count.
pub fn write_csv<W: Write>(
    columns: &[String],
    rows: &[&TransactionRecord],
    writer: W,
) -> DashboardResult<usize> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(columns)?;
    for r in rows {
        out.write_record(&r.raw)?;
    }
    out.flush()?;
    Ok(rows.len())
}

/// Write the working subset to `dir/filtered_sales_data_<date>.csv`.
pub fn export_csv(
    dir: &Path,
    table: &SalesTable,
    subsets: &Subsets<'_>,
    today: NaiveDate,
) -> DashboardResult<ExportedFile> {
    let mut bytes = Vec::new();
    let rows = write_csv(&table.columns, &subsets.working, &mut bytes)?;
    let path = write_atomically(dir, &csv_file_name(today), &bytes)?;
    tracing::info!(path = %path.display(), rows, "csv exported");
    Ok(ExportedFile {
        path,
        bytes: bytes.len(),
        rows: Some(rows),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, purchase};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_file_name() {
        assert_eq!(csv_file_name(date(2024, 3, 9)), "filtered_sales_data_20240309.csv");
    }

    #[test]
    fn test_raw_cells_written_unchanged() {
        let mut r = purchase("A", dec!(1));
        r.raw = vec!["05/01/2024".to_string(), "1.50".to_string()];
        let columns = vec!["sale_date".to_string(), "total_price".to_string()];
        let mut buf = Vec::new();
        let n = write_csv(&columns, &[&r], &mut buf).unwrap();
        assert_eq!(n, 1);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "sale_date,total_price\n05/01/2024,1.50\n"
        );
    }

    #[test]
    fn test_no_rows_gives_header_only() {
        let columns = vec!["a".to_string(), "b".to_string()];
        let mut buf = Vec::new();
        write_csv(&columns, &[], &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "a,b\n");
    }
}
