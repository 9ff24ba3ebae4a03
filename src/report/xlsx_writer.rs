use std::path::Path;

use rust_xlsxwriter::Workbook;
use tracing::info;

use crate::report::render::{ReportCell, ReportError, TabularReport, REPORT_DT_FORMAT};

/// Write records to a single-sheet workbook: one header row, one row per
/// record, no index column. Timestamps are written as formatted text so the
/// sheet round-trips through the store loader unchanged.
pub fn write_xlsx_report<T: TabularReport>(records: &[T], path: &Path) -> Result<(), ReportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in T::headers().iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    for (row, record) in records.iter().enumerate() {
        let row_idx = row as u32 + 1;
        for (col, cell) in record.cells().into_iter().enumerate() {
            let col_idx = col as u16;
            match cell {
                ReportCell::Text(s) => {
                    worksheet.write_string(row_idx, col_idx, s)?;
                }
                ReportCell::Number(n) => {
                    worksheet.write_number(row_idx, col_idx, n)?;
                }
                ReportCell::Timestamp(ts) => {
                    let formatted = ts.format(REPORT_DT_FORMAT).to_string();
                    worksheet.write_string(row_idx, col_idx, formatted)?;
                }
            }
        }
    }

    workbook.save(path)?;
    info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}
