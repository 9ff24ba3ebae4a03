use std::path::Path;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::engine::{AllocatedRecord, InvalidSplitRow};
use crate::report::{json_writer, xlsx_writer};

/// Timestamp pattern shared by every serialized report.
pub const REPORT_DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported report extension: {0}")]
    UnsupportedExtension(String),
}

/// One cell of a rendered report row.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportCell {
    Text(String),
    Number(f64),
    Timestamp(NaiveDateTime),
}

/// Records that lay out as a header row plus one row per record. Both engine
/// outputs implement this, so one spreadsheet sink serves both reports.
pub trait TabularReport {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<ReportCell>;
}

impl TabularReport for InvalidSplitRow {
    fn headers() -> &'static [&'static str] {
        &["well_id", "dt", "fluid_type", "split_sum"]
    }

    fn cells(&self) -> Vec<ReportCell> {
        vec![
            ReportCell::Text(self.well_id.clone()),
            ReportCell::Timestamp(self.dt),
            ReportCell::Text(self.fluid_type.split_column().to_string()),
            ReportCell::Number(self.split_sum),
        ]
    }
}

impl TabularReport for AllocatedRecord {
    fn headers() -> &'static [&'static str] {
        &["well_id", "dt", "oil_split_rate", "water_split_rate", "gas_split_rate"]
    }

    fn cells(&self) -> Vec<ReportCell> {
        vec![
            ReportCell::Text(self.well_id.clone()),
            ReportCell::Timestamp(self.dt),
            ReportCell::Number(self.oil_split_rate),
            ReportCell::Number(self.water_split_rate),
            ReportCell::Number(self.gas_split_rate),
        ]
    }
}

/// Write the allocation report to `path`, picking the sink from the file
/// extension: `.xlsx` gets the tabular renderer, `.json` the structured
/// renderer. Anything else is rejected rather than silently writing one
/// format under the other's extension.
pub fn write_allocation_report(
    records: &[AllocatedRecord],
    path: &Path,
) -> Result<(), ReportError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("xlsx") => xlsx_writer::write_xlsx_report(records, path),
        Some("json") => json_writer::write_allocation_json(records, path),
        _ => Err(ReportError::UnsupportedExtension(
            path.display().to_string(),
        )),
    }
}
