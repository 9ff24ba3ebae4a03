// Report sinks for the derived tables: spreadsheet (tabular) and JSON (structured)

pub mod json_writer;
pub mod render;
pub mod xlsx_writer;

pub use json_writer::write_allocation_json;
pub use render::{write_allocation_report, ReportCell, ReportError, TabularReport, REPORT_DT_FORMAT};
pub use xlsx_writer::write_xlsx_report;
