// Tabular source access: owned in-memory tables loaded from .xlsx workbooks

pub mod table;
pub mod workbook_store;

pub use table::{excel_serial_to_datetime, CellValue, Table};
pub use workbook_store::{StoreError, TableStore};
