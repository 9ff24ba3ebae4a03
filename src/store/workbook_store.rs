use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook, Data, Range, Reader, Xlsx, XlsxError};
use thiserror::Error;
use tracing::{debug, info};

use crate::store::table::{CellValue, Table};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("Failed to read sheet '{name}': {msg}")]
    SheetRead { name: String, msg: String },

    #[error("Workbook contains no sheets")]
    EmptyWorkbook,

    #[error("Table not found: {0}")]
    MissingTable(String),
}

/// Named tables loaded from a multi-sheet `.xlsx` workbook.
///
/// The store is populated once at construction and never mutated afterwards;
/// consumers address tables by sheet name.
#[derive(Debug, Clone)]
pub struct TableStore {
    tables: HashMap<String, Table>,
}

impl TableStore {
    /// Load every sheet of the workbook at `path`.
    ///
    /// Each sheet is expected in the source system's export layout: a header
    /// row naming the columns, a leading row-index column, then one data row
    /// per record. The index column is discarded and fully empty rows are
    /// skipped. No typed validation happens here; decoding rows into records
    /// is the engine's job.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        info!("Loading workbook: {}", path.display());

        let mut workbook: Xlsx<BufReader<File>> = open_workbook(path)
            .map_err(|e: XlsxError| StoreError::WorkbookOpen(e.to_string()))?;

        let sheet_names = workbook.sheet_names().to_owned();
        if sheet_names.is_empty() {
            return Err(StoreError::EmptyWorkbook);
        }

        let mut tables = HashMap::new();
        for sheet_name in sheet_names {
            let range = workbook
                .worksheet_range(&sheet_name)
                .map_err(|e| StoreError::SheetRead {
                    name: sheet_name.clone(),
                    msg: e.to_string(),
                })?;

            let table = sheet_to_table(&sheet_name, &range);
            debug!(
                "Loaded sheet '{}': {} rows, {} columns",
                sheet_name,
                table.row_count(),
                table.columns().len()
            );
            tables.insert(sheet_name, table);
        }

        info!("Loaded {} tables from {}", tables.len(), path.display());
        Ok(Self { tables })
    }

    /// Build a store from already-materialized tables.
    pub fn from_tables(tables: impl IntoIterator<Item = Table>) -> Self {
        Self {
            tables: tables
                .into_iter()
                .map(|t| (t.name().to_string(), t))
                .collect(),
        }
    }

    pub fn table(&self, name: &str) -> Result<&Table, StoreError> {
        self.tables
            .get(name)
            .ok_or_else(|| StoreError::MissingTable(name.to_string()))
    }

    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Convert a sheet range into a table. The first row is the header and the
/// first column is the exporter's row index; both framing pieces are dropped.
fn sheet_to_table(name: &str, range: &Range<Data>) -> Table {
    // The range starts at the first non-empty cell, so the index column is
    // only part of it when some cell in it holds data. A headers-only sheet
    // with a blank index header starts at the first named column already.
    let index_cols = match range.start() {
        Some((_, 0)) => 1,
        _ => 0,
    };

    let mut sheet_rows = range.rows();

    let columns: Vec<String> = match sheet_rows.next() {
        Some(header) => parse_header(header, index_cols),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for sheet_row in sheet_rows {
        let mut cells: Vec<CellValue> = sheet_row
            .iter()
            .skip(index_cols)
            .take(columns.len())
            .map(CellValue::from_sheet_cell)
            .collect();

        if cells.iter().all(CellValue::is_empty) {
            continue;
        }

        // Sheets can come back ragged when trailing cells are blank.
        while cells.len() < columns.len() {
            cells.push(CellValue::Empty);
        }
        rows.push(cells);
    }

    Table::new(name.to_string(), columns, rows)
}

fn parse_header(header: &[Data], index_cols: usize) -> Vec<String> {
    let mut columns = Vec::new();
    for cell in header.iter().skip(index_cols) {
        match cell {
            Data::String(s) if !s.trim().is_empty() => columns.push(s.trim().to_string()),
            Data::Int(i) => columns.push(i.to_string()),
            Data::Float(f) => columns.push(format!("{f:.0}")),
            _ => break,
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workbook_not_found() {
        let result = TableStore::load("/nonexistent/path/to/production.xlsx");

        assert!(result.is_err());
        match result.unwrap_err() {
            StoreError::WorkbookOpen(msg) => {
                assert!(msg.contains("No such file") || msg.contains("not found"));
            }
            other => panic!("Expected WorkbookOpen error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_table_lookup() {
        let store = TableStore::from_tables(vec![Table::new(
            "splits".to_string(),
            vec!["well_id".to_string()],
            vec![],
        )]);

        assert!(store.table("splits").is_ok());
        match store.table("rates").unwrap_err() {
            StoreError::MissingTable(name) => assert_eq!(name, "rates"),
            other => panic!("Expected MissingTable error, got {other:?}"),
        }
    }

    #[test]
    fn test_table_names_sorted() {
        let store = TableStore::from_tables(vec![
            Table::new("rates".to_string(), vec![], vec![]),
            Table::new("invalid_splits".to_string(), vec![], vec![]),
            Table::new("splits".to_string(), vec![], vec![]),
        ]);

        assert_eq!(store.table_names(), vec!["invalid_splits", "rates", "splits"]);
        assert_eq!(store.len(), 3);
    }
}
