use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use crate::store::{CellValue, Table};

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Missing column '{column}' in table '{table}'")]
    MissingColumn { table: String, column: &'static str },

    #[error("Invalid data in table '{table}' at row {row}, column '{column}': {msg}")]
    InvalidCell {
        table: String,
        row: usize,
        column: &'static str,
        msg: String,
    },
}

/// The three produced fluids. Split and rate tables carry one column per
/// fluid; the long-form invalid report carries one row per fluid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FluidType {
    Oil,
    Water,
    Gas,
}

impl FluidType {
    /// Report ordering: oil first, then water, then gas.
    pub const ALL: [FluidType; 3] = [FluidType::Oil, FluidType::Water, FluidType::Gas];

    /// Column label in the split tables, also used as the `fluid_type` label
    /// of the invalid-splits report.
    pub const fn split_column(&self) -> &'static str {
        match self {
            FluidType::Oil => "oil_split",
            FluidType::Water => "water_split",
            FluidType::Gas => "gas_split",
        }
    }

    pub const fn rate_column(&self) -> &'static str {
        match self {
            FluidType::Oil => "oil_rate",
            FluidType::Water => "water_rate",
            FluidType::Gas => "gas_rate",
        }
    }
}

impl fmt::Display for FluidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FluidType::Oil => "oil",
            FluidType::Water => "water",
            FluidType::Gas => "gas",
        })
    }
}

/// One row of a split table: per-fluid ownership percentages for a well at a
/// timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRecord {
    pub well_id: String,
    pub dt: NaiveDateTime,
    pub oil_split: f64,
    pub water_split: f64,
    pub gas_split: f64,
}

impl SplitRecord {
    /// Columns a split-shaped table must carry.
    pub const COLUMNS: [&'static str; 5] = [
        "well_id",
        "dt",
        FluidType::Oil.split_column(),
        FluidType::Water.split_column(),
        FluidType::Gas.split_column(),
    ];

    pub fn from_row(table: &Table, row: usize) -> Result<Self, RecordError> {
        require_columns(table, &Self::COLUMNS)?;
        Ok(Self {
            well_id: text_cell(table, row, "well_id")?,
            dt: datetime_cell(table, row, "dt")?,
            oil_split: f64_cell(table, row, FluidType::Oil.split_column())?,
            water_split: f64_cell(table, row, FluidType::Water.split_column())?,
            gas_split: f64_cell(table, row, FluidType::Gas.split_column())?,
        })
    }

    /// Decode every row of a split-shaped table. The column check also runs
    /// for tables with no data rows.
    pub fn from_table(table: &Table) -> Result<Vec<Self>, RecordError> {
        require_columns(table, &Self::COLUMNS)?;
        (0..table.row_count())
            .map(|row| Self::from_row(table, row))
            .collect()
    }

    pub fn split(&self, fluid: FluidType) -> f64 {
        match fluid {
            FluidType::Oil => self.oil_split,
            FluidType::Water => self.water_split,
            FluidType::Gas => self.gas_split,
        }
    }
}

/// One row of the rates table: measured per-fluid production for a well at a
/// timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRecord {
    pub well_id: String,
    pub dt: NaiveDateTime,
    pub oil_rate: f64,
    pub water_rate: f64,
    pub gas_rate: f64,
}

impl RateRecord {
    /// Columns a rate-shaped table must carry.
    pub const COLUMNS: [&'static str; 5] = [
        "well_id",
        "dt",
        FluidType::Oil.rate_column(),
        FluidType::Water.rate_column(),
        FluidType::Gas.rate_column(),
    ];

    pub fn from_row(table: &Table, row: usize) -> Result<Self, RecordError> {
        require_columns(table, &Self::COLUMNS)?;
        Ok(Self {
            well_id: text_cell(table, row, "well_id")?,
            dt: datetime_cell(table, row, "dt")?,
            oil_rate: f64_cell(table, row, FluidType::Oil.rate_column())?,
            water_rate: f64_cell(table, row, FluidType::Water.rate_column())?,
            gas_rate: f64_cell(table, row, FluidType::Gas.rate_column())?,
        })
    }

    pub fn from_table(table: &Table) -> Result<Vec<Self>, RecordError> {
        require_columns(table, &Self::COLUMNS)?;
        (0..table.row_count())
            .map(|row| Self::from_row(table, row))
            .collect()
    }

    pub fn rate(&self, fluid: FluidType) -> f64 {
        match fluid {
            FluidType::Oil => self.oil_rate,
            FluidType::Water => self.water_rate,
            FluidType::Gas => self.gas_rate,
        }
    }
}

/// Allocated production for one (well, timestamp) key: each measured rate
/// scaled by the matching split percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocatedRecord {
    pub well_id: String,
    pub dt: NaiveDateTime,
    pub oil_split_rate: f64,
    pub water_split_rate: f64,
    pub gas_split_rate: f64,
}

/// One flagged fluid in the validation report: the aggregated split sum for
/// that (well, timestamp, fluid) landed outside tolerance of 100%.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidSplitRow {
    pub well_id: String,
    pub dt: NaiveDateTime,
    pub fluid_type: FluidType,
    pub split_sum: f64,
}

/// Check every required column before any cell is decoded, so a table with a
/// missing column is reported by column name rather than as a bad cell.
fn require_columns(table: &Table, columns: &[&'static str]) -> Result<(), RecordError> {
    for &column in columns {
        if table.column_index(column).is_none() {
            return Err(RecordError::MissingColumn {
                table: table.name().to_string(),
                column,
            });
        }
    }
    Ok(())
}

fn lookup<'a>(table: &'a Table, row: usize, column: &str) -> &'a CellValue {
    table.cell(row, column).unwrap_or(&CellValue::Empty)
}

fn text_cell(table: &Table, row: usize, column: &'static str) -> Result<String, RecordError> {
    let value = lookup(table, row, column);
    value.as_text().ok_or_else(|| RecordError::InvalidCell {
        table: table.name().to_string(),
        row,
        column,
        msg: format!("Expected text, got: {value:?}"),
    })
}

fn f64_cell(table: &Table, row: usize, column: &'static str) -> Result<f64, RecordError> {
    let value = lookup(table, row, column);
    value.as_f64().ok_or_else(|| RecordError::InvalidCell {
        table: table.name().to_string(),
        row,
        column,
        msg: format!("Expected number, got: {value:?}"),
    })
}

fn datetime_cell(
    table: &Table,
    row: usize,
    column: &'static str,
) -> Result<NaiveDateTime, RecordError> {
    let value = lookup(table, row, column);
    value.as_datetime().ok_or_else(|| RecordError::InvalidCell {
        table: table.name().to_string(),
        row,
        column,
        msg: format!("Expected timestamp, got: {value:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn split_table(rows: Vec<Vec<CellValue>>) -> Table {
        Table::new(
            "splits".to_string(),
            vec![
                "well_id".to_string(),
                "dt".to_string(),
                "oil_split".to_string(),
                "water_split".to_string(),
                "gas_split".to_string(),
            ],
            rows,
        )
    }

    #[test]
    fn test_decode_split_row() {
        let dt = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let table = split_table(vec![vec![
            CellValue::Text("W1".to_string()),
            CellValue::DateTime(dt),
            CellValue::Number(60.0),
            CellValue::Number(30.0),
            CellValue::Number(10.0),
        ]]);

        let record = SplitRecord::from_row(&table, 0).unwrap();
        assert_eq!(record.well_id, "W1");
        assert_eq!(record.dt, dt);
        assert_eq!(record.split(FluidType::Oil), 60.0);
        assert_eq!(record.split(FluidType::Water), 30.0);
        assert_eq!(record.split(FluidType::Gas), 10.0);
    }

    #[test]
    fn test_missing_column_is_reported_by_name() {
        let table = Table::new(
            "splits".to_string(),
            vec!["well_id".to_string(), "dt".to_string()],
            vec![],
        );

        match SplitRecord::from_row(&table, 0).unwrap_err() {
            RecordError::MissingColumn { table, column } => {
                assert_eq!(table, "splits");
                assert_eq!(column, "oil_split");
            }
            other => panic!("Expected MissingColumn error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_column_is_reported_before_any_cell() {
        // A zero-row table must still fail on its missing column, not on the
        // out-of-range cells of columns it does have
        let table = Table::new(
            "rates".to_string(),
            vec!["well_id".to_string(), "dt".to_string()],
            vec![],
        );

        match RateRecord::from_table(&table).unwrap_err() {
            RecordError::MissingColumn { table, column } => {
                assert_eq!(table, "rates");
                assert_eq!(column, "oil_rate");
            }
            other => panic!("Expected MissingColumn error, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_row_table_with_all_columns_decodes_empty() {
        let table = split_table(vec![]);
        assert!(SplitRecord::from_table(&table).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_cell_carries_position() {
        let dt = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let table = split_table(vec![vec![
            CellValue::Text("W1".to_string()),
            CellValue::DateTime(dt),
            CellValue::Text("sixty".to_string()),
            CellValue::Number(30.0),
            CellValue::Number(10.0),
        ]]);

        match SplitRecord::from_row(&table, 0).unwrap_err() {
            RecordError::InvalidCell { row, column, .. } => {
                assert_eq!(row, 0);
                assert_eq!(column, "oil_split");
            }
            other => panic!("Expected InvalidCell error, got {other:?}"),
        }
    }

    #[test]
    fn test_fluid_labels() {
        assert_eq!(FluidType::Oil.split_column(), "oil_split");
        assert_eq!(FluidType::Gas.rate_column(), "gas_rate");
        assert_eq!(FluidType::Water.to_string(), "water");
    }
}
