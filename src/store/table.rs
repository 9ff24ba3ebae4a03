use calamine::Data;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// A single cell of a loaded table.
///
/// Sheets arrive from calamine as borrowed `Data` cells; this is the owned
/// subset the store keeps once the workbook has been read.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
    Error(String),
}

impl CellValue {
    pub fn from_sheet_cell(cell: &Data) -> Self {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(timestamp) => CellValue::DateTime(timestamp),
                None => CellValue::Number(dt.as_f64()),
            },
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Error(format!("{e}")),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric view of the cell. Text is parsed so that workbooks with
    /// string-formatted numeric columns still load.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(f) => Some(*f),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Text view of the cell. Numeric identifiers render without a trailing
    /// fraction, so a well id stored as the number 101 reads back as "101".
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => Some(s.trim().to_string()),
            CellValue::Number(f) if f.fract() == 0.0 => Some(format!("{f:.0}")),
            CellValue::Number(f) => Some(f.to_string()),
            CellValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Timestamp view of the cell: native datetime cells, `YYYY-MM-DD HH:MM:SS`
    /// or `YYYY-MM-DD` text, or raw Excel serial numbers.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::DateTime(dt) => Some(*dt),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .or_else(|| {
                        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                            .ok()
                            .and_then(|d| d.and_hms_opt(0, 0, 0))
                    })
            }
            CellValue::Number(serial) => excel_serial_to_datetime(*serial),
            _ => None,
        }
    }
}

/// Convert an Excel serial date number to a timestamp.
///
/// Excel's epoch is 1899-12-30 (accounting for Excel's leap year bug);
/// the fractional part carries the time of day.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let seconds = (serial.fract() * 86_400.0).round() as i64;
    epoch
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::seconds(seconds))
}

/// One sheet of the source workbook: named columns over ordered rows.
///
/// The loader has already stripped the leading row-index column, so `columns`
/// aligns one-to-one with each row's cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(name: String, columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name,
            columns,
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Cell at (row, column name), or `None` when either is out of range.
    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(Vec::as_slice)
    }
}
