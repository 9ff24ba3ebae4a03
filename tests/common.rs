// Shared fixture helpers: build production workbooks in the source system's
// export layout (header row, leading row-index column)

use std::path::Path;

use rust_xlsxwriter::{Workbook, XlsxError};

/// (well_id, dt, three fluid values) row for split- and rate-shaped sheets.
pub type Row<'a> = (&'a str, &'a str, f64, f64, f64);

pub const SPLIT_HEADERS: [&str; 5] = ["well_id", "dt", "oil_split", "water_split", "gas_split"];
pub const RATE_HEADERS: [&str; 5] = ["well_id", "dt", "oil_rate", "water_rate", "gas_rate"];

/// Write one sheet: blank index header, named columns, then indexed data rows
/// with the timestamp as text.
pub fn write_sheet(
    workbook: &mut Workbook,
    name: &str,
    headers: &[&str],
    rows: &[Row],
) -> Result<(), XlsxError> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(name)?;

    // The exporter leaves the index column header blank.
    worksheet.write_string(0, 0, "")?;
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16 + 1, *header)?;
    }

    for (row, (well_id, dt, a, b, c)) in rows.iter().enumerate() {
        let row_idx = row as u32 + 1;
        worksheet.write_number(row_idx, 0, row as f64)?;
        worksheet.write_string(row_idx, 1, *well_id)?;
        worksheet.write_string(row_idx, 2, *dt)?;
        worksheet.write_number(row_idx, 3, *a)?;
        worksheet.write_number(row_idx, 4, *b)?;
        worksheet.write_number(row_idx, 5, *c)?;
    }

    Ok(())
}

/// Write the standard three-sheet production workbook.
pub fn write_input_workbook(
    path: &Path,
    splits: &[Row],
    rates: &[Row],
    invalid_splits: &[Row],
) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    write_sheet(&mut workbook, "splits", &SPLIT_HEADERS, splits)?;
    write_sheet(&mut workbook, "rates", &RATE_HEADERS, rates)?;
    write_sheet(&mut workbook, "invalid_splits", &SPLIT_HEADERS, invalid_splits)?;
    workbook.save(path)?;
    Ok(())
}
