//! Encode a Document as `.xlsx` bytes

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_xlsxwriter::{Format, Formula, Workbook, Worksheet, XlsxError};

use crate::workbook::codec::CodecError;
use crate::workbook::document::{Cell, Document, Sheet};

/// Number formats for date cells, picked by whether a time part is present
struct DateFormats {
    date: Format,
    datetime: Format,
}

impl DateFormats {
    fn new() -> Self {
        Self {
            date: Format::new().set_num_format("dd/mm/yyyy"),
            datetime: Format::new().set_num_format("dd/mm/yyyy hh:mm"),
        }
    }

    fn for_datetime(&self, datetime: &NaiveDateTime) -> &Format {
        if datetime.time() == NaiveTime::MIN {
            &self.date
        } else {
            &self.datetime
        }
    }
}

/// Write every sheet of the document, in order, to an in-memory `.xlsx`
pub fn write_workbook(document: &Document) -> Result<Vec<u8>, CodecError> {
    let mut workbook = Workbook::new();
    let formats = DateFormats::new();

    for sheet in document.sheets() {
        let worksheet = workbook.add_worksheet();
        write_sheet(worksheet, sheet, &formats).map_err(|e| {
            CodecError::Encode(format!("Failed to write sheet '{}': {}", sheet.name, e))
        })?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| CodecError::Encode(format!("Failed to save Excel file: {}", e)))
}

fn write_sheet(ws: &mut Worksheet, sheet: &Sheet, formats: &DateFormats) -> Result<(), XlsxError> {
    ws.set_name(&sheet.name)?;

    let (row_offset, col_offset) = sheet.origin;
    for (row_idx, row) in sheet.rows.iter().enumerate() {
        let row_num = row_offset + row_idx as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let col_num = col_offset + col_idx as u16;
            write_cell(ws, row_num, col_num, cell, formats)?;
        }
    }

    Ok(())
}

fn write_cell(
    ws: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    formats: &DateFormats,
) -> Result<(), XlsxError> {
    match cell {
        Cell::Empty => {}
        Cell::Text(s) if s.is_empty() => {}
        Cell::Text(s) => {
            ws.write_string(row, col, s)?;
        }
        Cell::Number(n) => {
            ws.write_number(row, col, *n)?;
        }
        Cell::Bool(b) => {
            ws.write_boolean(row, col, *b)?;
        }
        Cell::DateTime(dt) => {
            ws.write_number_with_format(row, col, excel_serial(dt), formats.for_datetime(dt))?;
        }
        Cell::Formula { formula, cached } => {
            let formula = Formula::new(formula.as_str()).set_result(cached.to_text());
            match cached.as_ref() {
                Cell::DateTime(dt) => {
                    ws.write_formula_with_format(row, col, formula, formats.for_datetime(dt))?;
                }
                _ => {
                    ws.write_formula(row, col, formula)?;
                }
            }
        }
    }
    Ok(())
}

/// Days since 1899-12-30, the 1900 date system serial used by Excel
///
/// Exact for every date from March 1900 on.
fn excel_serial(datetime: &NaiveDateTime) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    let millis = datetime.signed_duration_since(epoch).num_milliseconds();
    millis as f64 / 86_400_000.0
}
