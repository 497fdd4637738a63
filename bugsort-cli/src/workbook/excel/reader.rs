//! Decode workbook bytes into a Document

use std::io::{Cursor, Read, Seek};

use calamine::{Data, Reader, Sheets, open_workbook_auto_from_rs};

use crate::workbook::codec::CodecError;
use crate::workbook::document::{Cell, Document, Sheet};

/// Read every sheet of an `.xlsx`/`.xls` buffer, in workbook order
pub fn read_workbook(bytes: &[u8]) -> Result<Document, CodecError> {
    let mut workbook: Sheets<_> = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| CodecError::Decode(format!("Failed to open Excel file: {}", e)))?;

    let sheet_names = workbook.sheet_names();
    log::debug!("All sheets in workbook: {:?}", sheet_names);

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| CodecError::Decode(format!("Failed to read sheet '{}': {}", sheet_name, e)))?;

        let origin = range
            .start()
            .map(|(row, col)| (row, col as u16))
            .unwrap_or((0, 0));

        let mut rows: Vec<Vec<Cell>> = range
            .rows()
            .map(|row| row.iter().map(to_cell).collect())
            .collect();

        let formulas = attach_formulas(&mut workbook, sheet_name, origin, &mut rows);

        log::debug!(
            "Decoded sheet '{}': {} rows starting at {:?}, {} formulas",
            sheet_name,
            rows.len(),
            origin,
            formulas
        );

        sheets.push(Sheet {
            name: sheet_name.clone(),
            origin,
            rows,
        });
    }

    Ok(Document::new(sheets))
}

/// Wrap cells holding a formula so the formula is written back, not just its value
///
/// Returns the number of formulas found. A sheet whose formulas cannot be
/// read keeps its cached values.
fn attach_formulas<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    sheet_name: &str,
    origin: (u32, u16),
    rows: &mut Vec<Vec<Cell>>,
) -> usize {
    let formulas = match workbook.worksheet_formula(sheet_name) {
        Ok(formulas) => formulas,
        Err(e) => {
            log::debug!("No formulas read for sheet '{}': {}", sheet_name, e);
            return 0;
        }
    };
    let Some((start_row, start_col)) = formulas.start() else {
        return 0;
    };

    let mut count = 0;
    for (row, col, formula) in formulas.cells() {
        if formula.is_empty() {
            continue;
        }

        let abs_row = start_row + row as u32;
        let abs_col = start_col + col as u32;
        if abs_row < origin.0 || abs_col < u32::from(origin.1) {
            log::debug!(
                "Formula outside value range in '{}' at ({}, {}) dropped",
                sheet_name,
                abs_row,
                abs_col
            );
            continue;
        }

        let row_idx = (abs_row - origin.0) as usize;
        let col_idx = (abs_col - u32::from(origin.1)) as usize;
        if rows.len() <= row_idx {
            rows.resize_with(row_idx + 1, Vec::new);
        }
        let cells = &mut rows[row_idx];
        if cells.len() <= col_idx {
            cells.resize(col_idx + 1, Cell::Empty);
        }

        let cached = std::mem::replace(&mut cells[col_idx], Cell::Empty);
        cells[col_idx] = Cell::Formula {
            formula: formula.strip_prefix('=').unwrap_or(formula).to_string(),
            cached: Box::new(cached),
        };
        count += 1;
    }

    count
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if dt.is_datetime() => Cell::DateTime(datetime),
            _ => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}
