//! In-memory workbook model shared by the codec and the sorting pipeline

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDateTime, NaiveTime};
use indexmap::IndexSet;

use super::record::Record;

/// Header name given to columns whose header cell is blank
pub const PLACEHOLDER_HEADER: &str = "__EMPTY";

/// A single worksheet cell as decoded from the workbook
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// A date-formatted cell, written back as a date
    DateTime(NaiveDateTime),
    /// Formula text without the leading `=`, with its last computed value
    Formula { formula: String, cached: Box<Cell> },
}

impl Cell {
    /// Cell rendered the way it appears in a record
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    (*n as i64).to_string()
                } else {
                    n.to_string()
                }
            }
            Cell::Bool(true) => "TRUE".to_string(),
            Cell::Bool(false) => "FALSE".to_string(),
            // Day-first, matching how dates are typed into the free-text columns
            Cell::DateTime(dt) if dt.time() == NaiveTime::MIN => dt.format("%d/%m/%Y").to_string(),
            Cell::DateTime(dt) => dt.format("%d/%m/%Y %H:%M").to_string(),
            Cell::Formula { cached, .. } => cached.to_text(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            Cell::Formula { formula, cached } => formula.is_empty() && cached.is_blank(),
            _ => false,
        }
    }
}

/// A named worksheet stored as its raw cell grid
///
/// `origin` is the (row, column) of the grid's top-left cell inside the
/// worksheet, so sheets that do not start at A1 are written back in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub origin: (u32, u16),
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            origin: (0, 0),
            rows,
        }
    }

    /// Build a sheet whose first row is the header, from an ordered record list
    ///
    /// The header is the union of every record's columns in first-seen order.
    pub fn from_records(name: impl Into<String>, records: &[Record]) -> Self {
        let header: IndexSet<&str> = records.iter().flat_map(Record::column_names).collect();

        let mut rows = Vec::with_capacity(records.len() + 1);
        rows.push(
            header
                .iter()
                .map(|column| Cell::Text(column.to_string()))
                .collect(),
        );
        for record in records {
            rows.push(
                header
                    .iter()
                    .map(|column| match record.get(column) {
                        Some(value) if !value.is_empty() => Cell::Text(value.to_string()),
                        _ => Cell::Empty,
                    })
                    .collect(),
            );
        }

        Self::new(name, rows)
    }

    /// Header names for the first row, with blank and duplicate names made unique
    ///
    /// Blank headers become `__EMPTY`, repeats get `_1`, `_2`, ... suffixes.
    pub fn header_names(&self) -> Vec<String> {
        let Some(header_row) = self.rows.first() else {
            return Vec::new();
        };

        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut names = Vec::with_capacity(header_row.len());

        for cell in header_row {
            let base = if cell.is_blank() {
                PLACEHOLDER_HEADER.to_string()
            } else {
                cell.to_text()
            };

            let name = match seen.get(&base).copied() {
                None => {
                    seen.insert(base.clone(), 1);
                    base
                }
                Some(mut counter) => {
                    let mut candidate = format!("{}_{}", base, counter);
                    while seen.contains_key(&candidate) {
                        counter += 1;
                        candidate = format!("{}_{}", base, counter);
                    }
                    seen.insert(base, counter + 1);
                    seen.insert(candidate.clone(), 1);
                    candidate
                }
            };
            names.push(name);
        }

        names
    }

    /// Data rows as records, skipping rows whose cells are all blank
    ///
    /// Every record carries every header column; missing cells read as `""`.
    pub fn records(&self) -> Vec<Record> {
        let header = self.header_names();

        self.rows
            .iter()
            .skip(1)
            .filter(|row| !row.iter().all(Cell::is_blank))
            .map(|row| {
                header
                    .iter()
                    .enumerate()
                    .map(|(col, name)| {
                        let value = row.get(col).map(Cell::to_text).unwrap_or_default();
                        (name.clone(), value)
                    })
                    .collect()
            })
            .collect()
    }
}

/// An ordered list of sheets
///
/// Sheets are shared behind `Arc`, so deriving a new document only copies
/// the handles of the sheets it does not replace.
#[derive(Debug, Clone, Default)]
pub struct Document {
    sheets: Vec<Arc<Sheet>>,
}

impl Document {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self {
            sheets: sheets.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&Arc<Sheet>> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter().map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Records of a sheet, or `None` if no sheet has that exact name
    pub fn records(&self, sheet_name: &str) -> Option<Vec<Record>> {
        self.sheet(sheet_name).map(|sheet| sheet.records())
    }

    /// New document with one sheet's rows rebuilt from `records`
    ///
    /// Every other sheet is shared with `self` unchanged and sheet order is
    /// preserved. Returns `None` if the sheet does not exist.
    pub fn with_records_replaced(&self, sheet_name: &str, records: &[Record]) -> Option<Document> {
        self.sheet(sheet_name)?;

        let sheets = self
            .sheets
            .iter()
            .map(|sheet| {
                if sheet.name == sheet_name {
                    Arc::new(Sheet::from_records(sheet_name, records))
                } else {
                    Arc::clone(sheet)
                }
            })
            .collect();

        Some(Document { sheets })
    }
}
