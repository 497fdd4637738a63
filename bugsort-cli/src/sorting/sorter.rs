//! Three-level ordering of bug rows
//!
//! 1. New before Existing before anything else
//! 2. Blocker, Critical, Major, then anything else
//! 3. Latest day/month in the Bugs column first, rows without one last
//!
//! Rows equal on all three keep their original relative order.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::workbook::Record;

use super::dates::extract_date;
use super::schema::{ColumnBinding, LogicalColumn, find_by_alias};

/// Rank given to values outside the known vocabulary
pub const UNRANKED: u16 = 999;

/// Rank of a New/Existing cell value
pub fn type_rank(value: Option<&str>) -> u16 {
    match normalized_value(value).as_str() {
        "new" => 0,
        "existing" => 1,
        _ => UNRANKED,
    }
}

/// Rank of a Priority cell value
pub fn priority_rank(value: Option<&str>) -> u16 {
    match normalized_value(value).as_str() {
        "blocker" => 0,
        "critical" => 1,
        "major" => 2,
        _ => UNRANKED,
    }
}

fn normalized_value(value: Option<&str>) -> String {
    value.unwrap_or_default().trim().to_lowercase()
}

/// Physical columns consulted while sorting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortColumns {
    pub new_existing: Option<String>,
    pub priority: Option<String>,
    pub bugs: Option<String>,
}

impl SortColumns {
    /// Combine the validated binding with the columns of the first row
    ///
    /// Priority and Bugs are looked up by name only; the New/Existing
    /// binding is kept as validated since it may be an unlabeled column.
    pub fn resolve(binding: &ColumnBinding, first: Option<&Record>) -> Self {
        let columns: Vec<&str> = first.map(|r| r.column_names().collect()).unwrap_or_default();

        let priority = find_by_alias(&columns, LogicalColumn::Priority.aliases()).map(str::to_string);
        let bugs = find_by_alias(&columns, LogicalColumn::BugsText.aliases()).map(str::to_string);

        Self {
            new_existing: binding.new_existing.clone(),
            priority,
            bugs,
        }
    }
}

/// Derived ordering key of one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub type_rank: u16,
    pub priority_rank: u16,
    pub reported: Option<i64>,
}

impl SortKey {
    pub fn for_record(record: &Record, columns: &SortColumns, today: NaiveDate) -> Self {
        let cell = |column: &Option<String>| column.as_deref().and_then(|c| record.get(c));

        Self {
            type_rank: type_rank(cell(&columns.new_existing)),
            priority_rank: priority_rank(cell(&columns.priority)),
            reported: cell(&columns.bugs).and_then(|text| extract_date(text, today)),
        }
    }

    /// Ascending ranks, then descending report date with undated rows last
    pub fn compare(&self, other: &Self) -> Ordering {
        self.type_rank
            .cmp(&other.type_rank)
            .then(self.priority_rank.cmp(&other.priority_rank))
            .then_with(|| match (self.reported, other.reported) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    }
}

/// Stable sort of the records by their [`SortKey`]
pub fn sort_records(records: Vec<Record>, columns: &SortColumns, today: NaiveDate) -> Vec<Record> {
    log::debug!(
        "Sorting {} rows with columns: new/existing={:?} priority={:?} bugs={:?}",
        records.len(),
        columns.new_existing,
        columns.priority,
        columns.bugs
    );

    let mut keyed: Vec<(SortKey, Record)> = records
        .into_iter()
        .map(|record| (SortKey::for_record(&record, columns, today), record))
        .collect();

    // slice::sort_by is stable
    keyed.sort_by(|(a, _), (b, _)| a.compare(b));

    keyed.into_iter().map(|(_, record)| record).collect()
}
