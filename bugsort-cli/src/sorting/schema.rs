//! Locating the target sheet and the logical columns the sort depends on
//!
//! Real-world bug sheets are hand-edited, so headers vary in case and
//! spacing and the New/Existing column is sometimes left without a header
//! at all. Names are compared after [`normalize`], and an unlabeled column
//! is adopted when its first value looks like a New/Existing entry.

use std::fmt;

use crate::workbook::{PLACEHOLDER_HEADER, Record};

/// Accepted names for the sheet that gets sorted
pub const SHEET_ALIASES: &[&str] = &["bugsreported", "bugs reported"];

/// Lower-case and drop every whitespace character
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Logical role a physical column can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalColumn {
    NewExisting,
    Priority,
    BugsText,
}

impl LogicalColumn {
    /// Header names accepted for this role, compared after normalization
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            LogicalColumn::NewExisting => &["new/existing", "existing/new", "newexisting", "existingnew"],
            LogicalColumn::Priority => &["priority"],
            LogicalColumn::BugsText => &["bugs"],
        }
    }

    /// Canonical header label
    pub fn label(self) -> &'static str {
        match self {
            LogicalColumn::NewExisting => "New/Existing",
            LogicalColumn::Priority => "Priority",
            LogicalColumn::BugsText => "Bugs",
        }
    }
}

impl fmt::Display for LogicalColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A discovered column and the first record's value for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSample {
    pub name: String,
    pub sample: String,
}

/// Why a workbook cannot be sorted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error(
        "Excel file must contain a sheet named \"Bugs Reported\". Found sheets: {}",
        join_names(.available)
    )]
    SheetNotFound { available: Vec<String> },

    #[error(
        "Missing columns: {}. Debug info: {}",
        format_missing(.missing),
        format_samples(.discovered)
    )]
    MissingColumns {
        missing: Vec<LogicalColumn>,
        discovered: Vec<ColumnSample>,
    },
}

fn join_names(names: &[String]) -> String {
    names.join(", ")
}

fn format_missing(missing: &[LogicalColumn]) -> String {
    missing
        .iter()
        .map(|column| format!("\"{}\"", column.label()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_samples(discovered: &[ColumnSample]) -> String {
    discovered
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            format!(
                "Column {}: \"{}\" (sample: \"{}\")",
                idx + 1,
                column.name,
                column.sample
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Find the first name matching an alias, trying aliases in order
///
/// Returns the name as stored, not the normalized form.
pub fn find_by_alias<'a, S: AsRef<str>>(names: &'a [S], aliases: &[&str]) -> Option<&'a str> {
    let normalized: Vec<String> = names.iter().map(|n| normalize(n.as_ref())).collect();

    aliases.iter().find_map(|alias| {
        let alias = normalize(alias);
        normalized
            .iter()
            .position(|n| *n == alias)
            .map(|idx| names[idx].as_ref())
    })
}

/// Resolve the sheet to sort among the workbook's sheet names
pub fn find_target_sheet<S: AsRef<str>>(sheet_names: &[S]) -> Result<String, SchemaError> {
    find_by_alias(sheet_names, SHEET_ALIASES)
        .map(str::to_string)
        .ok_or_else(|| SchemaError::SheetNotFound {
            available: sheet_names.iter().map(|s| s.as_ref().to_string()).collect(),
        })
}

/// Whether a header name is one the codec generated for a blank header cell
pub fn is_placeholder(name: &str) -> bool {
    name.contains(PLACEHOLDER_HEADER)
}

/// Physical column names bound to the required logical roles
///
/// Both are `None` only for a sheet without data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnBinding {
    pub new_existing: Option<String>,
    pub priority: Option<String>,
}

impl ColumnBinding {
    /// Whether New/Existing was bound to an unlabeled column
    pub fn new_existing_is_placeholder(&self) -> bool {
        self.new_existing.as_deref().is_some_and(is_placeholder)
    }
}

/// Every column of the record with its value, for diagnostics
pub fn column_samples(record: &Record) -> Vec<ColumnSample> {
    record
        .iter()
        .map(|(name, sample)| ColumnSample {
            name: name.to_string(),
            sample: sample.to_string(),
        })
        .collect()
}

/// Bind New/Existing and Priority using the first record's columns
///
/// `None` means the sheet has no data rows, which is not an error.
pub fn resolve_columns(first: Option<&Record>) -> Result<ColumnBinding, SchemaError> {
    let Some(first) = first else {
        return Ok(ColumnBinding::default());
    };

    let columns: Vec<&str> = first.column_names().collect();
    log::debug!("All column names (including placeholders): {:?}", columns);

    let priority = find_by_alias(&columns, LogicalColumn::Priority.aliases()).map(str::to_string);
    let new_existing = find_by_alias(&columns, LogicalColumn::NewExisting.aliases())
        .map(str::to_string)
        .or_else(|| infer_new_existing(first, &columns));

    let mut missing = Vec::new();
    if new_existing.is_none() {
        missing.push(LogicalColumn::NewExisting);
    }
    if priority.is_none() {
        missing.push(LogicalColumn::Priority);
    }

    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns {
            missing,
            discovered: column_samples(first),
        });
    }

    Ok(ColumnBinding {
        new_existing,
        priority,
    })
}

fn infer_new_existing(first: &Record, columns: &[&str]) -> Option<String> {
    columns
        .iter()
        .filter(|name| is_placeholder(name))
        .find(|name| {
            let sample = first.get(name).unwrap_or_default().trim().to_lowercase();
            sample == "new" || sample == "existing"
        })
        .map(|name| {
            log::info!("Found New/Existing data in column: {}", name);
            name.to_string()
        })
}
