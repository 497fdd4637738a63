//! Ordered column-name to cell-text mapping for a single sheet row

use indexmap::IndexMap;

/// One data row of a sheet, keyed by header name
///
/// Columns keep the order they were inserted in, which is the order they
/// are written back out when a sheet is rebuilt from records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: IndexMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cell text for a column, if the column is present
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Set a column's value, replacing in place if it already exists
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Copy of this record with one column renamed at its original position
    ///
    /// If `to` already exists elsewhere in the record, the renamed column's
    /// value wins and the earlier entry is dropped.
    pub fn with_column_renamed(&self, from: &str, to: &str) -> Record {
        if from == to || !self.contains(from) {
            return self.clone();
        }

        let fields = self
            .fields
            .iter()
            .filter(|(name, _)| name.as_str() != to)
            .map(|(name, value)| {
                let name = if name == from { to } else { name.as_str() };
                (name.to_string(), value.clone())
            })
            .collect();

        Record { fields }
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.insert(column, value);
        }
        record
    }
}
