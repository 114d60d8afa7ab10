//! A single vault entry: an ordered mapping from column name to value.
//!
//! Canonical columns come first and in a fixed order; anything else the
//! caller sets is appended the first time it's seen and keeps its position
//! after that, so two vaults built from the same import never reshuffle
//! columns on every write.

use thiserror::Error;

pub const CANONICAL_COLUMNS: [&str; 7] =
    ["site", "user", "url", "tags", "mtime", "note", "password"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("value for column {column:?} contains a literal tab or newline, which the tab-delimited format cannot represent: {value:?}")]
    IllegalValue { column: String, value: String },
}

#[derive(Debug, Clone, Default)]
pub struct Record {
    columns: Vec<String>,
    values: Vec<String>,
}

impl Record {
    pub fn new() -> Self {
        let mut r = Self::default();
        for col in CANONICAL_COLUMNS {
            r.columns.push(col.to_string());
            r.values.push(String::new());
        }
        r
    }

    /// Build a record from an ordered list of `(column, value)` pairs,
    /// standardizing so every canonical column is present even if absent
    /// from `pairs`, and every extra column in `pairs` is preserved in the
    /// order it first appeared.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Result<Self, RecordError> {
        let mut record = Self::new();
        for (column, value) in pairs {
            record.set(&column, &value)?;
        }
        Ok(record)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.index_of(column).map(|i| self.values[i].as_str())
    }

    /// Set `column` to `value`. Rejects values containing a literal tab or
    /// newline — the tab-delimited on-disk format has no escaping, so those
    /// bytes can never round-trip and are refused here rather than silently
    /// corrupting the next export.
    pub fn set(&mut self, column: &str, value: &str) -> Result<(), RecordError> {
        if value.contains('\t') || value.contains('\n') {
            return Err(RecordError::IllegalValue {
                column: column.to_string(),
                value: value.to_string(),
            });
        }
        match self.index_of(column) {
            Some(i) => self.values[i] = value.to_string(),
            None => {
                self.columns.push(column.to_string());
                self.values.push(value.to_string());
            }
        }
        Ok(())
    }

    fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(|c| c.as_str())
            .zip(self.values.iter().map(|v| v.as_str()))
    }
}
