//! Decoded rows

use std::sync::Arc;

/// Synthetic column name under which a row exposes its primary key
pub const PRIMARY_KEY_COLUMN: &str = "_PK";

/// One decoded record: values in schema column order plus the rebuilt
/// primary key. Column names are shared with the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    names: Arc<[String]>,
    values: Vec<String>,
    primary_key: String,
}

impl Row {
    pub fn new(names: Arc<[String]>, values: Vec<String>, primary_key: String) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self {
            names,
            values,
            primary_key,
        }
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Value of `column`, or the primary key for [`PRIMARY_KEY_COLUMN`]
    pub fn get(&self, column: &str) -> Option<&str> {
        if column == PRIMARY_KEY_COLUMN {
            return Some(&self.primary_key);
        }
        self.names
            .iter()
            .position(|name| name == column)
            .map(|i| self.values[i].as_str())
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(column, value)` pairs in schema order, without the primary key
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names
            .iter()
            .zip(&self.values)
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}
