//! Domain models for the Stocksync reconciliation engine.
//!
//! - [`Record`] - One tabular row: column name to string value, order preserved
//! - [`Table`] - Ordered header list plus records
//! - [`OptionPair`] - A product option (`Size` = `XL`)
//! - [`TagSet`] - Shopify's comma separated tag list
//!
//! Column names of the Shopify exports live in [`columns`].

pub mod columns;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Record
// =============================================================================

/// A single tabular record.
///
/// Absent columns read as `None`, never as an error. Column insertion order
/// is preserved so a record written back keeps its original layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(column, value)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut record = Self::new();
        for (k, v) in pairs {
            record.set(k, v);
        }
        record
    }

    /// Value of a column, `None` when the column is absent.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).and_then(|v| v.as_str())
    }

    /// Value of a column, empty when absent.
    pub fn text(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    /// Trimmed value of a column, empty when absent.
    pub fn trimmed(&self, column: &str) -> &str {
        self.text(column).trim()
    }

    /// Whether the column is present and non-empty.
    pub fn has(&self, column: &str) -> bool {
        !self.text(column).is_empty()
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), Value::String(value.into()));
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// `(column, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str().unwrap_or("")))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Apply a function to every value in place.
    pub fn map_values(&mut self, f: impl Fn(&str) -> String) {
        for value in self.fields.values_mut() {
            if let Some(s) = value.as_str() {
                *value = Value::String(f(s));
            }
        }
    }
}

// =============================================================================
// Table
// =============================================================================

/// Parsed tabular data with its header row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Column headers, in file order
    pub headers: Vec<String>,
    /// Records in file order
    pub records: Vec<Record>,
}

impl Table {
    pub fn new(headers: Vec<String>, records: Vec<Record>) -> Self {
        Self { headers, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append another table, extending the header list with unseen columns.
    pub fn extend(&mut self, other: Table) {
        for header in other.headers {
            if !self.headers.contains(&header) {
                self.headers.push(header);
            }
        }
        self.records.extend(other.records);
    }
}

// =============================================================================
// Product options
// =============================================================================

/// A single product option such as `Size` = `XL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionPair {
    pub name: String,
    pub value: String,
}

impl OptionPair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// =============================================================================
// Tags
// =============================================================================

/// Shopify tag list, stored as `a, b, c`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    /// Parse a tag cell. Empty entries are dropped.
    pub fn parse(raw: &str) -> Self {
        let tags = raw
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();
        Self { tags }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Add a tag if missing. Returns whether the set changed.
    pub fn insert(&mut self, tag: &str) -> bool {
        if self.contains(tag) || tag.trim().is_empty() {
            return false;
        }
        self.tags.push(tag.trim().to_string());
        true
    }

    /// Remove a tag if present. Returns whether the set changed.
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        before != self.tags.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl std::fmt::Display for TagSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tags.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_is_none() {
        let record = Record::from_pairs([("SKU", "A1")]);
        assert_eq!(record.get("SKU"), Some("A1"));
        assert_eq!(record.get("Title"), None);
        assert_eq!(record.text("Title"), "");
        assert!(!record.has("Title"));
    }

    #[test]
    fn test_column_order_preserved() {
        let mut record = Record::new();
        record.set("Zeta", "1");
        record.set("Alpha", "2");
        record.set("Mid", "3");
        let cols: Vec<&str> = record.columns().collect();
        assert_eq!(cols, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut record = Record::from_pairs([("a", "1"), ("b", "2")]);
        record.set("a", "9");
        let pairs: Vec<(&str, &str)> = record.iter().collect();
        assert_eq!(pairs, vec![("a", "9"), ("b", "2")]);
    }

    #[test]
    fn test_tagset_round_trip() {
        let mut tags = TagSet::parse("new in, blitz,, sale");
        assert!(tags.contains("blitz"));
        assert!(!tags.insert("blitz"));
        assert!(tags.insert("gloves"));
        assert!(tags.remove("sale"));
        assert!(!tags.remove("sale"));
        assert_eq!(tags.to_string(), "new in, blitz, gloves");
    }

    #[test]
    fn test_table_extend_merges_headers() {
        let mut a = Table::new(vec!["x".into(), "y".into()], vec![Record::new()]);
        let b = Table::new(vec!["y".into(), "z".into()], vec![Record::new()]);
        a.extend(b);
        assert_eq!(a.headers, vec!["x", "y", "z"]);
        assert_eq!(a.len(), 2);
    }
}
