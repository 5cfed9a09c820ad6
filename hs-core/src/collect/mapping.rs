//! Parameter name to row cell mapping

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::compute::column_reference;
use crate::constants::collect::VALUE_TABLE_PREFIX;

/// Where each parameter value is read from in a normalized row.
///
/// A source is either `Column(n)` (1-based, optionally prefixed with
/// `ValueTable.`) or a literal used as is for every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowMapping {
    sources: BTreeMap<String, String>,
}

impl RowMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, parameter: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(parameter, source);
        self
    }

    pub fn insert(&mut self, parameter: impl Into<String>, source: impl Into<String>) {
        self.sources.insert(parameter.into(), source.into());
    }

    pub fn source(&self, parameter: &str) -> Option<&str> {
        self.sources.get(parameter).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Value of a parameter in the given row. `None` when the parameter is
    /// not mapped or its column does not exist in the row.
    pub fn value<'r>(&'r self, parameter: &str, row: &'r [String]) -> Option<&'r str> {
        let source = self.source(parameter)?;
        let reference = strip_prefix_ignore_case(source.trim(), VALUE_TABLE_PREFIX);

        match column_reference(reference) {
            Some(0) => None,
            Some(column) => row.get(column - 1).map(String::as_str),
            None if source.is_empty() => None,
            None => Some(source),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RowMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            sources: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> &'a str {
    match value.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => &value[prefix.len()..],
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_column_sources() {
        let mapping = RowMapping::new()
            .with("status", "Column(2)")
            .with("speed", "valuetable.column(3)")
            .with("missing", "Column(9)");
        let row = row(&["fan1", "OK", "1200"]);

        assert_eq!(mapping.value("status", &row), Some("OK"));
        assert_eq!(mapping.value("speed", &row), Some("1200"));
        assert_eq!(mapping.value("missing", &row), None);
        assert_eq!(mapping.value("unmapped", &row), None);
    }

    #[test]
    fn test_literal_sources() {
        let mapping: RowMapping = [("present", "1"), ("color", "")].into_iter().collect();
        let row = row(&["led"]);
        assert_eq!(mapping.value("present", &row), Some("1"));
        assert_eq!(mapping.value("color", &row), None);
    }

    #[test]
    fn test_json_form() {
        let mapping: RowMapping = serde_json::from_str(r#"{"status": "Column(1)"}"#).unwrap();
        assert_eq!(mapping.source("status"), Some("Column(1)"));
    }
}
