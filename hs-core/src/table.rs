//! Source tables
//!
//! A `SourceTable` is the intermediate form every protocol result goes through
//! before parameters are collected: a list of rows of string cells, plus the
//! raw text the rows were read from or serialize to.
//!
//! # Canonical serialization
//!
//! Every cell is followed by `;` and rows are joined with `\n`:
//!
//! ```text
//! fan1;1200;OK;
//! fan2;0;ALARM;
//! ```
//!
//! Parsing skips blank lines, drops one trailing `;` per line and keeps empty
//! cells, so `a;;b;` reads back as `["a", "", "b"]`.

use serde::{Deserialize, Serialize};

use crate::constants::table::{CELL_SEPARATOR, ROW_SEPARATOR};

/// Rows of string cells with their raw text representation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTable {
    rows: Vec<Vec<String>>,
    raw_text: Option<String>,
}

impl SourceTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table built from rows; the raw text is their canonical serialization
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let raw_text = table_to_text(&rows);
        Self {
            rows,
            raw_text: Some(raw_text),
        }
    }

    /// Table built from protocol output. The text is kept verbatim as the raw
    /// text so that script transforms see exactly what the device returned.
    pub fn from_raw_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            rows: text_to_rows(&text),
            raw_text: Some(text),
        }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    /// Raw text, if the table was read from or serialized to text
    pub fn raw_text(&self) -> Option<&str> {
        self.raw_text.as_deref()
    }

    /// Raw text when present, otherwise the canonical serialization of the rows
    pub fn text(&self) -> String {
        match &self.raw_text {
            Some(text) => text.clone(),
            None => table_to_text(&self.rows),
        }
    }

    /// Replace the rows and regenerate the raw text
    pub fn set_rows(&mut self, rows: Vec<Vec<String>>) {
        self.raw_text = Some(table_to_text(&rows));
        self.rows = rows;
    }

    /// Replace the raw text and regenerate the rows
    pub fn set_raw_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.rows = text_to_rows(&text);
        self.raw_text = Some(text);
    }

    /// Mutate the rows in place, then regenerate the raw text
    pub fn update_rows<T>(&mut self, f: impl FnOnce(&mut Vec<Vec<String>>) -> T) -> T {
        let result = f(&mut self.rows);
        self.raw_text = Some(table_to_text(&self.rows));
        result
    }

    /// Serialize then parse the rows again so that cells holding the cell
    /// separator become genuine columns
    pub fn reshape(&mut self) {
        let text = table_to_text(&self.rows);
        self.set_raw_text(text);
    }

    /// Number of cells of the first row
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Remove every row and the raw text content
    pub fn clear(&mut self) {
        self.rows.clear();
        self.raw_text = Some(String::new());
    }
}

impl From<Vec<Vec<&str>>> for SourceTable {
    fn from(rows: Vec<Vec<&str>>) -> Self {
        Self::from_rows(
            rows.into_iter()
                .map(|row| row.into_iter().map(str::to_string).collect())
                .collect(),
        )
    }
}

/// Canonical serialization of rows
pub fn table_to_text(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| {
            let mut line = String::new();
            for cell in row {
                line.push_str(cell);
                line.push_str(CELL_SEPARATOR);
            }
            line
        })
        .collect::<Vec<_>>()
        .join(ROW_SEPARATOR)
}

/// Parse text in the canonical serialization into rows
pub fn text_to_rows(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line_to_cells(line, CELL_SEPARATOR))
        .collect()
}

/// Split one line into cells, ignoring a single trailing separator
pub fn line_to_cells(line: &str, separator: &str) -> Vec<String> {
    let line = line.strip_suffix(separator).unwrap_or(line);
    line.split(separator).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_canonical_serialization() {
        let table = SourceTable::from_rows(rows(&[&["a", "b"], &["c", ""]]));
        assert_eq!(table.raw_text(), Some("a;b;\nc;;"));
    }

    #[test]
    fn test_round_trip() {
        let original = rows(&[&["fan1", "1200", "OK"], &["fan2", "", "ALARM"], &["", "", ""]]);
        let parsed = text_to_rows(&table_to_text(&original));
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_serialization_is_idempotent() {
        let text = "x;1;\ny;2;";
        let once = table_to_text(&text_to_rows(text));
        let twice = table_to_text(&text_to_rows(&once));
        assert_eq!(once, text);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let parsed = text_to_rows("a;b\n\n   \nc;d;\r\n");
        assert_eq!(parsed, rows(&[&["a", "b"], &["c", "d"]]));
    }

    #[test]
    fn test_only_one_trailing_separator_is_dropped() {
        assert_eq!(line_to_cells("a;;", ";"), vec!["a", ""]);
        assert_eq!(line_to_cells("a", ";"), vec!["a"]);
    }

    #[test]
    fn test_raw_text_is_kept_verbatim() {
        let table = SourceTable::from_raw_text("Fan 1  OK\nFan 2  FAILED\n");
        assert_eq!(table.raw_text(), Some("Fan 1  OK\nFan 2  FAILED\n"));
        assert_eq!(table.len(), 2);
        assert_eq!(table.width(), 1);
    }

    #[test]
    fn test_update_rows_keeps_text_consistent() {
        let mut table = SourceTable::from(vec![vec!["1", "2"]]);
        table.update_rows(|rows| rows[0].push("3".to_string()));
        assert_eq!(table.raw_text(), Some("1;2;3;"));
        assert_eq!(text_to_rows(&table.text()), table.rows());
    }

    #[test]
    fn test_reshape_splits_cells_holding_the_separator() {
        let mut table = SourceTable::from(vec![vec!["a;b", "c"]]);
        table.reshape();
        assert_eq!(table.rows(), rows(&[&["a", "b", "c"]]).as_slice());
    }

    #[test]
    fn test_clear() {
        let mut table = SourceTable::from(vec![vec!["a"]]);
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.text(), "");
    }
}
