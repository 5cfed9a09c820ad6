//! Row filtering on the value of one column

use hs_error::Result;

use crate::pattern;
use crate::table::SourceTable;

use super::column_index;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Mode {
    KeepOnly,
    Exclude,
}

/// Keep or drop rows by a legacy pattern and by an explicit value set.
///
/// When both are given, a kept row must satisfy both predicates: for
/// `KeepOnly` the cell matches the pattern and is in the set, for `Exclude`
/// the cell neither matches the pattern nor is in the set. Rows too short to
/// hold the column are dropped in both modes.
pub(super) fn matching_lines(
    table: &mut SourceTable,
    mode: Mode,
    column: Option<usize>,
    legacy_pattern: Option<&str>,
    value_set: Option<&[String]>,
) -> Result<()> {
    let operation = match mode {
        Mode::KeepOnly => "KeepOnlyMatchingLines",
        Mode::Exclude => "ExcludeMatchingLines",
    };
    let index = column_index(operation, column)?;
    if table.is_empty() {
        return Ok(());
    }

    let regex = pattern::compile(legacy_pattern.unwrap_or_default())?;
    let value_set = value_set.filter(|set| !set.is_empty());

    let keep = |cell: &str| -> bool {
        let pattern_ok = regex.as_ref().map_or(true, |re| match mode {
            Mode::KeepOnly => re.is_match(cell),
            Mode::Exclude => !re.is_match(cell),
        });
        let set_ok = value_set.map_or(true, |set| {
            let contained = set.iter().any(|value| value == cell);
            match mode {
                Mode::KeepOnly => contained,
                Mode::Exclude => !contained,
            }
        });
        pattern_ok && set_ok
    };

    table.update_rows(|rows| {
        rows.retain(|row| row.get(index).map_or(false, |cell| keep(cell)));
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{run, table};
    use hs_connector::Compute;

    fn value_set(values: &[&str]) -> Option<Vec<String>> {
        Some(values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn test_keep_only_intersects_pattern_and_value_set() {
        let mut t = table(&[&["FOO", "1"], &["BAR", "2"], &["BAZ", "3"]]);
        run(
            &mut t,
            Compute::KeepOnlyMatchingLines {
                column: Some(1),
                pattern: Some("^B.*".into()),
                value_set: value_set(&["FOO", "BAR", "BAB"]),
            },
        );
        assert_eq!(t.rows(), table(&[&["BAR", "2"]]).rows());
    }

    #[test]
    fn test_exclude_removes_rows_matching_either() {
        let mut t = table(&[&["FOO"], &["BAR"], &["BAZ"], &["QUX"]]);
        run(
            &mut t,
            Compute::ExcludeMatchingLines {
                column: Some(1),
                pattern: Some("^BA".into()),
                value_set: value_set(&["FOO"]),
            },
        );
        assert_eq!(t.rows(), table(&[&["QUX"]]).rows());
    }

    #[test]
    fn test_pattern_is_case_insensitive_and_unanchored() {
        let mut t = table(&[&["Fan 1 ok"], &["Fan 2 FAILED"]]);
        run(
            &mut t,
            Compute::KeepOnlyMatchingLines {
                column: Some(1),
                pattern: Some("failed".into()),
                value_set: None,
            },
        );
        assert_eq!(t.rows(), table(&[&["Fan 2 FAILED"]]).rows());
    }

    #[test]
    fn test_short_rows_are_dropped() {
        let mut t = table(&[&["a", "1"], &["b"], &["c", "3"]]);
        run(
            &mut t,
            Compute::ExcludeMatchingLines {
                column: Some(2),
                pattern: None,
                value_set: value_set(&["3"]),
            },
        );
        assert_eq!(t.rows(), table(&[&["a", "1"]]).rows());

        let mut t = table(&[&["a", "x"], &["b", "y"], &["c"]]);
        run(
            &mut t,
            Compute::KeepOnlyMatchingLines {
                column: Some(2),
                pattern: Some("x".into()),
                value_set: None,
            },
        );
        assert_eq!(t.rows(), table(&[&["a", "x"]]).rows());
    }

    #[test]
    fn test_no_predicate_keeps_every_row() {
        let mut t = table(&[&["a", "1"], &["b", "2"]]);
        run(
            &mut t,
            Compute::KeepOnlyMatchingLines {
                column: Some(2),
                pattern: Some(String::new()),
                value_set: Some(Vec::new()),
            },
        );
        assert_eq!(t.rows(), table(&[&["a", "1"], &["b", "2"]]).rows());
    }
}
