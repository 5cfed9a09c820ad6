//! Text selection helpers
//!
//! Column selection over free text, as used by Extract and by the
//! post-processing of script transforms.

use tracing::warn;

use hs_error::Result;

use crate::constants::{table::CELL_SEPARATOR, text as text_const};
use crate::pattern;

/// Select fields out of every line of `text`.
///
/// Each line is split on any of the characters of `separators`, keeping empty
/// fields. `select` is a comma list of `n`, `m-n`, `m-` or `-n` (1-based,
/// inclusive). The selected fields of all lines are joined with
/// `result_separator`, which defaults to a space. Invalid selections are
/// skipped.
pub fn nth_argf(text: &str, select: &str, separators: &str, result_separator: Option<&str>) -> String {
    if text.is_empty() || select.is_empty() || separators.is_empty() {
        return String::new();
    }
    let result_separator = result_separator.unwrap_or(text_const::DEFAULT_RESULT_SEPARATOR);

    // Trailing empty lines do not produce fields
    let mut lines: Vec<&str> = text.split('\n').collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    lines
        .into_iter()
        .flat_map(|line| select_fields(line, select, separators, result_separator))
        .collect::<Vec<_>>()
        .join(result_separator)
}

/// Apply a selection to one line, one result per selection group
fn select_fields(line: &str, select: &str, separators: &str, result_separator: &str) -> Vec<String> {
    let fields: Vec<&str> = line.split(|c| separators.contains(c)).collect();

    select
        .split(',')
        .filter_map(|group| column_range(group.trim(), fields.len()))
        .map(|(from, to)| fields[from - 1..to].join(result_separator))
        .collect()
}

/// Resolve `n`, `m-n`, `m-` or `-n` to an inclusive 1-based range
fn column_range(group: &str, count: usize) -> Option<(usize, usize)> {
    let parsed = match group.find('-') {
        None => group.parse::<usize>().ok().map(|n| (n, n)),
        Some(0) => group[1..].parse::<usize>().ok().map(|n| (1, n)),
        Some(dash) if dash == group.len() - 1 => {
            group[..dash].parse::<usize>().ok().map(|n| (n, count))
        }
        Some(dash) => {
            let from = group[..dash].parse::<usize>().ok();
            let to = group[dash + 1..].parse::<usize>().ok();
            from.zip(to).map(|(from, to)| (from, to.min(count)))
        }
    };

    let Some((from, to)) = parsed else {
        warn!("Could not determine the column range denoted by '{}'", group);
        return None;
    };

    if from > count || to > count {
        warn!(
            "Invalid column range for a {}-field line: [{}-{}]",
            count, from, to
        );
        return None;
    }

    (from > 0 && from <= to).then_some((from, to))
}

/// Drop lines matching `exclude`, then keep only lines matching `keep_only`.
/// Both are legacy patterns; an empty or absent pattern does not filter.
pub fn filter_lines(
    lines: Vec<String>,
    exclude: Option<&str>,
    keep_only: Option<&str>,
) -> Result<Vec<String>> {
    let exclude = pattern::compile(exclude.unwrap_or_default())?;
    let keep_only = pattern::compile(keep_only.unwrap_or_default())?;

    Ok(lines
        .into_iter()
        .filter(|line| exclude.as_ref().map_or(true, |re| !re.is_match(line)))
        .filter(|line| keep_only.as_ref().map_or(true, |re| re.is_match(line)))
        .collect())
}

/// Select columns of every line, joining the selected fields with the table
/// cell separator. Lines are returned unchanged when either argument is empty.
pub fn select_columns(lines: Vec<String>, separators: Option<&str>, select: Option<&str>) -> Vec<String> {
    let (Some(separators), Some(select)) = (
        separators.filter(|s| !s.is_empty()),
        select.filter(|s| !s.trim().is_empty()),
    ) else {
        return lines;
    };

    lines
        .iter()
        .map(|line| nth_argf(line, select, separators, Some(CELL_SEPARATOR)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_column() {
        assert_eq!(nth_argf("a b c", "2", " ", None), "b");
    }

    #[test]
    fn test_ranges() {
        assert_eq!(nth_argf("a,b,c,d", "2-3", ",", Some(";")), "b;c");
        assert_eq!(nth_argf("a,b,c,d", "3-", ",", Some(";")), "c;d");
        assert_eq!(nth_argf("a,b,c,d", "-2", ",", Some(";")), "a;b");
        assert_eq!(nth_argf("a,b,c,d", "1,4", ",", Some(";")), "a;d");
    }

    #[test]
    fn test_range_end_is_clamped() {
        assert_eq!(nth_argf("a,b,c", "2-9", ",", Some("|")), "b|c");
    }

    #[test]
    fn test_out_of_range_selection_is_skipped() {
        assert_eq!(nth_argf("a,b", "5", ",", None), "");
        assert_eq!(nth_argf("a,b", "x", ",", None), "");
    }

    #[test]
    fn test_multiple_separators_keep_empty_fields() {
        assert_eq!(nth_argf("a:b;;c", "4", ":;", None), "c");
        assert_eq!(nth_argf("a:b;;c", "3", ":;", None), "");
    }

    #[test]
    fn test_every_line_is_processed() {
        assert_eq!(nth_argf("a b\nc d\n", "2", " ", Some("|")), "b|d");
    }

    #[test]
    fn test_filter_lines() {
        let lines = vec!["fan1 ok".to_string(), "# comment".to_string(), "fan2 failed".to_string()];
        let kept = filter_lines(lines, Some("^#"), Some("fan")).unwrap();
        assert_eq!(kept, vec!["fan1 ok", "fan2 failed"]);
    }

    #[test]
    fn test_select_columns() {
        let lines = vec!["fan1 1200 ok".to_string()];
        assert_eq!(select_columns(lines.clone(), Some(" "), Some("1,3")), vec!["fan1;ok"]);
        assert_eq!(select_columns(lines.clone(), None, Some("1")), lines);
    }
}
