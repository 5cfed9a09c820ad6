//! Column-level operations: extraction, concatenation, replacement and
//! reshaping of the table

use tracing::debug;

use hs_error::{Result, SentryError};

use crate::constants::{compute as compute_const, table::CELL_SEPARATOR};
use crate::table::SourceTable;
use crate::text::nth_argf;

use super::{column_index, column_reference, required, Operand};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Side {
    Left,
    Right,
}

/// Positive integer value of a literal or of a referenced cell
fn positive_integer(operation: &'static str, value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(SentryError::invalid_operation(
            operation,
            format!("'{}' is not a column number", value),
        )),
    }
}

/// Replace a cell by one of its sub-fields
pub(super) fn extract(
    table: &mut SourceTable,
    column: Option<usize>,
    sub_column: Option<&str>,
    sub_separators: Option<&str>,
) -> Result<()> {
    let index = column_index("Extract", column)?;
    let sub_column = Operand::parse("Extract", required("Extract", "sub-column", sub_column)?)?;
    let separators = required("Extract", "sub-separators", sub_separators)?;
    if separators.is_empty() {
        return Err(SentryError::invalid_operation("Extract", "sub-separators are empty"));
    }
    if let Operand::Literal(literal) = sub_column {
        positive_integer("Extract", literal)?;
    }

    let mut extracted = Vec::with_capacity(table.len());
    for row in table.rows() {
        let cell = row
            .get(index)
            .ok_or_else(|| SentryError::column_out_of_range(index + 1, row.len()))?;
        let selected = sub_column
            .resolve(row)
            .ok_or_else(|| SentryError::invalid_operation("Extract", "sub-column reference is out of range"))
            .and_then(|value| positive_integer("Extract", value))?;
        extracted.push(nth_argf(cell, &selected.to_string(), separators, None));
    }

    table.update_rows(|rows| {
        for (row, value) in rows.iter_mut().zip(extracted) {
            row[index] = value;
        }
    });
    Ok(())
}

/// Replace a WBEM object path such as
/// `CIM_Chassis.CreationClassName="CIM_Chassis",Tag="SYS-1"` by the value of
/// one of its keys. `Tag` matches both `Tag=` and `CIM_Chassis.Tag=`.
pub(super) fn extract_property_from_wbem_path(
    table: &mut SourceTable,
    column: Option<usize>,
    property_name: Option<&str>,
) -> Result<()> {
    let index = column_index("ExtractPropertyFromWbemPath", column)?;
    let property = required("ExtractPropertyFromWbemPath", "property name", property_name)?;
    let suffix = format!(".{}", property).to_lowercase();

    table.update_rows(|rows| {
        for cell in rows.iter_mut().filter_map(|row| row.get_mut(index)) {
            let value = cell
                .split(compute_const::WBEM_PATH_SEPARATOR)
                .filter_map(|pair| pair.split_once('='))
                .find(|(key, _)| {
                    key.len() >= property.len() && format!(".{}", key).to_lowercase().ends_with(&suffix)
                })
                .map(|(_, value)| value.replace('"', "").trim().to_string());
            if let Some(value) = value {
                *cell = value;
            }
        }
    });
    Ok(())
}

/// Keep the listed columns, in ascending order
pub(super) fn keep_columns(table: &mut SourceTable, column_numbers: Option<&[usize]>) -> Result<()> {
    let mut columns = required("KeepColumns", "column numbers", column_numbers)?.to_vec();
    if columns.is_empty() {
        return Err(SentryError::invalid_operation("KeepColumns", "column numbers are empty"));
    }
    columns.sort_unstable();

    let mut kept = Vec::with_capacity(table.len());
    for row in table.rows() {
        let mut new_row = Vec::with_capacity(columns.len());
        for &column in &columns {
            if column < 1 || column > row.len() {
                return Err(SentryError::column_out_of_range(column, row.len()));
            }
            new_row.push(row[column - 1].clone());
        }
        kept.push(new_row);
    }

    table.set_rows(kept);
    Ok(())
}

/// Insert a copy of a column right before it
pub(super) fn duplicate_column(table: &mut SourceTable, column: Option<usize>) -> Result<()> {
    let index = column_index("DuplicateColumn", column)?;

    table.update_rows(|rows| {
        for row in rows.iter_mut().filter(|row| index < row.len()) {
            let copy = row[index].clone();
            row.insert(index, copy);
        }
    });
    Ok(())
}

/// Concatenate a literal or another column to a column, or append a new
/// column holding the literal when `column` is one past the last column
pub(super) fn concat(
    table: &mut SourceTable,
    side: Side,
    column: Option<usize>,
    value: Option<&str>,
) -> Result<()> {
    let operation = match side {
        Side::Left => "LeftConcat",
        Side::Right => "RightConcat",
    };
    let index = column_index(operation, column)?;
    let value = required(operation, "value", value)?;
    if table.is_empty() {
        return Ok(());
    }
    let width = table.width();

    if index == width {
        table.update_rows(|rows| {
            for row in rows.iter_mut() {
                row.push(value.to_string());
            }
        });
    } else if index < width {
        let operand = Operand::parse(operation, value)?;
        if let Operand::Column(other) = operand {
            if other >= width {
                return Err(SentryError::column_out_of_range(other + 1, width));
            }
        }
        table.update_rows(|rows| {
            for row in rows.iter_mut() {
                let Some(other) = operand.resolve(row).map(str::to_string) else {
                    continue;
                };
                let Some(cell) = row.get_mut(index) else {
                    continue;
                };
                *cell = match side {
                    Side::Left => format!("{}{}", other, cell),
                    Side::Right => format!("{}{}", cell, other),
                };
            }
        });
    } else {
        return Err(SentryError::column_out_of_range(index + 1, width));
    }

    if column_reference(value).is_none() && value.contains(CELL_SEPARATOR) {
        table.reshape();
    }
    Ok(())
}

/// Replace occurrences of a literal or of another column's value
pub(super) fn replace(
    table: &mut SourceTable,
    column: Option<usize>,
    existing_value: Option<&str>,
    new_value: Option<&str>,
) -> Result<()> {
    let index = column_index("Replace", column)?;
    let existing = Operand::parse("Replace", required("Replace", "existing value", existing_value)?)?;
    let replacement = Operand::parse("Replace", required("Replace", "new value", new_value)?)?;

    table.update_rows(|rows| {
        for row in rows.iter_mut() {
            let (Some(from), Some(to)) = (
                existing.resolve(row).map(str::to_string),
                replacement.resolve(row).map(str::to_string),
            ) else {
                continue;
            };
            if from.is_empty() {
                continue;
            }
            if let Some(cell) = row.get_mut(index) {
                *cell = cell.replace(&from, &to);
            }
        }
    });

    // The replacement may hold the cell separator
    table.reshape();
    Ok(())
}

/// Characters `start..=end` of the cell, `start` counted from 1
pub(super) fn substring(
    table: &mut SourceTable,
    column: Option<usize>,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<()> {
    let index = column_index("Substring", column)?;
    let start = substring_bound("start", required("Substring", "start", start)?)?;
    let end = substring_bound("length", required("Substring", "length", end)?)?;

    table.update_rows(|rows| {
        for row in rows.iter_mut() {
            let begin = start.resolve(row).and_then(integer_value);
            let finish = end.resolve(row).and_then(integer_value);
            let Some(cell) = row.get_mut(index) else {
                continue;
            };
            let length = cell.chars().count();
            match (begin, finish) {
                (Some(begin), Some(finish)) if begin >= 1 && begin - 1 <= finish && finish <= length => {
                    *cell = cell.chars().skip(begin - 1).take(finish - (begin - 1)).collect();
                }
                _ => debug!(
                    "Substring bounds {:?}-{:?} rejected for '{}'",
                    begin, finish, cell
                ),
            }
        }
    });
    Ok(())
}

/// A `Column(n)` reference or a literal made of digits only
fn substring_bound<'a>(field: &str, value: &'a str) -> Result<Operand<'a>> {
    let operand = Operand::parse("Substring", value)?;
    match operand {
        Operand::Literal(literal)
            if literal.is_empty() || !literal.bytes().all(|b| b.is_ascii_digit()) =>
        {
            Err(SentryError::invalid_operation(
                "Substring",
                format!("{} '{}' is neither a number nor a column reference", field, value),
            ))
        }
        operand => Ok(operand),
    }
}

/// Integer part of `\d+(\.\d+)?`
fn integer_value(value: &str) -> Option<usize> {
    let value = value.trim();
    let integer = value.split_once('.').map_or(value, |(integer, fraction)| {
        if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            ""
        } else {
            integer
        }
    });
    if integer.is_empty() || !integer.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    integer.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{run, table};
    use hs_connector::Compute;

    fn substring(start: &str, end: &str) -> Compute {
        Compute::Substring {
            column: Some(1),
            start: Some(start.into()),
            length: Some(end.into()),
        }
    }

    #[test]
    fn test_substring() {
        let mut t = table(&[&["HelloWorld"]]);
        run(&mut t, substring("1", "5"));
        assert_eq!(t.rows(), table(&[&["Hello"]]).rows());
    }

    #[test]
    fn test_substring_rejects_inverted_bounds() {
        let mut t = table(&[&["HelloWorld"]]);
        run(&mut t, substring("6", "3"));
        assert_eq!(t.rows(), table(&[&["HelloWorld"]]).rows());
    }

    #[test]
    fn test_substring_rejects_out_of_range_bounds() {
        for (start, end) in [("0", "3"), ("1", "11")] {
            let mut t = table(&[&["HelloWorld"]]);
            run(&mut t, substring(start, end));
            assert_eq!(t.rows(), table(&[&["HelloWorld"]]).rows());
        }
    }

    #[test]
    fn test_substring_with_column_bounds() {
        let mut t = table(&[&["HelloWorld", "6", "10"], &["abc", "1", "9"]]);
        run(&mut t, substring("Column(2)", "Column(3)"));
        assert_eq!(
            t.rows(),
            table(&[&["World", "6", "10"], &["abc", "1", "9"]]).rows()
        );
    }

    #[test]
    fn test_extract() {
        let mut t = table(&[&["fan", "1200 rpm (nominal)"]]);
        run(
            &mut t,
            Compute::Extract {
                column: Some(2),
                sub_column: Some("1".into()),
                sub_separators: Some(" ".into()),
            },
        );
        assert_eq!(t.rows(), table(&[&["fan", "1200"]]).rows());
    }

    #[test]
    fn test_extract_with_column_reference() {
        let mut t = table(&[&["a,b,c", "3"], &["x,y", "1"]]);
        run(
            &mut t,
            Compute::Extract {
                column: Some(1),
                sub_column: Some("Column(2)".into()),
                sub_separators: Some(",".into()),
            },
        );
        assert_eq!(t.rows(), table(&[&["c", "3"], &["x", "1"]]).rows());
    }

    #[test]
    fn test_extract_property_from_wbem_path() {
        let mut t = table(&[
            &[r#"CIM_Chassis.CreationClassName="CIM_Chassis",Tag="SYS-1 ""#],
            &["no path here"],
        ]);
        run(
            &mut t,
            Compute::ExtractPropertyFromWbemPath {
                column: Some(1),
                property_name: Some("tag".into()),
            },
        );
        assert_eq!(t.rows(), table(&[&["SYS-1"], &["no path here"]]).rows());
    }

    #[test]
    fn test_wbem_key_with_class_prefix() {
        let mut t = table(&[&[r#"ACME_Fan.DeviceID="FAN-2",SystemName="host""#]]);
        run(
            &mut t,
            Compute::ExtractPropertyFromWbemPath {
                column: Some(1),
                property_name: Some("DeviceID".into()),
            },
        );
        assert_eq!(t.rows(), table(&[&["FAN-2"]]).rows());
    }

    #[test]
    fn test_keep_columns_are_sorted() {
        let mut t = table(&[&["a", "b", "c", "d"]]);
        run(
            &mut t,
            Compute::KeepColumns {
                column_numbers: Some(vec![4, 2]),
            },
        );
        assert_eq!(t.rows(), table(&[&["b", "d"]]).rows());
    }

    #[test]
    fn test_duplicate_column() {
        let mut t = table(&[&["a", "b", "c"], &["d"]]);
        run(&mut t, Compute::DuplicateColumn { column: Some(2) });
        assert_eq!(t.rows(), table(&[&["a", "b", "b", "c"], &["d"]]).rows());
    }

    #[test]
    fn test_duplicate_column_out_of_range() {
        let mut t = table(&[&["a", "b"]]);
        run(&mut t, Compute::DuplicateColumn { column: Some(3) });
        assert_eq!(t.rows(), table(&[&["a", "b"]]).rows());
    }

    #[test]
    fn test_concat_literal() {
        let mut t = table(&[&["1200", "fan"]]);
        run(
            &mut t,
            Compute::RightConcat {
                column: Some(1),
                value: Some(" rpm".into()),
            },
        );
        run(
            &mut t,
            Compute::LeftConcat {
                column: Some(2),
                value: Some("cpu ".into()),
            },
        );
        assert_eq!(t.rows(), table(&[&["1200 rpm", "cpu fan"]]).rows());
    }

    #[test]
    fn test_concat_column_reference() {
        let mut t = table(&[&["Fan", "1"]]);
        run(
            &mut t,
            Compute::RightConcat {
                column: Some(1),
                value: Some("Column(2)".into()),
            },
        );
        assert_eq!(t.rows(), table(&[&["Fan1", "1"]]).rows());
    }

    #[test]
    fn test_concat_with_separator_creates_columns() {
        let mut t = table(&[&["a", "b"], &["c", "d"]]);
        run(
            &mut t,
            Compute::RightConcat {
                column: Some(1),
                value: Some(";new".into()),
            },
        );
        assert_eq!(t.rows(), table(&[&["a", "new", "b"], &["c", "new", "d"]]).rows());
        assert_eq!(t.width(), 3);
    }

    #[test]
    fn test_concat_to_a_new_column() {
        let mut t = table(&[&["a"], &["b"]]);
        run(
            &mut t,
            Compute::LeftConcat {
                column: Some(2),
                value: Some("enclosure".into()),
            },
        );
        assert_eq!(t.rows(), table(&[&["a", "enclosure"], &["b", "enclosure"]]).rows());
    }

    #[test]
    fn test_replace() {
        let mut t = table(&[&["1,2,3", "x"]]);
        run(
            &mut t,
            Compute::Replace {
                column: Some(1),
                existing_value: Some(",".into()),
                new_value: Some(";".into()),
            },
        );
        assert_eq!(t.rows(), table(&[&["1", "2", "3", "x"]]).rows());
    }

    #[test]
    fn test_replace_with_column_references() {
        let mut t = table(&[&["speed is X", "X", "1200"]]);
        run(
            &mut t,
            Compute::Replace {
                column: Some(1),
                existing_value: Some("Column(2)".into()),
                new_value: Some("Column(3)".into()),
            },
        );
        assert_eq!(t.rows(), table(&[&["speed is 1200", "X", "1200"]]).rows());
    }
}
