//! Arithmetic operations
//!
//! The operand is a non-negative decimal literal or a `Column(n)` reference.
//! Blank cells, non-numeric cells and rows too short for the target or the
//! referenced column are left as they are.

use hs_error::{Result, SentryError};

use crate::table::SourceTable;

use super::{column_index, required, Operand};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Arithmetic {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Arithmetic {
    fn name(&self) -> &'static str {
        match self {
            Arithmetic::Add => "Add",
            Arithmetic::Subtract => "Subtract",
            Arithmetic::Multiply => "Multiply",
            Arithmetic::Divide => "Divide",
        }
    }

    /// `None` when the result must not be written (division by zero)
    fn apply(&self, lhs: f64, rhs: f64) -> Option<f64> {
        match self {
            Arithmetic::Add => Some(lhs + rhs),
            Arithmetic::Subtract => Some(lhs - rhs),
            Arithmetic::Multiply => Some(lhs * rhs),
            Arithmetic::Divide if rhs == 0.0 => None,
            Arithmetic::Divide => Some(lhs / rhs),
        }
    }
}

/// `\d+(\.\d+)?`
fn is_decimal_literal(value: &str) -> bool {
    let (integer, fraction) = match value.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (value, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(integer) && fraction.map_or(true, all_digits)
}

fn parse_number(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok()
}

/// Render a computed number; integral values have no fractional part
pub(super) fn format_number(value: f64) -> String {
    value.to_string()
}

pub(super) fn arithmetic(
    table: &mut SourceTable,
    kind: Arithmetic,
    column: Option<usize>,
    operand: Option<&str>,
) -> Result<()> {
    let operation = kind.name();
    let index = column_index(operation, column)?;
    let operand = Operand::parse(operation, required(operation, "operand", operand)?)?;

    if let Operand::Literal(literal) = operand {
        if !is_decimal_literal(literal) {
            return Err(SentryError::not_a_number(literal));
        }
    }

    table.update_rows(|rows| {
        for row in rows.iter_mut() {
            let Some(lhs) = row.get(index).and_then(|cell| parse_number(cell)) else {
                continue;
            };
            let Some(rhs) = operand.resolve(row).and_then(parse_number) else {
                continue;
            };
            if let Some(result) = kind.apply(lhs, rhs) {
                row[index] = format_number(result);
            }
        }
    });
    Ok(())
}

/// Bitwise AND between the integer parts of the cell and of the operand
pub(super) fn bitwise_and(table: &mut SourceTable, column: Option<usize>, operand: Option<&str>) -> Result<()> {
    let index = column_index("And", column)?;
    let operand = Operand::parse("And", required("And", "operand", operand)?)?;

    if let Operand::Literal(literal) = operand {
        if parse_number(literal).is_none() {
            return Err(SentryError::not_a_number(literal));
        }
    }

    table.update_rows(|rows| {
        for row in rows.iter_mut() {
            let Some(lhs) = row.get(index).and_then(|cell| parse_number(cell)) else {
                continue;
            };
            let Some(rhs) = operand.resolve(row).and_then(parse_number) else {
                continue;
            };
            row[index] = ((lhs as i64) & (rhs as i64)).to_string();
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{run, table};
    use hs_connector::Compute;

    fn add(column: usize, add: &str) -> Compute {
        Compute::Add {
            column: Some(column),
            add: Some(add.to_string()),
        }
    }

    #[test]
    fn test_add_literal() {
        let mut t = table(&[&["fan1", "10"], &["fan2", "2.5"]]);
        run(&mut t, add(2, "5"));
        assert_eq!(t.rows(), table(&[&["fan1", "15"], &["fan2", "7.5"]]).rows());
        assert_eq!(t.raw_text(), Some("fan1;15;\nfan2;7.5;"));
    }

    #[test]
    fn test_operand_from_another_column() {
        let mut t = table(&[&["100", "4"], &["90", ""]]);
        run(
            &mut t,
            Compute::Subtract {
                column: Some(1),
                subtract: Some("Column(2)".into()),
            },
        );
        assert_eq!(t.rows(), table(&[&["96", "4"], &["90", ""]]).rows());
    }

    #[test]
    fn test_blank_and_non_numeric_cells_are_skipped() {
        let mut t = table(&[&["a", ""], &["b", "n/a"], &["c", "3"]]);
        run(
            &mut t,
            Compute::Multiply {
                column: Some(2),
                multiply_by: Some("2".into()),
            },
        );
        assert_eq!(t.rows(), table(&[&["a", ""], &["b", "n/a"], &["c", "6"]]).rows());
    }

    #[test]
    fn test_divide_by_zero_leaves_the_cell() {
        let mut t = table(&[&["10", "0"], &["10", "4"]]);
        run(
            &mut t,
            Compute::Divide {
                column: Some(1),
                divide_by: Some("Column(2)".into()),
            },
        );
        assert_eq!(t.rows(), table(&[&["10", "0"], &["2.5", "4"]]).rows());

        let mut t = table(&[&["10"]]);
        run(
            &mut t,
            Compute::Divide {
                column: Some(1),
                divide_by: Some("0".into()),
            },
        );
        assert_eq!(t.rows(), table(&[&["10"]]).rows());
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let mut t = table(&[&["1", "2"], &["3"]]);
        run(&mut t, add(2, "1"));
        assert_eq!(t.rows(), table(&[&["1", "3"], &["3"]]).rows());
    }

    #[test]
    fn test_non_numeric_literal_is_rejected() {
        let original = table(&[&["1"]]);
        for operand in ["-1", "abc", "1e3", ""] {
            let mut t = original.clone();
            run(&mut t, add(1, operand));
            assert_eq!(t, original, "operand {:?}", operand);
        }
    }

    #[test]
    fn test_bitwise_and() {
        let mut t = table(&[&["13", "4"], &["255.0", "x"]]);
        run(
            &mut t,
            Compute::And {
                column: Some(1),
                and: Some("6".into()),
            },
        );
        assert_eq!(t.rows(), table(&[&["4", "4"], &["6", "x"]]).rows());
    }

    #[test]
    fn test_decimal_literal() {
        assert!(super::is_decimal_literal("12"));
        assert!(super::is_decimal_literal("0.25"));
        assert!(!super::is_decimal_literal("1."));
        assert!(!super::is_decimal_literal(".5"));
        assert!(!super::is_decimal_literal("-1"));
    }
}
