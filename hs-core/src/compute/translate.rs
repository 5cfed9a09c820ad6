//! Translation table operations

use tracing::warn;

use hs_connector::TranslationTable;
use hs_error::{Result, SentryError};

use crate::constants::{compute as compute_const, table::CELL_SEPARATOR};
use crate::table::SourceTable;

use super::{column_index, required};

/// Replace each cell of a column by its translation. A translation holding
/// the cell separator turns into several columns.
pub(super) fn translate(
    table: &mut SourceTable,
    column: Option<usize>,
    translations: Option<&TranslationTable>,
) -> Result<()> {
    let index = column_index("Translate", column)?;
    let translations = required("Translate", "translation table", translations)?;

    let reshape = table.update_rows(|rows| {
        let mut reshape = false;
        for cell in rows.iter_mut().filter_map(|row| row.get_mut(index)) {
            match translations.translate(cell) {
                Some(translated) => {
                    reshape |= translated.contains(CELL_SEPARATOR);
                    *cell = translated.to_string();
                }
                None => warn!(
                    "Translation table {} has no entry for '{}' and no default",
                    translations.display_name(),
                    cell
                ),
            }
        }
        reshape
    });

    if reshape {
        table.reshape();
    }
    Ok(())
}

/// Translate every element of an array cell and join the non-blank results
pub(super) fn array_translate(
    table: &mut SourceTable,
    column: Option<usize>,
    translations: Option<&TranslationTable>,
    array_separator: Option<&str>,
    result_separator: Option<&str>,
) -> Result<()> {
    let index = column_index("ArrayTranslate", column)?;
    let translations = required("ArrayTranslate", "translation table", translations)?;
    let array_separator = array_separator
        .filter(|s| !s.is_empty())
        .unwrap_or(compute_const::DEFAULT_ARRAY_SEPARATOR);
    let result_separator = result_separator.unwrap_or(compute_const::DEFAULT_RESULT_SEPARATOR);

    if let Some(row) = table.rows().iter().find(|row| index >= row.len()) {
        return Err(SentryError::column_out_of_range(index + 1, row.len()));
    }

    table.update_rows(|rows| {
        for row in rows.iter_mut() {
            let translated = row[index]
                .split(array_separator)
                .filter_map(|element| translations.translate(element))
                .filter(|value| !value.trim().is_empty())
                .collect::<Vec<_>>()
                .join(result_separator);
            row[index] = translated;
        }
    });
    Ok(())
}

/// Translate the state of selected bits of an integer cell.
///
/// Keys of the table are `"<bit>,<0 or 1>"`; phrases are joined with `" - "`.
pub(super) fn per_bit_translation(
    table: &mut SourceTable,
    column: Option<usize>,
    translations: Option<&TranslationTable>,
    bit_list: Option<&[u32]>,
) -> Result<()> {
    let index = column_index("PerBitTranslation", column)?;
    let translations = required("PerBitTranslation", "bit translation table", translations)?;
    let bit_list = required("PerBitTranslation", "bit list", bit_list)?;

    let mut values = Vec::with_capacity(table.len());
    for row in table.rows() {
        let value = match row.get(index) {
            Some(cell) => Some(
                cell.trim()
                    .parse::<f64>()
                    .map(|v| v as i64)
                    .map_err(|_| SentryError::not_a_number(cell.as_str()))?,
            ),
            None => None,
        };
        values.push(value);
    }

    table.update_rows(|rows| {
        for (row, value) in rows.iter_mut().zip(values) {
            let Some(value) = value else {
                continue;
            };
            row[index] = bit_list
                .iter()
                .map(|bit| {
                    let state = value.checked_shr(*bit).map_or(0, |v| v & 1);
                    format!("{},{}", bit, state)
                })
                .filter_map(|key| translations.get(&key).map(str::to_string))
                .filter(|phrase| !phrase.trim().is_empty())
                .collect::<Vec<_>>()
                .join(compute_const::BIT_TRANSLATION_SEPARATOR);
        }
    });
    Ok(())
}
