//! Convert operation

use tracing::debug;

use hs_connector::ConversionType;
use hs_error::{Result, SentryError};

use crate::constants::compute::STATUS_ARRAY_SEPARATORS;
use crate::table::SourceTable;

use super::column_index;

pub(super) fn convert(
    table: &mut SourceTable,
    column: Option<usize>,
    conversion: Option<ConversionType>,
) -> Result<()> {
    let index = column_index("Convert", column)?;
    let conversion = conversion
        .ok_or_else(|| SentryError::invalid_operation("Convert", "conversion type is missing"))?;

    table.update_rows(|rows| {
        for row in rows.iter_mut() {
            let Some(cell) = row.get_mut(index) else {
                continue;
            };
            let converted = match conversion {
                ConversionType::Hex2Dec => hex_to_decimal(cell),
                ConversionType::Array2SimpleStatus => Some(worst_status(cell).to_string()),
            };
            match converted {
                Some(value) => *cell = value,
                None => debug!("Could not convert '{}' with {:?}", cell, conversion),
            }
        }
    });
    Ok(())
}

/// `0x1F`, `1f:00`, `0A 0B` to decimal. `None` when the value is not hexadecimal
fn hex_to_decimal(value: &str) -> Option<String> {
    let digits: String = value
        .replace("0x", "")
        .chars()
        .filter(|c| *c != ':' && !c.is_whitespace())
        .collect();

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u64::from_str_radix(&digits, 16).ok().map(|n| n.to_string())
}

/// Worst of the OK, WARN and ALARM tokens of a `|` or newline separated array,
/// UNKNOWN when none is present
pub(crate) fn worst_status(value: &str) -> &'static str {
    let mut status = "UNKNOWN";
    for token in value.split(STATUS_ARRAY_SEPARATORS).map(str::trim) {
        if token.eq_ignore_ascii_case("ALARM") {
            return "ALARM";
        } else if token.eq_ignore_ascii_case("WARN") {
            status = "WARN";
        } else if token.eq_ignore_ascii_case("OK") && status == "UNKNOWN" {
            status = "OK";
        }
    }
    status
}
