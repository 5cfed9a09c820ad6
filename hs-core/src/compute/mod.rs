//! Compute pipeline
//!
//! `ComputeExecutor::apply` runs the compute operations of a source over its
//! table, in order. Each operation is fail-soft: an operation that is
//! malformed, references a column that does not exist or meets a value it
//! cannot process is logged and the table is restored to what it was before
//! that operation. The pipeline always moves on to the next operation.
//!
//! # Module Structure
//!
//! - `math` - Add, Subtract, Multiply, Divide, And
//! - `convert` - Hex2Dec and Array2SimpleStatus conversions
//! - `translate` - Translate, ArrayTranslate, PerBitTranslation
//! - `columns` - Extract, concatenation, Replace, Substring and column reshaping
//! - `filter` - KeepOnlyMatchingLines, ExcludeMatchingLines
//! - `external` - Script and structured-data transforms and their collaborator

mod columns;
mod convert;
mod external;
mod filter;
mod math;
mod translate;

use std::sync::Arc;

use tracing::{debug, error, warn};

use hs_connector::Compute;
use hs_error::{Result, SentryError};

use crate::table::SourceTable;

pub use external::{DefaultTextProcessor, TextProcessor};

#[cfg(test)]
pub use external::MockTextProcessor;

/// Where a pipeline runs, for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputeContext {
    pub hostname: String,
    pub connector: String,
    /// Key of the source whose table is transformed, e.g. `enclosure.collect.source(1)`
    pub source_key: String,
}

impl ComputeContext {
    pub fn new(
        hostname: impl Into<String>,
        connector: impl Into<String>,
        source_key: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            connector: connector.into(),
            source_key: source_key.into(),
        }
    }

    /// `"<source>.compute(<index>)"`, index starting at 1
    pub fn compute_key(&self, index: usize) -> String {
        format!("{}.compute({})", self.source_key, index)
    }
}

/// Runs compute operations over source tables
#[derive(Clone)]
pub struct ComputeExecutor {
    context: ComputeContext,
    processor: Arc<dyn TextProcessor>,
}

impl ComputeExecutor {
    pub fn new(context: ComputeContext, processor: Arc<dyn TextProcessor>) -> Self {
        Self { context, processor }
    }

    pub fn context(&self) -> &ComputeContext {
        &self.context
    }

    /// Apply every operation, in order. Never fails: a failing operation
    /// leaves the table as it was before that operation.
    pub fn apply<'t>(&self, table: &'t mut SourceTable, computes: &[Compute]) -> &'t mut SourceTable {
        for (index, compute) in computes.iter().enumerate() {
            let key = self.context.compute_key(index + 1);
            let snapshot = table.clone();

            match self.execute(table, compute) {
                Ok(()) => debug!(
                    "Hostname {} - Compute operation [{}] ({}) applied, {} rows",
                    self.context.hostname,
                    key,
                    compute.name(),
                    table.len()
                ),
                Err(e) => {
                    *table = snapshot;
                    self.report(&key, compute, &e);
                }
            }
        }
        table
    }

    fn execute(&self, table: &mut SourceTable, compute: &Compute) -> Result<()> {
        let processor = self.processor.as_ref();
        match compute {
            Compute::Add { column, add } => math::arithmetic(table, math::Arithmetic::Add, *column, add.as_deref()),
            Compute::Subtract { column, subtract } => {
                math::arithmetic(table, math::Arithmetic::Subtract, *column, subtract.as_deref())
            }
            Compute::Multiply { column, multiply_by } => {
                math::arithmetic(table, math::Arithmetic::Multiply, *column, multiply_by.as_deref())
            }
            Compute::Divide { column, divide_by } => {
                math::arithmetic(table, math::Arithmetic::Divide, *column, divide_by.as_deref())
            }
            Compute::And { column, and } => math::bitwise_and(table, *column, and.as_deref()),
            Compute::Convert { column, conversion } => convert::convert(table, *column, *conversion),
            Compute::Translate {
                column,
                translation_table,
            } => translate::translate(table, *column, translation_table.as_ref()),
            Compute::ArrayTranslate {
                column,
                translation_table,
                array_separator,
                result_separator,
            } => translate::array_translate(
                table,
                *column,
                translation_table.as_ref(),
                array_separator.as_deref(),
                result_separator.as_deref(),
            ),
            Compute::PerBitTranslation {
                column,
                bit_translation_table,
                bit_list,
            } => translate::per_bit_translation(
                table,
                *column,
                bit_translation_table.as_ref(),
                bit_list.as_deref(),
            ),
            Compute::Extract {
                column,
                sub_column,
                sub_separators,
            } => columns::extract(table, *column, sub_column.as_deref(), sub_separators.as_deref()),
            Compute::ExtractPropertyFromWbemPath {
                column,
                property_name,
            } => columns::extract_property_from_wbem_path(table, *column, property_name.as_deref()),
            Compute::KeepColumns { column_numbers } => columns::keep_columns(table, column_numbers.as_deref()),
            Compute::DuplicateColumn { column } => columns::duplicate_column(table, *column),
            Compute::LeftConcat { column, value } => {
                columns::concat(table, columns::Side::Left, *column, value.as_deref())
            }
            Compute::RightConcat { column, value } => {
                columns::concat(table, columns::Side::Right, *column, value.as_deref())
            }
            Compute::Replace {
                column,
                existing_value,
                new_value,
            } => columns::replace(table, *column, existing_value.as_deref(), new_value.as_deref()),
            Compute::Substring {
                column,
                start,
                length,
            } => columns::substring(table, *column, start.as_deref(), length.as_deref()),
            Compute::KeepOnlyMatchingLines {
                column,
                pattern,
                value_set,
            } => filter::matching_lines(
                table,
                filter::Mode::KeepOnly,
                *column,
                pattern.as_deref(),
                value_set.as_deref(),
            ),
            Compute::ExcludeMatchingLines {
                column,
                pattern,
                value_set,
            } => filter::matching_lines(
                table,
                filter::Mode::Exclude,
                *column,
                pattern.as_deref(),
                value_set.as_deref(),
            ),
            Compute::Awk {
                script,
                exclude,
                keep_only,
                separators,
                select_columns,
            } => external::awk(
                table,
                processor,
                external::AwkOptions {
                    script: script.as_deref(),
                    exclude: exclude.as_deref(),
                    keep_only: keep_only.as_deref(),
                    separators: separators.as_deref(),
                    select_columns: select_columns.as_deref(),
                },
            ),
            Compute::Json2Csv {
                entry_key,
                properties,
                separator,
            } => external::json_to_csv(
                table,
                processor,
                entry_key.as_deref(),
                properties.as_deref(),
                separator.as_deref(),
            ),
            Compute::Xml2Csv {
                record_tag,
                properties,
            } => external::xml_to_csv(table, processor, record_tag.as_deref(), properties.as_deref()),
        }
    }

    fn report(&self, key: &str, compute: &Compute, e: &SentryError) {
        match e {
            SentryError::Script(_) | SentryError::StructuredParse(_) | SentryError::Timeout(_) => {
                error!(
                    "Hostname {} - Compute operation [{}] ({}) has failed. Connector [{}]. The table remains unchanged: {}",
                    self.context.hostname,
                    key,
                    compute.name(),
                    self.context.connector,
                    e
                )
            }
            _ => warn!(
                "Hostname {} - Compute operation [{}] ({}) skipped. Connector [{}]. The table remains unchanged: {}",
                self.context.hostname,
                key,
                compute.name(),
                self.context.connector,
                e
            ),
        }
    }
}

// ============================================================================
// Operand helpers shared by the operations
// ============================================================================

/// 1-based column number of a `Column(n)` reference, case-insensitive
pub(crate) fn column_reference(value: &str) -> Option<usize> {
    let value = value.trim();
    let prefix = value.get(..7)?;
    if !prefix.eq_ignore_ascii_case("column(") {
        return None;
    }
    let digits = value[7..].strip_suffix(')')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// A literal or a reference to another cell of the same row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand<'a> {
    /// 0-based column index
    Column(usize),
    Literal(&'a str),
}

impl<'a> Operand<'a> {
    fn parse(operation: &'static str, value: &'a str) -> Result<Self> {
        match column_reference(value) {
            Some(0) => Err(SentryError::invalid_operation(
                operation,
                format!("column reference '{}' must be at least Column(1)", value),
            )),
            Some(n) => Ok(Operand::Column(n - 1)),
            None => Ok(Operand::Literal(value)),
        }
    }

    /// Value of the operand for a row; `None` when the referenced column does not exist
    fn resolve<'r>(&'r self, row: &'r [String]) -> Option<&'r str> {
        match self {
            Operand::Column(index) => row.get(*index).map(String::as_str),
            Operand::Literal(value) => Some(*value),
        }
    }
}

/// 0-based index of a required 1-based column
fn column_index(operation: &'static str, column: Option<usize>) -> Result<usize> {
    match column {
        Some(column) if column >= 1 => Ok(column - 1),
        Some(column) => Err(SentryError::invalid_operation(
            operation,
            format!("column {} must be at least 1", column),
        )),
        None => Err(SentryError::invalid_operation(operation, "column is missing")),
    }
}

/// A required operation field
fn required<'a, T: ?Sized>(operation: &'static str, field: &str, value: Option<&'a T>) -> Result<&'a T> {
    value.ok_or_else(|| SentryError::invalid_operation(operation, format!("{} is missing", field)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn table(rows: &[&[&str]]) -> SourceTable {
        SourceTable::from_rows(
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    pub fn executor() -> ComputeExecutor {
        executor_with(MockTextProcessor::new())
    }

    pub fn executor_with(processor: MockTextProcessor) -> ComputeExecutor {
        ComputeExecutor::new(
            ComputeContext::new("host-01", "TestConnector", "enclosure.collect.source(1)"),
            Arc::new(processor),
        )
    }

    /// Run a single operation
    pub fn run(table: &mut SourceTable, compute: Compute) {
        executor().apply(table, &[compute]);
    }
}
