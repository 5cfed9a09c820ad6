//! Script and structured-data transforms
//!
//! These operations hand the table text to a `TextProcessor` and read the
//! table back from its output. The default processor embeds a rhai engine
//! for scripts, flattens JSON with serde_json and XML with roxmltree.

use std::time::{Duration, Instant};

use rhai::{Dynamic, Engine, EvalAltResult, Scope};
use serde_json::Value;
use tracing::debug;

use hs_error::{Result, SentryError};

use crate::constants::{compute as compute_const, defaults, table::CELL_SEPARATOR, text as text_const};
use crate::settings::EngineSettings;
use crate::table::{line_to_cells, SourceTable};
use crate::text;

use super::required;

// ============================================================================
// Collaborator interface
// ============================================================================

/// Text processing primitives the pipeline delegates to.
///
/// Implementations must be pure functions of their inputs and must return
/// `SentryError::Timeout` rather than block past their deadline.
#[cfg_attr(test, mockall::automock)]
pub trait TextProcessor: Send + Sync {
    /// Run a script over the input text and return its output text
    fn run_script(&self, script: &str, input: &str) -> Result<String>;

    /// Flatten a JSON document into separator-terminated lines, one per record
    fn json_to_table(&self, json: &str, entry_key: &str, properties: &[String], separator: &str) -> Result<String>;

    /// Flatten an XML document into rows, one per record element
    fn xml_to_table(&self, xml: &str, properties: &[String], record_tag: &str) -> Result<Vec<Vec<String>>>;
}

/// Processor backed by an embedded rhai engine, serde_json and roxmltree
#[derive(Debug, Clone)]
pub struct DefaultTextProcessor {
    timeout: Duration,
}

impl Default for DefaultTextProcessor {
    fn default() -> Self {
        Self::new(Duration::from_millis(defaults::COLLABORATOR_TIMEOUT_MS))
    }
}

impl DefaultTextProcessor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self::new(settings.collaborator_timeout())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// A fresh engine per script run, terminated once the timeout elapses
    fn engine(&self) -> Engine {
        let mut engine = Engine::new();
        engine.set_max_expr_depths(64, 64);
        engine.set_max_call_levels(32);
        engine.set_max_string_size(defaults::SCRIPT_MAX_STRING_SIZE);

        let started = Instant::now();
        let timeout = self.timeout;
        engine.on_progress(move |_| {
            if started.elapsed() > timeout {
                Some(Dynamic::UNIT)
            } else {
                None
            }
        });

        engine.register_fn("nth_argf", |line: &str, select: &str, separators: &str| -> String {
            text::nth_argf(line, select, separators, None)
        });
        engine.register_fn(
            "nth_argf",
            |line: &str, select: &str, separators: &str, result_separator: &str| -> String {
                text::nth_argf(line, select, separators, Some(result_separator))
            },
        );
        engine
    }
}

impl TextProcessor for DefaultTextProcessor {
    fn run_script(&self, script: &str, input: &str) -> Result<String> {
        let engine = self.engine();
        let mut scope = Scope::new();
        scope.push("input", input.to_string());

        let output = engine
            .eval_with_scope::<Dynamic>(&mut scope, script)
            .map_err(|e| match *e {
                EvalAltResult::ErrorTerminated(..) => {
                    SentryError::Timeout(format!("script exceeded {} ms", self.timeout.as_millis()))
                }
                other => SentryError::Script(other.to_string()),
            })?;

        if output.is_unit() {
            return Ok(String::new());
        }
        Ok(output.to_string())
    }

    fn json_to_table(&self, json: &str, entry_key: &str, properties: &[String], separator: &str) -> Result<String> {
        let document: Value =
            serde_json::from_str(json).map_err(|e| SentryError::StructuredParse(e.to_string()))?;

        let entry = json_path(&document, entry_key)
            .ok_or_else(|| SentryError::StructuredParse(format!("entry key '{}' not found", entry_key)))?;

        let records: Vec<&Value> = match entry {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        let mut lines = Vec::with_capacity(records.len());
        for record in records {
            let mut line = String::new();
            for property in properties {
                line.push_str(&json_cell(json_path(record, property)));
                line.push_str(separator);
            }
            lines.push(line);
        }
        Ok(lines.join("\n"))
    }

    fn xml_to_table(&self, xml: &str, properties: &[String], record_tag: &str) -> Result<Vec<Vec<String>>> {
        let document =
            roxmltree::Document::parse(xml).map_err(|e| SentryError::StructuredParse(e.to_string()))?;

        let path = path_segments(record_tag).collect::<Vec<_>>();
        if path.is_empty() {
            return Err(SentryError::StructuredParse("record tag is empty".to_string()));
        }

        let rows = xml_records(document.root_element(), &path)
            .into_iter()
            .map(|record| properties.iter().map(|property| xml_value(record, property)).collect())
            .collect();
        Ok(rows)
    }
}

fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(compute_const::PATH_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
}

/// Elements at the end of the record path. The path may start with the
/// document element or with one of its children.
fn xml_records<'a, 'i>(root: roxmltree::Node<'a, 'i>, path: &[&str]) -> Vec<roxmltree::Node<'a, 'i>> {
    let (start, rest) = match path.split_first() {
        Some((first, rest)) if root.tag_name().name() == *first => (vec![root], rest),
        _ => (vec![root], path),
    };

    rest.iter().fold(start, |nodes, segment| {
        nodes
            .into_iter()
            .flat_map(|node| {
                node.children()
                    .filter(move |child| child.is_element() && child.tag_name().name() == *segment)
            })
            .collect()
    })
}

/// Text of the element at `property` below the record, or of an attribute
/// when the last segment starts with `@` or names no child element
fn xml_value(record: roxmltree::Node<'_, '_>, property: &str) -> String {
    let segments = path_segments(property).collect::<Vec<_>>();
    let Some((last, parents)) = segments.split_last() else {
        return element_text(record);
    };

    let mut node = record;
    for segment in parents {
        match node
            .children()
            .find(|child| child.is_element() && child.tag_name().name() == *segment)
        {
            Some(child) => node = child,
            None => return String::new(),
        }
    }

    if let Some(attribute) = last.strip_prefix(compute_const::XML_ATTRIBUTE_PREFIX) {
        return node.attribute(attribute).unwrap_or_default().to_string();
    }
    match node
        .children()
        .find(|child| child.is_element() && child.tag_name().name() == *last)
    {
        Some(child) => element_text(child),
        None => node.attribute(*last).unwrap_or_default().to_string(),
    }
}

fn element_text(node: roxmltree::Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Follow a `/`-separated path of object keys. An empty path is the value itself.
fn json_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    path.split(compute_const::PATH_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .try_fold(value, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

fn json_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

// ============================================================================
// Operations
// ============================================================================

/// Fields of an Awk operation
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct AwkOptions<'a> {
    pub script: Option<&'a str>,
    pub exclude: Option<&'a str>,
    pub keep_only: Option<&'a str>,
    pub separators: Option<&'a str>,
    pub select_columns: Option<&'a str>,
}

/// Run a script over the table text, then filter and select the output lines
pub(super) fn awk(table: &mut SourceTable, processor: &dyn TextProcessor, options: AwkOptions<'_>) -> Result<()> {
    let script = required("Awk", "script", options.script)?;
    if script.trim().is_empty() {
        return Err(SentryError::invalid_operation("Awk", "script is empty"));
    }

    let input = match table.raw_text() {
        Some(raw) if !raw.is_empty() => raw.to_string(),
        _ => crate::table::table_to_text(table.rows()),
    };

    let output = processor.run_script(script, &input)?;
    if output.trim().is_empty() {
        debug!("Awk script produced no output, the table is now empty");
        table.clear();
        return Ok(());
    }

    let lines = output.lines().map(str::to_string).collect();
    let lines = text::filter_lines(lines, options.exclude, options.keep_only)?;
    let separators = options.separators.or(Some(text_const::DEFAULT_SEPARATORS));
    let lines = text::select_columns(lines, separators, options.select_columns);

    let text = lines
        .into_iter()
        .map(|mut line| {
            if !line.ends_with(CELL_SEPARATOR) {
                line.push_str(CELL_SEPARATOR);
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n");

    table.set_raw_text(text);
    Ok(())
}

/// Flatten the JSON table text into rows
pub(super) fn json_to_csv(
    table: &mut SourceTable,
    processor: &dyn TextProcessor,
    entry_key: Option<&str>,
    properties: Option<&[String]>,
    separator: Option<&str>,
) -> Result<()> {
    let properties = required("Json2Csv", "properties", properties)?;
    if properties.is_empty() {
        return Err(SentryError::invalid_operation("Json2Csv", "properties are empty"));
    }
    let entry_key = entry_key.unwrap_or_default();
    let separator = separator
        .filter(|s| !s.is_empty())
        .unwrap_or(compute_const::DEFAULT_JSON_SEPARATOR);

    let output = processor.json_to_table(&table.text(), entry_key, properties, separator)?;
    let rows = output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line_to_cells(line, separator))
        .collect();
    table.set_rows(rows);
    Ok(())
}

/// Flatten the XML table text into rows
pub(super) fn xml_to_csv(
    table: &mut SourceTable,
    processor: &dyn TextProcessor,
    record_tag: Option<&str>,
    properties: Option<&[String]>,
) -> Result<()> {
    let record_tag = required("Xml2Csv", "record tag", record_tag)?;
    let properties = required("Xml2Csv", "properties", properties)?;

    let rows = processor.xml_to_table(&table.text(), properties, record_tag)?;
    table.set_rows(rows);
    Ok(())
}
