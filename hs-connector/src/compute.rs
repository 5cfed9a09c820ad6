use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key of the fallback entry of a translation table
pub const DEFAULT_TRANSLATION_KEY: &str = "default";

/// Table transformation operation, as authored in a connector source.
///
/// Columns are 1-based. Every field a connector may omit is optional so that a
/// partial definition still loads; the engine rejects it at execution time
/// and leaves the table untouched. Operands documented as "literal or
/// `Column(n)`" refer, when written `Column(n)`, to another cell of the same row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Compute {
    Add {
        column: Option<usize>,
        add: Option<String>,
    },
    Subtract {
        column: Option<usize>,
        subtract: Option<String>,
    },
    Multiply {
        column: Option<usize>,
        multiply_by: Option<String>,
    },
    Divide {
        column: Option<usize>,
        divide_by: Option<String>,
    },
    /// Bitwise AND between the integer part of the cell and the operand
    And {
        column: Option<usize>,
        and: Option<String>,
    },
    Convert {
        column: Option<usize>,
        conversion: Option<ConversionType>,
    },
    Translate {
        column: Option<usize>,
        translation_table: Option<TranslationTable>,
    },
    ArrayTranslate {
        column: Option<usize>,
        translation_table: Option<TranslationTable>,
        /// Defaults to `|`
        array_separator: Option<String>,
        /// Defaults to `|`
        result_separator: Option<String>,
    },
    /// Translation keys are `"<bit>,<bit value>"`, e.g. `"3,1"`
    PerBitTranslation {
        column: Option<usize>,
        bit_translation_table: Option<TranslationTable>,
        bit_list: Option<Vec<u32>>,
    },
    Extract {
        column: Option<usize>,
        /// Literal number or `Column(n)`
        sub_column: Option<String>,
        sub_separators: Option<String>,
    },
    ExtractPropertyFromWbemPath {
        column: Option<usize>,
        property_name: Option<String>,
    },
    KeepColumns {
        column_numbers: Option<Vec<usize>>,
    },
    DuplicateColumn {
        column: Option<usize>,
    },
    LeftConcat {
        column: Option<usize>,
        value: Option<String>,
    },
    RightConcat {
        column: Option<usize>,
        value: Option<String>,
    },
    Replace {
        column: Option<usize>,
        existing_value: Option<String>,
        new_value: Option<String>,
    },
    /// `start` is 1-based and inclusive, `length` is the exclusive end position
    Substring {
        column: Option<usize>,
        start: Option<String>,
        length: Option<String>,
    },
    KeepOnlyMatchingLines {
        column: Option<usize>,
        /// Legacy pattern dialect
        pattern: Option<String>,
        value_set: Option<Vec<String>>,
    },
    ExcludeMatchingLines {
        column: Option<usize>,
        pattern: Option<String>,
        value_set: Option<Vec<String>>,
    },
    Awk {
        script: Option<String>,
        exclude: Option<String>,
        keep_only: Option<String>,
        separators: Option<String>,
        /// e.g. `"1,3-4"`
        select_columns: Option<String>,
    },
    Json2Csv {
        entry_key: Option<String>,
        properties: Option<Vec<String>>,
        separator: Option<String>,
    },
    Xml2Csv {
        record_tag: Option<String>,
        properties: Option<Vec<String>>,
    },
}

impl Compute {
    /// Operation name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Compute::Add { .. } => "Add",
            Compute::Subtract { .. } => "Subtract",
            Compute::Multiply { .. } => "Multiply",
            Compute::Divide { .. } => "Divide",
            Compute::And { .. } => "And",
            Compute::Convert { .. } => "Convert",
            Compute::Translate { .. } => "Translate",
            Compute::ArrayTranslate { .. } => "ArrayTranslate",
            Compute::PerBitTranslation { .. } => "PerBitTranslation",
            Compute::Extract { .. } => "Extract",
            Compute::ExtractPropertyFromWbemPath { .. } => "ExtractPropertyFromWbemPath",
            Compute::KeepColumns { .. } => "KeepColumns",
            Compute::DuplicateColumn { .. } => "DuplicateColumn",
            Compute::LeftConcat { .. } => "LeftConcat",
            Compute::RightConcat { .. } => "RightConcat",
            Compute::Replace { .. } => "Replace",
            Compute::Substring { .. } => "Substring",
            Compute::KeepOnlyMatchingLines { .. } => "KeepOnlyMatchingLines",
            Compute::ExcludeMatchingLines { .. } => "ExcludeMatchingLines",
            Compute::Awk { .. } => "Awk",
            Compute::Json2Csv { .. } => "Json2Csv",
            Compute::Xml2Csv { .. } => "Xml2Csv",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConversionType {
    /// `0x1F`, `1f:00` ... to decimal
    Hex2Dec,
    /// `OK|WARN|ALARM` arrays to the worst simple status
    Array2SimpleStatus,
}

/// Named string-to-string map with case-insensitive lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationTable {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub translations: HashMap<String, String>,
}

impl TranslationTable {
    /// Build a table; keys are stored lower-cased
    pub fn new<K, V>(name: impl Into<String>, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: Some(name.into()),
            translations: entries
                .into_iter()
                .map(|(k, v)| (k.into().to_lowercase(), v.into()))
                .collect(),
        }
    }

    /// Table name for diagnostics
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    /// Case-insensitive lookup, without the `default` fallback
    pub fn get(&self, key: &str) -> Option<&str> {
        let lowered = key.to_lowercase();
        if let Some(value) = self.translations.get(&lowered) {
            return Some(value.as_str());
        }
        // Tables deserialized from connector files may carry mixed-case keys
        self.translations
            .iter()
            .find(|(k, _)| k.to_lowercase() == lowered)
            .map(|(_, v)| v.as_str())
    }

    /// The `default` entry, if any
    pub fn default_translation(&self) -> Option<&str> {
        self.get(DEFAULT_TRANSLATION_KEY)
    }

    /// Case-insensitive lookup falling back to the `default` entry
    pub fn translate(&self, key: &str) -> Option<&str> {
        self.get(key).or_else(|| self.default_translation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_is_case_insensitive() {
        let table = TranslationTable::new("status", [("OK", "ok"), ("Degraded", "degraded")]);
        assert_eq!(table.translate("ok"), Some("ok"));
        assert_eq!(table.translate("DEGRADED"), Some("degraded"));
        assert_eq!(table.translate("missing"), None);
    }

    #[test]
    fn test_translation_default_entry() {
        let table = TranslationTable::new("status", [("1", "OK"), ("Default", "UNKNOWN")]);
        assert_eq!(table.translate("1"), Some("OK"));
        assert_eq!(table.translate("42"), Some("UNKNOWN"));
    }

    #[test]
    fn test_mixed_case_keys_from_json() {
        let table: TranslationTable = serde_json::from_str(
            r#"{"name":"t","translations":{"Failed":"ALARM"}}"#,
        )
        .unwrap();
        assert_eq!(table.translate("failed"), Some("ALARM"));
    }

    #[test]
    fn test_compute_deserialization_tolerates_missing_fields() {
        let compute: Compute = serde_json::from_str(r#"{"type":"add","column":2}"#).unwrap();
        assert_eq!(
            compute,
            Compute::Add {
                column: Some(2),
                add: None
            }
        );
        assert_eq!(compute.name(), "Add");
    }

    #[test]
    fn test_compute_field_names_are_camel_case() {
        let compute: Compute = serde_json::from_str(
            r#"{"type":"keepOnlyMatchingLines","column":1,"pattern":"^B","valueSet":["BAR"]}"#,
        )
        .unwrap();
        match compute {
            Compute::KeepOnlyMatchingLines { value_set, .. } => {
                assert_eq!(value_set, Some(vec!["BAR".to_string()]));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
