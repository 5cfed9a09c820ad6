//! Constants for the hwsentry engine
//!
//! Centralizes separators, unit conversion factors and the default values of
//! the engine settings. Never use magic numbers in other files - add them here first.

/// Table serialization
pub mod table {
    /// Cell separator of the canonical serialization
    pub const CELL_SEPARATOR: &str = ";";

    /// Row separator of the canonical serialization
    pub const ROW_SEPARATOR: &str = "\n";
}

/// Compute operation defaults
pub mod compute {
    /// Separator used by ArrayTranslate when none is configured
    pub const DEFAULT_ARRAY_SEPARATOR: &str = "|";

    /// Join separator used by ArrayTranslate when none is configured
    pub const DEFAULT_RESULT_SEPARATOR: &str = "|";

    /// Join separator of PerBitTranslation phrases
    pub const BIT_TRANSLATION_SEPARATOR: &str = " - ";

    /// Token separators of Array2SimpleStatus
    pub const STATUS_ARRAY_SEPARATORS: &[char] = &['|', '\n'];

    /// Separator between the key/value pairs of a WBEM object path
    pub const WBEM_PATH_SEPARATOR: char = ',';

    /// Default separator of Json2Csv output
    pub const DEFAULT_JSON_SEPARATOR: &str = ";";

    /// Separator of nested JSON and XML property paths
    pub const PATH_SEPARATOR: char = '/';

    /// Marks the last segment of an XML property path as an attribute name
    pub const XML_ATTRIBUTE_PREFIX: char = '@';
}

/// Text selection
pub mod text {
    /// Separator used to join selected columns when none is given
    pub const DEFAULT_RESULT_SEPARATOR: &str = " ";

    /// Separators used to split lines when none are given
    pub const DEFAULT_SEPARATORS: &str = " \t";
}

/// Unit conversions used by derived metrics
pub mod units {
    /// Collection times are epoch milliseconds
    pub const MILLIS_PER_SECOND: f64 = 1000.0;
}

/// Row mapping
pub mod collect {
    /// Optional prefix of a `Column(n)` mapping, e.g. `ValueTable.Column(3)`
    pub const VALUE_TABLE_PREFIX: &str = "ValueTable.";
}

/// Status information
pub mod status {
    pub const INTRUSION_DETECTED: &str = "Intrusion Detected";
    pub const NO_INTRUSION_DETECTED: &str = "No Intrusion Detected";
    pub const UNEXPECTED_INTRUSION_STATUS: &str = "Unexpected Intrusion Status";

    /// Separator between the status information lines
    pub const LINE_SEPARATOR: &str = "\n";
}

/// Engine settings defaults
pub mod defaults {
    /// Timeout of script and structured-data collaborators
    pub const COLLABORATOR_TIMEOUT_MS: u64 = 10_000;

    /// Largest string a script may build
    pub const SCRIPT_MAX_STRING_SIZE: usize = 16 * 1024 * 1024;
}
