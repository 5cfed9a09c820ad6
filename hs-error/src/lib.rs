//! Unified error handling for hwsentry
//!
//! This crate provides a single error type used across all hwsentry components.
//! Inside the normalization engine an error is a diagnostic: the pipeline
//! executor and the parameter collector log it and carry on with the next
//! operation or parameter.

/// Result type alias using SentryError
pub type Result<T> = std::result::Result<T, SentryError>;

/// Unified error type for all hwsentry operations
#[derive(thiserror::Error, Debug)]
pub enum SentryError {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // ============================================================================
    // Compute Errors
    // ============================================================================
    #[error("Invalid {operation} operation: {reason}")]
    InvalidOperation {
        operation: &'static str,
        reason: String,
    },

    #[error("Column {column} is out of range for a {width}-column row")]
    ColumnOutOfRange {
        column: usize,
        width: usize,
    },

    #[error("Value '{value}' is not a number")]
    NotANumber {
        value: String,
    },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        pattern: String,
        reason: String,
    },

    // ============================================================================
    // Collaborator Errors
    // ============================================================================
    #[error("Script execution failed: {0}")]
    Script(String),

    #[error("Structured data conversion failed: {0}")]
    StructuredParse(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    // ============================================================================
    // Collection Errors
    // ============================================================================
    #[error("Cannot translate status value '{value}' for parameter {parameter}")]
    UnknownStatus {
        parameter: String,
        value: String,
    },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Generic(String),
}

impl SentryError {
    /// Create a generic error from a string
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic(msg.into())
    }

    /// Create an invalid configuration value error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed compute operation error
    pub fn invalid_operation(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            operation,
            reason: reason.into(),
        }
    }

    /// Create a column out of range error (1-based column)
    pub fn column_out_of_range(column: usize, width: usize) -> Self {
        Self::ColumnOutOfRange { column, width }
    }

    /// Create a not-a-number error
    pub fn not_a_number(value: impl Into<String>) -> Self {
        Self::NotANumber {
            value: value.into(),
        }
    }

    /// Create an untranslatable status value error
    pub fn unknown_status(parameter: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnknownStatus {
            parameter: parameter.into(),
            value: value.into(),
        }
    }

    /// Whether this error is a collaborator timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

// Allow converting from String to SentryError
impl From<String> for SentryError {
    fn from(s: String) -> Self {
        Self::Generic(s)
    }
}

// Allow converting from &str to SentryError
impl From<&str> for SentryError {
    fn from(s: &str) -> Self {
        Self::Generic(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_distinguishable() {
        assert!(SentryError::Timeout("awk".into()).is_timeout());
        assert!(!SentryError::Script("boom".into()).is_timeout());
    }

    #[test]
    fn test_display_messages() {
        let err = SentryError::column_out_of_range(5, 3);
        assert_eq!(err.to_string(), "Column 5 is out of range for a 3-column row");

        let err = SentryError::invalid_operation("Add", "column is missing");
        assert_eq!(err.to_string(), "Invalid Add operation: column is missing");

        let err = SentryError::unknown_status("status", "blinking");
        assert_eq!(
            err.to_string(),
            "Cannot translate status value 'blinking' for parameter status"
        );
    }
}
