//! Engine settings

use std::time::Duration;

use serde::{Deserialize, Serialize};

use hs_error::{Result, SentryError};

use crate::constants::defaults;
use crate::model::ParameterState;

/// Settings shared by every pipeline and collection of an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// State given to status values that cannot be interpreted; `None` skips them
    pub unknown_status: Option<ParameterState>,
    /// Deadline of script and structured-data collaborators
    pub collaborator_timeout_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            unknown_status: Some(ParameterState::Warn),
            collaborator_timeout_ms: defaults::COLLABORATOR_TIMEOUT_MS,
        }
    }
}

impl EngineSettings {
    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }

    pub fn with_unknown_status(mut self, state: Option<ParameterState>) -> Self {
        self.unknown_status = state;
        self
    }

    pub fn with_collaborator_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.collaborator_timeout_ms = timeout_ms;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.collaborator_timeout_ms == 0 {
            return Err(SentryError::invalid_config(
                "collaborator_timeout_ms",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = EngineSettings::default();
        assert_eq!(settings.unknown_status, Some(ParameterState::Warn));
        assert_eq!(settings.collaborator_timeout(), Duration::from_secs(10));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: EngineSettings = serde_json::from_str(r#"{ "unknown_status": "ALARM" }"#).unwrap();
        assert_eq!(settings.unknown_status, Some(ParameterState::Alarm));
        assert_eq!(settings.collaborator_timeout_ms, 10_000);

        let settings: EngineSettings = serde_json::from_str(r#"{ "unknown_status": null }"#).unwrap();
        assert_eq!(settings.unknown_status, None);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let settings = EngineSettings::default().with_collaborator_timeout_ms(0);
        assert!(settings.validate().is_err());
    }
}
