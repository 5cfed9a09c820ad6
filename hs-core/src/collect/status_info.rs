//! Status information phrases

use std::collections::HashMap;

use hs_connector::names;

use crate::constants::status as status_const;
use crate::model::ParameterState;

/// Phrase describing a state of a given status parameter
pub type StatusFormatter = fn(ParameterState) -> &'static str;

/// Per-parameter formatters of the status information text.
///
/// Parameters without a formatter are described by their state name.
#[derive(Debug, Clone)]
pub struct StatusInformationRegistry {
    formatters: HashMap<String, StatusFormatter>,
}

impl Default for StatusInformationRegistry {
    fn default() -> Self {
        Self::empty().with_formatter(names::INTRUSION_STATUS, intrusion_status)
    }
}

impl StatusInformationRegistry {
    /// Registry without any formatter
    pub fn empty() -> Self {
        Self {
            formatters: HashMap::new(),
        }
    }

    pub fn with_formatter(mut self, parameter: impl Into<String>, formatter: StatusFormatter) -> Self {
        self.formatters.insert(parameter.into(), formatter);
        self
    }

    pub fn format(&self, parameter: &str, state: ParameterState) -> &'static str {
        match self.formatters.get(parameter) {
            Some(formatter) => formatter(state),
            None => state.as_str(),
        }
    }
}

fn intrusion_status(state: ParameterState) -> &'static str {
    match state {
        ParameterState::Ok => status_const::NO_INTRUSION_DETECTED,
        ParameterState::Alarm => status_const::INTRUSION_DETECTED,
        ParameterState::Warn => status_const::UNEXPECTED_INTRUSION_STATUS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intrusion_phrases() {
        let registry = StatusInformationRegistry::default();
        assert_eq!(
            registry.format(names::INTRUSION_STATUS, ParameterState::Ok),
            "No Intrusion Detected"
        );
        assert_eq!(
            registry.format(names::INTRUSION_STATUS, ParameterState::Alarm),
            "Intrusion Detected"
        );
        assert_eq!(
            registry.format(names::INTRUSION_STATUS, ParameterState::Warn),
            "Unexpected Intrusion Status"
        );
    }

    #[test]
    fn test_state_name_without_formatter() {
        let registry = StatusInformationRegistry::default();
        assert_eq!(registry.format(names::STATUS, ParameterState::Warn), "WARN");
        assert_eq!(
            StatusInformationRegistry::empty().format(names::INTRUSION_STATUS, ParameterState::Ok),
            "OK"
        );
    }

    #[test]
    fn test_custom_formatter() {
        let registry = StatusInformationRegistry::empty()
            .with_formatter(names::LED_INDICATOR, |state| match state {
                ParameterState::Ok => "Off",
                _ => "Blinking",
            });
        assert_eq!(registry.format(names::LED_INDICATOR, ParameterState::Alarm), "Blinking");
    }
}
