//! Parameter collection
//!
//! `ParameterCollector::collect` turns one normalized row into parameter
//! updates on a monitor. Status parameters are collected first, `status`
//! ahead of the others, so that the free text of the `status` parameter can
//! be completed once every other parameter of the cycle is known.
//!
//! Collection never fails: a value that is missing or cannot be interpreted
//! is skipped with a diagnostic and the parameter keeps its last value.
//!
//! # Module Structure
//!
//! - `mapping` - Where parameter values are read from in a row
//! - `status_info` - Phrases used in the status information text
//! - `derive` - Rates, deltas and the power / energy pair

mod derive;
mod mapping;
mod status_info;

use tracing::{debug, warn};

use hs_connector::{names, Derivation, MetaParameter, MetricCatalog, ParameterKind};
use hs_error::SentryError;

use crate::model::{Monitor, Parameter, ParameterState, PresentParam};

pub use mapping::RowMapping;
pub use status_info::{StatusFormatter, StatusInformationRegistry};

/// Collects the rows of one monitor type into monitors
#[derive(Debug, Clone)]
pub struct ParameterCollector {
    hostname: String,
    catalog: MetricCatalog,
    mapping: RowMapping,
    status_information: StatusInformationRegistry,
    unknown_status: Option<ParameterState>,
}

impl ParameterCollector {
    pub fn new(hostname: impl Into<String>, catalog: MetricCatalog, mapping: RowMapping) -> Self {
        Self {
            hostname: hostname.into(),
            catalog,
            mapping,
            status_information: StatusInformationRegistry::default(),
            unknown_status: Some(ParameterState::Warn),
        }
    }

    /// State given to status values that cannot be interpreted; `None` skips them
    pub fn with_unknown_status(mut self, unknown_status: Option<ParameterState>) -> Self {
        self.unknown_status = unknown_status;
        self
    }

    pub fn with_status_information(mut self, registry: StatusInformationRegistry) -> Self {
        self.status_information = registry;
        self
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    pub fn mapping(&self) -> &RowMapping {
        &self.mapping
    }

    /// Collect one row into the monitor at `collect_time` (epoch milliseconds)
    pub fn collect(&self, monitor: &mut Monitor, row: &[String], collect_time: i64) {
        for meta in self.status_parameters() {
            self.collect_status(monitor, row, meta, collect_time);
        }

        for meta in self.catalog.basic_parameters(ParameterKind::Number) {
            if self.is_power_pair(&meta.name) {
                continue;
            }
            match &meta.derivation {
                Some(derivation) => self.collect_derived(monitor, row, meta, derivation, collect_time),
                None => {
                    if let Some(value) = self.number(monitor, &meta.name, row) {
                        monitor.update_number_param(&meta.name, meta.unit.as_deref(), |param| {
                            param.commit(Some(value), Some(value), collect_time)
                        });
                    }
                }
            }
        }

        for meta in self.catalog.basic_parameters(ParameterKind::Text) {
            if let Some(value) = self.mapping.value(&meta.name, row) {
                monitor.update_text_param(&meta.name, Some(value.to_string()), collect_time);
            }
        }

        for meta in self.catalog.basic_parameters(ParameterKind::Present) {
            self.collect_present(monitor, row, meta, collect_time);
        }

        if self.catalog.power_derivation {
            let energy = self.number(monitor, names::ENERGY_USAGE, row);
            let power = self.number(monitor, names::POWER_CONSUMPTION, row);
            derive::collect_power(monitor, &self.catalog, energy, power, collect_time, &self.hostname);
        }

        self.append_status_information(monitor, collect_time);
    }

    /// Energy and power are owned by the duality when the catalog derives them
    fn is_power_pair(&self, name: &str) -> bool {
        self.catalog.power_derivation && (name == names::ENERGY_USAGE || name == names::POWER_CONSUMPTION)
    }

    /// Basic status parameters, `status` first and the others by name
    fn status_parameters(&self) -> Vec<&MetaParameter> {
        let mut parameters: Vec<_> = self.catalog.basic_parameters(ParameterKind::Status).collect();
        parameters.sort_by(|a, b| {
            let a_first = a.name == names::STATUS;
            let b_first = b.name == names::STATUS;
            b_first.cmp(&a_first).then_with(|| a.name.cmp(&b.name))
        });
        parameters
    }

    fn collect_status(&self, monitor: &mut Monitor, row: &[String], meta: &MetaParameter, collect_time: i64) {
        let name = meta.name.as_str();
        let Some(raw) = self.mapping.value(name, row).filter(|raw| !raw.trim().is_empty()) else {
            debug!("Hostname {} - No {} to collect for monitor {}", self.hostname, name, monitor.id);
            return;
        };

        let state = match ParameterState::interpret(raw) {
            Some(state) => state,
            None => {
                let error = SentryError::unknown_status(name, raw);
                match self.unknown_status {
                    Some(fallback) => {
                        warn!(
                            "Hostname {} - Monitor {}: {}. Falling back to {}",
                            self.hostname, monitor.id, error, fallback
                        );
                        fallback
                    }
                    None => {
                        warn!(
                            "Hostname {} - Could not collect {} for monitor {}: {}",
                            self.hostname, name, monitor.id, error
                        );
                        return;
                    }
                }
            }
        };

        let detail = if name == names::STATUS {
            self.mapping
                .value(names::STATUS_INFORMATION, row)
                .map(str::trim)
                .filter(|text| !text.is_empty())
        } else {
            None
        };
        let text = detail.unwrap_or_else(|| self.status_information.format(name, state));

        monitor.update_status_param(name, state, text, collect_time);
    }

    fn collect_present(&self, monitor: &mut Monitor, row: &[String], meta: &MetaParameter, collect_time: i64) {
        let Some(raw) = self.mapping.value(&meta.name, row) else {
            return;
        };
        match PresentParam::interpret(raw) {
            Some(present) => monitor.update_present_param(&meta.name, present, collect_time),
            None => warn!(
                "Hostname {} - Cannot interpret the {} value '{}' of monitor {}",
                self.hostname, meta.name, raw, monitor.id
            ),
        }
    }

    /// Rate or delta of a mapped counter. The parameter keeps the counter as
    /// its raw value so that the next cycle can derive from it.
    fn collect_derived(
        &self,
        monitor: &mut Monitor,
        row: &[String],
        meta: &MetaParameter,
        derivation: &Derivation,
        collect_time: i64,
    ) {
        let Some(counter) = self.number(monitor, derivation.counter(), row) else {
            return;
        };

        let value = monitor.update_number_param(&meta.name, meta.unit.as_deref(), |param| {
            let previous = param.last_sample();
            let value = match derivation {
                Derivation::Rate { .. } => derive::rate(counter, collect_time, previous),
                Derivation::Delta { .. } => derive::delta(counter, previous.map(|(value, _)| value)),
            };
            param.commit(value, Some(counter), collect_time);
            value
        });

        if value.is_none() {
            debug!(
                "Hostname {} - No {} for monitor {} this cycle. Current {} {}",
                self.hostname,
                meta.name,
                monitor.id,
                derivation.counter(),
                counter
            );
        }
    }

    /// Numeric value of a parameter in the row. Absent and blank cells are
    /// skipped silently, unparsable ones with a warning.
    fn number(&self, monitor: &Monitor, name: &str, row: &[String]) -> Option<f64> {
        let Some(raw) = self.mapping.value(name, row).map(str::trim).filter(|raw| !raw.is_empty()) else {
            debug!("Hostname {} - No {} to collect for monitor {}", self.hostname, name, monitor.id);
            return None;
        };

        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Some(value),
            _ => {
                warn!(
                    "Hostname {} - Cannot parse the {} value '{}' for monitor {}. {} won't be collected",
                    self.hostname, name, raw, monitor.id, name
                );
                None
            }
        }
    }

    /// Append the formatted values of the summary parameters to the `status`
    /// free text, when `status` was collected in this cycle
    fn append_status_information(&self, monitor: &mut Monitor, collect_time: i64) {
        match monitor.status_param(names::STATUS) {
            Some(status) if status.collect_time == collect_time => {}
            _ => return,
        }

        let lines: Vec<String> = self
            .catalog
            .status_information_parameters
            .iter()
            .filter_map(|name| monitor.parameter(name))
            .filter_map(Parameter::format_value_as_string)
            .collect();

        if let Some(status) = monitor.status_param_mut(names::STATUS) {
            for line in &lines {
                status.append_status_information(line);
            }
        }
    }
}
