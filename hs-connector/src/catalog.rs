//! Per-monitor-type metric catalogs
//!
//! A catalog tells the collector which parameters a monitor type exposes, how
//! each one is typed, whether it is part of the basic collection and which
//! parameters are summarized in the free text of the `status` parameter.

use serde::{Deserialize, Serialize};

use crate::names::{self, unit};

/// Kind of hardware monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MonitorType {
    Enclosure,
    Fan,
    PowerSupply,
    PhysicalDisk,
    Temperature,
    Voltage,
    NetworkCard,
    Battery,
    Cpu,
    Memory,
    DiskController,
    LogicalDisk,
    Led,
    Other,
}

impl MonitorType {
    pub const ALL: [MonitorType; 14] = [
        MonitorType::Enclosure,
        MonitorType::Fan,
        MonitorType::PowerSupply,
        MonitorType::PhysicalDisk,
        MonitorType::Temperature,
        MonitorType::Voltage,
        MonitorType::NetworkCard,
        MonitorType::Battery,
        MonitorType::Cpu,
        MonitorType::Memory,
        MonitorType::DiskController,
        MonitorType::LogicalDisk,
        MonitorType::Led,
        MonitorType::Other,
    ];

    /// Parameters appended, in this order, to the status information text
    pub fn status_information_parameters(&self) -> &'static [&'static str] {
        match self {
            MonitorType::Enclosure => &[
                names::PRESENT,
                names::INTRUSION_STATUS,
                names::ENERGY_USAGE,
                names::POWER_CONSUMPTION,
            ],
            MonitorType::Fan => &[names::SPEED, names::PRESENT, names::SPEED_PERCENT],
            MonitorType::PowerSupply => &[names::PRESENT, names::USED_CAPACITY],
            MonitorType::PhysicalDisk => &[
                names::PRESENT,
                names::INTRUSION_STATUS,
                names::ENDURANCE_REMAINING,
                names::ERROR_COUNT,
                names::PREDICTED_FAILURE,
            ],
            MonitorType::Temperature => &[names::TEMPERATURE],
            MonitorType::Voltage => &[names::VOLTAGE],
            MonitorType::NetworkCard => &[
                names::PRESENT,
                names::LINK_STATUS,
                names::LINK_SPEED,
                names::RECEIVED_BYTES_RATE,
                names::TRANSMITTED_BYTES_RATE,
                names::ERROR_COUNT,
            ],
            MonitorType::Battery => &[names::PRESENT, names::CHARGE],
            MonitorType::Cpu => &[
                names::CORRECTED_ERROR_COUNT,
                names::CURRENT_SPEED,
                names::PREDICTED_FAILURE,
                names::PRESENT,
            ],
            MonitorType::Memory => &[
                names::ERROR_COUNT,
                names::ERROR_STATUS,
                names::PREDICTED_FAILURE,
                names::PRESENT,
            ],
            MonitorType::DiskController => &[
                names::PRESENT,
                names::BATTERY_STATUS,
                names::CONTROLLER_STATUS,
            ],
            MonitorType::LogicalDisk => &[names::ERROR_COUNT, names::UNALLOCATED_SPACE],
            MonitorType::Led => &[names::COLOR, names::LED_INDICATOR],
            MonitorType::Other => &[names::PRESENT, names::USAGE_COUNT, names::VALUE],
        }
    }

    /// Whether the power consumption / energy usage pair is derived for this type
    pub fn collects_power(&self) -> bool {
        matches!(self, MonitorType::Enclosure)
    }
}

impl std::fmt::Display for MonitorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterKind {
    Status,
    Number,
    Text,
    Present,
}

/// Value computed from a monotonically increasing counter across cycles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Derivation {
    /// (counter - previous counter) / elapsed seconds
    Rate { counter: String },
    /// counter - previous counter
    Delta { counter: String },
}

impl Derivation {
    /// Name of the mapped counter parameter read from the row
    pub fn counter(&self) -> &str {
        match self {
            Derivation::Rate { counter } | Derivation::Delta { counter } => counter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaParameter {
    pub name: String,
    pub kind: ParameterKind,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default = "default_basic_collect")]
    pub basic_collect: bool,
    #[serde(default)]
    pub derivation: Option<Derivation>,
}

fn default_basic_collect() -> bool {
    true
}

impl MetaParameter {
    pub fn new(name: &str, kind: ParameterKind, unit: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            unit: unit.map(str::to_string),
            basic_collect: true,
            derivation: None,
        }
    }

    pub fn status(name: &str) -> Self {
        Self::new(name, ParameterKind::Status, None)
    }

    pub fn number(name: &str, unit: &str) -> Self {
        Self::new(name, ParameterKind::Number, Some(unit))
    }

    pub fn text(name: &str) -> Self {
        Self::new(name, ParameterKind::Text, None)
    }

    pub fn present() -> Self {
        Self::new(names::PRESENT, ParameterKind::Present, None)
    }

    pub fn rate(name: &str, counter: &str, unit: &str) -> Self {
        Self {
            derivation: Some(Derivation::Rate {
                counter: counter.to_string(),
            }),
            ..Self::number(name, unit)
        }
    }

    pub fn delta(name: &str, counter: &str, unit: &str) -> Self {
        Self {
            derivation: Some(Derivation::Delta {
                counter: counter.to_string(),
            }),
            ..Self::number(name, unit)
        }
    }

    /// Mark the parameter as collected outside of the basic collection
    pub fn not_basic(mut self) -> Self {
        self.basic_collect = false;
        self
    }
}

/// Metrics of one monitor type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricCatalog {
    pub monitor_type: MonitorType,
    pub parameters: Vec<MetaParameter>,
    /// Appended to the status information, in this order
    #[serde(default)]
    pub status_information_parameters: Vec<String>,
    #[serde(default)]
    pub power_derivation: bool,
}

impl MetricCatalog {
    /// Catalog shipped with the engine for the given monitor type
    pub fn builtin(monitor_type: MonitorType) -> Self {
        use MetaParameter as P;

        let parameters = match monitor_type {
            MonitorType::Enclosure => vec![
                P::status(names::STATUS),
                P::status(names::INTRUSION_STATUS),
                P::present(),
                P::number(names::ENERGY_USAGE, unit::JOULES).not_basic(),
                P::number(names::POWER_CONSUMPTION, unit::WATTS).not_basic(),
            ],
            MonitorType::Fan => vec![
                P::status(names::STATUS),
                P::present(),
                P::number(names::SPEED, unit::RPM),
                P::number(names::SPEED_PERCENT, unit::PERCENT),
            ],
            MonitorType::PowerSupply => vec![
                P::status(names::STATUS),
                P::present(),
                P::number(names::USED_CAPACITY, unit::PERCENT),
            ],
            MonitorType::PhysicalDisk => vec![
                P::status(names::STATUS),
                P::status(names::INTRUSION_STATUS),
                P::status(names::PREDICTED_FAILURE),
                P::present(),
                P::number(names::ENDURANCE_REMAINING, unit::PERCENT),
                P::number(names::ERROR_COUNT, unit::ERRORS),
            ],
            MonitorType::Temperature => vec![
                P::status(names::STATUS),
                P::number(names::TEMPERATURE, unit::CELSIUS),
            ],
            MonitorType::Voltage => vec![
                P::status(names::STATUS),
                P::number(names::VOLTAGE, unit::MILLIVOLTS),
            ],
            MonitorType::NetworkCard => vec![
                P::status(names::STATUS),
                P::status(names::LINK_STATUS),
                P::present(),
                P::number(names::LINK_SPEED, unit::MEGABYTES_PER_SECOND),
                P::number(names::ERROR_COUNT, unit::ERRORS),
                P::rate(
                    names::RECEIVED_BYTES_RATE,
                    names::RECEIVED_BYTES,
                    unit::BYTES_PER_SECOND,
                ),
                P::rate(
                    names::TRANSMITTED_BYTES_RATE,
                    names::TRANSMITTED_BYTES,
                    unit::BYTES_PER_SECOND,
                ),
            ],
            MonitorType::Battery => vec![
                P::status(names::STATUS),
                P::present(),
                P::number(names::CHARGE, unit::PERCENT),
            ],
            MonitorType::Cpu => vec![
                P::status(names::STATUS),
                P::status(names::PREDICTED_FAILURE),
                P::present(),
                P::number(names::CURRENT_SPEED, unit::MEGAHERTZ),
                P::number(names::CORRECTED_ERROR_COUNT, unit::ERRORS),
            ],
            MonitorType::Memory => vec![
                P::status(names::STATUS),
                P::status(names::ERROR_STATUS),
                P::status(names::PREDICTED_FAILURE),
                P::present(),
                P::number(names::ERROR_COUNT, unit::ERRORS),
            ],
            MonitorType::DiskController => vec![
                P::status(names::STATUS),
                P::status(names::BATTERY_STATUS),
                P::status(names::CONTROLLER_STATUS),
                P::present(),
            ],
            MonitorType::LogicalDisk => vec![
                P::status(names::STATUS),
                P::number(names::ERROR_COUNT, unit::ERRORS),
                P::number(names::UNALLOCATED_SPACE, unit::GIGABYTES),
            ],
            MonitorType::Led => vec![
                P::status(names::STATUS),
                P::status(names::LED_INDICATOR),
                P::text(names::COLOR),
            ],
            MonitorType::Other => vec![
                P::status(names::STATUS),
                P::present(),
                P::number(names::USAGE_COUNT, unit::ERRORS),
                P::number(names::VALUE, ""),
            ],
        };

        Self {
            monitor_type,
            parameters,
            status_information_parameters: monitor_type
                .status_information_parameters()
                .iter()
                .map(|name| name.to_string())
                .collect(),
            power_derivation: monitor_type.collects_power(),
        }
    }

    /// Look up a parameter definition by name
    pub fn parameter(&self, name: &str) -> Option<&MetaParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Basic parameters of the given kind, in catalog order
    pub fn basic_parameters(&self, kind: ParameterKind) -> impl Iterator<Item = &MetaParameter> {
        self.parameters
            .iter()
            .filter(move |p| p.basic_collect && p.kind == kind)
    }

    /// Unit declared for the given parameter
    pub fn unit_of(&self, name: &str) -> Option<&str> {
        self.parameter(name).and_then(|p| p.unit.as_deref())
    }
}
