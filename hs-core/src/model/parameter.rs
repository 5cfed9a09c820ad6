//! Typed parameter values with cycle history
//!
//! Every parameter keeps the value of the current cycle and of the previous
//! one. A collection cycle writes a parameter through a single `commit` call,
//! which first shifts the current fields into the previous ones. Derived
//! metrics must therefore read what they need from the parameter before
//! committing.

use serde::{Deserialize, Serialize};

/// Health state of a status parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParameterState {
    Ok,
    Warn,
    Alarm,
}

impl ParameterState {
    /// 0 for OK, 1 for WARN, 2 for ALARM
    pub fn ordinal(&self) -> u8 {
        match self {
            ParameterState::Ok => 0,
            ParameterState::Warn => 1,
            ParameterState::Alarm => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterState::Ok => "OK",
            ParameterState::Warn => "WARN",
            ParameterState::Alarm => "ALARM",
        }
    }

    /// Interpret a normalized status cell: an ordinal or a state name
    pub fn interpret(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(ordinal) = raw.parse::<f64>() {
            return match ordinal as i64 {
                0 if ordinal == 0.0 => Some(ParameterState::Ok),
                1 if ordinal == 1.0 => Some(ParameterState::Warn),
                2 if ordinal == 2.0 => Some(ParameterState::Alarm),
                _ => None,
            };
        }
        match raw.to_ascii_lowercase().as_str() {
            "ok" => Some(ParameterState::Ok),
            "warn" | "warning" | "degraded" => Some(ParameterState::Warn),
            "alarm" | "failed" | "critical" => Some(ParameterState::Alarm),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParameterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusParam {
    pub name: String,
    pub state: ParameterState,
    /// Free text, `"<name>: <ordinal> (<text>)"` followed by appended lines
    pub status_information: String,
    pub collect_time: i64,
    #[serde(default)]
    pub previous_state: Option<ParameterState>,
    #[serde(default)]
    pub previous_collect_time: Option<i64>,
}

impl StatusParam {
    pub fn new(
        name: impl Into<String>,
        state: ParameterState,
        text: &str,
        collect_time: i64,
    ) -> Self {
        let name = name.into();
        Self {
            status_information: build_status_information(&name, state, text),
            name,
            state,
            collect_time,
            previous_state: None,
            previous_collect_time: None,
        }
    }

    pub fn ordinal(&self) -> u8 {
        self.state.ordinal()
    }

    /// Shift the current state to the previous one, then write the new state
    pub fn commit(&mut self, state: ParameterState, text: &str, collect_time: i64) {
        self.previous_state = Some(self.state);
        self.previous_collect_time = Some(self.collect_time);
        self.state = state;
        self.status_information = build_status_information(&self.name, state, text);
        self.collect_time = collect_time;
    }

    /// Append a line to the status information
    pub fn append_status_information(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        if !self.status_information.is_empty() {
            self.status_information
                .push_str(crate::constants::status::LINE_SEPARATOR);
        }
        self.status_information.push_str(line);
    }
}

/// Render `"<name>: <ordinal> (<text>)"`
pub fn build_status_information(name: &str, state: ParameterState, text: &str) -> String {
    format!("{}: {} ({})", name, state.ordinal(), text)
}

/// Numeric parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberParam {
    pub name: String,
    #[serde(default)]
    pub unit: Option<String>,
    /// Displayed value
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub previous_value: Option<f64>,
    /// Value before conversion, e.g. the energy counter a power value is derived from
    #[serde(default)]
    pub raw_value: Option<f64>,
    #[serde(default)]
    pub previous_raw_value: Option<f64>,
    #[serde(default)]
    pub collect_time: Option<i64>,
    #[serde(default)]
    pub previous_collect_time: Option<i64>,
}

impl NumberParam {
    pub fn new(name: impl Into<String>, unit: Option<&str>) -> Self {
        Self {
            name: name.into(),
            unit: unit.map(str::to_string),
            value: None,
            previous_value: None,
            raw_value: None,
            previous_raw_value: None,
            collect_time: None,
            previous_collect_time: None,
        }
    }

    /// Raw value and collection time written by the last commit.
    ///
    /// Before this cycle commits, this is the previous cycle's sample.
    pub fn last_sample(&self) -> Option<(f64, i64)> {
        self.raw_value.zip(self.collect_time)
    }

    /// Shift current fields to the previous ones, then write the new cycle
    pub fn commit(&mut self, value: Option<f64>, raw_value: Option<f64>, collect_time: i64) {
        self.previous_value = self.value;
        self.previous_raw_value = self.raw_value;
        self.previous_collect_time = self.collect_time;
        self.value = value;
        self.raw_value = raw_value;
        self.collect_time = Some(collect_time);
    }
}

/// Free-text parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextParam {
    pub name: String,
    pub value: Option<String>,
    #[serde(default)]
    pub previous_value: Option<String>,
    pub collect_time: i64,
    #[serde(default)]
    pub previous_collect_time: Option<i64>,
}

impl TextParam {
    pub fn new(name: impl Into<String>, value: Option<String>, collect_time: i64) -> Self {
        Self {
            name: name.into(),
            value,
            previous_value: None,
            collect_time,
            previous_collect_time: None,
        }
    }

    pub fn commit(&mut self, value: Option<String>, collect_time: i64) {
        self.previous_value = self.value.take();
        self.previous_collect_time = Some(self.collect_time);
        self.value = value;
        self.collect_time = collect_time;
    }
}

/// Presence parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentParam {
    pub name: String,
    pub present: bool,
    pub collect_time: i64,
}

impl PresentParam {
    /// Interpret `1/0`, `true/false`, `yes/no`, `present/missing`
    pub fn interpret(raw: &str) -> Option<bool> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "present" => Some(true),
            "0" | "false" | "no" | "missing" | "absent" => Some(false),
            _ => None,
        }
    }
}

/// Parameter of a monitor, keyed by its name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Parameter {
    Status(StatusParam),
    Number(NumberParam),
    Text(TextParam),
    Present(PresentParam),
}

impl Parameter {
    pub fn name(&self) -> &str {
        match self {
            Parameter::Status(p) => &p.name,
            Parameter::Number(p) => &p.name,
            Parameter::Text(p) => &p.name,
            Parameter::Present(p) => &p.name,
        }
    }

    pub fn collect_time(&self) -> Option<i64> {
        match self {
            Parameter::Status(p) => Some(p.collect_time),
            Parameter::Number(p) => p.collect_time,
            Parameter::Text(p) => Some(p.collect_time),
            Parameter::Present(p) => Some(p.collect_time),
        }
    }

    pub fn unit(&self) -> Option<&str> {
        match self {
            Parameter::Number(p) => p.unit.as_deref(),
            _ => None,
        }
    }

    /// Numeric value an exporter would publish as a gauge
    pub fn numeric_value(&self) -> Option<f64> {
        match self {
            Parameter::Status(p) => Some(f64::from(p.ordinal())),
            Parameter::Number(p) => p.value,
            Parameter::Text(_) => None,
            Parameter::Present(p) => Some(if p.present { 1.0 } else { 0.0 }),
        }
    }

    /// Free text of a status parameter
    pub fn status_information(&self) -> Option<&str> {
        match self {
            Parameter::Status(p) => Some(&p.status_information),
            _ => None,
        }
    }

    /// One-line rendering appended to the status information of the monitor.
    ///
    /// `None` when the parameter has no value.
    pub fn format_value_as_string(&self) -> Option<String> {
        match self {
            Parameter::Status(p) => {
                Some(p.status_information.clone()).filter(|info| !info.is_empty())
            }
            Parameter::Number(p) => p.value.map(|value| match p.unit.as_deref() {
                Some(unit) if !unit.is_empty() => format!("{}: {} {}", p.name, value, unit),
                _ => format!("{}: {}", p.name, value),
            }),
            Parameter::Text(p) => p
                .value
                .as_deref()
                .filter(|value| !value.trim().is_empty())
                .map(|value| format!("{}: {}", p.name, value)),
            Parameter::Present(p) => Some(format!(
                "{}: {}",
                p.name,
                if p.present { "Present" } else { "Missing" }
            )),
        }
    }

    pub fn as_status(&self) -> Option<&StatusParam> {
        match self {
            Parameter::Status(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&NumberParam> {
        match self {
            Parameter::Number(p) => Some(p),
            _ => None,
        }
    }
}
