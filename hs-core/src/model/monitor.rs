//! Monitored devices

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use hs_connector::MonitorType;

use super::parameter::{NumberParam, Parameter, ParameterState, PresentParam, StatusParam, TextParam};

/// A monitored device and its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitor {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub name: String,
    pub monitor_type: MonitorType,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, Parameter>,
}

impl Monitor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, monitor_type: MonitorType) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            name: name.into(),
            monitor_type,
            attributes: BTreeMap::new(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    /// Insert or replace a parameter under its own name
    pub fn add_parameter(&mut self, parameter: Parameter) {
        self.parameters
            .insert(parameter.name().to_string(), parameter);
    }

    pub fn status_param(&self, name: &str) -> Option<&StatusParam> {
        self.parameters.get(name).and_then(Parameter::as_status)
    }

    pub fn status_param_mut(&mut self, name: &str) -> Option<&mut StatusParam> {
        match self.parameters.get_mut(name) {
            Some(Parameter::Status(param)) => Some(param),
            _ => None,
        }
    }

    pub fn number_param(&self, name: &str) -> Option<&NumberParam> {
        self.parameters.get(name).and_then(Parameter::as_number)
    }

    /// Run `f` on the number parameter with this name, created empty when
    /// missing. A parameter of another kind under the same name is replaced.
    pub fn update_number_param<T>(
        &mut self,
        name: &str,
        unit: Option<&str>,
        f: impl FnOnce(&mut NumberParam) -> T,
    ) -> T {
        let mut param = match self.parameters.remove(name) {
            Some(Parameter::Number(param)) => param,
            _ => NumberParam::new(name, unit),
        };
        let result = f(&mut param);
        self.parameters
            .insert(name.to_string(), Parameter::Number(param));
        result
    }

    /// Commit a new state to the status parameter with this name, creating it
    /// on first collection
    pub fn update_status_param(&mut self, name: &str, state: ParameterState, text: &str, collect_time: i64) {
        match self.parameters.get_mut(name) {
            Some(Parameter::Status(param)) => param.commit(state, text, collect_time),
            _ => self.add_parameter(Parameter::Status(StatusParam::new(
                name,
                state,
                text,
                collect_time,
            ))),
        }
    }

    pub fn update_text_param(&mut self, name: &str, value: Option<String>, collect_time: i64) {
        match self.parameters.get_mut(name) {
            Some(Parameter::Text(param)) => param.commit(value, collect_time),
            _ => self.add_parameter(Parameter::Text(TextParam::new(name, value, collect_time))),
        }
    }

    pub fn update_present_param(&mut self, name: &str, present: bool, collect_time: i64) {
        self.add_parameter(Parameter::Present(PresentParam {
            name: name.to_string(),
            present,
            collect_time,
        }));
    }
}
