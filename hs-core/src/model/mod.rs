//! Monitor and parameter model

mod monitor;
mod parameter;

pub use monitor::Monitor;
pub use parameter::{
    build_status_information, NumberParam, Parameter, ParameterState, PresentParam, StatusParam,
    TextParam,
};
