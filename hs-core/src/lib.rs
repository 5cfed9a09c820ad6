//! hwsentry Core Library
//!
//! The data-normalization and derived-metric engine of the hwsentry agent.
//!
//! # Features
//!
//! - **Source tables**: Rows of string cells kept consistent with their raw text
//! - **Compute pipeline**: Fail-soft execution of connector-authored table operations
//! - **Legacy patterns**: Translation of the connector pattern dialect to regexes
//! - **Parameters**: Typed status, number, text and presence values with cycle history
//! - **Collection**: Row to parameter mapping, status summaries, rates and the
//!   power / energy pair
//!
//! # Module Structure
//!
//! - `table` - `SourceTable` and its canonical serialization
//! - `pattern` - Legacy pattern translation
//! - `text` - Column selection helpers for text output
//! - `compute/` - Pipeline executor and operations
//! - `model/` - Monitors and parameters
//! - `collect/` - Parameter collector
//! - `settings` - Engine settings
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use hs_connector::{Compute, MetricCatalog, MonitorType};
//! use hs_core::{
//!     ComputeContext, ComputeExecutor, DefaultTextProcessor, Monitor, ParameterCollector,
//!     RowMapping, SourceTable,
//! };
//!
//! let executor = ComputeExecutor::new(
//!     ComputeContext::new("server-01", "GenericFans", "fan.collect.source(1)"),
//!     Arc::new(DefaultTextProcessor::default()),
//! );
//! let mut table = SourceTable::from_raw_text("fan1;2400;\n");
//! executor.apply(&mut table, &[Compute::Divide { column: Some(2), divide_by: Some("2".into()) }]);
//!
//! let collector = ParameterCollector::new(
//!     "server-01",
//!     MetricCatalog::builtin(MonitorType::Fan),
//!     RowMapping::new().with("speed", "Column(2)"),
//! );
//! let mut fan = Monitor::new("fan1", "Fan 1", MonitorType::Fan);
//! collector.collect(&mut fan, &table.rows()[0], 0);
//! ```

// Grouped modules
pub mod collect;
pub mod compute;
pub mod model;

// Standalone modules
pub mod constants;
pub mod pattern;
pub mod settings;
pub mod table;
pub mod text;

pub use collect::{ParameterCollector, RowMapping, StatusFormatter, StatusInformationRegistry};
pub use compute::{ComputeContext, ComputeExecutor, DefaultTextProcessor, TextProcessor};
pub use model::{
    build_status_information, Monitor, NumberParam, Parameter, ParameterState, PresentParam,
    StatusParam, TextParam,
};
pub use settings::EngineSettings;
pub use table::SourceTable;

pub use hs_error::{Result, SentryError};
