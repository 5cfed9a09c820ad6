//! Connector model for hwsentry
//!
//! Connectors are third-party authored definitions describing how to decode the
//! output of a device family. This crate holds their in-memory shape only; the
//! loaders that produce these values from connector files live elsewhere and
//! the engine in `hs-core` consumes them.
//!
//! # Module Structure
//!
//! - `compute` - The closed set of table transformation operations
//! - `catalog` - Per-monitor-type metric catalogs
//! - `names` - Well-known parameter names and units

pub mod catalog;
pub mod compute;
pub mod names;

pub use catalog::{Derivation, MetaParameter, MetricCatalog, MonitorType, ParameterKind};
pub use compute::{Compute, ConversionType, TranslationTable};
