/*
 * This file is part of hwsentry.
 *
 * Copyright (C) 2025 hwsentry contributors
 *
 * hwsentry is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * hwsentry is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with hwsentry. If not, see <https://www.gnu.org/licenses/>.
 */

//! hwsentry - Hardware monitoring agent
//!
//! Replays protocol output through the `hs-core` normalization engine and
//! keeps the resulting monitors in a shared registry.
//!
//! # Module Structure
//!
//! - `config` - Agent configuration loading and validation
//! - `logger` - tracing subscriber setup
//! - `provider` - Sources of raw tables
//! - `registry` - Shared monitor registry
//! - `scheduler` - Concurrent collection cycles

pub mod config;
pub mod logger;
pub mod provider;
pub mod registry;
pub mod scheduler;

pub use config::{load_agent_config, AgentConfig, ConfigError, JobConfig};
pub use provider::{ReplayProvider, TableProvider};
pub use registry::DeviceRegistry;
pub use scheduler::{CycleReport, Job, Scheduler};
