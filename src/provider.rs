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

//! Sources of raw tables
//!
//! Protocol clients are out of scope for the agent; tables come from a
//! provider. The replay provider serves recorded protocol output.

use std::collections::HashMap;

use hs_core::{Result, SentryError, SourceTable};

use crate::config::AgentConfig;

/// Produces the raw table of a job for a given cycle
#[cfg_attr(test, mockall::automock)]
pub trait TableProvider: Send + Sync {
    fn fetch(&self, job: &str, cycle: u64) -> Result<SourceTable>;
}

/// Serves the configured snapshots of each job round-robin
#[derive(Debug, Clone, Default)]
pub struct ReplayProvider {
    snapshots: HashMap<String, Vec<String>>,
}

impl ReplayProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        config.jobs.iter().fold(Self::new(), |provider, job| {
            provider.with_snapshots(job.name.clone(), job.snapshots.clone())
        })
    }

    pub fn with_snapshots(mut self, job: impl Into<String>, snapshots: Vec<String>) -> Self {
        self.snapshots.insert(job.into(), snapshots);
        self
    }
}

impl TableProvider for ReplayProvider {
    fn fetch(&self, job: &str, cycle: u64) -> Result<SourceTable> {
        let snapshots = self
            .snapshots
            .get(job)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SentryError::MissingConfig(format!("no snapshots for job '{}'", job)))?;
        let index = (cycle % snapshots.len() as u64) as usize;
        Ok(SourceTable::from_raw_text(snapshots[index].as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshots_rotate_per_cycle() {
        let provider = ReplayProvider::new()
            .with_snapshots("fans", vec!["fan1;1000;".to_string(), "fan1;2000;".to_string()]);

        assert_eq!(provider.fetch("fans", 0).unwrap().rows()[0][1], "1000");
        assert_eq!(provider.fetch("fans", 1).unwrap().rows()[0][1], "2000");
        assert_eq!(provider.fetch("fans", 2).unwrap().rows()[0][1], "1000");
    }

    #[test]
    fn test_unknown_job() {
        let provider = ReplayProvider::new().with_snapshots("empty", Vec::new());
        assert!(matches!(provider.fetch("fans", 0), Err(SentryError::MissingConfig(_))));
        assert!(matches!(provider.fetch("empty", 0), Err(SentryError::MissingConfig(_))));
    }
}
