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

//! Agent configuration
//!
//! The agent reads one JSON document describing the engine settings and the
//! collection jobs. Each job replays protocol snapshots through a compute
//! pipeline and collects the resulting rows into monitors of one type.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use hs_connector::{Compute, MetricCatalog, MonitorType};
use hs_core::{EngineSettings, RowMapping};

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "HWSENTRY_CONFIG";

const MAX_CONCURRENCY: usize = 256;
const MAX_JOBS: usize = 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No configuration file found (searched: {})", display_paths(.0))]
    NotFound(Vec<PathBuf>),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn default_hostname() -> String {
    "localhost".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_concurrency() -> usize {
    4
}

fn default_cycle_interval_ms() -> u64 {
    60_000
}

fn default_cycle_deadline_ms() -> u64 {
    30_000
}

fn default_id_column() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Host the collected devices belong to, used in diagnostics
    #[serde(default = "default_hostname")]
    pub hostname: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Jobs running at the same time
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "default_cycle_interval_ms")]
    pub cycle_interval_ms: u64,
    /// How long a cycle waits for its jobs before moving on
    #[serde(default = "default_cycle_deadline_ms")]
    pub cycle_deadline_ms: u64,
    #[serde(default)]
    pub engine: EngineSettings,
    pub jobs: Vec<JobConfig>,
}

/// One connector source collected into monitors of one type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    pub name: String,
    pub connector: String,
    /// Diagnostic key of the source, e.g. `enclosure.collect.source(1)`
    #[serde(default)]
    pub source_key: Option<String>,
    pub monitor_type: MonitorType,
    /// Protocol output replayed round-robin, one snapshot per cycle
    #[serde(default)]
    pub snapshots: Vec<String>,
    #[serde(default)]
    pub computes: Vec<Compute>,
    #[serde(default)]
    pub mapping: RowMapping,
    /// 1-based column identifying the device of each row
    #[serde(default = "default_id_column")]
    pub id_column: usize,
    /// Replaces the built-in catalog of the monitor type
    #[serde(default)]
    pub catalog: Option<MetricCatalog>,
}

impl JobConfig {
    pub fn source_key(&self) -> String {
        self.source_key
            .clone()
            .unwrap_or_else(|| format!("{}.collect.source(1)", self.name))
    }

    pub fn catalog(&self) -> MetricCatalog {
        self.catalog
            .clone()
            .unwrap_or_else(|| MetricCatalog::builtin(self.monitor_type))
    }
}

/// Candidate configuration files, most specific first
pub fn config_search_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }
    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return vec![PathBuf::from(path)];
        }
    }

    let mut paths = Vec::new();
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        paths.push(Path::new(&xdg).join("hwsentry").join("config.json"));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config").join("hwsentry").join("config.json"));
    }
    paths.push(PathBuf::from("/etc/hwsentry/config.json"));
    paths
}

/// Load and validate the configuration from the first existing candidate
pub fn load_agent_config(explicit: Option<&Path>) -> Result<AgentConfig, ConfigError> {
    let candidates = config_search_paths(explicit);
    let path = candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .ok_or_else(|| ConfigError::NotFound(candidates.clone()))?;

    let data = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config: AgentConfig =
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse { path, source })?;
    validate_agent_config(&config)?;
    Ok(config)
}

fn is_safe_name(s: &str) -> bool {
    if s.is_empty() || s.len() > 128 {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | '-' | '.' | ' ' | '@' | '(' | ')'))
}

pub fn validate_agent_config(cfg: &AgentConfig) -> Result<(), ConfigError> {
    if cfg.jobs.is_empty() {
        return Err(ConfigError::Invalid("at least one job is required".to_string()));
    }
    if cfg.jobs.len() > MAX_JOBS {
        return Err(ConfigError::Invalid(format!("too many jobs (max {})", MAX_JOBS)));
    }
    if cfg.max_concurrency == 0 || cfg.max_concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Invalid(format!(
            "max_concurrency must be between 1 and {}",
            MAX_CONCURRENCY
        )));
    }
    if cfg.cycle_interval_ms == 0 || cfg.cycle_deadline_ms == 0 {
        return Err(ConfigError::Invalid(
            "cycle_interval_ms and cycle_deadline_ms must be greater than 0".to_string(),
        ));
    }
    cfg.engine
        .validate()
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;

    let mut names = HashSet::new();
    for (i, job) in cfg.jobs.iter().enumerate() {
        if !is_safe_name(&job.name) {
            return Err(ConfigError::Invalid(format!(
                "invalid characters or length in the name of job #{}",
                i + 1
            )));
        }
        if !names.insert(job.name.as_str()) {
            return Err(ConfigError::Invalid(format!("duplicate job name '{}'", job.name)));
        }
        if job.connector.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("job '{}' has no connector", job.name)));
        }
        if job.snapshots.is_empty() {
            return Err(ConfigError::Invalid(format!("job '{}' has no snapshots", job.name)));
        }
        if job.id_column == 0 {
            return Err(ConfigError::Invalid(format!(
                "job '{}': id_column is 1-based",
                job.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_job(name: &str) -> JobConfig {
        JobConfig {
            name: name.to_string(),
            connector: "GenericEnclosure".to_string(),
            source_key: None,
            monitor_type: MonitorType::Enclosure,
            snapshots: vec!["enc-1;OK;".to_string()],
            computes: Vec::new(),
            mapping: RowMapping::new().with("status", "Column(2)"),
            id_column: 1,
            catalog: None,
        }
    }

    fn create_test_config() -> AgentConfig {
        AgentConfig {
            hostname: "server-01".to_string(),
            log_level: default_log_level(),
            max_concurrency: default_max_concurrency(),
            cycle_interval_ms: default_cycle_interval_ms(),
            cycle_deadline_ms: default_cycle_deadline_ms(),
            engine: EngineSettings::default(),
            jobs: vec![create_test_job("enclosure")],
        }
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let cfg: AgentConfig = serde_json::from_str(
            r#"{
                "jobs": [{
                    "name": "fans",
                    "connector": "GenericFans",
                    "monitor_type": "fan",
                    "snapshots": ["fan1;1200;"],
                    "mapping": { "speed": "Column(2)" }
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.hostname, "localhost");
        assert_eq!(cfg.max_concurrency, 4);
        assert_eq!(cfg.jobs[0].id_column, 1);
        assert_eq!(cfg.jobs[0].source_key(), "fans.collect.source(1)");
        assert_eq!(cfg.jobs[0].catalog().monitor_type, MonitorType::Fan);
        assert!(validate_agent_config(&cfg).is_ok());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result: Result<AgentConfig, _> = serde_json::from_str(r#"{ "jobs": [], "colour": "blue" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_agent_config_valid() {
        assert!(validate_agent_config(&create_test_config()).is_ok());
    }

    #[test]
    fn test_validate_agent_config_no_jobs() {
        let mut cfg = create_test_config();
        cfg.jobs.clear();
        assert!(validate_agent_config(&cfg).is_err());
    }

    #[test]
    fn test_validate_agent_config_duplicate_jobs() {
        let mut cfg = create_test_config();
        cfg.jobs.push(create_test_job("enclosure"));
        let err = validate_agent_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("duplicate job name"));
    }

    #[test]
    fn test_validate_agent_config_concurrency_bounds() {
        let mut cfg = create_test_config();
        cfg.max_concurrency = 0;
        assert!(validate_agent_config(&cfg).is_err());
        cfg.max_concurrency = 257;
        assert!(validate_agent_config(&cfg).is_err());
        cfg.max_concurrency = 256;
        assert!(validate_agent_config(&cfg).is_ok());
    }

    #[test]
    fn test_validate_agent_config_job_without_snapshots() {
        let mut cfg = create_test_config();
        cfg.jobs[0].snapshots.clear();
        assert!(validate_agent_config(&cfg).is_err());
    }

    #[test]
    fn test_validate_agent_config_invalid_job_fields() {
        let mut cfg = create_test_config();
        cfg.jobs[0].name = "bad/name".to_string();
        assert!(validate_agent_config(&cfg).is_err());

        let mut cfg = create_test_config();
        cfg.jobs[0].id_column = 0;
        assert!(validate_agent_config(&cfg).is_err());

        let mut cfg = create_test_config();
        cfg.engine.collaborator_timeout_ms = 0;
        assert!(validate_agent_config(&cfg).is_err());
    }

    #[test]
    fn test_load_agent_config_from_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        let json = serde_json::to_string_pretty(&create_test_config()).unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file.flush().unwrap();

        let cfg = load_agent_config(Some(file.path())).unwrap();
        assert_eq!(cfg.hostname, "server-01");
        assert_eq!(cfg.jobs.len(), 1);
    }

    #[test]
    fn test_load_agent_config_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        file.flush().unwrap();

        let err = load_agent_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_agent_config_missing_file() {
        let err = load_agent_config(Some(Path::new("/nonexistent/hwsentry.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    #[serial]
    fn test_config_path_from_env() {
        env::set_var(CONFIG_ENV_VAR, "/custom/hwsentry.json");
        assert_eq!(config_search_paths(None), vec![PathBuf::from("/custom/hwsentry.json")]);
        env::remove_var(CONFIG_ENV_VAR);
    }

    #[test]
    #[serial]
    fn test_config_path_with_xdg() {
        env::remove_var(CONFIG_ENV_VAR);
        env::set_var("XDG_CONFIG_HOME", "/custom/config");
        let paths = config_search_paths(None);
        assert_eq!(paths[0], PathBuf::from("/custom/config/hwsentry/config.json"));
        assert_eq!(paths.last(), Some(&PathBuf::from("/etc/hwsentry/config.json")));
        env::remove_var("XDG_CONFIG_HOME");
    }

    #[test]
    #[serial]
    fn test_explicit_path_wins() {
        env::set_var(CONFIG_ENV_VAR, "/custom/hwsentry.json");
        let paths = config_search_paths(Some(Path::new("/tmp/agent.json")));
        assert_eq!(paths, vec![PathBuf::from("/tmp/agent.json")]);
        env::remove_var(CONFIG_ENV_VAR);
    }
}
