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

//! Structured logging setup
//!
//! `RUST_LOG` overrides the level from the configuration file.

use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: &str = "info";

/// Filter directive to use given the environment and the configured level
pub fn effective_filter(env_filter: Option<&str>, configured: Option<&str>) -> String {
    [env_filter, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|directive| !directive.is_empty() && EnvFilter::try_new(directive).is_ok())
        .unwrap_or(DEFAULT_LEVEL)
        .to_string()
}

/// Install the global fmt subscriber. Safe to call more than once.
pub fn init_logging(configured: Option<&str>) {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = effective_filter(from_env.as_deref(), configured);

    let result = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(EnvFilter::new(&directive))
        .try_init();

    if result.is_ok() {
        tracing::debug!("Logging initialized with filter '{}'", directive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_wins() {
        assert_eq!(effective_filter(Some("debug"), Some("warn")), "debug");
    }

    #[test]
    fn test_configured_level_is_used_without_environment() {
        assert_eq!(effective_filter(None, Some("warn")), "warn");
        assert_eq!(effective_filter(Some("  "), Some("hs_core=trace")), "hs_core=trace");
    }

    #[test]
    fn test_default_level() {
        assert_eq!(effective_filter(None, None), "info");
        assert_eq!(effective_filter(None, Some("")), "info");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_logging(Some("info"));
        init_logging(Some("debug"));
    }
}
