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

//! hwsentryd - collection daemon

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use hwsentry::config::{config_search_paths, load_agent_config};
use hwsentry::logger::init_logging;
use hwsentry::Scheduler;

#[derive(Parser)]
#[command(name = "hwsentryd")]
#[command(version)]
#[command(about = "hwsentry - Hardware monitoring collection agent")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to $HWSENTRY_CONFIG or the XDG location)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, overrides the configured level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Number of cycles, 0 runs until interrupted
    #[arg(long, default_value_t = 1)]
    pub cycles: u64,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate the configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_agent_config(cli.config.as_deref()).with_context(|| {
        format!(
            "Loading configuration (candidates: {:?})",
            config_search_paths(cli.config.as_deref())
        )
    })?;
    init_logging(Some(cli.log_level.as_deref().unwrap_or(&config.log_level)));

    if let Some(Commands::Check) = cli.command {
        println!("Configuration OK: {} job(s)", config.jobs.len());
        return Ok(());
    }

    let scheduler = Scheduler::from_config(&config);
    info!(
        "Hostname {} - Starting {} job(s): {}",
        config.hostname,
        config.jobs.len(),
        scheduler.job_names().join(", ")
    );

    let limit = (cli.cycles > 0).then_some(cli.cycles);
    tokio::select! {
        _ = scheduler.run(limit) => {}
        _ = tokio::signal::ctrl_c() => info!("Interrupted, stopping"),
    }

    let monitors = scheduler.registry().snapshot();
    println!(
        "{}",
        serde_json::to_string_pretty(&monitors).context("Serializing monitors")?
    );
    Ok(())
}
