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

//! Collection cycles
//!
//! A cycle fetches the table of every job, runs its compute pipeline and
//! collects each row into the monitor identified by the row. Jobs run
//! concurrently on the blocking pool, bounded by a semaphore, and the cycle
//! stops waiting for them once its deadline passes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use hs_core::{
    ComputeContext, ComputeExecutor, DefaultTextProcessor, Monitor, ParameterCollector, Result,
    SentryError, TextProcessor,
};

use crate::config::{AgentConfig, JobConfig};
use crate::provider::{ReplayProvider, TableProvider};
use crate::registry::DeviceRegistry;

/// Outcome of one collection cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    pub jobs_completed: usize,
    pub jobs_failed: usize,
    pub rows_collected: usize,
    pub timed_out: bool,
}

/// A configured job with its pipeline and collector
pub struct Job {
    config: JobConfig,
    executor: ComputeExecutor,
    collector: ParameterCollector,
}

impl Job {
    pub fn new(hostname: &str, config: JobConfig, processor: Arc<dyn TextProcessor>) -> Self {
        let context = ComputeContext::new(hostname, config.connector.clone(), config.source_key());
        let collector = ParameterCollector::new(hostname, config.catalog(), config.mapping.clone());
        Self {
            executor: ComputeExecutor::new(context, processor),
            collector,
            config,
        }
    }

    pub fn with_unknown_status(mut self, unknown_status: Option<hs_core::ParameterState>) -> Self {
        self.collector = self.collector.with_unknown_status(unknown_status);
        self
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Fetch, transform and collect one table. Returns the number of rows collected.
    fn run(
        &self,
        provider: &dyn TableProvider,
        registry: &DeviceRegistry,
        cycle: u64,
        collect_time: i64,
    ) -> Result<usize> {
        let mut table = provider.fetch(&self.config.name, cycle)?;
        self.executor.apply(&mut table, &self.config.computes);

        let monitor_type = self.config.monitor_type;
        let id_index = self
            .config
            .id_column
            .checked_sub(1)
            .ok_or_else(|| SentryError::invalid_config("id_column", "columns are 1-based"))?;

        let mut collected = 0;
        for row in table.rows() {
            let Some(id) = row.get(id_index).map(|cell| cell.trim()).filter(|id| !id.is_empty()) else {
                warn!(
                    "Job {} - Row without an identifier in column {}: {:?}",
                    self.config.name, self.config.id_column, row
                );
                continue;
            };

            let key = format!("{}:{}", monitor_type, id);
            let monitor = registry.get_or_insert_with(&key, || {
                Monitor::new(id, format!("{} {}", monitor_type, id), monitor_type)
                    .with_attribute("connector", self.config.connector.clone())
            });
            self.collector.collect(&mut monitor.lock(), row, collect_time);
            collected += 1;
        }
        Ok(collected)
    }
}

pub struct Scheduler {
    jobs: Vec<Arc<Job>>,
    provider: Arc<dyn TableProvider>,
    registry: DeviceRegistry,
    semaphore: Arc<Semaphore>,
    interval: Duration,
    deadline: Duration,
}

impl Scheduler {
    pub fn new(
        config: &AgentConfig,
        provider: Arc<dyn TableProvider>,
        processor: Arc<dyn TextProcessor>,
    ) -> Self {
        let jobs = config
            .jobs
            .iter()
            .map(|job| {
                Arc::new(
                    Job::new(&config.hostname, job.clone(), Arc::clone(&processor))
                        .with_unknown_status(config.engine.unknown_status),
                )
            })
            .collect();

        Self {
            jobs,
            provider,
            registry: DeviceRegistry::new(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrency.max(1))),
            interval: Duration::from_millis(config.cycle_interval_ms.max(1)),
            deadline: Duration::from_millis(config.cycle_deadline_ms.max(1)),
        }
    }

    /// Scheduler replaying the configured snapshots with the default text processor
    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(
            config,
            Arc::new(ReplayProvider::from_config(config)),
            Arc::new(DefaultTextProcessor::from_settings(&config.engine)),
        )
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn job_names(&self) -> Vec<&str> {
        self.jobs.iter().map(|job| job.name()).collect()
    }

    /// Run every job once with the given collect time (epoch milliseconds)
    pub async fn run_cycle(&self, cycle: u64, collect_time: i64) -> CycleReport {
        let mut report = CycleReport {
            cycle,
            ..CycleReport::default()
        };
        let deadline = Instant::now() + self.deadline;

        let mut tasks = JoinSet::new();
        for job in &self.jobs {
            let job = Arc::clone(job);
            let provider = Arc::clone(&self.provider);
            let registry = self.registry.clone();
            let semaphore = Arc::clone(&self.semaphore);

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| SentryError::generic(format!("Job {}: {}", job.name(), e)))?;
                let name = job.name().to_string();
                tokio::task::spawn_blocking(move || {
                    job.run(provider.as_ref(), &registry, cycle, collect_time)
                        .map_err(|e| SentryError::generic(format!("Job {}: {}", job.name(), e)))
                })
                .await
                .map_err(|e| SentryError::generic(format!("Job {} panicked: {}", name, e)))?
            });
        }

        loop {
            match time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok(Ok(rows)))) => {
                    report.jobs_completed += 1;
                    report.rows_collected += rows;
                }
                Ok(Some(Ok(Err(e)))) => {
                    report.jobs_failed += 1;
                    warn!("Cycle {} - {}", cycle, e);
                }
                Ok(Some(Err(e))) => {
                    report.jobs_failed += 1;
                    warn!("Cycle {} - Job task failed: {}", cycle, e);
                }
                Ok(None) => break,
                Err(_) => {
                    report.timed_out = true;
                    warn!(
                        "Cycle {} - Deadline of {:?} exceeded, {} job(s) still running",
                        cycle,
                        self.deadline,
                        tasks.len()
                    );
                    tasks.detach_all();
                    break;
                }
            }
        }

        debug!("Cycle {} - {:?}", cycle, report);
        report
    }

    /// Run `cycles` cycles, or forever when `None`, one per interval
    pub async fn run(&self, cycles: Option<u64>) -> u64 {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut cycle = 0;
        while cycles.map_or(true, |limit| cycle < limit) {
            ticker.tick().await;
            let collect_time = chrono::Utc::now().timestamp_millis();
            let report = self.run_cycle(cycle, collect_time).await;
            info!(
                "Cycle {} done: {} job(s) completed, {} failed, {} row(s) collected",
                report.cycle, report.jobs_completed, report.jobs_failed, report.rows_collected
            );
            cycle += 1;
        }
        cycle
    }
}
