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

//! Monitors known to the agent
//!
//! Each monitor sits behind its own lock so that jobs touching different
//! devices never wait on each other. The map lock is only held to find or
//! insert an entry.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use hs_core::Monitor;

pub type SharedMonitor = Arc<Mutex<Monitor>>;

#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    monitors: Arc<RwLock<BTreeMap<String, SharedMonitor>>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monitor registered under `id`, created by `create` on first use
    pub fn get_or_insert_with(&self, id: &str, create: impl FnOnce() -> Monitor) -> SharedMonitor {
        if let Some(monitor) = self.monitors.read().get(id) {
            return Arc::clone(monitor);
        }
        let mut monitors = self.monitors.write();
        Arc::clone(
            monitors
                .entry(id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(create()))),
        )
    }

    pub fn get(&self, id: &str) -> Option<SharedMonitor> {
        self.monitors.read().get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> Option<SharedMonitor> {
        self.monitors.write().remove(id)
    }

    pub fn len(&self) -> usize {
        self.monitors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.read().is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.monitors.read().keys().cloned().collect()
    }

    /// Copy of every monitor, ordered by registry id
    pub fn snapshot(&self) -> Vec<Monitor> {
        let handles: Vec<SharedMonitor> = self.monitors.read().values().cloned().collect();
        handles.iter().map(|monitor| monitor.lock().clone()).collect()
    }
}
