//! Values derived across collection cycles
//!
//! Every derivation reads the previous sample of a parameter before the
//! current cycle is committed to it. A missing previous sample, a clock that
//! did not move forward or a counter that went backwards yields no value for
//! this cycle.

use tracing::debug;

use hs_connector::names::{self, unit};
use hs_connector::MetricCatalog;

use crate::constants::units::MILLIS_PER_SECOND;
use crate::model::Monitor;

/// Per-second rate of a counter
pub(super) fn rate(current: f64, collect_time: i64, previous: Option<(f64, i64)>) -> Option<f64> {
    let (previous_value, previous_time) = previous?;
    let elapsed_ms = collect_time.checked_sub(previous_time)?;
    if elapsed_ms <= 0 || current < previous_value {
        return None;
    }
    Some((current - previous_value) / (elapsed_ms as f64 / MILLIS_PER_SECOND))
}

/// Increase of a counter since the previous sample
pub(super) fn delta(current: f64, previous: Option<f64>) -> Option<f64> {
    let previous = previous?;
    (current >= previous).then(|| current - previous)
}

/// Joules consumed at `watts` since the previous collection
pub(super) fn energy_from_power(watts: f64, collect_time: i64, previous_time: Option<i64>) -> Option<f64> {
    let elapsed_ms = collect_time.checked_sub(previous_time?)?;
    (elapsed_ms > 0).then(|| watts * (elapsed_ms as f64 / MILLIS_PER_SECOND))
}

/// Collect the power consumption / energy usage pair.
///
/// A cumulative energy counter wins over an instantaneous power reading:
/// power is then the energy rate and the displayed energy is the increase
/// since the previous cycle. Otherwise the power reading is stored and the
/// energy is integrated over the elapsed time.
pub(super) fn collect_power(
    monitor: &mut Monitor,
    catalog: &MetricCatalog,
    energy: Option<f64>,
    power: Option<f64>,
    collect_time: i64,
    hostname: &str,
) {
    let energy_unit = catalog.unit_of(names::ENERGY_USAGE).unwrap_or(unit::JOULES);
    let power_unit = catalog.unit_of(names::POWER_CONSUMPTION).unwrap_or(unit::WATTS);

    if let Some(energy) = energy.filter(|value| *value >= 0.0) {
        let watts = monitor.update_number_param(names::ENERGY_USAGE, Some(energy_unit), |param| {
            let previous = param.last_sample();
            let joules = delta(energy, previous.map(|(value, _)| value));
            let watts = rate(energy, collect_time, previous);
            param.commit(joules, Some(energy), collect_time);
            watts
        });

        match watts {
            Some(watts) => monitor.update_number_param(names::POWER_CONSUMPTION, Some(power_unit), |param| {
                param.commit(Some(watts), Some(watts), collect_time)
            }),
            None => debug!(
                "Hostname {} - Cannot compute the power consumption of monitor {} yet. Current energy usage {}",
                hostname, monitor.id, energy
            ),
        }
        return;
    }

    if let Some(watts) = power.filter(|value| *value >= 0.0) {
        let joules = monitor.update_number_param(names::POWER_CONSUMPTION, Some(power_unit), |param| {
            let previous_time = param.collect_time;
            param.commit(Some(watts), Some(watts), collect_time);
            energy_from_power(watts, collect_time, previous_time)
        });

        match joules {
            Some(joules) => monitor.update_number_param(names::ENERGY_USAGE, Some(energy_unit), |param| {
                param.commit(Some(joules), Some(joules), collect_time)
            }),
            None => debug!(
                "Hostname {} - Cannot compute the energy usage of monitor {} yet. Current power consumption {}",
                hostname, monitor.id, watts
            ),
        }
    }
}
