//! Well-known parameter names and units
//!
//! Parameter names are the keys of a monitor's parameter map and of the
//! connector value-table mapping.

pub const STATUS: &str = "status";
pub const STATUS_INFORMATION: &str = "statusInformation";
pub const INTRUSION_STATUS: &str = "intrusionStatus";
pub const PRESENT: &str = "present";
pub const PREDICTED_FAILURE: &str = "predictedFailure";

pub const ENERGY_USAGE: &str = "energyUsage";
pub const POWER_CONSUMPTION: &str = "powerConsumption";

pub const SPEED: &str = "speed";
pub const SPEED_PERCENT: &str = "speedPercent";
pub const TEMPERATURE: &str = "temperature";
pub const VOLTAGE: &str = "voltage";
pub const CHARGE: &str = "charge";
pub const USED_CAPACITY: &str = "usedCapacity";
pub const CURRENT_SPEED: &str = "currentSpeed";
pub const CORRECTED_ERROR_COUNT: &str = "correctedErrorCount";
pub const ERROR_COUNT: &str = "errorCount";
pub const ERROR_STATUS: &str = "errorStatus";
pub const ENDURANCE_REMAINING: &str = "enduranceRemaining";
pub const BATTERY_STATUS: &str = "batteryStatus";
pub const CONTROLLER_STATUS: &str = "controllerStatus";
pub const UNALLOCATED_SPACE: &str = "unallocatedSpace";
pub const COLOR: &str = "color";
pub const LED_INDICATOR: &str = "ledIndicator";
pub const LINK_STATUS: &str = "linkStatus";
pub const LINK_SPEED: &str = "linkSpeed";
pub const RECEIVED_BYTES: &str = "receivedBytes";
pub const RECEIVED_BYTES_RATE: &str = "receivedBytesRate";
pub const TRANSMITTED_BYTES: &str = "transmittedBytes";
pub const TRANSMITTED_BYTES_RATE: &str = "transmittedBytesRate";
pub const USAGE_COUNT: &str = "usageCount";
pub const VALUE: &str = "value";

/// Units
pub mod unit {
    pub const WATTS: &str = "Watts";
    pub const JOULES: &str = "Joules";
    pub const RPM: &str = "rpm";
    pub const PERCENT: &str = "%";
    pub const CELSIUS: &str = "°C";
    pub const MILLIVOLTS: &str = "mV";
    pub const MEGAHERTZ: &str = "MHz";
    pub const MEGABYTES_PER_SECOND: &str = "MB/s";
    pub const BYTES_PER_SECOND: &str = "Bytes/s";
    pub const GIGABYTES: &str = "GB";
    pub const ERRORS: &str = "errors";
}
