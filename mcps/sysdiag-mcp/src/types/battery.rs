//! Battery and power types

use serde::{Deserialize, Serialize};

use super::{Metric, ProcessRecord};

/// Charging state of the primary battery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeState {
    Charging,
    Discharging,
    Full,
    NotCharging,
    Unknown,
}

impl ChargeState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "charging" => ChargeState::Charging,
            "discharging" => ChargeState::Discharging,
            "full" | "charged" => ChargeState::Full,
            "not charging" | "ac attached" => ChargeState::NotCharging,
            _ => ChargeState::Unknown,
        }
    }
}

/// Power subsystem reading
///
/// A host without a battery still yields a snapshot: `battery_present` is
/// false and every battery field is tagged unavailable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatterySnapshot {
    pub battery_present: bool,
    pub charge_percent: Metric<f64>,
    pub state: Metric<ChargeState>,
    pub power_plugged: Metric<bool>,
    /// Estimated time to empty (discharging) or to full (charging)
    pub time_remaining_secs: Metric<u64>,
    /// Full-charge capacity relative to design capacity (0-100)
    pub health_percent: Metric<f64>,
    pub cycle_count: Metric<u32>,
    pub technology: Metric<String>,
    /// Processes above 5% CPU, highest first
    pub power_hungry_processes: Vec<ProcessRecord>,
}

/// Raw battery reading produced by a platform probe
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatteryReading {
    pub charge_percent: Option<f64>,
    pub state: Option<ChargeState>,
    pub power_plugged: Option<bool>,
    pub time_remaining_secs: Option<u64>,
    pub health_percent: Option<f64>,
    pub cycle_count: Option<u32>,
    pub technology: Option<String>,
}

impl BatterySnapshot {
    /// Snapshot for a host with no readable battery
    pub fn absent(reason: &str, power_hungry_processes: Vec<ProcessRecord>) -> Self {
        Self {
            battery_present: false,
            charge_percent: Metric::platform(reason),
            state: Metric::platform(reason),
            power_plugged: Metric::platform(reason),
            time_remaining_secs: Metric::platform(reason),
            health_percent: Metric::platform(reason),
            cycle_count: Metric::platform(reason),
            technology: Metric::platform(reason),
            power_hungry_processes,
        }
    }

    pub fn from_reading(reading: BatteryReading, power_hungry_processes: Vec<ProcessRecord>) -> Self {
        Self {
            battery_present: true,
            charge_percent: Metric::from_option(reading.charge_percent, "charge level not reported"),
            state: Metric::from_option(reading.state, "charging state not reported"),
            power_plugged: Metric::from_option(reading.power_plugged, "power source not reported"),
            time_remaining_secs: Metric::from_option(
                reading.time_remaining_secs,
                "time estimate not available yet",
            ),
            health_percent: Metric::from_option(
                reading.health_percent,
                "design capacity not reported",
            ),
            cycle_count: Metric::from_option(reading.cycle_count, "cycle count not reported"),
            technology: Metric::from_option(reading.technology, "technology not reported"),
            power_hungry_processes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AvailabilityStatus;

    #[test]
    fn test_absent_battery_marks_every_field() {
        let snapshot = BatterySnapshot::absent("no battery detected", Vec::new());
        assert!(!snapshot.battery_present);
        assert_eq!(
            snapshot.charge_percent.status(),
            AvailabilityStatus::UnavailablePlatform
        );
        assert_eq!(snapshot.cycle_count.reason(), Some("no battery detected"));
    }

    #[test]
    fn test_charge_state_parse() {
        assert_eq!(ChargeState::parse("Charging"), ChargeState::Charging);
        assert_eq!(ChargeState::parse("charged"), ChargeState::Full);
        assert_eq!(ChargeState::parse("Not charging"), ChargeState::NotCharging);
        assert_eq!(ChargeState::parse("??"), ChargeState::Unknown);
    }
}
