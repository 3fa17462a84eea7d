//! Battery status

use crate::error::CollectError;
use crate::platform::PlatformProbe;
use crate::types::{BatterySnapshot, ProcessRecord};

const POWER_HUNGRY_LIMIT: usize = 5;

/// Battery snapshot; a host without a battery is a successful, empty reading
pub async fn battery_snapshot(
    probe: &dyn PlatformProbe,
    processes: Vec<ProcessRecord>,
) -> Result<BatterySnapshot, CollectError> {
    let hungry = super::process::power_hungry(processes, POWER_HUNGRY_LIMIT);

    match probe.battery().await? {
        Some(reading) => Ok(BatterySnapshot::from_reading(reading, hungry)),
        None => {
            tracing::debug!("No battery found on {}", probe.platform());
            Ok(BatterySnapshot::absent("no battery detected", hungry))
        }
    }
}
