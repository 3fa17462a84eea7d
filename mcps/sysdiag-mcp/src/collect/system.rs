//! OS identity, boot time and uptime

use chrono::{DateTime, Utc};
use sysinfo::System;

use crate::platform::Platform;
use crate::types::{ByteSize, LoadAverage, Metric, SystemSnapshot, UptimeInfo};

/// Collect the system overview
pub fn system_snapshot(platform: Platform) -> SystemSnapshot {
    let mut sys = System::new();
    sys.refresh_cpu_all();
    sys.refresh_memory();

    let cpus = sys.cpus();

    SystemSnapshot {
        os_type: platform.to_string(),
        os_name: Metric::from_option(System::name(), "OS name not reported"),
        os_version: Metric::from_option(System::os_version(), "OS version not reported"),
        long_os_version: Metric::from_option(
            System::long_os_version(),
            "OS version not reported",
        ),
        kernel_version: Metric::from_option(
            System::kernel_version(),
            "kernel version not reported",
        ),
        hostname: Metric::from_option(System::host_name(), "hostname not reported"),
        architecture: std::env::consts::ARCH.to_string(),
        processor: super::cpu::brand(cpus.first().map(|c| c.brand())),
        physical_cores: Metric::from_option(
            sys.physical_core_count(),
            "physical core count not reported",
        ),
        logical_cores: cpus.len(),
        total_memory: ByteSize::new(sys.total_memory()),
        uptime: uptime_info(System::uptime(), System::boot_time()),
        load_average: load_average(platform),
    }
}

pub fn uptime_info(uptime_secs: u64, boot_time_unix: u64) -> UptimeInfo {
    let boot_time = i64::try_from(boot_time_unix)
        .ok()
        .filter(|secs| *secs > 0)
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|t| t.to_rfc3339());

    UptimeInfo {
        uptime_secs,
        uptime_human: format_uptime(uptime_secs),
        boot_time_unix,
        boot_time: Metric::from_option(boot_time, "boot time not reported"),
    }
}

/// Load average; Windows has no run-queue average and sysinfo reports zeros there
pub fn load_average(platform: Platform) -> Metric<LoadAverage> {
    match platform {
        Platform::Windows => Metric::platform("load average is not available on windows"),
        _ => {
            let load = System::load_average();
            Metric::available(LoadAverage {
                one: load.one,
                five: load.five,
                fifteen: load.fifteen,
            })
        }
    }
}

/// Format uptime seconds into human-readable string
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86400;
    let hours = (seconds % 86400) / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    let plural = |n: u64| if n == 1 { "" } else { "s" };

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{} day{}", days, plural(days)));
    }
    if hours > 0 {
        parts.push(format!("{} hour{}", hours, plural(hours)));
    }
    if minutes > 0 {
        parts.push(format!("{} minute{}", minutes, plural(minutes)));
    }
    if secs > 0 || parts.is_empty() {
        parts.push(format!("{} second{}", secs, plural(secs)));
    }

    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "0 seconds");
        assert_eq!(format_uptime(1), "1 second");
        assert_eq!(format_uptime(61), "1 minute, 1 second");
        assert_eq!(format_uptime(3600), "1 hour");
        assert_eq!(format_uptime(90061), "1 day, 1 hour, 1 minute, 1 second");
        assert_eq!(format_uptime(2 * 86400 + 5 * 3600 + 30 * 60), "2 days, 5 hours, 30 minutes");
    }

    #[test]
    fn test_uptime_info_boot_time() {
        let info = uptime_info(120, 1_705_312_800);
        assert_eq!(info.uptime_human, "2 minutes");
        assert_eq!(
            info.boot_time.value().map(String::as_str),
            Some("2024-01-15T10:00:00+00:00")
        );

        let unknown = uptime_info(0, 0);
        assert!(!unknown.boot_time.is_available());
    }

    #[test]
    fn test_windows_has_no_load_average() {
        assert!(!load_average(Platform::Windows).is_available());
    }

    #[test]
    fn test_system_snapshot_reports_host() {
        let snapshot = system_snapshot(Platform::detect());
        assert!(snapshot.logical_cores > 0);
        assert!(snapshot.total_memory.bytes > 0);
        assert!(!snapshot.architecture.is_empty());
    }
}
