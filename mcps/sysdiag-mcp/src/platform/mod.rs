//! Platform probes
//!
//! Everything `sysinfo` does not cover (battery, logs, installed software,
//! firmware tables, link state, connections, disk I/O counters and I/O wait)
//! is read through a [`PlatformProbe`]. The probe is chosen once at startup
//! from the detected [`Platform`].

pub mod command;
mod linux;
mod macos;
pub(crate) mod smbios;
mod windows;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CollectError;
use crate::types::{
    Application, BatteryReading, Category, Connection, DiskIo, FirmwareQuery, LinkState, LogKind,
    LogSnapshot, Metric, MotherboardSnapshot,
};

pub use linux::LinuxProbe;
pub use macos::MacosProbe;
pub use windows::WindowsProbe;

/// Host operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Linux,
    Macos,
    Windows,
    Other,
}

impl Platform {
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => Platform::Linux,
            "macos" => Platform::Macos,
            "windows" => Platform::Windows,
            _ => Platform::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Macos => "macos",
            Platform::Windows => "windows",
            Platform::Other => "other",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a category cannot be fully collected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cause {
    /// Needs administrator or root privileges
    Privileges,
    /// The platform has no source for it
    Platform(Platform),
    /// A required system tool is not installed
    MissingTool(String),
    /// The hardware is not present (e.g. no battery)
    NoDevice(String),
}

/// Result of a cheap capability probe for one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    Full,
    Degraded { fields: Vec<String>, cause: Cause },
    Unsupported { cause: Cause },
}

impl Capability {
    pub fn degraded(fields: &[&str], cause: Cause) -> Self {
        Capability::Degraded {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            cause,
        }
    }

    /// Fields that only the Linux kernel interfaces provide
    pub(crate) fn portable(category: Category, platform: Platform) -> Self {
        let fields: &[&str] = match category {
            Category::Storage => &["io_stats"],
            Category::Network => &["interfaces.is_up", "interfaces.speed_mbps", "connections"],
            Category::Processes => &["processes.threads"],
            Category::Performance => &["io_wait_percent", "disk_read_mb_s", "disk_write_mb_s"],
            _ => return Capability::Full,
        };
        Capability::degraded(fields, Cause::Platform(platform))
    }
}

/// Installed software as reported by the platform's package source
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationInventory {
    pub source: String,
    pub applications: Vec<Application>,
}

/// Cumulative CPU time counters, in clock ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTimes {
    pub total: u64,
    pub iowait: u64,
}

impl CpuTimes {
    /// Share of the elapsed CPU time spent in I/O wait between two samples
    pub fn io_wait_percent(before: CpuTimes, after: CpuTimes) -> Option<f64> {
        let total = after.total.checked_sub(before.total)?;
        let iowait = after.iowait.checked_sub(before.iowait)?;
        if total == 0 {
            return None;
        }
        Some(iowait as f64 / total as f64 * 100.0)
    }
}

pub(crate) const BATTERY_FIELDS: [&str; 7] = [
    "charge_percent",
    "state",
    "power_plugged",
    "time_remaining_secs",
    "health_percent",
    "cycle_count",
    "technology",
];

/// Platform-specific metric sources
#[async_trait]
pub trait PlatformProbe: Send + Sync {
    fn platform(&self) -> Platform;

    /// Cheap check of what a category can deliver on this host
    fn capability(&self, category: Category) -> Capability;

    fn link_state(&self, _interface: &str) -> LinkState {
        LinkState::unavailable(&format!("link state not exposed on {}", self.platform()))
    }

    fn connections(&self) -> Metric<Vec<Connection>> {
        Metric::platform(format!("connection table not exposed on {}", self.platform()))
    }

    fn disk_io(&self) -> Metric<Vec<DiskIo>> {
        Metric::platform(format!("disk I/O counters not exposed on {}", self.platform()))
    }

    fn cpu_times(&self) -> Option<CpuTimes> {
        None
    }

    /// `Ok(None)` when the host has no battery
    async fn battery(&self) -> Result<Option<BatteryReading>, CollectError>;

    async fn logs(&self, kind: LogKind, limit: usize) -> Result<LogSnapshot, CollectError>;

    async fn applications(&self) -> Result<ApplicationInventory, CollectError>;

    async fn firmware(&self, query: FirmwareQuery) -> Result<MotherboardSnapshot, CollectError>;
}

/// Probe for hosts without a dedicated implementation
pub struct UnsupportedProbe;

#[async_trait]
impl PlatformProbe for UnsupportedProbe {
    fn platform(&self) -> Platform {
        Platform::Other
    }

    fn capability(&self, category: Category) -> Capability {
        let cause = Cause::Platform(Platform::Other);
        match category {
            Category::Battery => Capability::degraded(&BATTERY_FIELDS, cause),
            Category::Logs | Category::Applications | Category::Motherboard => {
                Capability::Unsupported { cause }
            }
            other => Capability::portable(other, Platform::Other),
        }
    }

    async fn battery(&self) -> Result<Option<BatteryReading>, CollectError> {
        Ok(None)
    }

    async fn logs(&self, _kind: LogKind, _limit: usize) -> Result<LogSnapshot, CollectError> {
        Err(CollectError::Unavailable("system logs are not supported on this platform".into()))
    }

    async fn applications(&self) -> Result<ApplicationInventory, CollectError> {
        Err(CollectError::Unavailable(
            "application inventory is not supported on this platform".into(),
        ))
    }

    async fn firmware(&self, _query: FirmwareQuery) -> Result<MotherboardSnapshot, CollectError> {
        Err(CollectError::Unavailable(
            "firmware tables are not supported on this platform".into(),
        ))
    }
}

/// Select the probe for a platform
pub fn probe_for(platform: Platform) -> Arc<dyn PlatformProbe> {
    match platform {
        Platform::Linux => Arc::new(LinuxProbe::new()),
        Platform::Macos => Arc::new(MacosProbe),
        Platform::Windows => Arc::new(WindowsProbe),
        Platform::Other => Arc::new(UnsupportedProbe),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_from_os() {
        assert_eq!(Platform::from_os("linux"), Platform::Linux);
        assert_eq!(Platform::from_os("macos"), Platform::Macos);
        assert_eq!(Platform::from_os("windows"), Platform::Windows);
        assert_eq!(Platform::from_os("freebsd"), Platform::Other);
    }

    #[test]
    fn test_io_wait_percent() {
        let before = CpuTimes { total: 1000, iowait: 10 };
        let after = CpuTimes { total: 2000, iowait: 260 };
        assert_eq!(CpuTimes::io_wait_percent(before, after), Some(25.0));
        assert_eq!(CpuTimes::io_wait_percent(after, after), None);
    }

    #[tokio::test]
    async fn test_unsupported_probe_has_no_battery() {
        let probe = UnsupportedProbe;
        assert_eq!(probe.battery().await, Ok(None));
        assert!(matches!(
            probe.capability(Category::Logs),
            Capability::Unsupported { .. }
        ));
        assert_eq!(probe.capability(Category::Cpu), Capability::Full);
        assert!(!probe.disk_io().is_available());
    }

    #[test]
    fn test_portable_capability_names_linux_only_fields() {
        match Capability::portable(Category::Network, Platform::Windows) {
            Capability::Degraded { fields, cause } => {
                assert!(fields.contains(&"connections".to_string()));
                assert_eq!(cause, Cause::Platform(Platform::Windows));
            }
            other => panic!("expected degraded, got {:?}", other),
        }
        assert_eq!(
            Capability::portable(Category::Memory, Platform::Macos),
            Capability::Full
        );
    }
}
