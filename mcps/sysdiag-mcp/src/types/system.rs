//! System information types

use serde::{Deserialize, Serialize};

use super::{ByteSize, Metric};

/// Operating system and host identity with boot/uptime data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSnapshot {
    /// Detected platform tag (e.g. "linux", "macos", "windows")
    pub os_type: String,
    /// OS name (e.g. "Ubuntu", "Darwin", "Windows")
    pub os_name: Metric<String>,
    /// OS version
    pub os_version: Metric<String>,
    /// Long OS version (e.g. "Linux 22.04 Ubuntu")
    pub long_os_version: Metric<String>,
    pub kernel_version: Metric<String>,
    pub hostname: Metric<String>,
    /// CPU architecture (e.g. "x86_64", "aarch64")
    pub architecture: String,
    /// CPU brand/model name
    pub processor: Metric<String>,
    pub physical_cores: Metric<usize>,
    pub logical_cores: usize,
    pub total_memory: ByteSize,
    pub uptime: UptimeInfo,
    pub load_average: Metric<LoadAverage>,
}

/// System uptime information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UptimeInfo {
    pub uptime_secs: u64,
    /// Human-readable uptime (e.g. "2 days, 5 hours, 30 minutes")
    pub uptime_human: String,
    /// Unix timestamp of system boot
    pub boot_time_unix: u64,
    /// Boot time rendered as RFC 3339
    pub boot_time: Metric<String>,
}

/// Run-queue load averages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}
