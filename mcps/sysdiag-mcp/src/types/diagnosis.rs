//! Inputs and reports of the diagnostic tools

use serde::{Deserialize, Serialize};

use super::{Baseboard, ByteSize, DiagnosticFinding, Metric, ProcessRecord};

/// Aggregated readings fed to the performance rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    /// Mean CPU usage over the sampling window
    pub cpu_average_percent: Metric<f64>,
    pub cpu_peak_percent: Metric<f64>,
    pub memory_used_percent: Metric<f64>,
    pub memory_peak_percent: Metric<f64>,
    pub volumes: Vec<VolumeFill>,
    /// Share of CPU time spent waiting on I/O
    pub io_wait_percent: Metric<f64>,
    pub disk_read_mb_s: Metric<f64>,
    pub disk_write_mb_s: Metric<f64>,
}

/// Fill level of one volume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeFill {
    pub mount_point: String,
    pub used_percent: Metric<f64>,
}

/// Everything gathered over one `diagnose_performance` sampling window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub duration_secs: u64,
    pub metrics: PerformanceSnapshot,
    pub network_receive_mb_s: Metric<f64>,
    pub network_send_mb_s: Metric<f64>,
    pub top_cpu_processes: Vec<ProcessRecord>,
    pub top_memory_processes: Vec<ProcessRecord>,
}

/// Result of `diagnose_performance`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub duration_secs: u64,
    pub metrics: PerformanceSnapshot,
    pub network_receive_mb_s: Metric<f64>,
    pub network_send_mb_s: Metric<f64>,
    /// Ordered by severity descending, then category name
    pub findings: Vec<DiagnosticFinding>,
    pub top_cpu_processes: Vec<ProcessRecord>,
    pub top_memory_processes: Vec<ProcessRecord>,
}

impl PerformanceReport {
    pub fn new(sample: PerformanceSample, findings: Vec<DiagnosticFinding>) -> Self {
        Self {
            duration_secs: sample.duration_secs,
            metrics: sample.metrics,
            network_receive_mb_s: sample.network_receive_mb_s,
            network_send_mb_s: sample.network_send_mb_s,
            findings,
            top_cpu_processes: sample.top_cpu_processes,
            top_memory_processes: sample.top_memory_processes,
        }
    }
}

/// Declared primary workload used to bias recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseCase {
    Gaming,
    Productivity,
    Development,
    ContentCreation,
    General,
}

impl UseCase {
    pub fn as_str(&self) -> &'static str {
        match self {
            UseCase::Gaming => "gaming",
            UseCase::Productivity => "productivity",
            UseCase::Development => "development",
            UseCase::ContentCreation => "content_creation",
            UseCase::General => "general",
        }
    }
}

/// Installed capacity and utilisation fed to the hardware rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareProfile {
    pub physical_cores: Metric<usize>,
    pub logical_cores: usize,
    pub total_memory: ByteSize,
    pub memory_used_percent: Metric<f64>,
    pub cpu_percent: Metric<f64>,
    /// Standard deviation of per-core usage
    pub per_core_stddev: Metric<f64>,
    /// Whether any fixed volume is solid-state
    pub has_ssd: Metric<bool>,
    /// Board identity, for judging upgrade compatibility
    pub motherboard: Metric<Baseboard>,
}

/// Result of `get_hardware_recommendations`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareReport {
    pub use_case: UseCase,
    pub current_specs: HardwareProfile,
    pub recommendations: Vec<DiagnosticFinding>,
    pub compatibility_notes: Vec<String>,
}
