//! Process metric types

use serde::{Deserialize, Serialize};

use super::{ByteSize, Metric};

/// Sort key for process listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessSort {
    /// Highest CPU usage first
    Cpu,
    /// Highest memory usage first
    Memory,
    /// Alphabetical, case-insensitive
    Name,
}

/// Ranked process listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    /// Number of processes seen before the limit was applied
    pub total: usize,
    pub sort_by: ProcessSort,
    pub limit: usize,
    pub processes: Vec<ProcessRecord>,
}

/// Individual process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    /// CPU usage percentage; may exceed 100 on multi-core hosts
    pub cpu_percent: f64,
    /// Resident memory as a share of physical memory (0-100)
    pub memory_percent: Metric<f64>,
    pub memory: ByteSize,
    pub status: String,
    /// Thread count (Linux only)
    pub threads: Metric<usize>,
    /// Start time rendered as RFC 3339
    pub started_at: Metric<String>,
    pub run_time_secs: u64,
}
