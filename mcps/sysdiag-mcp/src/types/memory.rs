//! Memory metric types

use serde::{Deserialize, Serialize};

use super::{ByteSize, Metric, ProcessRecord};

/// Physical memory and swap usage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub total: ByteSize,
    pub used: ByteSize,
    pub available: ByteSize,
    pub free: ByteSize,
    /// Used memory percentage (0-100)
    pub used_percent: Metric<f64>,
    pub swap: SwapUsage,
    /// Top memory consumers (only when requested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_processes: Option<Vec<ProcessRecord>>,
}

/// Swap space usage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapUsage {
    pub total: ByteSize,
    pub used: ByteSize,
    pub free: ByteSize,
    /// Unavailable when no swap is configured
    pub used_percent: Metric<f64>,
}
