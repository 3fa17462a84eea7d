//! CPU metric types

use serde::{Deserialize, Serialize};

use super::{LoadAverage, Metric};

/// CPU utilisation, frequency and thermal reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuSnapshot {
    /// Global CPU usage percentage (0-100)
    pub overall_percent: f64,
    /// Usage per logical core, in OS enumeration order
    pub per_core_percent: Vec<f64>,
    /// Current frequency of the first core in MHz
    pub frequency_mhz: Metric<u64>,
    /// Hottest CPU package/core sensor
    pub temperature_celsius: Metric<f64>,
    pub brand: Metric<String>,
    pub vendor_id: Metric<String>,
    pub physical_cores: Metric<usize>,
    pub logical_cores: usize,
    pub load_average: Metric<LoadAverage>,
    /// Time between the two usage samples
    pub sample_interval_ms: u64,
    /// Per-core details (only when requested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cores: Option<Vec<CoreDetail>>,
    /// All temperature sensors the platform exposes
    pub sensors: Vec<TemperatureReading>,
}

/// Individual logical core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreDetail {
    pub name: String,
    pub usage_percent: f64,
    pub frequency_mhz: Metric<u64>,
}

/// A temperature sensor reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub label: String,
    pub current_celsius: f64,
    pub max_celsius: Metric<f64>,
    pub critical_celsius: Metric<f64>,
}
