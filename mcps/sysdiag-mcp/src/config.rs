//! Server configuration
//!
//! Diagnostic thresholds are policy, not mechanism, so every one of them is a
//! configurable value with a default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Configuration Types
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub recommendations: RecommendationPolicy,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

/// Thresholds used by `diagnose_performance`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_cpu_warning")]
    pub cpu_warning_percent: f64,
    #[serde(default = "default_cpu_critical")]
    pub cpu_critical_percent: f64,
    #[serde(default = "default_memory_warning")]
    pub memory_warning_percent: f64,
    #[serde(default = "default_memory_critical")]
    pub memory_critical_percent: f64,
    #[serde(default = "default_disk_full_warning")]
    pub disk_full_warning_percent: f64,
    #[serde(default = "default_disk_full_critical")]
    pub disk_full_critical_percent: f64,
    #[serde(default = "default_io_wait_warning")]
    pub io_wait_warning_percent: f64,
    /// Combined read+write throughput considered heavy
    #[serde(default = "default_disk_throughput_warning")]
    pub disk_throughput_warning_mb_s: f64,
}

fn default_cpu_warning() -> f64 {
    85.0
}

fn default_cpu_critical() -> f64 {
    95.0
}

fn default_memory_warning() -> f64 {
    90.0
}

fn default_memory_critical() -> f64 {
    97.0
}

fn default_disk_full_warning() -> f64 {
    90.0
}

fn default_disk_full_critical() -> f64 {
    97.0
}

fn default_io_wait_warning() -> f64 {
    20.0
}

fn default_disk_throughput_warning() -> f64 {
    100.0
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu_warning_percent: default_cpu_warning(),
            cpu_critical_percent: default_cpu_critical(),
            memory_warning_percent: default_memory_warning(),
            memory_critical_percent: default_memory_critical(),
            disk_full_warning_percent: default_disk_full_warning(),
            disk_full_critical_percent: default_disk_full_critical(),
            io_wait_warning_percent: default_io_wait_warning(),
            disk_throughput_warning_mb_s: default_disk_throughput_warning(),
        }
    }
}

/// Thresholds used by `get_hardware_recommendations`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationPolicy {
    /// Memory use at or above this suggests more RAM
    #[serde(default = "default_memory_pressure")]
    pub memory_pressure_percent: f64,
    /// CPU use at or above this counts as saturated
    #[serde(default = "default_cpu_saturation")]
    pub cpu_saturation_percent: f64,
    /// Per-core standard deviation at or below this means load is spread evenly
    #[serde(default = "default_core_balance")]
    pub core_balance_stddev: f64,
}

fn default_memory_pressure() -> f64 {
    80.0
}

fn default_cpu_saturation() -> f64 {
    85.0
}

fn default_core_balance() -> f64 {
    15.0
}

impl Default for RecommendationPolicy {
    fn default() -> Self {
        Self {
            memory_pressure_percent: default_memory_pressure(),
            cpu_saturation_percent: default_cpu_saturation(),
            core_balance_stddev: default_core_balance(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_process_limit")]
    pub default_process_limit: usize,
    #[serde(default = "default_max_process_limit")]
    pub max_process_limit: usize,
    #[serde(default = "default_log_limit")]
    pub default_log_limit: usize,
    #[serde(default = "default_max_log_limit")]
    pub max_log_limit: usize,
    #[serde(default = "default_application_limit")]
    pub default_application_limit: usize,
    #[serde(default = "default_max_application_limit")]
    pub max_application_limit: usize,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_process_limit() -> usize {
    20
}

fn default_max_process_limit() -> usize {
    1000
}

fn default_log_limit() -> usize {
    100
}

fn default_max_log_limit() -> usize {
    1000
}

fn default_application_limit() -> usize {
    500
}

fn default_max_application_limit() -> usize {
    5000
}

fn default_max_connections() -> usize {
    50
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            default_process_limit: default_process_limit(),
            max_process_limit: default_max_process_limit(),
            default_log_limit: default_log_limit(),
            max_log_limit: default_max_log_limit(),
            default_application_limit: default_application_limit(),
            max_application_limit: default_max_application_limit(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Gap between the two CPU usage refreshes
    #[serde(default = "default_cpu_interval")]
    pub cpu_interval_ms: u64,
    #[serde(default = "default_max_cpu_interval")]
    pub max_cpu_interval_ms: u64,
    /// Default observation window of `diagnose_performance`
    #[serde(default = "default_diagnose_duration")]
    pub diagnose_duration_secs: u64,
    #[serde(default = "default_max_diagnose_duration")]
    pub max_diagnose_duration_secs: u64,
}

/// Extra time granted to `diagnose_performance` beyond its sampling window
pub const DIAGNOSE_TIMEOUT_HEADROOM_SECS: u64 = 10;

fn default_cpu_interval() -> u64 {
    200
}

fn default_max_cpu_interval() -> u64 {
    5000
}

fn default_diagnose_duration() -> u64 {
    3
}

fn default_max_diagnose_duration() -> u64 {
    30
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            cpu_interval_ms: default_cpu_interval(),
            max_cpu_interval_ms: default_max_cpu_interval(),
            diagnose_duration_secs: default_diagnose_duration(),
            max_diagnose_duration_secs: default_max_diagnose_duration(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Timeout applied when the caller does not supply one
    #[serde(default = "default_timeout")]
    pub default_secs: u64,
    /// Hard cap for caller-supplied timeouts
    #[serde(default = "default_max_timeout")]
    pub max_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

fn default_max_timeout() -> u64 {
    300
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            default_secs: default_timeout(),
            max_secs: default_max_timeout(),
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// Loading and Validation
// ============================================================================

impl Config {
    /// Load config from standard file locations
    ///
    /// Searched in order:
    /// 1. `SYSDIAG_CONFIG_PATH` env var
    /// 2. `~/.binks/sysdiag.toml`
    /// 3. `./sysdiag-mcp.toml`
    /// 4. `$XDG_CONFIG_HOME/sysdiag-mcp/config.toml`
    /// 5. `~/.sysdiag-mcp.toml`
    /// 6. Default config if none found
    pub fn load() -> Self {
        if let Ok(env_path) = std::env::var("SYSDIAG_CONFIG_PATH") {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from SYSDIAG_CONFIG_PATH={}", path.display());
                        return config;
                    }
                    Err(e) => tracing::warn!("{}", e),
                }
            } else {
                tracing::warn!("SYSDIAG_CONFIG_PATH={} does not exist", env_path);
            }
        }

        for path in Self::search_paths() {
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => tracing::warn!("{}", e),
            }
        }

        tracing::info!("Using default configuration");
        Config::default()
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".binks").join("sysdiag.toml"));
        }

        paths.push(PathBuf::from("sysdiag-mcp.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("sysdiag-mcp").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".sysdiag-mcp.toml"));
        }

        paths
    }

    /// Read, parse and validate a single config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the dispatcher cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        let pairs = [
            ("cpu", t.cpu_warning_percent, t.cpu_critical_percent),
            ("memory", t.memory_warning_percent, t.memory_critical_percent),
            ("disk_full", t.disk_full_warning_percent, t.disk_full_critical_percent),
        ];
        for (name, warning, critical) in pairs {
            if !(0.0..=100.0).contains(&warning) || !(0.0..=100.0).contains(&critical) {
                return Err(ConfigError::Invalid(format!(
                    "{} thresholds must be within 0-100",
                    name
                )));
            }
            if warning > critical {
                return Err(ConfigError::Invalid(format!(
                    "{} warning threshold ({}) is above critical ({})",
                    name, warning, critical
                )));
            }
        }

        let l = &self.limits;
        let limits = [
            ("process", l.default_process_limit, l.max_process_limit),
            ("log", l.default_log_limit, l.max_log_limit),
            ("application", l.default_application_limit, l.max_application_limit),
        ];
        for (name, default, max) in limits {
            if default == 0 || default > max {
                return Err(ConfigError::Invalid(format!(
                    "default {} limit must be between 1 and {}",
                    name, max
                )));
            }
        }

        if self.timeouts.default_secs == 0 || self.timeouts.default_secs > self.timeouts.max_secs {
            return Err(ConfigError::Invalid(
                "default timeout must be between 1 and max_secs".to_string(),
            ));
        }
        if self.sampling.diagnose_duration_secs == 0
            || self.sampling.diagnose_duration_secs > self.sampling.max_diagnose_duration_secs
        {
            return Err(ConfigError::Invalid(
                "diagnose_duration_secs must be between 1 and max_diagnose_duration_secs"
                    .to_string(),
            ));
        }
        if self.sampling.cpu_interval_ms == 0
            || self.sampling.cpu_interval_ms > self.sampling.max_cpu_interval_ms
        {
            return Err(ConfigError::Invalid(
                "cpu_interval_ms must be between 1 and max_cpu_interval_ms".to_string(),
            ));
        }
        // The longest sampling window must still fit under the timeout cap
        let window = self.sampling.max_diagnose_duration_secs + DIAGNOSE_TIMEOUT_HEADROOM_SECS;
        if window > self.timeouts.max_secs {
            return Err(ConfigError::Invalid(format!(
                "timeouts.max_secs ({}) must be at least max_diagnose_duration_secs + {} ({})",
                self.timeouts.max_secs, DIAGNOSE_TIMEOUT_HEADROOM_SECS, window
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[thresholds]\ncpu_warning_percent = 70.0").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.thresholds.cpu_warning_percent, 70.0);
        assert_eq!(config.thresholds.cpu_critical_percent, 95.0);
        assert_eq!(config.limits.default_process_limit, 20);
    }

    #[test]
    fn test_warning_above_critical_rejected() {
        let mut config = Config::default();
        config.thresholds.memory_warning_percent = 99.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_default_limit_rejected() {
        let mut config = Config::default();
        config.limits.default_log_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cpu_interval_above_max_rejected() {
        let mut config = Config::default();
        config.sampling.cpu_interval_ms = 6000;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_diagnose_window_must_fit_timeout_cap() {
        let mut config = Config::default();
        config.timeouts.max_secs = 35;
        config.timeouts.default_secs = 20;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.timeouts.max_secs = 40;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[thresholds\n").unwrap();
        assert!(matches!(
            Config::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
