//! Tool arguments
//!
//! Every argument is optional. Unknown keys are rejected, and each value is
//! checked against [`Config`] before any collection starts.

use std::time::Duration;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{Config, DIAGNOSE_TIMEOUT_HEADROOM_SECS};
use crate::error::ToolError;
use crate::registry::ToolName;
use crate::source::{ApplicationQuery, CpuQuery, LogQuery, PerformanceQuery, ProcessQuery};
use crate::types::{FirmwareQuery, LogKind, ProcessSort, UseCase};

// ============================================================================
// Parameter Types
// ============================================================================

/// Arguments of tools that take none
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NoParams {}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CpuParams {
    #[schemars(description = "Include per-core usage and frequency (default: false)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_core: Option<bool>,

    #[schemars(description = "Seconds between the two usage samples (default: 0.2)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<f64>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MemoryParams {
    #[schemars(description = "Include the top memory-consuming processes (default: false)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_processes: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct StorageParams {
    #[schemars(description = "Include per-disk I/O counters (default: false)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_io_stats: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NetworkParams {
    #[schemars(description = "Include active TCP/UDP connections (default: false)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_connections: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ProcessParams {
    #[schemars(description = "Sort order: cpu, memory or name (default: cpu)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,

    #[schemars(description = "Maximum number of processes to return (default: 20)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,

    #[schemars(description = "Timeout in seconds for this call")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<i64>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ApplicationParams {
    #[schemars(
        description = "Only list applications whose category contains this text, or \"all\" (default: all)"
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[schemars(description = "Maximum number of applications to return (default: 500)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,

    #[schemars(description = "Timeout in seconds for this call")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<i64>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LogParams {
    #[schemars(description = "Log to read: system, application, security or all (default: system)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_type: Option<String>,

    #[schemars(description = "Maximum number of entries to return (default: 100)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,

    #[schemars(description = "Timeout in seconds for this call")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<i64>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MotherboardParams {
    #[schemars(description = "Include BIOS/UEFI vendor, version and date (default: true)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_bios: Option<bool>,

    #[schemars(description = "Include memory slots and installed modules (default: true)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_slots: Option<bool>,

    #[schemars(description = "Include computer manufacturer, model and serial (default: true)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_system: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DiagnoseParams {
    #[schemars(description = "Seconds to observe the system (default: 3)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,

    #[schemars(description = "Timeout in seconds for this call")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<i64>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RecommendationParams {
    #[schemars(
        description = "Workload: gaming, productivity, development, content_creation or general (default: general)"
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
}

// ============================================================================
// Validated Calls
// ============================================================================

/// A tool call whose arguments passed validation
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    SystemInfo,
    Cpu(CpuQuery),
    Memory { include_processes: bool },
    Storage { include_io_stats: bool },
    Network { include_connections: bool },
    Processes(ProcessQuery),
    Applications(ApplicationQuery),
    Battery,
    Logs(LogQuery),
    Motherboard(FirmwareQuery),
    DiagnosePerformance(PerformanceQuery),
    HardwareRecommendations(UseCase),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCall {
    pub call: ToolCall,
    pub timeout: Duration,
}

/// Parse and validate raw arguments for `tool`
pub fn parse_call(
    tool: ToolName,
    arguments: Map<String, Value>,
    config: &Config,
) -> Result<ValidatedCall, ToolError> {
    let v = Validator { tool, config };
    let default_timeout = config.timeouts.default_secs;

    let (call, timeout_secs) = match tool {
        ToolName::GetSystemInfo => {
            v.decode::<NoParams>(arguments)?;
            (ToolCall::SystemInfo, None)
        }
        ToolName::GetCpuMetrics => {
            let p: CpuParams = v.decode(arguments)?;
            let query = CpuQuery {
                per_core: p.per_core.unwrap_or(false),
                interval: v.interval(p.interval)?,
            };
            (ToolCall::Cpu(query), None)
        }
        ToolName::GetMemoryMetrics => {
            let p: MemoryParams = v.decode(arguments)?;
            let include_processes = p.include_processes.unwrap_or(false);
            (ToolCall::Memory { include_processes }, None)
        }
        ToolName::GetStorageMetrics => {
            let p: StorageParams = v.decode(arguments)?;
            let include_io_stats = p.include_io_stats.unwrap_or(false);
            (ToolCall::Storage { include_io_stats }, None)
        }
        ToolName::GetNetworkMetrics => {
            let p: NetworkParams = v.decode(arguments)?;
            let include_connections = p.include_connections.unwrap_or(false);
            (ToolCall::Network { include_connections }, None)
        }
        ToolName::GetProcesses => {
            let p: ProcessParams = v.decode(arguments)?;
            let query = ProcessQuery {
                sort_by: parse_sort(tool, p.sort_by.as_deref())?,
                limit: v.limit(
                    p.limit,
                    config.limits.default_process_limit,
                    config.limits.max_process_limit,
                )?,
            };
            (ToolCall::Processes(query), p.timeout_secs)
        }
        ToolName::GetInstalledApplications => {
            let p: ApplicationParams = v.decode(arguments)?;
            let category = p
                .category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"));
            let query = ApplicationQuery {
                category,
                limit: v.limit(
                    p.limit,
                    config.limits.default_application_limit,
                    config.limits.max_application_limit,
                )?,
            };
            (ToolCall::Applications(query), p.timeout_secs)
        }
        ToolName::GetBatteryStatus => {
            v.decode::<NoParams>(arguments)?;
            (ToolCall::Battery, None)
        }
        ToolName::GetSystemLogs => {
            let p: LogParams = v.decode(arguments)?;
            let query = LogQuery {
                log_type: parse_log_kind(tool, p.log_type.as_deref())?,
                limit: v.limit(
                    p.limit,
                    config.limits.default_log_limit,
                    config.limits.max_log_limit,
                )?,
            };
            (ToolCall::Logs(query), p.timeout_secs)
        }
        ToolName::GetMotherboardDetails => {
            let p: MotherboardParams = v.decode(arguments)?;
            let query = FirmwareQuery {
                include_bios: p.include_bios.unwrap_or(true),
                include_slots: p.include_slots.unwrap_or(true),
                include_system: p.include_system.unwrap_or(true),
            };
            (ToolCall::Motherboard(query), None)
        }
        ToolName::DiagnosePerformance => {
            let p: DiagnoseParams = v.decode(arguments)?;
            let duration = v.duration(p.duration)?;
            let query = PerformanceQuery {
                duration,
                interval: Duration::from_secs(1).min(duration),
            };
            // The sampling window itself must fit inside the default timeout
            let timeout = p
                .timeout_secs
                .or(Some(
                    default_timeout.max(duration.as_secs() + DIAGNOSE_TIMEOUT_HEADROOM_SECS) as i64,
                ));
            (ToolCall::DiagnosePerformance(query), timeout)
        }
        ToolName::GetHardwareRecommendations => {
            let p: RecommendationParams = v.decode(arguments)?;
            (
                ToolCall::HardwareRecommendations(parse_use_case(tool, p.use_case.as_deref())?),
                None,
            )
        }
    };

    Ok(ValidatedCall {
        call,
        timeout: v.timeout(timeout_secs)?,
    })
}

struct Validator<'a> {
    tool: ToolName,
    config: &'a Config,
}

impl Validator<'_> {
    fn invalid(&self, message: impl Into<String>) -> ToolError {
        ToolError::invalid(self.tool.as_str(), message)
    }

    fn decode<T: DeserializeOwned>(&self, arguments: Map<String, Value>) -> Result<T, ToolError> {
        serde_json::from_value(Value::Object(arguments)).map_err(|e| self.invalid(e.to_string()))
    }

    fn limit(&self, limit: Option<i64>, default: usize, max: usize) -> Result<usize, ToolError> {
        match limit {
            None => Ok(default),
            Some(n) if n >= 1 && (n as u64) <= max as u64 => Ok(n as usize),
            Some(n) => Err(self.invalid(format!("limit must be between 1 and {}, got {}", max, n))),
        }
    }

    fn interval(&self, interval: Option<f64>) -> Result<Duration, ToolError> {
        let sampling = &self.config.sampling;
        let Some(secs) = interval else {
            return Ok(Duration::from_millis(sampling.cpu_interval_ms));
        };
        let max_secs = sampling.max_cpu_interval_ms as f64 / 1000.0;
        if !secs.is_finite() || secs <= 0.0 || secs > max_secs {
            return Err(self.invalid(format!(
                "interval must be greater than 0 and at most {} seconds, got {}",
                max_secs, secs
            )));
        }
        Ok(Duration::from_secs_f64(secs))
    }

    fn duration(&self, duration: Option<i64>) -> Result<Duration, ToolError> {
        let sampling = &self.config.sampling;
        match duration {
            None => Ok(Duration::from_secs(sampling.diagnose_duration_secs)),
            Some(n) if n >= 1 && (n as u64) <= sampling.max_diagnose_duration_secs => {
                Ok(Duration::from_secs(n as u64))
            }
            Some(n) => Err(self.invalid(format!(
                "duration must be between 1 and {} seconds, got {}",
                sampling.max_diagnose_duration_secs, n
            ))),
        }
    }

    /// Caller timeouts must be positive and are clamped to the configured cap
    fn timeout(&self, timeout_secs: Option<i64>) -> Result<Duration, ToolError> {
        let timeouts = &self.config.timeouts;
        let secs = match timeout_secs {
            None => timeouts.default_secs,
            Some(n) if n >= 1 => n as u64,
            Some(n) => {
                return Err(self.invalid(format!("timeout_secs must be positive, got {}", n)))
            }
        };
        Ok(Duration::from_secs(secs.min(timeouts.max_secs)))
    }
}

fn parse_sort(tool: ToolName, value: Option<&str>) -> Result<ProcessSort, ToolError> {
    match value.map(str::to_ascii_lowercase).as_deref() {
        None | Some("cpu") | Some("cpu_percent") => Ok(ProcessSort::Cpu),
        Some("memory") | Some("memory_percent") => Ok(ProcessSort::Memory),
        Some("name") => Ok(ProcessSort::Name),
        Some(other) => Err(ToolError::invalid(
            tool.as_str(),
            format!("sort_by must be one of cpu, memory, name; got '{}'", other),
        )),
    }
}

fn parse_log_kind(tool: ToolName, value: Option<&str>) -> Result<LogKind, ToolError> {
    match value.map(str::to_ascii_lowercase).as_deref() {
        None | Some("system") => Ok(LogKind::System),
        Some("application") => Ok(LogKind::Application),
        Some("security") => Ok(LogKind::Security),
        Some("all") => Ok(LogKind::All),
        Some(other) => Err(ToolError::invalid(
            tool.as_str(),
            format!(
                "log_type must be one of system, application, security, all; got '{}'",
                other
            ),
        )),
    }
}

fn parse_use_case(tool: ToolName, value: Option<&str>) -> Result<UseCase, ToolError> {
    match value.map(str::to_ascii_lowercase).as_deref() {
        None | Some("general") => Ok(UseCase::General),
        Some("gaming") => Ok(UseCase::Gaming),
        Some("productivity") => Ok(UseCase::Productivity),
        Some("development") => Ok(UseCase::Development),
        Some("content_creation") => Ok(UseCase::ContentCreation),
        Some(other) => Err(ToolError::invalid(
            tool.as_str(),
            format!(
                "use_case must be one of gaming, productivity, development, content_creation, general; got '{}'",
                other
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("arguments must be an object"),
        }
    }

    fn parse(tool: ToolName, value: Value) -> Result<ValidatedCall, ToolError> {
        parse_call(tool, args(value), &Config::default())
    }

    #[test]
    fn test_defaults_applied() {
        let call = parse(ToolName::GetProcesses, json!({})).unwrap();
        assert_eq!(
            call.call,
            ToolCall::Processes(ProcessQuery {
                sort_by: ProcessSort::Cpu,
                limit: 20,
            })
        );
        assert_eq!(call.timeout, Duration::from_secs(30));

        let call = parse(ToolName::GetMotherboardDetails, json!({})).unwrap();
        assert_eq!(
            call.call,
            ToolCall::Motherboard(FirmwareQuery {
                include_bios: true,
                include_slots: true,
                include_system: true,
            })
        );
    }

    #[test]
    fn test_limit_bounds() {
        for bad in [json!(0), json!(-5), json!(1001)] {
            let err = parse(ToolName::GetProcesses, json!({ "limit": bad })).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
        let call = parse(ToolName::GetProcesses, json!({ "limit": 1000 })).unwrap();
        assert!(matches!(call.call, ToolCall::Processes(q) if q.limit == 1000));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = parse(ToolName::GetSystemInfo, json!({ "verbose": true })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("verbose"));

        let err = parse(ToolName::GetCpuMetrics, json!({ "per_cpu": true })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_wrong_type_rejected() {
        let err = parse(ToolName::GetProcesses, json!({ "limit": "ten" })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_enum_values() {
        let call = parse(ToolName::GetProcesses, json!({ "sort_by": "memory_percent" })).unwrap();
        assert!(matches!(call.call, ToolCall::Processes(q) if q.sort_by == ProcessSort::Memory));

        let err = parse(ToolName::GetProcesses, json!({ "sort_by": "pid" })).unwrap_err();
        assert!(err.to_string().contains("sort_by"));

        let err = parse(ToolName::GetSystemLogs, json!({ "log_type": "kernel" })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let call = parse(
            ToolName::GetHardwareRecommendations,
            json!({ "use_case": "content_creation" }),
        )
        .unwrap();
        assert_eq!(call.call, ToolCall::HardwareRecommendations(UseCase::ContentCreation));
    }

    #[test]
    fn test_application_category_all_means_unfiltered() {
        let call = parse(ToolName::GetInstalledApplications, json!({ "category": "All" })).unwrap();
        assert!(matches!(call.call, ToolCall::Applications(ref q) if q.category.is_none()));

        let call =
            parse(ToolName::GetInstalledApplications, json!({ "category": "games" })).unwrap();
        assert!(
            matches!(call.call, ToolCall::Applications(ref q) if q.category.as_deref() == Some("games"))
        );
    }

    #[test]
    fn test_timeout_clamped_and_validated() {
        let call = parse(ToolName::GetSystemLogs, json!({ "timeout_secs": 100000 })).unwrap();
        assert_eq!(call.timeout, Duration::from_secs(300));

        let err = parse(ToolName::GetSystemLogs, json!({ "timeout_secs": 0 })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_cpu_interval() {
        let call = parse(ToolName::GetCpuMetrics, json!({ "interval": 1 })).unwrap();
        assert!(matches!(call.call, ToolCall::Cpu(q) if q.interval == Duration::from_secs(1)));

        for bad in [json!(0), json!(-1.0), json!(60)] {
            let err = parse(ToolName::GetCpuMetrics, json!({ "interval": bad })).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn test_diagnose_duration_and_timeout() {
        let call = parse(ToolName::DiagnosePerformance, json!({ "duration": 25 })).unwrap();
        assert!(
            matches!(call.call, ToolCall::DiagnosePerformance(q) if q.duration == Duration::from_secs(25))
        );
        assert_eq!(call.timeout, Duration::from_secs(35));

        let err = parse(ToolName::DiagnosePerformance, json!({ "duration": 0 })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = parse(ToolName::DiagnosePerformance, json!({ "duration": 31 })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
