//! Tool dispatch
//!
//! `dispatch` is total: every request ends in either a success envelope or an
//! error envelope. Collection runs on its own task so a panicking or stalled
//! adapter cannot take the server down.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{CollectError, ErrorEnvelope, ToolError};
use crate::params::{self, ToolCall};
use crate::platform::Platform;
use crate::registry::ToolRegistry;
use crate::resolver::{AvailabilityResolver, Resolution};
use crate::rules;
use crate::source::SystemMetricsSource;
use crate::types::{Category, HardwareReport, PerformanceReport};

/// Inbound call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolRequest {
    pub tool_name: String,
    #[serde(default)]
    pub arguments: Option<Map<String, Value>>,
}

impl ToolRequest {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: None,
        }
    }

    pub fn with_arguments(mut self, arguments: Map<String, Value>) -> Self {
        self.arguments = Some(arguments);
        self
    }
}

/// Successful tool result with its provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessEnvelope {
    pub tool: String,
    pub category: Category,
    pub platform: Platform,
    /// RFC 3339 timestamp
    pub collected_at: String,
    pub availability: Resolution,
    pub data: Value,
}

#[derive(Debug, Clone)]
pub enum ToolResponse {
    Success(SuccessEnvelope),
    Failure(ToolError),
}

impl ToolResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, ToolResponse::Failure(_))
    }

    pub fn error(&self) -> Option<&ToolError> {
        match self {
            ToolResponse::Success(_) => None,
            ToolResponse::Failure(e) => Some(e),
        }
    }

    pub fn success(&self) -> Option<&SuccessEnvelope> {
        match self {
            ToolResponse::Success(envelope) => Some(envelope),
            ToolResponse::Failure(_) => None,
        }
    }

    /// Wire form: the success envelope or `{error_kind, message, category}`
    pub fn to_json(&self) -> Value {
        let result = match self {
            ToolResponse::Success(envelope) => serde_json::to_value(envelope),
            ToolResponse::Failure(e) => serde_json::to_value::<ErrorEnvelope>(e.envelope()),
        };
        result.unwrap_or_else(|e| {
            serde_json::json!({
                "error_kind": "CollectionFailed",
                "message": format!("Failed to serialize response: {}", e),
                "category": Value::Null,
            })
        })
    }
}

/// Routes tool calls to the metric source and rules engine
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    source: Arc<dyn SystemMetricsSource>,
    resolver: AvailabilityResolver,
    config: Arc<Config>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<ToolRegistry>,
        source: Arc<dyn SystemMetricsSource>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            registry,
            resolver: AvailabilityResolver::new(source.clone()),
            source,
            config,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn dispatch(&self, request: ToolRequest) -> ToolResponse {
        let started = Instant::now();
        let name = request.tool_name;

        let Some(tool) = self.registry.lookup(&name) else {
            warn!("Unknown tool requested: {}", name);
            return ToolResponse::Failure(ToolError::UnknownTool(name));
        };
        let category = tool.category();

        let call = match params::parse_call(tool, request.arguments.unwrap_or_default(), &self.config)
        {
            Ok(call) => call,
            Err(e) => {
                warn!("{}", e);
                return ToolResponse::Failure(e);
            }
        };

        let availability = self.resolver.resolve(category);
        if !availability.runnable {
            let reason = availability
                .reason
                .unwrap_or_else(|| format!("not supported on {}", self.source.platform()));
            info!("{} skipped: {}", tool, reason);
            return ToolResponse::Failure(ToolError::Unavailable { category, reason });
        }

        let outcome = self.collect(call.call, call.timeout, category).await;
        let elapsed = started.elapsed();

        match outcome {
            Ok(data) => {
                info!("{} completed in {:?}", tool, elapsed);
                ToolResponse::Success(SuccessEnvelope {
                    tool: tool.as_str().to_string(),
                    category,
                    platform: self.source.platform(),
                    collected_at: chrono::Utc::now().to_rfc3339(),
                    availability,
                    data,
                })
            }
            Err(e) => {
                warn!("{} failed after {:?}: {}", tool, elapsed, e);
                ToolResponse::Failure(e)
            }
        }
    }

    /// Run one collection on its own task under `timeout`
    async fn collect(
        &self,
        call: ToolCall,
        timeout: Duration,
        category: Category,
    ) -> Result<Value, ToolError> {
        let source = self.source.clone();
        let config = self.config.clone();
        let handle = tokio::spawn(async move { run(call, source.as_ref(), &config).await });
        let abort = handle.abort_handle();

        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(Ok(data))) => Ok(data),
            Ok(Ok(Err(e))) => Err(e.into_tool_error(category)),
            Ok(Err(join_error)) => {
                let detail = if join_error.is_panic() {
                    "collector panicked".to_string()
                } else {
                    "collector task was cancelled".to_string()
                };
                Err(ToolError::CollectionFailed { category, detail })
            }
            Err(_) => {
                abort.abort();
                Err(ToolError::Timeout {
                    category,
                    secs: timeout.as_secs(),
                })
            }
        }
    }
}

fn to_data<T: Serialize>(value: &T) -> Result<Value, CollectError> {
    serde_json::to_value(value)
        .map_err(|e| CollectError::Failed(format!("failed to serialize result: {}", e)))
}

async fn run(
    call: ToolCall,
    source: &dyn SystemMetricsSource,
    config: &Config,
) -> Result<Value, CollectError> {
    match call {
        ToolCall::SystemInfo => to_data(&source.system().await?),
        ToolCall::Cpu(query) => to_data(&source.cpu(query).await?),
        ToolCall::Memory { include_processes } => to_data(&source.memory(include_processes).await?),
        ToolCall::Storage { include_io_stats } => to_data(&source.storage(include_io_stats).await?),
        ToolCall::Network {
            include_connections,
        } => to_data(&source.network(include_connections).await?),
        ToolCall::Processes(query) => to_data(&source.processes(query).await?),
        ToolCall::Applications(query) => to_data(&source.applications(query).await?),
        ToolCall::Battery => to_data(&source.battery().await?),
        ToolCall::Logs(query) => to_data(&source.logs(query).await?),
        ToolCall::Motherboard(query) => to_data(&source.motherboard(query).await?),
        ToolCall::DiagnosePerformance(query) => {
            let sample = source.performance(query).await?;
            let findings = rules::diagnose_performance(&sample.metrics, &config.thresholds);
            to_data(&PerformanceReport::new(sample, findings))
        }
        ToolCall::HardwareRecommendations(use_case) => {
            let interval = Duration::from_millis(config.sampling.cpu_interval_ms);
            let profile = source.hardware(interval).await?;
            let recommendations =
                rules::recommend_hardware(&profile, use_case, &config.recommendations);
            let compatibility_notes = rules::compatibility_notes(&recommendations, use_case);
            to_data(&HardwareReport {
                use_case,
                current_specs: profile,
                recommendations,
                compatibility_notes,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::platform::UnsupportedProbe;
    use crate::source::HostSource;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(
            Arc::new(ToolRegistry::new()),
            Arc::new(HostSource::new(Arc::new(UnsupportedProbe), 10)),
            Arc::new(Config::default()),
        )
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let response = dispatcher()
            .dispatch(ToolRequest::new("get_quantum_flux"))
            .await;
        assert_eq!(response.error().map(|e| e.kind()), Some(ErrorKind::UnknownTool));
        assert_eq!(response.to_json()["error_kind"], "UnknownTool");
    }

    #[tokio::test]
    async fn test_unsupported_category_is_unavailable() {
        let response = dispatcher()
            .dispatch(ToolRequest::new("get_system_logs"))
            .await;
        let err = response.error().unwrap();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert_eq!(err.category(), Some(Category::Logs));
    }

    #[tokio::test]
    async fn test_system_info_envelope() {
        let response = dispatcher()
            .dispatch(ToolRequest::new("get_system_info"))
            .await;
        let json = response.to_json();
        assert_eq!(json["tool"], "get_system_info");
        assert_eq!(json["category"], "system");
        assert_eq!(json["platform"], "other");
        assert_eq!(json["availability"]["runnable"], true);
        assert!(json["data"].is_object());
    }
}
