//! MCP Server implementation for system diagnostics

use mcp_common::{
    async_trait, json_error, json_success, EmbeddableError, EmbeddableMcp, EmbeddableResult,
    McpResult,
};
use rmcp::{
    handler::server::{common::schema_for_type, router::tool::ToolRouter},
    model::{CallToolResult, JsonObject, ServerCapabilities, ServerInfo, Tool},
    tool, tool_handler, tool_router,
};
use serde_json::Value;
use std::sync::Arc;

use crate::config::Config;
use crate::dispatcher::{Dispatcher, ToolRequest, ToolResponse};
use crate::params::{
    ApplicationParams, CpuParams, DiagnoseParams, LogParams, MemoryParams, MotherboardParams,
    NetworkParams, NoParams, ProcessParams, RecommendationParams, StorageParams,
};
use crate::registry::{ToolName, ToolRegistry};
use crate::source::{HostSource, SystemMetricsSource};

const DESCRIPTION: &str = "Cross-platform System Diagnostics MCP Server - read-only hardware, \
    OS and performance metrics with per-platform degradation, plus performance diagnosis and \
    hardware upgrade recommendations.";

/// The main System Diagnostics MCP Server
#[derive(Clone)]
pub struct SysDiagMcpServer {
    dispatcher: Dispatcher,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Tool Router Implementation
// ============================================================================

#[tool_router]
impl SysDiagMcpServer {
    /// Load configuration and detect the host platform
    pub fn new() -> Self {
        let config = Config::load();
        let source = HostSource::detect(config.limits.max_connections);
        Self::with_source(Arc::new(source), config)
    }

    #[tool(
        description = "Get operating system, hostname, architecture, uptime, boot time and load average",
        input_schema = schema_for_type::<NoParams>()
    )]
    async fn get_system_info(&self, arguments: JsonObject) -> McpResult<CallToolResult> {
        self.call(ToolName::GetSystemInfo, arguments).await
    }

    #[tool(
        description = "Get CPU model, core counts, frequency, usage (optionally per core) and temperature",
        input_schema = schema_for_type::<CpuParams>()
    )]
    async fn get_cpu_metrics(&self, arguments: JsonObject) -> McpResult<CallToolResult> {
        self.call(ToolName::GetCpuMetrics, arguments).await
    }

    #[tool(
        description = "Get RAM and swap usage, optionally with the top memory consumers",
        input_schema = schema_for_type::<MemoryParams>()
    )]
    async fn get_memory_metrics(&self, arguments: JsonObject) -> McpResult<CallToolResult> {
        self.call(ToolName::GetMemoryMetrics, arguments).await
    }

    #[tool(
        description = "Get mounted volumes with capacity, usage, filesystem and SSD/HDD classification, optionally with disk I/O counters",
        input_schema = schema_for_type::<StorageParams>()
    )]
    async fn get_storage_metrics(&self, arguments: JsonObject) -> McpResult<CallToolResult> {
        self.call(ToolName::GetStorageMetrics, arguments).await
    }

    #[tool(
        description = "Get network interfaces with addresses and traffic counters, optionally with active connections (metadata only)",
        input_schema = schema_for_type::<NetworkParams>()
    )]
    async fn get_network_metrics(&self, arguments: JsonObject) -> McpResult<CallToolResult> {
        self.call(ToolName::GetNetworkMetrics, arguments).await
    }

    #[tool(
        description = "List running processes sorted by cpu, memory or name",
        input_schema = schema_for_type::<ProcessParams>()
    )]
    async fn get_processes(&self, arguments: JsonObject) -> McpResult<CallToolResult> {
        self.call(ToolName::GetProcesses, arguments).await
    }

    #[tool(
        description = "List installed applications, optionally filtered by category",
        input_schema = schema_for_type::<ApplicationParams>()
    )]
    async fn get_installed_applications(
        &self,
        arguments: JsonObject,
    ) -> McpResult<CallToolResult> {
        self.call(ToolName::GetInstalledApplications, arguments).await
    }

    #[tool(
        description = "Get battery charge, charging state, time remaining, health and the most power-hungry processes",
        input_schema = schema_for_type::<NoParams>()
    )]
    async fn get_battery_status(&self, arguments: JsonObject) -> McpResult<CallToolResult> {
        self.call(ToolName::GetBatteryStatus, arguments).await
    }

    #[tool(
        description = "Read recent system, application or security log entries",
        input_schema = schema_for_type::<LogParams>()
    )]
    async fn get_system_logs(&self, arguments: JsonObject) -> McpResult<CallToolResult> {
        self.call(ToolName::GetSystemLogs, arguments).await
    }

    #[tool(
        description = "Get motherboard, BIOS/UEFI, computer model and memory module details",
        input_schema = schema_for_type::<MotherboardParams>()
    )]
    async fn get_motherboard_details(&self, arguments: JsonObject) -> McpResult<CallToolResult> {
        self.call(ToolName::GetMotherboardDetails, arguments).await
    }

    #[tool(
        description = "Observe the system for a few seconds and report performance bottlenecks with suggested actions",
        input_schema = schema_for_type::<DiagnoseParams>()
    )]
    async fn diagnose_performance(&self, arguments: JsonObject) -> McpResult<CallToolResult> {
        self.call(ToolName::DiagnosePerformance, arguments).await
    }

    #[tool(
        description = "Recommend hardware upgrades for a workload (gaming, productivity, development, content_creation, general)",
        input_schema = schema_for_type::<RecommendationParams>()
    )]
    async fn get_hardware_recommendations(
        &self,
        arguments: JsonObject,
    ) -> McpResult<CallToolResult> {
        self.call(ToolName::GetHardwareRecommendations, arguments).await
    }
}

impl SysDiagMcpServer {
    /// Server over an explicit metric source
    pub fn with_source(source: Arc<dyn SystemMetricsSource>, config: Config) -> Self {
        let dispatcher = Dispatcher::new(Arc::new(ToolRegistry::new()), source, Arc::new(config));
        Self {
            dispatcher,
            tool_router: Self::tool_router(),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handlers forward the raw argument object. The param types are decoded
    /// only by `params::parse_call`, so wrong types and unknown keys come back
    /// as `InvalidArgument` results instead of protocol errors.
    async fn call(&self, tool: ToolName, arguments: JsonObject) -> McpResult<CallToolResult> {
        let request = ToolRequest::new(tool.as_str()).with_arguments(arguments);
        respond(&self.dispatcher.dispatch(request).await)
    }
}

/// Tool errors are results with `is_error` set, never protocol errors
fn respond(response: &ToolResponse) -> McpResult<CallToolResult> {
    match response {
        ToolResponse::Success(envelope) => json_success(envelope),
        ToolResponse::Failure(error) => json_error(&error.envelope()),
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl rmcp::ServerHandler for SysDiagMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(DESCRIPTION.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

impl Default for SysDiagMcpServer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// EmbeddableMcp Implementation
// ============================================================================

#[async_trait]
impl EmbeddableMcp for SysDiagMcpServer {
    fn server_name(&self) -> &str {
        "sysdiag"
    }

    fn server_description(&self) -> Option<&str> {
        Some(DESCRIPTION)
    }

    fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    /// Unknown names come back as an `UnknownTool` error result
    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
        let arguments = match params {
            Value::Null => None,
            Value::Object(map) => Some(map),
            other => {
                return Err(EmbeddableError::InvalidParams(format!(
                    "expected a JSON object, got {}",
                    other
                )))
            }
        };
        let request = ToolRequest {
            tool_name: name.to_string(),
            arguments,
        };
        respond(&self.dispatcher.dispatch(request).await).map_err(Into::into)
    }
}
