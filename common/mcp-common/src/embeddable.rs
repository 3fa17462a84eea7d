//! In-process execution of MCP servers
//!
//! [`EmbeddableMcp`] lets a host call a server's tools directly, with no
//! child process and no stdio framing in between.
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::EmbeddableMcp;
//! use sysdiag_mcp::SysDiagMcpServer;
//!
//! let server = SysDiagMcpServer::new();
//!
//! let names: Vec<_> = server.list_tools().into_iter().map(|t| t.name).collect();
//! let result = server
//!     .call_tool("get_memory_metrics", serde_json::json!({ "include_processes": true }))
//!     .await?;
//! ```

use async_trait::async_trait;
use rmcp::model::{CallToolResult, Tool};
use serde_json::Value;

/// Failure of an in-process call before a tool result exists
#[derive(Debug, thiserror::Error)]
pub enum EmbeddableError {
    /// No tool with that name
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Arguments were not a JSON object
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// Protocol-level error raised by the handler
    #[error("mcp error: {0}")]
    McpError(String),
}

impl From<rmcp::ErrorData> for EmbeddableError {
    fn from(err: rmcp::ErrorData) -> Self {
        EmbeddableError::McpError(err.message.to_string())
    }
}

pub type EmbeddableResult<T> = Result<T, EmbeddableError>;

/// MCP server callable without a transport
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. Hosts issue calls from several
/// tasks at once and share one server instance between them.
///
/// # Implementation
///
/// Servers built on `#[tool_router]` list tools through their router and
/// route `call_tool` to the same code the transport handlers use:
///
/// ```rust,ignore
/// #[async_trait]
/// impl EmbeddableMcp for SysDiagMcpServer {
///     fn server_name(&self) -> &str {
///         "sysdiag"
///     }
///
///     fn list_tools(&self) -> Vec<Tool> {
///         self.tool_router.list_all()
///     }
///
///     async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
///         // dispatch by name, reporting tool failures as `is_error` results
///     }
/// }
/// ```
#[async_trait]
pub trait EmbeddableMcp: Send + Sync {
    /// Name used in MCP configuration files
    fn server_name(&self) -> &str;

    /// Every tool with its name, description and input schema
    fn list_tools(&self) -> Vec<Tool>;

    /// Execute a tool by name
    ///
    /// # Arguments
    ///
    /// * `name` - A tool name as listed by [`list_tools`](Self::list_tools)
    /// * `params` - JSON object of arguments, or `null` for none
    ///
    /// # Returns
    ///
    /// `Err` only when no result can be produced at all. Failures the caller
    /// should read come back as `Ok` with `is_error` set.
    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult>;

    fn server_description(&self) -> Option<&str> {
        None
    }

    fn server_version(&self) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestServer;

    #[async_trait]
    impl EmbeddableMcp for TestServer {
        fn server_name(&self) -> &str {
            "test-server"
        }

        fn list_tools(&self) -> Vec<Tool> {
            vec![]
        }

        async fn call_tool(&self, name: &str, _params: Value) -> EmbeddableResult<CallToolResult> {
            Err(EmbeddableError::ToolNotFound(name.to_string()))
        }
    }

    #[test]
    fn test_defaults() {
        let server = TestServer;
        assert_eq!(server.server_name(), "test-server");
        assert!(server.list_tools().is_empty());
        assert!(server.server_description().is_none());
    }

    #[tokio::test]
    async fn test_call_unknown_tool() {
        let server = TestServer;
        let result = server.call_tool("unknown", serde_json::json!({})).await;
        assert!(matches!(result, Err(EmbeddableError::ToolNotFound(_))));
    }
}
