//! System Diagnostics MCP Library
//!
//! Read-only hardware, OS and performance diagnostics exposed as twelve MCP
//! tools. Every reading that a platform cannot supply is tagged with the
//! reason instead of being defaulted, and two rule-based tools turn the
//! readings into performance findings and hardware recommendations.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use sysdiag_mcp::{EmbeddableMcp, SysDiagMcpServer};
//!
//! let server = SysDiagMcpServer::new();
//! let result = server.call_tool("diagnose_performance", serde_json::json!({ "duration": 2 })).await?;
//! ```
//!
//! # Usage as Binary
//!
//! Run directly: `sysdiag-mcp`
//!
//! Or configure in `.mcp.json`:
//! ```json
//! { "mcpServers": { "sysdiag": { "command": "./sysdiag-mcp" } } }
//! ```

pub mod collect;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod params;
pub mod platform;
pub mod registry;
pub mod resolver;
pub mod rules;
pub mod server;
pub mod source;
pub mod types;

pub use config::Config;
pub use dispatcher::{Dispatcher, SuccessEnvelope, ToolRequest, ToolResponse};
pub use error::{CollectError, ErrorEnvelope, ErrorKind, ToolError};
pub use registry::{ToolName, ToolRegistry};
pub use server::SysDiagMcpServer;
pub use source::{HostSource, SystemMetricsSource};

// Re-export EmbeddableMcp trait for in-process usage
pub use mcp_common::{EmbeddableError, EmbeddableMcp, EmbeddableResult};
