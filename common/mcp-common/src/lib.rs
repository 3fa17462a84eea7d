//! Shared plumbing for MCP servers
//!
//! - **Initialization**: [`init_tracing`] and the `serve_stdio!` macro
//! - **Results**: [`json_success`] / [`json_error`] for `CallToolResult` bodies
//! - **Errors**: [`McpResult`] and the [`internal_error`] shorthand
//! - **Embeddable**: [`EmbeddableMcp`] for in-process execution
//!
//! ```rust,ignore
//! // main.rs
//! mcp_common::serve_stdio!(SysDiagMcpServer, "sysdiag_mcp");
//! ```

pub mod embeddable;
pub mod error;
pub mod init;
pub mod result;

pub use embeddable::{EmbeddableError, EmbeddableMcp, EmbeddableResult};
pub use error::{internal_error, McpResult};
pub use init::init_tracing;
pub use result::{json_error, json_success};

pub use rmcp::{
    model::{CallToolResult, Content, Tool},
    ErrorData as McpError,
};

pub use async_trait::async_trait;
