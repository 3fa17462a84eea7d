//! System Diagnostics MCP Server
//!
//! Serves the diagnostic tools over stdio. Logs go to stderr; set
//! `RUST_LOG` to adjust verbosity and `SYSDIAG_CONFIG_PATH` to point at a
//! config file.

use sysdiag_mcp::SysDiagMcpServer;

mcp_common::serve_stdio!(SysDiagMcpServer, "sysdiag_mcp");
