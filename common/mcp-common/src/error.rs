//! Transport-edge error shorthands

use rmcp::ErrorData as McpError;

pub type McpResult<T> = Result<T, McpError>;

/// Internal error with a message
pub fn internal_error(message: impl Into<String>) -> McpError {
    McpError::internal_error(message.into(), None)
}
