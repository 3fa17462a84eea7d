//! Result helpers for MCP tool responses

use rmcp::{
    model::{CallToolResult, Content},
    ErrorData as McpError,
};
use serde::Serialize;

use crate::error::internal_error;

/// Successful result carrying `data` as pretty-printed JSON text
///
/// ```rust,ignore
/// async fn get_system_info(&self) -> Result<CallToolResult, McpError> {
///     json_success(&snapshot)
/// }
/// ```
pub fn json_success<T: Serialize>(data: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(data).map_err(|e| internal_error(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Tool-level failure (`is_error = true`) carrying a structured error body
///
/// Use this for errors the caller should read and act on; protocol errors
/// belong in `Err(McpError)` instead.
pub fn json_error<T: Serialize>(error: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(error).map_err(|e| internal_error(e.to_string()))?;
    Ok(CallToolResult::error(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[test]
    fn test_json_success() {
        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };
        let result = json_success(&data).unwrap();
        assert!(!result.is_error.unwrap_or(false));
        assert_eq!(result.content.len(), 1);
    }

    #[test]
    fn test_json_error_sets_flag() {
        let body = serde_json::json!({ "error_kind": "Timeout" });
        let result = json_error(&body).unwrap();
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.content.len(), 1);
    }
}
