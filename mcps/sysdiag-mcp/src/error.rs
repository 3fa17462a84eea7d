//! Error taxonomy for tool dispatch and metric collection

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Category;

/// Failure of a single adapter call
///
/// Adapters prefer partial snapshots; this is returned only when nothing in
/// the category could be collected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollectError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Failed(String),
}

impl CollectError {
    pub fn into_tool_error(self, category: Category) -> ToolError {
        match self {
            CollectError::PermissionDenied(reason) => ToolError::PermissionDenied { category, reason },
            CollectError::Unavailable(reason) => ToolError::Unavailable { category, reason },
            CollectError::Failed(detail) => ToolError::CollectionFailed { category, detail },
        }
    }
}

/// Error returned to the caller in place of a tool result
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid argument for {tool}: {message}")]
    InvalidArgument { tool: String, message: String },

    #[error("Failed to collect {category} metrics: {detail}")]
    CollectionFailed { category: Category, detail: String },

    #[error("Permission denied while collecting {category} metrics: {reason}")]
    PermissionDenied { category: Category, reason: String },

    #[error("{category} metrics unavailable: {reason}")]
    Unavailable { category: Category, reason: String },

    #[error("Collecting {category} metrics timed out after {secs}s")]
    Timeout { category: Category, secs: u64 },
}

/// Machine-readable error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    UnknownTool,
    InvalidArgument,
    CollectionFailed,
    PermissionDenied,
    Unavailable,
    Timeout,
}

/// Wire form of a [`ToolError`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error_kind: ErrorKind,
    pub message: String,
    pub category: Option<Category>,
}

impl ToolError {
    pub fn invalid(tool: impl Into<String>, message: impl Into<String>) -> Self {
        ToolError::InvalidArgument {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::UnknownTool(_) => ErrorKind::UnknownTool,
            ToolError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            ToolError::CollectionFailed { .. } => ErrorKind::CollectionFailed,
            ToolError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            ToolError::Unavailable { .. } => ErrorKind::Unavailable,
            ToolError::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    pub fn category(&self) -> Option<Category> {
        match self {
            ToolError::UnknownTool(_) | ToolError::InvalidArgument { .. } => None,
            ToolError::CollectionFailed { category, .. }
            | ToolError::PermissionDenied { category, .. }
            | ToolError::Unavailable { category, .. }
            | ToolError::Timeout { category, .. } => Some(*category),
        }
    }

    /// Caller mistakes, reported before any collection is attempted
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            ToolError::UnknownTool(_) | ToolError::InvalidArgument { .. }
        )
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            error_kind: self.kind(),
            message: self.to_string(),
            category: self.category(),
        }
    }
}
