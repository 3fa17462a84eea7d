//! System log types

use serde::{Deserialize, Serialize};

/// Which log stream to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    System,
    Application,
    Security,
    All,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::System => "system",
            LogKind::Application => "application",
            LogKind::Security => "security",
            LogKind::All => "all",
        }
    }
}

/// Recent log entries, newest last
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSnapshot {
    pub log_type: LogKind,
    /// Backend the entries were read from (e.g. "journald", "/var/log/syslog")
    pub source: String,
    pub count: usize,
    pub entries: Vec<LogEntry>,
}

/// Individual log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// RFC 3339 timestamp when the backend provides one
    pub time: Option<String>,
    /// Severity as reported by the backend
    pub level: Option<String>,
    /// Emitting unit, provider or subsystem
    pub source: Option<String>,
    pub message: String,
}
