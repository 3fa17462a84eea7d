//! Diagnostic findings produced by the rules engine

use std::fmt;

use serde::{Deserialize, Serialize};

/// Finding severity; ordered so that `Critical > Warning > Info`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Subsystem a finding is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    Cpu,
    Memory,
    Disk,
    Storage,
    Gpu,
}

impl FindingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingCategory::Cpu => "cpu",
            FindingCategory::Memory => "memory",
            FindingCategory::Disk => "disk",
            FindingCategory::Storage => "storage",
            FindingCategory::Gpu => "gpu",
        }
    }
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory statement derived from one or more snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticFinding {
    pub category: FindingCategory,
    pub severity: Severity,
    pub message: String,
    pub suggested_action: String,
}

impl DiagnosticFinding {
    pub fn new(
        category: FindingCategory,
        severity: Severity,
        message: impl Into<String>,
        suggested_action: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            message: message.into(),
            suggested_action: suggested_action.into(),
        }
    }
}
