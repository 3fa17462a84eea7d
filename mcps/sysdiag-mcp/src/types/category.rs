//! Metric categories

use std::fmt;

use serde::{Deserialize, Serialize};

/// The metric category a tool reads, used for error context and resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    System,
    Cpu,
    Memory,
    Storage,
    Network,
    Processes,
    Applications,
    Battery,
    Logs,
    Motherboard,
    Performance,
    Hardware,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::System => "system",
            Category::Cpu => "cpu",
            Category::Memory => "memory",
            Category::Storage => "storage",
            Category::Network => "network",
            Category::Processes => "processes",
            Category::Applications => "applications",
            Category::Battery => "battery",
            Category::Logs => "logs",
            Category::Motherboard => "motherboard",
            Category::Performance => "performance",
            Category::Hardware => "hardware",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
