//! The fixed set of diagnostic tools

use std::collections::BTreeMap;
use std::fmt;

use crate::types::Category;

/// Every tool the server exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToolName {
    GetSystemInfo,
    GetCpuMetrics,
    GetMemoryMetrics,
    GetStorageMetrics,
    GetNetworkMetrics,
    GetProcesses,
    GetInstalledApplications,
    GetBatteryStatus,
    GetSystemLogs,
    GetMotherboardDetails,
    DiagnosePerformance,
    GetHardwareRecommendations,
}

impl ToolName {
    pub const ALL: [ToolName; 12] = [
        ToolName::GetSystemInfo,
        ToolName::GetCpuMetrics,
        ToolName::GetMemoryMetrics,
        ToolName::GetStorageMetrics,
        ToolName::GetNetworkMetrics,
        ToolName::GetProcesses,
        ToolName::GetInstalledApplications,
        ToolName::GetBatteryStatus,
        ToolName::GetSystemLogs,
        ToolName::GetMotherboardDetails,
        ToolName::DiagnosePerformance,
        ToolName::GetHardwareRecommendations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::GetSystemInfo => "get_system_info",
            ToolName::GetCpuMetrics => "get_cpu_metrics",
            ToolName::GetMemoryMetrics => "get_memory_metrics",
            ToolName::GetStorageMetrics => "get_storage_metrics",
            ToolName::GetNetworkMetrics => "get_network_metrics",
            ToolName::GetProcesses => "get_processes",
            ToolName::GetInstalledApplications => "get_installed_applications",
            ToolName::GetBatteryStatus => "get_battery_status",
            ToolName::GetSystemLogs => "get_system_logs",
            ToolName::GetMotherboardDetails => "get_motherboard_details",
            ToolName::DiagnosePerformance => "diagnose_performance",
            ToolName::GetHardwareRecommendations => "get_hardware_recommendations",
        }
    }

    /// The metric category the tool reads
    pub fn category(&self) -> Category {
        match self {
            ToolName::GetSystemInfo => Category::System,
            ToolName::GetCpuMetrics => Category::Cpu,
            ToolName::GetMemoryMetrics => Category::Memory,
            ToolName::GetStorageMetrics => Category::Storage,
            ToolName::GetNetworkMetrics => Category::Network,
            ToolName::GetProcesses => Category::Processes,
            ToolName::GetInstalledApplications => Category::Applications,
            ToolName::GetBatteryStatus => Category::Battery,
            ToolName::GetSystemLogs => Category::Logs,
            ToolName::GetMotherboardDetails => Category::Motherboard,
            ToolName::DiagnosePerformance => Category::Performance,
            ToolName::GetHardwareRecommendations => Category::Hardware,
        }
    }

    pub fn parse(name: &str) -> Option<ToolName> {
        ToolName::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable name lookup, built once at startup and shared read-only
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, ToolName>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: ToolName::ALL.into_iter().map(|t| (t.as_str(), t)).collect(),
        }
    }

    /// Exact, case-sensitive lookup
    pub fn lookup(&self, name: &str) -> Option<ToolName> {
        self.tools.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tools.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
