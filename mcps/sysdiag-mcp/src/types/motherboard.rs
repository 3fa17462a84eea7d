//! Motherboard, firmware and system model types

use serde::{Deserialize, Serialize};

use super::{ByteSize, Metric};

/// Baseboard, firmware and system model details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotherboardSnapshot {
    pub baseboard: Baseboard,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bios: Option<BiosInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemModel>,
    /// Installed memory modules (only when requested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_modules: Option<Metric<Vec<MemoryModule>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Baseboard {
    pub manufacturer: Metric<String>,
    pub product: Metric<String>,
    pub version: Metric<String>,
    pub serial_number: Metric<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiosInfo {
    pub vendor: Metric<String>,
    pub version: Metric<String>,
    pub release_date: Metric<String>,
}

/// Computer model as reported by the firmware
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemModel {
    pub manufacturer: Metric<String>,
    pub product: Metric<String>,
    pub version: Metric<String>,
    pub family: Metric<String>,
    pub sku: Metric<String>,
    pub serial_number: Metric<String>,
    pub uuid: Metric<String>,
}

/// Individual memory module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryModule {
    /// Slot / bank locator
    pub locator: String,
    pub size: ByteSize,
    pub speed_mhz: Metric<u64>,
    pub manufacturer: Option<String>,
    pub part_number: Option<String>,
    pub form_factor: Option<String>,
    pub memory_type: Option<String>,
}

/// Firmware query options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareQuery {
    pub include_bios: bool,
    pub include_slots: bool,
    pub include_system: bool,
}
