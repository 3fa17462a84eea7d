//! Storage metric types

use serde::{Deserialize, Serialize};

use super::{ByteSize, Metric};

/// Mounted volumes and optional device I/O counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSnapshot {
    pub volumes: Vec<Volume>,
    /// Per-device I/O counters (only when requested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub io_stats: Option<Metric<Vec<DiskIo>>>,
}

/// Individual mounted volume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volume {
    /// Device name (e.g. "/dev/nvme0n1p2", "C:")
    pub device: String,
    pub mount_point: String,
    /// Filesystem type (e.g. "ext4", "ntfs", "apfs")
    pub filesystem: String,
    pub total: ByteSize,
    pub used: ByteSize,
    pub available: ByteSize,
    /// Unavailable for zero-sized pseudo filesystems
    pub used_percent: Metric<f64>,
    pub is_removable: bool,
    pub media: MediaClassification,
}

/// Storage media kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Ssd,
    Hdd,
    Unknown,
}

/// How much the media classification can be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Backed by a rotation-rate signal from the OS
    Certain,
    /// Inferred from device naming or filesystem
    Heuristic,
}

/// SSD/HDD classification with its confidence and basis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaClassification {
    pub kind: MediaKind,
    pub confidence: Confidence,
    /// Signal the classification came from
    pub basis: String,
}

/// Cumulative I/O counters for one block device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskIo {
    pub device: String,
    pub reads_completed: u64,
    pub writes_completed: u64,
    pub read: ByteSize,
    pub written: ByteSize,
    pub read_time_ms: u64,
    pub write_time_ms: u64,
}
