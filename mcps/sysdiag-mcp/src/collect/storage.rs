//! Mounted volumes and SSD/HDD classification

use sysinfo::{DiskKind, Disks};

use crate::platform::PlatformProbe;
use crate::types::{
    percent_of, round2, ByteSize, Confidence, MediaClassification, MediaKind, Metric,
    StorageSnapshot, Volume,
};

fn rotation_signal(kind: DiskKind) -> Option<MediaKind> {
    match kind {
        DiskKind::SSD => Some(MediaKind::Ssd),
        DiskKind::HDD => Some(MediaKind::Hdd),
        DiskKind::Unknown(_) => None,
    }
}

/// Classify a volume's media
///
/// The OS rotation signal wins when present. Otherwise the device name and
/// filesystem are matched against known patterns.
pub fn classify_media(device: &str, filesystem: &str, os_signal: Option<MediaKind>) -> MediaClassification {
    if let Some(kind) = os_signal {
        return MediaClassification {
            kind,
            confidence: Confidence::Certain,
            basis: "OS rotation flag".into(),
        };
    }

    let device_lower = device.to_ascii_lowercase();
    let (kind, basis) = if device_lower.contains("nvme") {
        (MediaKind::Ssd, "NVMe device name")
    } else if device_lower.contains("mmcblk") {
        (MediaKind::Ssd, "eMMC/SD device name")
    } else if device_lower.contains("ssd") {
        (MediaKind::Ssd, "device name mentions SSD")
    } else if filesystem.eq_ignore_ascii_case("apfs") {
        (MediaKind::Ssd, "APFS filesystem")
    } else if device_lower.starts_with("/dev/hd") {
        (MediaKind::Hdd, "legacy IDE device name")
    } else {
        (MediaKind::Unknown, "no identifying signal")
    };

    MediaClassification {
        kind,
        confidence: Confidence::Heuristic,
        basis: basis.into(),
    }
}

pub fn volumes() -> Vec<Volume> {
    let disks = Disks::new_with_refreshed_list();

    let mut volumes: Vec<Volume> = disks
        .iter()
        .map(|disk| {
            let total = disk.total_space();
            let available = disk.available_space();
            let used = total.saturating_sub(available);
            let device = disk.name().to_string_lossy().to_string();
            let filesystem = disk.file_system().to_string_lossy().to_string();

            Volume {
                media: classify_media(&device, &filesystem, rotation_signal(disk.kind())),
                device,
                mount_point: disk.mount_point().to_string_lossy().to_string(),
                filesystem,
                total: ByteSize::new(total),
                used: ByteSize::new(used),
                available: ByteSize::new(available),
                used_percent: Metric::from_option(
                    percent_of(used, total).map(round2),
                    "zero-sized filesystem",
                ),
                is_removable: disk.is_removable(),
            }
        })
        .collect();

    volumes.sort_by(|a, b| a.mount_point.cmp(&b.mount_point));
    volumes
}

pub fn storage_snapshot(probe: &dyn PlatformProbe, include_io_stats: bool) -> StorageSnapshot {
    StorageSnapshot {
        volumes: volumes(),
        io_stats: include_io_stats.then(|| probe.disk_io()),
    }
}

/// Whether any fixed volume is solid-state
pub fn has_ssd(volumes: &[Volume]) -> Metric<bool> {
    let fixed: Vec<&Volume> = volumes.iter().filter(|v| !v.is_removable).collect();
    if fixed.iter().any(|v| v.media.kind == MediaKind::Ssd) {
        Metric::available(true)
    } else if fixed.iter().any(|v| v.media.kind == MediaKind::Hdd) {
        Metric::available(false)
    } else {
        Metric::platform("storage media type could not be determined")
    }
}
