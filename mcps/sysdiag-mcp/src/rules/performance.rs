//! Performance bottleneck rules

use crate::config::Thresholds;
use crate::types::{DiagnosticFinding, FindingCategory, PerformanceSnapshot, Severity};

fn level(value: f64, warning: f64, critical: f64) -> Option<Severity> {
    if value >= critical {
        Some(Severity::Critical)
    } else if value > warning {
        Some(Severity::Warning)
    } else {
        None
    }
}

/// Evaluate a sampling window against the configured thresholds
///
/// One finding per breached threshold, ordered by severity (critical first)
/// and then category name. Unavailable readings are skipped.
pub fn diagnose_performance(
    snapshot: &PerformanceSnapshot,
    thresholds: &Thresholds,
) -> Vec<DiagnosticFinding> {
    let mut findings = Vec::new();

    if let Some(cpu) = snapshot.cpu_average_percent.get() {
        if let Some(severity) = level(
            cpu,
            thresholds.cpu_warning_percent,
            thresholds.cpu_critical_percent,
        ) {
            findings.push(DiagnosticFinding::new(
                FindingCategory::Cpu,
                severity,
                format!("CPU usage averaged {:.1}% over the sampling window", cpu),
                "Identify the top CPU consumers and close or reschedule heavy workloads",
            ));
        }
    }

    if let Some(memory) = snapshot.memory_used_percent.get() {
        if let Some(severity) = level(
            memory,
            thresholds.memory_warning_percent,
            thresholds.memory_critical_percent,
        ) {
            findings.push(DiagnosticFinding::new(
                FindingCategory::Memory,
                severity,
                format!("Memory usage at {:.1}%", memory),
                "Close memory-hungry applications or add RAM",
            ));
        }
    }

    for volume in &snapshot.volumes {
        let Some(used) = volume.used_percent.get() else {
            continue;
        };
        if let Some(severity) = level(
            used,
            thresholds.disk_full_warning_percent,
            thresholds.disk_full_critical_percent,
        ) {
            findings.push(DiagnosticFinding::new(
                FindingCategory::Storage,
                severity,
                format!("Volume {} is {:.1}% full", volume.mount_point, used),
                "Free up space or move data to another volume",
            ));
        }
    }

    if let Some(io_wait) = snapshot.io_wait_percent.get() {
        if io_wait > thresholds.io_wait_warning_percent {
            findings.push(DiagnosticFinding::new(
                FindingCategory::Disk,
                Severity::Warning,
                format!("CPU spent {:.1}% of its time waiting on I/O", io_wait),
                "Check for processes with heavy disk activity or a slow/failing drive",
            ));
        }
    }

    if let (Some(read), Some(write)) = (
        snapshot.disk_read_mb_s.get(),
        snapshot.disk_write_mb_s.get(),
    ) {
        let total = read + write;
        if total > thresholds.disk_throughput_warning_mb_s {
            findings.push(DiagnosticFinding::new(
                FindingCategory::Disk,
                Severity::Warning,
                format!(
                    "Sustained disk throughput of {:.1} MB/s (read {:.1}, write {:.1})",
                    total, read, write
                ),
                "Heavy disk activity detected; consider faster storage if this is routine",
            ));
        }
    }

    findings.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.category.as_str().cmp(b.category.as_str()))
    });
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Metric, VolumeFill};

    fn snapshot(cpu: f64, memory: f64, disk: f64) -> PerformanceSnapshot {
        PerformanceSnapshot {
            cpu_average_percent: Metric::available(cpu),
            cpu_peak_percent: Metric::available(cpu),
            memory_used_percent: Metric::available(memory),
            memory_peak_percent: Metric::available(memory),
            volumes: vec![VolumeFill {
                mount_point: "/".into(),
                used_percent: Metric::available(disk),
            }],
            io_wait_percent: Metric::available(1.0),
            disk_read_mb_s: Metric::available(1.0),
            disk_write_mb_s: Metric::available(1.0),
        }
    }

    #[test]
    fn test_single_cpu_finding() {
        let findings = diagnose_performance(&snapshot(95.0, 50.0, 40.0), &Thresholds::default());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, FindingCategory::Cpu);
        assert_eq!(findings[0].severity, Severity::Critical);
    }

    #[test]
    fn test_healthy_system_has_no_findings() {
        let findings = diagnose_performance(&snapshot(20.0, 40.0, 30.0), &Thresholds::default());
        assert!(findings.is_empty());
    }

    #[test]
    fn test_threshold_boundaries() {
        let t = Thresholds::default();
        // warning is strictly above, critical is at-or-above
        assert!(diagnose_performance(&snapshot(85.0, 0.0, 0.0), &t).is_empty());
        assert_eq!(
            diagnose_performance(&snapshot(85.1, 0.0, 0.0), &t)[0].severity,
            Severity::Warning
        );
        assert_eq!(
            diagnose_performance(&snapshot(0.0, 97.0, 0.0), &t)[0].severity,
            Severity::Critical
        );
        assert_eq!(
            diagnose_performance(&snapshot(0.0, 0.0, 91.0), &t)[0].category,
            FindingCategory::Storage
        );
    }

    #[test]
    fn test_ordering_severity_then_category() {
        let mut s = snapshot(90.0, 98.0, 99.0);
        s.io_wait_percent = Metric::available(35.0);
        let findings = diagnose_performance(&s, &Thresholds::default());
        let order: Vec<(Severity, FindingCategory)> =
            findings.iter().map(|f| (f.severity, f.category)).collect();
        assert_eq!(
            order,
            vec![
                (Severity::Critical, FindingCategory::Memory),
                (Severity::Critical, FindingCategory::Storage),
                (Severity::Warning, FindingCategory::Cpu),
                (Severity::Warning, FindingCategory::Disk),
            ]
        );
    }

    #[test]
    fn test_unavailable_metrics_are_skipped() {
        let mut s = snapshot(99.0, 99.0, 99.0);
        s.cpu_average_percent = Metric::platform("no samples");
        s.memory_used_percent = Metric::permission("denied");
        s.volumes[0].used_percent = Metric::platform("zero-sized filesystem");
        assert!(diagnose_performance(&s, &Thresholds::default()).is_empty());
    }

    #[test]
    fn test_disk_throughput_warning() {
        let mut s = snapshot(10.0, 10.0, 10.0);
        s.disk_read_mb_s = Metric::available(80.0);
        s.disk_write_mb_s = Metric::available(40.0);
        let findings = diagnose_performance(&s, &Thresholds::default());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, FindingCategory::Disk);
    }

    #[test]
    fn test_thresholds_come_from_config() {
        let strict = Thresholds {
            cpu_warning_percent: 10.0,
            ..Thresholds::default()
        };
        let findings = diagnose_performance(&snapshot(20.0, 0.0, 0.0), &strict);
        assert_eq!(findings.len(), 1);
    }
}
