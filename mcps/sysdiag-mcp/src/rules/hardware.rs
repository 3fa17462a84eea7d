//! Hardware upgrade recommendations

use crate::config::RecommendationPolicy;
use crate::types::{DiagnosticFinding, FindingCategory, HardwareProfile, Severity, UseCase};

/// Baseline hardware for a declared workload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UseCaseMinimum {
    pub cores: usize,
    pub memory_gib: f64,
    /// Subsystems in the order they matter for this workload
    pub priority: [FindingCategory; 4],
}

pub fn minimum_for(use_case: UseCase) -> UseCaseMinimum {
    use FindingCategory::*;
    match use_case {
        UseCase::Gaming => UseCaseMinimum {
            cores: 6,
            memory_gib: 16.0,
            priority: [Gpu, Cpu, Memory, Storage],
        },
        UseCase::ContentCreation => UseCaseMinimum {
            cores: 8,
            memory_gib: 32.0,
            priority: [Cpu, Memory, Storage, Gpu],
        },
        UseCase::Development => UseCaseMinimum {
            cores: 4,
            memory_gib: 16.0,
            priority: [Memory, Storage, Cpu, Gpu],
        },
        UseCase::Productivity => UseCaseMinimum {
            cores: 2,
            memory_gib: 8.0,
            priority: [Storage, Memory, Cpu, Gpu],
        },
        UseCase::General => UseCaseMinimum {
            cores: 4,
            memory_gib: 8.0,
            priority: [Memory, Storage, Cpu, Gpu],
        },
    }
}

fn rank(minimum: &UseCaseMinimum, category: FindingCategory) -> usize {
    minimum
        .priority
        .iter()
        .position(|c| *c == category)
        .unwrap_or(minimum.priority.len())
}

/// Workload-specific advice that applies regardless of current usage
fn advisories(use_case: UseCase, findings: &mut Vec<DiagnosticFinding>) {
    match use_case {
        UseCase::Gaming => findings.push(DiagnosticFinding::new(
            FindingCategory::Gpu,
            Severity::Info,
            "Gaming performance depends mostly on the graphics card",
            "Use a dedicated GPU with at least 8 GB of VRAM for current titles",
        )),
        UseCase::ContentCreation => findings.push(DiagnosticFinding::new(
            FindingCategory::Storage,
            Severity::Info,
            "Media editing benefits from fast scratch storage",
            "Keep project and cache files on an NVMe SSD",
        )),
        UseCase::Development => findings.push(DiagnosticFinding::new(
            FindingCategory::Storage,
            Severity::Info,
            "Builds and dependency installs are storage-bound",
            "Keep source trees and build caches on an NVMe SSD",
        )),
        UseCase::Productivity | UseCase::General => {}
    }
}

/// Evaluate installed hardware and its utilisation for a workload
///
/// Ordered by severity descending, then the workload's priority for the
/// category, then category name. The same profile always yields the same list.
pub fn recommend_hardware(
    profile: &HardwareProfile,
    use_case: UseCase,
    policy: &RecommendationPolicy,
) -> Vec<DiagnosticFinding> {
    let minimum = minimum_for(use_case);
    let mut findings = Vec::new();

    let memory_gib = profile.total_memory.gib();
    if memory_gib + 0.5 < minimum.memory_gib {
        findings.push(DiagnosticFinding::new(
            FindingCategory::Memory,
            Severity::Warning,
            format!(
                "{:.1} GiB of RAM is below the {} GiB recommended for {}",
                memory_gib,
                minimum.memory_gib,
                use_case.as_str()
            ),
            format!("Upgrade to at least {} GiB of RAM", minimum.memory_gib),
        ));
    }

    if let Some(used) = profile.memory_used_percent.get() {
        if used >= policy.memory_pressure_percent {
            findings.push(DiagnosticFinding::new(
                FindingCategory::Memory,
                Severity::Warning,
                format!("Memory is under pressure at {:.1}% used", used),
                "Add RAM to avoid swapping",
            ));
        }
    }

    let cores = profile.physical_cores.get().unwrap_or(profile.logical_cores);
    if cores < minimum.cores {
        findings.push(DiagnosticFinding::new(
            FindingCategory::Cpu,
            Severity::Warning,
            format!(
                "{} CPU cores is below the {} recommended for {}",
                cores,
                minimum.cores,
                use_case.as_str()
            ),
            format!("Consider a CPU with {} or more cores", minimum.cores),
        ));
    }

    if let Some(cpu) = profile.cpu_percent.get() {
        if cpu >= policy.cpu_saturation_percent {
            let (message, action) = match profile.per_core_stddev.get() {
                Some(stddev) if stddev <= policy.core_balance_stddev => (
                    format!("CPU saturated at {:.1}% with load spread evenly across cores", cpu),
                    "Workload is parallel; a CPU with more cores will help most",
                ),
                Some(_) => (
                    format!("CPU saturated at {:.1}% with load concentrated on a few cores", cpu),
                    "Workload is lightly threaded; a CPU with faster single-core performance will help most",
                ),
                None => (
                    format!("CPU saturated at {:.1}%", cpu),
                    "Consider a faster CPU",
                ),
            };
            findings.push(DiagnosticFinding::new(
                FindingCategory::Cpu,
                Severity::Warning,
                message,
                action,
            ));
        }
    }

    if profile.has_ssd.get() == Some(false) {
        findings.push(DiagnosticFinding::new(
            FindingCategory::Storage,
            Severity::Warning,
            "No solid-state drive detected",
            "Move the operating system and applications to an SSD",
        ));
    }

    advisories(use_case, &mut findings);

    findings.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| rank(&minimum, a.category).cmp(&rank(&minimum, b.category)))
            .then_with(|| a.category.as_str().cmp(b.category.as_str()))
    });
    findings
}

/// Compatibility notes for the categories the recommendations touch
pub fn compatibility_notes(findings: &[DiagnosticFinding], use_case: UseCase) -> Vec<String> {
    let touches = |category: FindingCategory| {
        findings
            .iter()
            .any(|f| f.category == category && f.severity > Severity::Info)
    };

    let mut notes = Vec::new();
    if touches(FindingCategory::Memory) {
        notes.push(
            "Check free DIMM slots, maximum supported capacity and memory type (DDR4/DDR5) before buying RAM; get_motherboard_details with include_slots lists installed modules".to_string(),
        );
    }
    if touches(FindingCategory::Cpu) {
        notes.push(
            "A replacement CPU must match the motherboard socket and chipset, and may need a BIOS update".to_string(),
        );
    }
    if touches(FindingCategory::Storage) {
        notes.push(
            "Confirm a free M.2 slot (NVMe) or SATA port and power connector before adding an SSD".to_string(),
        );
    }
    if use_case == UseCase::Gaming {
        notes.push(
            "Verify power supply wattage and case clearance before installing a dedicated GPU".to_string(),
        );
    }
    if notes.is_empty() {
        notes.push(format!(
            "Current hardware meets the {} baseline; no upgrades needed",
            use_case.as_str()
        ));
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ByteSize, Metric};

    const GIB: u64 = 1 << 30;

    fn profile(cores: usize, memory_gib: u64) -> HardwareProfile {
        HardwareProfile {
            physical_cores: Metric::available(cores),
            logical_cores: cores * 2,
            total_memory: ByteSize::new(memory_gib * GIB),
            memory_used_percent: Metric::available(40.0),
            cpu_percent: Metric::available(20.0),
            per_core_stddev: Metric::available(5.0),
            has_ssd: Metric::available(true),
            motherboard: Metric::platform("fixture"),
        }
    }

    fn categories(findings: &[DiagnosticFinding]) -> Vec<(Severity, FindingCategory)> {
        findings.iter().map(|f| (f.severity, f.category)).collect()
    }

    #[test]
    fn test_capable_general_machine_has_no_findings() {
        let findings = recommend_hardware(&profile(8, 32), UseCase::General, &RecommendationPolicy::default());
        assert!(findings.is_empty());
        let notes = compatibility_notes(&findings, UseCase::General);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("no upgrades needed"));
    }

    #[test]
    fn test_gaming_minimums_and_gpu_advisory() {
        let findings = recommend_hardware(&profile(4, 8), UseCase::Gaming, &RecommendationPolicy::default());
        assert_eq!(
            categories(&findings),
            vec![
                (Severity::Warning, FindingCategory::Cpu),
                (Severity::Warning, FindingCategory::Memory),
                (Severity::Info, FindingCategory::Gpu),
            ]
        );
    }

    #[test]
    fn test_reported_capacity_tolerance() {
        // 15.6 GiB usable on a 16 GiB machine still meets a 16 GiB minimum
        let mut p = profile(8, 16);
        p.total_memory = ByteSize::new(15 * GIB + GIB * 6 / 10);
        let findings = recommend_hardware(&p, UseCase::Development, &RecommendationPolicy::default());
        assert!(findings.iter().all(|f| f.category != FindingCategory::Memory));
    }

    #[test]
    fn test_saturated_even_load_suggests_more_cores() {
        let mut p = profile(8, 32);
        p.cpu_percent = Metric::available(92.0);
        p.per_core_stddev = Metric::available(4.0);
        let findings = recommend_hardware(&p, UseCase::General, &RecommendationPolicy::default());
        assert_eq!(findings.len(), 1);
        assert!(findings[0].suggested_action.contains("more cores"));
    }

    #[test]
    fn test_saturated_uneven_load_suggests_faster_cores() {
        let mut p = profile(8, 32);
        p.cpu_percent = Metric::available(90.0);
        p.per_core_stddev = Metric::available(30.0);
        let findings = recommend_hardware(&p, UseCase::General, &RecommendationPolicy::default());
        assert!(findings[0].suggested_action.contains("single-core"));
    }

    #[test]
    fn test_missing_ssd_and_memory_pressure() {
        let mut p = profile(8, 16);
        p.has_ssd = Metric::available(false);
        p.memory_used_percent = Metric::available(85.0);
        let findings = recommend_hardware(&p, UseCase::Productivity, &RecommendationPolicy::default());
        // productivity ranks storage ahead of memory
        assert_eq!(
            categories(&findings),
            vec![
                (Severity::Warning, FindingCategory::Storage),
                (Severity::Warning, FindingCategory::Memory),
            ]
        );
        let notes = compatibility_notes(&findings, UseCase::Productivity);
        assert_eq!(notes.len(), 2);
    }

    #[test]
    fn test_unknown_media_does_not_trigger_ssd_finding() {
        let mut p = profile(8, 32);
        p.has_ssd = Metric::platform("storage media type could not be determined");
        let findings = recommend_hardware(&p, UseCase::General, &RecommendationPolicy::default());
        assert!(findings.is_empty());
    }

    #[test]
    fn test_recommendations_are_reproducible() {
        let mut p = profile(2, 4);
        p.has_ssd = Metric::available(false);
        p.cpu_percent = Metric::available(99.0);
        let policy = RecommendationPolicy::default();
        let first = recommend_hardware(&p, UseCase::ContentCreation, &policy);
        for _ in 0..5 {
            assert_eq!(recommend_hardware(&p, UseCase::ContentCreation, &policy), first);
        }
    }
}
