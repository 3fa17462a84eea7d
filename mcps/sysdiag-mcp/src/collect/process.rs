//! Process listing and ranking

use std::cmp::Ordering;
use std::ffi::OsStr;

use chrono::{DateTime, Utc};
use sysinfo::{ProcessRefreshKind, RefreshKind, System, MINIMUM_CPU_UPDATE_INTERVAL};

use super::memory::used_percent;
use crate::types::{round2, ByteSize, Metric, ProcessRecord, ProcessSort};

/// Processes whose CPU share counts toward battery drain
pub const POWER_HUNGRY_CPU_PERCENT: f64 = 5.0;

pub fn refresh_processes(sys: &mut System) {
    sys.refresh_specifics(
        RefreshKind::new().with_processes(
            ProcessRefreshKind::new()
                .with_cpu()
                .with_memory()
                .with_disk_usage(),
        ),
    );
}

/// Process table with CPU usage measured over a short window
pub async fn sample_processes() -> Vec<ProcessRecord> {
    let mut sys = System::new();
    sys.refresh_memory();
    refresh_processes(&mut sys);
    tokio::time::sleep(MINIMUM_CPU_UPDATE_INTERVAL).await;
    refresh_processes(&mut sys);
    process_records(&sys)
}

/// Resident memory as a share of physical memory
fn memory_share(resident: u64, total_memory: u64) -> Metric<f64> {
    used_percent(resident, total_memory)
}

fn lossy(name: impl AsRef<OsStr>) -> String {
    name.as_ref().to_string_lossy().to_string()
}

pub fn process_records(sys: &System) -> Vec<ProcessRecord> {
    let total_memory = sys.total_memory();

    sys.processes()
        .iter()
        // Userland threads show up as separate entries on Linux
        .filter(|(_, process)| process.thread_kind().is_none())
        .map(|(pid, process)| {
            let threads = match process.tasks() {
                Some(tasks) if tasks.contains(pid) => Metric::available(tasks.len()),
                Some(tasks) => Metric::available(tasks.len() + 1),
                None => Metric::platform("thread counts are only reported on linux"),
            };
            let started_at = i64::try_from(process.start_time())
                .ok()
                .filter(|secs| *secs > 0)
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
                .map(|t| t.to_rfc3339());

            ProcessRecord {
                pid: pid.as_u32(),
                name: lossy(process.name()),
                cpu_percent: round2(process.cpu_usage() as f64),
                memory_percent: memory_share(process.memory(), total_memory),
                memory: ByteSize::new(process.memory()),
                status: process.status().to_string(),
                threads,
                started_at: Metric::from_option(started_at, "start time not reported"),
                run_time_secs: process.run_time(),
            }
        })
        .collect()
}

fn compare(a: &ProcessRecord, b: &ProcessRecord, sort: ProcessSort) -> Ordering {
    let primary = match sort {
        ProcessSort::Cpu => b.cpu_percent.total_cmp(&a.cpu_percent),
        ProcessSort::Memory => b.memory.bytes.cmp(&a.memory.bytes),
        ProcessSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    };
    primary.then_with(|| a.pid.cmp(&b.pid))
}

/// Sort and truncate; cpu/memory descending, name ascending, ties by pid
pub fn rank_processes(
    mut records: Vec<ProcessRecord>,
    sort: ProcessSort,
    limit: usize,
) -> Vec<ProcessRecord> {
    records.sort_by(|a, b| compare(a, b, sort));
    records.truncate(limit);
    records
}

/// Top CPU consumers above the battery-drain threshold
pub fn power_hungry(records: Vec<ProcessRecord>, limit: usize) -> Vec<ProcessRecord> {
    let hungry = records
        .into_iter()
        .filter(|p| p.cpu_percent > POWER_HUNGRY_CPU_PERCENT)
        .collect();
    rank_processes(hungry, ProcessSort::Cpu, limit)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(pid: u32, name: &str, cpu: f64, memory: u64) -> ProcessRecord {
        ProcessRecord {
            pid,
            name: name.into(),
            cpu_percent: cpu,
            memory_percent: Metric::available(0.0),
            memory: ByteSize::new(memory),
            status: "Run".into(),
            threads: Metric::available(1),
            started_at: Metric::platform("n/a"),
            run_time_secs: 0,
        }
    }

    #[test]
    fn test_rank_by_cpu_descending_with_pid_ties() {
        let records = vec![
            record(30, "c", 10.0, 0),
            record(10, "a", 50.0, 0),
            record(20, "b", 10.0, 0),
        ];
        let ranked = rank_processes(records, ProcessSort::Cpu, 10);
        let pids: Vec<u32> = ranked.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![10, 20, 30]);
    }

    #[test]
    fn test_rank_by_memory_truncates() {
        let records = (1..=50).map(|i| record(i, "p", 0.0, i as u64 * 1024)).collect();
        let ranked = rank_processes(records, ProcessSort::Memory, 5);
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].pid, 50);
        assert!(ranked.windows(2).all(|w| w[0].memory.bytes >= w[1].memory.bytes));
    }

    #[test]
    fn test_rank_by_name_case_insensitive() {
        let records = vec![
            record(3, "zsh", 0.0, 0),
            record(2, "Bash", 0.0, 0),
            record(1, "bash", 0.0, 0),
            record(4, "apt", 0.0, 0),
        ];
        let ranked = rank_processes(records, ProcessSort::Name, 10);
        let pids: Vec<u32> = ranked.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![4, 1, 2, 3]);
    }

    #[test]
    fn test_power_hungry_threshold() {
        let records = vec![
            record(1, "idle", 5.0, 0),
            record(2, "browser", 42.0, 0),
            record(3, "indexer", 7.5, 0),
        ];
        let hungry = power_hungry(records, 5);
        let pids: Vec<u32> = hungry.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![2, 3]);
    }

    #[test]
    fn test_memory_share_without_total_is_unavailable() {
        let share = memory_share(512 * 1024 * 1024, 0);
        assert!(!share.is_available());
        assert_eq!(share.reason(), Some("total memory not reported"));

        let mut entry = record(1, "p", 0.0, 0);
        entry.memory_percent = share;
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["memory_percent"]["status"], "unavailable_platform");
        assert!(json["memory_percent"].get("value").is_none());
    }

    #[test]
    fn test_memory_share_of_known_total() {
        assert_eq!(memory_share(256, 1024).get(), Some(25.0));
        assert_eq!(memory_share(0, 1024).get(), Some(0.0));
    }

    #[tokio::test]
    async fn test_sample_processes_sees_self() {
        let records = sample_processes().await;
        let me = std::process::id();
        assert!(records.iter().any(|p| p.pid == me));
    }
}
