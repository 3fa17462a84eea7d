//! Windowed sampling for the diagnostic tools

use std::time::{Duration, Instant};

use sysinfo::{System, MINIMUM_CPU_UPDATE_INTERVAL};

use super::{memory, network, process, storage};
use crate::platform::{CpuTimes, PlatformProbe};
use crate::types::{
    round2, Baseboard, ByteSize, DiskIo, HardwareProfile, Metric, PerformanceSample, PerformanceSnapshot,
    ProcessSort, VolumeFill,
};

const TOP_PROCESSES: usize = 5;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

pub fn average(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        None
    } else {
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }
}

pub fn peak(samples: &[f64]) -> Option<f64> {
    samples.iter().copied().max_by(|a, b| a.total_cmp(b))
}

/// Population standard deviation
pub fn std_dev(samples: &[f64]) -> Option<f64> {
    let mean = average(samples)?;
    let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / samples.len() as f64;
    Some(variance.sqrt())
}

/// Read and write MB/s between two counter snapshots, matched by device
pub fn disk_throughput(before: &[DiskIo], after: &[DiskIo], secs: f64) -> Option<(f64, f64)> {
    if secs <= 0.0 {
        return None;
    }
    let (mut read, mut written) = (0u64, 0u64);
    for end in after {
        if let Some(start) = before.iter().find(|b| b.device == end.device) {
            read += end.read.bytes.saturating_sub(start.read.bytes);
            written += end.written.bytes.saturating_sub(start.written.bytes);
        }
    }
    Some((
        round2(read as f64 / BYTES_PER_MB / secs),
        round2(written as f64 / BYTES_PER_MB / secs),
    ))
}

fn rate(before: u64, after: u64, secs: f64) -> f64 {
    round2(after.saturating_sub(before) as f64 / BYTES_PER_MB / secs.max(f64::EPSILON))
}

fn metric(value: Option<f64>, reason: &str) -> Metric<f64> {
    Metric::from_option(value.map(round2), reason)
}

/// Sample CPU, memory, disk and network activity over `duration`
pub async fn sample_performance(
    probe: &dyn PlatformProbe,
    duration: Duration,
    interval: Duration,
) -> PerformanceSample {
    let interval = interval.max(MINIMUM_CPU_UPDATE_INTERVAL);
    let ticks = (duration.as_millis() / interval.as_millis().max(1)).max(1);

    let mut sys = System::new();
    sys.refresh_cpu_all();
    sys.refresh_memory();
    process::refresh_processes(&mut sys);

    let io_before = probe.disk_io();
    let times_before = probe.cpu_times();
    let (rx_before, tx_before) = network::traffic_totals();
    let started = Instant::now();

    let mut cpu_samples = Vec::new();
    let mut memory_samples = Vec::new();
    for _ in 0..ticks {
        tokio::time::sleep(interval).await;
        sys.refresh_cpu_all();
        sys.refresh_memory();
        cpu_samples.push(sys.global_cpu_usage() as f64);
        if let Some(used) = memory::used_percent(sys.used_memory(), sys.total_memory()).get() {
            memory_samples.push(used);
        }
    }

    let elapsed = started.elapsed().as_secs_f64();
    process::refresh_processes(&mut sys);
    let io_after = probe.disk_io();
    let times_after = probe.cpu_times();
    let (rx_after, tx_after) = network::traffic_totals();

    let throughput = match (io_before.value(), io_after.value()) {
        (Some(before), Some(after)) => disk_throughput(before, after, elapsed),
        _ => None,
    };
    let io_reason = io_before
        .reason()
        .unwrap_or("disk I/O counters not available")
        .to_string();

    let io_wait = match (times_before, times_after) {
        (Some(before), Some(after)) => CpuTimes::io_wait_percent(before, after),
        _ => None,
    };

    let volumes = storage::volumes()
        .into_iter()
        .map(|v| VolumeFill {
            mount_point: v.mount_point,
            used_percent: v.used_percent,
        })
        .collect();

    let records = process::process_records(&sys);

    PerformanceSample {
        duration_secs: duration.as_secs(),
        metrics: PerformanceSnapshot {
            cpu_average_percent: metric(average(&cpu_samples), "no CPU samples collected"),
            cpu_peak_percent: metric(peak(&cpu_samples), "no CPU samples collected"),
            memory_used_percent: metric(average(&memory_samples), "total memory not reported"),
            memory_peak_percent: metric(peak(&memory_samples), "total memory not reported"),
            volumes,
            io_wait_percent: metric(
                io_wait,
                &format!("I/O wait is not reported on {}", probe.platform()),
            ),
            disk_read_mb_s: metric(throughput.map(|t| t.0), &io_reason),
            disk_write_mb_s: metric(throughput.map(|t| t.1), &io_reason),
        },
        network_receive_mb_s: Metric::available(rate(rx_before, rx_after, elapsed)),
        network_send_mb_s: Metric::available(rate(tx_before, tx_after, elapsed)),
        top_cpu_processes: process::rank_processes(records.clone(), ProcessSort::Cpu, TOP_PROCESSES),
        top_memory_processes: process::rank_processes(records, ProcessSort::Memory, TOP_PROCESSES),
    }
}

/// Installed capacity and a short utilisation sample
pub async fn hardware_profile(
    interval: Duration,
    motherboard: Metric<Baseboard>,
) -> HardwareProfile {
    let (mut sys, _) = super::cpu::sample_cpu(interval).await;
    sys.refresh_memory();

    let per_core: Vec<f64> = sys.cpus().iter().map(|c| c.cpu_usage() as f64).collect();
    let volumes = storage::volumes();

    HardwareProfile {
        physical_cores: Metric::from_option(
            sys.physical_core_count(),
            "physical core count not reported",
        ),
        logical_cores: per_core.len(),
        total_memory: ByteSize::new(sys.total_memory()),
        memory_used_percent: memory::used_percent(sys.used_memory(), sys.total_memory()),
        cpu_percent: Metric::available(round2(sys.global_cpu_usage() as f64)),
        per_core_stddev: metric(std_dev(&per_core), "no per-core usage reported"),
        has_ssd: storage::has_ssd(&volumes),
        motherboard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::UnsupportedProbe;

    fn io(device: &str, read: u64, written: u64) -> DiskIo {
        DiskIo {
            device: device.into(),
            reads_completed: 0,
            writes_completed: 0,
            read: ByteSize::new(read),
            written: ByteSize::new(written),
            read_time_ms: 0,
            write_time_ms: 0,
        }
    }

    #[test]
    fn test_average_and_peak() {
        assert_eq!(average(&[10.0, 20.0, 30.0]), Some(20.0));
        assert_eq!(peak(&[10.0, 35.5, 30.0]), Some(35.5));
        assert_eq!(average(&[]), None);
        assert_eq!(peak(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(std_dev(&[50.0, 50.0, 50.0, 50.0]), Some(0.0));
        assert_eq!(std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), Some(2.0));
        assert_eq!(std_dev(&[]), None);
    }

    #[test]
    fn test_disk_throughput() {
        let mb = 1024 * 1024;
        let before = vec![io("sda", 0, 0), io("nvme0n1", 10 * mb, 0)];
        let after = vec![io("sda", 20 * mb, 4 * mb), io("nvme0n1", 30 * mb, 0), io("sdb", 99 * mb, 0)];
        assert_eq!(disk_throughput(&before, &after, 2.0), Some((20.0, 2.0)));
        assert_eq!(disk_throughput(&before, &after, 0.0), None);
    }

    #[tokio::test]
    async fn test_sample_without_platform_counters() {
        let sample = sample_performance(
            &UnsupportedProbe,
            Duration::from_millis(0),
            Duration::from_millis(0),
        )
        .await;
        assert!(sample.metrics.cpu_average_percent.is_available());
        assert!(!sample.metrics.io_wait_percent.is_available());
        assert!(!sample.metrics.disk_read_mb_s.is_available());
        assert!(sample.top_cpu_processes.len() <= TOP_PROCESSES);
    }
}
