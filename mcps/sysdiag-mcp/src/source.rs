//! The metric source seam between the dispatcher and the host

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sysinfo::System;
use tokio::sync::Mutex;

use crate::collect::{cpu, memory, network, power, process, sampling, software, storage, system};
use crate::error::CollectError;
use crate::platform::{self, Capability, Platform, PlatformProbe};
use crate::types::{
    ApplicationSnapshot, BatterySnapshot, Category, CpuSnapshot, FirmwareQuery, HardwareProfile,
    LogKind, LogSnapshot, MemorySnapshot, MotherboardSnapshot, NetworkSnapshot,
    PerformanceSample, ProcessSnapshot, ProcessSort, StorageSnapshot, SystemSnapshot,
};

/// Processes listed with `get_memory_metrics(include_processes)`
const MEMORY_TOP_PROCESSES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuQuery {
    pub per_core: bool,
    pub interval: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessQuery {
    pub sort_by: ProcessSort,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationQuery {
    /// `None` lists every category
    pub category: Option<String>,
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogQuery {
    pub log_type: LogKind,
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceQuery {
    pub duration: Duration,
    pub interval: Duration,
}

/// Where snapshots come from
///
/// [`HostSource`] reads the live machine; tests substitute fixtures.
#[async_trait]
pub trait SystemMetricsSource: Send + Sync {
    fn platform(&self) -> Platform;

    /// Cheap probe of what a category can deliver; never collects
    fn capability(&self, category: Category) -> Capability;

    async fn system(&self) -> Result<SystemSnapshot, CollectError>;

    async fn cpu(&self, query: CpuQuery) -> Result<CpuSnapshot, CollectError>;

    async fn memory(&self, include_processes: bool) -> Result<MemorySnapshot, CollectError>;

    async fn storage(&self, include_io_stats: bool) -> Result<StorageSnapshot, CollectError>;

    async fn network(&self, include_connections: bool) -> Result<NetworkSnapshot, CollectError>;

    async fn processes(&self, query: ProcessQuery) -> Result<ProcessSnapshot, CollectError>;

    async fn applications(&self, query: ApplicationQuery)
        -> Result<ApplicationSnapshot, CollectError>;

    async fn battery(&self) -> Result<BatterySnapshot, CollectError>;

    async fn logs(&self, query: LogQuery) -> Result<LogSnapshot, CollectError>;

    async fn motherboard(&self, query: FirmwareQuery) -> Result<MotherboardSnapshot, CollectError>;

    async fn performance(&self, query: PerformanceQuery) -> Result<PerformanceSample, CollectError>;

    async fn hardware(&self, interval: Duration) -> Result<HardwareProfile, CollectError>;
}

/// Live host metrics
pub struct HostSource {
    probe: Arc<dyn PlatformProbe>,
    max_connections: usize,
    // Battery and firmware tools shell out; one call at a time per adapter
    battery_lock: Mutex<()>,
    firmware_lock: Mutex<()>,
}

impl HostSource {
    pub fn new(probe: Arc<dyn PlatformProbe>, max_connections: usize) -> Self {
        Self {
            probe,
            max_connections,
            battery_lock: Mutex::new(()),
            firmware_lock: Mutex::new(()),
        }
    }

    /// Source for the running host's platform
    pub fn detect(max_connections: usize) -> Self {
        let platform = Platform::detect();
        tracing::info!("Detected platform: {}", platform);
        Self::new(platform::probe_for(platform), max_connections)
    }
}

#[async_trait]
impl SystemMetricsSource for HostSource {
    fn platform(&self) -> Platform {
        self.probe.platform()
    }

    fn capability(&self, category: Category) -> Capability {
        self.probe.capability(category)
    }

    async fn system(&self) -> Result<SystemSnapshot, CollectError> {
        Ok(system::system_snapshot(self.platform()))
    }

    async fn cpu(&self, query: CpuQuery) -> Result<CpuSnapshot, CollectError> {
        Ok(cpu::cpu_snapshot(query.per_core, query.interval, self.platform()).await)
    }

    async fn memory(&self, include_processes: bool) -> Result<MemorySnapshot, CollectError> {
        let top = if include_processes {
            let records = process::sample_processes().await;
            Some(process::rank_processes(
                records,
                ProcessSort::Memory,
                MEMORY_TOP_PROCESSES,
            ))
        } else {
            None
        };

        let mut sys = System::new();
        sys.refresh_memory();
        Ok(memory::memory_snapshot(&sys, top))
    }

    async fn storage(&self, include_io_stats: bool) -> Result<StorageSnapshot, CollectError> {
        Ok(storage::storage_snapshot(self.probe.as_ref(), include_io_stats))
    }

    async fn network(&self, include_connections: bool) -> Result<NetworkSnapshot, CollectError> {
        Ok(network::network_snapshot(
            self.probe.as_ref(),
            include_connections,
            self.max_connections,
        ))
    }

    async fn processes(&self, query: ProcessQuery) -> Result<ProcessSnapshot, CollectError> {
        let records = process::sample_processes().await;
        if records.is_empty() {
            return Err(CollectError::Failed("process table is empty".into()));
        }
        let total = records.len();
        Ok(ProcessSnapshot {
            total,
            sort_by: query.sort_by,
            limit: query.limit,
            processes: process::rank_processes(records, query.sort_by, query.limit),
        })
    }

    async fn applications(
        &self,
        query: ApplicationQuery,
    ) -> Result<ApplicationSnapshot, CollectError> {
        software::applications_snapshot(self.probe.as_ref(), query.category.as_deref(), query.limit)
            .await
    }

    async fn battery(&self) -> Result<BatterySnapshot, CollectError> {
        let _guard = self.battery_lock.lock().await;
        let processes = process::sample_processes().await;
        power::battery_snapshot(self.probe.as_ref(), processes).await
    }

    async fn logs(&self, query: LogQuery) -> Result<LogSnapshot, CollectError> {
        software::logs_snapshot(self.probe.as_ref(), query.log_type, query.limit).await
    }

    async fn motherboard(&self, query: FirmwareQuery) -> Result<MotherboardSnapshot, CollectError> {
        let _guard = self.firmware_lock.lock().await;
        software::motherboard_snapshot(self.probe.as_ref(), query).await
    }

    async fn performance(&self, query: PerformanceQuery) -> Result<PerformanceSample, CollectError> {
        Ok(sampling::sample_performance(self.probe.as_ref(), query.duration, query.interval).await)
    }

    async fn hardware(&self, interval: Duration) -> Result<HardwareProfile, CollectError> {
        let motherboard = {
            let _guard = self.firmware_lock.lock().await;
            software::baseboard_summary(self.probe.as_ref()).await
        };
        Ok(sampling::hardware_profile(interval, motherboard).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::UnsupportedProbe;

    fn source() -> HostSource {
        HostSource::new(Arc::new(UnsupportedProbe), 50)
    }

    #[tokio::test]
    async fn test_processes_respects_limit() {
        let snapshot = source()
            .processes(ProcessQuery {
                sort_by: ProcessSort::Memory,
                limit: 3,
            })
            .await
            .unwrap();
        assert!(snapshot.processes.len() <= 3);
        assert!(snapshot.total >= snapshot.processes.len());
        assert!(snapshot
            .processes
            .windows(2)
            .all(|w| w[0].memory.bytes >= w[1].memory.bytes));
    }

    #[tokio::test]
    async fn test_memory_with_top_processes() {
        let snapshot = source().memory(true).await.unwrap();
        let top = snapshot.top_processes.unwrap();
        assert!(top.len() <= MEMORY_TOP_PROCESSES);
    }

    #[tokio::test]
    async fn test_unsupported_logs_are_unavailable() {
        let result = source()
            .logs(LogQuery {
                log_type: LogKind::System,
                limit: 10,
            })
            .await;
        assert!(matches!(result, Err(CollectError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_battery_absent_on_unsupported() {
        let snapshot = source().battery().await.unwrap();
        assert!(!snapshot.battery_present);
    }
}
