//! Dispatcher integration tests
//!
//! Most tests drive the dispatcher with an in-memory fixture source so the
//! results do not depend on the machine running them. The last section runs
//! a few portable tools against the live host.
//!
//! ```bash
//! cargo test -p sysdiag-mcp --test dispatch
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use sysdiag_mcp::collect::process::rank_processes;
use sysdiag_mcp::platform::{Capability, Cause, Platform};
use sysdiag_mcp::source::{
    ApplicationQuery, CpuQuery, LogQuery, PerformanceQuery, ProcessQuery,
};
use sysdiag_mcp::types::{
    ApplicationSnapshot, Baseboard, BatterySnapshot, ByteSize, Category, CpuSnapshot, FirmwareQuery,
    HardwareProfile, LogSnapshot, MemorySnapshot, Metric, MotherboardSnapshot, NetworkSnapshot,
    PerformanceSample, PerformanceSnapshot, ProcessRecord, ProcessSnapshot, StorageSnapshot,
    SystemSnapshot, VolumeFill,
};
use sysdiag_mcp::{
    CollectError, Config, Dispatcher, ErrorKind, HostSource, SystemMetricsSource, ToolRegistry,
    ToolRequest, ToolResponse,
};

// ============================================================================
// Fixture Source
// ============================================================================

#[derive(Default)]
struct Fixture {
    panic_on_processes: bool,
    slow_logs: bool,
    applications_error: Option<CollectError>,
}

fn record(pid: u32, name: &str, cpu: f64, memory_mb: u64) -> ProcessRecord {
    ProcessRecord {
        pid,
        name: name.to_string(),
        cpu_percent: cpu,
        memory_percent: Metric::available(memory_mb as f64 / 160.0),
        memory: ByteSize::new(memory_mb * 1024 * 1024),
        status: "Running".to_string(),
        threads: Metric::available(4),
        started_at: Metric::platform("fixture"),
        run_time_secs: 60,
    }
}

fn process_table() -> Vec<ProcessRecord> {
    vec![
        record(10, "postgres", 12.0, 900),
        record(11, "Xorg", 3.5, 300),
        record(12, "cargo", 88.0, 1200),
        record(13, "bash", 0.0, 8),
        record(14, "firefox", 25.0, 2400),
    ]
}

fn fixture_unavailable<T>() -> Result<T, CollectError> {
    Err(CollectError::Unavailable("not provided by the fixture".into()))
}

#[async_trait]
impl SystemMetricsSource for Fixture {
    fn platform(&self) -> Platform {
        Platform::Linux
    }

    fn capability(&self, category: Category) -> Capability {
        match category {
            Category::Battery => Capability::degraded(
                &["charge_percent", "state"],
                Cause::NoDevice("battery".into()),
            ),
            Category::Motherboard => Capability::Unsupported {
                cause: Cause::Privileges,
            },
            _ => Capability::Full,
        }
    }

    async fn system(&self) -> Result<SystemSnapshot, CollectError> {
        fixture_unavailable()
    }

    async fn cpu(&self, _query: CpuQuery) -> Result<CpuSnapshot, CollectError> {
        Err(CollectError::Failed("sensor bus error".into()))
    }

    async fn memory(&self, _include_processes: bool) -> Result<MemorySnapshot, CollectError> {
        fixture_unavailable()
    }

    async fn storage(&self, _include_io_stats: bool) -> Result<StorageSnapshot, CollectError> {
        fixture_unavailable()
    }

    async fn network(&self, _include_connections: bool) -> Result<NetworkSnapshot, CollectError> {
        fixture_unavailable()
    }

    async fn processes(&self, query: ProcessQuery) -> Result<ProcessSnapshot, CollectError> {
        if self.panic_on_processes {
            panic!("process table corrupted");
        }
        let records = process_table();
        Ok(ProcessSnapshot {
            total: records.len(),
            sort_by: query.sort_by,
            limit: query.limit,
            processes: rank_processes(records, query.sort_by, query.limit),
        })
    }

    async fn applications(
        &self,
        _query: ApplicationQuery,
    ) -> Result<ApplicationSnapshot, CollectError> {
        match &self.applications_error {
            Some(e) => Err(e.clone()),
            None => fixture_unavailable(),
        }
    }

    async fn battery(&self) -> Result<BatterySnapshot, CollectError> {
        Ok(BatterySnapshot::absent("no battery detected", Vec::new()))
    }

    async fn logs(&self, query: LogQuery) -> Result<LogSnapshot, CollectError> {
        if self.slow_logs {
            tokio::time::sleep(Duration::from_secs(10)).await;
        }
        Ok(LogSnapshot {
            log_type: query.log_type,
            source: "fixture".into(),
            count: 0,
            entries: Vec::new(),
        })
    }

    async fn motherboard(&self, _query: FirmwareQuery) -> Result<MotherboardSnapshot, CollectError> {
        panic!("motherboard must not be collected when unsupported");
    }

    async fn performance(&self, query: PerformanceQuery) -> Result<PerformanceSample, CollectError> {
        Ok(PerformanceSample {
            duration_secs: query.duration.as_secs(),
            metrics: PerformanceSnapshot {
                cpu_average_percent: Metric::available(95.0),
                cpu_peak_percent: Metric::available(99.0),
                memory_used_percent: Metric::available(50.0),
                memory_peak_percent: Metric::available(52.0),
                volumes: vec![VolumeFill {
                    mount_point: "/".into(),
                    used_percent: Metric::available(40.0),
                }],
                io_wait_percent: Metric::available(2.0),
                disk_read_mb_s: Metric::available(1.5),
                disk_write_mb_s: Metric::available(0.5),
            },
            network_receive_mb_s: Metric::available(0.1),
            network_send_mb_s: Metric::available(0.1),
            top_cpu_processes: Vec::new(),
            top_memory_processes: Vec::new(),
        })
    }

    async fn hardware(&self, _interval: Duration) -> Result<HardwareProfile, CollectError> {
        Ok(HardwareProfile {
            physical_cores: Metric::available(4),
            logical_cores: 8,
            total_memory: ByteSize::new(8 << 30),
            memory_used_percent: Metric::available(40.0),
            cpu_percent: Metric::available(20.0),
            per_core_stddev: Metric::available(5.0),
            has_ssd: Metric::available(true),
            motherboard: Metric::available(Baseboard {
                manufacturer: Metric::available("ASUSTeK COMPUTER INC.".to_string()),
                product: Metric::available("PRIME B550M-A".to_string()),
                version: Metric::platform("fixture"),
                serial_number: Metric::permission("fixture"),
            }),
        })
    }
}

fn dispatcher(fixture: Fixture) -> Dispatcher {
    Dispatcher::new(
        Arc::new(ToolRegistry::new()),
        Arc::new(fixture),
        Arc::new(Config::default()),
    )
}

fn request(tool: &str, arguments: Value) -> ToolRequest {
    let map: Map<String, Value> = match arguments {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    ToolRequest::new(tool).with_arguments(map)
}

fn error_kind(response: &ToolResponse) -> Option<ErrorKind> {
    response.error().map(|e| e.kind())
}

// ============================================================================
// Caller Errors
// ============================================================================

#[tokio::test]
async fn unknown_tool_is_reported() {
    let response = dispatcher(Fixture::default())
        .dispatch(request("get_quantum_flux", json!({})))
        .await;

    assert_eq!(error_kind(&response), Some(ErrorKind::UnknownTool));
    let json = response.to_json();
    assert_eq!(json["error_kind"], "UnknownTool");
    assert_eq!(json["category"], Value::Null);
    assert!(json["message"].as_str().unwrap().contains("get_quantum_flux"));
}

#[tokio::test]
async fn invalid_limits_are_rejected() {
    let d = dispatcher(Fixture::default());
    for limit in [json!(0), json!(-3), json!("ten"), json!(1.5), json!(100000)] {
        let response = d
            .dispatch(request("get_processes", json!({ "limit": limit })))
            .await;
        assert_eq!(
            error_kind(&response),
            Some(ErrorKind::InvalidArgument),
            "limit {} should be rejected",
            limit
        );
    }
}

#[tokio::test]
async fn unknown_argument_keys_are_rejected() {
    let response = dispatcher(Fixture::default())
        .dispatch(request("get_processes", json!({ "sort": "cpu" })))
        .await;
    assert_eq!(error_kind(&response), Some(ErrorKind::InvalidArgument));
}

#[tokio::test]
async fn invalid_sort_key_is_rejected() {
    let response = dispatcher(Fixture::default())
        .dispatch(request("get_processes", json!({ "sort_by": "uptime" })))
        .await;
    assert_eq!(error_kind(&response), Some(ErrorKind::InvalidArgument));
}

// ============================================================================
// Successful Dispatch
// ============================================================================

#[tokio::test]
async fn processes_respect_limit_and_sort() {
    let d = dispatcher(Fixture::default());

    let response = d
        .dispatch(request("get_processes", json!({ "sort_by": "memory", "limit": 3 })))
        .await;
    let envelope = response.success().expect("success");
    let names: Vec<&str> = envelope.data["processes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["firefox", "cargo", "postgres"]);
    assert_eq!(envelope.data["total"], 5);

    let response = d
        .dispatch(request("get_processes", json!({ "sort_by": "name" })))
        .await;
    let names: Vec<String> = response.success().unwrap().data["processes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["bash", "cargo", "firefox", "postgres", "Xorg"]);
}

#[tokio::test]
async fn success_envelope_shape() {
    let response = dispatcher(Fixture::default())
        .dispatch(request("get_processes", json!({})))
        .await;
    let json = response.to_json();

    assert_eq!(json["tool"], "get_processes");
    assert_eq!(json["category"], "processes");
    assert_eq!(json["platform"], "linux");
    assert!(json["collected_at"].as_str().unwrap().contains('T'));
    assert_eq!(json["availability"]["runnable"], true);
    assert_eq!(json["availability"]["degraded_fields"], json!([]));
    assert_eq!(json["data"]["sort_by"], "cpu");
    assert_eq!(json["data"]["processes"][0]["name"], "cargo");
}

#[tokio::test]
async fn missing_battery_is_a_degraded_success() {
    let response = dispatcher(Fixture::default())
        .dispatch(ToolRequest::new("get_battery_status"))
        .await;
    let envelope = response.success().expect("battery absence is not an error");

    assert_eq!(envelope.data["battery_present"], false);
    assert_eq!(envelope.data["charge_percent"]["status"], "unavailable_platform");
    assert_eq!(envelope.availability.degraded_fields, vec!["charge_percent", "state"]);
    assert_eq!(
        envelope.availability.reason.as_deref(),
        Some("no battery detected")
    );
}

#[tokio::test]
async fn diagnose_performance_reports_cpu_only() {
    let response = dispatcher(Fixture::default())
        .dispatch(request("diagnose_performance", json!({ "duration": 1 })))
        .await;
    let data = &response.success().expect("success").data;

    let findings = data["findings"].as_array().unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0]["category"], "cpu");
    assert_eq!(findings[0]["severity"], "critical");
    assert_eq!(data["duration_secs"], 1);
}

#[tokio::test]
async fn hardware_recommendations_for_gaming() {
    let response = dispatcher(Fixture::default())
        .dispatch(request(
            "get_hardware_recommendations",
            json!({ "use_case": "gaming" }),
        ))
        .await;
    let data = &response.success().expect("success").data;

    assert_eq!(data["use_case"], "gaming");
    let categories: Vec<&str> = data["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["category"].as_str().unwrap())
        .collect();
    assert_eq!(categories, vec!["cpu", "memory", "gpu"]);
    assert!(!data["compatibility_notes"].as_array().unwrap().is_empty());

    let board = &data["current_specs"]["motherboard"];
    assert_eq!(board["status"], "available");
    assert_eq!(board["value"]["product"]["value"], "PRIME B550M-A");
    assert_eq!(board["value"]["serial_number"]["status"], "unavailable_permission");
}

// ============================================================================
// Collection Failures
// ============================================================================

#[tokio::test]
async fn unsupported_category_is_not_collected() {
    // The fixture panics if motherboard collection is attempted
    let response = dispatcher(Fixture::default())
        .dispatch(ToolRequest::new("get_motherboard_details"))
        .await;
    let err = response.error().expect("unsupported");
    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert_eq!(err.category(), Some(Category::Motherboard));
    assert!(err
        .to_string()
        .contains("requires administrator privileges on this platform"));
}

#[tokio::test]
async fn adapter_failure_becomes_collection_failed() {
    let response = dispatcher(Fixture::default())
        .dispatch(ToolRequest::new("get_cpu_metrics"))
        .await;
    let json = response.to_json();
    assert_eq!(json["error_kind"], "CollectionFailed");
    assert_eq!(json["category"], "cpu");
    assert!(json["message"].as_str().unwrap().contains("sensor bus error"));
}

#[tokio::test]
async fn permission_errors_keep_their_kind() {
    let fixture = Fixture {
        applications_error: Some(CollectError::PermissionDenied("package database".into())),
        ..Fixture::default()
    };
    let response = dispatcher(fixture)
        .dispatch(ToolRequest::new("get_installed_applications"))
        .await;
    assert_eq!(error_kind(&response), Some(ErrorKind::PermissionDenied));
    assert_eq!(response.error().unwrap().category(), Some(Category::Applications));
}

#[tokio::test]
async fn panicking_adapter_does_not_poison_the_dispatcher() {
    let d = dispatcher(Fixture {
        panic_on_processes: true,
        ..Fixture::default()
    });

    let response = d.dispatch(ToolRequest::new("get_processes")).await;
    assert_eq!(error_kind(&response), Some(ErrorKind::CollectionFailed));
    assert_eq!(response.error().unwrap().category(), Some(Category::Processes));

    let response = d.dispatch(ToolRequest::new("get_battery_status")).await;
    assert!(!response.is_error());
}

#[tokio::test]
async fn slow_collection_times_out() {
    let d = dispatcher(Fixture {
        slow_logs: true,
        ..Fixture::default()
    });

    let started = std::time::Instant::now();
    let response = d
        .dispatch(request("get_system_logs", json!({ "timeout_secs": 1 })))
        .await;
    assert!(started.elapsed() < Duration::from_secs(5));

    let json = response.to_json();
    assert_eq!(json["error_kind"], "Timeout");
    assert_eq!(json["category"], "logs");
}

#[tokio::test]
async fn every_tool_returns_a_well_formed_envelope() {
    let d = dispatcher(Fixture::default());
    let names: Vec<&str> = d.registry().names().collect();
    assert_eq!(names.len(), 12);

    for name in names {
        let json = d.dispatch(ToolRequest::new(name)).await.to_json();
        let is_success = json.get("data").is_some() && json["tool"] == name;
        let is_error = json.get("error_kind").is_some() && json.get("message").is_some();
        assert!(is_success ^ is_error, "{} returned {}", name, json);
    }
}

#[tokio::test]
async fn concurrent_requests_are_independent() {
    let d = dispatcher(Fixture::default());
    let (a, b, c) = tokio::join!(
        d.dispatch(request("get_processes", json!({ "limit": 1 }))),
        d.dispatch(ToolRequest::new("get_battery_status")),
        d.dispatch(request("get_processes", json!({ "limit": 0 }))),
    );
    assert!(!a.is_error());
    assert!(!b.is_error());
    assert_eq!(error_kind(&c), Some(ErrorKind::InvalidArgument));
}

// ============================================================================
// Live Host
// ============================================================================

fn host_dispatcher() -> Dispatcher {
    Dispatcher::new(
        Arc::new(ToolRegistry::new()),
        Arc::new(HostSource::detect(10)),
        Arc::new(Config::default()),
    )
}

#[tokio::test]
async fn host_system_info() {
    let response = host_dispatcher()
        .dispatch(ToolRequest::new("get_system_info"))
        .await;
    let data = &response.success().expect("system info is portable").data;
    assert!(data["logical_cores"].as_u64().unwrap() >= 1);
    assert!(data["uptime"]["uptime_human"].is_string());
}

#[tokio::test]
async fn host_processes_sorted_by_memory() {
    let response = host_dispatcher()
        .dispatch(request("get_processes", json!({ "sort_by": "memory", "limit": 5 })))
        .await;
    let data = &response.success().expect("process listing is portable").data;
    let memory: Vec<u64> = data["processes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["memory"]["bytes"].as_u64().unwrap())
        .collect();
    assert!(memory.len() <= 5);
    assert!(memory.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn host_storage_classification_is_stable() {
    let d = host_dispatcher();
    let classify = |json: Value| -> Vec<(String, String)> {
        json["data"]["volumes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| {
                (
                    v["mount_point"].as_str().unwrap_or_default().to_string(),
                    v["media"].to_string(),
                )
            })
            .collect()
    };
    let first = classify(d.dispatch(ToolRequest::new("get_storage_metrics")).await.to_json());
    let second = classify(d.dispatch(ToolRequest::new("get_storage_metrics")).await.to_json());
    assert_eq!(first, second);
}
