//! macOS probe: pmset, log and system_profiler

use async_trait::async_trait;
use chrono::DateTime;
use serde_json::Value;

use super::command;
use super::smbios;
use super::{ApplicationInventory, Capability, Cause, Platform, PlatformProbe};
use crate::error::CollectError;
use crate::types::{
    Application, Baseboard, BatteryReading, BiosInfo, ByteSize, Category, ChargeState,
    FirmwareQuery, LogEntry, LogKind, LogSnapshot, MemoryModule, Metric, MotherboardSnapshot,
    SystemModel,
};

const APPLE: &str = "Apple Inc.";

/// Window passed to `log show`
const LOG_WINDOW: &str = "10m";

pub struct MacosProbe;

#[async_trait]
impl PlatformProbe for MacosProbe {
    fn platform(&self) -> Platform {
        Platform::Macos
    }

    fn capability(&self, category: Category) -> Capability {
        match category {
            // Mac firmware has no separate board revision or ROM date
            Category::Motherboard => Capability::degraded(
                &["baseboard.version", "bios.release_date"],
                Cause::Platform(Platform::Macos),
            ),
            other => Capability::portable(other, Platform::Macos),
        }
    }

    async fn battery(&self) -> Result<Option<BatteryReading>, CollectError> {
        let output = command::run("pmset", &["-g", "batt"]).await?;
        let Some(mut reading) = parse_pmset(&output) else {
            return Ok(None);
        };

        // Health and cycle count are best effort
        match command::run("system_profiler", &["SPPowerDataType", "-json"]).await {
            Ok(profile) => {
                let (cycles, health) = parse_power_profile(&profile);
                reading.cycle_count = cycles;
                reading.health_percent = health;
            }
            Err(e) => tracing::debug!("SPPowerDataType unavailable: {}", e),
        }
        Ok(Some(reading))
    }

    async fn logs(&self, kind: LogKind, limit: usize) -> Result<LogSnapshot, CollectError> {
        let mut args = vec!["show", "--style", "ndjson", "--last", LOG_WINDOW];
        if let Some(predicate) = log_predicate(kind) {
            args.push("--predicate");
            args.push(predicate);
        }
        let output = command::run("log", &args).await?;
        let mut entries = parse_ndjson_log(&output);
        let skip = entries.len().saturating_sub(limit);
        entries.drain(..skip);
        Ok(LogSnapshot {
            log_type: kind,
            source: "unified log".into(),
            count: entries.len(),
            entries,
        })
    }

    async fn applications(&self) -> Result<ApplicationInventory, CollectError> {
        let output = command::run("system_profiler", &["SPApplicationsDataType", "-json"]).await?;
        let applications = parse_applications_profile(&output)?;
        Ok(ApplicationInventory {
            source: "system_profiler".into(),
            applications,
        })
    }

    async fn firmware(&self, query: FirmwareQuery) -> Result<MotherboardSnapshot, CollectError> {
        let output = command::run(
            "system_profiler",
            &["SPHardwareDataType", "SPMemoryDataType", "-json"],
        )
        .await?;
        parse_hardware_profile(&output, query)
    }
}

fn log_predicate(kind: LogKind) -> Option<&'static str> {
    match kind {
        LogKind::System => Some(
            r#"processImagePath BEGINSWITH "/System" OR processImagePath BEGINSWITH "/usr""#,
        ),
        LogKind::Application => Some(r#"processImagePath BEGINSWITH "/Applications""#),
        LogKind::Security => Some(
            r#"subsystem BEGINSWITH "com.apple.security" OR process == "authd" OR process == "sudo""#,
        ),
        LogKind::All => None,
    }
}

/// Parse `pmset -g batt`; `None` when no internal battery is listed
pub(crate) fn parse_pmset(output: &str) -> Option<BatteryReading> {
    let power_plugged = output
        .lines()
        .next()
        .map(|line| line.contains("'AC Power'"));
    let line = output.lines().find(|line| line.contains("InternalBattery"))?;
    let details = line.split('\t').nth(1).unwrap_or(line);
    let mut parts = details.split(';').map(str::trim);

    let charge_percent = parts
        .next()
        .and_then(|p| p.trim_end_matches('%').parse::<f64>().ok());
    let state = parts.next().map(|s| match s {
        "finishing charge" => ChargeState::Charging,
        other => ChargeState::parse(other),
    });
    let time_remaining_secs = match state {
        Some(ChargeState::Full) => None,
        _ => parts
            .next()
            .and_then(|rest| rest.split_whitespace().next())
            .and_then(|clock| clock.split_once(':'))
            .and_then(|(h, m)| Some(h.parse::<u64>().ok()? * 3600 + m.parse::<u64>().ok()? * 60)),
    };

    Some(BatteryReading {
        charge_percent,
        state,
        power_plugged,
        time_remaining_secs,
        technology: Some("Lithium-ion".into()),
        ..BatteryReading::default()
    })
}

/// Cycle count and maximum capacity from `system_profiler SPPowerDataType -json`
pub(crate) fn parse_power_profile(output: &str) -> (Option<u32>, Option<f64>) {
    let Ok(root) = serde_json::from_str::<Value>(output) else {
        return (None, None);
    };
    let health = root["SPPowerDataType"]
        .as_array()
        .and_then(|items| {
            items
                .iter()
                .find_map(|item| item.get("sppower_battery_health_info"))
        });
    let Some(health) = health else {
        return (None, None);
    };
    let cycles = health["sppower_battery_cycle_count"]
        .as_u64()
        .and_then(|c| u32::try_from(c).ok());
    let capacity = health["sppower_battery_health_maximum_capacity"]
        .as_str()
        .and_then(|c| c.trim_end_matches('%').parse::<f64>().ok());
    (cycles, capacity)
}

/// Parse `log show --style ndjson`, skipping the non-JSON banner lines
pub(crate) fn parse_ndjson_log(output: &str) -> Vec<LogEntry> {
    output
        .lines()
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter_map(|record| {
            let message = record["eventMessage"].as_str()?.to_string();
            let time = record["timestamp"].as_str().map(|raw| {
                DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%z")
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|_| raw.to_string())
            });
            let source = record["subsystem"]
                .as_str()
                .filter(|s| !s.is_empty())
                .or_else(|| {
                    record["processImagePath"]
                        .as_str()
                        .and_then(|p| p.rsplit('/').next())
                })
                .map(String::from);
            Some(LogEntry {
                time,
                level: record["messageType"].as_str().map(|l| l.to_ascii_lowercase()),
                source,
                message,
            })
        })
        .collect()
}

fn profile_items<'a>(root: &'a Value, key: &str) -> &'a [Value] {
    root[key].as_array().map(Vec::as_slice).unwrap_or(&[])
}

fn invalid_json(err: serde_json::Error) -> CollectError {
    CollectError::Failed(format!("system_profiler returned invalid JSON: {}", err))
}

pub(crate) fn parse_applications_profile(output: &str) -> Result<Vec<Application>, CollectError> {
    let root: Value = serde_json::from_str(output).map_err(invalid_json)?;
    Ok(profile_items(&root, "SPApplicationsDataType")
        .iter()
        .filter_map(|item| {
            let mut app = Application::named(item["_name"].as_str()?);
            app.version = item["version"].as_str().map(String::from);
            app.category = item["obtained_from"].as_str().map(String::from);
            app.publisher = item["signed_by"]
                .as_array()
                .and_then(|signers| signers.first())
                .and_then(|s| s.as_str())
                .map(String::from);
            app.install_date = item["lastModified"].as_str().map(String::from);
            app.identifier = item["path"].as_str().map(String::from);
            Some(app)
        })
        .collect())
}

fn text(item: &Value, key: &str) -> Metric<String> {
    Metric::from_option(
        item[key].as_str().and_then(smbios::clean),
        "not reported by system_profiler",
    )
}

fn apple() -> Metric<String> {
    Metric::available(APPLE.to_string())
}

fn memory_modules(memory: Option<&Value>) -> Vec<MemoryModule> {
    let Some(memory) = memory else {
        return Vec::new();
    };

    // Apple silicon reports one unified pool instead of per-slot items
    if let Some(total) = memory["SPMemoryDataType"].as_str().and_then(smbios::parse_size) {
        return vec![MemoryModule {
            locator: "Unified memory".into(),
            size: ByteSize::new(total),
            speed_mhz: Metric::platform("not reported for unified memory"),
            manufacturer: memory["dimm_manufacturer"].as_str().and_then(smbios::clean),
            part_number: None,
            form_factor: None,
            memory_type: memory["dimm_type"].as_str().and_then(smbios::clean),
        }];
    }

    profile_items(memory, "_items")
        .iter()
        .filter_map(|dimm| {
            let size = dimm["dimm_size"].as_str().and_then(smbios::parse_size)?;
            Some(MemoryModule {
                locator: dimm["_name"].as_str().unwrap_or_default().to_string(),
                size: ByteSize::new(size),
                speed_mhz: Metric::from_option(
                    dimm["dimm_speed"].as_str().and_then(smbios::parse_speed),
                    "speed not reported",
                ),
                manufacturer: dimm["dimm_manufacturer"].as_str().and_then(smbios::clean),
                part_number: dimm["dimm_part_number"].as_str().and_then(smbios::clean),
                form_factor: None,
                memory_type: dimm["dimm_type"].as_str().and_then(smbios::clean),
            })
        })
        .collect()
}

/// Parse `system_profiler SPHardwareDataType SPMemoryDataType -json`
pub(crate) fn parse_hardware_profile(
    output: &str,
    query: FirmwareQuery,
) -> Result<MotherboardSnapshot, CollectError> {
    let root: Value = serde_json::from_str(output).map_err(invalid_json)?;
    let hardware = profile_items(&root, "SPHardwareDataType")
        .first()
        .ok_or_else(|| CollectError::Failed("system_profiler returned no hardware data".into()))?;

    let no_revision = "Mac logic boards do not report a revision";
    let baseboard = Baseboard {
        manufacturer: apple(),
        product: text(hardware, "machine_model"),
        version: Metric::platform(no_revision),
        serial_number: text(hardware, "serial_number"),
    };

    let bios = query.include_bios.then(|| BiosInfo {
        vendor: apple(),
        version: text(hardware, "boot_rom_version"),
        release_date: Metric::platform("boot ROM date is not exposed on macos"),
    });

    let system = query.include_system.then(|| SystemModel {
        manufacturer: apple(),
        product: text(hardware, "machine_name"),
        version: text(hardware, "machine_model"),
        family: text(hardware, "machine_name"),
        sku: text(hardware, "model_number"),
        serial_number: text(hardware, "serial_number"),
        uuid: text(hardware, "platform_UUID"),
    });

    let memory_modules = query
        .include_slots
        .then(|| Metric::available(memory_modules(profile_items(&root, "SPMemoryDataType").first())));

    Ok(MotherboardSnapshot {
        baseboard,
        bios,
        system,
        memory_modules,
    })
}
