//! Windows probe: CIM classes, event logs and the uninstall registry via PowerShell

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use super::command::{self, CommandError};
use super::smbios;
use super::{ApplicationInventory, Capability, Platform, PlatformProbe};
use crate::error::CollectError;
use crate::types::{
    Application, Baseboard, BatteryReading, BiosInfo, ByteSize, Category, ChargeState,
    FirmwareQuery, LogEntry, LogKind, LogSnapshot, MemoryModule, Metric, MotherboardSnapshot,
    SystemModel,
};

/// Reported by `EstimatedRunTime` while on AC power
const RUNTIME_ON_AC: u64 = 71_582_788;

const BATTERY_SCRIPT: &str = "Get-CimInstance -ClassName Win32_Battery | \
    Select-Object EstimatedChargeRemaining,BatteryStatus,EstimatedRunTime,Chemistry,DesignCapacity,FullChargeCapacity | \
    ConvertTo-Json -Compress";

const APPLICATIONS_SCRIPT: &str = "$paths = \
    'HKLM:\\Software\\Microsoft\\Windows\\CurrentVersion\\Uninstall\\*',\
    'HKLM:\\Software\\WOW6432Node\\Microsoft\\Windows\\CurrentVersion\\Uninstall\\*',\
    'HKCU:\\Software\\Microsoft\\Windows\\CurrentVersion\\Uninstall\\*'; \
    Get-ItemProperty -Path $paths -ErrorAction SilentlyContinue | Where-Object { $_.DisplayName } | \
    Select-Object DisplayName,DisplayVersion,Publisher,InstallDate,PSChildName | \
    ConvertTo-Json -Compress";

const FIRMWARE_SCRIPT: &str = "[pscustomobject]@{ \
    board = Get-CimInstance Win32_BaseBoard | Select-Object Manufacturer,Product,Version,SerialNumber; \
    bios = Get-CimInstance Win32_BIOS | Select-Object Manufacturer,SMBIOSBIOSVersion,ReleaseDate; \
    system = Get-CimInstance Win32_ComputerSystem | Select-Object Manufacturer,Model,SystemFamily,SystemSKUNumber; \
    product = Get-CimInstance Win32_ComputerSystemProduct | Select-Object Version,IdentifyingNumber,UUID; \
    memory = @(Get-CimInstance Win32_PhysicalMemory | Select-Object DeviceLocator,Capacity,Speed,Manufacturer,PartNumber,FormFactor,SMBIOSMemoryType) \
    } | ConvertTo-Json -Depth 4 -Compress";

pub struct WindowsProbe;

#[async_trait]
impl PlatformProbe for WindowsProbe {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    fn capability(&self, category: Category) -> Capability {
        Capability::portable(category, Platform::Windows)
    }

    async fn battery(&self) -> Result<Option<BatteryReading>, CollectError> {
        let output = command::powershell(BATTERY_SCRIPT).await?;
        parse_battery(&output)
    }

    async fn logs(&self, kind: LogKind, limit: usize) -> Result<LogSnapshot, CollectError> {
        let logs = match kind {
            LogKind::System => "System",
            LogKind::Application => "Application",
            LogKind::Security => "Security",
            LogKind::All => "System,Application",
        };
        let script = format!(
            "Get-WinEvent -LogName {} -MaxEvents {} | Sort-Object TimeCreated | \
             Select-Object TimeCreated,ProviderName,LevelDisplayName,Message | ConvertTo-Json -Compress",
            logs, limit
        );
        let entries = match command::powershell(&script).await {
            Ok(output) => parse_events(&output)?,
            Err(CommandError::Failed { stderr, .. }) if stderr.contains("No events were found") => {
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(LogSnapshot {
            log_type: kind,
            source: format!("Windows Event Log ({})", logs),
            count: entries.len(),
            entries,
        })
    }

    async fn applications(&self) -> Result<ApplicationInventory, CollectError> {
        let output = command::powershell(APPLICATIONS_SCRIPT).await?;
        Ok(ApplicationInventory {
            source: "registry".into(),
            applications: parse_uninstall_entries(&output)?,
        })
    }

    async fn firmware(&self, query: FirmwareQuery) -> Result<MotherboardSnapshot, CollectError> {
        let output = command::powershell(FIRMWARE_SCRIPT).await?;
        parse_firmware(&output, query)
    }
}

fn parse_json(output: &str) -> Result<Option<Value>, CollectError> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| CollectError::Failed(format!("PowerShell returned invalid JSON: {}", e)))
}

/// `ConvertTo-Json` emits a bare object for a single result
fn one_or_many(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Dates arrive as `/Date(ms)/` on Windows PowerShell and ISO 8601 on PowerShell 7
fn parse_ps_date(value: &Value) -> Option<String> {
    let raw = value.as_str()?;
    if let Some(millis) = raw
        .strip_prefix("/Date(")
        .and_then(|rest| rest.strip_suffix(")/"))
    {
        let millis: i64 = millis.split(['+', '-']).next()?.parse().ok()?;
        return DateTime::<Utc>::from_timestamp_millis(millis).map(|t| t.to_rfc3339());
    }
    Some(raw.to_string())
}

fn chemistry(code: u64) -> Option<&'static str> {
    let name = match code {
        3 => "Lead Acid",
        4 => "Nickel Cadmium",
        5 => "Nickel Metal Hydride",
        6 => "Lithium-ion",
        7 => "Zinc air",
        8 => "Lithium Polymer",
        _ => return None,
    };
    Some(name)
}

/// Parse `Win32_Battery`; `None` when the class has no instances
pub(crate) fn parse_battery(output: &str) -> Result<Option<BatteryReading>, CollectError> {
    let Some(value) = parse_json(output)? else {
        return Ok(None);
    };
    let Some(battery) = one_or_many(value).into_iter().next() else {
        return Ok(None);
    };

    let status = battery["BatteryStatus"].as_u64();
    let state = status.map(|code| match code {
        1 | 4 | 5 => ChargeState::Discharging,
        2 => ChargeState::NotCharging,
        3 => ChargeState::Full,
        6..=9 => ChargeState::Charging,
        _ => ChargeState::Unknown,
    });
    let power_plugged = status.and_then(|code| match code {
        1 | 4 | 5 => Some(false),
        2 | 3 | 6..=9 => Some(true),
        _ => None,
    });

    let health_percent = match (
        battery["FullChargeCapacity"].as_f64(),
        battery["DesignCapacity"].as_f64(),
    ) {
        (Some(full), Some(design)) if design > 0.0 => {
            Some(crate::types::round2((full / design * 100.0).min(100.0)))
        }
        _ => None,
    };

    Ok(Some(BatteryReading {
        charge_percent: battery["EstimatedChargeRemaining"].as_f64(),
        state,
        power_plugged,
        time_remaining_secs: battery["EstimatedRunTime"]
            .as_u64()
            .filter(|minutes| *minutes != RUNTIME_ON_AC)
            .map(|minutes| minutes * 60),
        health_percent,
        cycle_count: None,
        technology: battery["Chemistry"]
            .as_u64()
            .and_then(chemistry)
            .map(String::from),
    }))
}

pub(crate) fn parse_events(output: &str) -> Result<Vec<LogEntry>, CollectError> {
    let Some(value) = parse_json(output)? else {
        return Ok(Vec::new());
    };
    Ok(one_or_many(value)
        .into_iter()
        .map(|event| LogEntry {
            time: parse_ps_date(&event["TimeCreated"]),
            level: event["LevelDisplayName"].as_str().map(String::from),
            source: event["ProviderName"].as_str().map(String::from),
            message: event["Message"].as_str().unwrap_or_default().trim().to_string(),
        })
        .collect())
}

pub(crate) fn parse_uninstall_entries(output: &str) -> Result<Vec<Application>, CollectError> {
    let Some(value) = parse_json(output)? else {
        return Ok(Vec::new());
    };

    let mut apps: Vec<Application> = one_or_many(value)
        .into_iter()
        .filter_map(|entry| {
            let mut app = Application::named(entry["DisplayName"].as_str()?.trim());
            app.version = entry["DisplayVersion"].as_str().map(String::from);
            app.publisher = entry["Publisher"].as_str().map(String::from);
            app.install_date = entry["InstallDate"]
                .as_str()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y%m%d").ok())
                .map(|d| d.format("%Y-%m-%d").to_string());
            app.identifier = entry["PSChildName"].as_str().map(String::from);
            Some(app)
        })
        .collect();

    // 32- and 64-bit hives often list the same product
    apps.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.version.cmp(&b.version)));
    apps.dedup_by(|a, b| a.name == b.name && a.version == b.version);
    Ok(apps)
}

fn cim_text(object: &Value, key: &str) -> Metric<String> {
    Metric::from_option(
        object[key].as_str().and_then(smbios::clean),
        "not reported by firmware",
    )
}

pub(crate) fn parse_firmware(
    output: &str,
    query: FirmwareQuery,
) -> Result<MotherboardSnapshot, CollectError> {
    let root = parse_json(output)?
        .ok_or_else(|| CollectError::Failed("CIM query returned no data".into()))?;
    let board = &root["board"];
    let bios = &root["bios"];
    let system = &root["system"];
    let product = &root["product"];

    let baseboard = Baseboard {
        manufacturer: cim_text(board, "Manufacturer"),
        product: cim_text(board, "Product"),
        version: cim_text(board, "Version"),
        serial_number: cim_text(board, "SerialNumber"),
    };

    let bios = query.include_bios.then(|| BiosInfo {
        vendor: cim_text(bios, "Manufacturer"),
        version: cim_text(bios, "SMBIOSBIOSVersion"),
        release_date: Metric::from_option(
            parse_ps_date(&bios["ReleaseDate"]),
            "not reported by firmware",
        ),
    });

    let system = query.include_system.then(|| SystemModel {
        manufacturer: cim_text(system, "Manufacturer"),
        product: cim_text(system, "Model"),
        version: cim_text(product, "Version"),
        family: cim_text(system, "SystemFamily"),
        sku: cim_text(system, "SystemSKUNumber"),
        serial_number: cim_text(product, "IdentifyingNumber"),
        uuid: cim_text(product, "UUID"),
    });

    let memory_modules = query.include_slots.then(|| {
        let modules: Vec<MemoryModule> = one_or_many(root["memory"].clone())
            .iter()
            .filter_map(|dimm| {
                let capacity = dimm["Capacity"]
                    .as_u64()
                    .or_else(|| dimm["Capacity"].as_str().and_then(|c| c.parse().ok()))?;
                Some(MemoryModule {
                    locator: dimm["DeviceLocator"].as_str().unwrap_or_default().to_string(),
                    size: ByteSize::new(capacity),
                    speed_mhz: Metric::from_option(
                        dimm["Speed"].as_u64().filter(|s| *s > 0),
                        "speed not reported",
                    ),
                    manufacturer: dimm["Manufacturer"].as_str().and_then(smbios::clean),
                    part_number: dimm["PartNumber"].as_str().and_then(smbios::clean),
                    form_factor: dimm["FormFactor"]
                        .as_u64()
                        .and_then(smbios::form_factor)
                        .map(String::from),
                    memory_type: dimm["SMBIOSMemoryType"]
                        .as_u64()
                        .and_then(smbios::memory_type)
                        .map(String::from),
                })
            })
            .collect();
        Metric::available(modules)
    });

    Ok(MotherboardSnapshot {
        baseboard,
        bios,
        system,
        memory_modules,
    })
}
