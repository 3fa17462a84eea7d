//! Linux probe: sysfs, procfs and the distribution's CLI tools
//!
//! All filesystem paths are resolved against a configurable root so the
//! parsers can be exercised against fixture trees.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::command::{self, CommandError};
use super::smbios;
use super::{
    ApplicationInventory, Capability, Cause, CpuTimes, Platform, PlatformProbe, BATTERY_FIELDS,
};
use crate::error::CollectError;
use crate::types::{
    Application, Baseboard, BatteryReading, BiosInfo, ByteSize, Category, ChargeState, Connection,
    DiskIo, FirmwareQuery, LinkState, LogEntry, LogKind, LogSnapshot, MemoryModule, Metric,
    MotherboardSnapshot, SystemModel,
};

const ROOT_ONLY: &str = "requires administrator privileges on this platform";

const SYSLOG_FILES: [&str; 2] = ["var/log/syslog", "var/log/messages"];
const SECURITY_LOG_FILES: [&str; 2] = ["var/log/auth.log", "var/log/secure"];

fn syslog_candidates(kind: LogKind) -> &'static [&'static str] {
    match kind {
        LogKind::Security => &SECURITY_LOG_FILES,
        _ => &SYSLOG_FILES,
    }
}

pub struct LinuxProbe {
    root: PathBuf,
}

impl Default for LinuxProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl LinuxProbe {
    pub fn new() -> Self {
        Self::with_root("/")
    }

    /// Probe reading sysfs and procfs below `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    fn is_root_user(&self) -> bool {
        fs::read_to_string(self.path("proc/self/status"))
            .ok()
            .and_then(|status| effective_uid(&status))
            .map(|uid| uid == 0)
            .unwrap_or(false)
    }

    async fn syslog_fallback(&self, kind: LogKind, limit: usize) -> Result<LogSnapshot, CollectError> {
        for candidate in syslog_candidates(kind) {
            let path = self.path(candidate);
            if !path.exists() {
                continue;
            }
            tracing::debug!("journalctl missing, falling back to {}", path.display());
            let lines = tail_lines(&path, limit).map_err(|e| match e.kind() {
                io::ErrorKind::PermissionDenied => CollectError::PermissionDenied(format!(
                    "reading {} requires root or membership in the adm group",
                    path.display()
                )),
                _ => CollectError::Failed(format!("failed to read {}: {}", path.display(), e)),
            })?;
            let entries: Vec<LogEntry> = lines.iter().map(|line| parse_syslog_line(line)).collect();
            return Ok(LogSnapshot {
                log_type: kind,
                source: format!("/{}", candidate),
                count: entries.len(),
                entries,
            });
        }

        Err(CollectError::Unavailable(
            "neither journalctl nor a syslog file is available".into(),
        ))
    }

    fn dmi_field(&self, name: &str) -> Metric<String> {
        read_dmi_field(&self.path("sys/class/dmi/id"), name)
    }
}

#[async_trait]
impl PlatformProbe for LinuxProbe {
    fn platform(&self) -> Platform {
        Platform::Linux
    }

    fn capability(&self, category: Category) -> Capability {
        match category {
            Category::Battery => {
                if find_battery_dir(&self.path("sys/class/power_supply")).is_none() {
                    Capability::degraded(&BATTERY_FIELDS, Cause::NoDevice("battery".into()))
                } else {
                    Capability::Full
                }
            }
            Category::Logs => {
                let has_syslog = SYSLOG_FILES
                    .iter()
                    .chain(SECURITY_LOG_FILES.iter())
                    .any(|p| self.path(p).exists());
                if command::on_path("journalctl") || has_syslog {
                    Capability::Full
                } else {
                    Capability::Unsupported {
                        cause: Cause::MissingTool("journalctl".into()),
                    }
                }
            }
            Category::Applications => {
                if ["dpkg-query", "rpm", "pacman"].iter().any(|p| command::on_path(p)) {
                    Capability::Full
                } else {
                    Capability::Unsupported {
                        cause: Cause::MissingTool("a package manager (dpkg, rpm or pacman)".into()),
                    }
                }
            }
            Category::Motherboard => {
                if !self.path("sys/class/dmi/id").is_dir() {
                    Capability::Unsupported {
                        cause: Cause::NoDevice("DMI firmware tables".into()),
                    }
                } else if !self.is_root_user() {
                    Capability::degraded(
                        &[
                            "baseboard.serial_number",
                            "system.serial_number",
                            "system.uuid",
                            "memory_modules",
                        ],
                        Cause::Privileges,
                    )
                } else {
                    Capability::Full
                }
            }
            _ => Capability::Full,
        }
    }

    fn link_state(&self, interface: &str) -> LinkState {
        read_link_state(&self.path("sys/class/net").join(interface))
    }

    fn connections(&self) -> Metric<Vec<Connection>> {
        let mut connections = Vec::new();
        let mut readable = false;
        for protocol in ["tcp", "tcp6", "udp", "udp6"] {
            let path = self.path("proc/net").join(protocol);
            match fs::read_to_string(&path) {
                Ok(table) => {
                    readable = true;
                    connections.extend(parse_proc_net(&table, protocol));
                }
                Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                    return Metric::permission(ROOT_ONLY);
                }
                Err(e) => tracing::debug!("Skipping {}: {}", path.display(), e),
            }
        }
        if readable {
            Metric::available(connections)
        } else {
            Metric::platform("/proc/net is not mounted")
        }
    }

    fn disk_io(&self) -> Metric<Vec<DiskIo>> {
        match fs::read_to_string(self.path("proc/diskstats")) {
            Ok(stats) => {
                let block = self.path("sys/class/block");
                let devices = parse_diskstats(&stats)
                    .into_iter()
                    .filter(|io| !block.join(&io.device).join("partition").exists())
                    .collect();
                Metric::available(devices)
            }
            Err(e) => Metric::platform(format!("/proc/diskstats unreadable: {}", e)),
        }
    }

    fn cpu_times(&self) -> Option<CpuTimes> {
        fs::read_to_string(self.path("proc/stat"))
            .ok()
            .and_then(|stat| parse_proc_stat(&stat))
    }

    async fn battery(&self) -> Result<Option<BatteryReading>, CollectError> {
        Ok(read_power_supply(&self.path("sys/class/power_supply")))
    }

    async fn logs(&self, kind: LogKind, limit: usize) -> Result<LogSnapshot, CollectError> {
        let args = journal_args(kind, limit);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match command::run("journalctl", &args).await {
            Ok(output) => {
                let entries = parse_journal(&output);
                Ok(LogSnapshot {
                    log_type: kind,
                    source: "journald".into(),
                    count: entries.len(),
                    entries,
                })
            }
            Err(CommandError::NotFound(_)) => self.syslog_fallback(kind, limit).await,
            Err(e) => Err(e.into()),
        }
    }

    async fn applications(&self) -> Result<ApplicationInventory, CollectError> {
        let dpkg = command::run(
            "dpkg-query",
            &[
                "-W",
                "-f",
                "${db:Status-Abbrev}\\t${Package}\\t${Version}\\t${Section}\\t${Maintainer}\\n",
            ],
        )
        .await;
        match dpkg {
            Ok(output) => return Ok(inventory("dpkg", parse_dpkg(&output))),
            Err(CommandError::NotFound(_)) => tracing::debug!("dpkg-query not found, trying rpm"),
            Err(e) => return Err(e.into()),
        }

        let rpm = command::run(
            "rpm",
            &[
                "-qa",
                "--qf",
                "%{NAME}\\t%{VERSION}-%{RELEASE}\\t%{GROUP}\\t%{VENDOR}\\t%{INSTALLTIME}\\n",
            ],
        )
        .await;
        match rpm {
            Ok(output) => return Ok(inventory("rpm", parse_rpm(&output))),
            Err(CommandError::NotFound(_)) => tracing::debug!("rpm not found, trying pacman"),
            Err(e) => return Err(e.into()),
        }

        match command::run("pacman", &["-Q"]).await {
            Ok(output) => Ok(inventory("pacman", parse_pacman(&output))),
            Err(CommandError::NotFound(_)) => Err(CollectError::Unavailable(
                "no supported package manager (dpkg, rpm or pacman) found".into(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn firmware(&self, query: FirmwareQuery) -> Result<MotherboardSnapshot, CollectError> {
        if !self.path("sys/class/dmi/id").is_dir() {
            return Err(CollectError::Unavailable(
                "DMI tables are not exposed by this kernel".into(),
            ));
        }

        let baseboard = Baseboard {
            manufacturer: self.dmi_field("board_vendor"),
            product: self.dmi_field("board_name"),
            version: self.dmi_field("board_version"),
            serial_number: self.dmi_field("board_serial"),
        };

        let bios = query.include_bios.then(|| BiosInfo {
            vendor: self.dmi_field("bios_vendor"),
            version: self.dmi_field("bios_version"),
            release_date: self.dmi_field("bios_date"),
        });

        let system = query.include_system.then(|| SystemModel {
            manufacturer: self.dmi_field("sys_vendor"),
            product: self.dmi_field("product_name"),
            version: self.dmi_field("product_version"),
            family: self.dmi_field("product_family"),
            sku: self.dmi_field("product_sku"),
            serial_number: self.dmi_field("product_serial"),
            uuid: self.dmi_field("product_uuid"),
        });

        let memory_modules = if query.include_slots {
            Some(match command::run("dmidecode", &["-t", "17"]).await {
                Ok(output) => Metric::available(parse_dmidecode_memory(&output)),
                Err(CommandError::NotFound(_)) => Metric::platform("dmidecode is not installed"),
                Err(CommandError::PermissionDenied { .. }) => Metric::permission(ROOT_ONLY),
                Err(e) => Metric::platform(e.to_string()),
            })
        } else {
            None
        };

        Ok(MotherboardSnapshot {
            baseboard,
            bios,
            system,
            memory_modules,
        })
    }
}

fn inventory(source: &str, applications: Vec<Application>) -> ApplicationInventory {
    ApplicationInventory {
        source: source.to_string(),
        applications,
    }
}

fn effective_uid(status: &str) -> Option<u32> {
    status
        .lines()
        .find(|line| line.starts_with("Uid:"))
        .and_then(|line| line.split_whitespace().nth(2))
        .and_then(|uid| uid.parse().ok())
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn read_number(path: &Path) -> Option<f64> {
    read_trimmed(path).and_then(|s| s.parse().ok())
}

// --- battery ---------------------------------------------------------------

fn find_battery_dir(power_supply: &Path) -> Option<PathBuf> {
    let mut entries: Vec<PathBuf> = fs::read_dir(power_supply)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    // Peripheral batteries (mice, headsets) report scope "Device"
    entries.into_iter().find(|dir| {
        read_trimmed(&dir.join("type")).as_deref() == Some("Battery")
            && read_trimmed(&dir.join("scope")).as_deref() != Some("Device")
    })
}

fn mains_online(power_supply: &Path) -> Option<bool> {
    let mut seen = false;
    for entry in fs::read_dir(power_supply).ok()?.flatten() {
        let dir = entry.path();
        let kind = read_trimmed(&dir.join("type"));
        if matches!(kind.as_deref(), Some("Mains") | Some("USB")) {
            seen = true;
            if read_trimmed(&dir.join("online")).as_deref() == Some("1") {
                return Some(true);
            }
        }
    }
    seen.then_some(false)
}

/// Read the primary system battery below a `power_supply` directory
pub(crate) fn read_power_supply(power_supply: &Path) -> Option<BatteryReading> {
    let dir = find_battery_dir(power_supply)?;

    let state = read_trimmed(&dir.join("status")).map(|s| ChargeState::parse(&s));

    // energy_* is in µWh with power_now in µW; charge_* is in µAh with current_now in µA
    let (now, full, design, rate) = if dir.join("energy_now").exists() {
        (
            read_number(&dir.join("energy_now")),
            read_number(&dir.join("energy_full")),
            read_number(&dir.join("energy_full_design")),
            read_number(&dir.join("power_now")),
        )
    } else {
        (
            read_number(&dir.join("charge_now")),
            read_number(&dir.join("charge_full")),
            read_number(&dir.join("charge_full_design")),
            read_number(&dir.join("current_now")),
        )
    };

    let charge_percent = read_number(&dir.join("capacity")).or_else(|| match (now, full) {
        (Some(now), Some(full)) if full > 0.0 => Some(now / full * 100.0),
        _ => None,
    });

    let time_remaining_secs = match (state, now, full, rate) {
        (Some(ChargeState::Discharging), Some(now), _, Some(rate)) if rate > 0.0 => {
            Some((now / rate * 3600.0) as u64)
        }
        (Some(ChargeState::Charging), Some(now), Some(full), Some(rate)) if rate > 0.0 => {
            Some(((full - now).max(0.0) / rate * 3600.0) as u64)
        }
        _ => None,
    };

    let health_percent = match (full, design) {
        (Some(full), Some(design)) if design > 0.0 => Some((full / design * 100.0).min(100.0)),
        _ => None,
    };

    let power_plugged = mains_online(power_supply).or(match state {
        Some(ChargeState::Charging) | Some(ChargeState::Full) | Some(ChargeState::NotCharging) => {
            Some(true)
        }
        Some(ChargeState::Discharging) => Some(false),
        _ => None,
    });

    Some(BatteryReading {
        charge_percent: charge_percent.map(crate::types::round2),
        state,
        power_plugged,
        time_remaining_secs,
        health_percent: health_percent.map(crate::types::round2),
        cycle_count: read_trimmed(&dir.join("cycle_count")).and_then(|s| s.parse().ok()),
        technology: read_trimmed(&dir.join("technology")).filter(|t| t != "Unknown"),
    })
}

// --- network ---------------------------------------------------------------

pub(crate) fn read_link_state(interface_dir: &Path) -> LinkState {
    if !interface_dir.is_dir() {
        return LinkState::unavailable("interface not present in sysfs");
    }

    let is_up = match read_trimmed(&interface_dir.join("operstate")).as_deref() {
        Some("up") => Metric::available(true),
        Some("down") | Some("lowerlayerdown") | Some("dormant") | Some("notpresent") => {
            Metric::available(false)
        }
        // Loopback and some virtual devices report "unknown"; fall back to carrier
        _ => match read_trimmed(&interface_dir.join("carrier")).as_deref() {
            Some("1") => Metric::available(true),
            Some("0") => Metric::available(false),
            _ => Metric::platform("link state not reported by driver"),
        },
    };

    let speed_mbps = match read_trimmed(&interface_dir.join("speed")).and_then(|s| s.parse::<i64>().ok()) {
        Some(speed) if speed > 0 => Metric::available(speed as u64),
        _ => Metric::platform("link speed not reported by driver"),
    };

    LinkState { is_up, speed_mbps }
}

fn tcp_state(code: &str) -> &'static str {
    match code {
        "01" => "ESTABLISHED",
        "02" => "SYN_SENT",
        "03" => "SYN_RECV",
        "04" => "FIN_WAIT1",
        "05" => "FIN_WAIT2",
        "06" => "TIME_WAIT",
        "07" => "CLOSE",
        "08" => "CLOSE_WAIT",
        "09" => "LAST_ACK",
        "0A" => "LISTEN",
        "0B" => "CLOSING",
        _ => "UNKNOWN",
    }
}

/// Decode a `/proc/net` address such as `0100007F:0277`
fn parse_socket(raw: &str) -> Option<SocketAddr> {
    let (host, port) = raw.split_once(':')?;
    let port = u16::from_str_radix(port, 16).ok()?;

    // Each 32-bit word is in host byte order
    let ip: std::net::IpAddr = match host.len() {
        8 => Ipv4Addr::from(u32::from_str_radix(host, 16).ok()?.to_le_bytes()).into(),
        32 => {
            let mut bytes = [0u8; 16];
            for (i, chunk) in bytes.chunks_mut(4).enumerate() {
                let word = u32::from_str_radix(host.get(i * 8..i * 8 + 8)?, 16).ok()?;
                chunk.copy_from_slice(&word.to_le_bytes());
            }
            Ipv6Addr::from(bytes).into()
        }
        _ => return None,
    };
    Some(SocketAddr::new(ip, port))
}

/// Parse one of `/proc/net/{tcp,tcp6,udp,udp6}`
pub(crate) fn parse_proc_net(table: &str, protocol: &str) -> Vec<Connection> {
    let is_tcp = protocol.starts_with("tcp");
    table
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let local = parse_socket(fields.get(1)?)?;
            let remote = parse_socket(fields.get(2)?)?;
            let code = *fields.get(3)?;
            let state = if is_tcp {
                tcp_state(code)
            } else if code == "01" {
                "ESTABLISHED"
            } else {
                "UNCONN"
            };
            Some(Connection {
                protocol: protocol.to_string(),
                local_address: local.to_string(),
                remote_address: (!remote.ip().is_unspecified() || remote.port() != 0)
                    .then(|| remote.to_string()),
                state: state.to_string(),
            })
        })
        .collect()
}

// --- storage and cpu -------------------------------------------------------

const SECTOR_SIZE: u64 = 512;

/// Parse `/proc/diskstats`, skipping loop and ram devices
pub(crate) fn parse_diskstats(stats: &str) -> Vec<DiskIo> {
    stats
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let device = *fields.get(2)?;
            if device.starts_with("loop") || device.starts_with("ram") {
                return None;
            }
            let num = |idx: usize| fields.get(idx).and_then(|v| v.parse::<u64>().ok());
            Some(DiskIo {
                device: device.to_string(),
                reads_completed: num(3)?,
                read: ByteSize::new(num(5)? * SECTOR_SIZE),
                read_time_ms: num(6)?,
                writes_completed: num(7)?,
                written: ByteSize::new(num(9)? * SECTOR_SIZE),
                write_time_ms: num(10)?,
            })
        })
        .collect()
}

/// Aggregate `cpu` line of `/proc/stat`
pub(crate) fn parse_proc_stat(stat: &str) -> Option<CpuTimes> {
    let line = stat.lines().find(|line| line.starts_with("cpu "))?;
    let values: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .take(8)
        .filter_map(|v| v.parse().ok())
        .collect();
    if values.len() < 5 {
        return None;
    }
    Some(CpuTimes {
        total: values.iter().sum(),
        iowait: values[4],
    })
}

// --- logs ------------------------------------------------------------------

fn journal_args(kind: LogKind, limit: usize) -> Vec<String> {
    let mut args = vec![
        "--no-pager".to_string(),
        "-o".to_string(),
        "json".to_string(),
        "-n".to_string(),
        limit.to_string(),
    ];
    match kind {
        LogKind::System => args.push("--system".into()),
        LogKind::Application => args.push("_TRANSPORT=stdout".into()),
        // auth and authpriv; matches on the same field are OR-ed
        LogKind::Security => {
            args.push("SYSLOG_FACILITY=4".into());
            args.push("SYSLOG_FACILITY=10".into());
        }
        LogKind::All => {}
    }
    args
}

fn journal_priority(priority: &str) -> Option<&'static str> {
    let level = match priority {
        "0" => "emerg",
        "1" => "alert",
        "2" => "crit",
        "3" => "err",
        "4" => "warning",
        "5" => "notice",
        "6" => "info",
        "7" => "debug",
        _ => return None,
    };
    Some(level)
}

fn journal_message(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        // Non-UTF-8 messages are exported as byte arrays
        serde_json::Value::Array(bytes) => {
            let bytes: Vec<u8> = bytes
                .iter()
                .filter_map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect();
            Some(String::from_utf8_lossy(&bytes).to_string())
        }
        _ => None,
    }
}

/// Parse `journalctl -o json` output, one object per line
pub(crate) fn parse_journal(output: &str) -> Vec<LogEntry> {
    output
        .lines()
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .filter_map(|record| {
            let message = record.get("MESSAGE").and_then(journal_message)?;
            let time = record
                .get("__REALTIME_TIMESTAMP")
                .and_then(|t| t.as_str())
                .and_then(|t| t.parse::<i64>().ok())
                .and_then(|micros| DateTime::<Utc>::from_timestamp_micros(micros))
                .map(|t| t.to_rfc3339());
            let level = record
                .get("PRIORITY")
                .and_then(|p| p.as_str())
                .and_then(journal_priority)
                .map(String::from);
            let source = ["_SYSTEMD_UNIT", "SYSLOG_IDENTIFIER", "_COMM"]
                .iter()
                .find_map(|key| record.get(*key).and_then(|v| v.as_str()))
                .map(String::from);
            Some(LogEntry {
                time,
                level,
                source,
                message,
            })
        })
        .collect()
}

/// Parse a syslog line in RFC 3339 (`2024-01-15T10:00:00+00:00 host prog[1]: msg`)
/// or traditional (`Jan 15 10:00:00 host prog[1]: msg`) format
pub(crate) fn parse_syslog_line(line: &str) -> LogEntry {
    let mut parts = line.splitn(4, ' ');
    if let Some(time) = parts
        .next()
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
    {
        let _host = parts.next();
        let rest: Vec<&str> = parts.collect();
        let rest = rest.join(" ");
        let (source, message) = split_syslog_tag(&rest);
        return LogEntry {
            time: Some(time.to_rfc3339()),
            level: None,
            source,
            message,
        };
    }

    let fields: Vec<&str> = line.splitn(5, ' ').filter(|f| !f.is_empty()).collect();
    if fields.len() == 5 {
        let (source, message) = split_syslog_tag(fields[4]);
        LogEntry {
            time: None,
            level: None,
            source,
            message,
        }
    } else {
        LogEntry {
            time: None,
            level: None,
            source: None,
            message: line.to_string(),
        }
    }
}

fn split_syslog_tag(rest: &str) -> (Option<String>, String) {
    match rest.split_once(": ") {
        Some((tag, message)) if !tag.contains(' ') => {
            let name = tag.split('[').next().unwrap_or(tag);
            (Some(name.to_string()), message.to_string())
        }
        _ => (None, rest.to_string()),
    }
}

/// Last `limit` lines of a file, reading backwards from the end
fn tail_lines(path: &Path, limit: usize) -> io::Result<Vec<String>> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    let mut window = (limit as u64 * 256).max(8192);

    loop {
        let start = len.saturating_sub(window);
        file.seek(SeekFrom::Start(start))?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        let text = String::from_utf8_lossy(&buf);
        let mut lines: Vec<&str> = text.lines().collect();
        if start > 0 && !lines.is_empty() {
            // First line is partial
            lines.remove(0);
        }
        if lines.len() >= limit || start == 0 {
            let skip = lines.len().saturating_sub(limit);
            return Ok(lines[skip..].iter().map(|l| l.to_string()).collect());
        }
        window *= 4;
    }
}

// --- applications ----------------------------------------------------------

fn field(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "(none)")
        .map(String::from)
}

pub(crate) fn parse_dpkg(output: &str) -> Vec<Application> {
    output
        .lines()
        .filter_map(|line| {
            let mut cols = line.split('\t');
            let status = cols.next()?;
            if !status.starts_with("ii") {
                return None;
            }
            let name = field(cols.next())?;
            Some(Application {
                name,
                version: field(cols.next()),
                category: field(cols.next()),
                publisher: field(cols.next()),
                install_date: None,
                identifier: None,
            })
        })
        .collect()
}

pub(crate) fn parse_rpm(output: &str) -> Vec<Application> {
    output
        .lines()
        .filter_map(|line| {
            let mut cols = line.split('\t');
            let name = field(cols.next())?;
            Some(Application {
                name,
                version: field(cols.next()),
                category: field(cols.next()),
                publisher: field(cols.next()),
                install_date: field(cols.next())
                    .and_then(|t| t.parse::<i64>().ok())
                    .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
                    .map(|t| t.format("%Y-%m-%d").to_string()),
                identifier: None,
            })
        })
        .collect()
}

pub(crate) fn parse_pacman(output: &str) -> Vec<Application> {
    output
        .lines()
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let mut app = Application::named(cols.next()?);
            app.version = cols.next().map(String::from);
            Some(app)
        })
        .collect()
}

// --- firmware --------------------------------------------------------------

pub(crate) fn read_dmi_field(dmi_dir: &Path, name: &str) -> Metric<String> {
    match fs::read_to_string(dmi_dir.join(name)) {
        Ok(raw) => Metric::from_option(smbios::clean(&raw), "not reported by firmware"),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => Metric::permission(ROOT_ONLY),
        Err(_) => Metric::platform("not exposed by the kernel"),
    }
}

/// Parse `dmidecode -t 17`, skipping empty slots
pub(crate) fn parse_dmidecode_memory(output: &str) -> Vec<MemoryModule> {
    output
        .split("\n\n")
        .filter(|block| block.lines().any(|l| l.trim() == "Memory Device"))
        .filter_map(|block| {
            let value = |key: &str| {
                block.lines().find_map(|line| {
                    let (k, v) = line.trim().split_once(": ")?;
                    (k == key).then(|| v.trim().to_string())
                })
            };
            let size = smbios::parse_size(&value("Size")?)?;
            Some(MemoryModule {
                locator: value("Locator").unwrap_or_default(),
                size: ByteSize::new(size),
                speed_mhz: Metric::from_option(
                    value("Speed").and_then(|s| smbios::parse_speed(&s)),
                    "speed not reported",
                ),
                manufacturer: value("Manufacturer").and_then(|v| smbios::clean(&v)),
                part_number: value("Part Number").and_then(|v| smbios::clean(&v)),
                form_factor: value("Form Factor").and_then(|v| smbios::clean(&v)),
                memory_type: value("Type").and_then(|v| smbios::clean(&v)),
            })
        })
        .collect()
}
