//! CPU usage, frequency and temperature

use std::time::Duration;

use sysinfo::{Components, System, MINIMUM_CPU_UPDATE_INTERVAL};

use crate::platform::Platform;
use crate::types::{round2, CoreDetail, CpuSnapshot, Metric, TemperatureReading};

/// Sensor labels that belong to the CPU package or its cores
const CPU_SENSOR_MARKERS: [&str; 8] = [
    "cpu", "core", "package", "tctl", "tdie", "k10temp", "coretemp", "soc",
];

pub(crate) fn brand(raw: Option<&str>) -> Metric<String> {
    Metric::from_option(
        raw.map(str::trim)
            .filter(|b| !b.is_empty())
            .map(String::from),
        "CPU brand not reported",
    )
}

/// Zero means the OS did not report a frequency
fn frequency(mhz: u64) -> Metric<u64> {
    if mhz > 0 {
        Metric::available(mhz)
    } else {
        Metric::platform("CPU frequency not reported")
    }
}

/// Two usage refreshes separated by `interval`
pub async fn sample_cpu(interval: Duration) -> (System, Duration) {
    let interval = interval.max(MINIMUM_CPU_UPDATE_INTERVAL);
    let mut sys = System::new();
    sys.refresh_cpu_all();
    tokio::time::sleep(interval).await;
    sys.refresh_cpu_all();
    (sys, interval)
}

pub async fn cpu_snapshot(per_core: bool, interval: Duration, platform: Platform) -> CpuSnapshot {
    let (sys, interval) = sample_cpu(interval).await;
    let cpus = sys.cpus();
    let first_cpu = cpus.first();

    let cores = per_core.then(|| {
        cpus.iter()
            .map(|cpu| CoreDetail {
                name: cpu.name().to_string(),
                usage_percent: round2(cpu.cpu_usage() as f64),
                frequency_mhz: frequency(cpu.frequency()),
            })
            .collect()
    });

    let sensors = temperature_sensors();
    let temperature_celsius = match hottest_cpu_sensor(&sensors) {
        Some(celsius) => Metric::available(celsius),
        None if sensors.is_empty() => {
            Metric::platform(format!("no temperature sensors exposed on {}", platform))
        }
        None => Metric::platform("no CPU temperature sensor found"),
    };

    CpuSnapshot {
        overall_percent: round2(sys.global_cpu_usage() as f64),
        per_core_percent: cpus.iter().map(|c| round2(c.cpu_usage() as f64)).collect(),
        frequency_mhz: frequency(first_cpu.map(|c| c.frequency()).unwrap_or(0)),
        temperature_celsius,
        brand: brand(first_cpu.map(|c| c.brand())),
        vendor_id: Metric::from_option(
            first_cpu
                .map(|c| c.vendor_id().to_string())
                .filter(|v| !v.is_empty()),
            "CPU vendor not reported",
        ),
        physical_cores: Metric::from_option(
            sys.physical_core_count(),
            "physical core count not reported",
        ),
        logical_cores: cpus.len(),
        load_average: super::system::load_average(platform),
        sample_interval_ms: interval.as_millis() as u64,
        cores,
        sensors,
    }
}

/// Every sensor with a finite reading
pub fn temperature_sensors() -> Vec<TemperatureReading> {
    let components = Components::new_with_refreshed_list();
    components
        .iter()
        .filter(|c| c.temperature().is_finite())
        .map(|c| TemperatureReading {
            label: c.label().to_string(),
            current_celsius: round2(c.temperature() as f64),
            max_celsius: Metric::from_option(
                Some(c.max()).filter(|m| m.is_finite() && *m > 0.0).map(|m| round2(m as f64)),
                "maximum not reported",
            ),
            critical_celsius: Metric::from_option(
                c.critical().filter(|c| c.is_finite()).map(|c| round2(c as f64)),
                "critical threshold not reported",
            ),
        })
        .collect()
}

/// Highest reading among CPU-labelled sensors
pub fn hottest_cpu_sensor(sensors: &[TemperatureReading]) -> Option<f64> {
    sensors
        .iter()
        .filter(|s| {
            let label = s.label.to_ascii_lowercase();
            CPU_SENSOR_MARKERS.iter().any(|m| label.contains(m))
        })
        .map(|s| s.current_celsius)
        .max_by(|a, b| a.total_cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(label: &str, celsius: f64) -> TemperatureReading {
        TemperatureReading {
            label: label.into(),
            current_celsius: celsius,
            max_celsius: Metric::platform("n/a"),
            critical_celsius: Metric::platform("n/a"),
        }
    }

    #[test]
    fn test_hottest_cpu_sensor() {
        let sensors = vec![
            sensor("nvme Composite", 71.0),
            sensor("coretemp Package id 0", 58.0),
            sensor("coretemp Core 3", 63.5),
        ];
        assert_eq!(hottest_cpu_sensor(&sensors), Some(63.5));
    }

    #[test]
    fn test_no_cpu_sensor() {
        let sensors = vec![sensor("acpitz", 40.0), sensor("nvme Composite", 44.0)];
        assert_eq!(hottest_cpu_sensor(&sensors), None);
        assert_eq!(hottest_cpu_sensor(&[]), None);
    }

    #[test]
    fn test_zero_frequency_is_unavailable() {
        assert!(!frequency(0).is_available());
        assert_eq!(frequency(3600), Metric::available(3600));
    }

    #[test]
    fn test_blank_brand_is_unavailable() {
        assert!(!brand(Some("  ")).is_available());
        assert!(!brand(None).is_available());
        assert_eq!(
            brand(Some("AMD Ryzen 7 5800X")).value().map(String::as_str),
            Some("AMD Ryzen 7 5800X")
        );
    }

    #[tokio::test]
    async fn test_cpu_snapshot_per_core() {
        let snapshot = cpu_snapshot(true, Duration::from_millis(0), Platform::detect()).await;
        assert_eq!(snapshot.per_core_percent.len(), snapshot.logical_cores);
        assert_eq!(
            snapshot.cores.as_ref().map(Vec::len),
            Some(snapshot.logical_cores)
        );
        assert!(snapshot.sample_interval_ms >= MINIMUM_CPU_UPDATE_INTERVAL.as_millis() as u64);
        assert!((0.0..=100.0).contains(&snapshot.overall_percent));
    }
}
