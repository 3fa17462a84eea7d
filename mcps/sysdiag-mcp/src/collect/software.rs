//! Installed applications, system logs and firmware details

use crate::error::CollectError;
use crate::platform::{ApplicationInventory, PlatformProbe};
use crate::types::{
    ApplicationSnapshot, Baseboard, FirmwareQuery, LogKind, LogSnapshot, Metric,
    MotherboardSnapshot,
};

/// Filter by category, sort by name and apply the limit
///
/// `category` matches the package section or store origin case-insensitively;
/// `None` keeps everything.
pub fn filter_applications(
    inventory: ApplicationInventory,
    category: Option<&str>,
    limit: usize,
) -> ApplicationSnapshot {
    let needle = category.map(str::to_lowercase);
    let mut applications: Vec<_> = inventory
        .applications
        .into_iter()
        .filter(|app| match &needle {
            None => true,
            Some(needle) => app
                .category
                .as_deref()
                .map(|c| c.to_lowercase().contains(needle.as_str()))
                .unwrap_or(false),
        })
        .collect();

    applications.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.version.cmp(&b.version))
    });

    let total = applications.len();
    applications.truncate(limit);

    ApplicationSnapshot {
        source: inventory.source,
        total,
        applications,
    }
}

pub async fn applications_snapshot(
    probe: &dyn PlatformProbe,
    category: Option<&str>,
    limit: usize,
) -> Result<ApplicationSnapshot, CollectError> {
    let inventory = probe.applications().await?;
    tracing::debug!(
        "Read {} applications from {}",
        inventory.applications.len(),
        inventory.source
    );
    Ok(filter_applications(inventory, category, limit))
}

/// Keep the newest `limit` entries
pub fn cap_logs(mut snapshot: LogSnapshot, limit: usize) -> LogSnapshot {
    let skip = snapshot.entries.len().saturating_sub(limit);
    snapshot.entries.drain(..skip);
    snapshot.count = snapshot.entries.len();
    snapshot
}

pub async fn logs_snapshot(
    probe: &dyn PlatformProbe,
    kind: LogKind,
    limit: usize,
) -> Result<LogSnapshot, CollectError> {
    let snapshot = probe.logs(kind, limit).await?;
    Ok(cap_logs(snapshot, limit))
}

pub async fn motherboard_snapshot(
    probe: &dyn PlatformProbe,
    query: FirmwareQuery,
) -> Result<MotherboardSnapshot, CollectError> {
    probe.firmware(query).await
}

/// Baseboard identity only; firmware failures become an unavailable marker
pub async fn baseboard_summary(probe: &dyn PlatformProbe) -> Metric<Baseboard> {
    let query = FirmwareQuery {
        include_bios: false,
        include_slots: false,
        include_system: false,
    };
    match probe.firmware(query).await {
        Ok(snapshot) => Metric::available(snapshot.baseboard),
        Err(CollectError::PermissionDenied(reason)) => Metric::permission(reason),
        Err(CollectError::Unavailable(reason)) | Err(CollectError::Failed(reason)) => {
            tracing::debug!("Baseboard summary unavailable: {}", reason);
            Metric::platform(reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Application, LogEntry};

    fn app(name: &str, category: Option<&str>) -> Application {
        let mut app = Application::named(name);
        app.category = category.map(String::from);
        app
    }

    fn inventory() -> ApplicationInventory {
        ApplicationInventory {
            source: "dpkg".into(),
            applications: vec![
                app("vim", Some("editors")),
                app("Bash", Some("shells")),
                app("emacs", Some("Editors")),
                app("libc6", None),
            ],
        }
    }

    #[tokio::test]
    async fn test_baseboard_summary_without_firmware_is_unavailable() {
        let summary = baseboard_summary(&crate::platform::UnsupportedProbe).await;
        assert!(matches!(summary, Metric::UnavailablePlatform { .. }));
        assert_eq!(
            summary.reason(),
            Some("firmware tables are not supported on this platform")
        );
    }

    #[test]
    fn test_filter_applications_by_category() {
        let snapshot = filter_applications(inventory(), Some("editors"), 10);
        let names: Vec<&str> = snapshot.applications.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["emacs", "vim"]);
        assert_eq!(snapshot.total, 2);
    }

    #[test]
    fn test_filter_applications_limit_keeps_total() {
        let snapshot = filter_applications(inventory(), None, 2);
        assert_eq!(snapshot.total, 4);
        assert_eq!(snapshot.applications.len(), 2);
        assert_eq!(snapshot.applications[0].name, "Bash");
        assert_eq!(snapshot.source, "dpkg");
    }

    #[test]
    fn test_cap_logs_keeps_newest() {
        let entries = (0..10)
            .map(|i| LogEntry {
                time: None,
                level: None,
                source: None,
                message: format!("line {}", i),
            })
            .collect();
        let snapshot = cap_logs(
            LogSnapshot {
                log_type: LogKind::All,
                source: "journald".into(),
                count: 10,
                entries,
            },
            3,
        );
        assert_eq!(snapshot.count, 3);
        assert_eq!(snapshot.entries[0].message, "line 7");
    }
}
