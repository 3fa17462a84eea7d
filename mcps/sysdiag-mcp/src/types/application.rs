//! Installed application types

use serde::{Deserialize, Serialize};

/// Installed software inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationSnapshot {
    /// Package source the inventory came from (e.g. "dpkg", "registry")
    pub source: String,
    /// Applications matching the filter before the limit was applied
    pub total: usize,
    pub applications: Vec<Application>,
}

/// Individual installed application or package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    pub version: Option<String>,
    pub publisher: Option<String>,
    /// Package section or store origin, used by the category filter
    pub category: Option<String>,
    pub install_date: Option<String>,
    pub identifier: Option<String>,
}

impl Application {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            publisher: None,
            category: None,
            install_date: None,
            identifier: None,
        }
    }
}
