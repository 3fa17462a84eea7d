//! Decide whether a tool can run on this host before collecting

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::platform::{Capability, Cause};
use crate::source::SystemMetricsSource;
use crate::types::Category;

/// Availability block attached to every successful result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub runnable: bool,
    /// Fields that will carry an unavailable marker
    pub degraded_fields: Vec<String>,
    pub reason: Option<String>,
}

impl Resolution {
    pub fn full() -> Self {
        Self {
            runnable: true,
            degraded_fields: Vec::new(),
            reason: None,
        }
    }
}

/// Human-readable explanation of a capability gap
pub fn describe(cause: &Cause) -> String {
    match cause {
        Cause::Privileges => "requires administrator privileges on this platform".to_string(),
        Cause::Platform(platform) => format!("not supported on {}", platform),
        Cause::MissingTool(tool) => format!("{} is not installed", tool),
        Cause::NoDevice(device) => format!("no {} detected", device),
    }
}

/// Pure mapping from a capability probe to a resolution
pub fn from_capability(capability: Capability) -> Resolution {
    match capability {
        Capability::Full => Resolution::full(),
        Capability::Degraded { fields, cause } => Resolution {
            runnable: true,
            degraded_fields: fields,
            reason: Some(describe(&cause)),
        },
        Capability::Unsupported { cause } => Resolution {
            runnable: false,
            degraded_fields: Vec::new(),
            reason: Some(describe(&cause)),
        },
    }
}

/// Per-category availability for one metric source
#[derive(Clone)]
pub struct AvailabilityResolver {
    source: Arc<dyn SystemMetricsSource>,
}

impl AvailabilityResolver {
    pub fn new(source: Arc<dyn SystemMetricsSource>) -> Self {
        Self { source }
    }

    pub fn resolve(&self, category: Category) -> Resolution {
        from_capability(self.source.capability(category))
    }
}
