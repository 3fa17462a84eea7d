//! Availability tagging for metric fields
//!
//! Every field an adapter may fail to populate is wrapped in [`Metric`], so a
//! missing reading is reported with its cause instead of being replaced by a
//! default value.

use serde::{Deserialize, Serialize};

/// Tri-state availability of a single metric field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Available,
    UnavailablePlatform,
    UnavailablePermission,
}

/// A metric value, or the reason it could not be read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Metric<T> {
    Available { value: T },
    UnavailablePlatform { reason: String },
    UnavailablePermission { reason: String },
}

impl<T> Metric<T> {
    pub fn available(value: T) -> Self {
        Metric::Available { value }
    }

    /// Not exposed by this platform or hardware
    pub fn platform(reason: impl Into<String>) -> Self {
        Metric::UnavailablePlatform {
            reason: reason.into(),
        }
    }

    /// Exposed, but not readable with the current privileges
    pub fn permission(reason: impl Into<String>) -> Self {
        Metric::UnavailablePermission {
            reason: reason.into(),
        }
    }

    /// Wrap an optional reading, tagging `None` as platform-unavailable
    pub fn from_option(value: Option<T>, reason: impl Into<String>) -> Self {
        match value {
            Some(value) => Metric::available(value),
            None => Metric::platform(reason),
        }
    }

    pub fn status(&self) -> AvailabilityStatus {
        match self {
            Metric::Available { .. } => AvailabilityStatus::Available,
            Metric::UnavailablePlatform { .. } => AvailabilityStatus::UnavailablePlatform,
            Metric::UnavailablePermission { .. } => AvailabilityStatus::UnavailablePermission,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Metric::Available { .. })
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Metric::Available { value } => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Metric::Available { value } => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Metric<U> {
        match self {
            Metric::Available { value } => Metric::Available { value: f(value) },
            Metric::UnavailablePlatform { reason } => Metric::UnavailablePlatform { reason },
            Metric::UnavailablePermission { reason } => Metric::UnavailablePermission { reason },
        }
    }

    /// Reason attached to an unavailable field
    pub fn reason(&self) -> Option<&str> {
        match self {
            Metric::Available { .. } => None,
            Metric::UnavailablePlatform { reason } | Metric::UnavailablePermission { reason } => {
                Some(reason)
            }
        }
    }
}

impl<T: Copy> Metric<T> {
    pub fn get(&self) -> Option<T> {
        self.value().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_available_serializes_with_value() {
        let metric = Metric::available(42.5_f64);
        assert_eq!(
            serde_json::to_value(&metric).unwrap(),
            json!({ "status": "available", "value": 42.5 })
        );
    }

    #[test]
    fn test_zero_is_a_real_value() {
        let metric = Metric::available(0_u64);
        assert!(metric.is_available());
        assert_eq!(metric.get(), Some(0));
    }

    #[test]
    fn test_unavailable_carries_reason() {
        let metric: Metric<u32> = Metric::permission("requires root");
        assert_eq!(metric.status(), AvailabilityStatus::UnavailablePermission);
        assert_eq!(metric.reason(), Some("requires root"));
        assert_eq!(metric.get(), None);
        assert_eq!(
            serde_json::to_value(&metric).unwrap(),
            json!({ "status": "unavailable_permission", "reason": "requires root" })
        );
    }

    #[test]
    fn test_from_option_and_map() {
        let missing: Metric<u64> = Metric::from_option(None, "no sensor");
        assert_eq!(missing.status(), AvailabilityStatus::UnavailablePlatform);
        assert_eq!(missing.clone().map(|v| v * 2).reason(), Some("no sensor"));

        let present = Metric::from_option(Some(21_u64), "no sensor").map(|v| v * 2);
        assert_eq!(present.get(), Some(42));
    }
}
