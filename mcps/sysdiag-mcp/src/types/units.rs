//! Unit-carrying value types

use serde::{Deserialize, Serialize};

const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];

/// A byte count, serialized with its human-scaled rendering alongside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "RawByteSize")]
pub struct ByteSize {
    pub bytes: u64,
}

#[derive(Deserialize)]
struct RawByteSize {
    bytes: u64,
}

impl From<RawByteSize> for ByteSize {
    fn from(raw: RawByteSize) -> Self {
        Self::new(raw.bytes)
    }
}

impl ByteSize {
    pub fn new(bytes: u64) -> Self {
        Self { bytes }
    }

    pub fn gib(&self) -> f64 {
        self.bytes as f64 / (1024.0 * 1024.0 * 1024.0)
    }
}

impl From<u64> for ByteSize {
    fn from(bytes: u64) -> Self {
        Self::new(bytes)
    }
}

impl Serialize for ByteSize {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ByteSize", 2)?;
        state.serialize_field("bytes", &self.bytes)?;
        state.serialize_field("display", &format_bytes(self.bytes))?;
        state.end()
    }
}

/// Format a byte count using binary prefixes with two decimals
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}

/// Percentage of `part` in `whole`, `None` when the whole is zero
pub fn percent_of(part: u64, whole: u64) -> Option<f64> {
    if whole == 0 {
        None
    } else {
        Some(part as f64 / whole as f64 * 100.0)
    }
}

/// Round to two decimals for presentation
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
