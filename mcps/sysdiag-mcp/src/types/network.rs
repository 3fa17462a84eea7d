//! Network metric types

use serde::{Deserialize, Serialize};

use super::{ByteSize, Metric};

/// Interface statistics and optional connection metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub interfaces: Vec<NetworkInterface>,
    /// Active connections (only when requested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections: Option<Metric<ConnectionList>>,
}

/// Individual network interface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInterface {
    /// Interface name (e.g. "eth0", "wlan0", "en0")
    pub name: String,
    pub mac_address: String,
    /// Addresses in CIDR notation
    pub addresses: Vec<String>,
    pub received: ByteSize,
    pub transmitted: ByteSize,
    pub packets_received: u64,
    pub packets_transmitted: u64,
    pub errors_received: u64,
    pub errors_transmitted: u64,
    pub is_up: Metric<bool>,
    pub speed_mbps: Metric<u64>,
}

/// Link state as reported by the platform
#[derive(Debug, Clone, PartialEq)]
pub struct LinkState {
    pub is_up: Metric<bool>,
    pub speed_mbps: Metric<u64>,
}

/// Capped list of connections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionList {
    /// Connections seen before capping
    pub total: usize,
    pub connections: Vec<Connection>,
}

/// Connection metadata; payloads are never inspected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// "tcp", "tcp6", "udp" or "udp6"
    pub protocol: String,
    pub local_address: String,
    pub remote_address: Option<String>,
    pub state: String,
}

impl LinkState {
    pub fn unavailable(reason: &str) -> Self {
        Self {
            is_up: Metric::platform(reason),
            speed_mbps: Metric::platform(reason),
        }
    }
}
