//! Network interface and connection collection

use sysinfo::Networks;

use crate::platform::PlatformProbe;
use crate::types::{ByteSize, Connection, ConnectionList, NetworkInterface, NetworkSnapshot};

pub fn network_snapshot(
    probe: &dyn PlatformProbe,
    include_connections: bool,
    max_connections: usize,
) -> NetworkSnapshot {
    let networks = Networks::new_with_refreshed_list();

    let mut interfaces: Vec<NetworkInterface> = networks
        .iter()
        .map(|(name, data)| {
            let link = probe.link_state(name);
            NetworkInterface {
                name: name.clone(),
                mac_address: data.mac_address().to_string(),
                addresses: data
                    .ip_networks()
                    .iter()
                    .map(|ip| format!("{}/{}", ip.addr, ip.prefix))
                    .collect(),
                received: ByteSize::new(data.total_received()),
                transmitted: ByteSize::new(data.total_transmitted()),
                packets_received: data.total_packets_received(),
                packets_transmitted: data.total_packets_transmitted(),
                errors_received: data.total_errors_on_received(),
                errors_transmitted: data.total_errors_on_transmitted(),
                is_up: link.is_up,
                speed_mbps: link.speed_mbps,
            }
        })
        .collect();
    interfaces.sort_by(|a, b| a.name.cmp(&b.name));

    NetworkSnapshot {
        interfaces,
        connections: include_connections
            .then(|| probe.connections().map(|all| cap_connections(all, max_connections))),
    }
}

pub fn cap_connections(all: Vec<Connection>, max: usize) -> ConnectionList {
    ConnectionList {
        total: all.len(),
        connections: all.into_iter().take(max).collect(),
    }
}

/// Bytes received and transmitted across all interfaces
pub fn traffic_totals() -> (u64, u64) {
    let networks = Networks::new_with_refreshed_list();
    networks.iter().fold((0, 0), |(rx, tx), (_, data)| {
        (rx + data.total_received(), tx + data.total_transmitted())
    })
}
