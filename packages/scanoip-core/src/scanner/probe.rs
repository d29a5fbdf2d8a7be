//! Per-host liveness probing

use super::{arp, oui, ping};
use crate::config::ScanConfig;
use async_trait::async_trait;
use serde::Serialize;
use std::net::Ipv4Addr;

/// Reachability and neighbor-resolution capability used by the prober.
///
/// Implementations report failures by returning `false` / `None`; they never
/// abort the sweep.
#[async_trait]
pub trait NetworkProbe: Send + Sync {
    /// Send `attempts` echo requests to `ip` and report whether any was answered.
    async fn probe(&self, ip: Ipv4Addr, attempts: u32) -> bool;

    /// Look up the link-layer address bound to `ip`.
    async fn resolve_link_layer(&self, ip: Ipv4Addr) -> Option<String>;
}

/// [`NetworkProbe`] backed by the system `ping` and `arp` commands.
#[derive(Debug, Clone, Default)]
pub struct SystemProbe {
    /// Per-reply wait passed to ping, in seconds
    pub wait_secs: Option<u64>,
}

impl SystemProbe {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            wait_secs: config.ping_wait_secs,
        }
    }
}

#[async_trait]
impl NetworkProbe for SystemProbe {
    async fn probe(&self, ip: Ipv4Addr, attempts: u32) -> bool {
        ping::ping_host(ip, attempts, self.wait_secs).await
    }

    async fn resolve_link_layer(&self, ip: Ipv4Addr) -> Option<String> {
        arp::lookup_mac(ip).await
    }
}

/// Outcome of probing one host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub address: Ipv4Addr,
    pub reachable: bool,
    /// MAC address from the neighbor table, only for reachable hosts
    pub link_layer: Option<String>,
    /// Device vendor/manufacturer from MAC OUI lookup
    pub vendor: Option<String>,
}

impl ProbeResult {
    fn unreachable(address: Ipv4Addr) -> Self {
        Self {
            address,
            reachable: false,
            link_layer: None,
            vendor: None,
        }
    }
}

impl std::fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.reachable {
            return write!(f, "🔴 {}", self.address);
        }

        write!(f, "🟢 {}", self.address)?;
        if let Some(mac) = &self.link_layer {
            write!(f, "\n└── {}", mac)?;
            if let Some(vendor) = &self.vendor {
                write!(f, " ({})", vendor)?;
            }
        }
        Ok(())
    }
}

/// Probe one host: reachability first, then link-layer resolution if it answered.
///
/// A host that answers stays reachable whatever the neighbor lookup returns.
pub async fn probe_host(
    capability: &dyn NetworkProbe,
    ip: Ipv4Addr,
    config: &ScanConfig,
) -> ProbeResult {
    if !capability.probe(ip, config.ping_attempts).await {
        tracing::debug!("{} is unreachable", ip);
        return ProbeResult::unreachable(ip);
    }

    let link_layer = capability
        .resolve_link_layer(ip)
        .await
        .map(|mac| mac.trim().to_string())
        .filter(|mac| !mac.is_empty());

    let vendor = match &link_layer {
        Some(mac) if config.vendor_lookup => oui::lookup_vendor(mac),
        _ => None,
    };

    tracing::debug!("{} is reachable (mac: {:?}, vendor: {:?})", ip, link_layer, vendor);

    ProbeResult {
        address: ip,
        reachable: true,
        link_layer,
        vendor,
    }
}
