//! Sweep orchestration: validate, enumerate, fan out, wait.

use super::probe::{NetworkProbe, ProbeResult, probe_host};
use super::target::{NetworkDescriptor, derive_network, resolve_target_address, validate_cidr_target};
use super::ScanError;
use crate::config::ScanConfig;
use serde::Serialize;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// Events emitted while a sweep runs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SweepEvent {
    /// Target validated, probing is about to start
    Started {
        network: Ipv4Addr,
        prefix: u8,
        mask: String,
        hosts: u64,
    },
    /// One host finished probing; emitted by the probing task itself
    HostProbed(ProbeResult),
    /// Every probe has completed
    Finished { hosts_probed: u64, elapsed_secs: f64 },
}

impl std::fmt::Display for SweepEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SweepEvent::Started { network, hosts, .. } => {
                write!(f, "[INFO] {} addresses to analyse in {}", hosts, network)
            }
            SweepEvent::HostProbed(result) => write!(f, "{}", result),
            SweepEvent::Finished { elapsed_secs, .. } => write!(f, "{:.3}s", elapsed_secs),
        }
    }
}

/// Callback type for sweep events. Called concurrently from probe tasks.
pub type EventCallback = Arc<dyn Fn(SweepEvent) + Send + Sync>;

/// What the orchestrator knows once the sweep is over
#[derive(Debug, Clone)]
pub struct SweepSummary {
    pub network: NetworkDescriptor,
    pub hosts_probed: u64,
    pub elapsed: Duration,
}

/// Sweep every host of a CIDR target.
///
/// The target is fully validated before any probe starts; a validation error
/// means nothing was probed. Once probing begins, per-host failures only show
/// up as unreachable results. Returns after every probe task has completed.
pub async fn run_sweep(
    target: &str,
    capability: Arc<dyn NetworkProbe>,
    config: &ScanConfig,
    on_event: EventCallback,
) -> Result<SweepSummary, ScanError> {
    let start = Instant::now();

    validate_cidr_target(target).inspect_err(|e| tracing::error!("{}", e))?;
    let address = resolve_target_address(target).inspect_err(|e| tracing::error!("{}", e))?;
    let network = derive_network(target)?;

    let hosts = network.host_count();
    tracing::info!(
        "Sweeping {} ({} via {}): {} hosts, {} ping attempts each",
        network,
        address,
        network.mask,
        hosts,
        config.ping_attempts
    );

    on_event(SweepEvent::Started {
        network: network.network,
        prefix: network.prefix,
        mask: network.mask.clone(),
        hosts,
    });

    let config = Arc::new(config.clone());
    let mut probes = JoinSet::new();

    for ip in network.hosts() {
        let capability = Arc::clone(&capability);
        let on_event = Arc::clone(&on_event);
        let config = Arc::clone(&config);
        probes.spawn(async move {
            let result = probe_host(capability.as_ref(), ip, &config).await;
            on_event(SweepEvent::HostProbed(result));
        });
    }

    let mut hosts_probed = 0u64;
    while let Some(joined) = probes.join_next().await {
        if let Err(e) = joined {
            tracing::error!("Probe task failed: {}", e);
        }
        hosts_probed += 1;
    }

    let elapsed = start.elapsed();
    tracing::info!("Sweep of {} finished in {:?}", network, elapsed);

    on_event(SweepEvent::Finished {
        hosts_probed,
        elapsed_secs: elapsed.as_secs_f64(),
    });

    Ok(SweepSummary {
        network,
        hosts_probed,
        elapsed,
    })
}
