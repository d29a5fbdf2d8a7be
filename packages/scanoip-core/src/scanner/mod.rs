//! Network sweep module.
//!
//! Validates a CIDR target, enumerates its hosts and probes each of them
//! concurrently using:
//! - ICMP echo via the system ping command
//! - ARP neighbor table lookup for the link-layer address
//! - MAC OUI vendor lookup

mod arp;
mod ping;
pub mod oui;
pub mod probe;
pub mod subnet;
pub mod sweep;
pub mod target;

pub use probe::{NetworkProbe, ProbeResult, SystemProbe, probe_host};
pub use subnet::{is_valid_mask, mask_from_prefix_length, prefix_length_of, usable_address_count};
pub use sweep::{EventCallback, SweepEvent, run_sweep};
pub use target::{
    HostIter, NetworkDescriptor, derive_network, enumerate_hosts, is_valid_cidr_target,
    resolve_target_address, validate_cidr_target,
};

use std::process::Command;
use thiserror::Error;

/// Errors that abort a sweep before any host is probed
#[derive(Debug, Error)]
pub enum ScanError {
    /// The target is not `A.B.C.D/N`
    #[error("invalid target {target:?}: {reason}")]
    MalformedTarget { target: String, reason: String },

    /// The address portion is valid, but not IPv4
    #[error("{0} is not an IPv4 address (x.x.x.x)")]
    NotIpv4(String),

    /// The mask is not one of the canonical IPv4 masks
    #[error("{0} is not a good mask address")]
    InvalidMask(String),

    /// The host portion could not be resolved to an address
    #[error("error resolving {host}: {reason}")]
    AddressResolution { host: String, reason: String },
}

impl ScanError {
    pub(crate) fn malformed(target: &str, reason: impl std::fmt::Display) -> Self {
        ScanError::MalformedTarget {
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// Create a Command that hides the console window on Windows.
pub(crate) fn hidden_command(program: &str) -> Command {
    let mut cmd = Command::new(program);
    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }
    cmd
}
