//! scanoip Core Library
//!
//! This crate provides the sweep engine behind the `scanoip` binary:
//! - CIDR target validation and subnet mask arithmetic
//! - Host enumeration (network and broadcast excluded)
//! - Concurrent per-host liveness probing (ping + ARP neighbor lookup)
//! - Probe configuration (environment, config file, defaults)
//!
//! # Example
//!
//! ```no_run
//! use scanoip_core::{config, scanner};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = config::load_scan_config();
//!     let probe = Arc::new(scanner::SystemProbe::new(&config));
//!
//!     let summary = scanner::run_sweep(
//!         "192.168.1.0/24",
//!         probe,
//!         &config,
//!         Arc::new(|event: scanner::SweepEvent| println!("{}", event)),
//!     )
//!     .await?;
//!
//!     println!("Probed {} hosts", summary.hosts_probed);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod scanner;

// Re-export commonly used types
pub use config::ScanConfig;
pub use scanner::{
    NetworkDescriptor, NetworkProbe, ProbeResult, ScanError, SweepEvent, SystemProbe,
};
pub use scanner::sweep::SweepSummary;
