//! scanoip - concurrent liveness sweep of an IPv4 subnet
//!
//! Pings every host of a CIDR block in parallel and prints, for each one,
//! whether it answered and which MAC address the neighbor table holds for it.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use scanoip_core::scanner::{self, EventCallback, SweepEvent};
use scanoip_core::{ScanConfig, config};
use std::sync::Arc;

const BANNER: &str = r"    _____                        ________
   / ___/_________  ____  ____  /  _/ __ \
   \__ \/ ___/ __ `/ __ \/ __ \ / // /_/ /
  ___/ / /__/ /_/ / / / / /_/ // // ____/
 /____/\___/\__,_/_/ /_/\____/___/_/
";

#[derive(Parser)]
#[command(name = "scanoip")]
#[command(version)]
#[command(about = "Scan an IPv4 network for live hosts")]
#[command(long_about = "
scanoip pings every usable address of an IPv4 network in parallel and reports
which hosts answered, along with the MAC address found in the ARP table.

Example:
  scanoip --network 192.168.1.0/24
")]
pub struct Cli {
    /// Network to scan, in CIDR notation (e.g. 192.168.1.0/24)
    #[arg(short = 't', long = "network", value_name = "CIDR")]
    pub network: String,

    /// Echo requests sent to each host (overrides config)
    #[arg(short, long)]
    pub attempts: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Don't print the banner
    #[arg(long)]
    pub no_banner: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// One JSON object per line, for scripting
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("scanoip={},scanoip_core={}", log_level, log_level).into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let scan_config = effective_config(&cli);
    tracing::debug!("Config file: {}", config::get_config_file_path_string());

    if matches!(cli.format, OutputFormat::Text) && !cli.no_banner {
        println!("{}", BANNER);
    }

    let probe = Arc::new(scanner::SystemProbe::new(&scan_config));

    if let Err(e) = scanner::run_sweep(&cli.network, probe, &scan_config, printer(cli.format)).await {
        match cli.format {
            OutputFormat::Text => eprintln!("[ERROR] {}", e),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({
                    "event": "error",
                    "error": e.to_string(),
                }));
            }
        }
        std::process::exit(1);
    }

    Ok(())
}

/// Loaded configuration with command-line overrides applied.
fn effective_config(cli: &Cli) -> ScanConfig {
    let mut scan_config = config::load_scan_config();
    if let Some(attempts) = cli.attempts.filter(|a| *a > 0) {
        scan_config.ping_attempts = attempts;
    }
    scan_config
}

/// Event callback writing each event to stdout as soon as it arrives.
fn printer(format: OutputFormat) -> EventCallback {
    Arc::new(move |event: SweepEvent| match format {
        OutputFormat::Text => println!("{}", event),
        OutputFormat::Json => match serde_json::to_string(&event) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::error!("Failed to serialize event: {}", e),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_network_flag_forms() {
        let long = Cli::try_parse_from(["scanoip", "--network", "192.168.1.0/24"]).unwrap();
        assert_eq!(long.network, "192.168.1.0/24");

        let short = Cli::try_parse_from(["scanoip", "-t", "10.0.0.0/8", "-f", "json"]).unwrap();
        assert_eq!(short.network, "10.0.0.0/8");
        assert!(matches!(short.format, OutputFormat::Json));
    }

    #[test]
    fn test_network_flag_is_required() {
        assert!(Cli::try_parse_from(["scanoip"]).is_err());
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["scanoip", "-V"]).err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
