//! Reachability check using the system ping command

use super::hidden_command;
use anyhow::{Context, Result};
use std::net::Ipv4Addr;
use std::process::Output;

/// Arguments for `ping` sending `attempts` echo requests to `ip`.
fn ping_args(ip: Ipv4Addr, attempts: u32, wait_secs: Option<u64>) -> Vec<String> {
    let mut args = Vec::with_capacity(5);

    #[cfg(target_os = "windows")]
    {
        args.extend(["-n".to_string(), attempts.to_string()]);
        if let Some(wait) = wait_secs {
            args.extend(["-w".to_string(), wait.saturating_mul(1000).to_string()]);
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        args.extend(["-c".to_string(), attempts.to_string()]);
        if let Some(wait) = wait_secs {
            args.extend(["-W".to_string(), wait.to_string()]);
        }
    }

    args.push(ip.to_string());
    args
}

/// Whether a finished ping run means the host answered.
fn host_replied(output: &Output) -> bool {
    #[cfg(target_os = "windows")]
    {
        // Windows ping exits 0 on "destination host unreachable" replies
        let output_lower = String::from_utf8_lossy(&output.stdout).to_lowercase();
        if output_lower.contains("request timed out")
            || output_lower.contains("destination host unreachable")
            || output_lower.contains("transmit failed")
            || output_lower.contains("general failure")
        {
            return false;
        }
        output.status.success() && output_lower.contains("reply from")
    }

    #[cfg(not(target_os = "windows"))]
    {
        output.status.success()
    }
}

fn run_ping(ip: Ipv4Addr, attempts: u32, wait_secs: Option<u64>) -> Result<Output> {
    hidden_command("ping")
        .args(ping_args(ip, attempts, wait_secs))
        .output()
        .context("Failed to execute ping")
}

/// Ping a single host. Any failure, including a ping binary that can't be
/// started, counts as unreachable.
pub(crate) async fn ping_host(ip: Ipv4Addr, attempts: u32, wait_secs: Option<u64>) -> bool {
    let result = tokio::task::spawn_blocking(move || run_ping(ip, attempts, wait_secs))
        .await
        .context("Ping task panicked");

    match result {
        Ok(Ok(output)) => host_replied(&output),
        Ok(Err(e)) | Err(e) => {
            tracing::debug!("Ping of {} failed: {:#}", ip, e);
            false
        }
    }
}
