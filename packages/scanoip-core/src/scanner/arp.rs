//! Link-layer lookup in the system ARP table

use super::hidden_command;
use anyhow::{Context, Result};
use std::net::Ipv4Addr;

fn arp_args(ip: Ipv4Addr) -> [String; 2] {
    #[cfg(target_os = "windows")]
    {
        ["-a".to_string(), ip.to_string()]
    }

    #[cfg(not(target_os = "windows"))]
    {
        ["-n".to_string(), ip.to_string()]
    }
}

fn run_arp(ip: Ipv4Addr) -> Result<String> {
    let output = hidden_command("arp")
        .args(arp_args(ip))
        .output()
        .context("Failed to run arp command")?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Check that a token is a hardware address, e.g. `aa:bb:cc:dd:ee:ff`,
/// `AA-BB-CC-DD-EE-FF` or the unpadded macOS form `0:1b:63:84:45:e6`.
fn is_mac(token: &str) -> bool {
    let parts: Vec<&str> = token.split([':', '-']).collect();
    parts.len() == 6
        && parts
            .iter()
            .all(|p| (1..=2).contains(&p.len()) && p.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Find the MAC bound to `ip` in `arp` output.
///
/// Understands the Linux (`arp -n`), macOS (`arp -n`) and Windows (`arp -a`)
/// layouts. Incomplete and all-zero entries yield `None`.
pub(crate) fn parse_arp_output(output: &str, ip: Ipv4Addr) -> Option<String> {
    let ip_str = ip.to_string();
    let ip_paren = format!("({})", ip_str);

    output
        .lines()
        .filter(|line| {
            line.split_whitespace()
                .any(|token| token == ip_str || token == ip_paren)
        })
        .flat_map(|line| line.split_whitespace())
        .find(|token| is_mac(token))
        .map(|mac| mac.replace('-', ":").to_lowercase())
        .filter(|mac| mac.chars().any(|c| c != '0' && c != ':'))
}

/// Look up the link-layer address of `ip`. Lookup failures yield `None`.
pub(crate) async fn lookup_mac(ip: Ipv4Addr) -> Option<String> {
    let result = tokio::task::spawn_blocking(move || run_arp(ip))
        .await
        .context("ARP task panicked");

    match result {
        Ok(Ok(output)) => parse_arp_output(&output, ip),
        Ok(Err(e)) | Err(e) => {
            tracing::debug!("ARP lookup for {} failed: {:#}", ip, e);
            None
        }
    }
}
