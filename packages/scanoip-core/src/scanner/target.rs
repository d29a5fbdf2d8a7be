//! CIDR target validation and host enumeration

use super::ScanError;
use super::subnet::{is_valid_mask, mask_from_prefix_length, prefix_length_of, usable_address_count};
use ipnetwork::Ipv4Network;
use serde::Serialize;
use std::net::{Ipv4Addr, Ipv6Addr};

/// A validated IPv4 network derived from a CIDR target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkDescriptor {
    /// Network address with all host bits zeroed
    pub network: Ipv4Addr,
    pub prefix: u8,
    pub mask: String,
    /// Addresses in the block, network and broadcast included
    pub usable_count: u64,
}

impl NetworkDescriptor {
    /// Number of addresses the sweep will probe.
    pub fn host_count(&self) -> u64 {
        host_count(self.usable_count)
    }

    /// Iterate the addresses the sweep will probe.
    pub fn hosts(&self) -> HostIter {
        enumerate_hosts(self.network, self.usable_count)
    }
}

impl std::fmt::Display for NetworkDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

/// Split a target into its address and prefix parts without validating them.
fn split_target(target: &str) -> Result<(&str, &str), ScanError> {
    target
        .trim()
        .split_once('/')
        .ok_or_else(|| ScanError::malformed(target, "missing '/<prefix length>'"))
}

/// Parse and validate a CIDR target, returning the address it names and its prefix.
pub fn validate_cidr_target(target: &str) -> Result<(Ipv4Addr, u8), ScanError> {
    let (host, prefix) = split_target(target)?;

    if host.parse::<Ipv6Addr>().is_ok() {
        return Err(ScanError::NotIpv4(host.to_string()));
    }

    let addr: Ipv4Addr = host
        .parse()
        .map_err(|e: std::net::AddrParseError| ScanError::malformed(target, e))?;

    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ScanError::malformed(target, "prefix length must be decimal digits"));
    }

    let prefix: u32 = prefix
        .parse()
        .map_err(|e: std::num::ParseIntError| ScanError::malformed(target, e))?;

    let mask = mask_from_prefix_length(prefix);
    if !is_valid_mask(&mask) {
        return Err(ScanError::InvalidMask(mask));
    }

    let prefix = prefix_length_of(&mask).ok_or(ScanError::InvalidMask(mask))?;
    Ok((addr, prefix))
}

/// Predicate form of [`validate_cidr_target`]; failures are logged.
pub fn is_valid_cidr_target(target: &str) -> bool {
    match validate_cidr_target(target) {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("Rejected target {:?}: {}", target, e);
            false
        }
    }
}

/// Resolve the address portion of a target.
///
/// Only IPv4 literals are accepted, so resolution never touches DNS.
pub fn resolve_target_address(target: &str) -> Result<Ipv4Addr, ScanError> {
    let (host, _) = split_target(target)?;
    host.parse().map_err(|e: std::net::AddrParseError| ScanError::AddressResolution {
        host: host.to_string(),
        reason: e.to_string(),
    })
}

/// Derive the network descriptor (host bits zeroed) for a target.
pub fn derive_network(target: &str) -> Result<NetworkDescriptor, ScanError> {
    let (addr, prefix) = validate_cidr_target(target)?;
    let net = Ipv4Network::new(addr, prefix).map_err(|e| ScanError::malformed(target, e))?;
    let mask = net.mask().to_string();
    let usable_count = usable_address_count(&mask)?;

    Ok(NetworkDescriptor {
        network: net.network(),
        prefix,
        mask,
        usable_count,
    })
}

/// Addresses probed for a block of `usable_count` addresses.
///
/// Network and broadcast are excluded. A /31 keeps both of its addresses and a
/// /32 its single one.
fn host_count(usable_count: u64) -> u64 {
    match usable_count {
        0..=2 => usable_count,
        n => n - 2,
    }
}

/// Lazy iterator over the host addresses of a network.
///
/// Offsets are added to the full 32-bit address so they carry across octets.
/// Cloning yields an independent iterator from the same position.
#[derive(Debug, Clone)]
pub struct HostIter {
    base: u64,
    next: u64,
    end: u64,
}

impl Iterator for HostIter {
    type Item = Ipv4Addr;

    fn next(&mut self) -> Option<Ipv4Addr> {
        if self.next >= self.end {
            return None;
        }
        let value = u32::try_from(self.base + self.next).ok()?;
        self.next += 1;
        Some(Ipv4Addr::from(value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.end.saturating_sub(self.next)).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

/// Enumerate the host addresses of `network` for a block of `usable_count` addresses.
pub fn enumerate_hosts(network: Ipv4Addr, usable_count: u64) -> HostIter {
    let (start, end) = match usable_count {
        0..=2 => (0, usable_count),
        n => (1, n - 1),
    };
    HostIter {
        base: u64::from(u32::from(network)),
        next: start,
        end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slash_24_target() {
        assert!(is_valid_cidr_target("192.168.1.0/24"));

        let net = derive_network("192.168.1.0/24").unwrap();
        assert_eq!(net.network, Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(net.mask, "255.255.255.0");
        assert_eq!(net.usable_count, 256);
        assert_eq!(net.host_count(), 254);

        let hosts: Vec<Ipv4Addr> = net.hosts().collect();
        assert_eq!(hosts.len(), 254);
        assert_eq!(hosts[0], Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(hosts[253], Ipv4Addr::new(192, 168, 1, 254));
    }

    #[test]
    fn test_host_bits_are_zeroed() {
        let net = derive_network("10.20.30.77/27").unwrap();
        assert_eq!(net.network, Ipv4Addr::new(10, 20, 30, 64));
        assert_eq!(net.to_string(), "10.20.30.64/27");
        let hosts: Vec<Ipv4Addr> = net.hosts().collect();
        assert_eq!(hosts.first(), Some(&Ipv4Addr::new(10, 20, 30, 65)));
        assert_eq!(hosts.last(), Some(&Ipv4Addr::new(10, 20, 30, 94)));
    }

    #[test]
    fn test_invalid_prefix_rejected() {
        assert!(matches!(
            validate_cidr_target("192.168.1.5/33"),
            Err(ScanError::InvalidMask(_))
        ));
        assert!(matches!(
            validate_cidr_target("192.168.1.5/abc"),
            Err(ScanError::MalformedTarget { .. })
        ));
        assert!(!is_valid_cidr_target("192.168.1.5/-1"));
        assert!(matches!(
            validate_cidr_target("192.168.1.0/+24"),
            Err(ScanError::MalformedTarget { .. })
        ));
        assert!(matches!(
            validate_cidr_target("192.168.1.0/"),
            Err(ScanError::MalformedTarget { .. })
        ));
        assert!(!is_valid_cidr_target("192.168.1.5"));
    }

    #[test]
    fn test_huge_prefix_rejected_quickly() {
        let start = std::time::Instant::now();
        assert!(matches!(
            validate_cidr_target("192.168.1.0/4294967295"),
            Err(ScanError::InvalidMask(_))
        ));
        assert!(matches!(
            validate_cidr_target("192.168.1.0/4000000000"),
            Err(ScanError::InvalidMask(_))
        ));
        assert!(start.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_ipv6_rejected_as_not_ipv4() {
        let err = validate_cidr_target("fe80::1/64").unwrap_err();
        assert!(matches!(err, ScanError::NotIpv4(ref a) if a == "fe80::1"));
        assert!(err.to_string().contains("not an IPv4 address"));
    }

    #[test]
    fn test_malformed_address_rejected() {
        assert!(matches!(
            validate_cidr_target("192.168.1/24"),
            Err(ScanError::MalformedTarget { .. })
        ));
        assert!(matches!(
            validate_cidr_target("router.local/24"),
            Err(ScanError::MalformedTarget { .. })
        ));
    }

    #[test]
    fn test_resolve_target_address() {
        assert_eq!(
            resolve_target_address("192.168.1.9/24").unwrap(),
            Ipv4Addr::new(192, 168, 1, 9)
        );
        assert!(matches!(
            resolve_target_address("nope/24"),
            Err(ScanError::AddressResolution { .. })
        ));
    }

    #[test]
    fn test_enumeration_carries_across_octets() {
        let net = derive_network("172.16.0.0/16").unwrap();
        assert_eq!(net.host_count(), 65_534);

        let mut hosts = net.hosts();
        assert_eq!(hosts.nth(254), Some(Ipv4Addr::new(172, 16, 0, 255)));
        assert_eq!(hosts.next(), Some(Ipv4Addr::new(172, 16, 1, 0)));
        assert_eq!(net.hosts().last(), Some(Ipv4Addr::new(172, 16, 255, 254)));
    }

    #[test]
    fn test_enumeration_is_restartable() {
        let hosts = enumerate_hosts(Ipv4Addr::new(192, 168, 1, 0), 8);
        let first: Vec<_> = hosts.clone().collect();
        let second: Vec<_> = hosts.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
    }

    #[test]
    fn test_point_to_point_and_host_routes() {
        let p2p = derive_network("10.0.0.1/31").unwrap();
        assert_eq!(p2p.host_count(), 2);
        assert_eq!(
            p2p.hosts().collect::<Vec<_>>(),
            vec![Ipv4Addr::new(10, 0, 0, 0), Ipv4Addr::new(10, 0, 0, 1)]
        );

        let host = derive_network("10.0.0.7/32").unwrap();
        assert_eq!(host.host_count(), 1);
        assert_eq!(host.hosts().collect::<Vec<_>>(), vec![Ipv4Addr::new(10, 0, 0, 7)]);

        let tiny = derive_network("10.0.0.4/30").unwrap();
        assert_eq!(tiny.hosts().count(), 2);
    }

    #[test]
    fn test_whole_address_space() {
        let net = derive_network("0.0.0.0/0").unwrap();
        assert_eq!(net.host_count(), 4_294_967_294);
        let mut hosts = net.hosts();
        assert_eq!(hosts.next(), Some(Ipv4Addr::new(0, 0, 0, 1)));
        assert_eq!(net.hosts().size_hint().0 as u64, 4_294_967_294);
    }
}
