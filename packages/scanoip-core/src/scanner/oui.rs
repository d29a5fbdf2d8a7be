//! MAC OUI (Organizationally Unique Identifier) vendor lookup
//!
//! Uses the IEEE OUI database to name the manufacturer behind a link-layer
//! address found for a reachable host.

/// Lookup the vendor/manufacturer name for a MAC address.
///
/// # Arguments
/// * `mac` - MAC address as printed by `arp` (e.g., "a4:91:b1:0c:22:7e", "0:1b:63:84:45:e6")
///
/// # Returns
/// * `Some(vendor_name)` if found in the OUI database
/// * `Some("Locally administered")` for randomized or virtual addresses
/// * `None` if the MAC address is invalid or not found
pub fn lookup_vendor(mac: &str) -> Option<String> {
    let normalized = normalize_mac(mac)?;

    match oui_data::lookup(&normalized) {
        Some(record) => {
            let vendor_name = record.organization().to_string();
            tracing::debug!("OUI lookup for {}: found {}", mac, vendor_name);
            Some(vendor_name)
        }
        None if is_locally_administered(&normalized) => {
            Some("Locally administered".to_string())
        }
        None => {
            tracing::debug!("OUI lookup for {}: not found in database", mac);
            None
        }
    }
}

/// Normalize a MAC address to the format XX:XX:XX:XX:XX:XX
///
/// Groups may be unpadded (`0:1b:...`) and separated by `:` or `-`.
fn normalize_mac(mac: &str) -> Option<String> {
    let groups: Vec<&str> = mac.trim().split([':', '-']).collect();
    if groups.len() != 6 {
        return None;
    }

    let mut octets = Vec::with_capacity(6);
    for group in groups {
        if group.is_empty() || group.len() > 2 {
            return None;
        }
        let octet = u8::from_str_radix(group, 16).ok()?;
        octets.push(format!("{:02X}", octet));
    }

    Some(octets.join(":"))
}

/// Whether the locally-administered bit of the first octet is set.
///
/// Randomized phone addresses and most VM/container NICs fall in this range
/// and never appear in the OUI registry.
fn is_locally_administered(normalized: &str) -> bool {
    normalized
        .get(0..2)
        .and_then(|first| u8::from_str_radix(first, 16).ok())
        .is_some_and(|octet| octet & 0x02 != 0)
}
