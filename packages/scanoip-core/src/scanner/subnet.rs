//! Subnet mask arithmetic
//!
//! Masks are checked against an explicit table of the 33 canonical IPv4 masks
//! rather than derived from the prefix, so a malformed mask is rejected before
//! any host is enumerated.

use super::ScanError;

/// Canonical masks indexed by prefix length, with the block size they cover.
const CANONICAL_MASKS: [(&str, u64); 33] = [
    ("0.0.0.0", 4_294_967_296),       // 00
    ("128.0.0.0", 2_147_483_648),     // 01
    ("192.0.0.0", 1_073_741_824),     // 02
    ("224.0.0.0", 536_870_912),       // 03
    ("240.0.0.0", 268_435_456),       // 04
    ("248.0.0.0", 134_217_728),       // 05
    ("252.0.0.0", 67_108_864),        // 06
    ("254.0.0.0", 33_554_432),        // 07
    ("255.0.0.0", 16_777_216),        // 08
    ("255.128.0.0", 8_388_608),       // 09
    ("255.192.0.0", 4_194_304),       // 10
    ("255.224.0.0", 2_097_152),       // 11
    ("255.240.0.0", 1_048_576),       // 12
    ("255.248.0.0", 524_288),         // 13
    ("255.252.0.0", 262_144),         // 14
    ("255.254.0.0", 131_072),         // 15
    ("255.255.0.0", 65_536),          // 16
    ("255.255.128.0", 32_768),        // 17
    ("255.255.192.0", 16_384),        // 18
    ("255.255.224.0", 8_192),         // 19
    ("255.255.240.0", 4_096),         // 20
    ("255.255.248.0", 2_048),         // 21
    ("255.255.252.0", 1_024),         // 22
    ("255.255.254.0", 512),           // 23
    ("255.255.255.0", 256),           // 24
    ("255.255.255.128", 128),         // 25
    ("255.255.255.192", 64),          // 26
    ("255.255.255.224", 32),          // 27
    ("255.255.255.240", 16),          // 28
    ("255.255.255.248", 8),           // 29
    ("255.255.255.252", 4),           // 30
    ("255.255.255.254", 2),           // 31
    ("255.255.255.255", 1),           // 32
];

/// Upper bound on the bits of a built mask; anything past 32 is already invalid.
const MAX_MASK_BITS: u32 = 40;

/// Build the dotted mask for a prefix length.
///
/// The mask is `prefix` one-bits followed by zero-bits up to 32, read as 8-bit
/// fields. A prefix above 32 yields more than four fields (at most five, the
/// one-bits stop at 40); the result is not validated here, see [`is_valid_mask`].
pub fn mask_from_prefix_length(prefix: u32) -> String {
    let ones = prefix.min(MAX_MASK_BITS);
    let zeros = 32u32.saturating_sub(ones);
    let bits: Vec<u8> = std::iter::repeat_n(1u8, ones as usize)
        .chain(std::iter::repeat_n(0u8, zeros as usize))
        .collect();

    bits.chunks(8)
        .map(|field| {
            field
                .iter()
                .fold(0u16, |acc, bit| (acc << 1) | u16::from(*bit))
                .to_string()
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Check whether `mask` is one of the 33 canonical IPv4 masks.
pub fn is_valid_mask(mask: &str) -> bool {
    CANONICAL_MASKS.iter().any(|(canonical, _)| *canonical == mask)
}

/// Number of addresses covered by `mask`, network and broadcast included.
pub fn usable_address_count(mask: &str) -> Result<u64, ScanError> {
    CANONICAL_MASKS
        .iter()
        .find(|(canonical, _)| *canonical == mask)
        .map(|(_, count)| *count)
        .ok_or_else(|| ScanError::InvalidMask(mask.to_string()))
}

/// Prefix length of a canonical mask.
pub fn prefix_length_of(mask: &str) -> Option<u8> {
    CANONICAL_MASKS
        .iter()
        .position(|(canonical, _)| *canonical == mask)
        .and_then(|idx| u8::try_from(idx).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_prefix_builds_its_canonical_mask() {
        for (prefix, (expected, _)) in CANONICAL_MASKS.iter().enumerate() {
            let mask = mask_from_prefix_length(prefix as u32);
            assert_eq!(&mask, expected, "prefix /{}", prefix);
            assert!(is_valid_mask(&mask));
        }
    }

    #[test]
    fn test_documented_masks() {
        assert_eq!(mask_from_prefix_length(0), "0.0.0.0");
        assert_eq!(mask_from_prefix_length(2), "192.0.0.0");
        assert_eq!(mask_from_prefix_length(10), "255.192.0.0");
        assert_eq!(mask_from_prefix_length(24), "255.255.255.0");
        assert_eq!(mask_from_prefix_length(27), "255.255.255.224");
        assert_eq!(mask_from_prefix_length(32), "255.255.255.255");
    }

    #[test]
    fn test_prefix_above_32_is_malformed() {
        let mask = mask_from_prefix_length(33);
        assert_eq!(mask, "255.255.255.255.1");
        assert!(!is_valid_mask(&mask));
    }

    #[test]
    fn test_huge_prefix_stays_small() {
        let mask = mask_from_prefix_length(u32::MAX);
        assert_eq!(mask, "255.255.255.255.255");
        assert!(!is_valid_mask(&mask));
        assert_eq!(mask_from_prefix_length(4_000_000_000), mask);
    }

    #[test]
    fn test_non_canonical_masks_rejected() {
        for mask in ["255.255.255.1", "255.0.255.0", "196.0.0.0", "255.255.255", "", "abc"] {
            assert!(!is_valid_mask(mask), "{} should be invalid", mask);
            assert!(matches!(
                usable_address_count(mask),
                Err(ScanError::InvalidMask(m)) if m == mask
            ));
        }
    }

    #[test]
    fn test_usable_address_count() {
        assert_eq!(usable_address_count("255.255.255.0").unwrap(), 256);
        assert_eq!(usable_address_count("255.255.0.0").unwrap(), 65_536);
        assert_eq!(usable_address_count("255.255.255.252").unwrap(), 4);
        assert_eq!(usable_address_count("0.0.0.0").unwrap(), 4_294_967_296);
    }

    #[test]
    fn test_prefix_length_of() {
        assert_eq!(prefix_length_of("255.255.255.0"), Some(24));
        assert_eq!(prefix_length_of("0.0.0.0"), Some(0));
        assert_eq!(prefix_length_of("255.255.255.1"), None);
    }
}
