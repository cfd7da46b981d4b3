//! Content fingerprint
//!
//! Non-cryptographic: 64-bit xxh3 over the canonical content text, rendered
//! as 16 lowercase hex digits. Used for identity checks only.

use xxhash_rust::xxh3::xxh3_64;

/// Compute the checksum of a content text
pub fn content_checksum(text: &str) -> String {
    xxh3_hex(text.as_bytes())
}

/// Compute the xxh3 hex digest of raw bytes
pub fn xxh3_hex(data: &[u8]) -> String {
    format!("{:016x}", xxh3_64(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_stable_and_fixed_width() {
        let a = content_checksum(r#"{"a":1}"#);
        let b = content_checksum(r#"{"a":1}"#);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_checksum_differs_for_different_content() {
        assert_ne!(content_checksum(r#"{"a":1}"#), content_checksum(r#"{"a":2}"#));
    }
}
