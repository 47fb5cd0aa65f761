//! Checksum utilities for snapshot verification

use sha2::{Digest, Sha256};

/// SHA-256 of an in-memory buffer, hex encoded
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const HELLO_WORLD_SHA256: &str =
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn test_sha256_hex() {
        assert_eq!(sha256_hex(b"hello world"), HELLO_WORLD_SHA256);
    }

    #[test]
    fn test_digest_changes_with_content() {
        assert_ne!(sha256_hex(b"[]"), sha256_hex(b"[{}]"));
        assert_eq!(sha256_hex(b"").len(), 64);
    }
}
