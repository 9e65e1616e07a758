//! Hashing utilities shared across Easel crates
//!
//! Payload checksums use SHA-256; the hex digest is persisted alongside each
//! record so the health monitor can detect silent corruption without decoding
//! the stored frame.

use sha2::{Digest, Sha256};

/// Compute the lowercase hex SHA-256 digest of a payload body.
pub fn payload_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Verify a payload body against a stored checksum.
///
/// Comparison is case-insensitive on the hex digits; a malformed stored
/// checksum simply fails verification.
pub fn verify_checksum(bytes: &[u8], stored: &str) -> bool {
    if stored.len() != 64 {
        return false;
    }
    payload_checksum(bytes).eq_ignore_ascii_case(stored)
}
