//! Content identity.
//!
//! A skill's identity fingerprint is the SHA-256 digest of its document
//! payload. The full 64-character hex digest is authoritative; the first 8
//! characters serve as the human-facing short form used for pin values.

use sha2::{Digest, Sha256};

/// Number of hex characters kept for the short, human-facing hash form.
pub const SHORT_HASH_LEN: usize = 8;

/// Compute the full hex SHA-256 digest of a skill payload.
#[must_use]
pub fn content_hash(payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())
}

/// Truncate a full digest to its 8-character short form.
///
/// Accepts anything shorter than 8 characters unchanged so callers don't
/// have to special-case hand-entered prefixes.
#[must_use]
pub fn short_hash(digest: &str) -> String {
    digest.chars().take(SHORT_HASH_LEN).collect()
}
