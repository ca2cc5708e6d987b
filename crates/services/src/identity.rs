//! # Identity Hasher
//!
//! Derives a pseudonymous client key from the forwarded-address header so
//! that raw addresses are never stored or logged.

use domains::ClientKey;
use sha2::{Digest, Sha256};

/// Token hashed when no forwarded address is present.
pub const UNKNOWN_CLIENT: &str = "unknown";
/// Length of the truncated hex digest.
pub const CLIENT_KEY_LEN: usize = 16;

/// Builds the client key from a raw `X-Forwarded-For` value.
///
/// Only the first (left-most) address counts; it is the one the edge proxy
/// saw as the original client. Only an absent header falls back to
/// [`UNKNOWN_CLIENT`]; a blank first entry is hashed as the empty string.
pub fn client_key(forwarded_for: Option<&str>) -> ClientKey {
    let address = forwarded_for
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .unwrap_or(UNKNOWN_CLIENT);

    ClientKey::new(ip_hash(address))
}

/// SHA-256 of the address, hex encoded and truncated.
pub fn ip_hash(address: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(address.as_bytes());
    let hash = hex::encode(hasher.finalize());
    hash[..CLIENT_KEY_LEN].to_string()
}
