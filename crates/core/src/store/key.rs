//! Content-addressed cache key generation.

use sha2::{Digest, Sha256};

/// Compute the store key for a request.
///
/// Identity is `(method, url)` only; requests that differ solely in
/// headers share a key, matching usual cache-matching semantics.
pub fn compute_cache_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
