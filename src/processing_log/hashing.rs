//! Deterministic content hashes for unnamed intermediate targets.
//!
//! The canonical input is the compact JSON encoding of `[operation, [parents...]]`,
//! e.g. `["+",["a","b"]]`. The hash is the first `HASH_LENGTH` lowercase hex
//! characters of its SHA-256 digest. Parent order is significant.
use sha2::{Digest as _, Sha256};

/// Number of hex characters kept from the digest.
pub const HASH_LENGTH: usize = 10;

/// Hashes an operation and its ordered parent targets.
pub fn target_hash<S: AsRef<str>>(operation: &str, parents: &[S]) -> String {
    let parents: Vec<&str> = parents.iter().map(AsRef::as_ref).collect();
    let canonical = serde_json::json!([operation, parents]).to_string();
    let digest = Sha256::digest(canonical.as_bytes());
    let mut hex = format!("{digest:x}");
    hex.truncate(HASH_LENGTH);
    hex
}

/// Builds the `{variable}#{hash}` target of a derived state.
pub fn derived_target<S: AsRef<str>>(variable: &str, operation: &str, parents: &[S]) -> String {
    format!("{}#{}", variable, target_hash(operation, parents))
}

/// Whether a target names an intermediate state rather than a declared column.
pub fn is_derived_target(target: &str) -> bool {
    target.contains('#')
}
