//! Digest computation for association snapshots.
//!
//! A snapshot digest is a SHA256 hash over the canonical JSON form of the
//! captured records. Record order matters; attribute and field-change order
//! does not (both are kept in sorted maps).

use crate::errors::Result;
use crate::model::EntityRef;
use sha2::{Digest, Sha256};

/// Compute the digest of an ordered record collection.
///
/// ## Returns
///
/// Hex-encoded SHA256 digest (64 characters)
///
/// ## Errors
///
/// Returns `TrackError::Serialization` if JSON serialization fails.
///
/// ## Example
///
/// ```
/// use dirtygraph_core::model::EntityRef;
/// use dirtygraph_core::snapshot::digest::compute_records_digest;
///
/// let records = vec![EntityRef::persisted("LineItem", "li-1").with_attribute("price", 10)];
/// let digest = compute_records_digest(&records).unwrap();
/// assert_eq!(digest.len(), 64);
/// ```
pub fn compute_records_digest(records: &[EntityRef]) -> Result<String> {
    let canonical = serde_json::to_string(records)?;
    Ok(hash_string(&canonical))
}

fn hash_string(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    hex::encode(hasher.finalize())
}
