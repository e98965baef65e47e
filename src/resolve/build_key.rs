//! Canonical build key computation
//!
//! The build key identifies a resolved descriptor: identical resolved
//! configurations produce identical keys, so downstream pipelines can
//! use it for caching and change detection. Computed with RFC 8785 JSON
//! Canonicalization Scheme (JCS) over the resolved descriptor.

use sha2::{Digest, Sha256};

use super::BuildDescriptor;

/// Build key computation errors
#[derive(Debug, thiserror::Error)]
pub enum BuildKeyError {
    #[error("Canonicalization failed: {0}")]
    Jcs(String),
}

/// Compute the build key for a resolved descriptor
///
/// build_key = SHA-256 hex digest of JCS(descriptor)
pub fn compute_build_key(descriptor: &BuildDescriptor) -> Result<String, BuildKeyError> {
    let jcs_bytes = serde_json_canonicalizer::to_vec(descriptor)
        .map_err(|e| BuildKeyError::Jcs(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(&jcs_bytes);
    Ok(hex::encode(hasher.finalize()))
}
