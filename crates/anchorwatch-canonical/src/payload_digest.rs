//! Content fingerprints for stored event payloads.
//!
//! Digests are computed as `sha256(domain_separator || canonical_bytes(payload))`
//! over the full payload, signature included, so two submissions share a digest
//! only when they are byte-for-byte the same signed claim.

use crate::{Canonicalizer, Digest};
use serde_json::Value;

/// Domain separator for payload digests: `b"anchorwatch:payload:v1\0"`.
const PAYLOAD_DOMAIN_SEPARATOR: &[u8] = b"anchorwatch:payload:v1\0";

/// Computes the fingerprint of a raw event payload.
///
/// # Errors
///
/// Returns [`PayloadDigestError`] if the payload cannot be canonicalized.
pub fn compute_payload_digest(
    payload: &Value,
    canonicalizer: &Canonicalizer,
) -> Result<Digest, PayloadDigestError> {
    let bytes = canonicalizer.canonicalize(payload)?;
    Ok(Digest::sha256_with_domain(PAYLOAD_DOMAIN_SEPARATOR, &bytes))
}

/// Error during payload digest computation.
#[derive(thiserror::Error, Debug)]
pub enum PayloadDigestError {
    /// Canonicalization failed.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] crate::CanonicalizationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn digest_ignores_member_order_but_covers_signature() {
        let canonicalizer = Canonicalizer::default();
        let a = json!({"anchor_id": "A-1", "signature": "s1", "seal_id": "S-1"});
        let b = json!({"seal_id": "S-1", "signature": "s1", "anchor_id": "A-1"});
        let c = json!({"seal_id": "S-1", "signature": "s2", "anchor_id": "A-1"});

        let da = compute_payload_digest(&a, &canonicalizer).unwrap();
        let db = compute_payload_digest(&b, &canonicalizer).unwrap();
        let dc = compute_payload_digest(&c, &canonicalizer).unwrap();

        assert_eq!(da, db);
        assert_ne!(da, dc);
        assert_eq!(da.b64.len(), 43);
    }
}
