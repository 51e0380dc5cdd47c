//! Ed25519 verification of anchor event signatures.

use anchorwatch_canonical::{Canonicalizer, ManufacturerId};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use ed25519_dalek::{Signature, VerifyingKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::registry::KeyRegistry;

/// Verification policy knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierPolicy {
    /// Accept events whose manufacturer key cannot be resolved.
    ///
    /// Off by default. Turning it on accepts unsigned claims from any anchor
    /// whose manufacturer is not provisioned, so it belongs in development
    /// deployments only.
    pub allow_unknown_manufacturer: bool,
}

/// Why a signature was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// No manufacturer could be associated with the event.
    MissingManufacturer,
    /// The manufacturer has no registered key.
    UnknownManufacturer(String),
    /// The public key is not valid base64 or not a valid Ed25519 point.
    MalformedKey,
    /// The signature is not valid base64 or not 64 bytes.
    MalformedSignature,
    /// The payload could not be canonicalized.
    Canonicalization(String),
    /// The cryptographic check failed.
    BadSignature,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingManufacturer => write!(f, "no manufacturer for event"),
            RejectReason::UnknownManufacturer(m) => write!(f, "no key registered for manufacturer {}", m),
            RejectReason::MalformedKey => write!(f, "malformed public key"),
            RejectReason::MalformedSignature => write!(f, "malformed signature"),
            RejectReason::Canonicalization(e) => write!(f, "canonicalization failed: {}", e),
            RejectReason::BadSignature => write!(f, "signature does not verify"),
        }
    }
}

/// Result of checking one event signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationOutcome {
    /// Signature verified against the resolved key.
    Verified,
    /// No key resolved and the policy allows unknown manufacturers.
    AcceptedUnknownManufacturer,
    /// Signature not accepted.
    Rejected(RejectReason),
}

impl VerificationOutcome {
    /// Whether the event counts as verified.
    pub fn is_verified(&self) -> bool {
        !matches!(self, VerificationOutcome::Rejected(_))
    }
}

/// Outcome plus the key that was used, if one resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    /// Verification result.
    pub outcome: VerificationOutcome,
    /// Base64 public key that resolved from the registry.
    pub public_key: Option<String>,
}

/// Checks a base64 Ed25519 signature over `message` with a base64 public key.
///
/// Uses strict verification, which rejects non-canonical signatures and
/// small-order keys.
pub fn check_signature(message: &[u8], signature_b64: &str, public_key_b64: &str) -> Result<(), RejectReason> {
    let key_bytes = B64
        .decode(public_key_b64.as_bytes())
        .map_err(|_| RejectReason::MalformedKey)?;
    let key_bytes: [u8; 32] = key_bytes
        .as_slice()
        .try_into()
        .map_err(|_| RejectReason::MalformedKey)?;
    let key = VerifyingKey::from_bytes(&key_bytes).map_err(|_| RejectReason::MalformedKey)?;

    let sig_bytes = B64
        .decode(signature_b64.as_bytes())
        .map_err(|_| RejectReason::MalformedSignature)?;
    let signature = Signature::from_slice(&sig_bytes).map_err(|_| RejectReason::MalformedSignature)?;

    key.verify_strict(message, &signature)
        .map_err(|_| RejectReason::BadSignature)
}

/// Verifies event payloads against manufacturer keys.
#[derive(Clone)]
pub struct SignatureVerifier {
    registry: Arc<dyn KeyRegistry>,
    canonicalizer: Canonicalizer,
    policy: VerifierPolicy,
}

impl SignatureVerifier {
    /// Creates a verifier over an injected registry.
    pub fn new(registry: Arc<dyn KeyRegistry>, policy: VerifierPolicy) -> Self {
        Self {
            registry,
            canonicalizer: Canonicalizer::default(),
            policy,
        }
    }

    /// Replaces the canonicalizer used to build signed bytes.
    pub fn with_canonicalizer(mut self, canonicalizer: Canonicalizer) -> Self {
        self.canonicalizer = canonicalizer;
        self
    }

    /// Active policy.
    pub fn policy(&self) -> VerifierPolicy {
        self.policy
    }

    /// Returns true only if `signature` verifies over `payload` with `public_key`.
    pub fn verify(&self, payload: &Value, signature: &str, public_key: &str) -> bool {
        self.check(payload, signature, public_key).is_verified()
    }

    /// Like [`verify`](Self::verify) but reports why a signature was rejected.
    pub fn check(&self, payload: &Value, signature: &str, public_key: &str) -> VerificationOutcome {
        let message = match self.canonicalizer.signing_bytes(payload) {
            Ok(bytes) => bytes,
            Err(e) => return VerificationOutcome::Rejected(RejectReason::Canonicalization(e.to_string())),
        };
        match check_signature(&message, signature, public_key) {
            Ok(()) => VerificationOutcome::Verified,
            Err(reason) => VerificationOutcome::Rejected(reason),
        }
    }

    /// Resolves the manufacturer key and verifies; fails closed unless the
    /// policy allows unknown manufacturers.
    pub fn verify_for_manufacturer(
        &self,
        payload: &Value,
        signature: &str,
        manufacturer_id: Option<&ManufacturerId>,
    ) -> bool {
        self.check_for_manufacturer(payload, signature, manufacturer_id)
            .outcome
            .is_verified()
    }

    /// Like [`verify_for_manufacturer`](Self::verify_for_manufacturer) but also
    /// returns the outcome detail and the resolved key.
    pub fn check_for_manufacturer(
        &self,
        payload: &Value,
        signature: &str,
        manufacturer_id: Option<&ManufacturerId>,
    ) -> Verification {
        let resolved = manufacturer_id.map(|m| (m, self.registry.lookup(m)));

        let (manufacturer, public_key) = match resolved {
            Some((m, Some(key))) => (m, key),
            unresolved => {
                let reason = match unresolved {
                    Some((m, None)) => RejectReason::UnknownManufacturer(m.to_string()),
                    _ => RejectReason::MissingManufacturer,
                };
                let outcome = if self.policy.allow_unknown_manufacturer {
                    tracing::warn!(%reason, "accepting event without a resolvable key");
                    VerificationOutcome::AcceptedUnknownManufacturer
                } else {
                    VerificationOutcome::Rejected(reason)
                };
                return Verification {
                    outcome,
                    public_key: None,
                };
            }
        };

        let outcome = self.check(payload, signature, &public_key);
        if let VerificationOutcome::Rejected(reason) = &outcome {
            tracing::warn!(manufacturer = %manufacturer, %reason, "signature rejected");
        }
        Verification {
            outcome,
            public_key: Some(public_key),
        }
    }
}

impl fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("canonicalizer", &self.canonicalizer)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
