//! Canonical signing primitives for hardware anchor telemetry.
//!
//! Every byte that an anchor signs, and every identifier that reaches the state
//! machine, is shaped by this crate. Producers and verifiers that agree on
//! [`Canonicalizer::signing_bytes`] agree on what a signature authenticates.
//!
#![deny(missing_docs)]

/// Canonicalization of signing payloads.
pub mod canonicalizer;
/// Digest primitives.
pub mod digest;
/// Bounded identifier newtypes.
pub mod identifiers;
/// Payload fingerprints.
pub mod payload_digest;
/// Validation helpers and errors.
pub mod validation;

pub use canonicalizer::{CanonicalizationError, Canonicalizer, SIGNATURE_FIELD};
pub use digest::{Digest, DigestAlg};
pub use identifiers::{
    CounterpartyKey, FirmwareVersion, HardwareId, HardwareModel, ManufacturerId, MetricReading,
    SealId,
};
pub use payload_digest::{compute_payload_digest, PayloadDigestError};
pub use validation::{check_bounded, check_symmetric_range, ValidationError};
