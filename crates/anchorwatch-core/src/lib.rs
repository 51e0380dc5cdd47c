//! Event model, verification and anchor state for hardware anchor telemetry.
//!
//! This crate provides:
//! - The five anchor event variants as a closed enum, parsed and validated from raw payloads
//! - The anchor snapshot and its trust states
//! - Ed25519 verification against a manufacturer key registry
//! - The state machine that folds events into anchor snapshots
//! - The write-once event record kept for audit
//!
//! Core invariants:
//! - A payload is validated before any cryptographic work
//! - Signatures cover the canonical payload without its `signature` member
//! - `current_seal_id` is present if and only if the anchor is SEALED
//! - Folding never fails; unverified, stale or revoked inputs are recorded but ignored
//!
#![deny(missing_docs)]

/// Anchor snapshots and trust states.
pub mod anchor;
/// Error types for core operations.
pub mod errors;
/// Event types and payload validation.
pub mod events;
/// Stored event records.
pub mod record;
/// Manufacturer key lookup.
pub mod registry;
/// Signature verification.
pub mod signature;
/// Anchor state machine.
pub mod transition;

pub use anchor::{Anchor, AnchorStatus, CertificationTier, Revocation};
pub use errors::{EventError, RegistryError, SettleError};
pub use events::{
    AnchorEvent, AnchorRegistered, CustodyDirection, CustodySignal, EnvironmentalAlert,
    EnvironmentalMetric, EventBody, EventEnvelope, EventType, GeoCoordinate, SealArmed,
    SealBroken, TriggerType, DEFAULT_SCHEMA_VERSION, LAT_E7_LIMIT, LON_E7_LIMIT,
};
pub use record::{EventRecord, LedgerSync, NewEventRecord};
pub use registry::{KeyRegistry, StaticKeyRegistry};
pub use signature::{
    check_signature, RejectReason, SignatureVerifier, Verification, VerificationOutcome,
    VerifierPolicy,
};
pub use transition::{
    fold, Disposition, Effect, EventOrdering, FoldContext, IgnoreReason, Transition,
    TransitionPolicy,
};
