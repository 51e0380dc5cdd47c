use anchorwatch_canonical::{HardwareId, PayloadDigestError};
use anchorwatch_core::EventError;
use anchorwatch_store::StoreError;
use thiserror::Error;

/// Reasons a submission or revocation fails.
///
/// Ledger problems never surface here; they are recorded on the event.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Payload failed structural or range checks; nothing was stored.
    #[error("invalid event: {0}")]
    Validation(#[from] EventError),
    /// Payload cannot be canonicalized; nothing was stored.
    #[error("payload cannot be canonicalized: {0}")]
    Canonicalization(#[from] PayloadDigestError),
    /// The atomic event and anchor write failed.
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
    /// No anchor with this hardware id exists.
    #[error("unknown anchor {0}")]
    UnknownAnchor(HardwareId),
}

impl IngestError {
    /// Whether the caller sent a bad payload, as opposed to a server-side failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, IngestError::Validation(_) | IngestError::Canonicalization(_))
    }

    /// Offending field, when one can be named.
    pub fn field(&self) -> Option<&str> {
        match self {
            IngestError::Validation(e) => e.field(),
            _ => None,
        }
    }
}
