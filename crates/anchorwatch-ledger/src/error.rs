use std::time::Duration;
use thiserror::Error;

/// Ledger sink failures. The ingestion pipeline records these on the event
/// record and never propagates them.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Transport failure (connection refused, TLS, client timeout).
    #[error("ledger connection error: {0}")]
    Http(#[from] reqwest::Error),
    /// Ledger answered with an unexpected status.
    #[error("ledger returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },
    /// Response body did not have the expected shape.
    #[error("invalid ledger response: {0}")]
    InvalidResponse(String),
    /// The caller's deadline elapsed.
    #[error("ledger call timed out after {0:?}")]
    Timeout(Duration),
}
