//! Ledger sink for anchor events.
//!
//! The ledger is an external audit log. Forwarding is best effort: callers
//! bound each call with their own deadline and record failures rather than
//! propagating them.

#![deny(missing_docs)]

/// Error types for ledger calls.
pub mod error;
/// HTTP ledger client.
pub mod http;
/// Ledger sink trait.
pub mod sink;

pub use error::LedgerError;
pub use http::{HttpLedger, DEFAULT_TIMEOUT, LEDGER_SOURCE};
pub use sink::{LedgerEntry, LedgerSink};
