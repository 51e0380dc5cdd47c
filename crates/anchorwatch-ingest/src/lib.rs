//! Event processing pipeline for signed anchor telemetry.
//!
//! [`EventProcessor::submit`] runs one raw payload through validation,
//! signature verification, the anchor state machine and an atomic store
//! commit, then forwards it to the ledger under a deadline.

#![deny(missing_docs)]

/// Pipeline configuration.
pub mod config;
/// Error types for ingestion.
pub mod error;
/// Per-anchor serialization.
pub mod locks;
/// The processor.
pub mod processor;

pub use config::{IngestConfig, DEFAULT_LEDGER_TIMEOUT};
pub use error::IngestError;
pub use locks::{AnchorGuard, AnchorLocks};
pub use processor::{EventProcessor, Receipt};
