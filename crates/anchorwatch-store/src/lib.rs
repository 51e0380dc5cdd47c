//! Record store for anchor snapshots and event records.
//!
//! This crate provides:
//! - The `RecordStore` trait the ingestion pipeline writes through
//! - An in-memory implementation for tests and dry runs
//! - A journal-backed implementation that replays its file on open
//! - Record filters for listings
//!
//! A commit lands the event record and the anchor snapshot together; the
//! journal backend writes both in a single frame.

#![deny(missing_docs)]

/// Error types for store operations.
pub mod error;
/// Record filtering API.
pub mod filter;
mod index;
/// Journal-backed storage implementation.
pub mod journal;
/// In-memory storage implementation.
pub mod memory;
/// Storage backend trait.
pub mod traits;

pub use anchorwatch_journal::WriteOptions;
pub use error::StoreError;
pub use filter::{
    AllRecords, AndFilter, EventTypeFilter, HardwareIdFilter, OrFilter, PayloadDigestFilter,
    RecordFilter, TimeRangeFilter, VerifiedFilter,
};
pub use journal::JournalStore;
pub use memory::MemoryStore;
pub use traits::RecordStore;
