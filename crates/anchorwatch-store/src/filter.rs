//! Record filtering for listings.

use anchorwatch_canonical::{Digest, HardwareId};
use anchorwatch_core::{EventRecord, EventType};
use chrono::{DateTime, Utc};

/// Predicate over stored event records.
pub trait RecordFilter: Send + Sync {
    /// Returns true if the record matches.
    fn matches(&self, record: &EventRecord) -> bool;
}

/// Matches every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllRecords;

impl RecordFilter for AllRecords {
    fn matches(&self, _record: &EventRecord) -> bool {
        true
    }
}

/// Filter by event type.
#[derive(Debug, Clone)]
pub struct EventTypeFilter {
    /// Event type to match.
    pub event_type: EventType,
}

impl RecordFilter for EventTypeFilter {
    fn matches(&self, record: &EventRecord) -> bool {
        record.event_type == self.event_type
    }
}

/// Filter by emitting anchor.
#[derive(Debug, Clone)]
pub struct HardwareIdFilter {
    /// Hardware id to match.
    pub hardware_id: HardwareId,
}

impl RecordFilter for HardwareIdFilter {
    fn matches(&self, record: &EventRecord) -> bool {
        record.hardware_id == self.hardware_id
    }
}

/// Filter by signature outcome.
#[derive(Debug, Clone)]
pub struct VerifiedFilter {
    /// Required value of `signature_verified`.
    pub verified: bool,
}

impl RecordFilter for VerifiedFilter {
    fn matches(&self, record: &EventRecord) -> bool {
        record.signature_verified == self.verified
    }
}

/// Filter by payload fingerprint; finds resubmissions of one payload.
#[derive(Debug, Clone)]
pub struct PayloadDigestFilter {
    /// Digest to match.
    pub digest: Digest,
}

impl RecordFilter for PayloadDigestFilter {
    fn matches(&self, record: &EventRecord) -> bool {
        record.payload_digest == self.digest
    }
}

/// Filter by producer timestamp.
#[derive(Debug, Clone, Default)]
pub struct TimeRangeFilter {
    /// Include events at or after this instant.
    pub after: Option<DateTime<Utc>>,
    /// Include events at or before this instant.
    pub before: Option<DateTime<Utc>>,
}

impl RecordFilter for TimeRangeFilter {
    fn matches(&self, record: &EventRecord) -> bool {
        let ts = record.event_timestamp;
        self.after.map_or(true, |after| ts >= after) && self.before.map_or(true, |before| ts <= before)
    }
}

/// Composite filter: all filters must match (AND).
#[derive(Default)]
pub struct AndFilter {
    /// Filters to combine with AND logic.
    pub filters: Vec<Box<dyn RecordFilter>>,
}

impl RecordFilter for AndFilter {
    fn matches(&self, record: &EventRecord) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }
}

/// Composite filter: any filter must match (OR).
#[derive(Default)]
pub struct OrFilter {
    /// Filters to combine with OR logic.
    pub filters: Vec<Box<dyn RecordFilter>>,
}

impl RecordFilter for OrFilter {
    fn matches(&self, record: &EventRecord) -> bool {
        self.filters.iter().any(|f| f.matches(record))
    }
}
