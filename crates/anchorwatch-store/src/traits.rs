//! Record store collaborator interface.

use anchorwatch_canonical::HardwareId;
use anchorwatch_core::{Anchor, EventRecord, LedgerSync};
use uuid::Uuid;

use crate::error::StoreError;
use crate::filter::RecordFilter;

/// Durable home of anchor snapshots and event records.
///
/// Implementations must make [`commit`](Self::commit) atomic: the event record
/// and the anchor snapshot become visible together or not at all. Callers
/// serialize writes per hardware id; implementations only need to keep their
/// own structures consistent under concurrent access.
pub trait RecordStore: Send + Sync {
    /// Current snapshot of an anchor.
    fn get_anchor(&self, hardware_id: &HardwareId) -> Result<Option<Anchor>, StoreError>;

    /// Stores an event record and, when state changed, the anchor snapshot.
    fn commit(&self, event: &EventRecord, anchor: Option<&Anchor>) -> Result<(), StoreError>;

    /// Moves an event's ledger state out of `Pending`, returning the updated record.
    fn settle_ledger(&self, event_id: Uuid, outcome: LedgerSync) -> Result<EventRecord, StoreError>;

    /// Stored event by id.
    fn get_event(&self, event_id: Uuid) -> Result<Option<EventRecord>, StoreError>;

    /// Events of one anchor, newest first.
    fn events_for_anchor(
        &self,
        hardware_id: &HardwareId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<EventRecord>, StoreError>;

    /// All events matching `filter`, in arrival order.
    fn events(&self, filter: &dyn RecordFilter) -> Result<Vec<EventRecord>, StoreError>;

    /// All anchor snapshots, ordered by hardware id.
    fn anchors(&self) -> Result<Vec<Anchor>, StoreError>;

    /// Replaces an anchor snapshot without an accompanying event.
    fn upsert_anchor(&self, anchor: &Anchor) -> Result<(), StoreError>;
}
