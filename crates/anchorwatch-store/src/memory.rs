use anchorwatch_canonical::HardwareId;
use anchorwatch_core::{Anchor, EventRecord, LedgerSync};
use std::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::filter::RecordFilter;
use crate::index::{check_anchor, Index};
use crate::traits::RecordStore;

/// Volatile store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    index: RwLock<Index>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn get_anchor(&self, hardware_id: &HardwareId) -> Result<Option<Anchor>, StoreError> {
        Ok(self.index.read()?.anchor(hardware_id).cloned())
    }

    fn commit(&self, event: &EventRecord, anchor: Option<&Anchor>) -> Result<(), StoreError> {
        let mut index = self.index.write()?;
        index.check_commit(event, anchor)?;
        index.apply_commit(event.clone(), anchor.cloned());
        Ok(())
    }

    fn settle_ledger(&self, event_id: Uuid, outcome: LedgerSync) -> Result<EventRecord, StoreError> {
        let mut index = self.index.write()?;
        let record = index.prepare_settle(event_id, outcome)?;
        index.replace_event(record.clone());
        Ok(record)
    }

    fn get_event(&self, event_id: Uuid) -> Result<Option<EventRecord>, StoreError> {
        Ok(self.index.read()?.event(event_id).cloned())
    }

    fn events_for_anchor(
        &self,
        hardware_id: &HardwareId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<EventRecord>, StoreError> {
        Ok(self.index.read()?.events_for_anchor(hardware_id, limit, offset))
    }

    fn events(&self, filter: &dyn RecordFilter) -> Result<Vec<EventRecord>, StoreError> {
        Ok(self.index.read()?.events(filter))
    }

    fn anchors(&self) -> Result<Vec<Anchor>, StoreError> {
        Ok(self.index.read()?.anchors())
    }

    fn upsert_anchor(&self, anchor: &Anchor) -> Result<(), StoreError> {
        check_anchor(anchor)?;
        self.index.write()?.put_anchor(anchor.clone());
        Ok(())
    }
}
