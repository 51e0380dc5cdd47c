use anchorwatch_canonical::HardwareId;
use anchorwatch_core::{Anchor, EventRecord, LedgerSync};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::error::StoreError;
use crate::filter::RecordFilter;

/// In-memory view shared by both backends.
///
/// Mutation is split into a fallible check and an infallible apply so the
/// journal backend can persist between the two.
#[derive(Debug, Default)]
pub(crate) struct Index {
    anchors: BTreeMap<HardwareId, Anchor>,
    events: Vec<EventRecord>,
    by_id: HashMap<Uuid, usize>,
    by_anchor: HashMap<HardwareId, Vec<usize>>,
}

impl Index {
    pub(crate) fn anchor(&self, hardware_id: &HardwareId) -> Option<&Anchor> {
        self.anchors.get(hardware_id)
    }

    pub(crate) fn event(&self, id: Uuid) -> Option<&EventRecord> {
        self.by_id.get(&id).map(|&pos| &self.events[pos])
    }

    pub(crate) fn check_commit(&self, event: &EventRecord, anchor: Option<&Anchor>) -> Result<(), StoreError> {
        if self.by_id.contains_key(&event.id) {
            return Err(StoreError::DuplicateEvent(event.id));
        }
        if let Some(anchor) = anchor {
            check_anchor(anchor)?;
            if anchor.hardware_id != event.hardware_id {
                return Err(StoreError::Corrupt(format!(
                    "event {} for {} committed with anchor {}",
                    event.id, event.hardware_id, anchor.hardware_id
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn apply_commit(&mut self, event: EventRecord, anchor: Option<Anchor>) {
        let pos = self.events.len();
        self.by_id.insert(event.id, pos);
        self.by_anchor
            .entry(event.hardware_id.clone())
            .or_default()
            .push(pos);
        self.events.push(event);
        if let Some(anchor) = anchor {
            self.anchors.insert(anchor.hardware_id.clone(), anchor);
        }
    }

    /// Returns the settled copy of the record without changing the index.
    pub(crate) fn prepare_settle(&self, id: Uuid, outcome: LedgerSync) -> Result<EventRecord, StoreError> {
        let mut record = self.event(id).cloned().ok_or(StoreError::UnknownEvent(id))?;
        record
            .settle(outcome)
            .map_err(|source| StoreError::Settle { id, source })?;
        Ok(record)
    }

    pub(crate) fn replace_event(&mut self, record: EventRecord) {
        if let Some(&pos) = self.by_id.get(&record.id) {
            self.events[pos] = record;
        }
    }

    pub(crate) fn put_anchor(&mut self, anchor: Anchor) {
        self.anchors.insert(anchor.hardware_id.clone(), anchor);
    }

    pub(crate) fn events_for_anchor(&self, hardware_id: &HardwareId, limit: usize, offset: usize) -> Vec<EventRecord> {
        self.by_anchor
            .get(hardware_id)
            .map(|positions| {
                positions
                    .iter()
                    .rev()
                    .skip(offset)
                    .take(limit)
                    .map(|&pos| self.events[pos].clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn events(&self, filter: &dyn RecordFilter) -> Vec<EventRecord> {
        self.events
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect()
    }

    pub(crate) fn anchors(&self) -> Vec<Anchor> {
        self.anchors.values().cloned().collect()
    }
}

pub(crate) fn check_anchor(anchor: &Anchor) -> Result<(), StoreError> {
    if anchor.is_consistent() {
        Ok(())
    } else {
        Err(StoreError::Corrupt(format!(
            "anchor {} has status {} but seal id {:?}",
            anchor.hardware_id,
            anchor.status(),
            anchor.current_seal_id()
        )))
    }
}
