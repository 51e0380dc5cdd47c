use anchorwatch_canonical::HardwareId;
use anchorwatch_core::{Anchor, EventRecord, LedgerSync};
use anchorwatch_journal::{FrameKind, JournalReader, JournalWriter, ReadMode, WriteOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::StoreError;
use crate::filter::RecordFilter;
use crate::index::{check_anchor, Index};
use crate::traits::RecordStore;

#[derive(Serialize)]
struct CommitFrameRef<'a> {
    event: &'a EventRecord,
    anchor: Option<&'a Anchor>,
}

#[derive(Deserialize)]
struct CommitFrame {
    event: EventRecord,
    anchor: Option<Anchor>,
}

#[derive(Serialize, Deserialize)]
struct SettlementFrame {
    event_id: Uuid,
    ledger: LedgerSync,
}

#[derive(Serialize, Deserialize)]
struct AnchorFrame {
    anchor: Anchor,
}

struct Inner {
    writer: JournalWriter,
    index: Index,
}

/// Store persisted to an append-only journal.
///
/// Every mutation is one frame: a commit frame carries the event record and
/// the anchor snapshot together, so a crash can never leave one without the
/// other. The in-memory index is rebuilt by replaying the journal on open.
pub struct JournalStore {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl JournalStore {
    /// Opens or creates a journal-backed store.
    ///
    /// A torn trailing frame left by an interrupted write is an uncommitted
    /// mutation: it is dropped from the file before new frames are appended.
    pub fn open<P: AsRef<Path>>(path: P, options: WriteOptions) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut writer = JournalWriter::open(&path, options)?;
        let mut index = Index::default();

        let mut reader = JournalReader::open(&path, ReadMode::Permissive)?;
        let mut frames = 0usize;
        while let Some((kind, value)) = reader.read_record()? {
            replay(&mut index, kind, value)?;
            frames += 1;
        }

        let valid = reader.position();
        if valid < writer.len() {
            tracing::warn!(
                path = %path.display(),
                valid_len = valid,
                file_len = writer.len(),
                "discarding torn journal tail"
            );
            writer.truncate_to(valid)?;
        }
        tracing::debug!(path = %path.display(), frames, "journal replayed");

        Ok(Self {
            path,
            inner: Mutex::new(Inner { writer, index }),
        })
    }

    /// Journal file location.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn replay(index: &mut Index, kind: FrameKind, value: serde_json::Value) -> Result<(), StoreError> {
    match kind {
        FrameKind::Commit => {
            let frame: CommitFrame = serde_json::from_value(value)?;
            index.check_commit(&frame.event, frame.anchor.as_ref())?;
            index.apply_commit(frame.event, frame.anchor);
        }
        FrameKind::Settlement => {
            let frame: SettlementFrame = serde_json::from_value(value)?;
            let record = index.prepare_settle(frame.event_id, frame.ledger)?;
            index.replace_event(record);
        }
        FrameKind::AnchorSnapshot => {
            let frame: AnchorFrame = serde_json::from_value(value)?;
            check_anchor(&frame.anchor)?;
            index.put_anchor(frame.anchor);
        }
        FrameKind::Unknown(_) => {}
    }
    Ok(())
}

impl RecordStore for JournalStore {
    fn get_anchor(&self, hardware_id: &HardwareId) -> Result<Option<Anchor>, StoreError> {
        Ok(self.inner.lock()?.index.anchor(hardware_id).cloned())
    }

    fn commit(&self, event: &EventRecord, anchor: Option<&Anchor>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock()?;
        inner.index.check_commit(event, anchor)?;

        let frame = serde_json::to_value(CommitFrameRef { event, anchor })?;
        inner.writer.append_record(FrameKind::Commit, &frame)?;
        inner.index.apply_commit(event.clone(), anchor.cloned());
        Ok(())
    }

    fn settle_ledger(&self, event_id: Uuid, outcome: LedgerSync) -> Result<EventRecord, StoreError> {
        let mut inner = self.inner.lock()?;
        let record = inner.index.prepare_settle(event_id, outcome)?;

        let frame = serde_json::to_value(SettlementFrame {
            event_id,
            ledger: record.ledger().clone(),
        })?;
        inner.writer.append_record(FrameKind::Settlement, &frame)?;
        inner.index.replace_event(record.clone());
        Ok(record)
    }

    fn get_event(&self, event_id: Uuid) -> Result<Option<EventRecord>, StoreError> {
        Ok(self.inner.lock()?.index.event(event_id).cloned())
    }

    fn events_for_anchor(
        &self,
        hardware_id: &HardwareId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<EventRecord>, StoreError> {
        Ok(self.inner.lock()?.index.events_for_anchor(hardware_id, limit, offset))
    }

    fn events(&self, filter: &dyn RecordFilter) -> Result<Vec<EventRecord>, StoreError> {
        Ok(self.inner.lock()?.index.events(filter))
    }

    fn anchors(&self) -> Result<Vec<Anchor>, StoreError> {
        Ok(self.inner.lock()?.index.anchors())
    }

    fn upsert_anchor(&self, anchor: &Anchor) -> Result<(), StoreError> {
        check_anchor(anchor)?;
        let mut inner = self.inner.lock()?;
        let frame = serde_json::to_value(AnchorFrame {
            anchor: anchor.clone(),
        })?;
        inner.writer.append_record(FrameKind::AnchorSnapshot, &frame)?;
        inner.index.put_anchor(anchor.clone());
        Ok(())
    }
}
