use anchorwatch_canonical::HardwareId;
use anchorwatch_core::{EventRecord, EventType};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::error::LedgerError;

/// One event as forwarded to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// Event type.
    pub event_type: EventType,
    /// Emitting anchor.
    pub hardware_id: HardwareId,
    /// Bound asset, if known.
    pub asset_id: Option<Uuid>,
    /// Raw payload as received.
    pub payload: Value,
    /// Producer-asserted event time.
    pub event_timestamp: DateTime<Utc>,
}

impl From<&EventRecord> for LedgerEntry {
    fn from(record: &EventRecord) -> Self {
        Self {
            event_type: record.event_type,
            hardware_id: record.hardware_id.clone(),
            asset_id: record.asset_id,
            payload: record.payload.clone(),
            event_timestamp: record.event_timestamp,
        }
    }
}

/// External audit log the pipeline forwards events to, best effort.
#[async_trait]
pub trait LedgerSink: Send + Sync {
    /// Writes one event, returning the ledger's id for it.
    async fn write_event(&self, entry: &LedgerEntry) -> Result<Uuid, LedgerError>;

    /// Reads an anchor's ledger history.
    async fn read_history(
        &self,
        hardware_id: &HardwareId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Value>, LedgerError>;
}
