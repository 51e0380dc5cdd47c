use anchorwatch_canonical::{Digest, HardwareId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::SettleError;
use crate::events::EventType;
use crate::signature::VerificationOutcome;
use crate::transition::Disposition;

/// Ledger forwarding state of a stored event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LedgerSync {
    /// Not yet attempted.
    Pending,
    /// Accepted by the ledger.
    Synced {
        /// Identifier assigned by the ledger.
        ledger_event_id: Uuid,
        /// When the ledger accepted it.
        synced_at: DateTime<Utc>,
    },
    /// Forwarding failed or timed out.
    Failed {
        /// Failure detail.
        error: String,
        /// When forwarding was attempted.
        attempted_at: DateTime<Utc>,
    },
    /// No ledger configured.
    Skipped,
}

impl LedgerSync {
    /// Whether the ledger accepted the event.
    pub fn is_synced(&self) -> bool {
        matches!(self, LedgerSync::Synced { .. })
    }
}

/// Stored, write-once audit record of one received event.
///
/// Everything except the ledger state is fixed at ingestion. The ledger state
/// leaves `Pending` exactly once through [`EventRecord::settle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Stored event id.
    pub id: Uuid,
    /// Event type.
    pub event_type: EventType,
    /// Emitting anchor.
    pub hardware_id: HardwareId,
    /// Asset from the event, or from the anchor it was folded into.
    pub asset_id: Option<Uuid>,
    /// Payload schema version.
    pub schema_version: String,
    /// Producer-asserted event time.
    pub event_timestamp: DateTime<Utc>,
    /// Server receive time.
    pub received_at: DateTime<Utc>,
    /// Signature as received.
    pub signature: String,
    /// Whether the signature was accepted.
    pub signature_verified: bool,
    /// Verification detail.
    pub verification: VerificationOutcome,
    /// Fingerprint of the full raw payload.
    pub payload_digest: Digest,
    /// Raw payload as received.
    pub payload: Value,
    /// What the state machine did with the event.
    pub disposition: Disposition,
    ledger: LedgerSync,
}

/// Fields of a new record; the ledger state starts `Pending`.
#[derive(Debug, Clone)]
pub struct NewEventRecord {
    /// Stored event id.
    pub id: Uuid,
    /// Event type.
    pub event_type: EventType,
    /// Emitting anchor.
    pub hardware_id: HardwareId,
    /// Asset id, if known.
    pub asset_id: Option<Uuid>,
    /// Payload schema version.
    pub schema_version: String,
    /// Producer-asserted event time.
    pub event_timestamp: DateTime<Utc>,
    /// Server receive time.
    pub received_at: DateTime<Utc>,
    /// Signature as received.
    pub signature: String,
    /// Verification detail.
    pub verification: VerificationOutcome,
    /// Payload fingerprint.
    pub payload_digest: Digest,
    /// Raw payload.
    pub payload: Value,
    /// State machine outcome.
    pub disposition: Disposition,
}

impl From<NewEventRecord> for EventRecord {
    fn from(new: NewEventRecord) -> Self {
        Self {
            id: new.id,
            event_type: new.event_type,
            hardware_id: new.hardware_id,
            asset_id: new.asset_id,
            schema_version: new.schema_version,
            event_timestamp: new.event_timestamp,
            received_at: new.received_at,
            signature: new.signature,
            signature_verified: new.verification.is_verified(),
            verification: new.verification,
            payload_digest: new.payload_digest,
            payload: new.payload,
            disposition: new.disposition,
            ledger: LedgerSync::Pending,
        }
    }
}

impl EventRecord {
    /// Ledger forwarding state.
    pub fn ledger(&self) -> &LedgerSync {
        &self.ledger
    }

    /// True once the ledger state has left `Pending`.
    pub fn processed(&self) -> bool {
        self.ledger != LedgerSync::Pending
    }

    /// Ledger failure detail, if forwarding failed.
    pub fn processing_error(&self) -> Option<&str> {
        match &self.ledger {
            LedgerSync::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Moves the ledger state out of `Pending`.
    pub fn settle(&mut self, outcome: LedgerSync) -> Result<(), SettleError> {
        if self.processed() {
            return Err(SettleError::AlreadySettled);
        }
        if outcome == LedgerSync::Pending {
            return Err(SettleError::NotASettlement);
        }
        self.ledger = outcome;
        Ok(())
    }
}
