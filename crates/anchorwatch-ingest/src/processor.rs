use anchorwatch_canonical::{compute_payload_digest, Canonicalizer, HardwareId};
use anchorwatch_core::{
    fold, Anchor, AnchorEvent, AnchorStatus, Disposition, EventRecord, EventType, FoldContext,
    KeyRegistry, LedgerSync, NewEventRecord, SignatureVerifier,
};
use anchorwatch_ledger::{LedgerEntry, LedgerError, LedgerSink};
use anchorwatch_store::RecordStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::locks::AnchorLocks;

/// What the caller learns about an accepted submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    /// Id of the stored event record.
    pub stored_event_id: Uuid,
    /// Event type.
    pub event_type: EventType,
    /// Emitting anchor.
    pub hardware_id: HardwareId,
    /// Whether the signature was accepted.
    pub signature_verified: bool,
    /// Whether the ledger accepted the event.
    pub ledger_synced: bool,
    /// Server receive time.
    pub received_at: DateTime<Utc>,
    /// What the state machine did with the event.
    pub disposition: Disposition,
    /// Anchor status after the event, if the anchor exists.
    pub anchor_status: Option<AnchorStatus>,
}

/// Validates, verifies, folds and stores anchor events.
///
/// Events for the same hardware id are processed one at a time; the lock is
/// held from reading the prior anchor until the commit lands and released
/// before the ledger call. Different hardware ids proceed in parallel.
pub struct EventProcessor {
    store: Arc<dyn RecordStore>,
    verifier: SignatureVerifier,
    ledger: Option<Arc<dyn LedgerSink>>,
    config: IngestConfig,
    canonicalizer: Canonicalizer,
    locks: AnchorLocks,
}

impl EventProcessor {
    /// Creates a processor without a ledger; records settle as `Skipped`.
    pub fn new(store: Arc<dyn RecordStore>, registry: Arc<dyn KeyRegistry>, config: IngestConfig) -> Self {
        let canonicalizer = Canonicalizer::default();
        Self {
            store,
            verifier: SignatureVerifier::new(registry, config.verifier)
                .with_canonicalizer(canonicalizer.clone()),
            ledger: None,
            config,
            canonicalizer,
            locks: AnchorLocks::new(),
        }
    }

    /// Forwards accepted events to `ledger`.
    pub fn with_ledger(mut self, ledger: Arc<dyn LedgerSink>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Backing store.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Processes one raw event payload.
    ///
    /// Validation failures are returned before anything is stored. A bad
    /// signature is not an error: the event is stored with
    /// `signature_verified = false` and, under the default policy, leaves the
    /// anchor untouched. Ledger failures are recorded on the event.
    ///
    /// Once the record is committed, forwarding and settlement run on a
    /// spawned task. Dropping the returned future after that point still
    /// settles the record.
    pub async fn submit(&self, payload: &Value) -> Result<Receipt, IngestError> {
        let event = AnchorEvent::from_payload(payload)?;
        let payload_digest = compute_payload_digest(payload, &self.canonicalizer)?;
        let received_at = Utc::now();
        let hardware_id = event.hardware_id().clone();

        let (record, anchor_status) = {
            let _guard = self.locks.acquire(&hardware_id).await;

            let prior = self.store.get_anchor(&hardware_id)?;
            let manufacturer = prior
                .as_ref()
                .map(|anchor| &anchor.manufacturer_id)
                .or(event.manufacturer_id());
            let verification =
                self.verifier
                    .check_for_manufacturer(payload, event.signature(), manufacturer);

            let ctx = FoldContext {
                verified: verification.outcome.is_verified(),
                received_at,
                public_key: verification.public_key.as_deref(),
                policy: &self.config.transitions,
            };
            let transition = fold(prior.as_ref(), &event, &ctx);
            let disposition = transition.disposition;
            let next = transition.into_anchor();

            let record = EventRecord::from(NewEventRecord {
                id: Uuid::new_v4(),
                event_type: event.event_type(),
                hardware_id: hardware_id.clone(),
                asset_id: event
                    .asset_id()
                    .or_else(|| prior.as_ref().and_then(|anchor| anchor.asset_id)),
                schema_version: event.envelope.schema_version.clone(),
                event_timestamp: event.timestamp(),
                received_at,
                signature: event.signature().to_string(),
                verification: verification.outcome,
                payload_digest,
                payload: payload.clone(),
                disposition,
            });
            self.store.commit(&record, next.as_ref())?;

            let anchor_status = next.as_ref().or(prior.as_ref()).map(Anchor::status);
            (record, anchor_status)
        };

        if !record.signature_verified {
            tracing::warn!(
                event_id = %record.id,
                hardware_id = %hardware_id,
                event_type = %record.event_type,
                verification = ?record.verification,
                "stored event with unverified signature"
            );
        }
        match record.disposition {
            Disposition::Ignored(reason) => tracing::debug!(
                event_id = %record.id,
                hardware_id = %hardware_id,
                %reason,
                "event left anchor state unchanged"
            ),
            disposition => tracing::info!(
                event_id = %record.id,
                hardware_id = %hardware_id,
                event_type = %record.event_type,
                %disposition,
                status = ?anchor_status,
                "event applied"
            ),
        }

        let store = Arc::clone(&self.store);
        let ledger = self.ledger.clone();
        let timeout = self.config.ledger_timeout;
        let settlement = {
            let record = record.clone();
            tokio::spawn(async move { Self::settle(store, ledger, timeout, &record).await })
        };
        let ledger_synced = settlement.await.unwrap_or_else(|e| {
            tracing::warn!(event_id = %record.id, error = %e, "ledger settlement task failed");
            false
        });

        Ok(Receipt {
            stored_event_id: record.id,
            event_type: record.event_type,
            hardware_id,
            signature_verified: record.signature_verified,
            ledger_synced,
            received_at,
            disposition: record.disposition,
            anchor_status,
        })
    }

    async fn settle(
        store: Arc<dyn RecordStore>,
        ledger: Option<Arc<dyn LedgerSink>>,
        timeout: Duration,
        record: &EventRecord,
    ) -> bool {
        let outcome = Self::forward(ledger.as_deref(), timeout, record).await;
        let synced = outcome.is_synced();
        if let Err(e) = store.settle_ledger(record.id, outcome) {
            tracing::warn!(event_id = %record.id, error = %e, "could not record ledger outcome");
        }
        synced
    }

    async fn forward(ledger: Option<&dyn LedgerSink>, timeout: Duration, record: &EventRecord) -> LedgerSync {
        let Some(ledger) = ledger else {
            return LedgerSync::Skipped;
        };

        let entry = LedgerEntry::from(record);
        let attempted_at = Utc::now();
        let result = match tokio::time::timeout(timeout, ledger.write_event(&entry)).await {
            Ok(result) => result,
            Err(_) => Err(LedgerError::Timeout(timeout)),
        };

        match result {
            Ok(ledger_event_id) => LedgerSync::Synced {
                ledger_event_id,
                synced_at: Utc::now(),
            },
            Err(e) => {
                tracing::warn!(event_id = %record.id, error = %e, "ledger forwarding failed");
                LedgerSync::Failed {
                    error: e.to_string(),
                    attempted_at,
                }
            }
        }
    }

    /// Revokes an anchor; later events are recorded but change nothing.
    ///
    /// Revoking twice keeps the first reason.
    pub async fn revoke(&self, hardware_id: &HardwareId, reason: &str) -> Result<Anchor, IngestError> {
        let _guard = self.locks.acquire(hardware_id).await;

        let mut anchor = self
            .store
            .get_anchor(hardware_id)?
            .ok_or_else(|| IngestError::UnknownAnchor(hardware_id.clone()))?;
        if anchor.revoke(reason, Utc::now()) {
            self.store.upsert_anchor(&anchor)?;
            tracing::info!(hardware_id = %hardware_id, reason, "anchor revoked");
        }
        Ok(anchor)
    }
}
