use anchorwatch_canonical::{compute_payload_digest, Canonicalizer, HardwareId};
use anchorwatch_core::{
    Anchor, AnchorEvent, AnchorRegistered, Disposition, EventBody, EventRecord, EventType,
    LedgerSync, NewEventRecord, VerificationOutcome,
};
use anchorwatch_store::{
    AndFilter, EventTypeFilter, HardwareIdFilter, JournalStore, MemoryStore, OrFilter,
    PayloadDigestFilter, RecordStore, StoreError, TimeRangeFilter, VerifiedFilter, WriteOptions,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;
use uuid::Uuid;

fn registration_payload(hardware_id: &str) -> Value {
    json!({
        "event_type": "ANCHOR_REGISTERED",
        "anchor_id": hardware_id,
        "timestamp": "2024-05-01T12:00:00Z",
        "signature": "c2lnbmF0dXJl",
        "asset_id": "6f1c2c9e-8d0b-4a57-9a43-1d1a1bb5b2a0",
        "hardware_model": "AW-100",
        "firmware_version": "1.0.0",
        "manufacturer_id": "acme"
    })
}

fn record_for(payload: Value, minute: u32, verified: bool) -> EventRecord {
    let event = AnchorEvent::from_payload(&payload).unwrap();
    let verification = if verified {
        VerificationOutcome::Verified
    } else {
        VerificationOutcome::Rejected(anchorwatch_core::RejectReason::BadSignature)
    };
    EventRecord::from(NewEventRecord {
        id: Uuid::new_v4(),
        event_type: event.event_type(),
        hardware_id: event.hardware_id().clone(),
        asset_id: event.asset_id(),
        schema_version: event.envelope.schema_version.clone(),
        event_timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
        received_at: Utc::now(),
        signature: event.signature().to_string(),
        verification,
        payload_digest: compute_payload_digest(&payload, &Canonicalizer::default()).unwrap(),
        payload,
        disposition: Disposition::Applied,
    })
}

fn anchor_for(hardware_id: &str) -> Anchor {
    let event = AnchorEvent::from_payload(&registration_payload(hardware_id)).unwrap();
    let registration: &AnchorRegistered = match &event.body {
        EventBody::Registered(r) => r,
        _ => unreachable!(),
    };
    Anchor::register(event.hardware_id().clone(), registration, Utc::now(), None)
}

fn alert_payload(hardware_id: &str) -> Value {
    json!({
        "event_type": "ANCHOR_ENVIRONMENTAL_ALERT",
        "anchor_id": hardware_id,
        "timestamp": "2024-05-01T12:05:00Z",
        "signature": "c2lnbmF0dXJl",
        "metric": "HUMIDITY",
        "value": "91%",
        "threshold": "80%"
    })
}

fn hid(s: &str) -> HardwareId {
    HardwareId::parse(s).unwrap()
}

fn exercise(store: &dyn RecordStore) {
    let registration = record_for(registration_payload("ANC-1"), 0, true);
    let anchor = anchor_for("ANC-1");
    store.commit(&registration, Some(&anchor)).unwrap();

    let alert = record_for(alert_payload("ANC-1"), 5, false);
    store.commit(&alert, None).unwrap();

    let other = record_for(registration_payload("ANC-2"), 7, true);
    store.commit(&other, Some(&anchor_for("ANC-2"))).unwrap();

    assert_eq!(store.get_anchor(&hid("ANC-1")).unwrap(), Some(anchor));
    assert!(store.get_anchor(&hid("ANC-404")).unwrap().is_none());
    assert_eq!(store.anchors().unwrap().len(), 2);

    let newest_first = store.events_for_anchor(&hid("ANC-1"), 10, 0).unwrap();
    assert_eq!(
        newest_first.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![alert.id, registration.id]
    );
    let paged = store.events_for_anchor(&hid("ANC-1"), 1, 1).unwrap();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].id, registration.id);
    assert!(store.events_for_anchor(&hid("ANC-404"), 10, 0).unwrap().is_empty());

    assert!(matches!(
        store.commit(&alert, None),
        Err(StoreError::DuplicateEvent(id)) if id == alert.id
    ));
}

#[test]
fn memory_store_commits_and_lists() {
    exercise(&MemoryStore::new());
}

#[test]
fn journal_store_commits_and_lists() {
    let temp_dir = TempDir::new().unwrap();
    let store = JournalStore::open(temp_dir.path().join("records.awj"), WriteOptions::default()).unwrap();
    exercise(&store);
}

#[test]
fn settlement_happens_once() {
    let store = MemoryStore::new();
    let record = record_for(registration_payload("ANC-1"), 0, true);
    store.commit(&record, Some(&anchor_for("ANC-1"))).unwrap();

    let settled = store
        .settle_ledger(
            record.id,
            LedgerSync::Synced {
                ledger_event_id: Uuid::new_v4(),
                synced_at: Utc::now(),
            },
        )
        .unwrap();
    assert!(settled.ledger().is_synced());
    assert!(settled.processed());

    assert!(matches!(
        store.settle_ledger(record.id, LedgerSync::Skipped),
        Err(StoreError::Settle { .. })
    ));
    assert!(matches!(
        store.settle_ledger(Uuid::new_v4(), LedgerSync::Skipped),
        Err(StoreError::UnknownEvent(_))
    ));
    assert!(store.get_event(record.id).unwrap().unwrap().ledger().is_synced());
}

#[test]
fn journal_store_replays_on_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("records.awj");

    let registration = record_for(registration_payload("ANC-1"), 0, true);
    let alert = record_for(alert_payload("ANC-1"), 5, true);
    let mut revoked = anchor_for("ANC-1");
    {
        let store = JournalStore::open(&path, WriteOptions::default()).unwrap();
        store.commit(&registration, Some(&anchor_for("ANC-1"))).unwrap();
        store.commit(&alert, None).unwrap();
        store.settle_ledger(registration.id, LedgerSync::Skipped).unwrap();
        revoked.revoke("retired", Utc::now());
        store.upsert_anchor(&revoked).unwrap();
    }

    let store = JournalStore::open(&path, WriteOptions::default()).unwrap();
    let anchor = store.get_anchor(&hid("ANC-1")).unwrap().unwrap();
    assert!(anchor.is_revoked());
    assert_eq!(anchor, revoked);

    let events = store.events_for_anchor(&hid("ANC-1"), 10, 0).unwrap();
    assert_eq!(events.len(), 2);
    let restored = store.get_event(registration.id).unwrap().unwrap();
    assert_eq!(restored.ledger(), &LedgerSync::Skipped);
    assert_eq!(restored.payload, registration.payload);
    assert_eq!(restored.payload_digest, registration.payload_digest);
    assert_eq!(store.get_event(alert.id).unwrap().unwrap().ledger(), &LedgerSync::Pending);

    // Settlement survives reopen, so it still happens only once.
    assert!(store.settle_ledger(registration.id, LedgerSync::Skipped).is_err());
}

#[test]
fn torn_commit_is_discarded_on_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("records.awj");

    let first = record_for(registration_payload("ANC-1"), 0, true);
    {
        let store = JournalStore::open(&path, WriteOptions::default()).unwrap();
        store.commit(&first, Some(&anchor_for("ANC-1"))).unwrap();
    }
    let committed_len = fs::metadata(&path).unwrap().len();
    {
        let store = JournalStore::open(&path, WriteOptions::default()).unwrap();
        store
            .commit(&record_for(registration_payload("ANC-2"), 1, true), Some(&anchor_for("ANC-2")))
            .unwrap();
    }
    // Simulate a crash halfway through the second commit frame.
    let full_len = fs::metadata(&path).unwrap().len();
    let file = fs::OpenOptions::new().write(true).open(&path).unwrap();
    file.set_len(committed_len + (full_len - committed_len) / 2).unwrap();
    drop(file);

    let store = JournalStore::open(&path, WriteOptions::default()).unwrap();
    assert!(store.get_anchor(&hid("ANC-2")).unwrap().is_none());
    assert!(store.events_for_anchor(&hid("ANC-2"), 10, 0).unwrap().is_empty());
    assert_eq!(fs::metadata(&path).unwrap().len(), committed_len);

    let third = record_for(alert_payload("ANC-1"), 9, true);
    store.commit(&third, None).unwrap();
    drop(store);

    let store = JournalStore::open(&path, WriteOptions::default()).unwrap();
    assert_eq!(store.events_for_anchor(&hid("ANC-1"), 10, 0).unwrap().len(), 2);
}

#[test]
fn inconsistent_anchor_snapshots_are_refused() {
    let mut value = serde_json::to_value(anchor_for("ANC-1")).unwrap();
    value["status"] = json!("sealed");
    let broken: Anchor = serde_json::from_value(value).unwrap();

    let store = MemoryStore::new();
    assert!(matches!(store.upsert_anchor(&broken), Err(StoreError::Corrupt(_))));
    let record = record_for(registration_payload("ANC-1"), 0, true);
    assert!(matches!(store.commit(&record, Some(&broken)), Err(StoreError::Corrupt(_))));
    assert!(store.get_event(record.id).unwrap().is_none());
}

#[test]
fn filters_compose() {
    let store = MemoryStore::new();
    let reg1 = record_for(registration_payload("ANC-1"), 0, true);
    let alert1 = record_for(alert_payload("ANC-1"), 5, false);
    let reg2 = record_for(registration_payload("ANC-2"), 10, true);
    store.commit(&reg1, Some(&anchor_for("ANC-1"))).unwrap();
    store.commit(&alert1, None).unwrap();
    store.commit(&reg2, Some(&anchor_for("ANC-2"))).unwrap();

    let verified_registrations = AndFilter {
        filters: vec![
            Box::new(EventTypeFilter {
                event_type: EventType::AnchorRegistered,
            }),
            Box::new(VerifiedFilter { verified: true }),
        ],
    };
    assert_eq!(store.events(&verified_registrations).unwrap().len(), 2);

    let anc1_or_unverified = OrFilter {
        filters: vec![
            Box::new(HardwareIdFilter {
                hardware_id: hid("ANC-2"),
            }),
            Box::new(VerifiedFilter { verified: false }),
        ],
    };
    let ids: Vec<_> = store
        .events(&anc1_or_unverified)
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![alert1.id, reg2.id]);

    let window = TimeRangeFilter {
        after: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 5, 0).unwrap()),
        before: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 9, 0).unwrap()),
    };
    let in_window = store.events(&window).unwrap();
    assert_eq!(in_window.len(), 1);
    assert_eq!(in_window[0].id, alert1.id);
}

#[test]
fn digest_filter_finds_resubmissions() {
    let store = MemoryStore::new();
    let first = record_for(registration_payload("ANC-1"), 0, true);
    let again = record_for(registration_payload("ANC-1"), 1, true);
    let other = record_for(registration_payload("ANC-2"), 2, true);
    store.commit(&first, Some(&anchor_for("ANC-1"))).unwrap();
    store.commit(&again, None).unwrap();
    store.commit(&other, Some(&anchor_for("ANC-2"))).unwrap();

    let digest = first.payload_digest.to_string().parse().unwrap();
    let ids: Vec<_> = store
        .events(&PayloadDigestFilter { digest })
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![first.id, again.id]);
}
