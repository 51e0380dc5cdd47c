use anchorwatch_core::{
    AnchorEvent, CustodyDirection, EventBody, EventError, EventType, TriggerType,
};
use serde_json::{json, Value};

fn seal_armed(lat_e7: i64, lon_e7: i64) -> Value {
    json!({
        "event_type": "ANCHOR_SEAL_ARMED",
        "anchor_id": "ANC-0001",
        "timestamp": "2024-05-01T12:00:00Z",
        "signature": "c2lnbmF0dXJl",
        "seal_id": "S-1",
        "geo": { "lat_e7": lat_e7, "lon_e7": lon_e7 }
    })
}

#[test]
fn latitude_bound_is_inclusive() {
    assert!(AnchorEvent::from_payload(&seal_armed(900_000_000, 0)).is_ok());
    assert!(AnchorEvent::from_payload(&seal_armed(-900_000_000, 0)).is_ok());

    let err = AnchorEvent::from_payload(&seal_armed(900_000_001, 0)).unwrap_err();
    assert_eq!(err.field(), Some("geo.lat_e7"));
}

#[test]
fn longitude_bound_is_inclusive() {
    assert!(AnchorEvent::from_payload(&seal_armed(0, 1_800_000_000)).is_ok());

    let err = AnchorEvent::from_payload(&seal_armed(0, -1_800_000_001)).unwrap_err();
    assert_eq!(err.field(), Some("geo.lon_e7"));
}

#[test]
fn seal_broken_checks_geo_and_trigger() {
    let mut payload = json!({
        "event_type": "ANCHOR_SEAL_BROKEN",
        "anchor_id": "ANC-0001",
        "timestamp": "2024-05-01T12:00:00Z",
        "signature": "c2lnbmF0dXJl",
        "seal_id": "S-1",
        "trigger_type": "TAMPER",
        "geo": { "lat_e7": 1, "lon_e7": 2 }
    });
    let event = AnchorEvent::from_payload(&payload).unwrap();
    match event.body {
        EventBody::SealBroken(broken) => assert_eq!(broken.trigger_type, TriggerType::Tamper),
        other => panic!("unexpected body: {:?}", other),
    }

    payload["trigger_type"] = json!("DROPPED");
    assert!(matches!(
        AnchorEvent::from_payload(&payload),
        Err(EventError::Malformed { event_type: EventType::AnchorSealBroken, .. })
    ));

    payload["trigger_type"] = json!("FORCE");
    payload["geo"]["lat_e7"] = json!(-900_000_001i64);
    assert_eq!(
        AnchorEvent::from_payload(&payload).unwrap_err().field(),
        Some("geo.lat_e7")
    );
}

#[test]
fn registration_requires_bounded_fields() {
    let mut payload = json!({
        "event_type": "ANCHOR_REGISTERED",
        "anchor_id": "ANC-0001",
        "timestamp": "2024-05-01T12:00:00Z",
        "signature": "c2lnbmF0dXJl",
        "asset_id": "6f1c2c9e-8d0b-4a57-9a43-1d1a1bb5b2a0",
        "hardware_model": "AW-100",
        "firmware_version": "1.0.0",
        "manufacturer_id": "acme"
    });
    let event = AnchorEvent::from_payload(&payload).unwrap();
    assert_eq!(event.event_type(), EventType::AnchorRegistered);
    assert_eq!(event.manufacturer_id().unwrap().as_str(), "acme");
    assert!(event.asset_id().is_some());

    payload["firmware_version"] = json!("x".repeat(33));
    assert!(AnchorEvent::from_payload(&payload).is_err());

    payload["firmware_version"] = json!("1.0.0");
    payload["manufacturer_id"] = json!("");
    assert!(AnchorEvent::from_payload(&payload).is_err());

    payload["manufacturer_id"] = json!("acme");
    payload["asset_id"] = json!("not-a-uuid");
    assert!(AnchorEvent::from_payload(&payload).is_err());
}

#[test]
fn custody_signal_parses_direction() {
    let event = AnchorEvent::from_payload(&json!({
        "event_type": "ANCHOR_CUSTODY_SIGNAL",
        "anchor_id": "ANC-0001",
        "timestamp": "2024-05-01T12:00:00Z",
        "signature": "c2lnbmF0dXJl",
        "challenge_id": "0b8c5c0e-2f0e-4a3c-9c39-6f7a3e2f4b11",
        "direction": "RELEASE",
        "counterparty_pubkey": "cHVia2V5"
    }))
    .unwrap();
    match &event.body {
        EventBody::CustodySignal(signal) => assert_eq!(signal.direction, CustodyDirection::Release),
        other => panic!("unexpected body: {:?}", other),
    }
    assert!(event.manufacturer_id().is_none());
}

#[test]
fn empty_counterparty_key_is_rejected() {
    let result = AnchorEvent::from_payload(&json!({
        "event_type": "ANCHOR_CUSTODY_SIGNAL",
        "anchor_id": "ANC-0001",
        "timestamp": "2024-05-01T12:00:00Z",
        "signature": "c2lnbmF0dXJl",
        "challenge_id": "0b8c5c0e-2f0e-4a3c-9c39-6f7a3e2f4b11",
        "direction": "ACCEPT",
        "counterparty_pubkey": ""
    }));
    assert!(result.is_err());
}

#[test]
fn unknown_and_missing_event_types_are_rejected() {
    let err = AnchorEvent::from_payload(&json!({"event_type": "ANCHOR_TELEPORTED"})).unwrap_err();
    assert_eq!(err, EventError::UnknownEventType("ANCHOR_TELEPORTED".to_string()));
    assert_eq!(err.field(), Some("event_type"));

    let err = AnchorEvent::from_payload(&json!({"anchor_id": "A"})).unwrap_err();
    assert_eq!(err, EventError::MissingEventType);

    let err = AnchorEvent::from_payload(&json!("ANCHOR_REGISTERED")).unwrap_err();
    assert_eq!(err, EventError::NotAnObject);
}

#[test]
fn empty_signature_is_rejected() {
    let mut payload = seal_armed(0, 0);
    payload["signature"] = json!("");
    assert_eq!(
        AnchorEvent::from_payload(&payload).unwrap_err().field(),
        Some("signature")
    );
}

#[test]
fn timestamp_must_be_rfc3339() {
    let mut payload = seal_armed(0, 0);
    payload["timestamp"] = json!("yesterday");
    assert!(AnchorEvent::from_payload(&payload).is_err());
}
