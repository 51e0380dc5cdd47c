use anchorwatch_canonical::{Canonicalizer, ManufacturerId};
use anchorwatch_core::{
    RejectReason, SignatureVerifier, StaticKeyRegistry, VerificationOutcome, VerifierPolicy,
};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use ed25519_dalek::{Signer, SigningKey};
use serde_json::{json, Value};
use std::sync::Arc;

fn signing_key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

fn public_key_b64(key: &SigningKey) -> String {
    B64.encode(key.verifying_key().to_bytes())
}

fn unsigned_payload() -> Value {
    json!({
        "event_type": "ANCHOR_SEAL_ARMED",
        "anchor_id": "ANC-0001",
        "timestamp": "2024-05-01T12:00:00Z",
        "schema_version": "1.0.0",
        "seal_id": "S-1",
        "geo": { "lat_e7": 377749000, "lon_e7": -1224194000 }
    })
}

fn sign(key: &SigningKey, payload: &Value) -> String {
    let bytes = Canonicalizer::default().signing_bytes(payload).unwrap();
    B64.encode(key.sign(&bytes).to_bytes())
}

fn signed_payload(key: &SigningKey) -> (Value, String) {
    let mut payload = unsigned_payload();
    let signature = sign(key, &payload);
    payload["signature"] = json!(signature.clone());
    (payload, signature)
}

fn verifier(policy: VerifierPolicy) -> SignatureVerifier {
    let registry = StaticKeyRegistry::new().with_key("acme", public_key_b64(&signing_key(42)));
    SignatureVerifier::new(Arc::new(registry), policy)
}

fn acme() -> ManufacturerId {
    ManufacturerId::parse("acme").unwrap()
}

#[test]
fn signature_made_over_canonical_bytes_verifies() {
    let key = signing_key(42);
    let (payload, signature) = signed_payload(&key);
    let verifier = verifier(VerifierPolicy::default());

    assert!(verifier.verify(&payload, &signature, &public_key_b64(&key)));
    assert!(verifier.verify_for_manufacturer(&payload, &signature, Some(&acme())));
}

#[test]
fn member_order_does_not_affect_verification() {
    let key = signing_key(42);
    let (payload, signature) = signed_payload(&key);

    let mut reordered = serde_json::Map::new();
    let obj = payload.as_object().unwrap();
    let mut keys: Vec<&String> = obj.keys().collect();
    keys.reverse();
    for k in keys {
        reordered.insert(k.clone(), obj[k].clone());
    }

    let verifier = verifier(VerifierPolicy::default());
    assert!(verifier.verify(&Value::Object(reordered), &signature, &public_key_b64(&key)));
}

#[test]
fn other_key_pair_fails() {
    let (payload, signature) = signed_payload(&signing_key(42));
    let verifier = verifier(VerifierPolicy::default());
    assert_eq!(
        verifier.check(&payload, &signature, &public_key_b64(&signing_key(7))),
        VerificationOutcome::Rejected(RejectReason::BadSignature)
    );
}

#[test]
fn single_bit_flip_fails() {
    let key = signing_key(42);
    let (payload, signature) = signed_payload(&key);
    let mut raw = B64.decode(&signature).unwrap();
    raw[10] ^= 0x01;
    let flipped = B64.encode(raw);

    let verifier = verifier(VerifierPolicy::default());
    assert!(!verifier.verify(&payload, &flipped, &public_key_b64(&key)));
}

#[test]
fn tampered_field_fails() {
    let key = signing_key(42);
    let (mut payload, signature) = signed_payload(&key);
    payload["seal_id"] = json!("S-2");

    let verifier = verifier(VerifierPolicy::default());
    assert!(!verifier.verify_for_manufacturer(&payload, &signature, Some(&acme())));
}

#[test]
fn malformed_inputs_fail_closed() {
    let key = signing_key(42);
    let (payload, signature) = signed_payload(&key);
    let verifier = verifier(VerifierPolicy::default());

    assert_eq!(
        verifier.check(&payload, "%%%not-base64%%%", &public_key_b64(&key)),
        VerificationOutcome::Rejected(RejectReason::MalformedSignature)
    );
    assert_eq!(
        verifier.check(&payload, &signature, "%%%"),
        VerificationOutcome::Rejected(RejectReason::MalformedKey)
    );
    assert_eq!(
        verifier.check(&payload, &signature, ""),
        VerificationOutcome::Rejected(RejectReason::MalformedKey)
    );
}

#[test]
fn unknown_manufacturer_fails_closed_by_default() {
    let (payload, signature) = signed_payload(&signing_key(42));
    let verifier = verifier(VerifierPolicy::default());

    let globex = ManufacturerId::parse("globex").unwrap();
    let verification = verifier.check_for_manufacturer(&payload, &signature, Some(&globex));
    assert_eq!(
        verification.outcome,
        VerificationOutcome::Rejected(RejectReason::UnknownManufacturer("globex".to_string()))
    );
    assert!(verification.public_key.is_none());

    assert_eq!(
        verifier.check_for_manufacturer(&payload, &signature, None).outcome,
        VerificationOutcome::Rejected(RejectReason::MissingManufacturer)
    );
}

#[test]
fn empty_registry_entry_fails_closed() {
    let (payload, signature) = signed_payload(&signing_key(42));
    let registry = StaticKeyRegistry::new().with_key("acme", "");
    let verifier = SignatureVerifier::new(Arc::new(registry), VerifierPolicy::default());

    assert!(!verifier.verify_for_manufacturer(&payload, &signature, Some(&acme())));
}

#[test]
fn unknown_manufacturer_accepted_only_when_allowed() {
    let (payload, signature) = signed_payload(&signing_key(42));
    let verifier = verifier(VerifierPolicy {
        allow_unknown_manufacturer: true,
    });

    let globex = ManufacturerId::parse("globex").unwrap();
    assert_eq!(
        verifier.check_for_manufacturer(&payload, &signature, Some(&globex)).outcome,
        VerificationOutcome::AcceptedUnknownManufacturer
    );

    // A resolvable key is still enforced.
    let (payload, signature) = signed_payload(&signing_key(9));
    assert!(!verifier.verify_for_manufacturer(&payload, &signature, Some(&acme())));
}

#[test]
fn float_members_are_covered_by_the_signature() {
    let key = signing_key(42);
    let mut payload = unsigned_payload();
    payload["battery_v"] = json!(3.7);
    let signature = sign(&key, &payload);
    let verifier = verifier(VerifierPolicy::default());

    assert!(verifier.verify(&payload, &signature, &public_key_b64(&key)));

    payload["battery_v"] = json!(3.8);
    assert_eq!(
        verifier.check(&payload, &signature, &public_key_b64(&key)),
        VerificationOutcome::Rejected(RejectReason::BadSignature)
    );
}

#[test]
fn producer_signing_ascii_escaped_text_verifies() {
    let key = signing_key(42);
    // Bytes exactly as a sorted, compact, ASCII-escaping JSON encoder emits them.
    let message = concat!(
        r#"{"anchor_id":"ANC-\u00e9","event_type":"ANCHOR_SEAL_ARMED","#,
        r#""geo":{"lat_e7":377749000,"lon_e7":-1224194000},"note":"41.5\u00b0C \ud83d\ude00","#,
        r#""schema_version":"1.0.0","seal_id":"S-1","timestamp":"2024-05-01T12:00:00Z"}"#
    );
    let signature = B64.encode(key.sign(message.as_bytes()).to_bytes());

    let mut payload: Value = serde_json::from_str(message).unwrap();
    assert_eq!(payload["anchor_id"], "ANC-\u{e9}");
    payload["signature"] = json!(signature.clone());

    let verifier = verifier(VerifierPolicy::default());
    assert!(verifier.verify_for_manufacturer(&payload, &signature, Some(&acme())));
}
