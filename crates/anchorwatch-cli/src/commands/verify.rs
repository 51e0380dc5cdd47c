//! Verify command implementation.

use anchorwatch_canonical::ManufacturerId;
use anchorwatch_core::{
    AnchorEvent, SignatureVerifier, StaticKeyRegistry, VerificationOutcome, VerifierPolicy,
};
use serde_json::json;
use std::sync::Arc;

use crate::input;

pub fn run(
    input: Option<String>,
    keys: String,
    manufacturer: Option<String>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = StaticKeyRegistry::from_path(&keys)
        .map_err(|e| format!("Failed to load key registry {}: {}", keys, e))?;
    let verifier = SignatureVerifier::new(Arc::new(registry), VerifierPolicy::default());

    let payload = input::read_value(input.as_deref())?;
    let event = AnchorEvent::from_payload(&payload).map_err(|e| format!("Invalid event: {}", e))?;

    let manufacturer = manufacturer
        .map(ManufacturerId::parse)
        .transpose()
        .map_err(|e| format!("Invalid manufacturer: {}", e))?;
    let manufacturer = manufacturer.as_ref().or(event.manufacturer_id());

    let verification = verifier.check_for_manufacturer(&payload, event.signature(), manufacturer);

    if json_output {
        let output = json!({
            "event_type": event.event_type(),
            "anchor_id": event.hardware_id(),
            "manufacturer_id": manufacturer,
            "verified": verification.outcome.is_verified(),
            "outcome": verification.outcome,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("EVENT:    {} {}", event.event_type(), event.hardware_id());
        match &verification.outcome {
            VerificationOutcome::Verified => println!("VERDICT:  verified"),
            VerificationOutcome::AcceptedUnknownManufacturer => {
                println!("VERDICT:  accepted (unknown manufacturer)")
            }
            VerificationOutcome::Rejected(reason) => println!("VERDICT:  rejected ({})", reason),
        }
    }

    if !verification.outcome.is_verified() {
        return Err("signature verification failed".into());
    }
    Ok(())
}
