//! Sign command implementation.
//!
//! Stands in for device firmware when producing test payloads.

use anchorwatch_canonical::{Canonicalizer, SIGNATURE_FIELD};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ed25519_dalek::{Signer, SigningKey};
use serde_json::Value;

use crate::input;

pub fn run(input: Option<String>, secret_key: String) -> Result<(), Box<dyn std::error::Error>> {
    let seed = STANDARD
        .decode(secret_key.trim())
        .map_err(|e| format!("Invalid secret key: {}", e))?;
    let seed: [u8; 32] = seed
        .try_into()
        .map_err(|_| "Invalid secret key: expected 32 bytes")?;
    let key = SigningKey::from_bytes(&seed);

    let mut payload = input::read_value(input.as_deref())?;
    let bytes = Canonicalizer::default()
        .signing_bytes(&payload)
        .map_err(|e| format!("Canonicalization failed: {}", e))?;
    let signature = STANDARD.encode(key.sign(&bytes).to_bytes());

    if let Value::Object(map) = &mut payload {
        map.insert(SIGNATURE_FIELD.to_string(), Value::String(signature));
    }
    println!("{}", serde_json::to_string(&payload)?);
    Ok(())
}
