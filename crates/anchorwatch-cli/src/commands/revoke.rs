//! Revoke command implementation.

use anchorwatch_canonical::HardwareId;
use anchorwatch_core::StaticKeyRegistry;
use anchorwatch_ingest::{EventProcessor, IngestConfig};
use std::sync::Arc;

use super::open_existing;

pub async fn run(id: String, journal: String, reason: String) -> Result<(), Box<dyn std::error::Error>> {
    let hardware_id = HardwareId::parse(id).map_err(|e| format!("Invalid hardware id: {}", e))?;
    if reason.trim().is_empty() {
        return Err("Revocation reason must not be empty".into());
    }

    let store = open_existing(&journal)?;
    // Revocation needs no keys.
    let processor = EventProcessor::new(
        Arc::new(store),
        Arc::new(StaticKeyRegistry::new()),
        IngestConfig::default(),
    );

    let anchor = processor.revoke(&hardware_id, &reason).await?;
    println!("{}", serde_json::to_string_pretty(&anchor)?);
    Ok(())
}
