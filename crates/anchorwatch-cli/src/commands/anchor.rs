//! Anchor command implementation.

use anchorwatch_canonical::HardwareId;
use anchorwatch_store::RecordStore;

use super::open_existing;

pub fn run(id: String, journal: String) -> Result<(), Box<dyn std::error::Error>> {
    let hardware_id = HardwareId::parse(id).map_err(|e| format!("Invalid hardware id: {}", e))?;
    let store = open_existing(&journal)?;

    let anchor = store
        .get_anchor(&hardware_id)?
        .ok_or_else(|| format!("Anchor {} not found", hardware_id))?;
    println!("{}", serde_json::to_string_pretty(&anchor)?);
    Ok(())
}
