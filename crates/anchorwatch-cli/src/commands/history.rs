//! History command implementation.

use anchorwatch_canonical::HardwareId;
use anchorwatch_ledger::{HttpLedger, LedgerSink};

pub async fn run(
    id: String,
    ledger_url: String,
    api_key: Option<String>,
    limit: usize,
    offset: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let hardware_id = HardwareId::parse(id).map_err(|e| format!("Invalid hardware id: {}", e))?;
    let ledger = HttpLedger::new(ledger_url, api_key)?;

    let events = ledger
        .read_history(&hardware_id, limit, offset)
        .await
        .map_err(|e| format!("Failed to read ledger history: {}", e))?;
    for event in &events {
        println!("{}", serde_json::to_string(event)?);
    }
    tracing::debug!(count = events.len(), "ledger history read");
    Ok(())
}
