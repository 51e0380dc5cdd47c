//! Events command implementation.

use anchorwatch_canonical::{Digest, HardwareId};
use anchorwatch_core::EventType;
use anchorwatch_store::{
    AllRecords, AndFilter, EventTypeFilter, HardwareIdFilter, PayloadDigestFilter, RecordFilter,
    RecordStore, VerifiedFilter,
};

use super::open_existing;
use crate::output;

pub fn run(
    journal: String,
    anchor: Option<String>,
    event_type: Option<String>,
    verified_only: bool,
    digest: Option<String>,
    limit: usize,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut filters: Vec<Box<dyn RecordFilter>> = Vec::new();
    if let Some(id) = anchor {
        let hardware_id = HardwareId::parse(id).map_err(|e| format!("Invalid hardware id: {}", e))?;
        filters.push(Box::new(HardwareIdFilter { hardware_id }));
    }
    if let Some(name) = event_type {
        let event_type: EventType = name.parse().map_err(|e| format!("Invalid --type: {}", e))?;
        filters.push(Box::new(EventTypeFilter { event_type }));
    }
    if verified_only {
        filters.push(Box::new(VerifiedFilter { verified: true }));
    }
    if let Some(text) = digest {
        let digest: Digest = text.parse().map_err(|e| format!("Invalid --digest: {}", e))?;
        filters.push(Box::new(PayloadDigestFilter { digest }));
    }
    let filter: Box<dyn RecordFilter> = if filters.is_empty() {
        Box::new(AllRecords)
    } else {
        Box::new(AndFilter { filters })
    };

    let store = open_existing(&journal)?;
    let records = store.events(filter.as_ref())?;

    if !json {
        output::print_table_header();
    }
    for record in records.iter().take(limit) {
        if json {
            println!("{}", serde_json::to_string(record)?);
        } else {
            println!("{}", output::format_table_row(record));
        }
    }

    Ok(())
}
