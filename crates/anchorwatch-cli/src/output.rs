//! Output formatting utilities.

use anchorwatch_core::{EventRecord, LedgerSync};

/// Formats an event record as a table row.
pub fn format_table_row(record: &EventRecord) -> String {
    let ledger = match record.ledger() {
        LedgerSync::Pending => "pending",
        LedgerSync::Synced { .. } => "synced",
        LedgerSync::Failed { .. } => "failed",
        LedgerSync::Skipped => "skipped",
    };

    format!(
        "{:<36} {:<27} {:<20} {:<25} {:<8} {:<20} {}",
        record.id,
        record.event_type,
        truncate(record.hardware_id.as_str(), 20),
        record.event_timestamp.to_rfc3339(),
        if record.signature_verified { "yes" } else { "no" },
        truncate(&record.disposition.to_string(), 20),
        ledger
    )
}

/// Prints table header.
#[allow(clippy::print_literal)]
pub fn print_table_header() {
    println!(
        "{:<36} {:<27} {:<20} {:<25} {:<8} {:<20} {}",
        "ID", "TYPE", "ANCHOR", "TIMESTAMP", "VERIFIED", "DISPOSITION", "LEDGER"
    );
    println!("{}", "-".repeat(150));
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
