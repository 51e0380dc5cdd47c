pub mod anchor;
pub mod canonicalize;
pub mod events;
pub mod history;
pub mod revoke;
pub mod sign;
pub mod submit;
pub mod verify;

use anchorwatch_store::{JournalStore, WriteOptions};

/// Opens an existing journal-backed store.
pub(crate) fn open_existing(journal: &str) -> Result<JournalStore, Box<dyn std::error::Error>> {
    let options = WriteOptions {
        create: false,
        ..WriteOptions::default()
    };
    Ok(JournalStore::open(journal, options).map_err(|e| format!("Failed to open journal {}: {}", journal, e))?)
}
