//! Submit command implementation.

use anchorwatch_core::{EventOrdering, StaticKeyRegistry, TransitionPolicy, VerifierPolicy};
use anchorwatch_ingest::{EventProcessor, IngestConfig};
use anchorwatch_ledger::HttpLedger;
use anchorwatch_store::{JournalStore, WriteOptions};
use clap::Args;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::input;

/// Store, key and policy flags for `submit`.
#[derive(Args)]
pub struct SubmitOptions {
    /// Path to journal file (created if missing)
    #[arg(long, env = "ANCHORWATCH_JOURNAL")]
    pub journal: String,
    /// Manufacturer key registry (JSON object of manufacturer -> base64 key)
    #[arg(long, env = "ANCHORWATCH_KEYS")]
    pub keys: String,
    /// Accept events whose manufacturer has no registered key
    #[arg(long, env = "ANCHORWATCH_ALLOW_UNKNOWN_MANUFACTURER")]
    pub allow_unknown_manufacturer: bool,
    /// Let unverified events change anchor state
    #[arg(long)]
    pub allow_unverified: bool,
    /// Ignore events older than the anchor's last event
    #[arg(long)]
    pub monotonic: bool,
    /// Allow re-arming a breached anchor
    #[arg(long)]
    pub rearm_after_breach: bool,
    /// Ledger base URL; events are not forwarded when absent
    #[arg(long, env = "ANCHORWATCH_LEDGER_URL")]
    pub ledger_url: Option<String>,
    /// Ledger API key
    #[arg(long, env = "ANCHORWATCH_LEDGER_API_KEY", hide_env_values = true)]
    pub ledger_api_key: Option<String>,
    /// Ledger call timeout in seconds
    #[arg(long, env = "ANCHORWATCH_LEDGER_TIMEOUT_SECS", default_value_t = 30)]
    pub ledger_timeout_secs: u64,
    /// Fsync the journal after every write
    #[arg(long)]
    pub sync: bool,
}

impl SubmitOptions {
    fn config(&self) -> IngestConfig {
        IngestConfig {
            verifier: VerifierPolicy {
                allow_unknown_manufacturer: self.allow_unknown_manufacturer,
            },
            transitions: TransitionPolicy {
                require_verified: !self.allow_unverified,
                ordering: if self.monotonic {
                    EventOrdering::MonotonicTimestamps
                } else {
                    EventOrdering::LastWriteWins
                },
                breach_latch: !self.rearm_after_breach,
            },
            ledger_timeout: Duration::from_secs(self.ledger_timeout_secs),
        }
    }
}

pub async fn run(input: Option<String>, options: SubmitOptions) -> Result<(), Box<dyn std::error::Error>> {
    let text = input::read_to_string(input.as_deref())?;
    let payloads = input::parse_payloads(&text)?;

    let registry = StaticKeyRegistry::from_path(&options.keys)
        .map_err(|e| format!("Failed to load key registry {}: {}", options.keys, e))?;
    let write_options = WriteOptions {
        sync: options.sync,
        ..WriteOptions::default()
    };
    let store = JournalStore::open(&options.journal, write_options)
        .map_err(|e| format!("Failed to open journal {}: {}", options.journal, e))?;

    let config = options.config();
    let mut processor = EventProcessor::new(Arc::new(store), Arc::new(registry), config);
    if let Some(url) = &options.ledger_url {
        let ledger = HttpLedger::with_timeout(url.clone(), options.ledger_api_key.clone(), config.ledger_timeout)?;
        processor = processor.with_ledger(Arc::new(ledger));
    }

    let mut rejected = 0usize;
    for (index, payload) in payloads.iter().enumerate() {
        match processor.submit(payload).await {
            Ok(receipt) => println!("{}", serde_json::to_string(&receipt)?),
            Err(e) if e.is_validation() => {
                rejected += 1;
                let output = json!({
                    "index": index,
                    "error": e.to_string(),
                    "field": e.field(),
                });
                println!("{}", serde_json::to_string(&output)?);
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(submitted = payloads.len(), rejected, "submission finished");
    if rejected > 0 {
        return Err(format!("{} of {} events rejected", rejected, payloads.len()).into());
    }
    Ok(())
}
