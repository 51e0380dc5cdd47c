//! Anchorwatch CLI - verify, ingest and inspect signed anchor events.

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod input;
mod output;

use commands::{anchor, canonicalize, events, history, revoke, sign, submit, verify};

#[derive(Parser)]
#[command(name = "anchorwatch")]
#[command(about = "Anchor event verification and ingestion CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show canonical bytes for input JSON
    Canonicalize {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
        /// Show the signing bytes (signature member removed)
        #[arg(long)]
        signing: bool,
    },
    /// Sign an event payload with a device key (development tool)
    Sign {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
        /// Base64 Ed25519 secret key (32-byte seed)
        #[arg(long, env = "ANCHORWATCH_SECRET_KEY", hide_env_values = true)]
        secret_key: String,
    },
    /// Validate and verify a single event payload offline
    Verify {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
        /// Manufacturer key registry (JSON object of manufacturer -> base64 key)
        #[arg(long, env = "ANCHORWATCH_KEYS")]
        keys: String,
        /// Manufacturer to resolve the key from, for non-registration events
        #[arg(long)]
        manufacturer: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Process events into a journal
    Submit {
        /// Input file: one object, an array, or JSON lines (stdin if not provided)
        input: Option<String>,
        #[command(flatten)]
        options: submit::SubmitOptions,
    },
    /// Show the current state of an anchor
    Anchor {
        /// Hardware id
        id: String,
        /// Path to journal file
        #[arg(long, env = "ANCHORWATCH_JOURNAL")]
        journal: String,
    },
    /// List stored events
    Events {
        /// Path to journal file
        #[arg(long, env = "ANCHORWATCH_JOURNAL")]
        journal: String,
        /// Only events of this anchor
        #[arg(long)]
        anchor: Option<String>,
        /// Only events of this type (e.g. ANCHOR_SEAL_BROKEN)
        #[arg(long = "type")]
        event_type: Option<String>,
        /// Only events whose signature verified
        #[arg(long)]
        verified_only: bool,
        /// Only events whose payload digest matches (sha-256:<b64>)
        #[arg(long)]
        digest: Option<String>,
        /// Stop after N events
        #[arg(long, default_value_t = 50)]
        limit: usize,
        /// Output as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Revoke an anchor; later events are recorded but ignored
    Revoke {
        /// Hardware id
        id: String,
        /// Path to journal file
        #[arg(long, env = "ANCHORWATCH_JOURNAL")]
        journal: String,
        /// Reason recorded with the revocation
        #[arg(long)]
        reason: String,
    },
    /// Read an anchor's history from the ledger
    History {
        /// Hardware id
        id: String,
        /// Ledger base URL
        #[arg(long, env = "ANCHORWATCH_LEDGER_URL")]
        ledger_url: String,
        /// Ledger API key
        #[arg(long, env = "ANCHORWATCH_LEDGER_API_KEY", hide_env_values = true)]
        ledger_api_key: Option<String>,
        /// Page size
        #[arg(long, default_value_t = 50)]
        limit: usize,
        /// Page offset
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "anchorwatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Canonicalize { input, signing } => canonicalize::run(input, signing),
        Commands::Sign { input, secret_key } => sign::run(input, secret_key),
        Commands::Verify {
            input,
            keys,
            manufacturer,
            json,
        } => verify::run(input, keys, manufacturer, json),
        Commands::Submit { input, options } => submit::run(input, options).await,
        Commands::Anchor { id, journal } => anchor::run(id, journal),
        Commands::Events {
            journal,
            anchor,
            event_type,
            verified_only,
            digest,
            limit,
            json,
        } => events::run(journal, anchor, event_type, verified_only, digest, limit, json),
        Commands::Revoke {
            id,
            journal,
            reason,
        } => revoke::run(id, journal, reason).await,
        Commands::History {
            id,
            ledger_url,
            ledger_api_key,
            limit,
            offset,
        } => history::run(id, ledger_url, ledger_api_key, limit, offset).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
