use anchorwatch_core::{TransitionPolicy, VerifierPolicy};
use std::time::Duration;

/// Default bound on one ledger call.
pub const DEFAULT_LEDGER_TIMEOUT: Duration = Duration::from_secs(30);

/// Pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestConfig {
    /// Signature policy.
    pub verifier: VerifierPolicy,
    /// State machine policy.
    pub transitions: TransitionPolicy,
    /// Deadline for forwarding one event to the ledger.
    pub ledger_timeout: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            verifier: VerifierPolicy::default(),
            transitions: TransitionPolicy::default(),
            ledger_timeout: DEFAULT_LEDGER_TIMEOUT,
        }
    }
}
