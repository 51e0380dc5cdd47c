use anchorwatch_canonical::ValidationError;
use thiserror::Error;

use crate::events::EventType;

/// Reasons an event payload is rejected before any cryptographic work.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EventError {
    /// Payload is not a JSON object.
    #[error("event payload must be a JSON object")]
    NotAnObject,
    /// `event_type` member is missing or not a string.
    #[error("event_type is required")]
    MissingEventType,
    /// `event_type` names none of the five anchor events.
    #[error("unknown event type: {0}")]
    UnknownEventType(String),
    /// Payload could not be decoded as the declared variant.
    #[error("malformed {event_type} payload: {reason}")]
    Malformed {
        /// Declared event type.
        event_type: EventType,
        /// Decoder message (names the offending field).
        reason: String,
    },
    /// A decoded field failed a range or length check.
    #[error("invalid {event_type} payload: {source}")]
    Field {
        /// Declared event type.
        event_type: EventType,
        /// Field-level detail.
        #[source]
        source: ValidationError,
    },
}

impl EventError {
    /// Name of the offending field, when one can be identified.
    pub fn field(&self) -> Option<&str> {
        match self {
            EventError::MissingEventType | EventError::UnknownEventType(_) => Some("event_type"),
            EventError::Field { source, .. } => Some(source.field()),
            EventError::NotAnObject | EventError::Malformed { .. } => None,
        }
    }
}

/// Errors loading a manufacturer key registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// I/O error reading the registry file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Registry file is not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// Registry document has the wrong shape.
    #[error("invalid registry: {0}")]
    Invalid(String),
}

/// Errors settling an event record's ledger state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettleError {
    /// Ledger state already left `Pending`.
    #[error("ledger state already settled")]
    AlreadySettled,
    /// `Pending` is not a settlement.
    #[error("cannot settle to pending")]
    NotASettlement,
}
