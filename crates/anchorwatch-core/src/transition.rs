//! Folding events into anchor state.
//!
//! [`fold`] is a pure function: it reads the prior snapshot and returns the
//! next one together with the side effects the caller must perform. It never
//! fails; every combination of prior state and event variant has a defined
//! outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::anchor::{Anchor, AnchorStatus};
use crate::events::{AnchorEvent, EventBody};

/// How out-of-order events are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOrdering {
    /// The latest processed event wins, whatever its timestamp.
    #[default]
    LastWriteWins,
    /// Events older than the anchor's `last_event_at` leave state untouched.
    MonotonicTimestamps,
}

/// Knobs for the open choices in the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionPolicy {
    /// Unverified events are recorded but do not change state.
    pub require_verified: bool,
    /// Ordering rule.
    pub ordering: EventOrdering,
    /// Once BREACHED, `ANCHOR_SEAL_ARMED` is ignored.
    pub breach_latch: bool,
}

impl Default for TransitionPolicy {
    fn default() -> Self {
        Self {
            require_verified: true,
            ordering: EventOrdering::LastWriteWins,
            breach_latch: true,
        }
    }
}

/// Why an event left anchor state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Signature did not verify.
    Unverified,
    /// No anchor exists and the event is not a registration.
    UnknownAnchor,
    /// Anchor is revoked.
    Revoked,
    /// Event is older than the anchor's last event.
    Stale,
    /// Re-arm attempted on a breached anchor.
    BreachLatched,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IgnoreReason::Unverified => "unverified",
            IgnoreReason::UnknownAnchor => "unknown anchor",
            IgnoreReason::Revoked => "revoked",
            IgnoreReason::Stale => "stale",
            IgnoreReason::BreachLatched => "breach latched",
        };
        f.write_str(s)
    }
}

/// What the state machine did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// A new anchor was created.
    Created,
    /// An existing anchor was updated.
    Applied,
    /// Recorded for audit only.
    Ignored(IgnoreReason),
}

impl Disposition {
    /// Whether anchor state changed.
    pub fn changed_state(&self) -> bool {
        !matches!(self, Disposition::Ignored(_))
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::Created => f.write_str("created"),
            Disposition::Applied => f.write_str("applied"),
            Disposition::Ignored(reason) => write!(f, "ignored ({})", reason),
        }
    }
}

/// Side effect the caller must carry out, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Persist the event record.
    AppendEvent,
    /// Persist this anchor snapshot together with the event.
    UpsertAnchor(Anchor),
    /// Forward the event to the ledger, best effort.
    ForwardToLedger,
}

/// Result of folding one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Outcome.
    pub disposition: Disposition,
    /// Ordered side effects.
    pub effects: Vec<Effect>,
}

impl Transition {
    fn ignored(reason: IgnoreReason) -> Self {
        Self {
            disposition: Disposition::Ignored(reason),
            effects: vec![Effect::AppendEvent, Effect::ForwardToLedger],
        }
    }

    fn changed(disposition: Disposition, anchor: Anchor) -> Self {
        Self {
            disposition,
            effects: vec![
                Effect::AppendEvent,
                Effect::UpsertAnchor(anchor),
                Effect::ForwardToLedger,
            ],
        }
    }

    /// Next anchor snapshot, if state changed.
    pub fn anchor(&self) -> Option<&Anchor> {
        self.effects.iter().find_map(|effect| match effect {
            Effect::UpsertAnchor(anchor) => Some(anchor),
            _ => None,
        })
    }

    /// Consumes the transition, returning the next anchor snapshot.
    pub fn into_anchor(self) -> Option<Anchor> {
        self.effects.into_iter().find_map(|effect| match effect {
            Effect::UpsertAnchor(anchor) => Some(anchor),
            _ => None,
        })
    }
}

/// Inputs to [`fold`] beyond the prior state and the event.
#[derive(Debug, Clone, Copy)]
pub struct FoldContext<'a> {
    /// Whether the event's signature was accepted.
    pub verified: bool,
    /// Server receive time; becomes `registered_at` for new anchors.
    pub received_at: DateTime<Utc>,
    /// Manufacturer key that resolved during verification.
    pub public_key: Option<&'a str>,
    /// Policy in force.
    pub policy: &'a TransitionPolicy,
}

/// Computes the next anchor state for `event`.
pub fn fold(prior: Option<&Anchor>, event: &AnchorEvent, ctx: &FoldContext<'_>) -> Transition {
    if ctx.policy.require_verified && !ctx.verified {
        return Transition::ignored(IgnoreReason::Unverified);
    }

    let Some(prior) = prior else {
        return match &event.body {
            EventBody::Registered(registration) => {
                let mut anchor = Anchor::register(
                    event.hardware_id().clone(),
                    registration,
                    ctx.received_at,
                    ctx.public_key.map(str::to_string),
                );
                anchor.touch(event.timestamp());
                Transition::changed(Disposition::Created, anchor)
            }
            _ => Transition::ignored(IgnoreReason::UnknownAnchor),
        };
    };

    if prior.is_revoked() {
        return Transition::ignored(IgnoreReason::Revoked);
    }

    if ctx.policy.ordering == EventOrdering::MonotonicTimestamps {
        if let Some(last) = prior.last_event_at {
            if event.timestamp() < last {
                return Transition::ignored(IgnoreReason::Stale);
            }
        }
    }

    let mut next = prior.clone();
    match &event.body {
        EventBody::Registered(registration) => next.rebind(registration),
        EventBody::SealArmed(armed) => {
            if ctx.policy.breach_latch && prior.status() == AnchorStatus::Breached {
                return Transition::ignored(IgnoreReason::BreachLatched);
            }
            next.arm(armed.seal_id.clone());
        }
        EventBody::SealBroken(_) => next.breach(),
        EventBody::EnvironmentalAlert(_) | EventBody::CustodySignal(_) => {}
    }
    next.touch(event.timestamp());
    Transition::changed(Disposition::Applied, next)
}
