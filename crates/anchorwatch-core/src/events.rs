use anchorwatch_canonical::{
    check_bounded, check_symmetric_range, CounterpartyKey, FirmwareVersion, HardwareId,
    HardwareModel, ManufacturerId, MetricReading, SealId, ValidationError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::EventError;

/// Schema version assumed when a payload omits `schema_version`.
pub const DEFAULT_SCHEMA_VERSION: &str = "1.0.0";

/// Latitude bound in units of 10^-7 degrees.
pub const LAT_E7_LIMIT: i64 = 900_000_000;

/// Longitude bound in units of 10^-7 degrees.
pub const LON_E7_LIMIT: i64 = 1_800_000_000;

const SCHEMA_VERSION_MAX: usize = 16;

/// Discriminant of the five anchor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// Hardware bound to an asset.
    AnchorRegistered,
    /// Seal armed around the asset.
    AnchorSealArmed,
    /// Seal integrity lost.
    AnchorSealBroken,
    /// Environmental threshold crossed.
    AnchorEnvironmentalAlert,
    /// Physical custody handoff.
    AnchorCustodySignal,
}

impl EventType {
    /// All event types, in wire order.
    pub const ALL: [EventType; 5] = [
        EventType::AnchorRegistered,
        EventType::AnchorSealArmed,
        EventType::AnchorSealBroken,
        EventType::AnchorEnvironmentalAlert,
        EventType::AnchorCustodySignal,
    ];

    /// Wire name of the event type.
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::AnchorRegistered => "ANCHOR_REGISTERED",
            EventType::AnchorSealArmed => "ANCHOR_SEAL_ARMED",
            EventType::AnchorSealBroken => "ANCHOR_SEAL_BROKEN",
            EventType::AnchorEnvironmentalAlert => "ANCHOR_ENVIRONMENTAL_ALERT",
            EventType::AnchorCustodySignal => "ANCHOR_CUSTODY_SIGNAL",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| EventError::UnknownEventType(s.to_string()))
    }
}

/// What tripped a broken seal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerType {
    /// Opened by an operator.
    Manual,
    /// Forced open.
    Force,
    /// Tamper sensor fired.
    Tamper,
    /// Cause not reported.
    Unknown,
}

/// Environmental metric an alert refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnvironmentalMetric {
    /// Mechanical shock.
    Shock,
    /// Temperature.
    Temp,
    /// Relative humidity.
    Humidity,
}

/// Direction of a custody handoff, from the anchor's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CustodyDirection {
    /// Custody handed to the counterparty.
    Release,
    /// Custody taken from the counterparty.
    Accept,
}

/// Latitude/longitude scaled by 10^7 and carried as integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    /// Latitude x 10^7, within ±900000000.
    pub lat_e7: i64,
    /// Longitude x 10^7, within ±1800000000.
    pub lon_e7: i64,
}

impl GeoCoordinate {
    /// Checks both components against their inclusive bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_symmetric_range("geo.lat_e7", self.lat_e7, LAT_E7_LIMIT)?;
        check_symmetric_range("geo.lon_e7", self.lon_e7, LON_E7_LIMIT)
    }
}

/// Fields every anchor event carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Hardware identifier of the emitting anchor.
    #[serde(rename = "anchor_id")]
    pub hardware_id: HardwareId,
    /// Producer-asserted event time.
    pub timestamp: DateTime<Utc>,
    /// Base64 Ed25519 signature over the canonical payload.
    pub signature: String,
    /// Payload schema version.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
}

fn default_schema_version() -> String {
    DEFAULT_SCHEMA_VERSION.to_string()
}

/// `ANCHOR_REGISTERED`: hardware bound to an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorRegistered {
    /// Asset the anchor is attached to.
    pub asset_id: Uuid,
    /// Hardware model.
    pub hardware_model: HardwareModel,
    /// Firmware version at registration.
    pub firmware_version: FirmwareVersion,
    /// Manufacturer whose key signs this anchor's events.
    pub manufacturer_id: ManufacturerId,
}

/// `ANCHOR_SEAL_ARMED`: asset sealed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SealArmed {
    /// Seal identifier.
    pub seal_id: SealId,
    /// Where the seal was armed.
    pub geo: GeoCoordinate,
}

/// `ANCHOR_SEAL_BROKEN`: seal integrity lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SealBroken {
    /// Seal identifier.
    pub seal_id: SealId,
    /// What tripped the seal.
    pub trigger_type: TriggerType,
    /// Where the seal broke.
    pub geo: GeoCoordinate,
}

/// `ANCHOR_ENVIRONMENTAL_ALERT`: condition exposure evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalAlert {
    /// Metric that crossed its threshold.
    pub metric: EnvironmentalMetric,
    /// Observed reading; units are implied by the metric.
    pub value: MetricReading,
    /// Configured threshold.
    pub threshold: MetricReading,
}

/// `ANCHOR_CUSTODY_SIGNAL`: physical custody handoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustodySignal {
    /// Challenge the handoff answers.
    pub challenge_id: Uuid,
    /// Handoff direction.
    pub direction: CustodyDirection,
    /// Counterparty public key.
    pub counterparty_pubkey: CounterpartyKey,
}

/// Variant-specific part of an anchor event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventBody {
    /// `ANCHOR_REGISTERED`.
    Registered(AnchorRegistered),
    /// `ANCHOR_SEAL_ARMED`.
    SealArmed(SealArmed),
    /// `ANCHOR_SEAL_BROKEN`.
    SealBroken(SealBroken),
    /// `ANCHOR_ENVIRONMENTAL_ALERT`.
    EnvironmentalAlert(EnvironmentalAlert),
    /// `ANCHOR_CUSTODY_SIGNAL`.
    CustodySignal(CustodySignal),
}

impl EventBody {
    /// Discriminant of this body.
    pub fn event_type(&self) -> EventType {
        match self {
            EventBody::Registered(_) => EventType::AnchorRegistered,
            EventBody::SealArmed(_) => EventType::AnchorSealArmed,
            EventBody::SealBroken(_) => EventType::AnchorSealBroken,
            EventBody::EnvironmentalAlert(_) => EventType::AnchorEnvironmentalAlert,
            EventBody::CustodySignal(_) => EventType::AnchorCustodySignal,
        }
    }
}

/// A structurally valid anchor event.
///
/// Obtained only through [`AnchorEvent::from_payload`], so holding one means the
/// payload passed every field, range and enumeration check. Whether its
/// signature verifies is a separate question answered by the verifier.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorEvent {
    /// Common fields.
    pub envelope: EventEnvelope,
    /// Variant fields.
    pub body: EventBody,
}

impl AnchorEvent {
    /// Parses and validates a raw payload.
    ///
    /// Unknown members are ignored here; they stay in the raw payload and are
    /// covered by the signature.
    pub fn from_payload(payload: &Value) -> Result<Self, EventError> {
        let obj = payload.as_object().ok_or(EventError::NotAnObject)?;
        let event_type: EventType = obj
            .get("event_type")
            .and_then(Value::as_str)
            .ok_or(EventError::MissingEventType)?
            .parse()?;

        let malformed = |e: serde_json::Error| EventError::Malformed {
            event_type,
            reason: e.to_string(),
        };

        let envelope = EventEnvelope::deserialize(payload).map_err(malformed)?;
        let body = match event_type {
            EventType::AnchorRegistered => {
                EventBody::Registered(AnchorRegistered::deserialize(payload).map_err(malformed)?)
            }
            EventType::AnchorSealArmed => {
                EventBody::SealArmed(SealArmed::deserialize(payload).map_err(malformed)?)
            }
            EventType::AnchorSealBroken => {
                EventBody::SealBroken(SealBroken::deserialize(payload).map_err(malformed)?)
            }
            EventType::AnchorEnvironmentalAlert => EventBody::EnvironmentalAlert(
                EnvironmentalAlert::deserialize(payload).map_err(malformed)?,
            ),
            EventType::AnchorCustodySignal => {
                EventBody::CustodySignal(CustodySignal::deserialize(payload).map_err(malformed)?)
            }
        };

        let event = AnchorEvent { envelope, body };
        event
            .validate()
            .map_err(|source| EventError::Field { event_type, source })?;
        Ok(event)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.envelope.signature.is_empty() {
            return Err(ValidationError::Empty { field: "signature" });
        }
        check_bounded("schema_version", &self.envelope.schema_version, SCHEMA_VERSION_MAX)?;

        match &self.body {
            EventBody::SealArmed(e) => e.geo.validate(),
            EventBody::SealBroken(e) => e.geo.validate(),
            EventBody::Registered(_)
            | EventBody::EnvironmentalAlert(_)
            | EventBody::CustodySignal(_) => Ok(()),
        }
    }

    /// Discriminant of this event.
    pub fn event_type(&self) -> EventType {
        self.body.event_type()
    }

    /// Hardware identifier of the emitting anchor.
    pub fn hardware_id(&self) -> &HardwareId {
        &self.envelope.hardware_id
    }

    /// Producer-asserted event time.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.envelope.timestamp
    }

    /// Base64 signature as received.
    pub fn signature(&self) -> &str {
        &self.envelope.signature
    }

    /// Manufacturer named by the event itself (registration only).
    pub fn manufacturer_id(&self) -> Option<&ManufacturerId> {
        match &self.body {
            EventBody::Registered(e) => Some(&e.manufacturer_id),
            _ => None,
        }
    }

    /// Asset named by the event itself (registration only).
    pub fn asset_id(&self) -> Option<Uuid> {
        match &self.body {
            EventBody::Registered(e) => Some(e.asset_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_type_round_trips_wire_names() {
        for t in EventType::ALL {
            assert_eq!(t.as_str().parse::<EventType>().unwrap(), t);
            assert_eq!(serde_json::to_value(t).unwrap(), json!(t.as_str()));
        }
    }

    #[test]
    fn schema_version_defaults_when_absent() {
        let event = AnchorEvent::from_payload(&json!({
            "event_type": "ANCHOR_ENVIRONMENTAL_ALERT",
            "anchor_id": "ANC-1",
            "timestamp": "2024-05-01T12:00:00Z",
            "signature": "c2ln",
            "metric": "TEMP",
            "value": "41.5C",
            "threshold": "40C"
        }))
        .unwrap();
        assert_eq!(event.envelope.schema_version, DEFAULT_SCHEMA_VERSION);
    }
}
