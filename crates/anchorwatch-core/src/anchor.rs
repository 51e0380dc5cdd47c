use anchorwatch_canonical::{FirmwareVersion, HardwareId, HardwareModel, ManufacturerId, SealId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::events::AnchorRegistered;

/// Trust state of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorStatus {
    /// Registered, not sealed.
    Active,
    /// Seal armed and intact.
    Sealed,
    /// Seal broken.
    Breached,
    /// Taken out of service.
    Inactive,
}

impl fmt::Display for AnchorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnchorStatus::Active => "active",
            AnchorStatus::Sealed => "sealed",
            AnchorStatus::Breached => "breached",
            AnchorStatus::Inactive => "inactive",
        };
        f.write_str(s)
    }
}

/// Certification level of the anchor hardware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificationTier {
    /// Tier 1.
    #[default]
    Compatible,
    /// Tier 2.
    Native,
    /// Tier 3.
    Verified,
}

/// Soft revocation marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revocation {
    /// Operator-supplied reason.
    pub reason: String,
    /// When the anchor was revoked.
    pub revoked_at: DateTime<Utc>,
}

/// Snapshot of a physical anchor.
///
/// `status` and `current_seal_id` are only reachable through methods so that a
/// seal id is present exactly while the anchor is SEALED.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Stable hardware identifier.
    pub hardware_id: HardwareId,
    /// Asset currently bound to the anchor.
    pub asset_id: Option<Uuid>,
    /// Hardware model.
    pub hardware_model: HardwareModel,
    /// Firmware version, updated on re-registration.
    pub firmware_version: FirmwareVersion,
    /// Manufacturer whose key signs this anchor's events.
    pub manufacturer_id: ManufacturerId,
    /// Manufacturer key that resolved at registration, base64.
    pub public_key: Option<String>,
    /// Certification tier.
    #[serde(default)]
    pub certification_tier: CertificationTier,
    status: AnchorStatus,
    current_seal_id: Option<SealId>,
    /// When the anchor was first registered (server time).
    pub registered_at: DateTime<Utc>,
    /// Producer timestamp of the last event that touched this anchor.
    pub last_event_at: Option<DateTime<Utc>>,
    revocation: Option<Revocation>,
}

impl Anchor {
    /// Creates an ACTIVE anchor from its first registration.
    pub fn register(
        hardware_id: HardwareId,
        registration: &AnchorRegistered,
        registered_at: DateTime<Utc>,
        public_key: Option<String>,
    ) -> Self {
        Self {
            hardware_id,
            asset_id: Some(registration.asset_id),
            hardware_model: registration.hardware_model.clone(),
            firmware_version: registration.firmware_version.clone(),
            manufacturer_id: registration.manufacturer_id.clone(),
            public_key,
            certification_tier: CertificationTier::default(),
            status: AnchorStatus::Active,
            current_seal_id: None,
            registered_at,
            last_event_at: None,
            revocation: None,
        }
    }

    /// Current trust state.
    pub fn status(&self) -> AnchorStatus {
        self.status
    }

    /// Seal id, present only while SEALED.
    pub fn current_seal_id(&self) -> Option<&SealId> {
        self.current_seal_id.as_ref()
    }

    /// Whether the anchor has been revoked.
    pub fn is_revoked(&self) -> bool {
        self.revocation.is_some()
    }

    /// Revocation details, if revoked.
    pub fn revocation(&self) -> Option<&Revocation> {
        self.revocation.as_ref()
    }

    /// Revokes the anchor and takes it out of service.
    ///
    /// Returns `false` if the anchor was already revoked; the first reason stands.
    pub fn revoke(&mut self, reason: impl Into<String>, at: DateTime<Utc>) -> bool {
        if self.revocation.is_some() {
            return false;
        }
        self.revocation = Some(Revocation {
            reason: reason.into(),
            revoked_at: at,
        });
        self.status = AnchorStatus::Inactive;
        self.current_seal_id = None;
        true
    }

    pub(crate) fn arm(&mut self, seal_id: SealId) {
        self.status = AnchorStatus::Sealed;
        self.current_seal_id = Some(seal_id);
    }

    pub(crate) fn breach(&mut self) {
        self.status = AnchorStatus::Breached;
        self.current_seal_id = None;
    }

    pub(crate) fn rebind(&mut self, registration: &AnchorRegistered) {
        self.asset_id = Some(registration.asset_id);
        self.firmware_version = registration.firmware_version.clone();
    }

    pub(crate) fn touch(&mut self, at: DateTime<Utc>) {
        self.last_event_at = Some(at);
    }

    /// Checks the seal/status invariant; used when loading persisted snapshots.
    pub fn is_consistent(&self) -> bool {
        (self.status == AnchorStatus::Sealed) == self.current_seal_id.is_some()
    }
}
