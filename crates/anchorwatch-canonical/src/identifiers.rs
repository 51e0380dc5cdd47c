use crate::validation::{check_bounded, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! bounded {
    ($name:ident, $doc:expr, $field:expr, $max:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Maximum length in characters.
            pub const MAX_LEN: usize = $max;

            /// Parses a validated value from a string.
            pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
                let s = value.into();
                check_bounded($field, &s, Self::MAX_LEN)?;
                Ok(Self(s))
            }

            /// Borrows the underlying string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

bounded!(
    HardwareId,
    "Stable hardware identifier of an anchor (1-64 characters, wire name `anchor_id`).",
    "anchor_id",
    64
);
bounded!(SealId, "Identifier of a tamper-evident seal (1-64 characters).", "seal_id", 64);
bounded!(
    ManufacturerId,
    "Manufacturer identifier used to resolve signing keys (1-64 characters).",
    "manufacturer_id",
    64
);
bounded!(HardwareModel, "Anchor hardware model (1-128 characters).", "hardware_model", 128);
bounded!(
    FirmwareVersion,
    "Anchor firmware version (1-32 characters).",
    "firmware_version",
    32
);
bounded!(
    MetricReading,
    "Opaque environmental reading or threshold (1-64 characters).",
    "metric reading",
    64
);
bounded!(
    CounterpartyKey,
    "Public key of the custody counterparty (1-128 characters).",
    "counterparty_pubkey",
    128
);
