use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::validation::ValidationError;

/// Hash algorithm behind a [`Digest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlg {
    /// SHA-256.
    #[serde(rename = "sha-256")]
    Sha256,
}

impl DigestAlg {
    /// Wire label, as used in the `alg:b64` text form.
    pub fn label(self) -> &'static str {
        match self {
            DigestAlg::Sha256 => "sha-256",
        }
    }
}

/// A content fingerprint: algorithm plus base64url (no padding) hash bytes.
///
/// Displays as `sha-256:<b64>` and parses back from that form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest {
    /// Hash algorithm.
    pub alg: DigestAlg,
    /// Hash bytes, base64url without padding.
    pub b64: String,
}

fn sha256_b64_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{43}$").expect("invalid regex"))
}

impl Digest {
    /// Wraps already-encoded hash bytes, checking the encoding against `alg`.
    pub fn new(alg: DigestAlg, b64: impl Into<String>) -> Result<Self, ValidationError> {
        let b64 = b64.into();
        let pattern = match alg {
            DigestAlg::Sha256 => sha256_b64_pattern(),
        };
        if !pattern.is_match(&b64) {
            return Err(ValidationError::PatternMismatch {
                field: "digest",
                value: b64,
            });
        }
        Ok(Digest { alg, b64 })
    }

    /// SHA-256 of `domain` followed by `bytes`.
    pub fn sha256_with_domain(domain: &[u8], bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        hasher.update(bytes);
        Digest {
            alg: DigestAlg::Sha256,
            b64: URL_SAFE_NO_PAD.encode(hasher.finalize()),
        }
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.alg.label(), self.b64)
    }
}

impl FromStr for Digest {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((label, b64)) if label == DigestAlg::Sha256.label() => {
                Digest::new(DigestAlg::Sha256, b64)
            }
            _ => Err(ValidationError::PatternMismatch {
                field: "digest",
                value: s.to_string(),
            }),
        }
    }
}
