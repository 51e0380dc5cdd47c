//! Manufacturer public key lookup.

use anchorwatch_canonical::ManufacturerId;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use crate::errors::RegistryError;

/// Read-only mapping from manufacturer to its base64 Ed25519 public key.
///
/// Populated by an external trust-provisioning process; the core only looks
/// keys up.
pub trait KeyRegistry: Send + Sync {
    /// Returns the base64 public key registered for `manufacturer_id`.
    fn lookup(&self, manufacturer_id: &ManufacturerId) -> Option<String>;
}

/// Map-backed registry, loadable from a JSON object file.
#[derive(Debug, Default, Clone)]
pub struct StaticKeyRegistry {
    keys: HashMap<String, String>,
}

impl StaticKeyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a manufacturer key.
    pub fn insert(&mut self, manufacturer_id: impl Into<String>, public_key_b64: impl Into<String>) {
        self.keys.insert(manufacturer_id.into(), public_key_b64.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_key(mut self, manufacturer_id: impl Into<String>, public_key_b64: impl Into<String>) -> Self {
        self.insert(manufacturer_id, public_key_b64);
        self
    }

    /// Number of registered manufacturers.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no manufacturer is registered.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Builds a registry from `{"manufacturer": "base64 key", ...}`.
    pub fn from_json(value: &Value) -> Result<Self, RegistryError> {
        let obj = value
            .as_object()
            .ok_or_else(|| RegistryError::Invalid("expected a JSON object".to_string()))?;

        let mut registry = Self::new();
        for (manufacturer, key) in obj {
            ManufacturerId::parse(manufacturer.as_str())
                .map_err(|e| RegistryError::Invalid(e.to_string()))?;
            let key = key.as_str().ok_or_else(|| {
                RegistryError::Invalid(format!("key for {} must be a string", manufacturer))
            })?;
            registry.insert(manufacturer.clone(), key);
        }
        Ok(registry)
    }

    /// Loads a registry file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        let contents = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&contents)?;
        Self::from_json(&value)
    }
}

impl KeyRegistry for StaticKeyRegistry {
    fn lookup(&self, manufacturer_id: &ManufacturerId) -> Option<String> {
        self.keys.get(manufacturer_id.as_str()).cloned()
    }
}
