use canonical_json::to_string;
use serde_json::{Map, Value};

use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Top-level member that never participates in signed bytes.
pub const SIGNATURE_FIELD: &str = "signature";

/// Error returned when canonicalization fails.
#[derive(thiserror::Error, Debug)]
pub enum CanonicalizationError {
    /// Signing payloads must be JSON objects.
    #[error("signing payload must be a JSON object, found {0}")]
    NotAnObject(&'static str),
    /// Generic failure from the canonical encoder.
    #[error("other error: {0}")]
    Other(String),
}

/// Canonicalizer that emits the exact bytes a producer signs.
///
/// Keys are sorted at every depth and insignificant whitespace is dropped.
/// The output is pure ASCII: every character from U+007F upward is written as
/// a lowercase `\uXXXX` escape, with UTF-16 surrogate pairs above U+FFFF.
/// Numbers, floats included, use the ECMAScript shortest form. Excluded
/// members are removed from the top level only.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    excluded: BTreeSet<String>,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::excluding([SIGNATURE_FIELD])
    }
}

impl Canonicalizer {
    /// Creates a canonicalizer that strips the given top-level members.
    pub fn excluding<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: fields.into_iter().map(Into::into).collect(),
        }
    }

    fn excludes(&self, field: &str) -> bool {
        self.excluded.contains(field)
    }

    /// Produces canonical bytes for any JSON value, without stripping members.
    pub fn canonicalize(&self, value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
        let canonical =
            to_string(value).map_err(|err| CanonicalizationError::Other(err.to_string()))?;
        Ok(escape_non_ascii(&canonical).into_bytes())
    }

    /// Produces the signed bytes of an event payload: excluded members removed,
    /// the rest canonicalized.
    pub fn signing_bytes(&self, payload: &Value) -> Result<Vec<u8>, CanonicalizationError> {
        let Value::Object(map) = payload else {
            return Err(CanonicalizationError::NotAnObject(kind_of(payload)));
        };

        let stripped: Map<String, Value> = map
            .iter()
            .filter(|(key, _)| !self.excludes(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        self.canonicalize(&Value::Object(stripped))
    }
}

// Outside string literals canonical JSON is already ASCII, so escaping every
// wide character of the serialized text only ever touches string contents.
fn escape_non_ascii(canonical: &str) -> String {
    if canonical.bytes().all(|b| b < 0x7f) {
        return canonical.to_string();
    }
    let mut out = String::with_capacity(canonical.len() + 16);
    let mut units = [0u16; 2];
    for ch in canonical.chars() {
        if (ch as u32) < 0x7f {
            out.push(ch);
            continue;
        }
        for unit in ch.encode_utf16(&mut units) {
            let _ = write!(out, "\\u{:04x}", unit);
        }
    }
    out
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
