//! Reading JSON input from files or stdin.

use serde_json::Value;
use std::io::{self, Read};

/// Reads the whole input from `path`, or stdin when absent.
pub fn read_to_string(path: Option<&str>) -> Result<String, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read file {}: {}", path, e))?),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Reads exactly one JSON value.
pub fn read_value(path: Option<&str>) -> Result<Value, Box<dyn std::error::Error>> {
    let text = read_to_string(path)?;
    Ok(serde_json::from_str(&text).map_err(|e| format!("Invalid JSON: {}", e))?)
}

/// Splits input into payloads: a single object, one top-level array, or a
/// stream of values such as JSON lines.
pub fn parse_payloads(text: &str) -> Result<Vec<Value>, Box<dyn std::error::Error>> {
    let mut values = Vec::new();
    for value in serde_json::Deserializer::from_str(text).into_iter::<Value>() {
        values.push(value.map_err(|e| format!("Invalid JSON: {}", e))?);
    }

    if values.len() == 1 && values[0].is_array() {
        if let Some(Value::Array(items)) = values.pop() {
            return Ok(items);
        }
    }
    Ok(values)
}
