//! Canonicalize command implementation.

use anchorwatch_canonical::Canonicalizer;

use crate::input;

pub fn run(input: Option<String>, signing: bool) -> Result<(), Box<dyn std::error::Error>> {
    let value = input::read_value(input.as_deref())?;
    let canonicalizer = Canonicalizer::default();

    let bytes = if signing {
        canonicalizer.signing_bytes(&value)
    } else {
        canonicalizer.canonicalize(&value)
    }
    .map_err(|e| format!("Canonicalization failed: {}", e))?;

    println!("{}", String::from_utf8_lossy(&bytes));
    Ok(())
}
