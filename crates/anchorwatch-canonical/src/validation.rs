use thiserror::Error;

/// Field-level validation errors for identifiers and event fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required string was empty.
    #[error("{field} must not be empty")]
    Empty {
        /// Field name that failed validation.
        field: &'static str,
    },
    /// A string exceeded its maximum length.
    #[error("{field} is {len} characters long, maximum is {max}")]
    TooLong {
        /// Field name that failed validation.
        field: &'static str,
        /// Observed length in characters.
        len: usize,
        /// Maximum permitted length in characters.
        max: usize,
    },
    /// A string carried control characters.
    #[error("{field} contains control characters")]
    ControlCharacter {
        /// Field name that failed validation.
        field: &'static str,
    },
    /// When a value does not match the required pattern.
    #[error("{field} ('{value}') is not allowed")]
    PatternMismatch {
        /// Field name that failed validation.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// When a numeric value exceeds its bounds.
    #[error("{field} ({value}) is out of bounds")]
    OutOfBounds {
        /// Field name that is out of bounds.
        field: &'static str,
        /// Offending value.
        value: String,
    },
}

impl ValidationError {
    /// Name of the field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Empty { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::ControlCharacter { field }
            | ValidationError::PatternMismatch { field, .. }
            | ValidationError::OutOfBounds { field, .. } => field,
        }
    }
}

/// Checks that `value` is non-empty, at most `max` characters and free of
/// control characters.
pub fn check_bounded(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::TooLong { field, len, max });
    }
    if value.chars().any(char::is_control) {
        return Err(ValidationError::ControlCharacter { field });
    }
    Ok(())
}

/// Checks that `value` lies in `[-limit, limit]`.
pub fn check_symmetric_range(field: &'static str, value: i64, limit: i64) -> Result<(), ValidationError> {
    if !(-limit..=limit).contains(&value) {
        return Err(ValidationError::OutOfBounds {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}
