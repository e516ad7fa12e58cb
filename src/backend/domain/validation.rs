//! # Field Validation
//!
//! Pure validators and the structured error taxonomy shared by every record
//! builder and entity constructor. Validators never touch storage; they take
//! a raw value and answer with a `ValidationError` the presentation layer can
//! render without re-deriving any semantics.

use std::fmt;
use thiserror::Error;

/// Closed set of reasons a raw input can be rejected.
///
/// These are values, not strings: the renderer decides how to phrase them,
/// tests match on them, and nothing downstream parses message text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("\"{value}\" must be between {min} and {max} characters long")]
    LengthViolation {
        value: String,
        min: usize,
        max: usize,
    },

    #[error("{value} must be between {min} and {max}")]
    RangeViolation { value: String, min: f64, max: f64 },

    #[error("\"{value}\" is not {expected}")]
    InvalidValue { value: String, expected: String },

    #[error("\"{a}\" and \"{b}\" cannot be accepted together")]
    IncompatibleValues { a: String, b: String },

    #[error("\"{value}\" was rejected: {reason}")]
    FailedWith { value: String, reason: String },
}

/// A rejected value paired with the name of the field it was entered for.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub error: ValidationError,
}

impl FieldError {
    pub fn new(field: &'static str, error: ValidationError) -> Self {
        Self { field, error }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.error)
    }
}

/// Raised when an entity is constructed directly, bypassing a builder, and
/// one or more fields fail the same validators the builder would have run.
///
/// Builders recover field errors locally (the operator is re-prompted), but a
/// direct constructor has no retry loop above it, so this propagates.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidEntity {
    pub errors: Vec<FieldError>,
}

impl InvalidEntity {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }
}

impl fmt::Display for InvalidEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid record: ")?;
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for InvalidEntity {}

/// The fixed set of US postal state codes accepted in addresses.
pub const US_STATE_CODES: [&str; 51] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DC", "DE", "FL", "GA", "HI",
    "ID", "IL", "IN", "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN",
    "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH",
    "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA",
    "WV", "WI", "WY",
];

/// Character-count bounds check.
pub fn length_in(value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ValidationError::LengthViolation {
            value: value.to_string(),
            min,
            max,
        });
    }
    Ok(())
}

/// Letters, spaces, hyphens and apostrophes only. Names are alphabetic;
/// numerals in a name field are always a typo for an id field.
pub fn alphabetic(value: &str) -> Result<(), ValidationError> {
    let ok = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_alphabetic() || c == ' ' || c == '-' || c == '\'');
    if !ok {
        return Err(ValidationError::InvalidValue {
            value: value.to_string(),
            expected: "alphabetic characters only".to_string(),
        });
    }
    Ok(())
}

/// Fixed-width numeric string, e.g. a 9-digit account id or 5-digit zip.
pub fn digits_exact(value: &str, len: usize) -> Result<(), ValidationError> {
    if value.chars().count() != len || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidValue {
            value: value.to_string(),
            expected: format!("a {}-digit number", len),
        });
    }
    Ok(())
}

/// Non-negative monetary amount bounded above.
pub fn cost_in_range(value: f64, max: f64) -> Result<(), ValidationError> {
    if !(0.0..=max).contains(&value) {
        return Err(ValidationError::RangeViolation {
            value: format!("{:.2}", value),
            min: 0.0,
            max,
        });
    }
    Ok(())
}

/// Membership in the fixed US state-code set. Returns the uppercased code so
/// acceptance normalizes before commit.
pub fn us_state_code(value: &str) -> Result<String, ValidationError> {
    let normalized = value.trim().to_ascii_uppercase();
    if US_STATE_CODES.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(ValidationError::InvalidValue {
            value: value.to_string(),
            expected: "a US state code".to_string(),
        })
    }
}
