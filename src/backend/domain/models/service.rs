//! Domain model for a service directory entry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::backend::domain::validation::{
    self, FieldError, InvalidEntity, ValidationError,
};

/// 6-digit service code, externally assigned by the claims office.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ServiceCode(u32);

impl ServiceCode {
    pub const MIN: u32 = 100_000;
    pub const MAX: u32 = 999_999;

    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        validation::digits_exact(raw, 6)?;
        let value: u32 = raw.parse().map_err(|_| ValidationError::InvalidValue {
            value: raw.to_string(),
            expected: "a 6-digit service code".to_string(),
        })?;
        Self::from_value(value)
    }

    pub fn from_value(value: u32) -> Result<Self, ValidationError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValidationError::RangeViolation {
                value: value.to_string(),
                min: Self::MIN as f64,
                max: Self::MAX as f64,
            });
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ServiceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0)
    }
}

/// An entry in the service directory. Immutable; the core only ever reads
/// these out of the directory store, it never invents them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    code: ServiceCode,
    name: String,
    cost: f64,
}

impl Service {
    pub const MAX_NAME: usize = 20;
    pub const MAX_COST: f64 = 999.99;

    pub fn try_new(code: ServiceCode, name: &str, cost: f64) -> Result<Self, InvalidEntity> {
        let mut errors = Vec::new();

        if let Err(e) = validation::length_in(name, 1, Self::MAX_NAME) {
            errors.push(FieldError::new("service name", e));
        }
        if let Err(e) = validation::cost_in_range(cost, Self::MAX_COST) {
            errors.push(FieldError::new("service cost", e));
        }

        if errors.is_empty() {
            Ok(Self {
                code,
                name: name.to_string(),
                cost,
            })
        } else {
            Err(InvalidEntity::new(errors))
        }
    }

    pub fn code(&self) -> ServiceCode {
        self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_code_parsing() {
        assert_eq!(ServiceCode::parse("123456").unwrap().value(), 123_456);
        assert!(ServiceCode::parse("12345").is_err());
        assert!(ServiceCode::parse("1234567").is_err());
        assert!(ServiceCode::parse("12345x").is_err());
    }

    #[test]
    fn test_cost_must_be_non_negative_and_bounded() {
        let code = ServiceCode::parse("123456").unwrap();
        assert!(Service::try_new(code, "Dietitian session", 45.0).is_ok());
        assert!(Service::try_new(code, "Dietitian session", -1.0).is_err());
        assert!(Service::try_new(code, "Dietitian session", 1000.0).is_err());
    }

    #[test]
    fn test_name_bound() {
        let code = ServiceCode::parse("123456").unwrap();
        assert!(Service::try_new(code, "", 45.0).is_err());
        assert!(Service::try_new(code, "A name that is far too long", 45.0).is_err());
    }
}
