//! Field-by-field construction of a reporting period.

use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

use crate::backend::domain::builders::{BuildError, FieldBuilder};
use crate::backend::domain::models::transaction::SERVICE_DATE_FORMAT;
use crate::backend::domain::validation::{FieldError, ValidationError};

pub mod fields {
    pub const START_DATE: &str = "start date";
    pub const END_DATE: &str = "end date";
}

/// An inclusive date range for activity reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Collects the start and end dates of a reporting period. The end date must
/// not precede the start date.
#[derive(Debug, Clone, Default)]
pub struct PeriodBuilder {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    errors: Vec<FieldError>,
}

impl PeriodBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn accept(&mut self, field: &'static str, raw: &str) -> bool {
        let raw = raw.trim();
        let date = match NaiveDate::parse_from_str(raw, SERVICE_DATE_FORMAT) {
            Ok(date) => date,
            Err(_) => {
                let error = ValidationError::InvalidValue {
                    value: raw.to_string(),
                    expected: "a date in MM-DD-YYYY form".to_string(),
                };
                return self.reject(field, error);
            }
        };
        match field {
            fields::START_DATE => {
                self.start = Some(date);
                true
            }
            fields::END_DATE => match self.start {
                Some(start) if date < start => {
                    let error = ValidationError::IncompatibleValues {
                        a: start.format(SERVICE_DATE_FORMAT).to_string(),
                        b: raw.to_string(),
                    };
                    self.reject(field, error)
                }
                _ => {
                    self.end = Some(date);
                    true
                }
            },
            _ => false,
        }
    }

    fn reject(&mut self, field: &'static str, error: ValidationError) -> bool {
        debug!("Rejected {} input: {}", field, error);
        self.errors.push(FieldError::new(field, error));
        false
    }

    pub fn build(&self) -> Result<Period, BuildError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Ok(Period { start, end }),
            _ => Err(BuildError::Incomplete {
                missing: self.current_field().unwrap_or("nothing"),
            }),
        }
    }
}

impl FieldBuilder for PeriodBuilder {
    fn current_field(&self) -> Option<&'static str> {
        if self.start.is_none() {
            Some(fields::START_DATE)
        } else if self.end.is_none() {
            Some(fields::END_DATE)
        } else {
            None
        }
    }

    fn set_current_field(&mut self, raw: &str) -> bool {
        self.errors.clear();
        match self.current_field() {
            Some(field) => self.accept(field, raw),
            None => false,
        }
    }

    fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}
