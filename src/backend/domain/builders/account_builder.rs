//! Field-by-field construction of an account record.

use anyhow::Result;
use log::debug;

use crate::backend::domain::builders::{BuildError, FieldBuilder};
use crate::backend::domain::models::account::{
    fields, Account, AccountId, Address, Name, Role,
};
use crate::backend::domain::validation::{self, FieldError, ValidationError};
use crate::backend::storage::traits::IdAllocator;

/// Collects account type, name and address one field at a time.
///
/// The cursor is derived: it always targets the first unset field in order,
/// so clearing a field (the name cross-invalidation) moves the prompt back
/// there without any bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct AccountBuilder {
    role: Option<Role>,
    first_name: Option<String>,
    last_name: Option<String>,
    street: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip: Option<String>,
    errors: Vec<FieldError>,
}

impl AccountBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn accept(&mut self, field: &'static str, raw: &str) -> bool {
        let raw = raw.trim();
        match field {
            fields::ACCOUNT_TYPE => match Role::parse(raw) {
                Ok(role) => {
                    self.role = Some(role);
                    true
                }
                Err(e) => self.reject(field, e),
            },
            fields::FIRST_NAME => match Self::validate_name_part(raw) {
                Ok(()) => {
                    self.first_name = Some(raw.to_string());
                    true
                }
                Err(e) => self.reject(field, e),
            },
            fields::LAST_NAME => match Self::validate_name_part(raw) {
                Ok(()) => {
                    let first = self.first_name.as_deref().unwrap_or_default();
                    if Name::combined_fits(first, raw) {
                        self.last_name = Some(raw.to_string());
                        true
                    } else {
                        // The pair broke the combined bound: the first name
                        // only looked valid on its own, so both names are
                        // cleared and must be re-entered.
                        let error = ValidationError::IncompatibleValues {
                            a: first.to_string(),
                            b: raw.to_string(),
                        };
                        self.first_name = None;
                        self.last_name = None;
                        self.reject(field, error)
                    }
                }
                Err(e) => self.reject(field, e),
            },
            fields::STREET => match validation::length_in(raw, 1, Address::MAX_STREET) {
                Ok(()) => {
                    self.street = Some(raw.to_string());
                    true
                }
                Err(e) => self.reject(field, e),
            },
            fields::CITY => match validation::length_in(raw, 1, Address::MAX_CITY) {
                Ok(()) => {
                    self.city = Some(raw.to_string());
                    true
                }
                Err(e) => self.reject(field, e),
            },
            fields::STATE => match validation::us_state_code(raw) {
                Ok(normalized) => {
                    self.state = Some(normalized);
                    true
                }
                Err(e) => self.reject(field, e),
            },
            fields::ZIP => match validation::digits_exact(raw, Address::ZIP_DIGITS) {
                Ok(()) => {
                    self.zip = Some(raw.to_string());
                    true
                }
                Err(e) => self.reject(field, e),
            },
            _ => false,
        }
    }

    fn validate_name_part(raw: &str) -> Result<(), ValidationError> {
        validation::length_in(raw, 1, Name::MAX_PART)?;
        validation::alphabetic(raw)?;
        Ok(())
    }

    fn reject(&mut self, field: &'static str, error: ValidationError) -> bool {
        debug!("Rejected {} input: {}", field, error);
        self.errors.push(FieldError::new(field, error));
        false
    }

    /// Build the account, drawing a fresh id from the allocator. The id is
    /// consumed only here, and only once the record is complete, so abandoned
    /// builds never burn ids.
    pub fn build(&self, ids: &dyn IdAllocator) -> Result<Account> {
        if let Some(missing) = self.current_field() {
            return Err(BuildError::Incomplete { missing }.into());
        }
        let id = ids.allocate_unique_id()?;
        Ok(self.assemble(id)?)
    }

    /// Build the account under an existing id (the update flow).
    pub fn build_with_id(&self, id: AccountId) -> Result<Account, BuildError> {
        self.assemble(id)
    }

    fn assemble(&self, id: AccountId) -> Result<Account, BuildError> {
        match (
            &self.role,
            &self.first_name,
            &self.last_name,
            &self.street,
            &self.city,
            &self.state,
            &self.zip,
        ) {
            (
                Some(role),
                Some(first),
                Some(last),
                Some(street),
                Some(city),
                Some(state),
                Some(zip),
            ) => {
                // No further validation: every part was validated and
                // normalized at acceptance time.
                let name = Name::from_validated(first, last);
                let address = Address::from_validated(street, city, state, zip);
                Ok(Account::from_parts(id, name, address, *role))
            }
            _ => Err(BuildError::Incomplete {
                missing: self.current_field().unwrap_or("nothing"),
            }),
        }
    }
}

impl FieldBuilder for AccountBuilder {
    fn current_field(&self) -> Option<&'static str> {
        if self.role.is_none() {
            Some(fields::ACCOUNT_TYPE)
        } else if self.first_name.is_none() {
            Some(fields::FIRST_NAME)
        } else if self.last_name.is_none() {
            Some(fields::LAST_NAME)
        } else if self.street.is_none() {
            Some(fields::STREET)
        } else if self.city.is_none() {
            Some(fields::CITY)
        } else if self.state.is_none() {
            Some(fields::STATE)
        } else if self.zip.is_none() {
            Some(fields::ZIP)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::account::MemberStatus;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct SequentialIds(AtomicU32);

    impl IdAllocator for SequentialIds {
        fn allocate_unique_id(&self) -> Result<AccountId> {
            let next = self.0.fetch_add(1, Ordering::SeqCst);
            Ok(AccountId::from_value(next)?)
        }
    }

    fn ids() -> SequentialIds {
        SequentialIds(AtomicU32::new(100_000_000))
    }

    const VALID_INPUTS: [&str; 7] = [
        "member",
        "Jane",
        "Doe",
        "12 Main St",
        "Portland",
        "or",
        "97201",
    ];

    #[test]
    fn test_fields_are_collected_in_order() {
        let mut builder = AccountBuilder::new();
        let expected = [
            fields::ACCOUNT_TYPE,
            fields::FIRST_NAME,
            fields::LAST_NAME,
            fields::STREET,
            fields::CITY,
            fields::STATE,
            fields::ZIP,
        ];
        for (input, field) in VALID_INPUTS.iter().zip(expected) {
            assert_eq!(builder.current_field(), Some(field));
            assert!(!builder.buildable());
            assert!(builder.set_current_field(input));
        }
        assert!(builder.buildable());
        assert_eq!(builder.current_field(), None);
    }

    #[test]
    fn test_buildable_only_after_last_field() {
        let mut builder = AccountBuilder::new();
        for input in &VALID_INPUTS[..6] {
            builder.set_current_field(input);
            assert!(!builder.buildable());
        }
        builder.set_current_field(VALID_INPUTS[6]);
        assert!(builder.buildable());
    }

    #[test]
    fn test_rejected_input_keeps_cursor_and_reports() {
        let mut builder = AccountBuilder::new();
        assert!(!builder.set_current_field("janitor"));
        assert_eq!(builder.current_field(), Some(fields::ACCOUNT_TYPE));
        assert_eq!(builder.errors().len(), 1);

        // The next attempt clears the previous attempt's errors.
        assert!(builder.set_current_field("provider"));
        assert!(builder.errors().is_empty());
    }

    #[test]
    fn test_invalid_state_code_leaves_state_unset() {
        let mut builder = AccountBuilder::new();
        for input in &VALID_INPUTS[..5] {
            assert!(builder.set_current_field(input));
        }
        assert!(!builder.set_current_field("ZZ"));
        assert_eq!(builder.current_field(), Some(fields::STATE));
        assert!(matches!(
            builder.errors()[0].error,
            ValidationError::InvalidValue { .. }
        ));
    }

    #[test]
    fn test_combined_name_bound_invalidates_both_names() {
        let mut builder = AccountBuilder::new();
        assert!(builder.set_current_field("member"));
        assert!(builder.set_current_field("Maximiliana"));
        // 11 + 15 = 26 > 25: both names must be re-entered.
        assert!(!builder.set_current_field("Quattlebaumhoff"));
        assert_eq!(builder.current_field(), Some(fields::FIRST_NAME));
        assert!(matches!(
            builder.errors()[0].error,
            ValidationError::IncompatibleValues { .. }
        ));

        // Re-entry with a shorter pair proceeds normally.
        assert!(builder.set_current_field("Max"));
        assert!(builder.set_current_field("Quattlebaumhoff"));
        assert_eq!(builder.current_field(), Some(fields::STREET));
    }

    #[test]
    fn test_rejection_never_corrupts_accepted_fields() {
        let mut builder = AccountBuilder::new();
        for input in &VALID_INPUTS[..4] {
            assert!(builder.set_current_field(input));
        }
        assert!(!builder.set_current_field("A city name that is far too long"));
        // Earlier fields are untouched: finishing normally still works.
        assert!(builder.set_current_field("Portland"));
        assert!(builder.set_current_field("or"));
        assert!(builder.set_current_field("97201"));
        assert!(builder.buildable());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut builder = AccountBuilder::new();
        builder.set_current_field("member");
        builder.set_current_field("Jane");
        builder.reset();
        assert_eq!(builder.current_field(), Some(fields::ACCOUNT_TYPE));
        assert!(!builder.buildable());
        assert!(builder.errors().is_empty());
        builder.reset();
        assert_eq!(builder.current_field(), Some(fields::ACCOUNT_TYPE));
    }

    #[test]
    fn test_build_before_complete_is_an_error() {
        let builder = AccountBuilder::new();
        assert!(builder.build(&ids()).is_err());
        assert_eq!(
            builder.build_with_id(AccountId::from_value(100_000_000).unwrap()),
            Err(BuildError::Incomplete {
                missing: fields::ACCOUNT_TYPE
            })
        );
    }

    #[test]
    fn test_round_trip_of_accepted_values() {
        let mut builder = AccountBuilder::new();
        for input in VALID_INPUTS {
            assert!(builder.set_current_field(input));
        }
        let account = builder.build(&ids()).unwrap();
        assert_eq!(
            account.role(),
            Role::Member {
                status: MemberStatus::Valid
            }
        );
        assert_eq!(account.name().first(), "Jane");
        assert_eq!(account.name().last(), "Doe");
        assert_eq!(account.address().street(), "12 Main St");
        assert_eq!(account.address().city(), "Portland");
        // the only change from the raw inputs is state-code uppercasing
        assert_eq!(account.address().state(), "OR");
        assert_eq!(account.address().zip(), "97201");
    }

    #[test]
    fn test_id_is_consumed_only_at_build_time() {
        let allocator = ids();
        let mut builder = AccountBuilder::new();
        for input in VALID_INPUTS {
            builder.set_current_field(input);
        }
        let a = builder.build(&allocator).unwrap();
        let b = builder.build(&allocator).unwrap();
        assert_eq!(a.id().value(), 100_000_000);
        assert_eq!(b.id().value(), 100_000_001);
    }
}
