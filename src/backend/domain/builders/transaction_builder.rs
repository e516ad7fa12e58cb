//! Field-by-field construction of a service claim.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use log::debug;
use uuid::Uuid;

use crate::backend::domain::builders::{BuildError, FieldBuilder};
use crate::backend::domain::clock::Clock;
use crate::backend::domain::models::account::{Account, AccountId, RoleFilter};
use crate::backend::domain::models::service::{Service, ServiceCode};
use crate::backend::domain::models::transaction::{
    fields, Transaction, MAX_COMMENT_LEN, SERVICE_DATE_FORMAT,
};
use crate::backend::domain::validation::{self, FieldError, ValidationError};
use crate::backend::storage::traits::{AccountStore, ServiceStore};

/// Collects provider, member, service date, service and comments for a claim.
///
/// Ids and codes are resolved to their entities *at acceptance time*, so a
/// wrong role, a suspended member or an unknown code is reported against the
/// field the operator just typed instead of surfacing at the end.
#[derive(Clone)]
pub struct TransactionBuilder {
    accounts: Arc<dyn AccountStore>,
    services: Arc<dyn ServiceStore>,
    clock: Arc<dyn Clock>,
    provider: Option<Account>,
    member: Option<Account>,
    service_date: Option<NaiveDate>,
    service: Option<Service>,
    comments: Option<String>,
    errors: Vec<FieldError>,
}

impl TransactionBuilder {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        services: Arc<dyn ServiceStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            services,
            clock,
            provider: None,
            member: None,
            service_date: None,
            service: None,
            comments: None,
            errors: Vec::new(),
        }
    }

    fn accept(&mut self, field: &'static str, raw: &str) -> bool {
        let raw = raw.trim();
        match field {
            fields::PROVIDER_ID => match self.resolve_account(field, raw, RoleFilter::Provider) {
                Ok(account) => {
                    self.provider = Some(account);
                    true
                }
                Err(e) => self.reject(field, e),
            },
            fields::MEMBER_ID => match self.resolve_account(field, raw, RoleFilter::Member) {
                Ok(account) => {
                    if account.is_suspended() {
                        let error = ValidationError::FailedWith {
                            value: raw.to_string(),
                            reason: "member is suspended".to_string(),
                        };
                        self.reject(field, error)
                    } else {
                        self.member = Some(account);
                        true
                    }
                }
                Err(e) => self.reject(field, e),
            },
            fields::SERVICE_DATE => {
                match NaiveDate::parse_from_str(raw, SERVICE_DATE_FORMAT) {
                    Ok(date) if date > self.clock.today() => {
                        let error = ValidationError::FailedWith {
                            value: raw.to_string(),
                            reason: "service date cannot be in the future".to_string(),
                        };
                        self.reject(field, error)
                    }
                    Ok(date) => {
                        self.service_date = Some(date);
                        true
                    }
                    Err(_) => {
                        let error = ValidationError::InvalidValue {
                            value: raw.to_string(),
                            expected: "a date in MM-DD-YYYY form".to_string(),
                        };
                        self.reject(field, error)
                    }
                }
            }
            fields::SERVICE_CODE => match self.resolve_service(raw) {
                Ok(service) => {
                    self.service = Some(service);
                    true
                }
                Err(e) => self.reject(field, e),
            },
            fields::COMMENTS => match validation::length_in(raw, 0, MAX_COMMENT_LEN) {
                Ok(()) => {
                    self.comments = Some(raw.to_string());
                    true
                }
                Err(e) => self.reject(field, e),
            },
            _ => false,
        }
    }

    /// Look up an account by its typed id, gated by the role the field needs.
    /// A store failure becomes a field error, never a fault: the operator is
    /// simply re-prompted.
    fn resolve_account(
        &self,
        field: &'static str,
        raw: &str,
        filter: RoleFilter,
    ) -> Result<Account, ValidationError> {
        let id = AccountId::parse(raw)?;
        let account = self
            .accounts
            .get_account(id)
            .map_err(|e| {
                debug!("Account lookup failed for {}: {}", field, e);
                ValidationError::FailedWith {
                    value: raw.to_string(),
                    reason: "account lookup failed".to_string(),
                }
            })?
            .ok_or_else(|| ValidationError::InvalidValue {
                value: raw.to_string(),
                expected: "an account number on file".to_string(),
            })?;
        if !account.role().matches(filter) {
            return Err(ValidationError::InvalidValue {
                value: raw.to_string(),
                expected: match filter {
                    RoleFilter::Provider => "a provider account".to_string(),
                    RoleFilter::Member => "a member account".to_string(),
                    RoleFilter::Manager => "a manager account".to_string(),
                    RoleFilter::Any => "an account".to_string(),
                },
            });
        }
        Ok(account)
    }

    fn resolve_service(&self, raw: &str) -> Result<Service, ValidationError> {
        let code = ServiceCode::parse(raw)?;
        self.services
            .get_service(code)
            .map_err(|e| {
                debug!("Service lookup failed: {}", e);
                ValidationError::FailedWith {
                    value: raw.to_string(),
                    reason: "service directory lookup failed".to_string(),
                }
            })?
            .ok_or_else(|| ValidationError::InvalidValue {
                value: raw.to_string(),
                expected: "a service code from the directory".to_string(),
            })
    }

    fn reject(&mut self, field: &'static str, error: ValidationError) -> bool {
        debug!("Rejected {} input: {}", field, error);
        self.errors.push(FieldError::new(field, error));
        false
    }

    /// Assemble the claim from the accepted entities and stamp the filed
    /// date. All validation already happened per field; this only fails when
    /// invoked prematurely.
    pub fn build(&self) -> Result<Transaction> {
        match (
            &self.provider,
            &self.member,
            &self.service_date,
            &self.service,
            &self.comments,
        ) {
            (Some(provider), Some(member), Some(date), Some(service), Some(comments)) => {
                Ok(Transaction::from_parts(
                    Uuid::new_v4().to_string(),
                    provider.clone(),
                    member.clone(),
                    service.clone(),
                    *date,
                    self.clock.now(),
                    comments.clone(),
                ))
            }
            _ => Err(BuildError::Incomplete {
                missing: self.current_field().unwrap_or("nothing"),
            }
            .into()),
        }
    }
}

impl FieldBuilder for TransactionBuilder {
    fn current_field(&self) -> Option<&'static str> {
        if self.provider.is_none() {
            Some(fields::PROVIDER_ID)
        } else if self.member.is_none() {
            Some(fields::MEMBER_ID)
        } else if self.service_date.is_none() {
            Some(fields::SERVICE_DATE)
        } else if self.service.is_none() {
            Some(fields::SERVICE_CODE)
        } else if self.comments.is_none() {
            Some(fields::COMMENTS)
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
        self.provider = None;
        self.member = None;
        self.service_date = None;
        self.service = None;
        self.comments = None;
        self.errors.clear();
    }
}

impl fmt::Debug for TransactionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionBuilder")
            .field("provider", &self.provider)
            .field("member", &self.member)
            .field("service_date", &self.service_date)
            .field("service", &self.service)
            .field("comments", &self.comments)
            .field("errors", &self.errors)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::clock::FixedClock;
    use crate::backend::domain::models::account::{MemberStatus, Role};
    use crate::backend::storage::csv::{
        AccountRepository, CsvConnection, ServiceRepository,
    };
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn seeded_builder() -> (TransactionBuilder, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        let accounts = AccountRepository::new(connection.clone());
        let services = ServiceRepository::new(connection);

        let provider = Account::try_new(
            AccountId::from_value(100_000_001).unwrap(),
            "Paula",
            "Provider",
            "12 Main St",
            "Portland",
            "OR",
            "97201",
            Role::Provider,
        )
        .unwrap();
        let member = Account::try_new(
            AccountId::from_value(100_000_002).unwrap(),
            "Mary",
            "Member",
            "34 Oak Ave",
            "Salem",
            "OR",
            "97301",
            Role::Member {
                status: MemberStatus::Valid,
            },
        )
        .unwrap();
        let suspended = Account::try_new(
            AccountId::from_value(100_000_003).unwrap(),
            "Sam",
            "Suspended",
            "56 Elm St",
            "Eugene",
            "OR",
            "97401",
            Role::Member {
                status: MemberStatus::Suspended,
            },
        )
        .unwrap();
        accounts.store_account(&provider).unwrap();
        accounts.store_account(&member).unwrap();
        accounts.store_account(&suspended).unwrap();

        let service =
            Service::try_new(ServiceCode::parse("123456").unwrap(), "Dietitian", 45.0).unwrap();
        services.put_service(&service).unwrap();

        let clock = FixedClock(Utc.with_ymd_and_hms(2019, 10, 15, 12, 0, 0).unwrap());
        let builder =
            TransactionBuilder::new(Arc::new(accounts), Arc::new(services), Arc::new(clock));
        (builder, temp_dir)
    }

    #[test]
    fn test_happy_path_resolves_entities_at_acceptance() {
        let (mut builder, _temp_dir) = seeded_builder();
        assert!(builder.set_current_field("100000001"));
        assert!(builder.set_current_field("100000002"));
        assert!(builder.set_current_field("10-10-2019"));
        assert!(builder.set_current_field("123456"));
        assert!(!builder.buildable());
        assert!(builder.set_current_field("ok"));
        assert!(builder.buildable());

        let tx = builder.build().unwrap();
        assert_eq!(tx.provider().id().value(), 100_000_001);
        assert_eq!(tx.member().id().value(), 100_000_002);
        assert_eq!(tx.service().name(), "Dietitian");
        assert_eq!(
            tx.service_date(),
            NaiveDate::from_ymd_opt(2019, 10, 10).unwrap()
        );
        assert_eq!(tx.filed_at(), Utc.with_ymd_and_hms(2019, 10, 15, 12, 0, 0).unwrap());
        assert_eq!(tx.comments(), "ok");
    }

    #[test]
    fn test_suspended_member_does_not_advance_cursor() {
        let (mut builder, _temp_dir) = seeded_builder();
        assert!(builder.set_current_field("100000001"));
        assert!(!builder.set_current_field("100000003"));
        assert_eq!(builder.current_field(), Some(fields::MEMBER_ID));
        assert!(matches!(
            builder.errors()[0].error,
            ValidationError::FailedWith { .. }
        ));
    }

    #[test]
    fn test_wrong_role_is_rejected_per_field() {
        let (mut builder, _temp_dir) = seeded_builder();
        // A member id where a provider id is expected.
        assert!(!builder.set_current_field("100000002"));
        assert_eq!(builder.current_field(), Some(fields::PROVIDER_ID));

        assert!(builder.set_current_field("100000001"));
        // And a provider id where a member id is expected.
        assert!(!builder.set_current_field("100000001"));
        assert_eq!(builder.current_field(), Some(fields::MEMBER_ID));
    }

    #[test]
    fn test_unknown_id_and_code_are_field_errors() {
        let (mut builder, _temp_dir) = seeded_builder();
        assert!(!builder.set_current_field("999999999"));
        assert!(matches!(
            builder.errors()[0].error,
            ValidationError::InvalidValue { .. }
        ));

        assert!(builder.set_current_field("100000001"));
        assert!(builder.set_current_field("100000002"));
        assert!(builder.set_current_field("10-10-2019"));
        assert!(!builder.set_current_field("654321"));
        assert_eq!(builder.current_field(), Some(fields::SERVICE_CODE));
    }

    #[test]
    fn test_future_service_date_is_rejected() {
        let (mut builder, _temp_dir) = seeded_builder();
        builder.set_current_field("100000001");
        builder.set_current_field("100000002");
        assert!(!builder.set_current_field("10-16-2019"));
        assert_eq!(builder.current_field(), Some(fields::SERVICE_DATE));
        // The filing day itself is fine.
        assert!(builder.set_current_field("10-15-2019"));
    }

    #[test]
    fn test_malformed_date_is_rejected() {
        let (mut builder, _temp_dir) = seeded_builder();
        builder.set_current_field("100000001");
        builder.set_current_field("100000002");
        assert!(!builder.set_current_field("2019-10-10"));
        assert!(!builder.set_current_field("13-40-2019"));
        assert_eq!(builder.current_field(), Some(fields::SERVICE_DATE));
    }

    #[test]
    fn test_comment_bound() {
        let (mut builder, _temp_dir) = seeded_builder();
        builder.set_current_field("100000001");
        builder.set_current_field("100000002");
        builder.set_current_field("10-10-2019");
        builder.set_current_field("123456");
        let long = "x".repeat(MAX_COMMENT_LEN + 1);
        assert!(!builder.set_current_field(&long));
        // Empty comments are allowed.
        assert!(builder.set_current_field(""));
        assert!(builder.buildable());
    }

    #[test]
    fn test_build_before_complete_is_an_error() {
        let (builder, _temp_dir) = seeded_builder();
        assert!(builder.build().is_err());
    }

    #[test]
    fn test_reset_matches_fresh_builder() {
        let (mut builder, _temp_dir) = seeded_builder();
        builder.set_current_field("100000001");
        builder.set_current_field("100000002");
        builder.reset();
        assert_eq!(builder.current_field(), Some(fields::PROVIDER_ID));
        assert!(!builder.buildable());
        assert!(builder.errors().is_empty());
        builder.reset();
        assert_eq!(builder.current_field(), Some(fields::PROVIDER_ID));
    }
}
