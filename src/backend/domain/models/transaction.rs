//! Domain model for a filed service claim.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::backend::domain::models::account::{Account, Role, RoleFilter};
use crate::backend::domain::models::service::Service;
use crate::backend::domain::validation::{
    self, FieldError, InvalidEntity, ValidationError,
};

/// Operator-facing date format for service dates, e.g. `10-10-2019`.
pub const SERVICE_DATE_FORMAT: &str = "%m-%d-%Y";

/// Upper bound on the free-text comments attached to a claim.
pub const MAX_COMMENT_LEN: usize = 100;

/// Field names shared by the transaction builder and the renderer.
pub mod fields {
    pub const PROVIDER_ID: &str = "provider id";
    pub const MEMBER_ID: &str = "member id";
    pub const SERVICE_DATE: &str = "service date";
    pub const SERVICE_CODE: &str = "service code";
    pub const COMMENTS: &str = "comments";
}

/// A service claim: who provided what to whom, when, for how much.
///
/// Valid only when all structural checks hold at once; there is no such thing
/// as a partially-valid claim.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    record_id: String,
    provider: Account,
    member: Account,
    service: Service,
    service_date: NaiveDate,
    filed_at: DateTime<Utc>,
    comments: String,
}

impl Transaction {
    /// Validating constructor for callers that bypass the transaction
    /// builder. Every violated check is reported; none is swallowed.
    pub fn try_new(
        provider: Account,
        member: Account,
        service: Service,
        service_date: NaiveDate,
        comments: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, InvalidEntity> {
        let mut errors = Vec::new();

        if !provider.role().matches(RoleFilter::Provider) {
            errors.push(FieldError::new(
                fields::PROVIDER_ID,
                ValidationError::InvalidValue {
                    value: provider.id().to_string(),
                    expected: "a provider account".to_string(),
                },
            ));
        }
        match member.role() {
            Role::Member { .. } if member.is_suspended() => {
                errors.push(FieldError::new(
                    fields::MEMBER_ID,
                    ValidationError::FailedWith {
                        value: member.id().to_string(),
                        reason: "member is suspended".to_string(),
                    },
                ));
            }
            Role::Member { .. } => {}
            _ => {
                errors.push(FieldError::new(
                    fields::MEMBER_ID,
                    ValidationError::InvalidValue {
                        value: member.id().to_string(),
                        expected: "a member account".to_string(),
                    },
                ));
            }
        }
        if service_date > now.date_naive() {
            errors.push(FieldError::new(
                fields::SERVICE_DATE,
                ValidationError::FailedWith {
                    value: service_date.format(SERVICE_DATE_FORMAT).to_string(),
                    reason: "service date cannot be in the future".to_string(),
                },
            ));
        }
        if let Err(e) = validation::length_in(comments, 0, MAX_COMMENT_LEN) {
            errors.push(FieldError::new(fields::COMMENTS, e));
        }

        if errors.is_empty() {
            Ok(Self::from_parts(
                Uuid::new_v4().to_string(),
                provider,
                member,
                service,
                service_date,
                now,
                comments.to_string(),
            ))
        } else {
            Err(InvalidEntity::new(errors))
        }
    }

    /// Assemble from parts that already passed per-field validation. Builder
    /// completion and storage reconstitution land here.
    pub(crate) fn from_parts(
        record_id: String,
        provider: Account,
        member: Account,
        service: Service,
        service_date: NaiveDate,
        filed_at: DateTime<Utc>,
        comments: String,
    ) -> Self {
        Self {
            record_id,
            provider,
            member,
            service,
            service_date,
            filed_at,
            comments,
        }
    }

    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    pub fn provider(&self) -> &Account {
        &self.provider
    }

    pub fn member(&self) -> &Account {
        &self.member
    }

    pub fn service(&self) -> &Service {
        &self.service
    }

    pub fn service_date(&self) -> NaiveDate {
        self.service_date
    }

    pub fn filed_at(&self) -> DateTime<Utc> {
        self.filed_at
    }

    pub fn comments(&self) -> &str {
        &self.comments
    }
}
