//! Domain model for an operator or member account.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::backend::domain::validation::{
    self, FieldError, InvalidEntity, ValidationError,
};

/// Field names shared by the account builder, the direct constructor and the
/// renderer, so errors always point at the same prompts.
pub mod fields {
    pub const ACCOUNT_TYPE: &str = "account type";
    pub const FIRST_NAME: &str = "first name";
    pub const LAST_NAME: &str = "last name";
    pub const STREET: &str = "street";
    pub const CITY: &str = "city";
    pub const STATE: &str = "state";
    pub const ZIP: &str = "zip code";
}

/// 9-digit account number. Assigned once by the id allocator, never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AccountId(u32);

impl AccountId {
    pub const MIN: u32 = 100_000_000;
    pub const MAX: u32 = 999_999_999;

    /// Parse an operator-typed id: exactly nine digits, in range.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        validation::digits_exact(raw, 9)?;
        let value: u32 = raw.parse().map_err(|_| ValidationError::InvalidValue {
            value: raw.to_string(),
            expected: "a 9-digit account number".to_string(),
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

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:09}", self.0)
    }
}

/// Whether a member is in good standing. Suspended members cannot receive
/// services until reinstated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    Valid,
    Suspended,
}

/// The role tag that decides which menus and operations an account reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Manager,
    Provider,
    Member { status: MemberStatus },
}

impl Role {
    /// Parse an operator-typed account type. New members start Valid.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "manager" => Ok(Role::Manager),
            "provider" => Ok(Role::Provider),
            "member" => Ok(Role::Member {
                status: MemberStatus::Valid,
            }),
            _ => Err(ValidationError::InvalidValue {
                value: raw.to_string(),
                expected: "one of: manager, provider, member".to_string(),
            }),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Provider => "provider",
            Role::Member { .. } => "member",
        }
    }

    pub fn matches(&self, filter: RoleFilter) -> bool {
        match (filter, self) {
            (RoleFilter::Any, _) => true,
            (RoleFilter::Manager, Role::Manager) => true,
            (RoleFilter::Provider, Role::Provider) => true,
            (RoleFilter::Member, Role::Member { .. }) => true,
            _ => false,
        }
    }
}

/// Narrows account lookups to the role a flow requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleFilter {
    Any,
    Manager,
    Provider,
    Member,
}

/// A validated first/last name pair. Each part is bounded on its own and the
/// pair must fit the combined bound together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Name {
    first: String,
    last: String,
}

impl Name {
    pub const MAX_PART: usize = 24;
    pub const MAX_COMBINED: usize = 25;

    pub fn new(first: &str, last: &str) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();

        if let Err(e) = validation::length_in(first, 1, Self::MAX_PART) {
            errors.push(FieldError::new(fields::FIRST_NAME, e));
        } else if let Err(e) = validation::alphabetic(first) {
            errors.push(FieldError::new(fields::FIRST_NAME, e));
        }

        if let Err(e) = validation::length_in(last, 1, Self::MAX_PART) {
            errors.push(FieldError::new(fields::LAST_NAME, e));
        } else if let Err(e) = validation::alphabetic(last) {
            errors.push(FieldError::new(fields::LAST_NAME, e));
        }

        if errors.is_empty() && !Self::combined_fits(first, last) {
            errors.push(FieldError::new(
                fields::LAST_NAME,
                ValidationError::IncompatibleValues {
                    a: first.to_string(),
                    b: last.to_string(),
                },
            ));
        }

        if errors.is_empty() {
            Ok(Self::from_validated(first, last))
        } else {
            Err(errors)
        }
    }

    /// Whether a first/last pair fits the combined bound.
    pub fn combined_fits(first: &str, last: &str) -> bool {
        first.chars().count() + last.chars().count() <= Self::MAX_COMBINED
    }

    /// Assemble from parts the per-field validators have already accepted.
    pub(crate) fn from_validated(first: &str, last: &str) -> Self {
        Self {
            first: first.to_string(),
            last: last.to_string(),
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn last(&self) -> &str {
        &self.last
    }

    pub fn full(&self) -> String {
        format!("{} {}", self.first, self.last)
    }
}

/// A validated postal address. State codes are normalized to uppercase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    street: String,
    city: String,
    state: String,
    zip: String,
}

impl Address {
    pub const MAX_STREET: usize = 25;
    pub const MAX_CITY: usize = 14;
    pub const ZIP_DIGITS: usize = 5;

    /// Validate all four sub-fields together. Independent failures are
    /// reported together so the operator sees every problem in one pass.
    pub fn new(street: &str, city: &str, state: &str, zip: &str) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();

        if let Err(e) = validation::length_in(street, 1, Self::MAX_STREET) {
            errors.push(FieldError::new(fields::STREET, e));
        }
        if let Err(e) = validation::length_in(city, 1, Self::MAX_CITY) {
            errors.push(FieldError::new(fields::CITY, e));
        }
        let normalized_state = match validation::us_state_code(state) {
            Ok(code) => Some(code),
            Err(e) => {
                errors.push(FieldError::new(fields::STATE, e));
                None
            }
        };
        if let Err(e) = validation::digits_exact(zip, Self::ZIP_DIGITS) {
            errors.push(FieldError::new(fields::ZIP, e));
        }

        match (errors.is_empty(), normalized_state) {
            (true, Some(state)) => Ok(Self {
                street: street.to_string(),
                city: city.to_string(),
                state,
                zip: zip.to_string(),
            }),
            _ => Err(errors),
        }
    }

    /// Assemble from parts the per-field validators have already accepted.
    /// The state code must already be normalized.
    pub(crate) fn from_validated(street: &str, city: &str, state: &str, zip: &str) -> Self {
        Self {
            street: street.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            zip: zip.to_string(),
        }
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn zip(&self) -> &str {
        &self.zip
    }
}

/// An account on file: identity, name, address and role.
///
/// Identity never changes; name and address change only through update flows
/// that re-run the same validators; a member's status may be toggled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    name: Name,
    address: Address,
    role: Role,
}

impl Account {
    /// Validating constructor for callers that bypass the account builder.
    /// Runs every field validator and surfaces all failures at once.
    pub fn try_new(
        id: AccountId,
        first: &str,
        last: &str,
        street: &str,
        city: &str,
        state: &str,
        zip: &str,
        role: Role,
    ) -> Result<Self, InvalidEntity> {
        let mut errors = Vec::new();

        let name = match Name::new(first, last) {
            Ok(name) => Some(name),
            Err(mut errs) => {
                errors.append(&mut errs);
                None
            }
        };
        let address = match Address::new(street, city, state, zip) {
            Ok(address) => Some(address),
            Err(mut errs) => {
                errors.append(&mut errs);
                None
            }
        };

        match (name, address) {
            (Some(name), Some(address)) => Ok(Self {
                id,
                name,
                address,
                role,
            }),
            _ => Err(InvalidEntity::new(errors)),
        }
    }

    /// Assemble from already-validated parts. Builder completion lands here.
    pub(crate) fn from_parts(id: AccountId, name: Name, address: Address, role: Role) -> Self {
        Self {
            id,
            name,
            address,
            role,
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_suspended(&self) -> bool {
        matches!(
            self.role,
            Role::Member {
                status: MemberStatus::Suspended
            }
        )
    }

    /// Toggle a member's standing. Fails on non-member accounts.
    pub fn set_member_status(&mut self, status: MemberStatus) -> Result<(), ValidationError> {
        match self.role {
            Role::Member { .. } => {
                self.role = Role::Member { status };
                Ok(())
            }
            _ => Err(ValidationError::FailedWith {
                value: self.id.to_string(),
                reason: format!("a {} account has no member status", self.role.label()),
            }),
        }
    }
}

// Two accounts are the same account iff their ids are equal.
impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Account {}

impl Hash for Account {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
