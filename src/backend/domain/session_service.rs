//! Operator session handling: login, role gating, logout.

use std::sync::Arc;

use log::{info, warn};

use crate::backend::domain::models::account::{Account, AccountId, Role};
use crate::backend::storage::traits::AccountStore;

/// What a login attempt produced. Only managers and providers operate the
/// terminal; member ids are rejected like unknown ones, with a reason the
/// renderer can show.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Manager(Account),
    Provider(Account),
    Rejected(String),
}

#[derive(Clone)]
pub struct SessionService {
    accounts: Arc<dyn AccountStore>,
}

impl SessionService {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    /// Resolve a typed id into an operator session.
    pub fn login(&self, raw_id: &str) -> LoginOutcome {
        let id = match AccountId::parse(raw_id.trim()) {
            Ok(id) => id,
            Err(e) => {
                warn!("Login rejected, malformed id: {:?}", raw_id);
                return LoginOutcome::Rejected(e.to_string());
            }
        };

        let account = match self.accounts.get_account(id) {
            Ok(Some(account)) => account,
            Ok(None) => {
                warn!("Login rejected, no account on file for {}", id);
                return LoginOutcome::Rejected(format!("No account on file for {}", id));
            }
            Err(e) => {
                warn!("Login lookup failed for {}: {}", id, e);
                return LoginOutcome::Rejected("Account lookup failed, try again".to_string());
            }
        };

        match account.role() {
            Role::Manager => {
                info!("Manager {} logged in", account.id());
                LoginOutcome::Manager(account)
            }
            Role::Provider => {
                info!("Provider {} logged in", account.id());
                LoginOutcome::Provider(account)
            }
            Role::Member { .. } => {
                warn!("Login rejected, {} is a member account", id);
                LoginOutcome::Rejected(format!("{} is a member account, not an operator", id))
            }
        }
    }

    pub fn logout(&self, operator: &Account) {
        info!(
            "{} {} logged out",
            operator.role().label(),
            operator.id()
        );
    }
}
