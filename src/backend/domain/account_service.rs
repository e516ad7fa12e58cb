//! Account CRUD behind the manager flows.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use log::info;

use crate::backend::domain::builders::AccountBuilder;
use crate::backend::domain::models::account::{
    Account, AccountId, MemberStatus, Role, RoleFilter,
};
use crate::backend::storage::traits::{AccountStore, IdAllocator};

#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountStore>,
    ids: Arc<dyn IdAllocator>,
}

impl AccountService {
    pub fn new(accounts: Arc<dyn AccountStore>, ids: Arc<dyn IdAllocator>) -> Self {
        Self { accounts, ids }
    }

    /// Complete a create flow: draw a fresh id, assemble, persist.
    pub fn create_account(&self, builder: &AccountBuilder) -> Result<Account> {
        let account = builder.build(&*self.ids)?;
        self.accounts.store_account(&account)?;
        info!(
            "Created {} account {} for {}",
            account.role().label(),
            account.id(),
            account.name().full()
        );
        Ok(account)
    }

    /// Complete an update flow: re-assemble under the existing id, persist.
    /// Re-entering the member account type does not reinstate a suspended
    /// member; suspension changes only through `set_member_status`.
    pub fn update_account(&self, id: AccountId, builder: &AccountBuilder) -> Result<Account> {
        let mut account = builder.build_with_id(id)?;
        if let Some(existing) = self.accounts.get_account(id)? {
            if let (Role::Member { status }, Role::Member { .. }) =
                (existing.role(), account.role())
            {
                account
                    .set_member_status(status)
                    .map_err(|e| anyhow!("{}", e))?;
            }
        }
        self.accounts.update_account(&account)?;
        info!("Updated account {}", account.id());
        Ok(account)
    }

    pub fn delete_account(&self, id: AccountId) -> Result<()> {
        if !self.accounts.delete_account(id)? {
            return Err(anyhow!("Account {} not on file", id));
        }
        Ok(())
    }

    pub fn lookup(&self, id: AccountId, filter: RoleFilter) -> Result<Option<Account>> {
        Ok(self
            .accounts
            .get_account(id)?
            .filter(|account| account.role().matches(filter)))
    }

    /// Suspend or reinstate a member.
    pub fn set_member_status(&self, id: AccountId, status: MemberStatus) -> Result<Account> {
        let mut account = self
            .accounts
            .get_account(id)?
            .ok_or_else(|| anyhow!("Account {} not on file", id))?;
        account
            .set_member_status(status)
            .map_err(|e| anyhow!("{}", e))?;
        self.accounts.update_account(&account)?;
        info!("Set member {} status to {:?}", id, status);
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::builders::FieldBuilder;
    use crate::backend::domain::models::account::Role;
    use crate::backend::storage::csv::{AccountRepository, CsvConnection};
    use tempfile::TempDir;

    fn setup() -> (AccountService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        let repo = Arc::new(AccountRepository::new(connection));
        let service = AccountService::new(repo.clone(), repo);
        (service, temp_dir)
    }

    fn filled_builder(kind: &str) -> AccountBuilder {
        let mut builder = AccountBuilder::new();
        for input in [kind, "Jane", "Doe", "12 Main St", "Portland", "OR", "97201"] {
            assert!(builder.set_current_field(input));
        }
        builder
    }

    #[test]
    fn test_create_persists_and_allocates() {
        let (service, _temp_dir) = setup();
        let account = service.create_account(&filled_builder("member")).unwrap();
        assert_eq!(account.id().value(), 100_000_000);
        assert!(service
            .lookup(account.id(), RoleFilter::Member)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_update_keeps_the_id() {
        let (service, _temp_dir) = setup();
        let created = service.create_account(&filled_builder("provider")).unwrap();

        let mut builder = AccountBuilder::new();
        for input in ["provider", "Janet", "Doe", "99 Elm St", "Salem", "or", "97301"] {
            assert!(builder.set_current_field(input));
        }
        let updated = service.update_account(created.id(), &builder).unwrap();
        assert_eq!(updated.id(), created.id());

        let reloaded = service
            .lookup(created.id(), RoleFilter::Any)
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.name().first(), "Janet");
        assert_eq!(reloaded.address().state(), "OR");
    }

    #[test]
    fn test_lookup_respects_role_filter() {
        let (service, _temp_dir) = setup();
        let account = service.create_account(&filled_builder("member")).unwrap();
        assert!(service
            .lookup(account.id(), RoleFilter::Provider)
            .unwrap()
            .is_none());
        assert!(service
            .lookup(account.id(), RoleFilter::Any)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_delete_unknown_id_is_an_error() {
        let (service, _temp_dir) = setup();
        assert!(service
            .delete_account(AccountId::from_value(999_999_999).unwrap())
            .is_err());
    }

    #[test]
    fn test_update_does_not_reinstate_a_suspended_member() {
        let (service, _temp_dir) = setup();
        let member = service.create_account(&filled_builder("member")).unwrap();
        service
            .set_member_status(member.id(), MemberStatus::Suspended)
            .unwrap();

        let updated = service
            .update_account(member.id(), &filled_builder("member"))
            .unwrap();
        assert!(updated.is_suspended());
    }

    #[test]
    fn test_suspension_round_trip() {
        let (service, _temp_dir) = setup();
        let member = service.create_account(&filled_builder("member")).unwrap();

        let suspended = service
            .set_member_status(member.id(), MemberStatus::Suspended)
            .unwrap();
        assert!(suspended.is_suspended());

        let reinstated = service
            .set_member_status(member.id(), MemberStatus::Valid)
            .unwrap();
        assert!(!reinstated.is_suspended());

        let manager = service.create_account(&filled_builder("manager")).unwrap();
        assert!(service
            .set_member_status(manager.id(), MemberStatus::Suspended)
            .is_err());
    }
}
