//! YAML-file-per-account store with filesystem discovery.

use std::fs;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::connection::CsvConnection;
use crate::backend::domain::models::account::{
    Account, AccountId, MemberStatus, Role,
};
use crate::backend::storage::traits::{AccountStore, IdAllocator};

/// Intermediate struct for YAML serialization with flat string fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct YamlAccount {
    id: u32,
    first_name: String,
    last_name: String,
    street: String,
    city: String,
    state: String,
    zip: String,
    role: String,
    status: Option<String>,
}

impl YamlAccount {
    fn from_account(account: &Account) -> Self {
        let status = match account.role() {
            Role::Member {
                status: MemberStatus::Suspended,
            } => Some("suspended".to_string()),
            Role::Member {
                status: MemberStatus::Valid,
            } => Some("valid".to_string()),
            _ => None,
        };
        Self {
            id: account.id().value(),
            first_name: account.name().first().to_string(),
            last_name: account.name().last().to_string(),
            street: account.address().street().to_string(),
            city: account.address().city().to_string(),
            state: account.address().state().to_string(),
            zip: account.address().zip().to_string(),
            role: account.role().label().to_string(),
            status,
        }
    }

    /// Map back to the domain model, re-running the field validators so a
    /// hand-edited or corrupted record file is rejected instead of loaded.
    fn into_account(self) -> Result<Account> {
        let role = match (self.role.as_str(), self.status.as_deref()) {
            ("manager", _) => Role::Manager,
            ("provider", _) => Role::Provider,
            ("member", Some("suspended")) => Role::Member {
                status: MemberStatus::Suspended,
            },
            ("member", _) => Role::Member {
                status: MemberStatus::Valid,
            },
            (other, _) => return Err(anyhow!("Unknown account role: {}", other)),
        };
        let id = AccountId::from_value(self.id)
            .map_err(|e| anyhow!("Bad account id {}: {}", self.id, e))?;
        Account::try_new(
            id,
            &self.first_name,
            &self.last_name,
            &self.street,
            &self.city,
            &self.state,
            &self.zip,
            role,
        )
        .map_err(|e| anyhow!("Account record {} failed validation: {}", self.id, e))
    }
}

/// File-backed account store. Also the id allocator: ids are strictly
/// increasing over every id ever observed on disk, so deleting an account
/// never frees its number for reuse.
#[derive(Clone)]
pub struct AccountRepository {
    connection: Arc<CsvConnection>,
}

impl AccountRepository {
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self { connection }
    }

    /// Discover all accounts by scanning the accounts directory.
    fn discover_accounts(&self) -> Result<Vec<Account>> {
        let accounts_dir = self.connection.accounts_directory();
        if !accounts_dir.exists() {
            debug!("Accounts directory doesn't exist, returning empty list");
            return Ok(Vec::new());
        }

        let mut accounts = Vec::new();
        for entry in fs::read_dir(&accounts_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            match self.load_account_file(&path) {
                Ok(account) => accounts.push(account),
                Err(e) => {
                    warn!("Skipping unreadable account file {:?}: {}", path, e);
                }
            }
        }

        accounts.sort_by_key(|a| a.id());
        debug!("Discovered {} accounts", accounts.len());
        Ok(accounts)
    }

    fn load_account_file(&self, path: &std::path::Path) -> Result<Account> {
        let yaml_content = fs::read_to_string(path)?;
        let yaml_account: YamlAccount = serde_yaml::from_str(&yaml_content)?;
        yaml_account.into_account()
    }

    fn save_account(&self, account: &Account) -> Result<()> {
        let yaml_account = YamlAccount::from_account(account);
        let yaml_content = serde_yaml::to_string(&yaml_account)?;
        let path = self.connection.account_file_path(account.id());
        self.connection.write_atomic(&path, &yaml_content)?;
        info!("Saved account {} ({})", account.id(), account.role().label());
        Ok(())
    }

    /// Highest id ever handed out, tracked in a high-water-mark file so
    /// deleted accounts don't resurrect their ids.
    fn high_water_mark(&self) -> Result<u32> {
        let path = self
            .connection
            .base_directory()
            .join("next_account_id.yaml");
        let recorded: u32 = if path.exists() {
            serde_yaml::from_str(&fs::read_to_string(&path)?)?
        } else {
            0
        };
        let on_disk = self
            .discover_accounts()?
            .iter()
            .map(|a| a.id().value())
            .max()
            .unwrap_or(0);
        Ok(recorded.max(on_disk))
    }

    fn record_high_water_mark(&self, id: u32) -> Result<()> {
        let path = self
            .connection
            .base_directory()
            .join("next_account_id.yaml");
        self.connection
            .write_atomic(&path, &serde_yaml::to_string(&id)?)
    }
}

impl AccountStore for AccountRepository {
    fn store_account(&self, account: &Account) -> Result<()> {
        if self.account_exists(account.id())? {
            return Err(anyhow!("Account {} already on file", account.id()));
        }
        self.save_account(account)
    }

    fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        let path = self.connection.account_file_path(id);
        if !path.exists() {
            return Ok(None);
        }
        self.load_account_file(&path).map(Some)
    }

    fn list_accounts(&self) -> Result<Vec<Account>> {
        self.discover_accounts()
    }

    fn update_account(&self, account: &Account) -> Result<()> {
        if !self.account_exists(account.id())? {
            warn!("Attempted to update a non-existent account: {}", account.id());
            return Err(anyhow!("Account {} not on file", account.id()));
        }
        self.save_account(account)
    }

    fn delete_account(&self, id: AccountId) -> Result<bool> {
        let path = self.connection.account_file_path(id);
        if !path.exists() {
            warn!("Attempted to delete a non-existent account: {}", id);
            return Ok(false);
        }
        fs::remove_file(&path)?;
        info!("Deleted account {}", id);
        Ok(true)
    }

    fn account_exists(&self, id: AccountId) -> Result<bool> {
        Ok(self.connection.account_file_path(id).exists())
    }
}

impl IdAllocator for AccountRepository {
    fn allocate_unique_id(&self) -> Result<AccountId> {
        let mark = self.high_water_mark()?;
        let next = if mark < AccountId::MIN {
            AccountId::MIN
        } else {
            mark + 1
        };
        let id = AccountId::from_value(next)
            .map_err(|_| anyhow!("Account id space exhausted at {}", mark))?;
        self.record_high_water_mark(next)?;
        debug!("Allocated account id {}", id);
        Ok(id)
    }
}
