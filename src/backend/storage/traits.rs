//! # Storage Traits
//!
//! The collaborator interfaces the core needs from persistent storage. The
//! domain layer works against these traits only; the CSV implementation in
//! `storage::csv` is one backend for them.
//!
//! All operations are synchronous: the terminal issues at most one storage
//! call at a time and never pipelines requests.

use anyhow::Result;
use chrono::NaiveDate;

use crate::backend::domain::models::account::{Account, AccountId};
use crate::backend::domain::models::service::{Service, ServiceCode};
use crate::backend::domain::models::transaction::Transaction;

/// Account record storage.
pub trait AccountStore: Send + Sync {
    /// Store a newly created account.
    fn store_account(&self, account: &Account) -> Result<()>;

    /// Retrieve a specific account by id.
    fn get_account(&self, id: AccountId) -> Result<Option<Account>>;

    /// List all accounts ordered by id.
    fn list_accounts(&self) -> Result<Vec<Account>>;

    /// Update an existing account. Fails if the account is not on file.
    fn update_account(&self, account: &Account) -> Result<()>;

    /// Delete an account by id. Returns true if it was found and deleted.
    fn delete_account(&self, id: AccountId) -> Result<bool>;

    /// Whether an account with this id is on file.
    fn account_exists(&self, id: AccountId) -> Result<bool>;
}

/// Hands out account ids. An id, once returned, is never returned again -
/// not even for accounts that were later deleted.
pub trait IdAllocator: Send + Sync {
    fn allocate_unique_id(&self) -> Result<AccountId>;
}

/// The service directory. Read-only from the core's point of view; entries
/// are provisioned by the claims office, not constructed in a session.
pub trait ServiceStore: Send + Sync {
    /// Retrieve a directory entry by code.
    fn get_service(&self, code: ServiceCode) -> Result<Option<Service>>;

    /// List the full directory ordered by code.
    fn list_services(&self) -> Result<Vec<Service>>;
}

/// The filed-claim ledger.
pub trait TransactionStore: Send + Sync {
    /// Append a filed claim to the ledger.
    fn store_transaction(&self, transaction: &Transaction) -> Result<()>;

    /// List every filed claim in filing order.
    fn list_transactions(&self) -> Result<Vec<Transaction>>;

    /// List claims whose service date falls inside the inclusive range.
    fn list_transactions_in_period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>>;
}
