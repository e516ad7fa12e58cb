//! Filing of completed claims.

use std::sync::Arc;

use anyhow::Result;
use log::info;

use crate::backend::domain::models::transaction::Transaction;
use crate::backend::storage::traits::TransactionStore;

#[derive(Clone)]
pub struct TransactionService {
    transactions: Arc<dyn TransactionStore>,
}

impl TransactionService {
    pub fn new(transactions: Arc<dyn TransactionStore>) -> Self {
        Self { transactions }
    }

    /// Persist a claim the operator confirmed. The claim was fully validated
    /// at construction; filing is pure persistence.
    pub fn file_claim(&self, transaction: Transaction) -> Result<Transaction> {
        self.transactions.store_transaction(&transaction)?;
        info!(
            "Claim {} filed: {} for member {} on {}",
            transaction.record_id(),
            transaction.service().name(),
            transaction.member().id(),
            transaction.service_date()
        );
        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::account::{
        Account, AccountId, MemberStatus, Role,
    };
    use crate::backend::domain::models::service::{Service, ServiceCode};
    use crate::backend::storage::csv::{
        AccountRepository, CsvConnection, TransactionRepository,
    };
    use crate::backend::storage::traits::AccountStore;
    use chrono::{NaiveDate, TimeZone, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_filed_claim_is_listed_back() {
        let temp_dir = TempDir::new().unwrap();
        let connection = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        let accounts = AccountRepository::new(connection.clone());
        let ledger = Arc::new(TransactionRepository::new(connection));
        let service = TransactionService::new(ledger.clone());

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
        accounts.store_account(&provider).unwrap();
        accounts.store_account(&member).unwrap();

        let claim = Transaction::try_new(
            provider,
            member,
            Service::try_new(ServiceCode::parse("598470").unwrap(), "Dietitian", 45.0).unwrap(),
            NaiveDate::from_ymd_opt(2019, 10, 10).unwrap(),
            "ok",
            Utc.with_ymd_and_hms(2019, 10, 15, 12, 0, 0).unwrap(),
        )
        .unwrap();

        let filed = service.file_claim(claim.clone()).unwrap();
        assert_eq!(filed, claim);

        use crate::backend::storage::traits::TransactionStore;
        assert_eq!(ledger.list_transactions().unwrap(), vec![claim]);
    }
}
