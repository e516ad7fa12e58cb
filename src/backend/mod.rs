//! # Backend
//!
//! Wires the file-backed stores into the domain services. The terminal's
//! controller talks to this struct only; everything here is synchronous and
//! single-operator.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

pub mod domain;
pub mod storage;

use domain::builders::TransactionBuilder;
use domain::clock::{Clock, SystemClock};
use domain::{
    AccountService, DirectoryService, ReportService, SessionService, TransactionService,
};
use storage::csv::{
    AccountRepository, CsvConnection, GlobalConfigRepository, ServiceRepository,
    TransactionRepository,
};
use storage::traits::{AccountStore, ServiceStore};

/// Main backend struct that orchestrates all services.
pub struct Backend {
    pub session_service: SessionService,
    pub account_service: AccountService,
    pub transaction_service: TransactionService,
    pub report_service: ReportService,
    pub directory_service: DirectoryService,
    pub config_repository: GlobalConfigRepository,
    accounts: Arc<dyn AccountStore>,
    services: Arc<dyn ServiceStore>,
    clock: Arc<dyn Clock>,
}

impl Backend {
    /// Create a backend over a data directory, on the system clock.
    pub fn new(data_directory: &Path) -> Result<Self> {
        Self::with_clock(data_directory, Arc::new(SystemClock))
    }

    /// Create a backend with an explicit clock. Tests pin the calendar here.
    pub fn with_clock(data_directory: &Path, clock: Arc<dyn Clock>) -> Result<Self> {
        let connection = Arc::new(CsvConnection::new(data_directory)?);

        let account_repository = Arc::new(AccountRepository::new(connection.clone()));
        let service_repository = ServiceRepository::new(connection.clone());
        service_repository.ensure_seeded()?;
        let service_repository = Arc::new(service_repository);
        let transaction_repository = Arc::new(TransactionRepository::new(connection.clone()));

        let accounts: Arc<dyn AccountStore> = account_repository.clone();
        let services: Arc<dyn ServiceStore> = service_repository;

        let session_service = SessionService::new(accounts.clone());
        let account_service =
            AccountService::new(accounts.clone(), account_repository);
        let transaction_service = TransactionService::new(transaction_repository.clone());
        let report_service = ReportService::new(transaction_repository, connection.clone());
        let directory_service = DirectoryService::new(services.clone());
        let config_repository = GlobalConfigRepository::new(connection);

        Ok(Backend {
            session_service,
            account_service,
            transaction_service,
            report_service,
            directory_service,
            config_repository,
            accounts,
            services,
            clock,
        })
    }

    /// A fresh claim builder wired to this backend's stores and clock.
    pub fn new_transaction_builder(&self) -> TransactionBuilder {
        TransactionBuilder::new(
            self.accounts.clone(),
            self.services.clone(),
            self.clock.clone(),
        )
    }

    pub fn clock(&self) -> &dyn Clock {
        &*self.clock
    }
}
