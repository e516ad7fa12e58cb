//! # File-backed Storage
//!
//! Implements the storage traits on plain files under one data directory:
//! YAML record files for accounts, CSV for the service directory and the
//! filed-claim ledger. Writes go through an atomic temp-file rename so a
//! crash never leaves a half-written record behind.

pub mod account_repository;
pub mod connection;
pub mod global_config_repository;
pub mod service_repository;
pub mod transaction_repository;

pub use account_repository::AccountRepository;
pub use connection::CsvConnection;
pub use global_config_repository::{GlobalConfigRepository, TerminalConfig};
pub use service_repository::ServiceRepository;
pub use transaction_repository::TransactionRepository;
