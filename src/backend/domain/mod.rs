//! Domain layer: models, builders, validation and services.

pub mod account_service;
pub mod builders;
pub mod clock;
pub mod directory_service;
pub mod models;
pub mod report_service;
pub mod session_service;
pub mod transaction_service;
pub mod validation;

pub use account_service::AccountService;
pub use directory_service::DirectoryService;
pub use report_service::ReportService;
pub use session_service::{LoginOutcome, SessionService};
pub use transaction_service::TransactionService;
