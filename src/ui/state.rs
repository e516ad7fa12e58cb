//! The closed set of interaction states.

use crate::backend::domain::builders::{
    AccountBuilder, FieldBuilder, PeriodBuilder, TransactionBuilder,
};
use crate::backend::domain::models::account::Account;
use crate::backend::domain::models::service::Service;
use crate::backend::domain::models::transaction::Transaction;
use crate::backend::domain::report_service::ActivityReport;

/// Which menu a detour state should return to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    Provider,
    Manager,
}

/// Exactly one variant is current at any time. Variants carry only the data
/// needed to resume: builder-bearing states own their builder (it moves in
/// and out with the state, so no two states ever alias one), and notices are
/// presentation detail, never state identity.
///
/// `Login` is initial; `Exit` is terminal.
#[derive(Debug, Clone)]
pub enum AppState {
    Login {
        notice: Option<String>,
    },
    ProviderMenu {
        notice: Option<String>,
    },
    ManagerMenu {
        notice: Option<String>,
    },
    AddTransaction {
        builder: TransactionBuilder,
    },
    ConfirmTransaction {
        transaction: Transaction,
    },
    CreateAccount {
        builder: AccountBuilder,
    },
    UpdateAccount {
        /// `None` while the target id is still being collected.
        target: Option<Account>,
        builder: AccountBuilder,
        notice: Option<String>,
    },
    DeleteAccount {
        /// `None` while the target id is still being collected; `Some` while
        /// awaiting the yes/no confirmation.
        pending: Option<Account>,
        notice: Option<String>,
    },
    ViewAccount {
        notice: Option<String>,
    },
    GenerateReport {
        builder: PeriodBuilder,
    },
    ViewReport {
        report: ActivityReport,
    },
    ServiceDirectory {
        origin: Menu,
        services: Vec<Service>,
    },
    Exit,
}

impl AppState {
    /// The builder the current state is driving, if any. This and
    /// [`FieldBuilder::errors`] are all a renderer needs to prompt.
    pub fn active_builder(&self) -> Option<&dyn FieldBuilder> {
        match self {
            AppState::AddTransaction { builder } => Some(builder),
            AppState::CreateAccount { builder } => Some(builder),
            AppState::UpdateAccount {
                target: Some(_),
                builder,
                ..
            } => Some(builder),
            AppState::GenerateReport { builder } => Some(builder),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppState::Exit)
    }

    /// Stable name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            AppState::Login { .. } => "login",
            AppState::ProviderMenu { .. } => "provider-menu",
            AppState::ManagerMenu { .. } => "manager-menu",
            AppState::AddTransaction { .. } => "add-transaction",
            AppState::ConfirmTransaction { .. } => "confirm-transaction",
            AppState::CreateAccount { .. } => "create-account",
            AppState::UpdateAccount { .. } => "update-account",
            AppState::DeleteAccount { .. } => "delete-account",
            AppState::ViewAccount { .. } => "view-account",
            AppState::GenerateReport { .. } => "generate-report",
            AppState::ViewReport { .. } => "view-report",
            AppState::ServiceDirectory { .. } => "service-directory",
            AppState::Exit => "exit",
        }
    }
}
