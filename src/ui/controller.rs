//! The transition function: (state, one line of input) -> next state.
//!
//! Every edge of the interaction graph lives in this one exhaustive match.
//! Collaborator side effects (login/logout, record creation, claim filing,
//! report aggregation) fire only at the state boundaries below; builder
//! states delegate their input to the active builder and stay put until it
//! reports buildable.

use log::{debug, error};

use crate::backend::domain::builders::{
    AccountBuilder, FieldBuilder, PeriodBuilder, TransactionBuilder,
};
use crate::backend::domain::models::account::{Account, AccountId, RoleFilter};
use crate::backend::domain::models::transaction::Transaction;
use crate::backend::domain::LoginOutcome;
use crate::backend::Backend;
use crate::ui::renderer;
use crate::ui::state::{AppState, Menu};

/// Reserved words, checked before input reaches a builder.
const EXIT_COMMAND: &str = "exit";
const CANCEL_COMMAND: &str = "cancel";

pub struct StateController {
    backend: Backend,
    session: Option<Account>,
}

impl StateController {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            session: None,
        }
    }

    pub fn initial_state() -> AppState {
        AppState::Login { notice: None }
    }

    pub fn session(&self) -> Option<&Account> {
        self.session.as_ref()
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Advance the state machine by one operator turn.
    pub fn next_state(&mut self, state: AppState, input: &str) -> AppState {
        let input = input.trim();
        debug!("Input in state {}: {:?}", state.name(), input);

        // The exit command works everywhere, including mid-build.
        if input.eq_ignore_ascii_case(EXIT_COMMAND) {
            return self.exit();
        }

        match state {
            AppState::Login { .. } => self.handle_login(input),
            AppState::ProviderMenu { .. } => self.handle_provider_menu(input),
            AppState::ManagerMenu { .. } => self.handle_manager_menu(input),
            AppState::AddTransaction { builder } => self.handle_add_transaction(builder, input),
            AppState::ConfirmTransaction { transaction } => {
                self.handle_confirm_transaction(transaction, input)
            }
            AppState::CreateAccount { builder } => self.handle_create_account(builder, input),
            AppState::UpdateAccount {
                target, builder, ..
            } => self.handle_update_account(target, builder, input),
            AppState::DeleteAccount { pending, .. } => self.handle_delete_account(pending, input),
            AppState::ViewAccount { .. } => self.handle_view_account(input),
            AppState::GenerateReport { builder } => self.handle_generate_report(builder, input),
            AppState::ViewReport { .. } => AppState::ManagerMenu { notice: None },
            AppState::ServiceDirectory { origin, .. } => match origin {
                Menu::Provider => AppState::ProviderMenu { notice: None },
                Menu::Manager => AppState::ManagerMenu { notice: None },
            },
            // Terminal: no transitions leave it.
            AppState::Exit => AppState::Exit,
        }
    }

    /// Session teardown fires at most once: the session is taken, so a
    /// second pass through here has nothing left to tear down.
    fn exit(&mut self) -> AppState {
        if let Some(operator) = self.session.take() {
            self.backend.session_service.logout(&operator);
        }
        AppState::Exit
    }

    fn logout_to_login(&mut self) -> AppState {
        if let Some(operator) = self.session.take() {
            self.backend.session_service.logout(&operator);
        }
        AppState::Login {
            notice: Some("Logged out".to_string()),
        }
    }

    fn handle_login(&mut self, input: &str) -> AppState {
        match self.backend.session_service.login(input) {
            LoginOutcome::Manager(account) => {
                let notice = format!("Welcome, {}", account.name().full());
                self.session = Some(account);
                AppState::ManagerMenu {
                    notice: Some(notice),
                }
            }
            LoginOutcome::Provider(account) => {
                let notice = format!("Welcome, {}", account.name().full());
                self.session = Some(account);
                AppState::ProviderMenu {
                    notice: Some(notice),
                }
            }
            LoginOutcome::Rejected(reason) => AppState::Login {
                notice: Some(reason),
            },
        }
    }

    fn handle_provider_menu(&mut self, input: &str) -> AppState {
        match input {
            "1" => AppState::AddTransaction {
                builder: self.backend.new_transaction_builder(),
            },
            "2" => self.open_service_directory(Menu::Provider),
            "0" => self.logout_to_login(),
            other => AppState::ProviderMenu {
                notice: Some(format!("Unrecognized option: {:?}", other)),
            },
        }
    }

    fn handle_manager_menu(&mut self, input: &str) -> AppState {
        match input {
            "1" => AppState::CreateAccount {
                builder: AccountBuilder::new(),
            },
            "2" => AppState::UpdateAccount {
                target: None,
                builder: AccountBuilder::new(),
                notice: None,
            },
            "3" => AppState::DeleteAccount {
                pending: None,
                notice: None,
            },
            "4" => AppState::ViewAccount { notice: None },
            "5" => AppState::GenerateReport {
                builder: PeriodBuilder::new(),
            },
            "6" => self.open_service_directory(Menu::Manager),
            "0" => self.logout_to_login(),
            other => AppState::ManagerMenu {
                notice: Some(format!("Unrecognized option: {:?}", other)),
            },
        }
    }

    fn open_service_directory(&self, origin: Menu) -> AppState {
        match self.backend.directory_service.list() {
            Ok(services) => AppState::ServiceDirectory { origin, services },
            Err(e) => {
                error!("Service directory unavailable: {}", e);
                let notice = Some("Service directory is unavailable".to_string());
                match origin {
                    Menu::Provider => AppState::ProviderMenu { notice },
                    Menu::Manager => AppState::ManagerMenu { notice },
                }
            }
        }
    }

    fn handle_add_transaction(
        &mut self,
        mut builder: TransactionBuilder,
        input: &str,
    ) -> AppState {
        if input.eq_ignore_ascii_case(CANCEL_COMMAND) {
            return AppState::ProviderMenu {
                notice: Some("Claim entry cancelled".to_string()),
            };
        }
        builder.set_current_field(input);
        if !builder.buildable() {
            return AppState::AddTransaction { builder };
        }
        match builder.build() {
            Ok(transaction) => AppState::ConfirmTransaction { transaction },
            Err(e) => {
                // Unreachable under correct driving; surfaced, not swallowed.
                error!("Claim assembly failed: {}", e);
                AppState::ProviderMenu {
                    notice: Some("Could not assemble the claim".to_string()),
                }
            }
        }
    }

    fn handle_confirm_transaction(
        &mut self,
        transaction: Transaction,
        input: &str,
    ) -> AppState {
        match input.to_ascii_lowercase().as_str() {
            "y" | "yes" => match self.backend.transaction_service.file_claim(transaction) {
                Ok(filed) => AppState::ProviderMenu {
                    notice: Some(format!("Claim {} filed", filed.record_id())),
                },
                Err(e) => {
                    error!("Failed to file claim: {}", e);
                    AppState::ProviderMenu {
                        notice: Some("Failed to file the claim".to_string()),
                    }
                }
            },
            "n" | "no" => AppState::AddTransaction {
                builder: self.backend.new_transaction_builder(),
            },
            // Anything else re-prompts.
            _ => AppState::ConfirmTransaction { transaction },
        }
    }

    fn handle_create_account(&mut self, mut builder: AccountBuilder, input: &str) -> AppState {
        if input.eq_ignore_ascii_case(CANCEL_COMMAND) {
            return AppState::ManagerMenu {
                notice: Some("Account creation cancelled".to_string()),
            };
        }
        builder.set_current_field(input);
        if !builder.buildable() {
            return AppState::CreateAccount { builder };
        }
        match self.backend.account_service.create_account(&builder) {
            Ok(account) => AppState::ManagerMenu {
                notice: Some(format!(
                    "Created {} account {}",
                    account.role().label(),
                    account.id()
                )),
            },
            Err(e) => {
                error!("Account creation failed: {}", e);
                AppState::ManagerMenu {
                    notice: Some("Failed to create the account".to_string()),
                }
            }
        }
    }

    fn handle_update_account(
        &mut self,
        target: Option<Account>,
        mut builder: AccountBuilder,
        input: &str,
    ) -> AppState {
        if input.eq_ignore_ascii_case(CANCEL_COMMAND) {
            return AppState::ManagerMenu {
                notice: Some("Account update cancelled".to_string()),
            };
        }
        let target = match target {
            None => {
                return match self.resolve_account(input) {
                    Ok(account) => AppState::UpdateAccount {
                        target: Some(account),
                        builder,
                        notice: None,
                    },
                    Err(notice) => AppState::UpdateAccount {
                        target: None,
                        builder,
                        notice: Some(notice),
                    },
                };
            }
            Some(account) => account,
        };
        builder.set_current_field(input);
        if !builder.buildable() {
            return AppState::UpdateAccount {
                target: Some(target),
                builder,
                notice: None,
            };
        }
        match self
            .backend
            .account_service
            .update_account(target.id(), &builder)
        {
            Ok(account) => AppState::ManagerMenu {
                notice: Some(format!("Updated account {}", account.id())),
            },
            Err(e) => {
                error!("Account update failed: {}", e);
                AppState::ManagerMenu {
                    notice: Some("Failed to update the account".to_string()),
                }
            }
        }
    }

    fn handle_delete_account(&mut self, pending: Option<Account>, input: &str) -> AppState {
        if input.eq_ignore_ascii_case(CANCEL_COMMAND) {
            return AppState::ManagerMenu {
                notice: Some("Account deletion cancelled".to_string()),
            };
        }
        let pending = match pending {
            None => {
                return match self.resolve_account(input) {
                    Ok(account) => AppState::DeleteAccount {
                        pending: Some(account),
                        notice: None,
                    },
                    Err(notice) => AppState::DeleteAccount {
                        pending: None,
                        notice: Some(notice),
                    },
                };
            }
            Some(account) => account,
        };
        match input.to_ascii_lowercase().as_str() {
            "y" | "yes" => match self.backend.account_service.delete_account(pending.id()) {
                Ok(()) => AppState::ManagerMenu {
                    notice: Some(format!("Deleted account {}", pending.id())),
                },
                Err(e) => {
                    error!("Account deletion failed: {}", e);
                    AppState::ManagerMenu {
                        notice: Some("Failed to delete the account".to_string()),
                    }
                }
            },
            "n" | "no" => AppState::ManagerMenu {
                notice: Some(format!("Account {} was not deleted", pending.id())),
            },
            _ => AppState::DeleteAccount {
                pending: Some(pending),
                notice: None,
            },
        }
    }

    fn handle_view_account(&mut self, input: &str) -> AppState {
        if input.eq_ignore_ascii_case(CANCEL_COMMAND) {
            return AppState::ManagerMenu { notice: None };
        }
        match self.resolve_account(input) {
            Ok(account) => AppState::ManagerMenu {
                notice: Some(renderer::account_details(&account)),
            },
            Err(notice) => AppState::ViewAccount {
                notice: Some(notice),
            },
        }
    }

    fn handle_generate_report(&mut self, mut builder: PeriodBuilder, input: &str) -> AppState {
        if input.eq_ignore_ascii_case(CANCEL_COMMAND) {
            return AppState::ManagerMenu {
                notice: Some("Report cancelled".to_string()),
            };
        }
        builder.set_current_field(input);
        if !builder.buildable() {
            return AppState::GenerateReport { builder };
        }
        let period = match builder.build() {
            Ok(period) => period,
            Err(e) => {
                error!("Period assembly failed: {}", e);
                return AppState::ManagerMenu {
                    notice: Some("Could not assemble the reporting period".to_string()),
                };
            }
        };
        match self.backend.report_service.activity_report(period) {
            Ok(report) => {
                if let Err(e) = self.backend.report_service.export_report(&report) {
                    // The on-screen report still renders; only the file copy failed.
                    error!("Report export failed: {}", e);
                }
                AppState::ViewReport { report }
            }
            Err(e) => {
                error!("Report aggregation failed: {}", e);
                AppState::ManagerMenu {
                    notice: Some("Failed to generate the report".to_string()),
                }
            }
        }
    }

    /// Resolve an operator-typed id to an account, mapping every failure to
    /// a notice for re-prompting.
    fn resolve_account(&self, input: &str) -> Result<Account, String> {
        let id = AccountId::parse(input).map_err(|e| e.to_string())?;
        match self.backend.account_service.lookup(id, RoleFilter::Any) {
            Ok(Some(account)) => Ok(account),
            Ok(None) => Err(format!("No account on file for {}", id)),
            Err(e) => {
                error!("Account lookup failed: {}", e);
                Err("Account lookup failed, try again".to_string())
            }
        }
    }
}
