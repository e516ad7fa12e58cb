//! Renders each state as a block of prompt text.
//!
//! The renderer reads only what the core exposes: the state variant itself,
//! and for builder-bearing states the active builder's current field name
//! and structured errors. All phrasing lives here; the core never formats
//! messages for the screen.

use std::fmt::Write as _;

use crate::backend::domain::builders::period_builder::fields as period_fields;
use crate::backend::domain::builders::FieldBuilder;
use crate::backend::domain::models::account::{fields as account_fields, Account};
use crate::backend::domain::models::transaction::{fields as claim_fields, Transaction};
use crate::backend::domain::report_service::ActivityReport;
use crate::ui::state::AppState;

pub struct Renderer {
    show_hints: bool,
}

impl Renderer {
    pub fn new(show_hints: bool) -> Self {
        Self { show_hints }
    }

    /// The full screen block for one state, ending in a prompt line.
    pub fn render(&self, state: &AppState) -> String {
        let mut out = String::new();
        match state {
            AppState::Login { notice } => {
                self.push_notice(&mut out, notice);
                out.push_str("=== Claims Terminal ===\n");
                out.push_str("Enter your account number to log in.\n");
                if self.show_hints {
                    out.push_str("(type exit to quit)\n");
                }
                out.push_str("> ");
            }
            AppState::ProviderMenu { notice } => {
                self.push_notice(&mut out, notice);
                out.push_str("--- Provider Menu ---\n");
                out.push_str("  1. File a claim\n");
                out.push_str("  2. Service directory\n");
                out.push_str("  0. Log out\n");
                if self.show_hints {
                    out.push_str("(type exit to quit)\n");
                }
                out.push_str("> ");
            }
            AppState::ManagerMenu { notice } => {
                self.push_notice(&mut out, notice);
                out.push_str("--- Manager Menu ---\n");
                out.push_str("  1. Create account\n");
                out.push_str("  2. Update account\n");
                out.push_str("  3. Delete account\n");
                out.push_str("  4. View account\n");
                out.push_str("  5. Activity report\n");
                out.push_str("  6. Service directory\n");
                out.push_str("  0. Log out\n");
                if self.show_hints {
                    out.push_str("(type exit to quit)\n");
                }
                out.push_str("> ");
            }
            AppState::AddTransaction { builder } => {
                out.push_str("--- New Claim ---\n");
                self.push_builder_prompt(&mut out, builder);
            }
            AppState::ConfirmTransaction { transaction } => {
                out.push_str("--- Confirm Claim ---\n");
                out.push_str(&claim_summary(transaction));
                out.push_str("File this claim? (y/n)\n> ");
            }
            AppState::CreateAccount { builder } => {
                out.push_str("--- New Account ---\n");
                self.push_builder_prompt(&mut out, builder);
            }
            AppState::UpdateAccount {
                target,
                builder,
                notice,
            } => {
                self.push_notice(&mut out, notice);
                match target {
                    None => {
                        out.push_str("--- Update Account ---\n");
                        out.push_str("Enter the account number to update.\n> ");
                    }
                    Some(account) => {
                        let _ = writeln!(out, "--- Updating {} ---", account.id());
                        self.push_builder_prompt(&mut out, builder);
                    }
                }
            }
            AppState::DeleteAccount { pending, notice } => {
                self.push_notice(&mut out, notice);
                match pending {
                    None => {
                        out.push_str("--- Delete Account ---\n");
                        out.push_str("Enter the account number to delete.\n> ");
                    }
                    Some(account) => {
                        let _ = writeln!(
                            out,
                            "Delete {} account {} ({})? (y/n)",
                            account.role().label(),
                            account.id(),
                            account.name().full()
                        );
                        out.push_str("> ");
                    }
                }
            }
            AppState::ViewAccount { notice } => {
                self.push_notice(&mut out, notice);
                out.push_str("--- View Account ---\n");
                out.push_str("Enter the account number to view.\n> ");
            }
            AppState::GenerateReport { builder } => {
                out.push_str("--- Activity Report ---\n");
                self.push_builder_prompt(&mut out, builder);
            }
            AppState::ViewReport { report } => {
                out.push_str(&report_text(report));
                out.push_str("Press enter to return to the menu.\n> ");
            }
            AppState::ServiceDirectory { services, .. } => {
                out.push_str("--- Service Directory ---\n");
                for service in services {
                    let _ = writeln!(
                        out,
                        "  {}  {:<20} {:>8.2}",
                        service.code(),
                        service.name(),
                        service.cost()
                    );
                }
                out.push_str("Press enter to return to the menu.\n> ");
            }
            AppState::Exit => {
                out.push_str("Goodbye.\n");
            }
        }
        out
    }

    fn push_notice(&self, out: &mut String, notice: &Option<String>) {
        if let Some(notice) = notice {
            let _ = writeln!(out, "{}", notice);
        }
    }

    /// Errors from the last attempt, then the prompt for the current field.
    fn push_builder_prompt(&self, out: &mut String, builder: &dyn FieldBuilder) {
        for error in builder.errors() {
            let _ = writeln!(out, "  ! {}", error);
        }
        if let Some(field) = builder.current_field() {
            let _ = writeln!(out, "{}", prompt_for(field));
            if self.show_hints {
                out.push_str("(type cancel to abandon)\n");
            }
            out.push_str("> ");
        }
    }
}

/// Question text for each builder field.
fn prompt_for(field: &str) -> String {
    match field {
        f if f == account_fields::ACCOUNT_TYPE => {
            "Account type (manager, provider, member):".to_string()
        }
        f if f == account_fields::FIRST_NAME => "First name:".to_string(),
        f if f == account_fields::LAST_NAME => "Last name:".to_string(),
        f if f == account_fields::STREET => "Street address:".to_string(),
        f if f == account_fields::CITY => "City:".to_string(),
        f if f == account_fields::STATE => "State code:".to_string(),
        f if f == account_fields::ZIP => "Zip code:".to_string(),
        f if f == claim_fields::PROVIDER_ID => "Provider account number:".to_string(),
        f if f == claim_fields::MEMBER_ID => "Member account number:".to_string(),
        f if f == claim_fields::SERVICE_DATE => "Service date (MM-DD-YYYY):".to_string(),
        f if f == claim_fields::SERVICE_CODE => "Service code:".to_string(),
        f if f == claim_fields::COMMENTS => "Comments (optional):".to_string(),
        f if f == period_fields::START_DATE => "Report start date (MM-DD-YYYY):".to_string(),
        f if f == period_fields::END_DATE => "Report end date (MM-DD-YYYY):".to_string(),
        other => format!("Enter {}:", other),
    }
}

/// Multi-line record card for the view-account flow.
pub fn account_details(account: &Account) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Account {}", account.id());
    let _ = writeln!(out, "  Role:    {}", account.role().label());
    let _ = writeln!(out, "  Name:    {}", account.name().full());
    let _ = writeln!(
        out,
        "  Address: {}, {}, {} {}",
        account.address().street(),
        account.address().city(),
        account.address().state(),
        account.address().zip()
    );
    if account.is_suspended() {
        out.push_str("  Status:  SUSPENDED\n");
    }
    out
}

fn claim_summary(transaction: &Transaction) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "  Provider: {} ({})",
        transaction.provider().name().full(),
        transaction.provider().id()
    );
    let _ = writeln!(
        out,
        "  Member:   {} ({})",
        transaction.member().name().full(),
        transaction.member().id()
    );
    let _ = writeln!(
        out,
        "  Service:  {} - {} at {:.2}",
        transaction.service().code(),
        transaction.service().name(),
        transaction.service().cost()
    );
    let _ = writeln!(out, "  Date:     {}", transaction.service_date());
    if !transaction.comments().is_empty() {
        let _ = writeln!(out, "  Comments: {}", transaction.comments());
    }
    out
}

fn report_text(report: &ActivityReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "--- Activity {} to {} ---",
        report.period.start, report.period.end
    );
    if report.providers.is_empty() {
        out.push_str("No claims were filed in this period.\n");
    }
    for provider in &report.providers {
        let _ = writeln!(
            out,
            "  {} {:<25} {:>3} claims {:>10.2}",
            provider.provider_id, provider.provider_name, provider.consultations, provider.total_fees
        );
    }
    for member in &report.members {
        let _ = writeln!(
            out,
            "  {} {:<25} {:>3} visits",
            member.member_id, member.member_name, member.visits
        );
    }
    let _ = writeln!(
        out,
        "  Total: {} claims, {:.2} in fees",
        report.total_consultations, report.total_fees
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::builders::{AccountBuilder, FieldBuilder};

    #[test]
    fn test_login_screen_prompts_for_an_id() {
        let renderer = Renderer::new(true);
        let screen = renderer.render(&AppState::Login { notice: None });
        assert!(screen.contains("account number"));
        assert!(screen.ends_with("> "));
    }

    #[test]
    fn test_notice_is_shown_before_the_menu() {
        let renderer = Renderer::new(false);
        let screen = renderer.render(&AppState::ManagerMenu {
            notice: Some("Created member account 100000001".to_string()),
        });
        assert!(screen.starts_with("Created member account 100000001"));
        assert!(!screen.contains("type exit"));
    }

    #[test]
    fn test_builder_errors_render_before_the_prompt() {
        let renderer = Renderer::new(true);
        let mut builder = AccountBuilder::new();
        builder.set_current_field("janitor");
        let screen = renderer.render(&AppState::CreateAccount { builder });
        assert!(screen.contains("! account type"));
        assert!(screen.contains("Account type (manager, provider, member):"));
    }

    #[test]
    fn test_account_details_includes_identity_and_name() {
        use crate::backend::domain::models::account::{Account, AccountId, Role};
        let account = Account::try_new(
            AccountId::from_value(100_000_001).unwrap(),
            "Jane",
            "Doe",
            "12 Main St",
            "Portland",
            "OR",
            "97201",
            Role::Provider,
        )
        .unwrap();
        let card = account_details(&account);
        assert!(card.contains("100000001"));
        assert!(card.contains("Jane Doe"));
        assert!(card.contains("provider"));
    }
}
