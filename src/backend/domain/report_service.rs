//! Activity report aggregation over the filed-claim ledger.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::backend::domain::builders::Period;
use crate::backend::storage::csv::CsvConnection;
use crate::backend::storage::traits::TransactionStore;

/// One provider's activity inside the period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderActivity {
    pub provider_id: String,
    pub provider_name: String,
    pub consultations: usize,
    pub total_fees: f64,
}

/// One member's activity inside the period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberActivity {
    pub member_id: String,
    pub member_name: String,
    pub visits: usize,
}

/// Aggregated activity for a reporting period, ordered by id for stable
/// rendering and export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityReport {
    pub period: Period,
    pub providers: Vec<ProviderActivity>,
    pub members: Vec<MemberActivity>,
    pub total_consultations: usize,
    pub total_fees: f64,
}

#[derive(Clone)]
pub struct ReportService {
    transactions: Arc<dyn TransactionStore>,
    connection: Arc<CsvConnection>,
}

impl ReportService {
    pub fn new(transactions: Arc<dyn TransactionStore>, connection: Arc<CsvConnection>) -> Self {
        Self {
            transactions,
            connection,
        }
    }

    /// Aggregate the ledger over a period.
    pub fn activity_report(&self, period: Period) -> Result<ActivityReport> {
        let claims = self
            .transactions
            .list_transactions_in_period(period.start, period.end)?;

        let mut providers: BTreeMap<String, ProviderActivity> = BTreeMap::new();
        let mut members: BTreeMap<String, MemberActivity> = BTreeMap::new();
        let mut total_fees = 0.0;

        for claim in &claims {
            let fee = claim.service().cost();
            total_fees += fee;

            let provider = providers
                .entry(claim.provider().id().to_string())
                .or_insert_with(|| ProviderActivity {
                    provider_id: claim.provider().id().to_string(),
                    provider_name: claim.provider().name().full(),
                    consultations: 0,
                    total_fees: 0.0,
                });
            provider.consultations += 1;
            provider.total_fees += fee;

            let member = members
                .entry(claim.member().id().to_string())
                .or_insert_with(|| MemberActivity {
                    member_id: claim.member().id().to_string(),
                    member_name: claim.member().name().full(),
                    visits: 0,
                });
            member.visits += 1;
        }

        let report = ActivityReport {
            period,
            providers: providers.into_values().collect(),
            members: members.into_values().collect(),
            total_consultations: claims.len(),
            total_fees,
        };
        info!(
            "Generated activity report {} - {}: {} claims, {:.2} in fees",
            period.start, period.end, report.total_consultations, report.total_fees
        );
        Ok(report)
    }

    /// Export a report as JSON under `reports/`, named after its period.
    pub fn export_report(&self, report: &ActivityReport) -> Result<PathBuf> {
        let file_name = format!(
            "activity_{}_{}.json",
            report.period.start.format("%Y%m%d"),
            report.period.end.format("%Y%m%d")
        );
        let path = self.connection.reports_directory().join(file_name);
        let contents = serde_json::to_string_pretty(report)?;
        fs::write(&path, contents).with_context(|| format!("Failed to write {:?}", path))?;
        info!("Exported report to {:?}", path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::account::{
        Account, AccountId, MemberStatus, Role,
    };
    use crate::backend::domain::models::service::{Service, ServiceCode};
    use crate::backend::domain::models::transaction::Transaction;
    use crate::backend::storage::csv::{AccountRepository, TransactionRepository};
    use crate::backend::storage::traits::AccountStore;
    use chrono::{NaiveDate, TimeZone, Utc};
    use tempfile::TempDir;

    fn setup() -> (ReportService, AccountRepository, Arc<TransactionRepository>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        let accounts = AccountRepository::new(connection.clone());
        let ledger = Arc::new(TransactionRepository::new(connection.clone()));
        let service = ReportService::new(ledger.clone(), connection);
        (service, accounts, ledger, temp_dir)
    }

    fn account(id: u32, first: &str, role: Role) -> Account {
        Account::try_new(
            AccountId::from_value(id).unwrap(),
            first,
            "Doe",
            "12 Main St",
            "Portland",
            "OR",
            "97201",
            role,
        )
        .unwrap()
    }

    fn file_claim(
        accounts: &AccountRepository,
        ledger: &TransactionRepository,
        provider: &Account,
        member: &Account,
        day: u32,
        fee: f64,
    ) {
        use crate::backend::storage::traits::TransactionStore;
        for acc in [provider, member] {
            if !accounts.account_exists(acc.id()).unwrap() {
                accounts.store_account(acc).unwrap();
            }
        }
        let service =
            Service::try_new(ServiceCode::parse("598470").unwrap(), "Dietitian", fee).unwrap();
        let claim = Transaction::try_new(
            provider.clone(),
            member.clone(),
            service,
            NaiveDate::from_ymd_opt(2019, 10, day).unwrap(),
            "",
            Utc.with_ymd_and_hms(2019, 10, 20, 9, 0, 0).unwrap(),
        )
        .unwrap();
        ledger.store_transaction(&claim).unwrap();
    }

    fn member(id: u32, first: &str) -> Account {
        account(
            id,
            first,
            Role::Member {
                status: MemberStatus::Valid,
            },
        )
    }

    #[test]
    fn test_totals_sum_per_provider_fees() {
        let (service, accounts, ledger, _temp_dir) = setup();
        let p1 = account(100_000_001, "Paula", Role::Provider);
        let p2 = account(100_000_002, "Peter", Role::Provider);
        let m1 = member(100_000_003, "Mary");

        file_claim(&accounts, &ledger, &p1, &m1, 5, 45.0);
        file_claim(&accounts, &ledger, &p1, &m1, 6, 45.0);
        file_claim(&accounts, &ledger, &p2, &m1, 7, 60.0);

        let report = service
            .activity_report(Period {
                start: NaiveDate::from_ymd_opt(2019, 10, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2019, 10, 31).unwrap(),
            })
            .unwrap();

        assert_eq!(report.total_consultations, 3);
        assert_eq!(report.providers.len(), 2);
        assert_eq!(report.providers[0].consultations, 2);
        assert_eq!(report.providers[0].total_fees, 90.0);
        assert_eq!(report.members.len(), 1);
        assert_eq!(report.members[0].visits, 3);
        let provider_sum: f64 = report.providers.iter().map(|p| p.total_fees).sum();
        assert_eq!(provider_sum, report.total_fees);
    }

    #[test]
    fn test_claims_outside_the_period_are_excluded() {
        let (service, accounts, ledger, _temp_dir) = setup();
        let p1 = account(100_000_001, "Paula", Role::Provider);
        let m1 = member(100_000_003, "Mary");
        file_claim(&accounts, &ledger, &p1, &m1, 5, 45.0);
        file_claim(&accounts, &ledger, &p1, &m1, 25, 45.0);

        let report = service
            .activity_report(Period {
                start: NaiveDate::from_ymd_opt(2019, 10, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2019, 10, 10).unwrap(),
            })
            .unwrap();
        assert_eq!(report.total_consultations, 1);
    }

    #[test]
    fn test_export_writes_json() {
        let (service, accounts, ledger, _temp_dir) = setup();
        let p1 = account(100_000_001, "Paula", Role::Provider);
        let m1 = member(100_000_003, "Mary");
        file_claim(&accounts, &ledger, &p1, &m1, 5, 45.0);

        let report = service
            .activity_report(Period {
                start: NaiveDate::from_ymd_opt(2019, 10, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2019, 10, 31).unwrap(),
            })
            .unwrap();
        let path = service.export_report(&report).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("\"total_consultations\": 1"));
    }
}
