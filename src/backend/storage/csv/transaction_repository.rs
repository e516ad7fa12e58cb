//! CSV-backed filed-claim ledger.
//!
//! File format:
//! ```csv
//! record_id,provider_id,member_id,service_code,service_name,fee,service_date,filed_at,comments
//! 6f9c...,100000001,100000002,598470,Dietitian session,45.00,2019-10-10,2019-10-15T12:00:00+00:00,ok
//! ```
//!
//! Rows snapshot the service (code, name, fee at filing time) but reference
//! accounts by id: reconstitution resolves them through the account store,
//! and rows whose accounts have since been deleted are skipped with a
//! warning rather than failing the whole read.

use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use csv::Reader;
use log::{debug, info, warn};

use super::account_repository::AccountRepository;
use super::connection::CsvConnection;
use crate::backend::domain::models::account::AccountId;
use crate::backend::domain::models::service::{Service, ServiceCode};
use crate::backend::domain::models::transaction::Transaction;
use crate::backend::storage::traits::{AccountStore, TransactionStore};

#[derive(Clone)]
pub struct TransactionRepository {
    connection: Arc<CsvConnection>,
    account_repository: AccountRepository,
}

impl TransactionRepository {
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        let account_repository = AccountRepository::new(connection.clone());
        Self {
            connection,
            account_repository,
        }
    }

    fn read_transactions(&self) -> Result<Vec<Transaction>> {
        let path = self.connection.transactions_file_path();
        if !path.exists() {
            debug!("Ledger file doesn't exist, returning empty list");
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut transactions = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            match self.parse_row(&record) {
                Ok(Some(transaction)) => transactions.push(transaction),
                Ok(None) => {}
                Err(e) => {
                    warn!("Skipping unreadable ledger row: {}", e);
                }
            }
        }

        Ok(transactions)
    }

    fn parse_row(&self, record: &csv::StringRecord) -> Result<Option<Transaction>> {
        let record_id = record.get(0).unwrap_or("").to_string();
        let provider_id = AccountId::parse(record.get(1).unwrap_or(""))
            .map_err(|e| anyhow!("Bad provider id in ledger: {}", e))?;
        let member_id = AccountId::parse(record.get(2).unwrap_or(""))
            .map_err(|e| anyhow!("Bad member id in ledger: {}", e))?;
        let service_code = ServiceCode::parse(record.get(3).unwrap_or(""))
            .map_err(|e| anyhow!("Bad service code in ledger: {}", e))?;
        let service_name = record.get(4).unwrap_or("");
        let fee: f64 = record
            .get(5)
            .unwrap_or("")
            .parse()
            .context("Bad fee in ledger")?;
        let service_date =
            NaiveDate::parse_from_str(record.get(6).unwrap_or(""), "%Y-%m-%d")
                .context("Bad service date in ledger")?;
        let filed_at: DateTime<Utc> =
            DateTime::parse_from_rfc3339(record.get(7).unwrap_or(""))
                .context("Bad filed-at timestamp in ledger")?
                .with_timezone(&Utc);
        let comments = record.get(8).unwrap_or("").to_string();

        let provider = match self.account_repository.get_account(provider_id)? {
            Some(account) => account,
            None => {
                warn!(
                    "Provider {} for claim {} no longer on file, skipping row",
                    provider_id, record_id
                );
                return Ok(None);
            }
        };
        let member = match self.account_repository.get_account(member_id)? {
            Some(account) => account,
            None => {
                warn!(
                    "Member {} for claim {} no longer on file, skipping row",
                    member_id, record_id
                );
                return Ok(None);
            }
        };
        let service = Service::try_new(service_code, service_name, fee)
            .map_err(|e| anyhow!("Service snapshot failed validation: {}", e))?;

        Ok(Some(Transaction::from_parts(
            record_id,
            provider,
            member,
            service,
            service_date,
            filed_at,
            comments,
        )))
    }

    fn write_all(&self, rows: &[csv::StringRecord]) -> Result<()> {
        let mut buf = Vec::new();
        {
            let mut csv_writer = csv::Writer::from_writer(&mut buf);
            csv_writer.write_record([
                "record_id",
                "provider_id",
                "member_id",
                "service_code",
                "service_name",
                "fee",
                "service_date",
                "filed_at",
                "comments",
            ])?;
            for row in rows {
                csv_writer.write_record(row)?;
            }
            csv_writer.flush()?;
        }
        let contents = String::from_utf8(buf)?;
        self.connection
            .write_atomic(&self.connection.transactions_file_path(), &contents)
    }

    /// Raw rows as stored, without account resolution. Used to append
    /// without dropping rows whose accounts were deleted.
    fn read_raw_rows(&self) -> Result<Vec<csv::StringRecord>> {
        let path = self.connection.transactions_file_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));
        let mut rows = Vec::new();
        for result in csv_reader.records() {
            rows.push(result?);
        }
        Ok(rows)
    }

    fn to_row(transaction: &Transaction) -> csv::StringRecord {
        csv::StringRecord::from(vec![
            transaction.record_id().to_string(),
            transaction.provider().id().to_string(),
            transaction.member().id().to_string(),
            transaction.service().code().to_string(),
            transaction.service().name().to_string(),
            format!("{:.2}", transaction.service().cost()),
            transaction.service_date().format("%Y-%m-%d").to_string(),
            transaction.filed_at().to_rfc3339(),
            transaction.comments().to_string(),
        ])
    }
}

impl TransactionStore for TransactionRepository {
    fn store_transaction(&self, transaction: &Transaction) -> Result<()> {
        let mut rows = self.read_raw_rows()?;
        rows.push(Self::to_row(transaction));
        self.write_all(&rows)?;
        info!(
            "Filed claim {} (provider {}, member {})",
            transaction.record_id(),
            transaction.provider().id(),
            transaction.member().id()
        );
        Ok(())
    }

    fn list_transactions(&self) -> Result<Vec<Transaction>> {
        self.read_transactions()
    }

    fn list_transactions_in_period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        Ok(self
            .read_transactions()?
            .into_iter()
            .filter(|t| t.service_date() >= start && t.service_date() <= end)
            .collect())
    }
}
