//! Base-directory handle shared by every file-backed repository.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use crate::backend::domain::models::account::AccountId;

/// Owns the data directory layout:
///
/// ```text
/// <base>/
///   accounts/<id>.yaml     one record file per account
///   services.csv           the service directory
///   transactions.csv       the filed-claim ledger
///   reports/               exported activity reports
///   terminal.yaml          presentation preferences
/// ```
#[derive(Debug, Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Open (creating if needed) the data directory and its subdirectories.
    pub fn new(base_directory: impl AsRef<Path>) -> Result<Self> {
        let base_directory = base_directory.as_ref().to_path_buf();
        fs::create_dir_all(&base_directory).with_context(|| {
            format!("Failed to create data directory {:?}", base_directory)
        })?;
        let connection = Self { base_directory };
        fs::create_dir_all(connection.accounts_directory())?;
        fs::create_dir_all(connection.reports_directory())?;
        info!("Opened data directory {:?}", connection.base_directory);
        Ok(connection)
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn accounts_directory(&self) -> PathBuf {
        self.base_directory.join("accounts")
    }

    pub fn account_file_path(&self, id: AccountId) -> PathBuf {
        self.accounts_directory().join(format!("{}.yaml", id))
    }

    pub fn services_file_path(&self) -> PathBuf {
        self.base_directory.join("services.csv")
    }

    pub fn transactions_file_path(&self) -> PathBuf {
        self.base_directory.join("transactions.csv")
    }

    pub fn reports_directory(&self) -> PathBuf {
        self.base_directory.join("reports")
    }

    pub fn terminal_config_path(&self) -> PathBuf {
        self.base_directory.join("terminal.yaml")
    }

    /// Write a file atomically: write to a temp sibling, then rename over
    /// the target so readers never observe a half-written file.
    pub fn write_atomic(&self, path: &Path, contents: &str) -> Result<()> {
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, contents)
            .with_context(|| format!("Failed to write {:?}", temp_path))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to replace {:?}", path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_creates_layout() {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path().join("data")).unwrap();
        assert!(connection.accounts_directory().is_dir());
        assert!(connection.reports_directory().is_dir());
    }

    #[test]
    fn test_atomic_write_replaces_contents() {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        let path = connection.base_directory().join("probe.yaml");
        connection.write_atomic(&path, "first").unwrap();
        connection.write_atomic(&path, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }
}
