//! Terminal-wide presentation preferences, stored as `terminal.yaml`.

use std::fs;
use std::sync::Arc;

use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use super::connection::CsvConnection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Print the one-line key legend under each menu.
    pub show_menu_hints: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            show_menu_hints: true,
        }
    }
}

#[derive(Clone)]
pub struct GlobalConfigRepository {
    connection: Arc<CsvConnection>,
}

impl GlobalConfigRepository {
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self { connection }
    }

    /// Load the config, falling back to defaults when no file exists yet.
    pub fn load(&self) -> Result<TerminalConfig> {
        let path = self.connection.terminal_config_path();
        if !path.exists() {
            debug!("No terminal config on disk, using defaults");
            return Ok(TerminalConfig::default());
        }
        let config = serde_yaml::from_str(&fs::read_to_string(&path)?)?;
        Ok(config)
    }

    pub fn store(&self, config: &TerminalConfig) -> Result<()> {
        let contents = serde_yaml::to_string(config)?;
        self.connection
            .write_atomic(&self.connection.terminal_config_path(), &contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_then_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let connection = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        let repo = GlobalConfigRepository::new(connection);

        assert_eq!(repo.load().unwrap(), TerminalConfig::default());

        let config = TerminalConfig {
            show_menu_hints: false,
        };
        repo.store(&config).unwrap();
        assert_eq!(repo.load().unwrap(), config);
    }
}
