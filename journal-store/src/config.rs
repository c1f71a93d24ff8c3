//! Journal configuration (TOML).
//!
//! ```toml
//! data_dir = "journal-data"
//! log_level = "info"
//!
//! [accounts.main]
//! balance = 25000.0
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::balances::BalanceBook;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("account '{account}' has invalid balance {balance}")]
    InvalidBalance { account: String, balance: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountConfig {
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Root of the file store.
    pub data_dir: PathBuf,
    /// Default tracing filter when `JOURNAL_LOG` is unset.
    pub log_level: String,
    pub accounts: BTreeMap<String, AccountConfig>,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("journal-data"),
            log_level: "warn".into(),
            accounts: BTreeMap::new(),
        }
    }
}

impl JournalConfig {
    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: JournalConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load `path` if given and present, otherwise fall back to defaults.
    ///
    /// An explicitly passed path that does not exist is an error; the
    /// implicit default location is allowed to be missing.
    pub fn load(path: Option<&Path>, default_path: &Path) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::from_file(p)
                .with_context(|| format!("loading config from {}", p.display())),
            None if default_path.exists() => Self::from_file(default_path)
                .with_context(|| format!("loading config from {}", default_path.display())),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (account, cfg) in &self.accounts {
            if !cfg.balance.is_finite() {
                return Err(ConfigError::InvalidBalance {
                    account: account.clone(),
                    balance: cfg.balance,
                });
            }
        }
        Ok(())
    }

    /// Account balances as a lookup collaborator.
    pub fn balance_book(&self) -> BalanceBook {
        BalanceBook::from_config(self)
    }
}
