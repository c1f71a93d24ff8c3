//! Journal Store: storage collaborators for `journal-core`.
//!
//! This crate provides:
//! - A JSON file store (one versioned document per position)
//! - TOML configuration for the journal
//! - Account balance lookup backed by configuration

pub mod balances;
pub mod config;
pub mod file_store;

pub use balances::BalanceBook;
pub use config::{AccountConfig, ConfigError, JournalConfig};
pub use file_store::{JsonFileStore, SCHEMA_VERSION};
