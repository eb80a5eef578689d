//! Configuration structures for the cryptorec system.

use crate::calendar::CalendarZone;
use crate::error::{Error, Result};
use crate::types::Whitelist;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Symbols accepted during ingestion.
    pub whitelist: WhitelistConfig,
    /// Input data location.
    pub data: DataConfig,
    /// Calendar configuration.
    pub calendar: CalendarConfig,
    /// Storage backend configuration.
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a JSON file. Missing sections take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        if let Some(bad) = self.whitelist.symbols.iter().find(|s| s.trim().is_empty()) {
            return Err(Error::config(format!("whitelist entry '{bad}' is blank")));
        }
        if self.data.extension.trim().is_empty() {
            return Err(Error::config("data.extension must not be empty"));
        }
        if self.storage.backend == StorageBackend::Sqlite && self.storage.path.is_none() {
            return Err(Error::config("storage.path is required for the sqlite backend"));
        }
        Ok(())
    }

    /// Build the whitelist.
    pub fn whitelist(&self) -> Whitelist {
        self.whitelist.symbols.iter().map(|s| s.trim().to_string()).collect()
    }
}

/// Whitelist configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WhitelistConfig {
    pub symbols: Vec<String>,
}

impl Default for WhitelistConfig {
    fn default() -> Self {
        Self {
            symbols: ["BTC", "DOGE", "ETH", "LTC", "XRP"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Where input files are discovered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory scanned for input files.
    pub directory: PathBuf,
    /// File extension of input files, matched case-insensitively.
    pub extension: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("prices"),
            extension: "csv".to_string(),
        }
    }
}

/// Calendar configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Zone used to resolve calendar dates.
    pub zone: CalendarZone,
}

/// Storage backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Memory,
    Sqlite,
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Database file (sqlite only).
    pub path: Option<PathBuf>,
}
