//! Configuration management for the CLI.
//!
//! Settings live in a TOML file, `~/.provledger/config.toml` unless
//! `--config` names another:
//!
//! ```toml
//! ledger_path = "/var/lib/provledger/ledger.db"
//! log_filter = "provledger_contract=debug,info"
//!
//! [contract]
//! legacy_dispatch = false
//! ```

use provledger_contract::ContractConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory under the home directory holding config and ledger
const APP_DIR: &str = ".provledger";

/// Configuration loading error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write config file
    #[error("Failed to save config: {0}")]
    Save(String),

    /// No home directory to derive default paths from
    #[error("Could not find home directory")]
    NoHome,
}

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvledgerConfig {
    /// SQLite ledger file
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,

    /// Tracing filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Contract dispatch settings
    #[serde(default)]
    pub contract: ContractConfig,
}

impl ProvledgerConfig {
    /// Default configuration file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
        Ok(home.join(APP_DIR).join("config.toml"))
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Load the explicit file, or the default file if it exists, or defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Ok(path) if path.exists() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    /// Save configuration to a file, creating its directory.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Save(e.to_string()))?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Save(e.to_string()))?;
        std::fs::write(path, contents)
            .map_err(|e| ConfigError::Save(e.to_string()))
    }
}

impl Default for ProvledgerConfig {
    fn default() -> Self {
        Self {
            ledger_path: default_ledger_path(),
            log_filter: default_log_filter(),
            contract: ContractConfig::default(),
        }
    }
}

fn default_ledger_path() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(APP_DIR).join("ledger.db"),
        None => PathBuf::from("provledger.db"),
    }
}

fn default_log_filter() -> String {
    "warn".to_string()
}
