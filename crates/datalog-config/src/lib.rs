//! # datalog-config
//!
//! Layered configuration loading for the Datalog import plugin using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`DATALOG_*` prefix, `__` as separator)
//! 2. Project-level `.datalog/config.toml`
//! 3. User-level `~/.config/datalog/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `DATALOG_WORKSPACE__DATA_CONTEXT` -> `workspace.data_context`,
//! `DATALOG_SOURCE__DATA_SOURCE_INTERACTIVE` -> `source.data_source_interactive`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use datalog_config::DatalogConfig;
//!
//! let config = DatalogConfig::load_with_dotenv().expect("config");
//! println!("importing into {}", config.workspace.data_context);
//! ```

mod error;
mod import;
mod ledger;
mod plugin;
mod source;
mod workspace;

pub use error::ConfigError;
pub use import::{ImportConfig, RowRetrieval};
pub use ledger::{LedgerConfig, LedgerSeed};
pub use plugin::PluginConfig;
pub use source::SourceConfig;
pub use workspace::WorkspaceConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatalogConfig {
    #[serde(default)]
    pub plugin: PluginConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

impl DatalogConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load configuration after loading a `.env` file from the current directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Extract and validate a config from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction or validation fails.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests and the CLI can layer more providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".datalog/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("DATALOG_").split("__"))
    }

    /// Reject values the engine cannot work with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.import.timeout_ms == 0 {
            return Err(invalid("import.timeout_ms", "must be greater than zero"));
        }
        if self.workspace.data_context.trim().is_empty() {
            return Err(invalid("workspace.data_context", "must not be empty"));
        }
        if self.workspace.name_attribute == self.workspace.identity_attribute {
            return Err(invalid(
                "workspace.identity_attribute",
                "must differ from workspace.name_attribute",
            ));
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("datalog").join("config.toml"))
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
