//! Configuration loaded from `config.toml`

use crate::state::SyncOptions;
use crate::store::StoreKeys;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configured account
pub const ACCOUNT_ENV: &str = "OTPSYNC_ACCOUNT";

const APP_DIR: &str = "otpsync";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    /// JSON file backing the key-value store
    pub store_path: Option<PathBuf>,

    /// Identity (email) of the signed-in account
    pub account: Option<String>,

    /// Remote-API-shaped export used by the login flow
    pub import_path: Option<PathBuf>,

    /// Remove legacy keys after a successful migration
    pub clear_legacy_after_migration: bool,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,

    pub keys: StoreKeys,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            account: None,
            import_path: None,
            clear_legacy_after_migration: false,
            log_level: "info".to_string(),
            keys: StoreKeys::default(),
        }
    }
}

impl SyncConfig {
    /// `<config_dir>/otpsync/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    /// Load config from `path`, or from the default location
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: SyncConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Store file, falling back to `<data_dir>/otpsync/store.json`
    pub fn resolved_store_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.store_path {
            return Ok(path.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR).join("store.json"))
            .context("Could not determine a data directory; set store_path in config.toml")
    }

    /// Account from `OTPSYNC_ACCOUNT`, else from the config file
    pub fn resolved_account(&self) -> Option<String> {
        std::env::var(ACCOUNT_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.account.clone())
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            keys: self.keys.clone(),
            clear_legacy_after_migration: self.clear_legacy_after_migration,
        }
    }
}
