// src/config.rs

//! Application configuration.
//!
//! Loaded from a TOML file with per-field defaults; secrets (the grid API
//! token) are pulled from the environment so they never live in the file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variable holding the grid API bearer token.
pub const GRID_TOKEN_ENV: &str = "PRICEWATCH_GRID_TOKEN";

/// Retry policy for row-store writes: attempts / interval seconds.
pub const STORE_MAX_RETRIES: u32 = 3;
pub const STORE_RETRY_SECS: u64 = 30;

/// Retry policy for a whole per-row evaluation.
pub const ROW_MAX_RETRIES: u32 = 3;
pub const ROW_RETRY_SECS: u64 = 1;

/// Relax delay taken after a row fails all retries.
pub const DEFAULT_RELAX_SECS: u64 = 5;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target spreadsheet and grid API settings
    #[serde(default)]
    pub sheet: SheetConfig,

    /// Marketplace and seller identity settings
    #[serde(default)]
    pub seller: SellerConfig,

    /// Run-loop behavior settings
    #[serde(default)]
    pub run: RunConfig,
}

/// Target spreadsheet and grid API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Spreadsheet identifier (document key)
    #[serde(default)]
    pub spreadsheet_key: String,

    /// Worksheet tab name
    #[serde(default = "defaults::sheet_name")]
    pub sheet_name: String,

    /// Base URL of the grid REST API
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// Bearer token for the grid API; filled from the environment
    #[serde(skip)]
    pub api_token: String,
}

/// Marketplace and seller identity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerConfig {
    /// Username of the designated (our own) seller
    #[serde(default)]
    pub own_name: String,
}

/// Run-loop behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Delay between rows after a successful evaluation, in seconds
    #[serde(default = "defaults::relax_secs")]
    pub relax_secs: u64,

    /// HTTP timeout for page fetches, in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for page fetches
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl Config {
    /// Load configuration from a TOML file and apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            let mut config = Self::default();
            config.apply_env();
            config
        })
    }

    /// Pull secrets and override-able fields from the environment.
    fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(GRID_TOKEN_ENV) {
            self.sheet.api_token = token;
        }
        if let Ok(key) = std::env::var("PRICEWATCH_SPREADSHEET_KEY") {
            self.sheet.spreadsheet_key = key;
        }
        if let Ok(name) = std::env::var("PRICEWATCH_OWN_SELLER") {
            self.seller.own_name = name;
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.sheet.spreadsheet_key.trim().is_empty() {
            return Err(AppError::config("sheet.spreadsheet_key is empty"));
        }
        if self.sheet.sheet_name.trim().is_empty() {
            return Err(AppError::config("sheet.sheet_name is empty"));
        }
        if self.seller.own_name.trim().is_empty() {
            return Err(AppError::config("seller.own_name is empty"));
        }
        if self.run.timeout_secs == 0 {
            return Err(AppError::config("run.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sheet: SheetConfig::default(),
            seller: SellerConfig::default(),
            run: RunConfig::default(),
        }
    }
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            spreadsheet_key: String::new(),
            sheet_name: defaults::sheet_name(),
            api_base: defaults::api_base(),
            api_token: String::new(),
        }
    }
}

impl Default for SellerConfig {
    fn default() -> Self {
        Self {
            own_name: String::new(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            relax_secs: defaults::relax_secs(),
            timeout_secs: defaults::timeout(),
            user_agent: defaults::user_agent(),
        }
    }
}

mod defaults {
    pub fn sheet_name() -> String {
        "Sheet1".to_string()
    }

    pub fn api_base() -> String {
        "https://sheets.googleapis.com/v4/spreadsheets".to_string()
    }

    pub fn relax_secs() -> u64 {
        5
    }

    pub fn timeout() -> u64 {
        30
    }

    pub fn user_agent() -> String {
        format!("pricewatch/{}", env!("CARGO_PKG_VERSION"))
    }
}
