// src/error.rs

//! Unified error handling for the pricewatch application.

use thiserror::Error;

/// Result type alias for pricewatch operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Row or page data failed schema validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// A required sheet range returned no data
    #[error("Sheet error: {sheet_id}->{sheet_name}->{range} is None")]
    Sheet {
        sheet_id: String,
        sheet_name: String,
        range: String,
    },

    /// Page extraction failed
    #[error("Scrape error for {url}: {message}")]
    Scrape { url: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a sheet error naming the empty range.
    pub fn sheet(
        sheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
        range: impl Into<String>,
    ) -> Self {
        Self::Sheet {
            sheet_id: sheet_id.into(),
            sheet_name: sheet_name.into(),
            range: range.into(),
        }
    }

    /// Create a scrape error with the offending URL.
    pub fn scrape(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Scrape {
            url: url.into(),
            message: message.into(),
        }
    }
}
