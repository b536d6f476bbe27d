//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ## Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `APP_LOCALE` - Validation message language: `zh` or `en` (default: `zh`)
//! - `APP_VERSION` - Version stamped on responses (default: crate version)
//! - `READ_JSON_MAX_BYTES` - Maximum JSON request body size (default: 2 MiB)

use anyhow::Result;
use std::env;

use crate::response::DEFAULT_BODY_LIMIT;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String,
    /// Raw locale tag; unknown values resolve to `zh`.
    pub locale: String,
    pub app_version: String,
    pub read_json_max_bytes: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Currently infallible; kept fallible so that required variables can be
    /// added without changing callers.
    pub fn from_env() -> Result<Self> {
        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
        let locale = env::var("APP_LOCALE").unwrap_or_else(|_| "zh".to_string());
        let app_version =
            env::var("APP_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

        let read_json_max_bytes = env::var("READ_JSON_MAX_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_BODY_LIMIT);

        Ok(Self {
            listen_addr,
            log_level,
            log_format,
            locale,
            app_version,
            read_json_max_bytes,
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` is invalid
    /// - `read_json_max_bytes` is zero
    pub fn validate(&self) -> Result<()> {
        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if self.read_json_max_bytes == 0 {
            anyhow::bail!("READ_JSON_MAX_BYTES must be greater than 0");
        }

        if self.locale != "zh" && self.locale != "en" {
            tracing::warn!(locale = %self.locale, "Unsupported APP_LOCALE, falling back to zh");
        }

        Ok(())
    }

    /// Prints configuration summary.
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
        tracing::info!("  Locale: {}", self.locale);
        tracing::info!("  App version: {}", self.app_version);
        tracing::info!("  Max JSON body: {} bytes", self.read_json_max_bytes);
    }
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
