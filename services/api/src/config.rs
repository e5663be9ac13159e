//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    /// The one AI credential. Absence is non-fatal: AI-backed features are
    /// disabled and surface an inline "unavailable" message instead.
    pub openai_api_key: Option<String>,
    pub consult_model: String,
    pub meal_model: String,
    /// Upper bound on a single blocking AI round trip, in seconds.
    pub ai_timeout_secs: u64,
    /// Character budget for extracted lab-report text before it is handed
    /// to the AI gateway.
    pub document_char_budget: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load API Key (as optional) ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        // --- Load Adapter-specific Settings ---
        let consult_model =
            std::env::var("CONSULT_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        let meal_model =
            std::env::var("MEAL_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let ai_timeout_secs = match std::env::var("AI_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue(
                    "AI_TIMEOUT_SECS".to_string(),
                    format!("'{}' is not a valid number of seconds", raw),
                )
            })?,
            Err(_) => 30,
        };

        let document_char_budget = match std::env::var("DOCUMENT_CHAR_BUDGET") {
            Ok(raw) => raw.parse::<usize>().map_err(|_| {
                ConfigError::InvalidValue(
                    "DOCUMENT_CHAR_BUDGET".to_string(),
                    format!("'{}' is not a valid character count", raw),
                )
            })?,
            Err(_) => 8000,
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            openai_api_key,
            consult_model,
            meal_model,
            ai_timeout_secs,
            document_char_budget,
        })
    }
}
