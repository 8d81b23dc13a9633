//! Immutable process configuration captured once at startup.

use std::collections::HashMap;

use thiserror::Error;

use crate::{DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL};

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error)]
/// Startup-time configuration failures.
pub enum ConfigError {
    #[error("GOOGLE_API_KEY is not defined in the environment")]
    MissingApiKey,
    #[error("PORT value '{0}' is not a valid TCP port")]
    InvalidPort(String),
}

#[derive(Debug, Clone)]
/// Relay configuration, valid for the lifetime of the process.
pub struct RelayConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub port: u16,
}

impl RelayConfig {
    /// Captures configuration from the process environment. The API key is
    /// required; everything else falls back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Same as [`RelayConfig::from_env`] but over an explicit map, so tests
    /// never mutate process-global state.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let api_key = vars
            .get("GOOGLE_API_KEY")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let port = match vars.get("PORT").map(|value| value.trim()) {
            None | Some("") => DEFAULT_PORT,
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.to_string()))?,
        };

        let api_base = vars
            .get("FABLE_GEMINI_API_BASE")
            .map(|value| value.trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string());

        let model = vars
            .get("FABLE_GEMINI_MODEL")
            .cloned()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        Ok(Self {
            api_key,
            api_base,
            model,
            port,
        })
    }
}
