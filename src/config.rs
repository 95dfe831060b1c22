// src/config.rs

//! Runtime configuration: file locations, completion endpoint, retry policy.

use crate::completion::{CompletionConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::report::DATABASE_FILE_NAME;
use crate::secret::SecretStore;
use crate::signal::Generation;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const APP_DIR: &str = "qrisk";

#[derive(Debug, Error)]
#[error("invalid value {value:?} for {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Application configuration.
///
/// `attempts` and `timeout` are overrides; when absent the policy of
/// `generation` applies.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Directory holding the key file and the encrypted credential.
    pub cache_dir: PathBuf,

    /// SQLite report database.
    pub db_path: PathBuf,

    pub generation: Generation,

    pub endpoint: String,

    pub model: String,

    pub temperature: f32,

    pub attempts: Option<u32>,

    pub timeout: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            db_path: default_data_dir().join(DATABASE_FILE_NAME),
            generation: Generation::default(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            attempts: None,
            timeout: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `QRISK_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable lookup, falling back to
    /// defaults for anything unset or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(dir) = get("QRISK_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Some(path) = get("QRISK_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(endpoint) = get("QRISK_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(model) = get("QRISK_MODEL") {
            config.model = model;
        }
        if let Some(value) = get("QRISK_GENERATION") {
            config.generation = value.parse().map_err(|reason| ConfigError {
                var: "QRISK_GENERATION",
                value: value.clone(),
                reason,
            })?;
        }
        if let Some(value) = get("QRISK_TEMPERATURE") {
            let temperature: f32 = parse_var("QRISK_TEMPERATURE", &value)?;
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError {
                    var: "QRISK_TEMPERATURE",
                    value,
                    reason: "must be between 0 and 2".to_string(),
                });
            }
            config.temperature = temperature;
        }
        if let Some(value) = get("QRISK_ATTEMPTS") {
            let attempts: u32 = parse_var("QRISK_ATTEMPTS", &value)?;
            if attempts == 0 {
                return Err(ConfigError {
                    var: "QRISK_ATTEMPTS",
                    value,
                    reason: "must be at least 1".to_string(),
                });
            }
            config.attempts = Some(attempts);
        }
        if let Some(value) = get("QRISK_TIMEOUT_SECS") {
            let secs: u64 = parse_var("QRISK_TIMEOUT_SECS", &value)?;
            config.timeout = Some(Duration::from_secs(secs.max(1)));
        }

        Ok(config)
    }

    pub fn secret_store(&self) -> SecretStore {
        SecretStore::in_dir(&self.cache_dir)
    }

    /// The completion policy: generation defaults with overrides applied.
    pub fn completion_config(&self) -> CompletionConfig {
        let defaults = CompletionConfig::for_generation(self.generation);
        CompletionConfig {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            attempts: self.attempts.unwrap_or(defaults.attempts),
            timeout: self.timeout.unwrap_or(defaults.timeout),
            backoff_base: defaults.backoff_base,
        }
    }
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".cache")))
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join(APP_DIR)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
