use std::env;
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_RESULT_LIMIT: usize = 20;

/// Settings for the dashboard command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding one CSV file per collection.
    pub data_dir: PathBuf,
    pub log_level: String,
    /// How many search results are printed when no `--limit` is given.
    pub result_limit: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("DASHBOARD_RESULT_LIMIT must be a positive integer, got '{0}'")]
    InvalidResultLimit(String),
    #[error("DASHBOARD_DATA_DIR must not be empty")]
    EmptyDataDir,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("DASHBOARD_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        if data_dir.trim().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }

        let log_level =
            lookup("DASHBOARD_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let result_limit = match lookup("DASHBOARD_RESULT_LIMIT") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => return Err(ConfigError::InvalidResultLimit(raw)),
            },
            None => DEFAULT_RESULT_LIMIT,
        };

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            log_level,
            result_limit,
        })
    }
}
