// ABOUTME: Storage configuration
// ABOUTME: Database location and pool tuning, with defaults and environment overrides

use dynamic_settings_config::{
    default_database_path, DYNAMIC_SETTINGS_BUSY_TIMEOUT_SECS, DYNAMIC_SETTINGS_DATABASE_URL,
    DYNAMIC_SETTINGS_ENABLE_WAL, DYNAMIC_SETTINGS_MAX_CONNECTIONS, DYNAMIC_SETTINGS_RUN_MIGRATIONS,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unsupported database URL: {0}")]
    UnsupportedUrl(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("max_connections must be at least 1")]
    NoConnections,
}

/// Where settings are persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageProvider {
    Sqlite { path: PathBuf },
    /// Private in-memory database living as long as the pool
    Memory,
}

impl StorageProvider {
    /// Parse a `sqlite:` URL. `sqlite::memory:` selects the in-memory provider.
    ///
    /// Query parameters such as `?mode=rwc` are rejected; connection options
    /// come from the [`StorageConfig`] fields instead.
    pub fn from_url(url: &str) -> Result<Self, ConfigError> {
        if url.contains('?') {
            return Err(ConfigError::UnsupportedUrl(url.to_string()));
        }

        if url == "sqlite::memory:" {
            return Ok(StorageProvider::Memory);
        }

        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ConfigError::UnsupportedUrl(url.to_string()))?;

        Ok(StorageProvider::Sqlite {
            path: PathBuf::from(path),
        })
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    pub enable_wal: bool,
    pub max_connections: u32,
    pub busy_timeout_seconds: u64,
    pub run_migrations: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProvider::Sqlite {
                path: default_database_path(),
            },
            enable_wal: true,
            max_connections: 10,
            busy_timeout_seconds: 30,
            run_migrations: true,
        }
    }
}

impl StorageConfig {
    /// In-memory database, mostly useful in tests
    pub fn in_memory() -> Self {
        Self {
            provider: StorageProvider::Memory,
            enable_wal: false,
            max_connections: 1,
            ..Self::default()
        }
    }

    /// Defaults overridden by `DYNAMIC_SETTINGS_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable name
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(DYNAMIC_SETTINGS_DATABASE_URL) {
            config.provider = StorageProvider::from_url(url.trim())?;
        }

        if let Some(raw) = lookup(DYNAMIC_SETTINGS_MAX_CONNECTIONS) {
            config.max_connections = parse_value(DYNAMIC_SETTINGS_MAX_CONNECTIONS, &raw)?;
        }

        if let Some(raw) = lookup(DYNAMIC_SETTINGS_BUSY_TIMEOUT_SECS) {
            config.busy_timeout_seconds = parse_value(DYNAMIC_SETTINGS_BUSY_TIMEOUT_SECS, &raw)?;
        }

        if let Some(raw) = lookup(DYNAMIC_SETTINGS_ENABLE_WAL) {
            config.enable_wal = parse_value(DYNAMIC_SETTINGS_ENABLE_WAL, &raw)?;
        }

        if let Some(raw) = lookup(DYNAMIC_SETTINGS_RUN_MIGRATIONS) {
            config.run_migrations = parse_value(DYNAMIC_SETTINGS_RUN_MIGRATIONS, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::NoConnections);
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}
