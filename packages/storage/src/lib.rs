// ABOUTME: Data layer and persistence for dynamic settings
// ABOUTME: Session traits consumed by the repository and their SQLite implementation

use thiserror::Error;

pub mod config;
pub mod session;
pub mod sqlite;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Session already committed")]
    SessionClosed,
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type StorageResult<T> = Result<T, StorageError>;

// Re-export main types
pub use config::{ConfigError, StorageConfig, StorageProvider};
pub use session::{SessionFactory, SettingsSession};
pub use sqlite::{SqliteSession, SqliteSessionFactory};
