// ABOUTME: Error types for repository operations
// ABOUTME: Distinguishes lookup, conversion, integrity and store failures

use dynamic_settings_core::{ConversionError, LookupKey, NativeType};
use dynamic_settings_storage::StorageError;
use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Converter not found for {0}")]
    ConverterNotFound(LookupKey),

    #[error("Conversion failed: {0}")]
    Conversion(ConversionError),

    #[error("Setting not found: {0}")]
    NotFound(String),

    #[error("Setting {name} matches {count} records, expected exactly one")]
    IntegrityViolation { name: String, count: usize },

    #[error("Invalid setting name: {0}")]
    InvalidKey(#[from] ValidationError),

    #[error("Setting {name} holds a {actual} value, expected {expected}")]
    UnexpectedType {
        name: String,
        expected: NativeType,
        actual: NativeType,
    },

    #[error("Store error: {0}")]
    Store(#[from] StorageError),
}

impl From<ConversionError> for SettingsError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::ConverterNotFound(key) => SettingsError::ConverterNotFound(key),
            other => SettingsError::Conversion(other),
        }
    }
}

pub type SettingsResult<T> = Result<T, SettingsError>;
