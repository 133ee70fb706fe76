// ABOUTME: Error types for value conversion
// ABOUTME: Converter lookup failures and malformed storage representations

use std::fmt;
use thiserror::Error;

use crate::native_type::NativeType;

/// What a converter lookup was searching for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    /// Decoding: the storage tag read from a record
    StorageType(String),
    /// Encoding: the runtime type of the value being written
    NativeType(NativeType),
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKey::StorageType(tag) => write!(f, "storage type '{}'", tag),
            LookupKey::NativeType(ty) => write!(f, "native type {}", ty),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Converter not found for {0}")]
    ConverterNotFound(LookupKey),

    #[error("Converter '{converter}' cannot convert {input:?}: {reason}")]
    Malformed {
        converter: String,
        input: String,
        reason: String,
    },

    #[error("Expected a value of type {expected}, got {actual}")]
    TypeMismatch {
        expected: NativeType,
        actual: NativeType,
    },
}

impl ConversionError {
    pub fn malformed(
        converter: impl Into<String>,
        input: impl Into<String>,
        reason: impl fmt::Display,
    ) -> Self {
        ConversionError::Malformed {
            converter: converter.into(),
            input: input.into(),
            reason: reason.to_string(),
        }
    }
}

pub type ConversionResult<T> = Result<T, ConversionError>;
