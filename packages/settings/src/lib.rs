// ABOUTME: Typed settings persistence
// ABOUTME: Repository that converts native values through an ordered converter registry

pub mod error;
pub mod repository;
pub mod types;
pub mod validation;

pub use error::{SettingsError, SettingsResult};
pub use repository::{DbSettingsRepository, SettingsRepository};
pub use types::SettingsMap;
pub use validation::{validate_setting_name, ValidationError};

// Re-export the building blocks callers need alongside the repository
pub use dynamic_settings_core::{
    default_converters, ConversionError, ConverterRegistry, FnConverter, LookupKey, NativeType,
    Setting, SettingConverter, SettingValue,
};
pub use dynamic_settings_storage::{
    SessionFactory, SettingsSession, SqliteSessionFactory, StorageConfig, StorageError,
};
