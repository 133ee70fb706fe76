// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names read by the settings store

// Database Configuration
pub const DYNAMIC_SETTINGS_DATABASE_URL: &str = "DYNAMIC_SETTINGS_DATABASE_URL";
pub const DYNAMIC_SETTINGS_MAX_CONNECTIONS: &str = "DYNAMIC_SETTINGS_MAX_CONNECTIONS";
pub const DYNAMIC_SETTINGS_BUSY_TIMEOUT_SECS: &str = "DYNAMIC_SETTINGS_BUSY_TIMEOUT_SECS";
pub const DYNAMIC_SETTINGS_ENABLE_WAL: &str = "DYNAMIC_SETTINGS_ENABLE_WAL";
pub const DYNAMIC_SETTINGS_RUN_MIGRATIONS: &str = "DYNAMIC_SETTINGS_RUN_MIGRATIONS";

// Data directory override
pub const DYNAMIC_SETTINGS_HOME: &str = "DYNAMIC_SETTINGS_HOME";

// System Environment Variables
pub const HOME: &str = "HOME";

/// File name of the default settings database inside the data directory
pub const DEFAULT_DATABASE_FILE: &str = "settings.db";
