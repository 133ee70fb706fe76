// ABOUTME: Filesystem locations used by the settings store
// ABOUTME: Resolves the data directory and default database path

use std::env;
use std::path::PathBuf;

use tracing::warn;

use crate::constants::{DEFAULT_DATABASE_FILE, DYNAMIC_SETTINGS_HOME, HOME};

/// Get the path to the data directory (~/.dynamic-settings)
///
/// `DYNAMIC_SETTINGS_HOME` wins when set. Otherwise the HOME environment
/// variable is tried first (useful for tests), then the platform home
/// directory, and finally the current directory.
pub fn settings_dir() -> PathBuf {
    if let Ok(dir) = env::var(DYNAMIC_SETTINGS_HOME) {
        return PathBuf::from(dir);
    }

    if let Ok(home) = env::var(HOME) {
        return PathBuf::from(home).join(".dynamic-settings");
    }

    match dirs::home_dir() {
        Some(home) => home.join(".dynamic-settings"),
        None => {
            warn!("Unable to determine home directory, using current directory");
            PathBuf::from(".dynamic-settings")
        }
    }
}

/// Get the path to the default database file (~/.dynamic-settings/settings.db)
pub fn default_database_path() -> PathBuf {
    settings_dir().join(DEFAULT_DATABASE_FILE)
}
