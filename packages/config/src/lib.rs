// ABOUTME: Configuration constants for the dynamic settings workspace
// ABOUTME: Environment variable names and data directory resolution

pub mod constants;
pub mod paths;

pub use constants::*;
pub use paths::{default_database_path, settings_dir};
