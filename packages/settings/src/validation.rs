// ABOUTME: Input validation for setting names
// ABOUTME: Rejects names that cannot identify a stored record

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Setting name cannot be empty")]
    EmptyName,
}

/// Validate a setting name before it is used as a key.
///
/// Any non-empty string is a valid name, including whitespace.
pub fn validate_setting_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    Ok(())
}

/// Validate every name in a batch, failing on the first bad one
pub fn validate_setting_names<'a>(
    names: impl IntoIterator<Item = &'a str>,
) -> Result<(), ValidationError> {
    names.into_iter().try_for_each(validate_setting_name)
}
