// ABOUTME: Persisted setting record
// ABOUTME: Name, storage type tag and encoded value as stored in the backing table

use serde::{Deserialize, Serialize};

/// A setting as it lives in the store.
///
/// `type_name` names the converter that produced `value` and is the only
/// thing used to pick a converter when reading it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub value: String,
}

impl Setting {
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            value: value.into(),
        }
    }
}
