// ABOUTME: Type definitions for settings collections
// ABOUTME: Name-to-value maps exchanged by the bulk repository operations

use dynamic_settings_core::SettingValue;
use std::collections::BTreeMap;

/// Settings keyed by name.
///
/// Ordered so bulk writes always reach the store in the same sequence.
pub type SettingsMap = BTreeMap<String, SettingValue>;
