// ABOUTME: Ordered converter registry
// ABOUTME: First-match lookup by storage tag or by native value type, plus record encode/decode

use std::sync::Arc;
use tracing::trace;

use crate::converter::{default_converters, SettingConverter};
use crate::error::{ConversionError, ConversionResult, LookupKey};
use crate::setting::Setting;
use crate::value::SettingValue;

/// An immutable, ordered list of converters.
///
/// Registration order is precedence: both lookups return the first
/// converter that matches. Cloning is cheap and yields a snapshot that is
/// unaffected by later replacement of the registry it was cloned from.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: Arc<[Arc<dyn SettingConverter>]>,
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("type_names", &self.type_names())
            .finish()
    }
}

impl ConverterRegistry {
    pub fn new(converters: impl IntoIterator<Item = Arc<dyn SettingConverter>>) -> Self {
        Self {
            converters: converters.into_iter().collect(),
        }
    }

    /// Registry holding [`default_converters`]
    pub fn with_defaults() -> Self {
        Self::new(default_converters())
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn SettingConverter>> {
        self.converters.iter()
    }

    /// Storage tags in registration order
    pub fn type_names(&self) -> Vec<&str> {
        self.converters.iter().map(|c| c.type_name()).collect()
    }

    /// First converter whose storage tag equals `type_name`
    pub fn find_by_type_name(&self, type_name: &str) -> ConversionResult<&dyn SettingConverter> {
        self.converters
            .iter()
            .find(|c| c.type_name() == type_name)
            .map(|c| c.as_ref())
            .ok_or_else(|| {
                ConversionError::ConverterNotFound(LookupKey::StorageType(type_name.to_string()))
            })
    }

    /// First converter whose native type accepts `value`, subtypes included
    pub fn find_for_value(&self, value: &SettingValue) -> ConversionResult<&dyn SettingConverter> {
        self.converters
            .iter()
            .find(|c| c.native_type().is_instance(value))
            .map(|c| c.as_ref())
            .ok_or_else(|| {
                ConversionError::ConverterNotFound(LookupKey::NativeType(value.native_type()))
            })
    }

    /// Encode a native value into a storable record
    pub fn encode(&self, name: &str, value: &SettingValue) -> ConversionResult<Setting> {
        let converter = self.find_for_value(value)?;
        trace!(
            "Encoding setting {} of type {} with converter {}",
            name,
            value.native_type(),
            converter.type_name()
        );
        let stored = converter.to_storage(value)?;
        Ok(Setting::new(name, converter.type_name(), stored))
    }

    /// Decode a stored record back into a native value
    pub fn decode(&self, setting: &Setting) -> ConversionResult<SettingValue> {
        trace!(
            "Decoding setting {} of type {}",
            setting.name,
            setting.type_name
        );
        self.find_by_type_name(&setting.type_name)?
            .to_native(&setting.value)
    }
}

impl FromIterator<Arc<dyn SettingConverter>> for ConverterRegistry {
    fn from_iter<I: IntoIterator<Item = Arc<dyn SettingConverter>>>(iter: I) -> Self {
        Self::new(iter)
    }
}
