// ABOUTME: Core types for dynamic settings
// ABOUTME: Native values, type descriptors, converters and the ordered converter registry

pub mod converter;
pub mod error;
pub mod native_type;
pub mod registry;
pub mod setting;
pub mod value;

// Re-export main types
pub use converter::{
    default_converters, BooleanConverter, DateTimeConverter, FloatConverter, FnConverter,
    IntegerConverter, JsonConverter, SettingConverter, TextConverter,
};
pub use error::{ConversionError, ConversionResult, LookupKey};
pub use native_type::NativeType;
pub use registry::ConverterRegistry;
pub use setting::Setting;
pub use value::SettingValue;
