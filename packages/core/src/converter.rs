// ABOUTME: Bidirectional converters between native values and storage text
// ABOUTME: SettingConverter trait, built-in converters and a closure-backed converter

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::sync::Arc;

use crate::error::{ConversionError, ConversionResult};
use crate::native_type::NativeType;
use crate::value::SettingValue;

/// Maps one native type to one storage tag and back.
///
/// Implementations must be stateless: both conversions are pure functions of
/// their input. `to_storage` is only called with values for which
/// `native_type().is_instance(value)` holds.
///
/// [`NativeType`] is a closed set. An application type without its own
/// variant (a duration, a decimal) is carried by an existing one, e.g.
/// seconds as `Integer` or digits as `Text`, under its own storage tag.
/// Reads dispatch on that tag; writes still pick the first converter whose
/// native type matches the carrier variant.
pub trait SettingConverter: Send + Sync {
    /// Tag written to the `type` column of every record this converter encodes
    fn type_name(&self) -> &str;

    /// Native type this converter accepts, including its subtypes
    fn native_type(&self) -> NativeType;

    fn to_storage(&self, value: &SettingValue) -> ConversionResult<String>;

    fn to_native(&self, stored: &str) -> ConversionResult<SettingValue>;
}

impl fmt::Debug for dyn SettingConverter + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingConverter")
            .field("type_name", &self.type_name())
            .field("native_type", &self.native_type())
            .finish()
    }
}

fn mismatch(expected: NativeType, value: &SettingValue) -> ConversionError {
    ConversionError::TypeMismatch {
        expected,
        actual: value.native_type(),
    }
}

/// `bool` <-> `"true"` / `"false"`
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanConverter;

impl BooleanConverter {
    pub const TYPE_NAME: &'static str = "bool";
}

impl SettingConverter for BooleanConverter {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn native_type(&self) -> NativeType {
        NativeType::Boolean
    }

    fn to_storage(&self, value: &SettingValue) -> ConversionResult<String> {
        match value {
            SettingValue::Boolean(b) => Ok(b.to_string()),
            other => Err(mismatch(NativeType::Boolean, other)),
        }
    }

    fn to_native(&self, stored: &str) -> ConversionResult<SettingValue> {
        match stored {
            "true" => Ok(SettingValue::Boolean(true)),
            "false" => Ok(SettingValue::Boolean(false)),
            _ => Err(ConversionError::malformed(
                Self::TYPE_NAME,
                stored,
                "must be 'true' or 'false'",
            )),
        }
    }
}

/// `i64` <-> decimal text. Booleans are integers too and encode as 1 / 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerConverter;

impl IntegerConverter {
    pub const TYPE_NAME: &'static str = "int";
}

impl SettingConverter for IntegerConverter {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn native_type(&self) -> NativeType {
        NativeType::Integer
    }

    fn to_storage(&self, value: &SettingValue) -> ConversionResult<String> {
        match value {
            SettingValue::Integer(i) => Ok(i.to_string()),
            SettingValue::Boolean(b) => Ok(i64::from(*b).to_string()),
            other => Err(mismatch(NativeType::Integer, other)),
        }
    }

    fn to_native(&self, stored: &str) -> ConversionResult<SettingValue> {
        stored
            .parse::<i64>()
            .map(SettingValue::Integer)
            .map_err(|e| ConversionError::malformed(Self::TYPE_NAME, stored, e))
    }
}

/// `f64` <-> shortest round-trip decimal text
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatConverter;

impl FloatConverter {
    pub const TYPE_NAME: &'static str = "float";
}

impl SettingConverter for FloatConverter {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn native_type(&self) -> NativeType {
        NativeType::Float
    }

    fn to_storage(&self, value: &SettingValue) -> ConversionResult<String> {
        match value {
            SettingValue::Float(x) => Ok(x.to_string()),
            other => Err(mismatch(NativeType::Float, other)),
        }
    }

    fn to_native(&self, stored: &str) -> ConversionResult<SettingValue> {
        stored
            .parse::<f64>()
            .map(SettingValue::Float)
            .map_err(|e| ConversionError::malformed(Self::TYPE_NAME, stored, e))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextConverter;

impl TextConverter {
    pub const TYPE_NAME: &'static str = "str";
}

impl SettingConverter for TextConverter {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn native_type(&self) -> NativeType {
        NativeType::Text
    }

    fn to_storage(&self, value: &SettingValue) -> ConversionResult<String> {
        match value {
            SettingValue::Text(s) => Ok(s.clone()),
            other => Err(mismatch(NativeType::Text, other)),
        }
    }

    fn to_native(&self, stored: &str) -> ConversionResult<SettingValue> {
        Ok(SettingValue::Text(stored.to_string()))
    }
}

/// UTC timestamps <-> RFC 3339 with as many fractional digits as needed
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeConverter;

impl DateTimeConverter {
    pub const TYPE_NAME: &'static str = "datetime";
}

impl SettingConverter for DateTimeConverter {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn native_type(&self) -> NativeType {
        NativeType::DateTime
    }

    fn to_storage(&self, value: &SettingValue) -> ConversionResult<String> {
        match value {
            SettingValue::DateTime(dt) => Ok(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            other => Err(mismatch(NativeType::DateTime, other)),
        }
    }

    fn to_native(&self, stored: &str) -> ConversionResult<SettingValue> {
        DateTime::parse_from_rfc3339(stored)
            .map(|dt| SettingValue::DateTime(dt.with_timezone(&Utc)))
            .map_err(|e| ConversionError::malformed(Self::TYPE_NAME, stored, e))
    }
}

/// Arbitrary JSON documents (lists, maps, nested values)
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConverter;

impl JsonConverter {
    pub const TYPE_NAME: &'static str = "json";
}

impl SettingConverter for JsonConverter {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn native_type(&self) -> NativeType {
        NativeType::Json
    }

    fn to_storage(&self, value: &SettingValue) -> ConversionResult<String> {
        match value {
            SettingValue::Json(v) => serde_json::to_string(v)
                .map_err(|e| ConversionError::malformed(Self::TYPE_NAME, v.to_string(), e)),
            other => Err(mismatch(NativeType::Json, other)),
        }
    }

    fn to_native(&self, stored: &str) -> ConversionResult<SettingValue> {
        serde_json::from_str(stored)
            .map(SettingValue::Json)
            .map_err(|e| ConversionError::malformed(Self::TYPE_NAME, stored, e))
    }
}

type EncodeFn = dyn Fn(&SettingValue) -> ConversionResult<String> + Send + Sync;
type DecodeFn = dyn Fn(&str) -> ConversionResult<SettingValue> + Send + Sync;

/// Converter assembled from two closures, for application-defined encodings.
///
/// ```
/// use dynamic_settings_core::{FnConverter, NativeType, SettingConverter, SettingValue};
///
/// let yes_no = FnConverter::new(
///     "yes_no",
///     NativeType::Boolean,
///     |v| Ok(if v.as_bool() == Some(true) { "yes" } else { "no" }.to_string()),
///     |s| Ok(SettingValue::Boolean(s == "yes")),
/// );
/// assert_eq!(yes_no.to_storage(&true.into()).unwrap(), "yes");
/// ```
pub struct FnConverter {
    type_name: String,
    native_type: NativeType,
    encode: Box<EncodeFn>,
    decode: Box<DecodeFn>,
}

impl FnConverter {
    pub fn new<E, D>(
        type_name: impl Into<String>,
        native_type: NativeType,
        encode: E,
        decode: D,
    ) -> Self
    where
        E: Fn(&SettingValue) -> ConversionResult<String> + Send + Sync + 'static,
        D: Fn(&str) -> ConversionResult<SettingValue> + Send + Sync + 'static,
    {
        Self {
            type_name: type_name.into(),
            native_type,
            encode: Box::new(encode),
            decode: Box::new(decode),
        }
    }
}

impl fmt::Debug for FnConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnConverter")
            .field("type_name", &self.type_name)
            .field("native_type", &self.native_type)
            .finish_non_exhaustive()
    }
}

impl SettingConverter for FnConverter {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn native_type(&self) -> NativeType {
        self.native_type
    }

    fn to_storage(&self, value: &SettingValue) -> ConversionResult<String> {
        (self.encode)(value)
    }

    fn to_native(&self, stored: &str) -> ConversionResult<SettingValue> {
        (self.decode)(stored)
    }
}

/// The built-in converters in precedence order.
///
/// `BooleanConverter` comes before `IntegerConverter`; since booleans are
/// also integers, swapping them would store every boolean as `int`.
pub fn default_converters() -> Vec<Arc<dyn SettingConverter>> {
    vec![
        Arc::new(BooleanConverter),
        Arc::new(IntegerConverter),
        Arc::new(FloatConverter),
        Arc::new(TextConverter),
        Arc::new(DateTimeConverter),
        Arc::new(JsonConverter),
    ]
}
