// ABOUTME: Native value domain for settings
// ABOUTME: SettingValue enum with conversions to and from plain Rust types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConversionError;
use crate::native_type::NativeType;

/// An application-side setting value.
///
/// Every value a converter can encode is one of these variants. The variant
/// determines the value's runtime [`NativeType`], which is what converters
/// are matched against when writing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    DateTime(DateTime<Utc>),
    Json(serde_json::Value),
}

impl SettingValue {
    /// Runtime type of this value
    pub fn native_type(&self) -> NativeType {
        NativeType::of(self)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SettingValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            SettingValue::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            SettingValue::Json(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Boolean(b) => write!(f, "{}", b),
            SettingValue::Integer(i) => write!(f, "{}", i),
            SettingValue::Float(x) => write!(f, "{}", x),
            SettingValue::Text(s) => write!(f, "{}", s),
            SettingValue::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            SettingValue::Json(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Boolean(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Integer(value)
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        SettingValue::Integer(value.into())
    }
}

impl From<u32> for SettingValue {
    fn from(value: u32) -> Self {
        SettingValue::Integer(value.into())
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Float(value)
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<DateTime<Utc>> for SettingValue {
    fn from(value: DateTime<Utc>) -> Self {
        SettingValue::DateTime(value)
    }
}

impl From<serde_json::Value> for SettingValue {
    fn from(value: serde_json::Value) -> Self {
        SettingValue::Json(value)
    }
}

/// Implements `TryFrom<SettingValue>` for a plain type, failing with
/// `TypeMismatch` when the variant does not match.
macro_rules! impl_try_from_value {
    ($ty:ty, $variant:ident, $expected:expr) => {
        impl TryFrom<SettingValue> for $ty {
            type Error = ConversionError;

            fn try_from(value: SettingValue) -> Result<Self, Self::Error> {
                match value {
                    SettingValue::$variant(inner) => Ok(inner),
                    other => Err(ConversionError::TypeMismatch {
                        expected: $expected,
                        actual: other.native_type(),
                    }),
                }
            }
        }
    };
}

impl_try_from_value!(bool, Boolean, NativeType::Boolean);
impl_try_from_value!(i64, Integer, NativeType::Integer);
impl_try_from_value!(f64, Float, NativeType::Float);
impl_try_from_value!(String, Text, NativeType::Text);
impl_try_from_value!(DateTime<Utc>, DateTime, NativeType::DateTime);
impl_try_from_value!(serde_json::Value, Json, NativeType::Json);
