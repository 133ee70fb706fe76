// ABOUTME: Type descriptors for native setting values
// ABOUTME: Explicit subtype hierarchy used for polymorphic converter matching

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::SettingValue;

/// The application-side type a converter accepts.
///
/// Types form a hierarchy rooted at `Any`:
///
/// ```text
/// Any
/// ├── Number
/// │   ├── Integer
/// │   │   └── Boolean
/// │   └── Float
/// ├── Text
/// ├── DateTime
/// └── Json
/// ```
///
/// A value is an instance of its own type and of every ancestor, so a
/// converter declared for `Integer` also matches booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeType {
    Any,
    Number,
    Integer,
    Boolean,
    Float,
    Text,
    DateTime,
    Json,
}

impl NativeType {
    /// Runtime type of a value (always a leaf or `Integer`)
    pub fn of(value: &SettingValue) -> Self {
        match value {
            SettingValue::Boolean(_) => NativeType::Boolean,
            SettingValue::Integer(_) => NativeType::Integer,
            SettingValue::Float(_) => NativeType::Float,
            SettingValue::Text(_) => NativeType::Text,
            SettingValue::DateTime(_) => NativeType::DateTime,
            SettingValue::Json(_) => NativeType::Json,
        }
    }

    /// Direct supertype, `None` for `Any`
    pub fn parent(&self) -> Option<NativeType> {
        match self {
            NativeType::Any => None,
            NativeType::Number => Some(NativeType::Any),
            NativeType::Integer => Some(NativeType::Number),
            NativeType::Boolean => Some(NativeType::Integer),
            NativeType::Float => Some(NativeType::Number),
            NativeType::Text => Some(NativeType::Any),
            NativeType::DateTime => Some(NativeType::Any),
            NativeType::Json => Some(NativeType::Any),
        }
    }

    /// True when `self` is `other` or one of its descendants
    pub fn is_subtype_of(&self, other: NativeType) -> bool {
        let mut current = Some(*self);
        while let Some(ty) = current {
            if ty == other {
                return true;
            }
            current = ty.parent();
        }
        false
    }

    /// Polymorphic membership test: does `value` belong to this type?
    pub fn is_instance(&self, value: &SettingValue) -> bool {
        NativeType::of(value).is_subtype_of(*self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NativeType::Any => "any",
            NativeType::Number => "number",
            NativeType::Integer => "integer",
            NativeType::Boolean => "boolean",
            NativeType::Float => "float",
            NativeType::Text => "text",
            NativeType::DateTime => "datetime",
            NativeType::Json => "json",
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
