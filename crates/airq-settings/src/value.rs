//! Wire values of incoming settings.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// A setting value as delivered by the remote settings service.
///
/// Deserializes from any JSON value, so a malformed value is reported per
/// key instead of failing the whole document: `true` is a `Bool`, `120` an
/// `Int`, `18446744073709551615` an `Oversized`, `1.5` a `Float`, `"yes"` a
/// `Str`, `null` a `Null` and arrays or objects `Structured`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    /// Integer above `i64::MAX`.
    Oversized(u64),
    Float(f64),
    Str(String),
    Null,
    /// JSON array or object.
    Structured(Value),
}

impl SettingValue {
    /// Name of the wire type, used in rejection logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "bool",
            SettingValue::Int(_) => "int",
            SettingValue::Oversized(_) => "int",
            SettingValue::Float(_) => "float",
            SettingValue::Str(_) => "string",
            SettingValue::Null => "null",
            SettingValue::Structured(Value::Array(_)) => "array",
            SettingValue::Structured(_) => "object",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(v) => write!(f, "{v}"),
            SettingValue::Int(v) => write!(f, "{v}"),
            SettingValue::Oversized(v) => write!(f, "{v}"),
            SettingValue::Float(v) => write!(f, "{v}"),
            SettingValue::Str(v) => write!(f, "{v:?}"),
            SettingValue::Null => f.write_str("null"),
            SettingValue::Structured(v) => write!(f, "{v}"),
        }
    }
}

impl From<Value> for SettingValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => SettingValue::Null,
            Value::Bool(v) => SettingValue::Bool(v),
            Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    SettingValue::Int(v)
                } else if let Some(v) = n.as_u64() {
                    SettingValue::Oversized(v)
                } else {
                    match n.as_f64() {
                        Some(v) => SettingValue::Float(v),
                        None => SettingValue::Structured(Value::Number(n)),
                    }
                }
            }
            Value::String(v) => SettingValue::Str(v),
            other => SettingValue::Structured(other),
        }
    }
}

impl<'de> Deserialize<'de> for SettingValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(SettingValue::from)
    }
}

impl From<i64> for SettingValue {
    fn from(v: i64) -> Self {
        SettingValue::Int(v)
    }
}

impl From<bool> for SettingValue {
    fn from(v: bool) -> Self {
        SettingValue::Bool(v)
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        SettingValue::Str(v.to_string())
    }
}
