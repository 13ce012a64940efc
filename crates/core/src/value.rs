//! Value types for tabula
//!
//! This module defines:
//! - Value: closed enum of every attribute value the system can hold
//! - AttributeMap: the caller-visible document
//!
//! ## Integer widths
//!
//! Integers keep their width as a distinct variant. Different widths are
//! never equal: `I32(31) != I8(31)`. The codec narrows decoded integers to
//! the smallest width that holds them, see [`Value::narrowed`].
//!
//! ## Transportable variants
//!
//! `Null`, `Bool`, the four integer widths, `F32`, `F64` and `String` are
//! carried inside an entity body. `Bytes`, `Uuid` and `Timestamp` only appear
//! as identity metadata or index column values.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Attribute document: unique string keys mapped to values
///
/// Ordered so that encoding the same map always yields the same bytes.
pub type AttributeMap = BTreeMap<String, Value>;

/// Attribute value
///
/// Float equality follows IEEE-754 semantics (`NaN != NaN`).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null, distinct from an absent key
    Null,
    /// Boolean value
    Bool(bool),
    /// 8-bit signed integer
    I8(i8),
    /// 16-bit signed integer
    I16(i16),
    /// 32-bit signed integer
    I32(i32),
    /// 64-bit signed integer
    I64(i64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
    /// UTF-8 string
    String(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// UUID (entity identity)
    Uuid(Uuid),
    /// Timestamp without time zone
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Integer in the smallest signed width that represents it
    ///
    /// ```
    /// use tabula_core::Value;
    ///
    /// assert_eq!(Value::narrowed(31), Value::I8(31));
    /// assert_eq!(Value::narrowed(-129), Value::I16(-129));
    /// assert_eq!(Value::narrowed(i64::MAX), Value::I64(i64::MAX));
    /// ```
    pub fn narrowed(v: i64) -> Self {
        if let Ok(b) = i8::try_from(v) {
            Value::I8(b)
        } else if let Ok(s) = i16::try_from(v) {
            Value::I16(s)
        } else if let Ok(i) = i32::try_from(v) {
            Value::I32(i)
        } else {
            Value::I64(v)
        }
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::I8(_) => "I8",
            Value::I16(_) => "I16",
            Value::I32(_) => "I32",
            Value::I64(_) => "I64",
            Value::F32(_) => "F32",
            Value::F64(_) => "F64",
            Value::String(_) => "String",
            Value::Bytes(_) => "Bytes",
            Value::Uuid(_) => "Uuid",
            Value::Timestamp(_) => "Timestamp",
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this is an integer of any width
    pub fn is_integer(&self) -> bool {
        matches!(self, Value::I8(_) | Value::I16(_) | Value::I32(_) | Value::I64(_))
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get any integer width widened to i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I8(v) => Some(i64::from(*v)),
            Value::I16(v) => Some(i64::from(*v)),
            Value::I32(v) => Some(i64::from(*v)),
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Get either float width widened to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F32(f) => Some(f64::from(*f)),
            Value::F64(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as &str if this is a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as &[u8] if this is a Bytes value
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Get the UUID if this is a Uuid value
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    /// Get the timestamp if this is a Timestamp value
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i8> for Value {
    fn from(i: i8) -> Self {
        Value::I8(i)
    }
}

impl From<i16> for Value {
    fn from(i: i16) -> Self {
        Value::I16(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::I32(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::I64(i)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::F32(f)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::F64(f)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(t: NaiveDateTime) -> Self {
        Value::Timestamp(t)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}
