//! Dynamically-typed value tree the walkers encode and decode.

use std::fmt;

/// A decoded (or to-be-encoded) value.
///
/// Strings are byte strings; no UTF-8 validity is implied. Maps preserve
/// insertion order and the codec does not deduplicate keys. Sets carry
/// their elements in encounter order; set semantics are the caller's
/// concern.
#[derive(Debug, Clone)]
pub enum Value {
    /// Nil.
    Nil,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
    /// Byte string.
    Str(Vec<u8>),
    /// Raw bytes.
    Raw(Vec<u8>),
    /// Array.
    Arr(Vec<Value>),
    /// Map as ordered key/value pairs. Keys must be integers or strings.
    Map(Vec<(Value, Value)>),
    /// Set as ordered elements.
    Set(Vec<Value>),
}

/// Discriminant of a [`Value`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Nil,
    Bool,
    Int,
    Uint,
    F32,
    F64,
    Str,
    Raw,
    Arr,
    Map,
    Set,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nil => "nil",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::F32 => "float32",
            Self::F64 => "float64",
            Self::Str => "string",
            Self::Raw => "raw bytes",
            Self::Arr => "array",
            Self::Map => "map",
            Self::Set => "set",
        };
        write!(f, "{name}")
    }
}

impl Value {
    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Nil => ValueKind::Nil,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Uint(_) => ValueKind::Uint,
            Self::F32(_) => ValueKind::F32,
            Self::F64(_) => ValueKind::F64,
            Self::Str(_) => ValueKind::Str,
            Self::Raw(_) => ValueKind::Raw,
            Self::Arr(_) => ValueKind::Arr,
            Self::Map(_) => ValueKind::Map,
            Self::Set(_) => ValueKind::Set,
        }
    }

    /// Returns `true` if the wire format accepts this value as a map key.
    #[must_use]
    pub const fn is_key_kind(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Uint(_) | Self::Str(_))
    }
}

fn int_eq_uint(i: i64, u: u64) -> bool {
    // Sign check first so the cast below cannot wrap.
    i >= 0 && i.unsigned_abs() == u
}

fn f32_eq(a: f32, b: f32) -> bool {
    // NaN compares equal to NaN; otherwise bitwise, so the sign of zero
    // is preserved through equality.
    (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
}

fn f64_eq(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Uint(a), Self::Uint(b)) => a == b,
            // The encoder routes non-negative integers through either
            // representation; equality is numeric across the two.
            (Self::Int(i), Self::Uint(u)) | (Self::Uint(u), Self::Int(i)) => int_eq_uint(*i, *u),
            (Self::F32(a), Self::F32(b)) => f32_eq(*a, *b),
            (Self::F64(a), Self::F64(b)) => f64_eq(*a, *b),
            (Self::Str(a), Self::Str(b)) | (Self::Raw(a), Self::Raw(b)) => a == b,
            (Self::Arr(a), Self::Arr(b)) | (Self::Set(a), Self::Set(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v.into_bytes())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Arr(v)
    }
}
