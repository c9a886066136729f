//! Numeric coercion helpers and the deferred numeric literal.
//!
//! [`to_int`], [`to_uint`] and [`to_float`] turn any numeric [`Value`] (or a
//! string holding a number) into one canonical representation. Narrowing is
//! checked: a value that does not fit the target is a conversion error.

use crate::error::ValidationError;
use crate::value::Value;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A numeric literal whose native type has not been decided yet.
///
/// This is what a permissive decoder hands over when it reads a JSON number
/// without knowing whether the field is an integer, a float or a timestamp.
/// Rules parse it once they know the kind they compare against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Number(String);

impl Number {
    pub fn new(literal: impl Into<String>) -> Self {
        Self(literal.into())
    }

    /// The literal as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the literal as a 64-bit signed integer.
    pub fn int64(&self) -> Result<i64, ValidationError> {
        self.0
            .parse()
            .map_err(|e: std::num::ParseIntError| self.invalid(e.to_string()))
    }

    /// Parse the literal as a 64-bit float.
    pub fn float64(&self) -> Result<f64, ValidationError> {
        self.0
            .parse()
            .map_err(|e: std::num::ParseFloatError| self.invalid(e.to_string()))
    }

    pub(crate) fn invalid(&self, reason: impl Into<String>) -> ValidationError {
        ValidationError::InvalidNumber {
            literal: self.0.clone(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Number {
    fn from(literal: &str) -> Self {
        Self(literal.to_owned())
    }
}

impl From<String> for Number {
    fn from(literal: String) -> Self {
        Self(literal)
    }
}

impl From<&serde_json::Number> for Number {
    fn from(n: &serde_json::Number) -> Self {
        Self(n.to_string())
    }
}

impl From<serde_json::Number> for Number {
    fn from(n: serde_json::Number) -> Self {
        Self::from(&n)
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Ok(i) = self.0.parse::<i64>() {
            serializer.serialize_i64(i)
        } else if let Ok(u) = self.0.parse::<u64>() {
            serializer.serialize_u64(u)
        } else if let Ok(f) = self.0.parse::<f64>() {
            serializer.serialize_f64(f)
        } else {
            serializer.serialize_str(&self.0)
        }
    }
}

struct NumberVisitor;

impl Visitor<'_> for NumberVisitor {
    type Value = Number;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Number, E> {
        Ok(Number(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Number, E> {
        Ok(Number(v.to_string()))
    }

    // Keep a float rendering so `1.0` stays distinguishable from `1`.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Number, E> {
        serde_json::Number::from_f64(v)
            .map(Number::from)
            .ok_or_else(|| E::custom(format!("non-finite number {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Number, E> {
        Ok(Number(v.to_owned()))
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NumberVisitor)
    }
}

// 2^63 and 2^64 are exact in f64.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
const U64_BOUND: f64 = 18_446_744_073_709_551_616.0;

fn float_to_int(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&v)).then(|| v as i64)
}

fn float_to_uint(v: f64) -> Option<u64> {
    (v.is_finite() && v.fract() == 0.0 && (0.0..U64_BOUND).contains(&v)).then(|| v as u64)
}

/// Convert a value into an `i64`.
pub fn to_int(value: &Value) -> Result<i64, ValidationError> {
    let converted = match value {
        Value::I8(v) => Some(i64::from(*v)),
        Value::I16(v) => Some(i64::from(*v)),
        Value::I32(v) => Some(i64::from(*v)),
        Value::I64(v) => Some(*v),
        Value::Isize(v) => i64::try_from(*v).ok(),
        Value::U8(v) => Some(i64::from(*v)),
        Value::U16(v) => Some(i64::from(*v)),
        Value::U32(v) => Some(i64::from(*v)),
        Value::U64(v) => i64::try_from(*v).ok(),
        Value::Usize(v) => i64::try_from(*v).ok(),
        Value::F32(v) => float_to_int(f64::from(*v)),
        Value::F64(v) => float_to_int(*v),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    converted.ok_or_else(|| ValidationError::conversion(value.type_name(), "i64"))
}

/// Convert a value into a `u64`.
pub fn to_uint(value: &Value) -> Result<u64, ValidationError> {
    let converted = match value {
        Value::I8(v) => u64::try_from(*v).ok(),
        Value::I16(v) => u64::try_from(*v).ok(),
        Value::I32(v) => u64::try_from(*v).ok(),
        Value::I64(v) => u64::try_from(*v).ok(),
        Value::Isize(v) => u64::try_from(*v).ok(),
        Value::U8(v) => Some(u64::from(*v)),
        Value::U16(v) => Some(u64::from(*v)),
        Value::U32(v) => Some(u64::from(*v)),
        Value::U64(v) => Some(*v),
        Value::Usize(v) => u64::try_from(*v).ok(),
        Value::F32(v) => float_to_uint(f64::from(*v)),
        Value::F64(v) => float_to_uint(*v),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    converted.ok_or_else(|| ValidationError::conversion(value.type_name(), "u64"))
}

/// Convert a value into an `f64`.
///
/// Integers beyond 2^53 lose precision the way any float conversion does.
pub fn to_float(value: &Value) -> Result<f64, ValidationError> {
    let converted = match value {
        Value::I8(v) => Some(f64::from(*v)),
        Value::I16(v) => Some(f64::from(*v)),
        Value::I32(v) => Some(f64::from(*v)),
        Value::I64(v) => Some(*v as f64),
        Value::Isize(v) => Some(*v as f64),
        Value::U8(v) => Some(f64::from(*v)),
        Value::U16(v) => Some(f64::from(*v)),
        Value::U32(v) => Some(f64::from(*v)),
        Value::U64(v) => Some(*v as f64),
        Value::Usize(v) => Some(*v as f64),
        Value::F32(v) => Some(f64::from(*v)),
        Value::F64(v) => Some(*v),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    converted.ok_or_else(|| ValidationError::conversion(value.type_name(), "f64"))
}
