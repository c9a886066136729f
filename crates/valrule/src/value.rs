//! Dynamic values handed to rules.
//!
//! Rules never see the caller's Rust types directly. Anything that implements
//! [`ToValue`] is lowered into a [`Value`] first, which keeps the rule contract
//! object safe and lets a single rule accept integers of any width, optional
//! wrappers, JSON-decoded data and time instants alike.
//!
//! The two helpers [`indirect`] and [`is_empty`] are shared by every rule:
//! a rule that allows a value to be omitted consults them before failing.

use crate::numeric::Number;
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

/// Unix timestamp of `0001-01-01T00:00:00Z`, the zero time instant.
const ZERO_TIME_SECS: i64 = -62_135_596_800;

/// A normalized value under validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value (a nil interface)
    Nil,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    F32(f32),
    F64(f64),
    String(String),
    /// Raw byte buffer
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(MapValue),
    /// A time instant
    Time(DateTime<Utc>),
    /// A numeric literal whose native type has not been fixed yet
    Number(Number),
    /// A named aggregate
    Struct(StructValue),
    /// One layer of indirection; `Ref(None)` is a nil layer
    Ref(Option<Box<Value>>),
}

impl Value {
    /// Build a byte buffer value.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(bytes.into())
    }

    /// Name of the value's kind, used in conversion error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::Isize(_) => "isize",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::Usize(_) => "usize",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Time(_) => "time",
            Value::Number(_) => "number",
            Value::Struct(s) => s.name(),
            Value::Ref(_) => "ref",
        }
    }

    /// Whether the value is a native integer or float.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::I8(_)
                | Value::I16(_)
                | Value::I32(_)
                | Value::I64(_)
                | Value::Isize(_)
                | Value::U8(_)
                | Value::U16(_)
                | Value::U32(_)
                | Value::U64(_)
                | Value::Usize(_)
                | Value::F32(_)
                | Value::F64(_)
        )
    }

    /// Convert the value into an error parameter.
    ///
    /// Time instants become their display string, floats keep their shortest
    /// decimal form and aggregates fall back to their debug rendering.
    pub fn to_param(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Nil | Value::Ref(None) => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::I8(v) => Json::from(*v),
            Value::I16(v) => Json::from(*v),
            Value::I32(v) => Json::from(*v),
            Value::I64(v) => Json::from(*v),
            Value::Isize(v) => Json::from(*v),
            Value::U8(v) => Json::from(*v),
            Value::U16(v) => Json::from(*v),
            Value::U32(v) => Json::from(*v),
            Value::U64(v) => Json::from(*v),
            Value::Usize(v) => Json::from(*v),
            // Going through the shortest decimal form keeps 0.1f32 as 0.1.
            Value::F32(v) => float_param(v.to_string().parse().unwrap_or(f64::from(*v))),
            Value::F64(v) => float_param(*v),
            Value::String(s) => Json::String(s.clone()),
            Value::Time(t) => Json::String(format_time(t)),
            Value::Number(n) => Json::String(n.as_str().to_owned()),
            Value::List(items) => Json::Array(items.iter().map(Value::to_param).collect()),
            Value::Ref(Some(inner)) => inner.to_param(),
            other => Json::String(format!("{other:?}")),
        }
    }
}

fn float_param(v: f64) -> serde_json::Value {
    serde_json::Number::from_f64(v)
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| serde_json::Value::String(v.to_string()))
}

/// Render a time instant as `2000-06-01 00:00:00 +0000 UTC`.
///
/// Fractional seconds are printed only when present, without trailing zeros
/// (`00:00:00.5`).
pub fn format_time(t: &DateTime<Utc>) -> String {
    let nanos = t.timestamp_subsec_nanos();
    let fraction = if nanos == 0 {
        String::new()
    } else {
        format!(".{nanos:09}").trim_end_matches('0').to_owned()
    };
    format!("{}{fraction} {}", t.format("%Y-%m-%d %H:%M:%S"), t.format("%z UTC"))
}

/// The zero time instant, `0001-01-01T00:00:00Z`.
///
/// A zero instant counts as an absent time value.
pub fn zero_time() -> DateTime<Utc> {
    DateTime::from_timestamp(ZERO_TIME_SECS, 0).unwrap_or_default()
}

/// Whether `t` is the zero time instant.
pub fn is_zero_time(t: &DateTime<Utc>) -> bool {
    t.timestamp() == ZERO_TIME_SECS && t.timestamp_subsec_nanos() == 0
}

/// Map entries compared without regard to their order.
///
/// Keys are unique: inserting an existing key replaces its value.
#[derive(Debug, Clone, Default)]
pub struct MapValue(Vec<(Value, Value)>);

impl MapValue {
    pub fn new(entries: Vec<(Value, Value)>) -> Self {
        entries.into_iter().collect()
    }

    /// Insert an entry, replacing the value of an existing key.
    pub fn insert(&mut self, key: Value, value: Value) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn entries(&self) -> &[(Value, Value)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up the value stored under `key`.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl PartialEq for MapValue {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .0
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|v| v == value))
    }
}

impl FromIterator<(Value, Value)> for MapValue {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut map = Self::default();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// A named aggregate value.
///
/// Aggregates have no standard emptiness notion. They are non-empty unless
/// the type supplies its own answer through [`StructValue::with_emptiness`].
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    name: Cow<'static, str>,
    fields: Vec<(Cow<'static, str>, Value)>,
    empty: Option<bool>,
}

impl StructValue {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            empty: None,
        }
    }

    /// Add a field.
    pub fn field(mut self, name: impl Into<Cow<'static, str>>, value: impl ToValue) -> Self {
        self.fields.push((name.into(), value.to_value()));
        self
    }

    /// Report the aggregate's own emptiness.
    pub fn with_emptiness(mut self, empty: bool) -> Self {
        self.empty = Some(empty);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[(Cow<'static, str>, Value)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.empty.unwrap_or(false)
    }
}

/// Follow indirection layers to the innermost concrete value.
///
/// Returns `None` when the value is nil-equivalent: `Nil` itself, or any
/// `Ref` layer on the way down that holds nothing.
pub fn indirect(value: &Value) -> Option<&Value> {
    match value {
        Value::Nil | Value::Ref(None) => None,
        Value::Ref(Some(inner)) => indirect(inner),
        concrete => Some(concrete),
    }
}

/// Whether the value counts as absent.
///
/// Zero numbers, `false`, zero-length strings/buffers/lists/maps, the zero
/// time instant, empty literals and nil layers are empty. Aggregates are empty
/// only when they say so.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Nil | Value::Ref(None) => true,
        Value::Ref(Some(inner)) => is_empty(inner),
        Value::Bool(b) => !*b,
        Value::I8(v) => *v == 0,
        Value::I16(v) => *v == 0,
        Value::I32(v) => *v == 0,
        Value::I64(v) => *v == 0,
        Value::Isize(v) => *v == 0,
        Value::U8(v) => *v == 0,
        Value::U16(v) => *v == 0,
        Value::U32(v) => *v == 0,
        Value::U64(v) => *v == 0,
        Value::Usize(v) => *v == 0,
        Value::F32(v) => *v == 0.0,
        Value::F64(v) => *v == 0.0,
        Value::String(s) => s.is_empty(),
        Value::Bytes(b) => b.is_empty(),
        Value::List(items) => items.is_empty(),
        Value::Map(map) => map.is_empty(),
        Value::Time(t) => is_zero_time(t),
        Value::Number(n) => n.as_str().is_empty(),
        Value::Struct(s) => s.is_empty(),
    }
}

/// Conversion of Rust values into [`Value`].
pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

macro_rules! impl_to_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::$variant(*self)
                }
            }
        )*
    };
}

impl_to_value! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    DateTime<Utc> => Time,
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_owned())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToValue for Number {
    fn to_value(&self) -> Value {
        Value::Number(self.clone())
    }
}

impl ToValue for StructValue {
    fn to_value(&self) -> Value {
        Value::Struct(self.clone())
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        Value::Ref(self.as_ref().map(|v| Box::new(v.to_value())))
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        Value::Ref(Some(Box::new((**self).to_value())))
    }
}

impl<T: ToValue + ?Sized> ToValue for Rc<T> {
    fn to_value(&self) -> Value {
        Value::Ref(Some(Box::new((**self).to_value())))
    }
}

impl<T: ToValue + ?Sized> ToValue for Arc<T> {
    fn to_value(&self) -> Value {
        Value::Ref(Some(Box::new((**self).to_value())))
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<K: ToValue, V: ToValue, S: BuildHasher> ToValue for HashMap<K, V, S> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }
}

impl<K: ToValue, V: ToValue> ToValue for BTreeMap<K, V> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }
}

/// JSON documents lower naturally: `null` is nil, numbers stay deferred
/// literals until a rule decides how to read them.
impl ToValue for serde_json::Value {
    fn to_value(&self) -> Value {
        use serde_json::Value as Json;

        match self {
            Json::Null => Value::Nil,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => Value::Number(Number::from(n)),
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => items.to_value(),
            Json::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (Value::String(k.clone()), v.to_value()))
                    .collect(),
            ),
        }
    }
}
