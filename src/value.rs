use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Offset, TimeZone};
use serde::Serialize;

use crate::request::RequestValue;

/// Upper bound on chained [`LogValuer`] resolutions.
pub const MAX_RESOLVE_DEPTH: usize = 100;

/// A key/value pair attached to a handler or to a single record.
#[derive(Clone, Debug)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Attr { key: key.into(), value: value.into() }
    }

    /// Nested group of attributes, rendered as a mapping under `key`.
    pub fn group(key: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) -> Self {
        Attr::new(key, Value::Group(attrs.into_iter().collect()))
    }

    /// Error attribute; under the `error` key it is promoted to the
    /// payload's top-level `error` descriptor.
    pub fn error<E>(key: impl Into<String>, err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        Attr::new(key, Value::Any(AnyValue::Error(ErrorValue::new(err))))
    }

    /// HTTP request attribute; under the `request` key it is promoted to
    /// the payload's top-level `request` descriptor.
    pub fn request(key: impl Into<String>, request: impl Into<RequestValue>) -> Self {
        Attr::new(key, Value::Any(AnyValue::Request(request.into())))
    }

    /// Arbitrary serializable value, serialized through its own mapping.
    pub fn any<T>(key: impl Into<String>, value: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Attr::new(key, Value::Any(AnyValue::Serialize(Arc::new(value))))
    }

    /// Value computed only when the attribute is converted.
    pub fn lazy(key: impl Into<String>, valuer: impl LogValuer + 'static) -> Self {
        Attr::new(key, Value::Lazy(Arc::new(valuer)))
    }
}

/// Deferred value provider, resolved during conversion.
///
/// Closures returning a [`Value`] implement this trait.
pub trait LogValuer: Send + Sync {
    fn log_value(&self) -> Value;
}

impl<F> LogValuer for F
where
    F: Fn() -> Value + Send + Sync,
{
    fn log_value(&self) -> Value {
        self()
    }
}

/// Typed attribute value.
#[derive(Clone)]
pub enum Value {
    I64(i64),
    U64(u64),
    F64(f64),
    String(String),
    Bool(bool),
    Duration(Duration),
    Time(DateTime<FixedOffset>),
    Group(Vec<Attr>),
    Any(AnyValue),
    Lazy(Arc<dyn LogValuer>),
}

impl Value {
    /// Follow lazy providers until a concrete value is reached.
    ///
    /// A chain longer than [`MAX_RESOLVE_DEPTH`] resolves to a text value
    /// describing the failure instead of looping forever.
    pub fn resolve(&self) -> Value {
        let mut value = self.clone();
        for _ in 0..MAX_RESOLVE_DEPTH {
            let next = match &value {
                Value::Lazy(valuer) => valuer.log_value(),
                _ => return value,
            };
            value = next;
        }

        match value {
            Value::Lazy(_) => Value::String(format!(
                "log value not resolved after {} steps",
                MAX_RESOLVE_DEPTH
            )),
            resolved => resolved,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I64(v) => f.debug_tuple("I64").field(v).finish(),
            Value::U64(v) => f.debug_tuple("U64").field(v).finish(),
            Value::F64(v) => f.debug_tuple("F64").field(v).finish(),
            Value::String(v) => f.debug_tuple("String").field(v).finish(),
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::Duration(v) => f.debug_tuple("Duration").field(v).finish(),
            Value::Time(v) => f.debug_tuple("Time").field(v).finish(),
            Value::Group(v) => f.debug_tuple("Group").field(v).finish(),
            Value::Any(v) => f.debug_tuple("Any").field(v).finish(),
            Value::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

macro_rules! impl_from_number {
    ($variant:ident, $target:ty: $($source:ty),*) => {
        $(
            impl From<$source> for Value {
                fn from(v: $source) -> Self {
                    Value::$variant(<$target>::from(v))
                }
            }
        )*
    };
}

impl_from_number!(I64, i64: i8, i16, i32, i64);
impl_from_number!(U64, u64: u8, u16, u32, u64);
impl_from_number!(F64, f64: f32, f64);

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::U64(v as u64)
    }
}

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Value::I64(v as i64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Value::Duration(v)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(v: DateTime<Tz>) -> Self {
        let offset = v.offset().fix();
        Value::Time(v.with_timezone(&offset))
    }
}

impl From<Vec<Attr>> for Value {
    fn from(attrs: Vec<Attr>) -> Self {
        Value::Group(attrs)
    }
}

impl From<AnyValue> for Value {
    fn from(v: AnyValue) -> Self {
        Value::Any(v)
    }
}

/// Opaque value carried through normalization untouched.
///
/// The variant doubles as a capability tag: the converter only promotes
/// `error` and `request` keys whose value is [`AnyValue::Error`] or
/// [`AnyValue::Request`].
#[derive(Clone)]
pub enum AnyValue {
    Error(ErrorValue),
    Request(RequestValue),
    Serialize(Arc<dyn ToJson>),
    Debug(String),
}

impl AnyValue {
    pub fn as_error(&self) -> Option<&ErrorValue> {
        match self {
            AnyValue::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_request(&self) -> Option<&RequestValue> {
        match self {
            AnyValue::Request(req) => Some(req),
            _ => None,
        }
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyValue::Error(err) => f.debug_tuple("Error").field(err).finish(),
            AnyValue::Request(req) => f.debug_tuple("Request").field(req).finish(),
            AnyValue::Serialize(_) => f.write_str("Serialize(..)"),
            AnyValue::Debug(text) => f.debug_tuple("Debug").field(text).finish(),
        }
    }
}

impl Serialize for AnyValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AnyValue::Error(err) => serializer.serialize_str(err.message()),
            AnyValue::Request(req) => req.descriptor().serialize(serializer),
            AnyValue::Serialize(value) => value
                .to_json()
                .map_err(serde::ser::Error::custom)?
                .serialize(serializer),
            AnyValue::Debug(text) => serializer.serialize_str(text),
        }
    }
}

/// Object-safe view of a `serde::Serialize` value.
pub trait ToJson: Send + Sync {
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error>;
}

impl<T> ToJson for T
where
    T: Serialize + Send + Sync,
{
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Error captured as a type name plus its rendered message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorValue {
    kind: String,
    message: String,
}

impl ErrorValue {
    pub fn new<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        ErrorValue {
            kind: std::any::type_name::<E>().to_string(),
            message: err.to_string(),
        }
    }

    /// Type name of the error as seen at the call site.
    ///
    /// Errors passed as trait objects, including every error recorded
    /// through a `tracing` field, report the trait-object name
    /// (`dyn core::error::Error`) rather than the concrete type.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
