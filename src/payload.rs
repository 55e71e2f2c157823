use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, Serializer};

use crate::value::AnyValue;

/// Mapping serialized as the webhook request body.
///
/// Keys are kept sorted so identical input always yields identical JSON.
pub type Payload = BTreeMap<String, PayloadValue>;

/// JSON-safe value produced by the normalizer.
///
/// Serialization rules:
/// - `Duration` is an integer number of nanoseconds;
/// - `Time` is RFC 3339 text in UTC (`Z` suffix);
/// - `F64` values that are not finite become `null`;
/// - `Any` defers to [`AnyValue`]'s own serialization.
#[derive(Clone, Debug)]
pub enum PayloadValue {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    String(String),
    Duration(Duration),
    Time(DateTime<Utc>),
    Map(Payload),
    Any(AnyValue),
}

impl PayloadValue {
    pub fn as_map(&self) -> Option<&Payload> {
        match self {
            PayloadValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PayloadValue::String(text) => Some(text),
            _ => None,
        }
    }
}

/// Text form used for timestamps throughout the payload.
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Nanoseconds, saturating at `u64::MAX`.
pub fn duration_nanos(duration: &Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

impl Serialize for PayloadValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PayloadValue::Null => serializer.serialize_unit(),
            PayloadValue::Bool(v) => serializer.serialize_bool(*v),
            PayloadValue::I64(v) => serializer.serialize_i64(*v),
            PayloadValue::U64(v) => serializer.serialize_u64(*v),
            PayloadValue::F64(v) => serializer.serialize_f64(*v),
            PayloadValue::String(v) => serializer.serialize_str(v),
            PayloadValue::Duration(v) => serializer.serialize_u64(duration_nanos(v)),
            PayloadValue::Time(v) => serializer.serialize_str(&format_time(v)),
            PayloadValue::Map(map) => serializer.collect_map(map),
            PayloadValue::Any(v) => v.serialize(serializer),
        }
    }
}

impl From<&str> for PayloadValue {
    fn from(v: &str) -> Self {
        PayloadValue::String(v.to_string())
    }
}

impl From<String> for PayloadValue {
    fn from(v: String) -> Self {
        PayloadValue::String(v)
    }
}

impl From<Payload> for PayloadValue {
    fn from(v: Payload) -> Self {
        PayloadValue::Map(v)
    }
}
