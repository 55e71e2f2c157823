//! Conversion of typed attribute values into JSON-safe payload values.

use chrono::Utc;

use crate::payload::{Payload, PayloadValue};
use crate::value::{Attr, Value};

/// Normalize a single value.
///
/// Groups become mappings (an empty group is an empty mapping), lazy values
/// are resolved first, times are moved to UTC and opaque values pass through
/// for the serializer to render.
pub fn normalize(value: &Value) -> PayloadValue {
    match value {
        Value::I64(v) => PayloadValue::I64(*v),
        Value::U64(v) => PayloadValue::U64(*v),
        Value::F64(v) => PayloadValue::F64(*v),
        Value::String(v) => PayloadValue::String(v.clone()),
        Value::Bool(v) => PayloadValue::Bool(*v),
        Value::Duration(v) => PayloadValue::Duration(*v),
        Value::Time(v) => PayloadValue::Time(v.with_timezone(&Utc)),
        Value::Group(attrs) => PayloadValue::Map(attrs_to_map(attrs)),
        Value::Any(v) => PayloadValue::Any(v.clone()),
        Value::Lazy(_) => normalize(&value.resolve()),
    }
}

/// Normalize a list of attributes into a mapping.
pub fn attrs_to_map(attrs: &[Attr]) -> Payload {
    let mut out = Payload::new();
    merge_attrs(&mut out, attrs);
    out
}

/// Normalize `attrs` into `out`; later keys overwrite earlier ones.
///
/// Attributes with an empty key are dropped, except groups, whose
/// children are inlined at this level.
pub fn merge_attrs(out: &mut Payload, attrs: &[Attr]) {
    for attr in attrs {
        if attr.key.is_empty() {
            if let Value::Group(children) = attr.value.resolve() {
                merge_attrs(out, &children);
            }
            continue;
        }
        out.insert(attr.key.clone(), normalize(&attr.value));
    }
}
