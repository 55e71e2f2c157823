use std::sync::Arc;

use crate::normalize::{attrs_to_map, merge_attrs};
use crate::payload::{format_time, Payload, PayloadValue};
use crate::record::Record;
use crate::request::RequestValue;
use crate::value::{AnyValue, Attr, ErrorValue};
use crate::LOGGER_NAME;

/// Builds the webhook payload from a handler's accumulated attributes and
/// one record.
///
/// A converter configured on [`WebhookOptions`](crate::handler::WebhookOptions)
/// replaces [`default_converter`] entirely.
pub type Converter = Arc<dyn Fn(&[Attr], &Record) -> Payload + Send + Sync>;

/// Default payload layout.
///
/// Handler attributes and record attributes are normalized into one
/// mapping (record attributes win on collision). The `error`, `request` and
/// `user` keys are then lifted out of it to the top level, `error` and
/// `request` only when they carry an error or a request value. Whatever
/// remains becomes `extra`.
pub fn default_converter(logger_attrs: &[Attr], record: &Record) -> Payload {
    let mut extra = attrs_to_map(logger_attrs);
    merge_attrs(&mut extra, &record.attrs);

    let mut payload = Payload::new();
    payload.insert("logger".into(), LOGGER_NAME.into());
    payload.insert("timestamp".into(), format_time(&record.time).into());
    payload.insert("level".into(), record.level.as_str().into());
    payload.insert("message".into(), record.message.as_str().into());

    if let Some(err) = take_any(&mut extra, "error", AnyValue::as_error) {
        payload.insert("error".into(), build_error(&err));
    }

    if let Some(req) = take_any(&mut extra, "request", AnyValue::as_request) {
        payload.insert("request".into(), build_request(&req));
    }

    if let Some(user) = extra.remove("user") {
        payload.insert("user".into(), user);
    }

    payload.insert("extra".into(), PayloadValue::Map(extra));
    payload
}

/// `{kind, error, stack}` descriptor for the top-level `error` entry.
///
/// `stack` is always `null`; the slot is kept so receivers can rely on the
/// shape.
pub fn build_error(err: &ErrorValue) -> PayloadValue {
    let mut out = Payload::new();
    out.insert("kind".into(), err.kind().into());
    out.insert("error".into(), err.message().into());
    out.insert("stack".into(), PayloadValue::Null);
    PayloadValue::Map(out)
}

/// Descriptor for the top-level `request` entry.
pub fn build_request(req: &RequestValue) -> PayloadValue {
    req.descriptor()
}

/// Remove `key` from `map` if its value passes the capability check.
fn take_any<T: Clone>(
    map: &mut Payload,
    key: &str,
    check: impl Fn(&AnyValue) -> Option<&T>,
) -> Option<T> {
    let found = match map.get(key) {
        Some(PayloadValue::Any(value)) => check(value).cloned(),
        _ => None,
    };
    if found.is_some() {
        map.remove(key);
    }
    found
}
