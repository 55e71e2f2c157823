use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use crate::converter::{default_converter, Converter};
use crate::http::HttpTransport;
use crate::level::Level;
use crate::payload::Payload;
use crate::record::Record;
use crate::transport::Transport;
use crate::value::{Attr, Value};
use crate::DEFAULT_TIMEOUT;

/// Options for building a [`WebhookHandler`].
///
/// **Fields**
/// - `level`: records below this level are not enabled (default `DEBUG`).
/// - `endpoint`: destination URL, required.
/// - `timeout`: deadline for each delivery (default [`DEFAULT_TIMEOUT`];
///   a zero timeout also means the default).
/// - `converter`: replaces [`default_converter`] when set.
/// - `runtime`: Tokio runtime the delivery tasks are spawned on. When
///   `None`, the runtime current at build time is used.
#[derive(Clone)]
pub struct WebhookOptions {
    pub level: Level,
    pub endpoint: String,
    pub timeout: Duration,
    pub converter: Option<Converter>,
    pub runtime: Option<Handle>,
}

impl Default for WebhookOptions {
    fn default() -> Self {
        Self {
            level: Level::Debug,
            endpoint: String::new(),
            timeout: DEFAULT_TIMEOUT,
            converter: None,
            runtime: None,
        }
    }
}

impl fmt::Debug for WebhookOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookOptions")
            .field("level", &self.level)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("converter", &self.converter.as_ref().map(|_| "custom"))
            .finish()
    }
}

/// Error type returned when building a handler from [`WebhookOptions`].
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("webhook endpoint is not set")]
    MissingEndpoint,

    #[error("no Tokio runtime available for webhook delivery")]
    NoRuntime,
}

impl WebhookOptions {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Build a handler delivering over HTTP with [`HttpTransport`].
    pub fn build(self) -> Result<WebhookHandler, ConfigError> {
        self.build_with_transport(Arc::new(HttpTransport::new()))
    }

    /// Build a handler delivering through `transport`.
    pub fn build_with_transport(self, transport: Arc<dyn Transport>) -> Result<WebhookHandler, ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }

        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| ConfigError::NoRuntime)?,
        };

        let timeout = if self.timeout.is_zero() { DEFAULT_TIMEOUT } else { self.timeout };

        Ok(WebhookHandler {
            shared: Arc::new(Shared {
                level: self.level,
                endpoint: self.endpoint,
                timeout,
                converter: self.converter,
                transport,
                runtime,
            }),
            attrs: Vec::new(),
            groups: Vec::new(),
        })
    }
}

/// Read-only configuration shared by a handler and everything derived
/// from it.
struct Shared {
    level: Level,
    endpoint: String,
    timeout: Duration,
    converter: Option<Converter>,
    transport: Arc<dyn Transport>,
    runtime: Handle,
}

/// Log handler posting each record to a webhook.
///
/// Instances are immutable: [`with_attrs`](Self::with_attrs) and
/// [`with_group`](Self::with_group) return new handlers and leave the
/// receiver untouched, so a handler can be cloned and shared across threads
/// freely.
///
/// Delivery is detached. [`handle`](Self::handle) converts the record on
/// the caller's thread, spawns the delivery on the configured runtime and
/// returns immediately. Delivery failures never reach the caller; they are
/// reported through `tracing` under this crate's target and the record is
/// dropped. Records from concurrent or back-to-back calls may arrive out of
/// order.
#[derive(Clone)]
pub struct WebhookHandler {
    shared: Arc<Shared>,
    attrs: Vec<Attr>,
    groups: Vec<String>,
}

impl WebhookHandler {
    /// Whether records at `level` should be handled.
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.shared.level
    }

    pub fn endpoint(&self) -> &str {
        &self.shared.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.shared.timeout
    }

    /// Attributes accumulated through [`with_attrs`](Self::with_attrs).
    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    /// Currently open groups, outermost first.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Build the payload for `record` with the configured converter.
    pub fn convert(&self, record: &Record) -> Payload {
        match &self.shared.converter {
            Some(converter) => converter(&self.attrs, record),
            None => default_converter(&self.attrs, record),
        }
    }

    /// Convert `record` and dispatch its delivery as a background task.
    pub fn handle(&self, record: &Record) {
        let payload = self.convert(record);
        let shared = Arc::clone(&self.shared);

        self.shared.runtime.spawn(async move {
            match shared
                .transport
                .deliver(&shared.endpoint, shared.timeout, &payload)
                .await
            {
                Ok(()) => tracing::debug!(endpoint = %shared.endpoint, "log record delivered"),
                Err(e) => tracing::warn!(
                    endpoint = %shared.endpoint,
                    error = %e,
                    "dropping log record after failed webhook delivery"
                ),
            }
        });
    }

    /// New handler with `attrs` added under the innermost open group.
    pub fn with_attrs(&self, attrs: impl IntoIterator<Item = Attr>) -> Self {
        let attrs: Vec<Attr> = attrs.into_iter().collect();
        if attrs.is_empty() {
            return self.clone();
        }

        WebhookHandler {
            shared: Arc::clone(&self.shared),
            attrs: append_to_group(&self.groups, &self.attrs, attrs),
            groups: self.groups.clone(),
        }
    }

    /// New handler whose later attributes nest under `name`.
    ///
    /// An empty name leaves the scope unchanged.
    pub fn with_group(&self, name: impl Into<String>) -> Self {
        let name = name.into();
        if name.is_empty() {
            return self.clone();
        }

        let mut groups = self.groups.clone();
        groups.push(name);
        WebhookHandler {
            shared: Arc::clone(&self.shared),
            attrs: self.attrs.clone(),
            groups,
        }
    }
}

impl fmt::Debug for WebhookHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookHandler")
            .field("level", &self.shared.level)
            .field("endpoint", &self.shared.endpoint)
            .field("timeout", &self.shared.timeout)
            .field("attrs", &self.attrs)
            .field("groups", &self.groups)
            .finish()
    }
}

/// Copy of `current` with `new` merged under the group path `groups`.
///
/// An existing group attribute with the next path name is extended in
/// place; otherwise the missing groups are created at the end.
fn append_to_group(groups: &[String], current: &[Attr], new: Vec<Attr>) -> Vec<Attr> {
    let Some((head, rest)) = groups.split_first() else {
        return uniq(current.iter().cloned().chain(new).collect());
    };

    let mut out = current.to_vec();
    let existing = out
        .iter()
        .position(|a| a.key == *head && matches!(a.value, Value::Group(_)));

    match existing {
        Some(idx) => {
            if let Value::Group(children) = &out[idx].value {
                let merged = append_to_group(rest, children, new);
                out[idx].value = Value::Group(merged);
            }
            out
        }
        None => {
            out.push(Attr::group(head.clone(), append_to_group(rest, &[], new)));
            uniq(out)
        }
    }
}

/// Drop earlier duplicates of a key, keeping the first position and the
/// last value.
///
/// Empty keys are never deduplicated: empty-key groups are inlined when
/// the payload is built, so each one must survive.
fn uniq(attrs: Vec<Attr>) -> Vec<Attr> {
    let mut out: Vec<Attr> = Vec::with_capacity(attrs.len());
    for attr in attrs {
        if attr.key.is_empty() {
            out.push(attr);
            continue;
        }
        match out.iter_mut().find(|a| a.key == attr.key) {
            Some(slot) => *slot = attr,
            None => out.push(attr),
        }
    }
    out
}
