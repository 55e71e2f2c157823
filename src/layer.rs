use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::handler::WebhookHandler;
use crate::level::Level;
use crate::record::Record;
use crate::value::{AnyValue, Attr, ErrorValue, Value};

/// Target prefix of this crate's own events; the layer never forwards them.
const SELF_TARGET: &str = "webhook_log_sink";

/// `tracing_subscriber` layer that turns events into [`Record`]s and hands
/// them to a [`WebhookHandler`].
///
/// Events below the handler's minimum level are skipped before any field is
/// visited. The handler's delivery is detached, so `on_event` never waits on
/// the network.
pub struct WebhookLayer {
    handler: WebhookHandler,
}

impl WebhookLayer {
    pub fn new(handler: WebhookHandler) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &WebhookHandler {
        &self.handler
    }
}

impl<S> Layer<S> for WebhookLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        // Delivery failures are logged under our own target; forwarding
        // them would feed back into the webhook.
        if meta.target().starts_with(SELF_TARGET) {
            return;
        }

        let level = Level::from(*meta.level());
        if !self.handler.enabled(level) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let record = Record::new(level, visitor.message.unwrap_or_default()).with_attrs(visitor.attrs);
        self.handler.handle(&record);
    }
}

/// Collects event fields as typed attributes.
#[derive(Default)]
pub struct FieldVisitor {
    pub attrs: Vec<Attr>,
    pub message: Option<String>,
}

impl FieldVisitor {
    fn push(&mut self, field: &Field, value: Value) {
        self.attrs.push(Attr::new(field.name(), value));
    }
}

impl Visit for FieldVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, Value::F64(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, Value::I64(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, Value::U64(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, Value::Bool(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.push(field, Value::String(value.to_string()));
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push(field, Value::Any(AnyValue::Error(ErrorValue::new(value))));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.push(field, Value::Any(AnyValue::Debug(format!("{:?}", value))));
        }
    }
}
