use std::time::Duration;

pub mod level;
pub mod value;
pub mod request;
pub mod record;
pub mod payload;
pub mod normalize;
pub mod converter;
pub mod transport;
pub mod http;
pub mod noop_transport;
pub mod handler;
pub mod layer;
pub mod init;

pub use converter::{default_converter, Converter};
pub use handler::{ConfigError, WebhookHandler, WebhookOptions};
pub use level::Level;
pub use payload::{Payload, PayloadValue};
pub use record::Record;
pub use transport::{DeliveryError, Transport};
pub use value::{AnyValue, Attr, LogValuer, Value};

/// Value of the payload's `logger` key.
pub const LOGGER_NAME: &str = env!("CARGO_PKG_NAME");

/// `user-agent` header sent with every delivery.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Delivery timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
