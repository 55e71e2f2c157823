use std::time::Duration;

use async_trait::async_trait;

use crate::payload::Payload;
use crate::transport::{DeliveryError, Transport};

/// A transport that simply drops all payloads.
///
/// Useful for measuring the overhead of conversion and task dispatch
/// without any network I/O, and for tests that don't care about delivery.
#[derive(Clone, Debug, Default)]
pub struct NoopTransport;

#[async_trait]
impl Transport for NoopTransport {
    async fn deliver(&self, _endpoint: &str, _timeout: Duration, _payload: &Payload) -> Result<(), DeliveryError> {
        Ok(())
    }
}
