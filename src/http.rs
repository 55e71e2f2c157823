use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::Client;

use crate::payload::Payload;
use crate::transport::{DeliveryError, Transport};

/// [`Transport`] posting payloads as JSON over HTTP(S).
///
/// The underlying `reqwest::Client` keeps a connection pool that is
/// reused across deliveries; clones share it.
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (proxies, TLS roots, ...).
    ///
    /// The per-delivery timeout is still applied on top of the client's own
    /// settings.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn deliver(&self, endpoint: &str, timeout: Duration, payload: &Payload) -> Result<(), DeliveryError> {
        let body = serde_json::to_vec(payload)?;

        let resp = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, crate::USER_AGENT)
            .timeout(timeout)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::Timeout(timeout)
                } else {
                    DeliveryError::Transport(e)
                }
            })?;

        // Only the status matters; dropping the response discards the body
        // and releases the connection.
        let status = resp.status();
        drop(resp);

        if status.is_success() {
            Ok(())
        } else {
            Err(DeliveryError::Status(status))
        }
    }
}
