use std::time::Duration;

use async_trait::async_trait;

use crate::payload::Payload;

/// Destination for converted payloads.
///
/// Implementations deliver one payload per call, at most once: no retries,
/// no buffering. The handler invokes `deliver` from a detached Tokio task
/// and never awaits it on the logging thread.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver a single payload to `endpoint`.
    ///
    /// **Parameters**
    /// - `endpoint`: destination URL.
    /// - `timeout`: deadline for this attempt only.
    /// - `payload`: converted record.
    ///
    /// **Returns**
    /// - `Ok(())` if the endpoint accepted the payload.
    /// - `Err(..)` with the [`DeliveryError`] that ended the attempt.
    async fn deliver(&self, endpoint: &str, timeout: Duration, payload: &Payload) -> Result<(), DeliveryError>;
}

/// Why a single delivery attempt failed.
#[derive(thiserror::Error, Debug)]
pub enum DeliveryError {
    /// The payload could not be encoded; nothing was sent.
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("webhook request timed out after {0:?}")]
    Timeout(Duration),

    #[error("webhook request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("webhook responded with status {0}")]
    Status(reqwest::StatusCode),
}
