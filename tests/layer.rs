mod common;

use std::sync::Arc;

use common::{next, RecordingTransport};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;
use webhook_log_sink::layer::WebhookLayer;
use webhook_log_sink::{Level, WebhookOptions};

#[derive(Debug, thiserror::Error)]
#[error("connection reset")]
struct ResetError;

#[tokio::test]
async fn forwards_events_with_their_fields() {
    let (transport, mut rx) = RecordingTransport::new();
    let handler = WebhookOptions {
        level: Level::Info,
        ..WebhookOptions::new("http://unused.invalid/hook")
    }
    .build_with_transport(Arc::new(transport))
    .expect("build handler");

    let subscriber = Registry::default().with(WebhookLayer::new(handler));
    tracing::subscriber::with_default(subscriber, || {
        tracing::debug!("below the minimum level");
        let err = ResetError;
        tracing::error!(
            user_id = 42u64,
            retries = -1i64,
            ratio = 0.5f64,
            ok = false,
            reason = "invalid password",
            error = &err as &(dyn std::error::Error + 'static),
            "authentication failed"
        );
    });

    let payload = next(&mut rx).await;
    assert_eq!(payload["level"], "ERROR");
    assert_eq!(payload["message"], "authentication failed");
    assert_eq!(payload["error"]["error"], "connection reset");
    assert_eq!(
        payload["extra"],
        serde_json::json!({
            "user_id": 42,
            "retries": -1,
            "ratio": 0.5,
            "ok": false,
            "reason": "invalid password",
        })
    );

    // The debug event was filtered out, so nothing else arrives.
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn ignores_events_from_this_crate() {
    let (transport, mut rx) = RecordingTransport::new();
    let handler = WebhookOptions::new("http://unused.invalid/hook")
        .build_with_transport(Arc::new(transport))
        .expect("build handler");

    let subscriber = Registry::default().with(WebhookLayer::new(handler));
    tracing::subscriber::with_default(subscriber, || {
        tracing::warn!(target: "webhook_log_sink::handler", "internal");
        tracing::warn!(target: "app", "external");
    });

    let payload = next(&mut rx).await;
    assert_eq!(payload["message"], "external");
    assert!(rx.try_recv().is_err());
}
