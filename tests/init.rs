mod common;

use std::sync::Arc;

use common::{next, RecordingTransport};
use webhook_log_sink::init::{init_tracing, init_tracing_with_config, LayerConfig};
use webhook_log_sink::WebhookOptions;

#[tokio::test]
async fn installs_global_subscriber_once() {
    let (transport, mut rx) = RecordingTransport::new();
    let handler = WebhookOptions::new("http://unused.invalid/hook")
        .build_with_transport(Arc::new(transport))
        .expect("build handler");

    init_tracing_with_config(handler.clone(), LayerConfig { enable_stdout: false })
        .expect("first install succeeds");

    tracing::info!(order_id = 17u64, "order placed");
    let payload = next(&mut rx).await;
    assert_eq!(payload["message"], "order placed");
    assert_eq!(payload["extra"]["order_id"], 17);

    assert!(init_tracing(handler).is_err(), "a second global subscriber is rejected");
}
