use crate::handler::WebhookHandler;
use crate::layer::WebhookLayer;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the installed subscriber.
///
/// **Fields**
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   added next to [`WebhookLayer`] so events are also printed locally.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self { enable_stdout: true }
    }
}

/// Install a global `tracing` subscriber that forwards events to `handler`.
///
/// **Parameters**
/// - `handler`: built [`WebhookHandler`]; its minimum level filters events.
/// - `config`: [`LayerConfig`] controlling local output.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already installed.
pub fn init_tracing_with_config(handler: WebhookHandler, config: LayerConfig) -> Result<(), SetGlobalDefaultError> {
    let layer = WebhookLayer::new(handler);

    // The two subscriber shapes have different types, so each branch
    // installs its own.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)
    }
}

/// Install the webhook subscriber with [`LayerConfig::default`].
pub fn init_tracing(handler: WebhookHandler) -> Result<(), SetGlobalDefaultError> {
    init_tracing_with_config(handler, LayerConfig::default())
}
