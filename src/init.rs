use crate::dispatcher::Dispatcher;
use crate::layer::DispatchLayer;
use crate::message::Agent;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the tracing bridge.
///
/// **Fields**
/// - `channel_buffer`: number of [`LogMessage`](crate::message::LogMessage)s
///   queued before new ones are dropped. Values below 16 are raised to 16.
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is added
///   next to the [`DispatchLayer`] so events are also printed by `tracing`.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub channel_buffer: usize,
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 1024,
            enable_stdout: false,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    SetGlobalDefault(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install a global `tracing` subscriber that forwards events to
/// `dispatcher`.
///
/// **Parameters**
/// - `dispatcher`: receives every event allowed by its own threshold.
/// - `agent`: written into `agent` of every forwarded message.
/// - `config`: [`LayerConfig`] controlling the queue and console output.
///
/// **Returns**
/// - the handle of the background task draining the queue;
/// - `Err(InitError)` if a global subscriber was already installed.
///
/// Must be called from within a Tokio runtime.
pub fn init_tracing_with_config(
    dispatcher: Arc<Dispatcher>,
    agent: Agent,
    config: LayerConfig,
) -> Result<JoinHandle<()>, InitError> {
    let (layer, handle) = DispatchLayer::new(dispatcher, agent, config.channel_buffer);

    // The two subscriber shapes have different types, hence two branches.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(handle)
}

/// Equivalent to [`init_tracing_with_config`] with [`LayerConfig::default`].
pub fn init_tracing(
    dispatcher: Arc<Dispatcher>,
    agent: Agent,
) -> Result<JoinHandle<()>, InitError> {
    init_tracing_with_config(dispatcher, agent, LayerConfig::default())
}
