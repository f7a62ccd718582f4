use crate::dispatcher::Dispatcher;
use crate::level::LogLevel;
use crate::message::{Agent, LogMessage};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Events from this crate are never forwarded, so the dispatcher's own
/// diagnostics cannot loop back into it.
const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");
const OWN_TARGET_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::");

/// Minimum channel capacity; smaller requested buffers are raised to this.
pub const MIN_CHANNEL_BUFFER: usize = 16;

fn is_own_target(target: &str) -> bool {
    target == OWN_TARGET || target.starts_with(OWN_TARGET_PREFIX)
}

/// `tracing_subscriber` layer that turns events into [`LogMessage`]s and
/// hands them to a [`Dispatcher`] from a background task.
///
/// Events more verbose than the dispatcher threshold are skipped before
/// they reach the channel. When the channel is full the message is dropped
/// and counted; nothing is retried.
pub struct DispatchLayer {
    sender: mpsc::Sender<LogMessage>,
    level: LogLevel,
    agent: Agent,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Successfully enqueued into channel.
    pub enqueued_events: Arc<AtomicU64>,
    /// Dropped because the channel was full or the task has stopped.
    pub dropped_events: Arc<AtomicU64>,
}

impl DispatchLayer {
    /// Create a new layer and spawn the task that drains its channel into
    /// `dispatcher`. Must be called from within a Tokio runtime.
    ///
    /// `buffer` is raised to [`MIN_CHANNEL_BUFFER`] if smaller. The task ends
    /// once the layer (and with it the sender) is dropped.
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        agent: Agent,
        buffer: usize,
    ) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<LogMessage>(buffer.max(MIN_CHANNEL_BUFFER));
        let level = dispatcher.log_level();

        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if let Err(e) = dispatcher.dispatch(&message).await {
                    eprintln!("error dispatching log message: {}", e);
                }
            }
        });

        (
            Self {
                sender: tx,
                level,
                agent,
                total_events: Arc::new(AtomicU64::new(0)),
                enqueued_events: Arc::new(AtomicU64::new(0)),
                dropped_events: Arc::new(AtomicU64::new(0)),
            },
            handle,
        )
    }
}

impl<S> Layer<S> for DispatchLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let meta = event.metadata();
        let level = LogLevel::from(*meta.level());
        if !self.level.allows(level) || is_own_target(meta.target()) {
            return;
        }

        let mut labels = BTreeMap::new();
        let mut text = String::new();
        event.record(&mut FieldVisitor {
            labels: &mut labels,
            message: &mut text,
        });
        labels.insert("target".to_string(), meta.target().to_string());

        let mut message = LogMessage::new()
            .with_level(level)
            .with_agent(self.agent.clone())
            .with_message(text)
            .with_labels(labels);
        if let Some(module) = meta.module_path() {
            message = message.with_log_original(module);
        }
        if let Some(line) = meta.line() {
            message = message.with_log_line(line);
        }

        match self.sender.try_send(message) {
            Ok(()) => {
                self.enqueued_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.dropped_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("log channel full or closed, dropping log message");
            }
        }
    }
}

/// Collects the `message` field as text and every other field as a label.
pub struct FieldVisitor<'a> {
    pub labels: &'a mut BTreeMap<String, String>,
    pub message: &'a mut String,
}

impl FieldVisitor<'_> {
    fn put(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            *self.message = value;
        } else {
            self.labels.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }
}
