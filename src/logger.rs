use crate::error::LogError;
use crate::message::LogMessage;
use async_trait::async_trait;
use std::sync::Arc;

/// A destination for [`LogMessage`]s (stdout, Elasticsearch, a test double).
///
/// The dispatcher calls `log` once per message, in registration order, and
/// never retries. A failing logger returns an error; it must not panic.
#[async_trait]
pub trait Logger: Send + Sync {
    /// Record a single message.
    ///
    /// **Returns**
    /// - `Ok(())` if the logger considers the message handled.
    /// - `Err(..)` if delivery failed. The dispatcher aggregates this with
    ///   the failures of other loggers and keeps going.
    async fn log(&self, message: &LogMessage) -> Result<(), LogError>;
}

#[async_trait]
impl<L: Logger + ?Sized> Logger for Arc<L> {
    async fn log(&self, message: &LogMessage) -> Result<(), LogError> {
        (**self).log(message).await
    }
}
