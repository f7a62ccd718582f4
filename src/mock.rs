use crate::dispatcher::LogDispatch;
use crate::error::{DispatchError, LogError};
use crate::logger::Logger;
use crate::message::LogMessage;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

/// A logger that drops every message.
///
/// Useful for measuring dispatch overhead without any I/O.
#[derive(Clone, Debug, Default)]
pub struct NoopLogger;

#[async_trait]
impl Logger for NoopLogger {
    async fn log(&self, _message: &LogMessage) -> Result<(), LogError> {
        Ok(())
    }
}

/// Test double that records every message it receives.
///
/// Clones share the same record, so a test can keep one handle and give
/// another to the dispatcher.
#[derive(Clone, Debug, Default)]
pub struct MockLogger {
    received: Arc<Mutex<Vec<LogMessage>>>,
    failure: Option<String>,
}

impl MockLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A logger that records the message and then fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        MockLogger {
            received: Arc::default(),
            failure: Some(reason.into()),
        }
    }

    pub fn messages(&self) -> Vec<LogMessage> {
        self.received.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn calls(&self) -> usize {
        self.received.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl Logger for MockLogger {
    async fn log(&self, message: &LogMessage) -> Result<(), LogError> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.clone());
        match &self.failure {
            Some(reason) => Err(LogError::sink(reason.clone())),
            None => Ok(()),
        }
    }
}

/// Stand-in for a [`Dispatcher`](crate::dispatcher::Dispatcher) that keeps
/// every dispatched message and applies no level filtering.
#[derive(Clone, Debug, Default)]
pub struct MockDispatcher {
    dispatched: Arc<Mutex<Vec<LogMessage>>>,
    failure: Option<String>,
}

impl MockDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        MockDispatcher {
            dispatched: Arc::default(),
            failure: Some(reason.into()),
        }
    }

    pub fn messages(&self) -> Vec<LogMessage> {
        self.dispatched.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl LogDispatch for MockDispatcher {
    async fn dispatch(&self, message: &LogMessage) -> Result<(), DispatchError> {
        self.dispatched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.clone());
        match &self.failure {
            Some(reason) => Err(DispatchError::new(vec![LogError::sink(reason.clone())])),
            None => Ok(()),
        }
    }
}
