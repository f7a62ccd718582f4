use crate::error::{DispatchError, LogError};
use crate::level::LogLevel;
use crate::logger::Logger;
use crate::message::LogMessage;
use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Anything that accepts a message for fan-out.
///
/// Application code should take `&dyn LogDispatch` (or a generic) so tests
/// can pass a [`MockDispatcher`](crate::mock::MockDispatcher) instead.
#[async_trait]
pub trait LogDispatch: Send + Sync {
    async fn dispatch(&self, message: &LogMessage) -> Result<(), DispatchError>;
}

/// Level-filtered fan-out over a registry of [`Logger`]s.
///
/// The threshold is evaluated once per `dispatch` call: either every
/// registered logger receives the message or none does.
pub struct Dispatcher {
    loggers: RwLock<Vec<Arc<dyn Logger>>>,
    level: LogLevel,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher {
            loggers: RwLock::new(Vec::new()),
            level: LogLevel::default(),
        }
    }

    /// Set the threshold; messages more verbose than `level` are dropped.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn set_log_level(&mut self, level: LogLevel) {
        self.level = level;
    }

    pub fn log_level(&self) -> LogLevel {
        self.level
    }

    /// Append loggers to the registry. Adding the same logger twice makes
    /// it receive every message twice.
    pub fn add<I>(&self, loggers: I)
    where
        I: IntoIterator<Item = Arc<dyn Logger>>,
    {
        // `extend` cannot leave the vec half-written, so a poisoned lock is safe to reuse.
        let mut guard = self.loggers.write().unwrap_or_else(PoisonError::into_inner);
        guard.extend(loggers);
    }

    pub fn add_logger(&self, logger: Arc<dyn Logger>) {
        self.add(std::iter::once(logger));
    }

    pub fn len(&self) -> usize {
        self.loggers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Vec<Arc<dyn Logger>> {
        self.loggers.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Deliver `message` to every registered logger, one after the other.
    ///
    /// **Returns**
    /// - `Ok(())` if the message was filtered out, there are no loggers, or
    ///   every logger succeeded.
    /// - `Err(DispatchError)` holding each individual failure otherwise.
    ///   Later loggers are still called after an earlier one fails.
    pub async fn dispatch(&self, message: &LogMessage) -> Result<(), DispatchError> {
        if !self.level.allows(message.level()) {
            return Ok(());
        }

        // Iterate a snapshot so no lock is held across an await.
        let loggers = self.snapshot();
        let mut failures: Vec<LogError> = Vec::new();
        for logger in &loggers {
            if let Err(e) = logger.log(message).await {
                debug!(error = %e, "logger rejected message");
                failures.push(e);
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError::new(failures))
        }
    }
}

#[async_trait]
impl LogDispatch for Dispatcher {
    async fn dispatch(&self, message: &LogMessage) -> Result<(), DispatchError> {
        Dispatcher::dispatch(self, message).await
    }
}

#[async_trait]
impl<D: LogDispatch + ?Sized> LogDispatch for Arc<D> {
    async fn dispatch(&self, message: &LogMessage) -> Result<(), DispatchError> {
        (**self).dispatch(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLogger;

    fn msg(level: LogLevel, text: &str) -> LogMessage {
        LogMessage::new().with_level(level).with_message(text)
    }

    #[tokio::test]
    async fn test_empty_dispatcher_never_fails() {
        let dispatcher = Dispatcher::new().with_log_level(LogLevel::Trace);
        for level in LogLevel::ALL {
            assert!(dispatcher.dispatch(&msg(level, "x")).await.is_ok());
        }
        assert!(dispatcher.is_empty());
    }

    #[tokio::test]
    async fn test_threshold_filters_uniformly() {
        for threshold in LogLevel::ALL {
            for level in LogLevel::ALL {
                let a = MockLogger::new();
                let b = MockLogger::new();
                let dispatcher = Dispatcher::new().with_log_level(threshold);
                dispatcher.add([
                    Arc::new(a.clone()) as Arc<dyn Logger>,
                    Arc::new(b.clone()) as Arc<dyn Logger>,
                ]);

                dispatcher.dispatch(&msg(level, "x")).await.unwrap();

                let expected = if level <= threshold { 1 } else { 0 };
                assert_eq!(a.calls(), expected, "threshold {threshold} level {level}");
                assert_eq!(b.calls(), expected, "threshold {threshold} level {level}");
            }
        }
    }

    struct Journal {
        name: &'static str,
        order: Arc<std::sync::Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Logger for Journal {
        async fn log(&self, _message: &LogMessage) -> Result<(), LogError> {
            self.order.lock().unwrap().push(self.name);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_delivery_follows_registration_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let first = Journal {
            name: "a",
            order: Arc::clone(&order),
        };
        let second = Journal {
            name: "b",
            order: Arc::clone(&order),
        };

        let dispatcher = Dispatcher::new();
        dispatcher.add_logger(Arc::new(first));
        dispatcher.add_logger(Arc::new(second));
        dispatcher.dispatch(&msg(LogLevel::Info, "one")).await.unwrap();
        dispatcher.dispatch(&msg(LogLevel::Error, "two")).await.unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["a", "b", "a", "b"]);
    }

    #[tokio::test]
    async fn test_failures_are_aggregated_and_all_loggers_run() {
        let failing = MockLogger::failing("sink offline");
        let healthy = MockLogger::new();
        let dispatcher = Dispatcher::new().with_log_level(LogLevel::Warning);
        dispatcher.add([
            Arc::new(failing.clone()) as Arc<dyn Logger>,
            Arc::new(healthy.clone()) as Arc<dyn Logger>,
        ]);

        let err = dispatcher
            .dispatch(&msg(LogLevel::Warning, "disk almost full"))
            .await
            .unwrap_err();

        assert_eq!(err.len(), 1);
        assert_eq!(err.failures[0].to_string(), "sink offline");
        assert_eq!(failing.calls(), 1);
        assert_eq!(healthy.messages()[0].message, "disk almost full");
    }

    #[tokio::test]
    async fn test_repeated_add_repeats_delivery() {
        let logger = Arc::new(MockLogger::new());
        let dispatcher = Dispatcher::new();
        dispatcher.add_logger(logger.clone());
        dispatcher.add_logger(logger.clone());
        assert_eq!(dispatcher.len(), 2);

        dispatcher.dispatch(&msg(LogLevel::Info, "twice")).await.unwrap();
        assert_eq!(logger.calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_add_and_dispatch() {
        let dispatcher = Arc::new(Dispatcher::new());
        let logger = MockLogger::new();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let d = Arc::clone(&dispatcher);
            let l = logger.clone();
            handles.push(tokio::spawn(async move {
                d.add_logger(Arc::new(l));
                d.dispatch(&msg(LogLevel::Error, "race")).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(dispatcher.len(), 8);
        // Each dispatch sees at least the logger its own task registered.
        assert!(logger.calls() >= 8);
    }

    #[tokio::test]
    async fn test_set_log_level() {
        let mut dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.log_level(), LogLevel::Info);
        dispatcher.set_log_level(LogLevel::Error);
        assert_eq!(dispatcher.log_level(), LogLevel::Error);

        let logger = MockLogger::new();
        dispatcher.add_logger(Arc::new(logger.clone()));
        dispatcher.dispatch(&msg(LogLevel::Warning, "dropped")).await.unwrap();
        assert_eq!(logger.calls(), 0);
    }
}
