use std::fmt;

/// Failure of a single [`Logger`](crate::logger::Logger) delivery.
#[derive(thiserror::Error, Debug)]
pub enum LogError {
    #[error("failed to serialize log message: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Connection, DNS or timeout failure talking to a remote sink.
    #[error("log transport error: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    /// Only produced by an `ElasticLogger` running in strict mode.
    #[error("log endpoint {host} answered with status {status}: {body}")]
    UnexpectedStatus {
        host: String,
        status: u16,
        body: String,
    },

    /// Free-form failure, used by custom and mock loggers.
    #[error("{0}")]
    Sink(String),
}

impl LogError {
    pub fn sink(msg: impl Into<String>) -> Self {
        LogError::Sink(msg.into())
    }
}

#[cfg(feature = "elastic")]
impl From<reqwest::Error> for LogError {
    fn from(e: reqwest::Error) -> Self {
        LogError::Transport(Box::new(e))
    }
}

/// Aggregate of every delivery failure seen during one dispatch.
///
/// Individual failures are kept in registration order of the loggers that
/// produced them.
#[derive(Debug)]
pub struct DispatchError {
    pub failures: Vec<LogError>,
}

impl DispatchError {
    pub fn new(failures: Vec<LogError>) -> Self {
        DispatchError { failures }
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} logger(s) failed", self.failures.len())?;
        for (i, e) in self.failures.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}", sep, e)?;
        }
        Ok(())
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failures.first().map(|e| e as &(dyn std::error::Error + 'static))
    }
}
