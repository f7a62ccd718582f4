//! ECS-shaped structured log messages, a level-filtered [`Dispatcher`]
//! fanning them out to [`Logger`]s, and the stdout and Elasticsearch sinks.
//!
//! ```no_run
//! use std::sync::Arc;
//! use ecs_log_dispatch::{Agent, Dispatcher, LogLevel, LogMessage, StdoutLogger};
//!
//! # async fn run() -> Result<(), ecs_log_dispatch::DispatchError> {
//! let dispatcher = Dispatcher::new().with_log_level(LogLevel::Warning);
//! dispatcher.add_logger(Arc::new(StdoutLogger::new()));
//!
//! let msg = LogMessage::new()
//!     .with_agent(Agent::named("billing"))
//!     .with_level(LogLevel::Error)
//!     .with_message("payment declined");
//! dispatcher.dispatch(&msg).await
//! # }
//! ```

pub mod backend;
pub mod dispatcher;
pub mod error;
pub mod level;
pub mod logger;
pub mod message;
pub mod mock;
pub mod stdout;

#[cfg(feature = "elastic")]
pub mod elastic;

pub mod env;
pub mod init;
pub mod layer;

pub use dispatcher::{Dispatcher, LogDispatch};
pub use error::{DispatchError, LogError};
pub use level::LogLevel;
pub use logger::Logger;
pub use message::{Agent, ErrorInfo, Http, HttpRequest, HttpResponse, LogMessage};
pub use stdout::StdoutLogger;

#[cfg(feature = "elastic")]
pub use elastic::ElasticLogger;
