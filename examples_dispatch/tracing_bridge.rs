use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

use ecs_log_dispatch::init::init_tracing;
use ecs_log_dispatch::{Agent, Dispatcher, LogLevel, StdoutLogger};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dispatcher = Dispatcher::new().with_log_level(LogLevel::Warning);
    dispatcher.add_logger(Arc::new(StdoutLogger::new()));

    let _handle = init_tracing(Arc::new(dispatcher), Agent::named("bridge-example"))?;

    info!("not forwarded: below threshold");
    warn!(user_id = 42, "login slow");
    error!(reason = "invalid password", "authentication failed");

    // Give the background task time to drain the queue.
    sleep(Duration::from_millis(200)).await;
    Ok(())
}
