use std::sync::Arc;

use ecs_log_dispatch::mock::MockLogger;
use ecs_log_dispatch::{Agent, Dispatcher, ErrorInfo, LogLevel, LogMessage, Logger, StdoutLogger};

#[tokio::main]
async fn main() {
    let agent = Agent::named("billing");
    let audit = MockLogger::failing("audit store unavailable");

    let dispatcher = Dispatcher::new().with_log_level(LogLevel::Warning);
    dispatcher.add([
        Arc::new(StdoutLogger::new()) as Arc<dyn Logger>,
        Arc::new(audit.clone()) as Arc<dyn Logger>,
    ]);

    // Filtered out: INFO is more verbose than the WARN threshold.
    let info = LogMessage::new()
        .with_agent(agent.clone())
        .with_message("starting service");
    dispatcher.dispatch(&info).await.ok();

    let error = LogMessage::new()
        .with_agent(agent)
        .with_level(LogLevel::Error)
        .with_message("payment declined")
        .with_error(ErrorInfo {
            message: "card expired".to_string(),
            code: "E042".to_string(),
            ..Default::default()
        });

    if let Err(e) = dispatcher.dispatch(&error).await {
        println!("dispatch reported: {}", e);
    }
    println!("audit logger saw {} message(s)", audit.calls());
}
