use crate::backend::ElasticConfig;
use crate::error::LogError;
use crate::level::LogLevel;
use crate::logger::Logger;
use crate::message::{Http, HttpResponse, LogMessage};
use crate::stdout::StdoutLogger;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use tracing::debug;

/// Tag carried by the diagnostic emitted when the endpoint rejects a document.
pub const DELIVERY_FAILURE_TAG: &str = "log-delivery-failure";

/// Logger that indexes each message as a JSON document via
/// `POST {host}/logs/_doc` on an Elasticsearch-compatible service.
///
/// Failures come back two different ways:
/// - serialization and transport errors (DNS, connect, timeout) are
///   returned from `log`;
/// - any status other than `201 Created` is reported as an `ERROR` message
///   on the fallback logger (stdout by default) and `log` still returns
///   `Ok(())`, unless [`ElasticConfig::strict_status`] is set.
///
/// An `Ok(())` therefore does not prove the document was indexed.
#[derive(Clone)]
pub struct ElasticLogger {
    client: Client,
    config: ElasticConfig,
    fallback: Arc<dyn Logger>,
}

impl ElasticLogger {
    pub fn new(config: ElasticConfig) -> Self {
        ElasticLogger {
            client: Client::new(),
            config,
            fallback: Arc::new(StdoutLogger::new()),
        }
    }

    /// Replace the logger that receives delivery-failure diagnostics.
    pub fn with_fallback(mut self, fallback: Arc<dyn Logger>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Use a preconfigured client, e.g. one with a request timeout.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn config(&self) -> &ElasticConfig {
        &self.config
    }

    pub fn endpoint(&self) -> String {
        format!("{}/logs/_doc", self.config.host.trim_end_matches('/'))
    }

    fn delivery_failure(&self, original: &LogMessage, status: u16, body: &str) -> LogMessage {
        LogMessage::new()
            .with_level(LogLevel::Error)
            .with_agent(original.agent.clone())
            .with_tag(DELIVERY_FAILURE_TAG)
            .with_http(Http {
                response: HttpResponse {
                    body: body.to_string(),
                    status_code: Some(status),
                },
                ..Default::default()
            })
            .with_message(format!(
                "failed to ship log to {}: status {}, body: {}",
                self.config.host, status, body
            ))
    }
}

#[async_trait]
impl Logger for ElasticLogger {
    async fn log(&self, message: &LogMessage) -> Result<(), LogError> {
        let body = message.marshal()?;

        let mut request = self
            .client
            .post(self.endpoint())
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if !self.config.username.is_empty() {
            request = request.basic_auth(&self.config.username, Some(&self.config.password));
        }
        let resp = request.send().await?;

        let status = resp.status();
        if status == StatusCode::CREATED {
            return Ok(());
        }

        let text = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
        debug!(host = %self.config.host, status = status.as_u16(), "log document rejected");

        // Best effort: a failing fallback has nowhere else to report to.
        let diagnostic = self.delivery_failure(message, status.as_u16(), &text);
        let _ = self.fallback.log(&diagnostic).await;

        if self.config.strict_status {
            Err(LogError::UnexpectedStatus {
                host: self.config.host.clone(),
                status: status.as_u16(),
                body: text,
            })
        } else {
            Ok(())
        }
    }
}
