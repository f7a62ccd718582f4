use crate::error::LogError;
use crate::level::LogLevel;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// ECS schema version stamped on every message.
pub const ECS_VERSION: &str = "1.6.0";

/// The process that emitted a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Agent {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ephemeral_id: String,
}

impl Agent {
    pub fn named(name: impl Into<String>) -> Self {
        Agent {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Error details, populated only for error events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HttpRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub method: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HttpResponse {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// HTTP context, populated only for events tied to a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Http {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    pub request: HttpRequest,
    pub response: HttpResponse,
}

/// The `log` sub-record.
///
/// `level` (serialized name) and `level_value` (used for filtering) are
/// private and only change together through [`LogMessage::with_level`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Log {
    level: String,
    #[serde(skip)]
    level_value: LogLevel,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub original: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl Log {
    fn at(level: LogLevel) -> Self {
        Log {
            level: level.as_str().to_string(),
            level_value: level,
            original: String::new(),
            line: None,
            offset: None,
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level_value
    }

    pub fn level_str(&self) -> &str {
        &self.level
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ecs {
    pub version: String,
}

/// One ECS-shaped log event.
///
/// Built once through the `with_*` chain and then handed by reference to a
/// dispatcher. Every sub-record is always present, so serialization never
/// has to deal with a missing object; empty leaves are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogMessage {
    #[serde(rename = "@timestamp")]
    pub timestamp: DateTime<Utc>,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    pub agent: Agent,
    pub error: ErrorInfo,
    pub http: Http,
    log: Log,
    ecs: Ecs,
}

impl Default for LogMessage {
    fn default() -> Self {
        Self::new()
    }
}

impl LogMessage {
    /// Empty message at `INFO`, stamped with the current time.
    pub fn new() -> Self {
        LogMessage {
            timestamp: Utc::now(),
            message: String::new(),
            tags: Vec::new(),
            labels: BTreeMap::new(),
            agent: Agent::default(),
            error: ErrorInfo::default(),
            http: Http::default(),
            log: Log::at(LogLevel::default()),
            ecs: Ecs {
                version: ECS_VERSION.to_string(),
            },
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Replace all tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Replace all labels.
    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_agent(mut self, agent: Agent) -> Self {
        self.agent = agent;
        self
    }

    pub fn with_error(mut self, error: ErrorInfo) -> Self {
        self.error = error;
        self
    }

    pub fn with_http(mut self, http: Http) -> Self {
        self.http = http;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.log.level = level.as_str().to_string();
        self.log.level_value = level;
        self
    }

    pub fn with_log_original(mut self, original: impl Into<String>) -> Self {
        self.log.original = original.into();
        self
    }

    pub fn with_log_line(mut self, line: u32) -> Self {
        self.log.line = Some(line);
        self
    }

    pub fn with_log_offset(mut self, offset: u64) -> Self {
        self.log.offset = Some(offset);
        self
    }

    pub fn level(&self) -> LogLevel {
        self.log.level_value
    }

    pub fn log(&self) -> &Log {
        &self.log
    }

    pub fn ecs(&self) -> &Ecs {
        &self.ecs
    }

    /// Serialize to the JSON document sent over the wire.
    pub fn marshal(&self) -> Result<Vec<u8>, LogError> {
        Ok(serde_json::to_vec(self)?)
    }
}
