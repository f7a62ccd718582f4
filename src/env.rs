//! Environment variable names used by this crate for convenient
//! configuration from services.
//!
//! These are purely helpers; the logger types remain decoupled from
//! environment access.

use crate::backend::ElasticConfig;
use crate::level::{LogLevel, ParseLevelError};
use crate::message::Agent;

/// Dispatcher threshold, e.g. `WARN` or `4`.
pub const ECS_LOG_LEVEL_ENV: &str = "ECS_LOG_LEVEL";

/// Name written into `agent.name`.
pub const ECS_LOG_AGENT_NAME_ENV: &str = "ECS_LOG_AGENT_NAME";

/// Elasticsearch base URL, e.g. `http://127.0.0.1:9200`.
pub const ECS_LOG_ELASTIC_HOST_ENV: &str = "ECS_LOG_ELASTIC_HOST";

pub const ECS_LOG_ELASTIC_USERNAME_ENV: &str = "ECS_LOG_ELASTIC_USERNAME";

pub const ECS_LOG_ELASTIC_PASSWORD_ENV: &str = "ECS_LOG_ELASTIC_PASSWORD";

/// `true`/`1` makes the Elasticsearch logger return an error on non-201.
pub const ECS_LOG_ELASTIC_STRICT_ENV: &str = "ECS_LOG_ELASTIC_STRICT";

/// Single DSN selecting the sink, see [`crate::backend::parse_dsn`].
pub const ECS_LOG_DSN_ENV: &str = "ECS_LOG_DSN";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {key} has invalid value {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error(transparent)]
    Level(#[from] ParseLevelError),
}

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Threshold from [`ECS_LOG_LEVEL_ENV`]; `INFO` when unset.
pub fn level_from_env() -> Result<LogLevel, ConfigError> {
    match std::env::var(ECS_LOG_LEVEL_ENV) {
        Ok(value) => Ok(value.parse()?),
        Err(_) => Ok(LogLevel::default()),
    }
}

/// Agent named from [`ECS_LOG_AGENT_NAME_ENV`], or `default_name` when unset.
pub fn agent_from_env(default_name: &str) -> Agent {
    Agent::named(env_or(ECS_LOG_AGENT_NAME_ENV, default_name))
}

/// Sink DSN from [`ECS_LOG_DSN_ENV`], `stdout://` when unset.
pub fn dsn_from_env() -> String {
    env_or(ECS_LOG_DSN_ENV, "stdout://")
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}

impl ElasticConfig {
    /// Build the Elasticsearch settings from the `ECS_LOG_ELASTIC_*`
    /// variables. Only the host is required.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var(ECS_LOG_ELASTIC_HOST_ENV)
            .map_err(|_| ConfigError::Missing(ECS_LOG_ELASTIC_HOST_ENV))?;
        let strict = parse_flag(
            ECS_LOG_ELASTIC_STRICT_ENV,
            &env_or(ECS_LOG_ELASTIC_STRICT_ENV, "false"),
        )?;

        Ok(ElasticConfig::new(
            host,
            env_or(ECS_LOG_ELASTIC_USERNAME_ENV, ""),
            env_or(ECS_LOG_ELASTIC_PASSWORD_ENV, ""),
        )
        .with_strict_status(strict))
    }
}
