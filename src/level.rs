use std::fmt;
use std::str::FromStr;

/// Severity of a [`LogMessage`](crate::message::LogMessage).
///
/// Ordinals grow with verbosity: `Error` (1) is the most severe and `Trace`
/// (5) the least. A dispatcher with threshold `T` delivers a message at
/// level `L` when `T >= L`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    Error = 1,
    Warning = 2,
    #[default]
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Warning,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            1 => Some(LogLevel::Error),
            2 => Some(LogLevel::Warning),
            3 => Some(LogLevel::Info),
            4 => Some(LogLevel::Debug),
            5 => Some(LogLevel::Trace),
            _ => None,
        }
    }

    /// Name written into the `log.level` field.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    /// Whether a threshold of `self` lets a message at `level` through.
    pub fn allows(self, level: LogLevel) -> bool {
        self >= level
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level: {0:?}")]
pub struct ParseLevelError(pub String);

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(ordinal) = trimmed.parse::<u8>() {
            return LogLevel::from_ordinal(ordinal).ok_or_else(|| ParseLevelError(s.to_string()));
        }
        match trimmed.to_ascii_uppercase().as_str() {
            "ERROR" => Ok(LogLevel::Error),
            "WARN" | "WARNING" => Ok(LogLevel::Warning),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            "TRACE" => Ok(LogLevel::Trace),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => LogLevel::Error,
            tracing::Level::WARN => LogLevel::Warning,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::TRACE => LogLevel::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names() {
        let names: Vec<&str> = LogLevel::ALL.iter().map(|l| l.as_str()).collect();
        assert_eq!(names, ["ERROR", "WARN", "INFO", "DEBUG", "TRACE"]);
    }

    #[test]
    fn test_ordinals_follow_verbosity() {
        for (i, level) in LogLevel::ALL.iter().enumerate() {
            assert_eq!(level.ordinal() as usize, i + 1);
            assert_eq!(LogLevel::from_ordinal(level.ordinal()), Some(*level));
        }
        assert_eq!(LogLevel::from_ordinal(0), None);
        assert_eq!(LogLevel::from_ordinal(6), None);
        assert!(LogLevel::Error < LogLevel::Trace);
    }

    #[test]
    fn test_threshold_allows() {
        assert!(LogLevel::Warning.allows(LogLevel::Error));
        assert!(LogLevel::Warning.allows(LogLevel::Warning));
        assert!(!LogLevel::Warning.allows(LogLevel::Info));
        assert!(LogLevel::Trace.allows(LogLevel::Trace));
    }

    #[test]
    fn test_parse() {
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!(" debug ".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("5".parse::<LogLevel>(), Ok(LogLevel::Trace));
        assert!("9".parse::<LogLevel>().is_err());
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_from_tracing_level() {
        assert_eq!(LogLevel::from(tracing::Level::WARN), LogLevel::Warning);
        assert_eq!(LogLevel::from(tracing::Level::TRACE), LogLevel::Trace);
    }
}
