use crate::error::LogError;
use crate::logger::Logger;
use crate::message::LogMessage;
use async_trait::async_trait;
use chrono::SecondsFormat;
use crossterm::style::{Color, ResetColor, SetForegroundColor};
use crossterm::Command;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// Human-readable logger writing one colorized line per message:
///
/// ```text
/// [2024-03-01T12:30:00.000Z] [billing:WARN] disk almost full
/// ```
///
/// Writes go to standard output unless another writer is supplied. Write
/// failures are dropped and `log` always returns `Ok(())`.
pub struct StdoutLogger {
    writer: Mutex<Box<dyn Write + Send>>,
    color: bool,
}

impl Default for StdoutLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl StdoutLogger {
    pub fn new() -> Self {
        StdoutLogger {
            writer: Mutex::new(Box::new(io::stdout())),
            color: true,
        }
    }

    /// Send lines to `writer` instead of standard output.
    pub fn with_writer<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.writer = Mutex::new(Box::new(writer));
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn format_line(&self, message: &LogMessage) -> String {
        let level = message.log().level_str();
        let line = format!(
            "[{}] [{}:{}] {}\n",
            message.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            message.agent.name,
            level,
            message.message
        );
        if !self.color {
            return line;
        }

        let mut out = String::with_capacity(line.len() + 16);
        // Writing into a String cannot fail.
        let _ = SetForegroundColor(level_color(level)).write_ansi(&mut out);
        out.push_str(&line);
        let _ = ResetColor.write_ansi(&mut out);
        out
    }
}

/// Foreground color for a serialized level name.
fn level_color(level: &str) -> Color {
    match level {
        "ERROR" => Color::Red,
        "WARN" => Color::Yellow,
        _ => Color::White,
    }
}

#[async_trait]
impl Logger for StdoutLogger {
    async fn log(&self, message: &LogMessage) -> Result<(), LogError> {
        let line = self.format_line(message);
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LogLevel;
    use crate::message::Agent;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    fn sample(level: LogLevel) -> LogMessage {
        LogMessage::new()
            .with_timestamp(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap())
            .with_agent(Agent::named("billing"))
            .with_level(level)
            .with_message("disk almost full")
    }

    fn ansi(command: impl Command) -> String {
        let mut s = String::new();
        command.write_ansi(&mut s).unwrap();
        s
    }

    #[tokio::test]
    async fn test_plain_line_format() {
        let buf = SharedBuf::default();
        let logger = StdoutLogger::new().with_writer(buf.clone()).with_color(false);

        logger.log(&sample(LogLevel::Warning)).await.unwrap();

        assert_eq!(
            buf.contents(),
            "[2024-03-01T12:30:00.000Z] [billing:WARN] disk almost full\n"
        );
    }

    #[tokio::test]
    async fn test_color_wraps_line() {
        let buf = SharedBuf::default();
        let logger = StdoutLogger::new().with_writer(buf.clone());

        logger.log(&sample(LogLevel::Error)).await.unwrap();

        let out = buf.contents();
        assert!(out.starts_with(&ansi(SetForegroundColor(Color::Red))));
        assert!(out.ends_with(&ansi(ResetColor)));
        assert!(out.contains("[billing:ERROR] disk almost full\n"));
    }

    #[test]
    fn test_level_colors() {
        assert_eq!(level_color("ERROR"), Color::Red);
        assert_eq!(level_color("WARN"), Color::Yellow);
        assert_eq!(level_color("INFO"), Color::White);
        assert_eq!(level_color("DEBUG"), Color::White);
        assert_eq!(level_color("TRACE"), Color::White);
        assert_eq!(level_color("CRITICAL"), Color::White);
    }

    #[tokio::test]
    async fn test_write_failure_is_not_reported() {
        let logger = StdoutLogger::new().with_writer(BrokenPipe);
        assert!(logger.log(&sample(LogLevel::Info)).await.is_ok());
    }
}
