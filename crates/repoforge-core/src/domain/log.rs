//! Console log entries shown to the user during an attempt.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Marker that flags a synthesized build line as an error.
pub const ERROR_MARKER: &str = "ERROR";

/// Severity tag of a console line.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    #[default]
    Info,
    Warning,
    Error,
    Success,
}

impl LogLevel {
    /// Severity for a synthesized build-tool line.
    pub fn classify(line: &str) -> Self {
        if line.contains(ERROR_MARKER) {
            LogLevel::Error
        } else {
            LogLevel::Info
        }
    }
}

/// A single appended console line. Never mutated after append.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildLog {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub level: LogLevel,
}

impl BuildLog {
    pub fn new(message: impl Into<String>, level: LogLevel) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
            level,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, LogLevel::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, LogLevel::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, LogLevel::Error)
    }

    /// Local wall-clock time as 24-hour `HH:MM:SS`.
    pub fn clock(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%H:%M:%S")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_error_marker() {
        assert_eq!(
            LogLevel::classify("e: ERROR in MainActivity.kt"),
            LogLevel::Error
        );
        assert_eq!(LogLevel::classify("> Task :app:preBuild"), LogLevel::Info);
        // marker is case-sensitive
        assert_eq!(LogLevel::classify("error: nothing"), LogLevel::Info);
    }

    #[test]
    fn test_clock_format() {
        let log = BuildLog::info("Connecting to GitHub...");
        let clock = log.clock();
        assert_eq!(clock.len(), 8);
        assert_eq!(clock.as_bytes()[2], b':');
        assert_eq!(clock.as_bytes()[5], b':');
    }

    #[test]
    fn test_constructors_tag_level() {
        assert_eq!(BuildLog::success("ok").level, LogLevel::Success);
        assert_eq!(BuildLog::error("boom").level, LogLevel::Error);
        assert_eq!(BuildLog::info("hi").level, LogLevel::Info);
    }
}
