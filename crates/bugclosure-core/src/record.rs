//! Log levels, records and line rendering.

use std::fmt::{self, Write as FmtWrite};
use std::panic::Location;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_TIMESTAMP_FORMAT;

/// Severity of a log call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    Verbose,
    Info,
    Warn,
    Error,
}

impl Level {
    /// Label written between brackets in persisted lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Verbose => "VERBOSE",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single log call, alive only until it is rendered.
#[derive(Debug, Clone)]
pub struct LogRecord<'a> {
    pub timestamp: String,
    pub level: Level,
    pub message: &'a str,
}

impl<'a> LogRecord<'a> {
    /// Stamp a record with the current local time.
    ///
    /// An unusable `timestamp_format` falls back to the default pattern
    /// instead of failing.
    pub fn now(timestamp_format: &str, level: Level, message: &'a str) -> Self {
        Self {
            timestamp: format_now(timestamp_format),
            level,
            message,
        }
    }

    /// `"<timestamp> [<LEVEL>] <message>"`
    pub fn render(&self) -> String {
        let mut line =
            String::with_capacity(self.timestamp.len() + self.message.len() + 12);
        line.push_str(&self.timestamp);
        line.push_str(" [");
        line.push_str(self.level.as_str());
        line.push_str("] ");
        line.push_str(self.message);
        line
    }
}

fn format_now(pattern: &str) -> String {
    let now = chrono::Local::now();
    let mut out = String::new();
    // chrono reports bad specifiers as fmt::Error instead of panicking here
    if write!(out, "{}", now.format(pattern)).is_ok() {
        return out;
    }
    now.format(DEFAULT_TIMESTAMP_FORMAT).to_string()
}

/// Prefix `message` with `[<file stem>:<line>]` of the call site.
///
/// Returns the message unchanged when no file stem can be derived.
pub fn with_caller_location(location: &Location<'_>, message: &str) -> String {
    match Path::new(location.file())
        .file_stem()
        .and_then(|stem| stem.to_str())
    {
        Some(stem) if !stem.is_empty() => {
            format!("[{}:{}] {}", stem, location.line(), message)
        }
        _ => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_layout() {
        let record = LogRecord {
            timestamp: "2026-10-14 09:30:00.123".into(),
            level: Level::Warn,
            message: "disk almost full",
        };
        assert_eq!(
            record.render(),
            "2026-10-14 09:30:00.123 [WARN] disk almost full"
        );
    }

    #[test]
    fn test_render_empty_message() {
        let record = LogRecord {
            timestamp: "t".into(),
            level: Level::Verbose,
            message: "",
        };
        assert_eq!(record.render(), "t [VERBOSE] ");
    }

    #[test]
    fn test_invalid_pattern_falls_back() {
        let record = LogRecord::now("%Q invalid", Level::Info, "x");
        // Default pattern: "YYYY-MM-DD HH:MM:SS.mmm"
        assert_eq!(record.timestamp.len(), 23);
        assert_eq!(&record.timestamp[4..5], "-");
    }

    #[test]
    fn test_custom_pattern() {
        let record = LogRecord::now("%Y", Level::Info, "x");
        assert_eq!(record.timestamp.len(), 4);
    }

    #[test]
    fn test_caller_location_prefix() {
        let here = Location::caller();
        let decorated = with_caller_location(here, "hello");
        assert!(decorated.starts_with("[record:"));
        assert!(decorated.ends_with("] hello"));
    }

    #[test]
    fn test_level_labels_sorted_by_severity() {
        assert!(Level::Debug < Level::Verbose);
        assert!(Level::Warn < Level::Error);
        assert_eq!(Level::Verbose.to_string(), "VERBOSE");
    }
}
