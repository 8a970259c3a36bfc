//! Internal error channel.
//!
//! Pipeline failures are never returned to log call sites and never
//! written through the file pipeline. They are always counted, and go to
//! the console sink while console output is enabled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::SharedConfig;
use crate::console::ConsoleSink;
use crate::error::LogError;
use crate::record::Level;

#[derive(Clone)]
pub(crate) struct ErrorReporter {
    console: Arc<dyn ConsoleSink>,
    config: SharedConfig,
    count: Arc<AtomicU64>,
}

impl ErrorReporter {
    pub(crate) fn new(console: Arc<dyn ConsoleSink>, config: SharedConfig) -> Self {
        Self {
            console,
            config,
            count: Arc::new(AtomicU64::new(0)),
        }
    }

    pub(crate) fn report(&self, context: &str, err: &LogError) {
        self.count.fetch_add(1, Ordering::Relaxed);
        let config = self.config.load();
        if config.console_enabled {
            self.console
                .emit(&config.tag, Level::Error, &format!("{context}: {err}"));
        }
    }

    pub(crate) fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::CapturingConsole;

    #[test]
    fn test_report_reaches_console_and_counter() {
        let console = CapturingConsole::new();
        let reporter = ErrorReporter::new(Arc::new(console.clone()), SharedConfig::default());

        reporter.report("rotate", &LogError::Storage("disk gone".into()));

        assert_eq!(reporter.count(), 1);
        let lines = console.at_level(Level::Error);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].tag, "BugClosure");
        assert_eq!(lines[0].line, "rotate: Storage error: disk gone");
    }

    #[test]
    fn test_report_counts_silently_with_console_off() {
        let console = CapturingConsole::new();
        let config = SharedConfig::default();
        let reporter = ErrorReporter::new(Arc::new(console.clone()), config.clone());

        config.update(|c| c.console_enabled = false);
        reporter.report("probe", &LogError::Storage("gone".into()));

        assert_eq!(reporter.count(), 1);
        assert!(console.lines().is_empty());
    }
}
