//! Console sinks.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::record::Level;

/// Synchronous "print a tagged line" capability.
///
/// Implementations must not call back into the logger.
pub trait ConsoleSink: Send + Sync + 'static {
    fn emit(&self, tag: &str, level: Level, line: &str);
}

/// Forwards console lines to the active `tracing` subscriber.
///
/// VERBOSE has no tracing counterpart and is emitted at TRACE.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingConsole;

impl ConsoleSink for TracingConsole {
    fn emit(&self, tag: &str, level: Level, line: &str) {
        match level {
            Level::Verbose => tracing::trace!(tag, "{}", line),
            Level::Debug => tracing::debug!(tag, "{}", line),
            Level::Info => tracing::info!(tag, "{}", line),
            Level::Warn => tracing::warn!(tag, "{}", line),
            Level::Error => tracing::error!(tag, "{}", line),
        }
    }
}

/// A line captured by [`CapturingConsole`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub tag: String,
    pub level: Level,
    pub line: String,
}

/// Records every emitted line; useful in tests and for embedding hosts
/// that render their own console.
#[derive(Debug, Clone, Default)]
pub struct CapturingConsole {
    lines: Arc<Mutex<Vec<ConsoleLine>>>,
}

impl CapturingConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn lines(&self) -> Vec<ConsoleLine> {
        self.lines.lock().clone()
    }

    /// Lines emitted at `level`.
    pub fn at_level(&self, level: Level) -> Vec<ConsoleLine> {
        self.lines
            .lock()
            .iter()
            .filter(|l| l.level == level)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl ConsoleSink for CapturingConsole {
    fn emit(&self, tag: &str, level: Level, line: &str) {
        self.lines.lock().push(ConsoleLine {
            tag: tag.to_string(),
            level,
            line: line.to_string(),
        });
    }
}
