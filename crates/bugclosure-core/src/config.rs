//! Logger configuration snapshots.
//!
//! The configuration is read on every log call and written rarely, so it
//! lives in an [`ArcSwap`]: readers load the current snapshot without
//! locking, setters install a whole new snapshot.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::error::{LogError, Result};

/// Console tag used when none is configured.
pub const DEFAULT_TAG: &str = "BugClosure";

/// chrono rendering of `yyyy-MM-dd HH:mm:ss.SSS`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Default size limit of a single log file (10 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * BYTES_PER_MB;

/// Directory log files go to when none is configured.
pub const DEFAULT_BASE_DIRECTORY: &str = "BugClosure";

/// File name prefix used when none is configured.
pub const DEFAULT_BASE_FILE_NAME: &str = "BugClosure";

pub(crate) const BYTES_PER_MB: u64 = 1024 * 1024;

/// Process-wide logger settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Tag attached to every console line
    pub tag: String,

    /// Echo log calls to the console sink
    pub console_enabled: bool,

    /// Persist log calls to rotating files
    pub file_enabled: bool,

    /// Log host lifecycle transitions at INFO
    pub lifecycle_logging_enabled: bool,

    /// Log touch events reported by the host
    pub touch_logging_enabled: bool,

    /// Logical directory handed to the storage provider
    pub base_directory: String,

    /// File name prefix; files are `<base>_<yyyyMMdd>[(N)].txt`
    pub base_file_name: String,

    /// Rotate once the active file grows beyond this many bytes
    pub max_file_bytes: u64,

    /// chrono strftime pattern for persisted timestamps
    pub timestamp_format: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            tag: DEFAULT_TAG.to_string(),
            console_enabled: true,
            file_enabled: false,
            lifecycle_logging_enabled: false,
            touch_logging_enabled: false,
            base_directory: DEFAULT_BASE_DIRECTORY.to_string(),
            base_file_name: DEFAULT_BASE_FILE_NAME.to_string(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl LoggerConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LoggerConfig = serde_json::from_str(json)?;
        validate_timestamp_format(&config.timestamp_format)?;
        Ok(config)
    }
}

/// Reject patterns chrono cannot render.
pub fn validate_timestamp_format(pattern: &str) -> Result<()> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(LogError::InvalidTimestampFormat(pattern.to_string()));
    }
    Ok(())
}

/// Shared, atomically swapped configuration.
#[derive(Clone)]
pub struct SharedConfig {
    inner: Arc<ArcSwap<LoggerConfig>>,
}

impl SharedConfig {
    pub fn new(config: LoggerConfig) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    /// Current snapshot.
    pub fn load(&self) -> Arc<LoggerConfig> {
        self.inner.load_full()
    }

    /// Install a new snapshot derived from the current one.
    ///
    /// Concurrent updates are retried, so no setter's change is lost.
    pub fn update(&self, f: impl Fn(&mut LoggerConfig)) -> Arc<LoggerConfig> {
        self.inner.rcu(|current| {
            let mut next = LoggerConfig::clone(current);
            f(&mut next);
            next
        });
        self.load()
    }

    /// Replace the whole configuration.
    pub fn replace(&self, config: LoggerConfig) {
        self.inner.store(Arc::new(config));
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self::new(LoggerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::default();
        assert!(config.console_enabled);
        assert!(!config.file_enabled);
        assert_eq!(config.max_file_bytes, 10 * 1024 * 1024);
        assert_eq!(config.timestamp_format, "%Y-%m-%d %H:%M:%S%.3f");
    }

    #[test]
    fn test_partial_json() {
        let config = LoggerConfig::from_json_str(
            r#"{ "file_enabled": true, "base_file_name": "app", "max_file_bytes": 4096 }"#,
        )
        .unwrap();
        assert!(config.file_enabled);
        assert_eq!(config.base_file_name, "app");
        assert_eq!(config.max_file_bytes, 4096);
        assert_eq!(config.tag, DEFAULT_TAG);
    }

    #[test]
    fn test_json_rejects_bad_timestamp() {
        let err = LoggerConfig::from_json_str(r#"{ "timestamp_format": "%Q" }"#).unwrap_err();
        assert!(matches!(err, LogError::InvalidTimestampFormat(_)));
    }

    #[test]
    fn test_json_syntax_error() {
        let err = LoggerConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, LogError::Config(_)));
    }

    #[test]
    fn test_update_installs_new_snapshot() {
        let shared = SharedConfig::default();
        let before = shared.load();

        shared.update(|c| c.file_enabled = true);

        let after = shared.load();
        assert!(!before.file_enabled, "old snapshot is never mutated");
        assert!(after.file_enabled);
    }

    #[test]
    fn test_concurrent_updates_not_lost() {
        let shared = SharedConfig::default();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        shared.update(|c| c.max_file_bytes += 1);
                    }
                    i
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(shared.load().max_file_bytes, DEFAULT_MAX_FILE_BYTES + 800);
    }
}
