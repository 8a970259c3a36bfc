//! Error types for BugClosure

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, LogError>;

/// Errors raised inside the log pipeline.
///
/// None of these ever reach a log call site; they are reported to the
/// console sink and counted.
#[derive(Error, Debug)]
pub enum LogError {
    /// General I/O error from the storage provider
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage provider refused an operation
    #[error("Storage error: {0}")]
    Storage(String),

    /// A new log file could not be created or opened for writing
    #[error("Failed to open log file {name}: {reason}")]
    OpenFile {
        /// File name handed to the provider
        name: String,
        /// Provider's description of the failure
        reason: String,
    },

    /// Size probe of the active file failed
    #[error("Failed to probe size of {file}: {reason}")]
    SizeProbe {
        /// Identifier of the active file
        file: String,
        /// Provider's description of the failure
        reason: String,
    },

    /// Timestamp pattern contains an invalid chrono specifier
    #[error("Invalid timestamp format: {0}")]
    InvalidTimestampFormat(String),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Background worker could not be started or stopped cleanly
    #[error("Worker error: {0}")]
    Worker(String),

    /// A default logger has already been installed
    #[error("Default logger already installed")]
    AlreadyInstalled,
}

impl From<serde_json::Error> for LogError {
    fn from(e: serde_json::Error) -> Self {
        LogError::Config(e.to_string())
    }
}
