//! Optional process-wide default logger.
//!
//! Code that prefers free functions over passing a [`Logger`] around can
//! install one instance at startup:
//!
//! ```ignore
//! use bugclosure_core::{global, Logger, FsStorage};
//!
//! global::install(Logger::builder().storage(FsStorage::new("/var/log/app")).build())?;
//! global::info("service started");
//! ```
//!
//! Calls made before [`install`] are dropped.

use std::sync::OnceLock;

use crate::error::{LogError, Result};
use crate::logger::Logger;

static DEFAULT: OnceLock<Logger> = OnceLock::new();

/// Install the default logger. Fails if one is already installed.
pub fn install(logger: Logger) -> Result<()> {
    DEFAULT.set(logger).map_err(|_| LogError::AlreadyInstalled)
}

/// The installed default logger, if any.
pub fn get() -> Option<&'static Logger> {
    DEFAULT.get()
}

#[track_caller]
pub fn debug(message: impl AsRef<str>) {
    if let Some(logger) = DEFAULT.get() {
        logger.debug(message);
    }
}

#[track_caller]
pub fn verbose(message: impl AsRef<str>) {
    if let Some(logger) = DEFAULT.get() {
        logger.verbose(message);
    }
}

#[track_caller]
pub fn info(message: impl AsRef<str>) {
    if let Some(logger) = DEFAULT.get() {
        logger.info(message);
    }
}

#[track_caller]
pub fn warn(message: impl AsRef<str>) {
    if let Some(logger) = DEFAULT.get() {
        logger.warn(message);
    }
}

#[track_caller]
pub fn error(message: impl AsRef<str>) {
    if let Some(logger) = DEFAULT.get() {
        logger.error(message);
    }
}

/// Shut down the default logger's pipeline.
pub fn close_logger() {
    if let Some(logger) = DEFAULT.get() {
        logger.close_logger();
    }
}
