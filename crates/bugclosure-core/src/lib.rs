//! BugClosure Core Library
//!
//! Tagged, buffered application logging with rotating-file persistence.
//!
//! ## Overview
//!
//! Log calls format a line, optionally echo it to a console sink, and hand
//! it to an unbounded queue. A single background worker drains the queue
//! into the active log file, rotating to a new file once the current one
//! grows past the configured size. Host lifecycle transitions request
//! flushes; [`Logger::close_logger`] drains, flushes and closes.
//!
//! ## Core Principles
//!
//! - **Never blocks the caller**: enqueue is a lock-free channel send
//! - **Never fails the caller**: pipeline errors go to the console sink
//! - **Durable at checkpoints**: every line is flushed as it is written
//!
//! ## Quick Start
//!
//! ```ignore
//! use bugclosure_core::{FsStorage, Logger};
//!
//! let logger = Logger::builder()
//!     .storage(FsStorage::new("/data/app"))
//!     .build();
//!
//! logger.set_file_persistence(true);
//! logger.set_file_info("logs", "app", 5);   // logs/app_20261014.txt, 5 MB each
//!
//! logger.info("started");
//! logger.close_logger();
//! ```

pub mod chunk;
pub mod config;
pub mod console;
pub mod error;
pub mod global;
pub mod json;
pub mod lifecycle;
pub mod logger;
pub mod namer;
pub mod queue;
pub mod record;
pub mod storage;

mod report;
mod worker;
mod writer;

// Re-exports
pub use chunk::{chunk_message, MAX_CHUNK_CHARS};
pub use config::LoggerConfig;
pub use console::{CapturingConsole, ConsoleLine, ConsoleSink, TracingConsole};
pub use error::{LogError, Result};
pub use lifecycle::{LifecycleEvent, LifecycleHub, LifecycleNotifier, LifecycleObserver};
pub use logger::{Logger, LoggerBuilder};
pub use record::{Level, LogRecord};
pub use storage::{FileId, FsStorage, MemoryStorage, StorageProvider};
