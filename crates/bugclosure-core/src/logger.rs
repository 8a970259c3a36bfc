//! The `Logger` handle: public entry points of the pipeline.
//!
//! ```text
//! call site ──► Logger::info ──► console sink (sync)
//!                     │
//!                     └──► LogQueue ──► Worker thread ──► RotatingWriter ──► StorageProvider
//! ```
//!
//! Every log call returns immediately and never reports failure. Problems
//! inside the pipeline surface on the console sink and in
//! [`Logger::error_count`].

use std::panic::{self, AssertUnwindSafe, Location};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::chunk::{chunk_message, MAX_CHUNK_CHARS};
use crate::config::{self, LoggerConfig, SharedConfig, BYTES_PER_MB};
use crate::console::{ConsoleSink, TracingConsole};
use crate::error::Result;
use crate::json;
use crate::lifecycle::{LifecycleEvent, LifecycleNotifier, LifecycleObserver};
use crate::queue::{self, LogQueue, QueueConsumer};
use crate::record::{with_caller_location, Level, LogRecord};
use crate::report::ErrorReporter;
use crate::storage::{FileId, StorageProvider};
use crate::worker::Worker;
use crate::writer::RotatingWriter;

/// Builder for [`Logger`].
pub struct LoggerBuilder {
    config: LoggerConfig,
    console: Arc<dyn ConsoleSink>,
    storage: Option<Arc<dyn StorageProvider>>,
}

impl LoggerBuilder {
    fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            console: Arc::new(TracingConsole),
            storage: None,
        }
    }

    /// Start from `config` instead of the defaults.
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn console(mut self, console: impl ConsoleSink) -> Self {
        self.console = Arc::new(console);
        self
    }

    /// Storage the log files are written to. Without one, file persistence
    /// is unavailable and only the console is used.
    pub fn storage(mut self, storage: impl StorageProvider) -> Self {
        self.storage = Some(Arc::new(storage));
        self
    }

    pub fn storage_arc(mut self, storage: Arc<dyn StorageProvider>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn build(self) -> Logger {
        let config = SharedConfig::new(self.config);
        let reporter = ErrorReporter::new(self.console.clone(), config.clone());
        let writer = self
            .storage
            .map(|storage| Arc::new(RotatingWriter::new(storage, config.clone(), reporter.clone())));
        let (queue, consumer) = queue::channel();

        Logger {
            inner: Arc::new(Inner {
                config,
                console: self.console,
                reporter,
                writer,
                queue,
                consumer: Mutex::new(Some(consumer)),
                worker: Mutex::new(None),
                processing_started: AtomicBool::new(false),
                file_info_set: AtomicBool::new(false),
                subscribed: AtomicBool::new(false),
                closed: AtomicBool::new(false),
            }),
        }
    }
}

/// Cheaply clonable handle to one log pipeline.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

struct Inner {
    config: SharedConfig,
    console: Arc<dyn ConsoleSink>,
    reporter: ErrorReporter,
    writer: Option<Arc<RotatingWriter>>,
    queue: LogQueue,
    consumer: Mutex<Option<QueueConsumer>>,
    worker: Mutex<Option<Worker>>,
    processing_started: AtomicBool,
    file_info_set: AtomicBool,
    subscribed: AtomicBool,
    closed: AtomicBool,
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Subscribe to host lifecycle transitions. Only the first call
    /// subscribes; the subscription does not keep the logger alive.
    pub fn initialize(&self, notifier: &dyn LifecycleNotifier) {
        if self.inner.subscribed.swap(true, Ordering::SeqCst) {
            return;
        }
        notifier.subscribe(Arc::new(LifecycleBridge {
            inner: Arc::downgrade(&self.inner),
        }));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Configuration
    // ═══════════════════════════════════════════════════════════════════════

    /// Current configuration snapshot.
    pub fn config(&self) -> Arc<LoggerConfig> {
        self.inner.config.load()
    }

    pub fn set_console_output(&self, enabled: bool) {
        self.inner.config.update(|c| c.console_enabled = enabled);
    }

    /// Enable or disable file persistence. Enabling after
    /// [`set_file_info`](Self::set_file_info) starts processing.
    pub fn set_file_persistence(&self, enabled: bool) {
        self.inner.config.update(|c| c.file_enabled = enabled);
        if enabled && self.inner.file_info_set.load(Ordering::SeqCst) {
            self.inner.start_processing();
        }
    }

    pub fn set_lifecycle_logging(&self, enabled: bool) {
        self.inner.config.update(|c| c.lifecycle_logging_enabled = enabled);
    }

    pub fn set_touch_logging(&self, enabled: bool) {
        self.inner.config.update(|c| c.touch_logging_enabled = enabled);
    }

    /// Set where log files go and how large they may grow, then start
    /// processing if persistence is enabled.
    pub fn set_file_info(&self, directory: &str, base_name: &str, max_size_mb: u32) {
        let config = self.inner.config.update(|c| {
            c.base_directory = directory.to_string();
            c.base_file_name = base_name.to_string();
            c.max_file_bytes = u64::from(max_size_mb) * BYTES_PER_MB;
        });
        self.inner.file_info_set.store(true, Ordering::SeqCst);
        if config.file_enabled {
            self.inner.start_processing();
        }
    }

    /// Byte-precise rotation threshold.
    pub fn set_max_file_bytes(&self, max_file_bytes: u64) {
        self.inner.config.update(|c| c.max_file_bytes = max_file_bytes);
    }

    /// Set the chrono pattern for persisted timestamps. An invalid pattern
    /// is rejected and the previous one stays in effect.
    pub fn set_timestamp_format(&self, pattern: &str) -> Result<()> {
        config::validate_timestamp_format(pattern)?;
        self.inner
            .config
            .update(|c| c.timestamp_format = pattern.to_string());
        Ok(())
    }

    pub fn set_tag(&self, tag: &str) {
        self.inner.config.update(|c| c.tag = tag.to_string());
    }

    /// Start the background writer. Later calls are no-ops.
    ///
    /// Returns whether processing is running after the call.
    pub fn start_log_processing(&self) -> bool {
        self.inner.start_processing()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Logging
    // ═══════════════════════════════════════════════════════════════════════

    #[track_caller]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.inner.log(Level::Debug, message.as_ref(), Some(Location::caller()));
    }

    #[track_caller]
    pub fn verbose(&self, message: impl AsRef<str>) {
        self.inner.log(Level::Verbose, message.as_ref(), Some(Location::caller()));
    }

    #[track_caller]
    pub fn info(&self, message: impl AsRef<str>) {
        self.inner.log(Level::Info, message.as_ref(), Some(Location::caller()));
    }

    #[track_caller]
    pub fn warn(&self, message: impl AsRef<str>) {
        self.inner.log(Level::Warn, message.as_ref(), Some(Location::caller()));
    }

    #[track_caller]
    pub fn error(&self, message: impl AsRef<str>) {
        self.inner.log(Level::Error, message.as_ref(), Some(Location::caller()));
    }

    #[track_caller]
    pub fn log(&self, level: Level, message: impl AsRef<str>) {
        self.inner.log(level, message.as_ref(), Some(Location::caller()));
    }

    /// Indent a compact JSON string for reading. Logs an error and returns
    /// an empty string when there is nothing to format.
    #[track_caller]
    pub fn pretty_print_json(&self, json: Option<&str>) -> String {
        match json.and_then(json::pretty_print) {
            Some(pretty) => pretty,
            None => {
                self.inner
                    .log(Level::Error, "JSON string is empty", Some(Location::caller()));
                String::new()
            }
        }
    }

    /// Report a touch resolved by the host's hit-testing.
    #[track_caller]
    pub fn on_touch(&self, element_id: Option<&str>) {
        if !self.inner.config.load().touch_logging_enabled {
            return;
        }
        let message = format!(
            "TouchEvent == Touched View ID: {}",
            element_id.unwrap_or("Unknown ID")
        );
        self.inner.log(Level::Info, &message, Some(Location::caller()));
    }

    /// Deliver a lifecycle transition directly, without a notifier.
    #[track_caller]
    pub fn on_lifecycle(&self, screen: &str, event: LifecycleEvent) {
        self.inner
            .handle_transition(screen, event, Some(Location::caller()));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Durability
    // ═══════════════════════════════════════════════════════════════════════

    /// Ask the worker to flush; returns without waiting.
    pub fn request_flush(&self) {
        self.inner.request_flush();
    }

    /// Flush the active file now, on the calling thread.
    pub fn flush(&self) -> Result<()> {
        match &self.inner.writer {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }

    /// Stop the worker, write what is queued, flush and close the file.
    /// Safe to call more than once.
    pub fn close_logger(&self) {
        self.inner.close();
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Diagnostics
    // ═══════════════════════════════════════════════════════════════════════

    /// Lines accepted for persistence but not yet written.
    pub fn pending(&self) -> usize {
        self.inner.queue.pending()
    }

    /// Pipeline failures reported so far.
    pub fn error_count(&self) -> u64 {
        self.inner.reporter.count()
    }

    /// File currently being written to.
    pub fn active_file(&self) -> Option<FileId> {
        self.inner.writer.as_ref().and_then(|w| w.active_file())
    }

    pub fn is_processing(&self) -> bool {
        self.inner.worker.lock().is_some()
    }
}

/// Call site a console line is attributed to. `None` prints the bare line.
type CallSite = Option<&'static Location<'static>>;

impl Inner {
    fn log(&self, level: Level, message: &str, location: CallSite) {
        // A panicking collaborator must not unwind into the caller
        let _ = panic::catch_unwind(AssertUnwindSafe(|| {
            self.dispatch(level, message, location);
        }));
    }

    fn dispatch(&self, level: Level, message: &str, location: CallSite) {
        let config = self.config.load();
        let persist = config.file_enabled && self.writer.is_some();
        if !config.console_enabled && !persist {
            return;
        }

        for chunk in chunk_message(message, MAX_CHUNK_CHARS) {
            if config.console_enabled {
                let line = match location {
                    Some(location) => with_caller_location(location, chunk),
                    None => chunk.to_string(),
                };
                self.console.emit(&config.tag, level, &line);
            }
            if persist {
                let record = LogRecord::now(&config.timestamp_format, level, chunk);
                self.queue.put(record.render());
            }
        }
    }

    fn start_processing(&self) -> bool {
        let Some(writer) = self.writer.clone() else {
            return false;
        };
        // Held until the worker is installed: close() either sees it or
        // runs first and leaves `closed` set for the check below
        let mut slot = self.worker.lock();
        if self.closed.load(Ordering::SeqCst)
            || self.processing_started.swap(true, Ordering::SeqCst)
        {
            return slot.is_some();
        }
        let Some(consumer) = self.consumer.lock().take() else {
            return false;
        };

        match Worker::spawn(consumer, writer, self.reporter.clone()) {
            Ok(worker) => {
                *slot = Some(worker);
                true
            }
            Err(e) => {
                self.reporter.report("start log processing", &e);
                false
            }
        }
    }

    fn request_flush(&self) {
        if let Some(worker) = self.worker.lock().as_ref() {
            worker.request_flush();
        }
    }

    fn handle_transition(&self, screen: &str, event: LifecycleEvent, location: CallSite) {
        if self.config.load().lifecycle_logging_enabled {
            self.log(
                Level::Info,
                &format!("{screen} {}", event.callback_name()),
                location,
            );
        }
        if event.triggers_flush() {
            self.request_flush();
        }
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let worker = self.worker.lock().take();
        if let Some(mut worker) = worker {
            if let Err(e) = worker.shutdown() {
                self.reporter.report("stop log worker", &e);
            }
        }
        // Never started: nothing will consume the backlog
        self.consumer.lock().take();

        if let Some(writer) = &self.writer {
            if let Err(e) = writer.flush() {
                self.reporter.report("flush on close", &e);
            }
            if let Err(e) = writer.close() {
                self.reporter.report("close log file", &e);
            }
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.close();
    }
}

struct LifecycleBridge {
    inner: Weak<Inner>,
}

impl LifecycleObserver for LifecycleBridge {
    fn on_transition(&self, screen: &str, event: LifecycleEvent) {
        if let Some(inner) = self.inner.upgrade() {
            // Delivered by the notifier; no user call site to report
            inner.handle_transition(screen, event, None);
        }
    }
}
