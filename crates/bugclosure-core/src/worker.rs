//! Background consumer that drains the queue into the writer.
//!
//! The worker owns a dedicated OS thread running a current-thread tokio
//! runtime. Its loop waits on three things, in priority order: shutdown,
//! flush requests, the next queued line. A write in progress always
//! finishes before shutdown is observed.

use std::sync::Arc;
use std::thread::JoinHandle;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::error::{LogError, Result};
use crate::queue::QueueConsumer;
use crate::report::ErrorReporter;
use crate::writer::RotatingWriter;

const THREAD_NAME: &str = "bugclosure-writer";

pub(crate) struct Worker {
    shutdown: CancellationToken,
    flush: Arc<Notify>,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    pub(crate) fn spawn(
        consumer: QueueConsumer,
        writer: Arc<RotatingWriter>,
        reporter: ErrorReporter,
    ) -> Result<Self> {
        let shutdown = CancellationToken::new();
        let flush = Arc::new(Notify::new());

        let thread = {
            let shutdown = shutdown.clone();
            let flush = flush.clone();
            std::thread::Builder::new()
                .name(THREAD_NAME.into())
                .spawn(move || {
                    let runtime = match tokio::runtime::Builder::new_current_thread().build() {
                        Ok(runtime) => runtime,
                        Err(e) => {
                            reporter.report("start log worker", &LogError::Worker(e.to_string()));
                            return;
                        }
                    };
                    runtime.block_on(run(consumer, writer, shutdown, flush, reporter));
                })
                .map_err(|e| LogError::Worker(e.to_string()))?
        };

        tracing::debug!(thread = THREAD_NAME, "log worker started");

        Ok(Self {
            shutdown,
            flush,
            thread: Some(thread),
        })
    }

    /// Ask the worker to flush the active file. Returns immediately.
    pub(crate) fn request_flush(&self) {
        self.flush.notify_one();
    }

    /// Cancel the loop and wait for the thread to exit.
    pub(crate) fn shutdown(&mut self) -> Result<()> {
        self.shutdown.cancel();
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| LogError::Worker("log worker panicked".into()))?;
            tracing::debug!(thread = THREAD_NAME, "log worker stopped");
        }
        Ok(())
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

async fn run(
    mut consumer: QueueConsumer,
    writer: Arc<RotatingWriter>,
    shutdown: CancellationToken,
    flush: Arc<Notify>,
    reporter: ErrorReporter,
) {
    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => break,

            _ = flush.notified() => {
                if let Err(e) = writer.flush() {
                    reporter.report("flush log file", &e);
                }
            }

            line = consumer.take() => match line {
                Some(line) => persist(&consumer, &writer, &reporter, &line),
                None => break,
            },
        }
    }

    // Lines accepted before shutdown are still written
    consumer.close();
    while let Some(line) = consumer.try_take() {
        persist(&consumer, &writer, &reporter, &line);
    }
}

fn persist(consumer: &QueueConsumer, writer: &RotatingWriter, reporter: &ErrorReporter, line: &str) {
    if let Err(e) = writer.write(line) {
        reporter.report("write log line", &e);
    }
    consumer.done();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LoggerConfig, SharedConfig};
    use crate::console::CapturingConsole;
    use crate::queue;
    use crate::storage::{MemoryStorage, StorageProvider};

    fn setup() -> (MemoryStorage, Arc<RotatingWriter>, ErrorReporter) {
        let storage = MemoryStorage::new();
        let config = SharedConfig::new(LoggerConfig {
            base_directory: "w".into(),
            ..LoggerConfig::default()
        });
        let reporter = ErrorReporter::new(Arc::new(CapturingConsole::new()), config.clone());
        let writer = Arc::new(RotatingWriter::new(
            Arc::new(storage.clone()),
            config,
            reporter.clone(),
        ));
        (storage, writer, reporter)
    }

    #[test]
    fn test_shutdown_drains_queued_lines() {
        let (storage, writer, reporter) = setup();
        let (queue, consumer) = queue::channel();
        for i in 0..100 {
            queue.put(format!("line {i}"));
        }

        let mut worker = Worker::spawn(consumer, writer.clone(), reporter).unwrap();
        worker.shutdown().unwrap();

        assert_eq!(queue.pending(), 0);
        let id = writer.active_file().unwrap();
        let content = storage.read_to_string(&id).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 100);
        assert_eq!(lines[0], "line 0");
        assert_eq!(lines[99], "line 99");
    }

    #[test]
    fn test_shutdown_twice() {
        let (_storage, writer, reporter) = setup();
        let (_queue, consumer) = queue::channel();
        let mut worker = Worker::spawn(consumer, writer, reporter).unwrap();
        worker.shutdown().unwrap();
        worker.shutdown().unwrap();
    }

    #[test]
    fn test_lines_after_shutdown_are_dropped() {
        let (storage, writer, reporter) = setup();
        let (queue, consumer) = queue::channel();
        let mut worker = Worker::spawn(consumer, writer, reporter).unwrap();
        worker.shutdown().unwrap();

        queue.put("too late".into());
        assert!(queue.is_closed());
        assert!(storage.list_names("w").unwrap().is_empty());
    }
}
