//! Unbounded ingestion queue between log call sites and the writer.
//!
//! Producers never wait: [`LogQueue::put`] is a lock-free channel send.
//! There is deliberately no capacity limit, so a producer rate that
//! outruns file I/O grows memory without bound. [`LogQueue::pending`]
//! exposes the backlog.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Create a connected producer/consumer pair.
pub fn channel() -> (LogQueue, QueueConsumer) {
    let (tx, rx) = mpsc::unbounded_channel();
    let pending = Arc::new(AtomicUsize::new(0));
    (
        LogQueue {
            tx,
            pending: pending.clone(),
        },
        QueueConsumer { rx, pending },
    )
}

/// Producer side; clone freely across threads.
#[derive(Clone)]
pub struct LogQueue {
    tx: UnboundedSender<String>,
    pending: Arc<AtomicUsize>,
}

impl LogQueue {
    /// Enqueue a formatted line. Lines sent after the consumer is gone are
    /// dropped.
    pub fn put(&self, line: String) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(line).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Lines enqueued but not yet marked done by the consumer.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Whether the consumer has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side; exactly one exists per queue.
pub struct QueueConsumer {
    rx: UnboundedReceiver<String>,
    pending: Arc<AtomicUsize>,
}

impl QueueConsumer {
    /// Wait for the next line. `None` once every producer is dropped and
    /// the queue is empty.
    pub async fn take(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Next line if one is ready.
    pub fn try_take(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }

    /// Mark one taken line as fully handled.
    pub fn done(&self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
    }

    /// Stop accepting lines; already queued lines remain takeable.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

impl Drop for QueueConsumer {
    fn drop(&mut self) {
        // Lines still queued will never be handled
        self.rx.close();
        while self.rx.try_recv().is_ok() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(f)
    }

    #[test]
    fn test_fifo() {
        let (queue, mut consumer) = channel();
        queue.put("a".into());
        queue.put("b".into());
        queue.put("c".into());

        let taken = block_on(async {
            vec![
                consumer.take().await.unwrap(),
                consumer.take().await.unwrap(),
                consumer.take().await.unwrap(),
            ]
        });
        assert_eq!(taken, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_pending_counts_until_done() {
        let (queue, mut consumer) = channel();
        queue.put("a".into());
        queue.put("b".into());
        assert_eq!(queue.pending(), 2);

        consumer.try_take().unwrap();
        assert_eq!(queue.pending(), 2);
        consumer.done();
        assert_eq!(queue.pending(), 1);
    }

    #[test]
    fn test_put_after_consumer_dropped() {
        let (queue, consumer) = channel();
        queue.put("kept".into());
        drop(consumer);

        assert!(queue.is_closed());
        assert_eq!(queue.pending(), 0);
        queue.put("lost".into());
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_take_ends_when_producers_gone() {
        let (queue, mut consumer) = channel();
        queue.put("last".into());
        drop(queue);

        assert_eq!(block_on(consumer.take()), Some("last".to_string()));
        assert_eq!(block_on(consumer.take()), None);
    }

    #[test]
    fn test_concurrent_producers() {
        let (queue, mut consumer) = channel();
        let handles: Vec<_> = (0..4)
            .map(|p| {
                let queue = queue.clone();
                std::thread::spawn(move || {
                    for i in 0..250 {
                        queue.put(format!("{p}:{i}"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let mut seen = Vec::new();
        while let Some(line) = consumer.try_take() {
            seen.push(line);
        }
        assert_eq!(seen.len(), 1000);
    }
}
