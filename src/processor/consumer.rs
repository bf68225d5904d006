//! Consumer worker implementation

use crate::core::error::{ProcessorError, Result};
use crate::core::handler::Handler;
use crate::core::item::Item;
use crate::processor::panic_message;
use crate::queue::{Envelope, WorkQueue};
use log::{debug, error, warn};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Statistics for a consumer thread
#[derive(Debug, Default)]
pub struct ConsumerStats {
    /// Total number of items successfully consumed
    pub items_consumed: AtomicU64,
    /// Total number of consume calls that returned an error
    pub consume_failures: AtomicU64,
    /// Total number of consume calls that panicked
    pub consume_panics: AtomicU64,
}

impl ConsumerStats {
    /// Create new consumer statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment items consumed counter
    pub fn increment_consumed(&self) {
        self.items_consumed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment consume failures counter
    pub fn increment_failures(&self) {
        self.consume_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment consume panics counter
    pub fn increment_panics(&self) {
        self.consume_panics.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total items consumed
    pub fn get_items_consumed(&self) -> u64 {
        self.items_consumed.load(Ordering::Relaxed)
    }

    /// Get total consume failures
    pub fn get_consume_failures(&self) -> u64 {
        self.consume_failures.load(Ordering::Relaxed)
    }

    /// Get total consume panics
    pub fn get_consume_panics(&self) -> u64 {
        self.consume_panics.load(Ordering::Relaxed)
    }
}

/// A worker thread that drains items from the work queue
///
/// A consumer has no stop flag. It blocks on the queue for as long as it
/// must and exits only when it pops a shutdown sentinel, so it can never
/// abandon an item it has already pulled.
#[derive(Debug)]
pub struct ConsumerWorker {
    id: usize,
    throttle: Duration,
    thread: Option<thread::JoinHandle<()>>,
    stats: Arc<ConsumerStats>,
}

impl ConsumerWorker {
    /// Create an unstarted consumer record
    pub(crate) fn new(id: usize, throttle: Duration) -> Self {
        Self {
            id,
            throttle,
            thread: None,
            stats: Arc::new(ConsumerStats::new()),
        }
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get worker statistics
    pub fn stats(&self) -> Arc<ConsumerStats> {
        Arc::clone(&self.stats)
    }

    /// Get the configured throttle duration (reserved, unused by the loop)
    pub fn throttle(&self) -> Duration {
        self.throttle
    }

    /// Check if the worker thread is currently running
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().map_or(false, |t| !t.is_finished())
    }

    /// Spawn the consumer thread
    pub(crate) fn start<H: Handler>(
        &mut self,
        handler: Arc<H>,
        queue: Arc<WorkQueue>,
    ) -> Result<()> {
        let id = self.id;
        let stats = Arc::clone(&self.stats);

        let thread = thread::Builder::new()
            .name(format!("consumer-{}", id))
            .spawn(move || {
                Self::run(id, handler, queue, stats);
            })
            .map_err(|e| {
                ProcessorError::spawn_with_source("consumer", id, "Cannot create thread", e)
            })?;

        self.thread = Some(thread);
        Ok(())
    }

    /// Join the consumer thread
    ///
    /// Idempotent; joining a never-started or already-joined worker is a
    /// no-op. Blocks until the thread exits, which requires a shutdown
    /// sentinel to reach it.
    pub(crate) fn join(&mut self) -> Result<()> {
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|p| ProcessorError::join("consumer", self.id, panic_message(p)))?;
        }
        Ok(())
    }

    /// Main consumer loop
    ///
    /// Pops one envelope at a time. A shutdown sentinel exits the loop
    /// without touching the handler; everything else is handed to the
    /// handler with panic protection.
    fn run<H: Handler>(
        id: usize,
        handler: Arc<H>,
        queue: Arc<WorkQueue>,
        stats: Arc<ConsumerStats>,
    ) {
        debug!("consumer {}: started", id);

        loop {
            match queue.pop() {
                Ok(Envelope::Shutdown) => {
                    debug!("consumer {}: received shutdown sentinel, halting", id);
                    break;
                }
                Ok(Envelope::Work(item)) => {
                    Self::consume_item(id, &handler, item, &stats);
                }
                Err(_) => {
                    debug!("consumer {}: queue disconnected, halting", id);
                    break;
                }
            }
        }

        debug!(
            "consumer {}: exiting ({} items consumed)",
            id,
            stats.get_items_consumed()
        );
    }

    /// Consume a single item with panic protection
    fn consume_item<H: Handler>(id: usize, handler: &Arc<H>, item: Item, stats: &ConsumerStats) {
        match catch_unwind(AssertUnwindSafe(|| handler.consume(id, item))) {
            Ok(Ok(())) => {
                stats.increment_consumed();
            }
            Ok(Err(e)) => {
                warn!("consumer {}: consume failed: {}", id, e);
                stats.increment_failures();
            }
            Err(panic_info) => {
                error!(
                    "consumer {}: consume panicked: {}",
                    id,
                    panic_message(panic_info)
                );
                stats.increment_panics();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::handler::ClosureHandler;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    fn test_item(value: &str) -> Item {
        [("value", value)].into_iter().collect()
    }

    fn counting_handler(counter: Arc<AtomicUsize>) -> Arc<impl Handler> {
        Arc::new(ClosureHandler::new(
            |_id| Ok(Some(Vec::new())),
            move |_id, _item| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        ))
    }

    #[test]
    fn test_consumer_stats_counters() {
        let stats = ConsumerStats::new();
        assert_eq!(stats.get_items_consumed(), 0);

        stats.increment_consumed();
        stats.increment_consumed();
        stats.increment_failures();
        stats.increment_panics();

        assert_eq!(stats.get_items_consumed(), 2);
        assert_eq!(stats.get_consume_failures(), 1);
        assert_eq!(stats.get_consume_panics(), 1);
    }

    #[test]
    fn test_consumer_record_before_start() {
        let worker = ConsumerWorker::new(5, Duration::from_millis(30));
        assert_eq!(worker.id(), 5);
        assert_eq!(worker.throttle(), Duration::from_millis(30));
        assert!(!worker.is_running());
    }

    #[test]
    fn test_consumer_drains_work_then_exits_on_sentinel() {
        let consumed = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(Arc::clone(&consumed));

        let queue = Arc::new(WorkQueue::with_capacity(0));
        queue.push(Envelope::Work(test_item("a"))).unwrap();
        queue.push(Envelope::Work(test_item("b"))).unwrap();
        queue.push(Envelope::Shutdown).unwrap();

        let mut worker = ConsumerWorker::new(0, Duration::from_millis(5));
        worker
            .start(handler, Arc::clone(&queue))
            .expect("Failed to start consumer");
        worker.join().expect("Failed to join consumer");

        assert_eq!(consumed.load(Ordering::SeqCst), 2);
        assert_eq!(worker.stats().get_items_consumed(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_sentinel_does_not_reach_the_handler() {
        let consumed = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(Arc::clone(&consumed));

        let queue = Arc::new(WorkQueue::with_capacity(0));
        queue.push(Envelope::Shutdown).unwrap();

        let mut worker = ConsumerWorker::new(0, Duration::from_millis(5));
        worker
            .start(handler, Arc::clone(&queue))
            .expect("Failed to start consumer");
        worker.join().expect("Failed to join consumer");

        assert_eq!(consumed.load(Ordering::SeqCst), 0);
        assert_eq!(worker.stats().get_items_consumed(), 0);
    }

    #[test]
    fn test_consumer_blocks_until_sentinel_arrives() {
        let handler = Arc::new(ClosureHandler::new(
            |_id| Ok(Some(Vec::new())),
            |_id, _item| Ok(()),
        ));
        let queue = Arc::new(WorkQueue::with_capacity(0));

        let mut worker = ConsumerWorker::new(0, Duration::from_millis(5));
        worker
            .start(handler, Arc::clone(&queue))
            .expect("Failed to start consumer");

        // No sentinel yet, the consumer must still be parked on the queue
        thread::sleep(Duration::from_millis(50));
        assert!(worker.is_running());

        queue.push(Envelope::Shutdown).unwrap();
        worker.join().expect("Failed to join consumer");
        assert!(!worker.is_running());
    }

    #[test]
    fn test_consumer_survives_callback_error() {
        let handler = Arc::new(ClosureHandler::new(
            |_id| Ok(Some(Vec::new())),
            |_id, item: Item| {
                if item.contains_key("bad") {
                    Err(ProcessorError::other("rejected item"))
                } else {
                    Ok(())
                }
            },
        ));

        let queue = Arc::new(WorkQueue::with_capacity(0));
        queue.push(Envelope::Work(test_item("fine"))).unwrap();
        queue
            .push(Envelope::Work([("bad", true)].into_iter().collect()))
            .unwrap();
        queue.push(Envelope::Work(test_item("fine"))).unwrap();
        queue.push(Envelope::Shutdown).unwrap();

        let mut worker = ConsumerWorker::new(0, Duration::from_millis(5));
        worker
            .start(handler, Arc::clone(&queue))
            .expect("Failed to start consumer");
        worker.join().expect("Failed to join consumer");

        assert_eq!(worker.stats().get_items_consumed(), 2);
        assert_eq!(worker.stats().get_consume_failures(), 1);
        assert_eq!(worker.stats().get_consume_panics(), 0);
    }

    #[test]
    fn test_consumer_survives_callback_panic() {
        let handler = Arc::new(ClosureHandler::new(
            |_id| Ok(Some(Vec::new())),
            |_id, item: Item| {
                if item.contains_key("explode") {
                    panic!("Intentional panic for testing");
                }
                Ok(())
            },
        ));

        let queue = Arc::new(WorkQueue::with_capacity(0));
        queue
            .push(Envelope::Work([("explode", true)].into_iter().collect()))
            .unwrap();
        queue.push(Envelope::Work(test_item("after"))).unwrap();
        queue.push(Envelope::Shutdown).unwrap();

        let mut worker = ConsumerWorker::new(0, Duration::from_millis(5));
        worker
            .start(handler, Arc::clone(&queue))
            .expect("Failed to start consumer");
        worker.join().expect("Failed to join consumer");

        // The panic is counted and the item after it is still processed
        assert_eq!(worker.stats().get_consume_panics(), 1);
        assert_eq!(worker.stats().get_items_consumed(), 1);
    }

    #[test]
    fn test_consumer_preserves_item_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let handler = Arc::new(ClosureHandler::new(
            |_id| Ok(Some(Vec::new())),
            move |_id, item: Item| {
                let value = item
                    .get("value")
                    .and_then(|v| v.as_str())
                    .unwrap()
                    .to_string();
                seen_clone.lock().unwrap().push(value);
                Ok(())
            },
        ));

        let queue = Arc::new(WorkQueue::with_capacity(0));
        for value in ["first", "second", "third"] {
            queue.push(Envelope::Work(test_item(value))).unwrap();
        }
        queue.push(Envelope::Shutdown).unwrap();

        let mut worker = ConsumerWorker::new(0, Duration::from_millis(5));
        worker
            .start(handler, Arc::clone(&queue))
            .expect("Failed to start consumer");
        worker.join().expect("Failed to join consumer");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &["first", "second", "third"]);
    }

    #[test]
    fn test_consumer_join_is_idempotent() {
        let handler = Arc::new(ClosureHandler::new(
            |_id| Ok(Some(Vec::new())),
            |_id, _item| Ok(()),
        ));
        let queue = Arc::new(WorkQueue::with_capacity(0));
        queue.push(Envelope::Shutdown).unwrap();

        let mut worker = ConsumerWorker::new(0, Duration::from_millis(5));
        worker.start(handler, queue).expect("Failed to start");

        worker.join().expect("First join failed");
        worker.join().expect("Second join should be a no-op");

        let mut unstarted = ConsumerWorker::new(1, Duration::from_millis(5));
        unstarted
            .join()
            .expect("Join of unstarted worker should be Ok");
    }
}
