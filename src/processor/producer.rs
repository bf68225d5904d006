//! Producer worker implementation

use crate::core::error::{ProcessorError, Result};
use crate::core::handler::Handler;
use crate::core::signal::StopFlag;
use crate::processor::panic_message;
use crate::queue::{Envelope, WorkQueue};
use log::{debug, error, warn};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Statistics for a producer thread
#[derive(Debug, Default)]
pub struct ProducerStats {
    /// Total number of items successfully enqueued
    pub items_produced: AtomicU64,
    /// Total number of polls that yielded an empty batch
    pub empty_polls: AtomicU64,
    /// Total number of produce calls that returned an error
    pub produce_failures: AtomicU64,
    /// Total number of produce calls that panicked
    pub produce_panics: AtomicU64,
}

impl ProducerStats {
    /// Create new producer statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment items produced counter
    pub fn increment_produced(&self) {
        self.items_produced.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment empty polls counter
    pub fn increment_empty_polls(&self) {
        self.empty_polls.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment produce failures counter
    pub fn increment_failures(&self) {
        self.produce_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment produce panics counter
    pub fn increment_panics(&self) {
        self.produce_panics.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total items produced
    pub fn get_items_produced(&self) -> u64 {
        self.items_produced.load(Ordering::Relaxed)
    }

    /// Get total empty polls
    pub fn get_empty_polls(&self) -> u64 {
        self.empty_polls.load(Ordering::Relaxed)
    }

    /// Get total produce failures
    pub fn get_produce_failures(&self) -> u64 {
        self.produce_failures.load(Ordering::Relaxed)
    }

    /// Get total produce panics
    pub fn get_produce_panics(&self) -> u64 {
        self.produce_panics.load(Ordering::Relaxed)
    }
}

/// A worker thread that feeds items into the work queue
///
/// The record is created up front by the orchestrator and holds no thread
/// until started. A producer runs until its handler signals the permanent
/// end of work or its stop flag is set, whichever comes first.
#[derive(Debug)]
pub struct ProducerWorker {
    id: usize,
    throttle: Duration,
    stop_flag: StopFlag,
    thread: Option<thread::JoinHandle<()>>,
    stats: Arc<ProducerStats>,
}

impl ProducerWorker {
    /// Create an unstarted producer record
    pub(crate) fn new(id: usize, throttle: Duration) -> Self {
        Self {
            id,
            throttle,
            stop_flag: StopFlag::new(),
            thread: None,
            stats: Arc::new(ProducerStats::new()),
        }
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get worker statistics
    pub fn stats(&self) -> Arc<ProducerStats> {
        Arc::clone(&self.stats)
    }

    /// Get the configured throttle duration
    pub fn throttle(&self) -> Duration {
        self.throttle
    }

    /// Check if the worker thread is currently running
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().map_or(false, |t| !t.is_finished())
    }

    /// Spawn the producer thread
    pub(crate) fn start<H: Handler>(
        &mut self,
        handler: Arc<H>,
        queue: Arc<WorkQueue>,
    ) -> Result<()> {
        let id = self.id;
        let throttle = self.throttle;
        let stop_flag = self.stop_flag.clone();
        let stats = Arc::clone(&self.stats);

        let thread = thread::Builder::new()
            .name(format!("producer-{}", id))
            .spawn(move || {
                Self::run(id, handler, queue, stop_flag, stats, throttle);
            })
            .map_err(|e| {
                ProcessorError::spawn_with_source("producer", id, "Cannot create thread", e)
            })?;

        self.thread = Some(thread);
        Ok(())
    }

    /// Request a cooperative stop
    ///
    /// The flag is polled at the top of the loop only; an in-flight produce
    /// call, throttle sleep or blocking push always completes first.
    pub(crate) fn signal_stop(&self) {
        debug!("producer {}: stop requested", self.id);
        self.stop_flag.set();
    }

    /// Join the producer thread
    ///
    /// Idempotent; joining a never-started or already-joined worker is a
    /// no-op. Blocks until the thread exits.
    pub(crate) fn join(&mut self) -> Result<()> {
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|p| ProcessorError::join("producer", self.id, panic_message(p)))?;
        }
        Ok(())
    }

    /// Main producer loop
    ///
    /// The stop flag is checked once per iteration, before the handler is
    /// consulted. The handler's verdict drives the rest: `None` is the
    /// permanent end of work, an empty batch means sleep and re-poll, and a
    /// non-empty batch is pushed item by item in order, blocking while the
    /// queue is full.
    fn run<H: Handler>(
        id: usize,
        handler: Arc<H>,
        queue: Arc<WorkQueue>,
        stop_flag: StopFlag,
        stats: Arc<ProducerStats>,
        throttle: Duration,
    ) {
        debug!("producer {}: started", id);

        'poll: while !stop_flag.is_set() {
            match catch_unwind(AssertUnwindSafe(|| handler.produce(id))) {
                Ok(Ok(None)) => {
                    debug!("producer {}: no more work, halting", id);
                    break;
                }
                Ok(Ok(Some(items))) if items.is_empty() => {
                    stats.increment_empty_polls();
                    thread::sleep(throttle);
                }
                Ok(Ok(Some(items))) => {
                    for item in items {
                        if queue.push(Envelope::Work(item)).is_err() {
                            debug!("producer {}: queue disconnected, halting", id);
                            break 'poll;
                        }
                        stats.increment_produced();
                    }
                }
                Ok(Err(e)) => {
                    warn!("producer {}: produce failed: {}", id, e);
                    stats.increment_failures();
                    thread::sleep(throttle);
                }
                Err(panic_info) => {
                    error!(
                        "producer {}: produce panicked: {}",
                        id,
                        panic_message(panic_info)
                    );
                    stats.increment_panics();
                    thread::sleep(throttle);
                }
            }
        }

        debug!(
            "producer {}: exiting ({} items produced)",
            id,
            stats.get_items_produced()
        );
    }
}
