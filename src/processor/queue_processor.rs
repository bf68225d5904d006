//! Queue processor orchestrator

use crate::core::error::{ProcessorError, Result};
use crate::core::handler::Handler;
use crate::processor::config::ProcessorConfig;
use crate::processor::consumer::{ConsumerStats, ConsumerWorker};
use crate::processor::producer::{ProducerStats, ProducerWorker};
use crate::queue::{Envelope, WorkQueue};
use log::{debug, error};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Orchestrates producer and consumer threads around a shared work queue
///
/// Items flow from the handler's `produce` callback, through the queue, into
/// the handler's `consume` callback. Producers and consumers are managed as
/// two independent groups so their lifecycles can be driven separately: a
/// typical run starts both groups, waits for (or stops) the producers, then
/// shuts the consumers down with sentinels once no more items can arrive.
///
/// # Thread Safety
///
/// All lifecycle methods take `&self` and use interior mutability, so a
/// processor wrapped in an [`Arc`] can be driven from multiple threads.
/// Each group starts at most once; subsequent start calls return
/// [`ProcessorError::AlreadyStarted`].
pub struct QueueProcessor<H: Handler> {
    config: ProcessorConfig,
    handler: Arc<H>,
    queue: Arc<WorkQueue>,
    producers: RwLock<Vec<ProducerWorker>>,
    consumers: RwLock<Vec<ConsumerWorker>>,
    producers_started: AtomicBool,
    consumers_started: AtomicBool,
}

impl<H: Handler> std::fmt::Debug for QueueProcessor<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueProcessor")
            .field("config", &self.config)
            .field(
                "producers_started",
                &self.producers_started.load(Ordering::Relaxed),
            )
            .field(
                "consumers_started",
                &self.consumers_started.load(Ordering::Relaxed),
            )
            .field("queue_len", &self.queue.len())
            .finish()
    }
}

impl<H: Handler> QueueProcessor<H> {
    /// Create a new processor with default configuration
    pub fn new(handler: H) -> Result<Self> {
        Self::with_config(ProcessorConfig::default(), handler)
    }

    /// Create a processor with custom configuration
    pub fn with_config(config: ProcessorConfig, handler: H) -> Result<Self> {
        config.validate()?;

        let queue = Arc::new(WorkQueue::with_capacity(config.capacity));

        let producers = (0..config.producer_count)
            .map(|id| ProducerWorker::new(id, config.producer_throttle))
            .collect();
        let consumers = (0..config.consumer_count)
            .map(|id| ConsumerWorker::new(id, config.consumer_throttle))
            .collect();

        debug!(
            "created queue processor for handler '{}' ({} producers, {} consumers)",
            handler.name(),
            config.producer_count,
            config.consumer_count
        );

        Ok(Self {
            config,
            handler: Arc::new(handler),
            queue,
            producers: RwLock::new(producers),
            consumers: RwLock::new(consumers),
            producers_started: AtomicBool::new(false),
            consumers_started: AtomicBool::new(false),
        })
    }

    /// Start all producer threads
    ///
    /// Each producer polls the handler's `produce` callback and pushes the
    /// returned items onto the queue until it is stopped or the handler
    /// returns `None`.
    ///
    /// Producers start at most once per processor. Concurrent calls are
    /// safe; only the first succeeds, the rest receive
    /// [`ProcessorError::AlreadyStarted`]. If spawning fails partway, the
    /// error is returned and the producers that did start keep running;
    /// they can still be stopped and joined normally.
    pub fn start_producers(&self) -> Result<()> {
        if self
            .producers_started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ProcessorError::already_started(
                "producer",
                self.config.producer_count,
            ));
        }

        debug!("starting {} producers", self.config.producer_count);
        for worker in self.producers.write().iter_mut() {
            worker.start(Arc::clone(&self.handler), Arc::clone(&self.queue))?;
        }

        Ok(())
    }

    /// Start all consumer threads
    ///
    /// Each consumer blocks on the queue and feeds popped items to the
    /// handler's `consume` callback until it pops a shutdown sentinel.
    ///
    /// Consumers start at most once per processor. Concurrent calls are
    /// safe; only the first succeeds, the rest receive
    /// [`ProcessorError::AlreadyStarted`].
    pub fn start_consumers(&self) -> Result<()> {
        if self
            .consumers_started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ProcessorError::already_started(
                "consumer",
                self.config.consumer_count,
            ));
        }

        debug!("starting {} consumers", self.config.consumer_count);
        for worker in self.consumers.write().iter_mut() {
            worker.start(Arc::clone(&self.handler), Arc::clone(&self.queue))?;
        }

        Ok(())
    }

    /// Start producers and consumers
    ///
    /// Producers are started first so consumers never wake up to a queue
    /// that cannot receive items. With a bounded queue the order does not
    /// matter for correctness; producers block until consumers catch up.
    pub fn start_all(&self) -> Result<()> {
        self.start_producers()?;
        self.start_consumers()?;
        Ok(())
    }

    /// Signal all producers to stop
    ///
    /// Non-blocking. Each producer finishes its current `produce` call (and
    /// pushes any items that call returned) before it observes the flag, so
    /// items may still arrive on the queue briefly after this returns. The
    /// stop latency of an idle producer is bounded by its throttle interval.
    pub fn stop_producers(&self) {
        debug!("signalling {} producers to stop", self.config.producer_count);
        for worker in self.producers.read().iter() {
            worker.signal_stop();
        }
    }

    /// Wait for all producer threads to exit
    ///
    /// Blocks until every producer has halted, either because it was
    /// signalled via [`stop_producers`](Self::stop_producers), its handler
    /// returned `None`, or the queue disconnected. Joining producers that
    /// were never started is a no-op. There is no timeout; a producer whose
    /// handler keeps returning items will never be joined unless it is
    /// signalled first.
    pub fn join_producers(&self) -> Result<()> {
        for worker in self.producers.write().iter_mut() {
            worker.join()?;
        }
        Ok(())
    }

    /// Push one shutdown sentinel per consumer
    ///
    /// Each running consumer pops exactly one sentinel and exits, so after
    /// this call (and once the preceding items are drained) every consumer
    /// terminates. Sentinels are pushed with the same blocking semantics as
    /// work items; on a full bounded queue this waits for space.
    ///
    /// Call this only after producers have stopped, otherwise late items
    /// can be queued behind the sentinels and never consumed.
    pub fn stop_consumers(&self) -> Result<()> {
        debug!(
            "pushing {} shutdown sentinels",
            self.config.consumer_count
        );
        for _ in 0..self.config.consumer_count {
            self.queue
                .push(Envelope::Shutdown)
                .map_err(|_| ProcessorError::QueueSendError)?;
        }
        Ok(())
    }

    /// Wait for all consumer threads to exit
    ///
    /// Blocks until every consumer has popped its sentinel and exited.
    /// Joining consumers that were never started is a no-op. There is no
    /// timeout; without [`stop_consumers`](Self::stop_consumers) this
    /// blocks forever.
    pub fn join_consumers(&self) -> Result<()> {
        for worker in self.consumers.write().iter_mut() {
            worker.join()?;
        }
        Ok(())
    }

    /// Gracefully stop everything and wait for all threads to exit
    ///
    /// 1. Signals producers to stop (no new items after their current poll)
    /// 2. Joins producers, so every produced item is already on the queue
    /// 3. Pushes one shutdown sentinel per consumer
    /// 4. Joins consumers, which drain all remaining items before exiting
    ///
    /// Because the sentinels are pushed only after the last producer has
    /// exited, every item produced before the stop is consumed.
    pub fn stop_all(&self) -> Result<()> {
        self.stop_producers();
        self.join_producers()?;
        self.stop_consumers()?;
        self.join_consumers()?;
        Ok(())
    }

    /// Get the processor configuration
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Get a reference to the handler
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Get current queue length (approximate)
    ///
    /// The value may change between checking and using it. Shutdown
    /// sentinels still in the queue are counted.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Check if any worker thread is currently running
    pub fn is_running(&self) -> bool {
        self.producers.read().iter().any(|w| w.is_running())
            || self.consumers.read().iter().any(|w| w.is_running())
    }

    /// Get statistics for all producers
    pub fn producer_stats(&self) -> Vec<Arc<ProducerStats>> {
        self.producers.read().iter().map(|w| w.stats()).collect()
    }

    /// Get statistics for all consumers
    pub fn consumer_stats(&self) -> Vec<Arc<ConsumerStats>> {
        self.consumers.read().iter().map(|w| w.stats()).collect()
    }

    /// Get total items produced across all producers
    pub fn total_items_produced(&self) -> u64 {
        let producers = self.producers.read();
        producers
            .iter()
            .map(|w| w.stats().get_items_produced())
            .sum()
    }

    /// Get total items consumed across all consumers
    pub fn total_items_consumed(&self) -> u64 {
        let consumers = self.consumers.read();
        consumers
            .iter()
            .map(|w| w.stats().get_items_consumed())
            .sum()
    }

    /// Get total produce calls that failed across all producers
    pub fn total_produce_failures(&self) -> u64 {
        let producers = self.producers.read();
        producers
            .iter()
            .map(|w| w.stats().get_produce_failures())
            .sum()
    }

    /// Get total consume calls that failed across all consumers
    pub fn total_consume_failures(&self) -> u64 {
        let consumers = self.consumers.read();
        consumers
            .iter()
            .map(|w| w.stats().get_consume_failures())
            .sum()
    }

    /// Get total produce calls that panicked across all producers
    pub fn total_produce_panics(&self) -> u64 {
        let producers = self.producers.read();
        producers
            .iter()
            .map(|w| w.stats().get_produce_panics())
            .sum()
    }

    /// Get total consume calls that panicked across all consumers
    pub fn total_consume_panics(&self) -> u64 {
        let consumers = self.consumers.read();
        consumers
            .iter()
            .map(|w| w.stats().get_consume_panics())
            .sum()
    }
}

impl<H: Handler> Drop for QueueProcessor<H> {
    fn drop(&mut self) {
        // Only stop if threads are still alive; this can block like stop_all
        if self.is_running() {
            debug!("queue processor dropped while running, stopping workers");
            self.stop_producers();
            if let Err(e) = self.join_producers() {
                error!("Failed to join producers during drop: {}", e);
            }
            if let Err(e) = self.stop_consumers() {
                error!("Failed to stop consumers during drop: {}", e);
            }
            if let Err(e) = self.join_consumers() {
                error!("Failed to join consumers during drop: {}", e);
            }
        }
    }
}
