//! Handler trait and related types

use crate::core::error::Result;
use crate::core::item::Item;

/// The two application-defined behaviors driven by the processor
///
/// A single handler instance is shared by every producer and consumer thread,
/// so implementations must be `Send + Sync` and synchronize any internal
/// state themselves. The processor guarantees that calls made on behalf of
/// one worker are sequential; calls from different workers overlap freely.
pub trait Handler: Send + Sync + 'static {
    /// Produce the next batch of items for the given producer
    ///
    /// The return value steers the producer loop:
    ///
    /// - `Ok(None)` - no more work will ever come from this producer; it
    ///   halts immediately.
    /// - `Ok(Some(items))` with an empty vector - nothing available right
    ///   now; the producer sleeps for its configured throttle and polls
    ///   again.
    /// - `Ok(Some(items))` with items - each one is pushed onto the queue in
    ///   order, blocking while the queue is full.
    ///
    /// Implementations should return promptly and leave pacing to the
    /// throttle; a long-blocking `produce` delays the producer's reaction to
    /// a stop request.
    ///
    /// # Errors
    ///
    /// Returns an error if fetching work fails. The producer logs the error,
    /// counts it, sleeps for its throttle and polls again.
    fn produce(&self, producer_id: usize) -> Result<Option<Vec<Item>>>;

    /// Consume one item on behalf of the given consumer
    ///
    /// # Errors
    ///
    /// Returns an error if processing fails. The consumer logs the error,
    /// counts it and moves on to the next item.
    fn consume(&self, consumer_id: usize, item: Item) -> Result<()>;

    /// Get the handler's name for logging and statistics
    fn name(&self) -> &str {
        "Handler"
    }
}

/// Helper to build a handler from a pair of closures
pub struct ClosureHandler<P, C>
where
    P: Fn(usize) -> Result<Option<Vec<Item>>> + Send + Sync + 'static,
    C: Fn(usize, Item) -> Result<()> + Send + Sync + 'static,
{
    produce_fn: P,
    consume_fn: C,
    name: String,
}

impl<P, C> ClosureHandler<P, C>
where
    P: Fn(usize) -> Result<Option<Vec<Item>>> + Send + Sync + 'static,
    C: Fn(usize, Item) -> Result<()> + Send + Sync + 'static,
{
    /// Create a new closure handler
    pub fn new(produce_fn: P, consume_fn: C) -> Self {
        Self {
            produce_fn,
            consume_fn,
            name: "ClosureHandler".to_string(),
        }
    }

    /// Create a new closure handler with a custom name
    pub fn with_name<S: Into<String>>(produce_fn: P, consume_fn: C, name: S) -> Self {
        Self {
            produce_fn,
            consume_fn,
            name: name.into(),
        }
    }
}

impl<P, C> Handler for ClosureHandler<P, C>
where
    P: Fn(usize) -> Result<Option<Vec<Item>>> + Send + Sync + 'static,
    C: Fn(usize, Item) -> Result<()> + Send + Sync + 'static,
{
    fn produce(&self, producer_id: usize) -> Result<Option<Vec<Item>>> {
        (self.produce_fn)(producer_id)
    }

    fn consume(&self, consumer_id: usize, item: Item) -> Result<()> {
        (self.consume_fn)(consumer_id, item)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
