//! The shared FIFO work queue connecting producers to consumers.
//!
//! The queue carries [`Envelope`] values: either a [`Work`](Envelope::Work)
//! item on its way to a consumer, or a [`Shutdown`](Envelope::Shutdown)
//! sentinel telling exactly one consumer to exit. Making the sentinel a
//! distinct enum variant means no possible work item can ever be mistaken
//! for a shutdown request.
//!
//! Blocking is the synchronization mechanism: `push` blocks while a bounded
//! queue is full (backpressure on producers) and `pop` blocks while the
//! queue is empty (consumers wait for work).

use crate::core::item::Item;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryRecvError};

/// An entry in the work queue
///
/// Producers only ever enqueue `Work`; the orchestrator enqueues one
/// `Shutdown` per consumer during shutdown, and a consumer exits when it
/// pops one.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// A work item on its way to a consumer
    Work(Item),
    /// A sentinel instructing the receiving consumer to exit
    Shutdown,
}

impl Envelope {
    /// Check whether this envelope is the shutdown sentinel
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Envelope::Shutdown)
    }
}

/// Errors that can occur during queue operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Queue is empty (for try_pop)
    Empty,
    /// Queue is disconnected (the other side was dropped)
    Disconnected,
}

impl std::fmt::Display for QueueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueError::Empty => write!(f, "queue is empty"),
            QueueError::Disconnected => write!(f, "queue is disconnected"),
        }
    }
}

impl std::error::Error for QueueError {}

/// A FIFO queue of [`Envelope`]s with optional capacity bound.
///
/// Built on crossbeam channels: multi-producer, multi-consumer, lock-free.
/// A capacity of zero selects an unbounded queue with no backpressure.
///
/// # Example
///
/// ```rust
/// use queue_processor::{Envelope, Item, WorkQueue};
///
/// let queue = WorkQueue::with_capacity(8);
///
/// let item: Item = [("foo", "bar")].into_iter().collect();
/// queue.push(Envelope::Work(item)).unwrap();
/// queue.push(Envelope::Shutdown).unwrap();
///
/// assert_eq!(queue.len(), 2);
/// assert!(!queue.pop().unwrap().is_shutdown());
/// assert!(queue.pop().unwrap().is_shutdown());
/// ```
pub struct WorkQueue {
    sender: Sender<Envelope>,
    receiver: Receiver<Envelope>,
    capacity: Option<usize>,
}

impl WorkQueue {
    /// Creates a new queue with the specified capacity.
    ///
    /// # Arguments
    ///
    /// * `capacity` - The maximum number of envelopes the queue can hold.
    ///   Zero means unbounded.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, receiver, capacity) = if capacity == 0 {
            let (s, r) = unbounded();
            (s, r, None)
        } else {
            let (s, r) = bounded(capacity);
            (s, r, Some(capacity))
        };
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Pushes an envelope, blocking while the queue is full.
    ///
    /// Never blocks on an unbounded queue.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Disconnected`] if the receiving side is gone.
    pub fn push(&self, envelope: Envelope) -> Result<(), QueueError> {
        self.sender
            .send(envelope)
            .map_err(|_| QueueError::Disconnected)
    }

    /// Pops the oldest envelope, blocking while the queue is empty.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Disconnected`] if the sending side is gone and
    /// the queue is drained.
    pub fn pop(&self) -> Result<Envelope, QueueError> {
        self.receiver.recv().map_err(|_| QueueError::Disconnected)
    }

    /// Attempts to pop an envelope without blocking.
    ///
    /// # Errors
    ///
    /// - [`QueueError::Empty`] if no envelope is available
    /// - [`QueueError::Disconnected`] if the sending side is gone
    pub fn try_pop(&self) -> Result<Envelope, QueueError> {
        self.receiver.try_recv().map_err(|e| match e {
            TryRecvError::Empty => QueueError::Empty,
            TryRecvError::Disconnected => QueueError::Disconnected,
        })
    }

    /// Returns the current number of envelopes in the queue.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Returns the maximum capacity, or `None` for an unbounded queue.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn work(key: &str, value: &str) -> Envelope {
        Envelope::Work([(key, value)].into_iter().collect())
    }

    #[test]
    fn test_push_pop_fifo_order() {
        let queue = WorkQueue::with_capacity(10);
        queue.push(work("seq", "first")).unwrap();
        queue.push(work("seq", "second")).unwrap();
        queue.push(work("seq", "third")).unwrap();

        assert_eq!(queue.pop().unwrap(), work("seq", "first"));
        assert_eq!(queue.pop().unwrap(), work("seq", "second"));
        assert_eq!(queue.pop().unwrap(), work("seq", "third"));
    }

    #[test]
    fn test_capacity_accessor() {
        let queue = WorkQueue::with_capacity(5);
        assert_eq!(queue.capacity(), Some(5));

        let queue = WorkQueue::with_capacity(0);
        assert_eq!(queue.capacity(), None);
    }

    #[test]
    fn test_zero_capacity_is_unbounded() {
        let queue = WorkQueue::with_capacity(0);
        for i in 0..1000 {
            queue.push(work("n", &i.to_string())).unwrap();
        }
        assert_eq!(queue.len(), 1000);
    }

    #[test]
    fn test_push_blocks_when_full() {
        let queue = Arc::new(WorkQueue::with_capacity(1));
        queue.push(work("n", "0")).unwrap();

        let q = Arc::clone(&queue);
        let handle = thread::spawn(move || {
            // This should block until the queue has space
            q.push(work("n", "1")).unwrap();
        });

        // Give the pusher a chance to block
        thread::sleep(Duration::from_millis(10));
        assert_eq!(queue.len(), 1);

        // Pop to make space
        queue.pop().unwrap();

        // Now the pusher should unblock
        handle.join().unwrap();
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_try_pop_empty() {
        let queue = WorkQueue::with_capacity(10);
        match queue.try_pop() {
            Err(QueueError::Empty) => {}
            other => panic!("expected Empty error, got {:?}", other),
        }
    }

    #[test]
    fn test_len_and_is_empty() {
        let queue = WorkQueue::with_capacity(10);
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);

        queue.push(Envelope::Shutdown).unwrap();
        assert!(!queue.is_empty());
        assert_eq!(queue.len(), 1);

        queue.pop().unwrap();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_envelope_is_shutdown() {
        assert!(Envelope::Shutdown.is_shutdown());
        assert!(!work("foo", "bar").is_shutdown());
    }

    #[test]
    fn test_shutdown_never_equals_work() {
        // Even an empty item is distinct from the sentinel
        let empty = Envelope::Work(Item::new());
        assert_ne!(empty, Envelope::Shutdown);
    }

    #[test]
    fn test_queue_error_display() {
        assert_eq!(QueueError::Empty.to_string(), "queue is empty");
        assert_eq!(
            QueueError::Disconnected.to_string(),
            "queue is disconnected"
        );
    }

    #[test]
    fn test_concurrent_push_pop() {
        let queue = Arc::new(WorkQueue::with_capacity(10));
        let num_items = 100;

        let q_push = Arc::clone(&queue);
        let pusher = thread::spawn(move || {
            for i in 0..num_items {
                q_push.push(work("n", &i.to_string())).unwrap();
            }
        });

        let q_pop = Arc::clone(&queue);
        let popper = thread::spawn(move || {
            let mut received = 0;
            for _ in 0..num_items {
                q_pop.pop().unwrap();
                received += 1;
            }
            received
        });

        pusher.join().unwrap();
        let received = popper.join().unwrap();
        assert_eq!(received, num_items);
    }
}
