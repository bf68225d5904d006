//! Cooperative stop signalling for producer workers
//!
//! A [`StopFlag`] is a one-way latch shared between a producer thread and the
//! orchestrator that owns it. The producer polls the flag at the top of its
//! loop; setting the flag never interrupts work already in flight, so an
//! in-progress callback or a blocking queue push always completes before the
//! thread notices the request and exits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A thread-safe, cloneable stop latch
///
/// Clones share the same underlying flag, so setting any clone is visible to
/// all of them. Once set, the flag stays set; there is no reset because a
/// stopped worker is never restarted.
///
/// # Example
///
/// ```rust
/// use queue_processor::StopFlag;
/// use std::thread;
/// use std::time::Duration;
///
/// let flag = StopFlag::new();
/// let flag_clone = flag.clone();
///
/// let handle = thread::spawn(move || {
///     let mut iterations = 0;
///     while !flag_clone.is_set() {
///         iterations += 1;
///         thread::sleep(Duration::from_millis(10));
///     }
///     iterations
/// });
///
/// thread::sleep(Duration::from_millis(50));
/// flag.set();
///
/// assert!(handle.join().unwrap() > 0);
/// ```
#[derive(Clone, Default)]
pub struct StopFlag {
    inner: Arc<AtomicBool>,
}

impl std::fmt::Debug for StopFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopFlag")
            .field("set", &self.is_set())
            .finish()
    }
}

impl StopFlag {
    /// Create a new, unset stop flag
    pub fn new() -> Self {
        Self {
            inner: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request a stop
    ///
    /// Idempotent; the flag cannot be cleared afterwards.
    pub fn set(&self) {
        self.inner.store(true, Ordering::Release);
    }

    /// Check whether a stop has been requested
    ///
    /// Lock-free, suitable for polling at the top of a hot loop.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_stop_flag_creation() {
        let flag = StopFlag::new();
        assert!(!flag.is_set());
    }

    #[test]
    fn test_stop_flag_set() {
        let flag = StopFlag::new();
        assert!(!flag.is_set());

        flag.set();
        assert!(flag.is_set());

        // Idempotent - can call multiple times
        flag.set();
        assert!(flag.is_set());
    }

    #[test]
    fn test_stop_flag_clone_shares_state() {
        let flag = StopFlag::new();
        let clone = flag.clone();

        assert!(!flag.is_set());
        assert!(!clone.is_set());

        // Setting one affects both
        flag.set();
        assert!(flag.is_set());
        assert!(clone.is_set());
    }

    #[test]
    fn test_stop_flag_thread_safety() {
        let flag = StopFlag::new();
        let flag_clone = flag.clone();

        let handle = thread::spawn(move || {
            for _ in 0..100 {
                if flag_clone.is_set() {
                    return true;
                }
                thread::sleep(Duration::from_millis(10));
            }
            false
        });

        // Set after a short delay
        thread::sleep(Duration::from_millis(100));
        flag.set();

        let was_stopped = handle.join().unwrap();
        assert!(was_stopped);
    }

    #[test]
    fn test_stop_flag_default() {
        let flag = StopFlag::default();
        assert!(!flag.is_set());
    }
}
