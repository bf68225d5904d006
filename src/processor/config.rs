//! Processor configuration

use crate::core::error::{ProcessorError, Result};
use std::time::Duration;

/// Configuration for a queue processor
///
/// All values are fixed at construction; the processor never resizes its
/// worker sets or its queue at runtime.
///
/// # Example
///
/// ```rust
/// use queue_processor::ProcessorConfig;
/// use std::time::Duration;
///
/// let config = ProcessorConfig::default()
///     .with_capacity(1024)
///     .with_producer_count(4)
///     .with_producer_throttle(Duration::from_millis(50))
///     .with_consumer_count(8);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct ProcessorConfig {
    /// Maximum queue size (0 = unbounded)
    pub capacity: usize,
    /// Number of producer threads
    pub producer_count: usize,
    /// How long a producer sleeps after an empty poll.
    /// Default: 100ms
    ///
    /// Also bounds how long a stopped producer keeps running: a producer
    /// mid-sleep finishes the sleep before it notices the stop request.
    pub producer_throttle: Duration,
    /// Number of consumer threads
    pub consumer_count: usize,
    /// Reserved for consumer backoff; accepted and stored but currently
    /// unused by the consumer loop, which paces itself by blocking on the
    /// queue instead.
    pub consumer_throttle: Duration,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            capacity: 0,
            producer_count: 1,
            producer_throttle: Duration::from_millis(100),
            consumer_count: 1,
            consumer_throttle: Duration::from_millis(100),
        }
    }
}

impl ProcessorConfig {
    /// Set maximum queue size (0 = unbounded)
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the number of producer threads
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_producer_count(mut self, count: usize) -> Self {
        self.producer_count = count;
        self
    }

    /// Set the producer throttle duration
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_producer_throttle(mut self, throttle: Duration) -> Self {
        self.producer_throttle = throttle;
        self
    }

    /// Set the number of consumer threads
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_consumer_count(mut self, count: usize) -> Self {
        self.consumer_count = count;
        self
    }

    /// Set the consumer throttle duration (reserved)
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_consumer_throttle(mut self, throttle: Duration) -> Self {
        self.consumer_throttle = throttle;
        self
    }

    /// Validate configuration
    ///
    /// Worker counts must be at least 1. Throttles need no check: `Duration`
    /// cannot represent a negative value.
    pub fn validate(&self) -> Result<()> {
        if self.producer_count == 0 {
            return Err(ProcessorError::invalid_config(
                "producer_count",
                "Number of producers must be greater than 0",
            ));
        }
        if self.consumer_count == 0 {
            return Err(ProcessorError::invalid_config(
                "consumer_count",
                "Number of consumers must be greater than 0",
            ));
        }
        Ok(())
    }
}
