//! Convenient re-exports for common types and traits

pub use crate::core::{ClosureHandler, Handler, Item, ProcessorError, Result, StopFlag};
pub use crate::processor::{
    ConsumerStats, ConsumerWorker, ProcessorConfig, ProducerStats, ProducerWorker, QueueProcessor,
};
pub use crate::queue::{Envelope, QueueError, WorkQueue};
