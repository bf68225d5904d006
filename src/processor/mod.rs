//! Producer and consumer workers and their orchestrator

pub mod config;
pub mod consumer;
pub mod producer;
pub mod queue_processor;

pub use config::ProcessorConfig;
pub use consumer::{ConsumerStats, ConsumerWorker};
pub use producer::{ProducerStats, ProducerWorker};
pub use queue_processor::QueueProcessor;

/// Extract a readable message from a caught panic payload
pub(crate) fn panic_message(panic_info: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
