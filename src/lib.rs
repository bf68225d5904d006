//! # Queue Processor
//!
//! A reusable producer/consumer skeleton around a shared work queue, with
//! cooperative shutdown and per-worker statistics.
//!
//! ## Features
//!
//! - **Work Queue**: Bounded or unbounded FIFO queue built on crossbeam channels
//! - **Producer Threads**: Poll a `produce` callback and push items, stoppable via flags
//! - **Consumer Threads**: Drain the queue into a `consume` callback, stopped by sentinels
//! - **Isolation**: Callback errors and panics are logged and counted, never fatal
//! - **Worker Statistics**: Items, failures and panics tracked per worker
//! - **Graceful Shutdown**: Producers drain first, then sentinels release the consumers
//!
//! ## Quick Start
//!
//! ```rust
//! use queue_processor::prelude::*;
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::{Arc, Mutex};
//!
//! # fn main() -> Result<()> {
//! // A backlog of work, handed out one item per poll
//! let backlog = Mutex::new(vec![
//!     Item::from_iter([("task", "resize"), ("file", "a.png")]),
//!     Item::from_iter([("task", "resize"), ("file", "b.png")]),
//! ]);
//! let done = Arc::new(AtomicU64::new(0));
//! let done_clone = Arc::clone(&done);
//!
//! let handler = ClosureHandler::new(
//!     move |_id| Ok(backlog.lock().unwrap().pop().map(|item| vec![item])),
//!     move |_id, item| {
//!         println!("processing {:?}", item.get("file"));
//!         done_clone.fetch_add(1, Ordering::Relaxed);
//!         Ok(())
//!     },
//! );
//!
//! let processor = QueueProcessor::new(handler)?;
//! processor.start_all()?;
//!
//! // Producers halt on their own once the backlog is empty; consumers
//! // keep draining until they receive a shutdown sentinel
//! processor.join_producers()?;
//! processor.stop_consumers()?;
//! processor.join_consumers()?;
//!
//! assert_eq!(done.load(Ordering::Relaxed), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use queue_processor::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> Result<()> {
//! let config = ProcessorConfig::default()
//!     .with_capacity(64)
//!     .with_producer_count(2)
//!     .with_consumer_count(4)
//!     .with_producer_throttle(Duration::from_millis(250));
//!
//! let processor = QueueProcessor::with_config(
//!     config,
//!     ClosureHandler::new(|_id| Ok(None), |_id, _item| Ok(())),
//! )?;
//! processor.start_all()?;
//! # processor.stop_all()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Handlers
//!
//! ```rust
//! use queue_processor::prelude::*;
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! struct LineCounter {
//!     lines: Vec<String>,
//!     cursor: AtomicU64,
//!     total_bytes: AtomicU64,
//! }
//!
//! impl Handler for LineCounter {
//!     fn produce(&self, _producer_id: usize) -> Result<Option<Vec<Item>>> {
//!         let i = self.cursor.fetch_add(1, Ordering::SeqCst) as usize;
//!         Ok(self
//!             .lines
//!             .get(i)
//!             .map(|line| vec![Item::from_iter([("line", line.as_str())])]))
//!     }
//!
//!     fn consume(&self, _consumer_id: usize, item: Item) -> Result<()> {
//!         if let Some(line) = item.get("line").and_then(|v| v.as_str()) {
//!             self.total_bytes.fetch_add(line.len() as u64, Ordering::Relaxed);
//!         }
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "LineCounter"
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let handler = LineCounter {
//!     lines: vec!["alpha".to_string(), "beta".to_string()],
//!     cursor: AtomicU64::new(0),
//!     total_bytes: AtomicU64::new(0),
//! };
//!
//! let processor = QueueProcessor::new(handler)?;
//! processor.start_all()?;
//! processor.join_producers()?;
//! processor.stop_consumers()?;
//! processor.join_consumers()?;
//!
//! assert_eq!(
//!     processor.handler().total_bytes.load(Ordering::Relaxed),
//!     "alpha".len() as u64 + "beta".len() as u64
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Worker Statistics
//!
//! ```rust
//! use queue_processor::prelude::*;
//!
//! # fn main() -> Result<()> {
//! # let processor = QueueProcessor::new(ClosureHandler::new(
//! #     |_id| Ok(None),
//! #     |_id, _item| Ok(()),
//! # ))?;
//! # processor.start_all()?;
//! # processor.join_producers()?;
//! # processor.stop_consumers()?;
//! # processor.join_consumers()?;
//! for (i, stats) in processor.producer_stats().iter().enumerate() {
//!     println!("producer {}: {} items produced", i, stats.get_items_produced());
//! }
//!
//! println!("total consumed: {}", processor.total_items_consumed());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod prelude;
pub mod processor;
pub mod queue;

pub use crate::core::{ClosureHandler, Handler, Item, ProcessorError, Result, StopFlag};
pub use crate::processor::{
    ConsumerStats, ConsumerWorker, ProcessorConfig, ProducerStats, ProducerWorker, QueueProcessor,
};
pub use crate::queue::{Envelope, QueueError, WorkQueue};
