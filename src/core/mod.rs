//! Core types and traits for the queue processor

pub mod error;
pub mod handler;
pub mod item;
pub mod signal;

pub use error::{ProcessorError, Result};
pub use handler::{ClosureHandler, Handler};
pub use item::Item;
pub use signal::StopFlag;
