//! Error types for the queue processor

/// Result type for queue processor operations
pub type Result<T> = std::result::Result<T, ProcessorError>;

/// Errors that can occur in the queue processor
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProcessorError {
    /// A worker role was started a second time
    #[error("{role} workers are already started ({worker_count} workers)")]
    AlreadyStarted {
        /// Worker role ("producer" or "consumer")
        role: String,
        /// Number of worker threads in that role
        worker_count: usize,
    },

    /// Failed to spawn a worker thread with details
    #[error("Failed to spawn {role} thread #{worker_id}: {message}")]
    SpawnError {
        /// Worker role ("producer" or "consumer")
        role: String,
        /// ID of the worker that failed to spawn
        worker_id: usize,
        /// Error message
        message: String,
        /// Source IO error
        #[source]
        source: Option<std::io::Error>,
    },

    /// Failed to join a worker thread
    #[error("Failed to join {role} thread #{worker_id}: {message}")]
    JoinError {
        /// Worker role ("producer" or "consumer")
        role: String,
        /// ID of the worker that failed to join
        worker_id: usize,
        /// Error message
        message: String,
    },

    /// Shutdown sentinel could not be delivered to the queue
    #[error("Failed to send shutdown sentinel to queue")]
    QueueSendError,

    /// Invalid configuration with parameter
    #[error("Invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Configuration parameter name
        parameter: String,
        /// Error message
        message: String,
    },

    /// General error
    #[error("{0}")]
    Other(String),
}

impl ProcessorError {
    /// Create an already started error
    pub fn already_started(role: impl Into<String>, worker_count: usize) -> Self {
        ProcessorError::AlreadyStarted {
            role: role.into(),
            worker_count,
        }
    }

    /// Create a spawn error
    pub fn spawn(role: impl Into<String>, worker_id: usize, message: impl Into<String>) -> Self {
        ProcessorError::SpawnError {
            role: role.into(),
            worker_id,
            message: message.into(),
            source: None,
        }
    }

    /// Create a spawn error with source
    pub fn spawn_with_source(
        role: impl Into<String>,
        worker_id: usize,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        ProcessorError::SpawnError {
            role: role.into(),
            worker_id,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a join error
    pub fn join(role: impl Into<String>, worker_id: usize, message: impl Into<String>) -> Self {
        ProcessorError::JoinError {
            role: role.into(),
            worker_id,
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        ProcessorError::InvalidConfig {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        ProcessorError::Other(msg.into())
    }
}
