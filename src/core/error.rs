//! Error types for queue and pool operations.

use thiserror::Error;

/// Errors produced by the queue and the worker pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Worker count or queue capacity was rejected at construction.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The pool (or its queue) no longer accepts submissions.
    #[error("pool has been shut down")]
    PoolShutdown,
    /// The queue is at capacity and the caller asked not to block.
    #[error("task queue is full")]
    QueueFull,
    /// A bounded wait elapsed before the queue had room.
    #[error("operation timed out")]
    Timeout,
    /// The OS refused to start a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
    /// The async bridge lost its blocking task.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Failure of a single task body. Never escapes the worker that ran it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The task returned an error.
    #[error("task failed: {0}")]
    Failed(String),
    /// The task panicked; the payload message is kept when it is a string.
    #[error("task panicked: {0}")]
    Panicked(String),
}

impl TaskError {
    /// Build a `Failed` error from anything displayable.
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        Self::Failed(reason.to_string())
    }

    /// Build a `Panicked` error from a `catch_unwind` payload.
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::Panicked(message)
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_payload_str() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(
            TaskError::from_panic(payload.as_ref()),
            TaskError::Panicked("boom".into())
        );
    }

    #[test]
    fn test_panic_payload_string() {
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bad index"));
        assert_eq!(
            TaskError::from_panic(payload.as_ref()),
            TaskError::Panicked("bad index".into())
        );
    }

    #[test]
    fn test_panic_payload_opaque() {
        let payload: Box<dyn std::any::Any + Send> = Box::new(17_u32);
        assert_eq!(
            TaskError::from_panic(payload.as_ref()),
            TaskError::Panicked("unknown panic payload".into())
        );
    }
}
