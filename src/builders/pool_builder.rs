//! Fluent construction of a [`WorkerPool`].

use std::sync::Arc;

use crate::config::WorkerPoolConfig;
use crate::core::{ErrorSink, LoggingSink, PoolError, TaskQueue, WorkerPool};

/// Builder combining configuration, an error sink, and optionally a queue
/// created by the caller.
///
/// ```rust
/// use std::sync::Arc;
/// use prometheus_task_pool::builders::WorkerPoolBuilder;
/// use prometheus_task_pool::core::{CollectingSink, ShutdownMode};
///
/// let sink = Arc::new(CollectingSink::new(100));
/// let pool = WorkerPoolBuilder::new()
///     .worker_count(2)
///     .queue_capacity(8)
///     .error_sink(Arc::clone(&sink))
///     .build()?;
/// pool.submit(|| -> Result<(), String> { Err("bad input".into()) })?;
/// pool.await_completion();
/// assert_eq!(sink.len(), 1);
/// pool.shutdown(ShutdownMode::Graceful);
/// # Ok::<(), prometheus_task_pool::core::PoolError>(())
/// ```
pub struct WorkerPoolBuilder {
    config: WorkerPoolConfig,
    sink: Arc<dyn ErrorSink>,
    queue: Option<Arc<TaskQueue>>,
}

impl Default for WorkerPoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerPoolBuilder {
    /// Start from the default configuration and the logging sink.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(WorkerPoolConfig::default())
    }

    /// Start from an existing configuration.
    #[must_use]
    pub fn from_config(config: WorkerPoolConfig) -> Self {
        Self {
            config,
            sink: Arc::new(LoggingSink),
            queue: None,
        }
    }

    /// Number of worker threads.
    #[must_use]
    pub fn worker_count(mut self, worker_count: usize) -> Self {
        self.config.worker_count = worker_count;
        self
    }

    /// Queue capacity. Ignored when a queue is supplied with [`Self::queue`].
    #[must_use]
    pub fn queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.config.queue_capacity = queue_capacity;
        self
    }

    /// Worker thread name prefix.
    #[must_use]
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    /// Sink receiving task failures.
    #[must_use]
    pub fn error_sink<S: ErrorSink>(mut self, sink: Arc<S>) -> Self {
        self.sink = sink;
        self
    }

    /// Consume a queue built by the caller instead of creating one.
    ///
    /// The pool takes over the queue's lifecycle: `shutdown` closes it.
    #[must_use]
    pub fn queue(mut self, queue: Arc<TaskQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &WorkerPoolConfig {
        &self.config
    }

    /// Validate and start the pool.
    ///
    /// # Errors
    ///
    /// - `PoolError::InvalidConfiguration` for a zero worker count or
    ///   capacity, or a queue that is already closed
    /// - `PoolError::Spawn` if a worker thread cannot be started
    pub fn build(self) -> Result<WorkerPool, PoolError> {
        let queue = match self.queue {
            Some(queue) => queue,
            None => Arc::new(TaskQueue::new(self.config.queue_capacity)?),
        };
        WorkerPool::start(self.config, queue, self.sink)
    }
}

impl std::fmt::Debug for WorkerPoolBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPoolBuilder")
            .field("config", &self.config)
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}
