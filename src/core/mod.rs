//! Core queue, task, and worker pool abstractions.

pub mod error;
pub mod queue;
pub mod sink;
pub mod task;
pub mod worker_pool;

pub use error::{AppResult, PoolError, TaskError};
pub use queue::{BoundedTaskQueue, DrainResult};
pub use sink::{ChannelSink, CollectingSink, ErrorSink, LoggingSink, TaskFailure};
pub use task::{IntoTaskResult, QueuedTask, Task, TaskId, TaskQueue};
pub use worker_pool::{PoolStats, ShutdownMode, WorkerPool, WorkerState};
