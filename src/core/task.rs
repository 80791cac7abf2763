//! Task abstraction executed by pool workers.

use std::fmt;

use super::error::TaskError;
use super::queue::BoundedTaskQueue;

/// Identifier assigned to each accepted submission, in submission order.
pub type TaskId = u64;

/// A unit of work with a single `execute` capability.
///
/// Closures returning `()` or `Result<(), E: Display>` implement this trait
/// through a blanket impl, so most callers never implement it by hand.
///
/// # Example
///
/// ```rust
/// use prometheus_task_pool::core::{Task, TaskError};
///
/// struct Resize {
///     width: u32,
/// }
///
/// impl Task for Resize {
///     fn execute(self: Box<Self>) -> Result<(), TaskError> {
///         if self.width == 0 {
///             return Err(TaskError::failed("width must be positive"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Task: Send + 'static {
    /// Run the task body, consuming it.
    ///
    /// # Errors
    ///
    /// Returns a `TaskError` when the body fails. The worker reports it to
    /// the pool's error sink and moves on.
    fn execute(self: Box<Self>) -> Result<(), TaskError>;
}

/// Conversion of a closure's return value into a task outcome.
pub trait IntoTaskResult {
    /// Convert into the outcome reported by the worker.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::Failed` when the value represents a failure.
    fn into_task_result(self) -> Result<(), TaskError>;
}

impl IntoTaskResult for () {
    fn into_task_result(self) -> Result<(), TaskError> {
        Ok(())
    }
}

impl<E: fmt::Display> IntoTaskResult for Result<(), E> {
    fn into_task_result(self) -> Result<(), TaskError> {
        self.map_err(TaskError::failed)
    }
}

impl<F, R> Task for F
where
    F: FnOnce() -> R + Send + 'static,
    R: IntoTaskResult,
{
    fn execute(self: Box<Self>) -> Result<(), TaskError> {
        (*self)().into_task_result()
    }
}

/// A submitted task as it waits in the pool's queue.
///
/// Only the pool creates these; callers see the type when they construct a
/// [`TaskQueue`] to hand to `WorkerPoolBuilder::queue`.
pub struct QueuedTask {
    pub(crate) id: TaskId,
    pub(crate) task: Box<dyn Task>,
}

impl QueuedTask {
    /// Identifier assigned at submission.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }
}

impl fmt::Debug for QueuedTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedTask").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Queue type consumed by [`WorkerPool`](crate::core::WorkerPool).
pub type TaskQueue = BoundedTaskQueue<QueuedTask>;
