//! Fixed-size worker pool draining a shared [`BoundedTaskQueue`].
//!
//! Producers call `submit`; `N` dedicated OS threads each loop
//! dequeue → execute → acknowledge until the pool shuts down.
//!
//! # Key Features
//!
//! - **Back-pressure**: `submit` blocks while the queue is at capacity
//! - **Drain tracking**: `await_completion` returns once every submitted task has
//!   been executed and acknowledged, with deadline variants
//! - **Failure isolation**: task errors and panics go to an [`ErrorSink`]; the
//!   worker keeps running
//! - **Two shutdown modes**: graceful (finish queued work) and immediate
//!   (finish only the running tasks, discard the rest)
//!
//! # Example
//!
//! ```rust
//! use prometheus_task_pool::config::WorkerPoolConfig;
//! use prometheus_task_pool::core::{ShutdownMode, WorkerPool};
//!
//! let pool = WorkerPool::new(
//!     WorkerPoolConfig::new()
//!         .with_worker_count(4)
//!         .with_queue_capacity(16),
//! )?;
//!
//! for i in 0..32 {
//!     pool.submit(move || println!("task {i}"))?;
//! }
//! pool.await_completion();
//! pool.shutdown(ShutdownMode::Graceful);
//! # Ok::<(), prometheus_task_pool::core::PoolError>(())
//! ```
//!
//! [`BoundedTaskQueue`]: crate::core::BoundedTaskQueue
//! [`ErrorSink`]: crate::core::ErrorSink

mod native;

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

pub use native::WorkerPool;

/// How `shutdown` treats work that has not started yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShutdownMode {
    /// Reject new submissions, run everything already queued, then stop.
    Graceful,
    /// Reject new submissions, discard queued tasks, stop after the
    /// currently running tasks.
    Immediate,
}

/// Lifecycle state of a single worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Waiting in `dequeue`.
    Idle,
    /// Running a task body.
    Executing,
    /// Exited its loop. Terminal.
    Stopped,
}

impl WorkerState {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Executing => 1,
            Self::Stopped => 2,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Idle,
            1 => Self::Executing,
            _ => Self::Stopped,
        }
    }
}

/// Per-worker state slots, written only by the owning worker.
#[derive(Debug)]
pub(crate) struct WorkerStates {
    slots: Box<[AtomicU8]>,
}

impl WorkerStates {
    pub fn new(worker_count: usize) -> Self {
        Self {
            slots: (0..worker_count)
                .map(|_| AtomicU8::new(WorkerState::Idle.as_u8()))
                .collect(),
        }
    }

    pub fn set(&self, worker_id: usize, state: WorkerState) {
        if let Some(slot) = self.slots.get(worker_id) {
            slot.store(state.as_u8(), Ordering::Release);
        }
    }

    pub fn snapshot(&self) -> Vec<WorkerState> {
        self.slots
            .iter()
            .map(|slot| WorkerState::from_u8(slot.load(Ordering::Acquire)))
            .collect()
    }
}

/// Statistics about pool utilization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of worker threads.
    pub worker_count: usize,

    /// Queue capacity.
    pub queue_capacity: usize,

    /// Tasks waiting in the queue.
    pub queued_tasks: usize,

    /// Tasks dequeued but not yet acknowledged.
    pub in_flight_tasks: usize,

    /// Total tasks accepted by `submit`.
    pub submitted_tasks: u64,

    /// Total tasks that finished without error.
    pub completed_tasks: u64,

    /// Total tasks that returned an error or panicked.
    pub failed_tasks: u64,

    /// Total tasks dropped unstarted by an immediate shutdown.
    pub discarded_tasks: u64,
}

/// Internal counters for pool statistics (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub submitted_tasks: AtomicU64,
    pub completed_tasks: AtomicU64,
    pub failed_tasks: AtomicU64,
    pub discarded_tasks: AtomicU64,
}

impl PoolCounters {
    /// Get a snapshot of the counters; queue figures are filled by the caller.
    pub fn snapshot(&self, worker_count: usize, queue_capacity: usize) -> PoolStats {
        PoolStats {
            worker_count,
            queue_capacity,
            queued_tasks: 0,
            in_flight_tasks: 0,
            submitted_tasks: self.submitted_tasks.load(Ordering::Relaxed),
            completed_tasks: self.completed_tasks.load(Ordering::Relaxed),
            failed_tasks: self.failed_tasks.load(Ordering::Relaxed),
            discarded_tasks: self.discarded_tasks.load(Ordering::Relaxed),
        }
    }
}
