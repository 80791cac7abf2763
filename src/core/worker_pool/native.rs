//! Native implementation of `WorkerPool` using OS threads.
//!
//! # Design Principles
//!
//! - **No polling**: workers park inside `dequeue`; waiters park on the
//!   queue's drain condvar
//! - **No sentinel**: shutdown is queue state broadcast to every worker
//! - **Ack always**: a worker acknowledges each dequeued task exactly once,
//!   whether it succeeded, failed, or panicked

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::WorkerPoolConfig;
use crate::core::error::{PoolError, TaskError};
use crate::core::queue::DrainResult;
use crate::core::sink::{ErrorSink, LoggingSink, TaskFailure};
use crate::core::task::{QueuedTask, Task, TaskId, TaskQueue};

use super::{PoolCounters, PoolStats, ShutdownMode, WorkerState, WorkerStates};

/// State shared between the pool handle, its workers, and async helpers.
struct Shared {
    id: Uuid,
    queue: Arc<TaskQueue>,
    counters: PoolCounters,
    shutdown: AtomicBool,
    task_id_counter: AtomicU64,
}

impl Shared {
    fn admit<T, F>(&self, task: T, push: F) -> Result<TaskId, PoolError>
    where
        T: Task,
        F: FnOnce(&TaskQueue, QueuedTask) -> Result<(), PoolError>,
    {
        if self.shutdown.load(Ordering::Acquire) {
            return Err(PoolError::PoolShutdown);
        }

        let task_id = self.task_id_counter.fetch_add(1, Ordering::Relaxed);
        let queued = QueuedTask {
            id: task_id,
            task: Box::new(task),
        };

        match push(&self.queue, queued) {
            Ok(()) => {
                self.counters.submitted_tasks.fetch_add(1, Ordering::Relaxed);
                debug!(pool_id = %self.id, task_id = task_id, "Task submitted to worker pool");
                Ok(task_id)
            }
            Err(e) => {
                debug!(pool_id = %self.id, task_id = task_id, error = %e, "Task rejected");
                Err(e)
            }
        }
    }
}

/// Worker pool with a fixed set of dedicated OS threads.
///
/// The pool owns one [`TaskQueue`]. Every worker runs
/// dequeue → execute → acknowledge until `shutdown` is called or the pool is
/// dropped. Failures are isolated per task and reported to the pool's
/// [`ErrorSink`] ([`LoggingSink`] unless configured otherwise).
///
/// `WorkerPool` is `Send + Sync`; share it behind an `Arc` to submit from
/// several producer threads.
pub struct WorkerPool {
    /// Pool configuration.
    config: WorkerPoolConfig,

    /// Queue, counters and shutdown flag.
    shared: Arc<Shared>,

    /// Per-worker lifecycle states.
    states: Arc<WorkerStates>,

    /// Thread ids of the workers, fixed at construction.
    worker_threads: Vec<ThreadId>,

    /// Worker thread handles. Drained by `shutdown`.
    workers: Mutex<WorkerHandles>,

    /// Signalled once the first `shutdown` has joined the workers.
    joined: Condvar,
}

struct WorkerHandles {
    handles: Vec<JoinHandle<()>>,
    joined: bool,
}

impl WorkerPool {
    /// Create a pool with a fresh queue and the logging error sink.
    ///
    /// Spawns `config.worker_count` threads before returning.
    ///
    /// # Errors
    ///
    /// - `PoolError::InvalidConfiguration` if the configuration is invalid
    /// - `PoolError::Spawn` if a worker thread cannot be started
    pub fn new(config: WorkerPoolConfig) -> Result<Self, PoolError> {
        Self::with_sink(config, Arc::new(LoggingSink))
    }

    /// Create a pool reporting task failures to `sink`.
    ///
    /// # Errors
    ///
    /// Same as [`WorkerPool::new`].
    pub fn with_sink<S: ErrorSink>(config: WorkerPoolConfig, sink: Arc<S>) -> Result<Self, PoolError> {
        config
            .validate()
            .map_err(PoolError::InvalidConfiguration)?;
        let queue = Arc::new(TaskQueue::new(config.queue_capacity)?);
        Self::start(config, queue, sink)
    }

    /// Spawn workers over an already-built queue.
    pub(crate) fn start(
        mut config: WorkerPoolConfig,
        queue: Arc<TaskQueue>,
        sink: Arc<dyn ErrorSink>,
    ) -> Result<Self, PoolError> {
        config.queue_capacity = queue.capacity();
        config
            .validate()
            .map_err(PoolError::InvalidConfiguration)?;
        if queue.is_closed() {
            return Err(PoolError::InvalidConfiguration(
                "queue is already closed".into(),
            ));
        }

        let shared = Arc::new(Shared {
            id: Uuid::new_v4(),
            queue,
            counters: PoolCounters::default(),
            shutdown: AtomicBool::new(false),
            task_id_counter: AtomicU64::new(0),
        });
        let states = Arc::new(WorkerStates::new(config.worker_count));

        let mut workers = Vec::with_capacity(config.worker_count);
        for worker_id in 0..config.worker_count {
            let ctx = WorkerContext {
                worker_id,
                shared: Arc::clone(&shared),
                sink: Arc::clone(&sink),
                states: Arc::clone(&states),
            };
            match spawn_worker(ctx, &config) {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    error!(
                        pool_id = %shared.id,
                        worker_id = worker_id,
                        error = %e,
                        "Failed to spawn worker thread; tearing down partial pool"
                    );
                    shared.shutdown.store(true, Ordering::Release);
                    drop(shared.queue.stop());
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(PoolError::Spawn(e));
                }
            }
        }

        info!(
            pool_id = %shared.id,
            worker_count = config.worker_count,
            queue_capacity = config.queue_capacity,
            "WorkerPool initialized with dedicated OS threads"
        );

        let worker_threads = workers.iter().map(|h| h.thread().id()).collect();

        Ok(Self {
            config,
            shared,
            states,
            worker_threads,
            workers: Mutex::new(WorkerHandles {
                handles: workers,
                joined: false,
            }),
            joined: Condvar::new(),
        })
    }

    /// Submit a task, blocking while the queue is full.
    ///
    /// # Returns
    ///
    /// The task's identifier, as it appears in any `TaskFailure`. Ids are
    /// unique per pool; a rejected submission still consumes one.
    ///
    /// # Errors
    ///
    /// `PoolError::PoolShutdown` once shutdown has begun, including when
    /// shutdown starts while this call is blocked.
    pub fn submit<T: Task>(&self, task: T) -> Result<TaskId, PoolError> {
        self.shared.admit(task, TaskQueue::enqueue)
    }

    /// Submit a task only if the queue has room right now.
    ///
    /// # Errors
    ///
    /// `PoolError::QueueFull` when at capacity, `PoolError::PoolShutdown`
    /// after shutdown.
    pub fn try_submit<T: Task>(&self, task: T) -> Result<TaskId, PoolError> {
        self.shared.admit(task, TaskQueue::try_enqueue)
    }

    /// Submit a task, blocking at most `timeout` for room.
    ///
    /// # Errors
    ///
    /// `PoolError::Timeout` if the queue stayed full,
    /// `PoolError::PoolShutdown` after shutdown.
    pub fn submit_timeout<T: Task>(&self, task: T, timeout: Duration) -> Result<TaskId, PoolError> {
        self.shared
            .admit(task, |queue, queued| queue.enqueue_timeout(queued, timeout))
    }

    /// Block until every submitted task has been executed and acknowledged.
    ///
    /// Returns immediately when nothing is pending. The pool stays usable.
    pub fn await_completion(&self) {
        self.shared.queue.await_drain();
    }

    /// Like `await_completion`, giving up after `timeout`.
    pub fn await_completion_timeout(&self, timeout: Duration) -> DrainResult {
        self.shared.queue.await_drain_timeout(timeout)
    }

    /// Like `await_completion`, giving up at `deadline`.
    pub fn await_completion_until(&self, deadline: Instant) -> DrainResult {
        self.shared.queue.await_drain_until(deadline)
    }

    /// Submit a task from async code.
    ///
    /// The potentially blocking enqueue runs on tokio's blocking thread pool.
    ///
    /// # Errors
    ///
    /// Same as [`WorkerPool::submit`], plus `PoolError::Internal` if the
    /// blocking task is cancelled.
    #[cfg(feature = "tokio-runtime")]
    pub async fn submit_async<T: Task>(&self, task: T) -> Result<TaskId, PoolError> {
        let shared = Arc::clone(&self.shared);
        tokio::task::spawn_blocking(move || shared.admit(task, TaskQueue::enqueue))
            .await
            .map_err(|e| PoolError::Internal(e.to_string()))?
    }

    /// Wait for completion from async code, optionally bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// `PoolError::Internal` if the blocking wait is cancelled.
    #[cfg(feature = "tokio-runtime")]
    pub async fn await_completion_async(
        &self,
        timeout: Option<Duration>,
    ) -> Result<DrainResult, PoolError> {
        let shared = Arc::clone(&self.shared);
        tokio::task::spawn_blocking(move || match timeout {
            Some(timeout) => shared.queue.await_drain_timeout(timeout),
            None => {
                shared.queue.await_drain();
                DrainResult::Drained
            }
        })
        .await
        .map_err(|e| PoolError::Internal(e.to_string()))
    }

    /// Stop the pool and join every worker.
    ///
    /// Both modes reject new submissions immediately. `Graceful` lets the
    /// workers run everything already queued; `Immediate` discards queued
    /// tasks and lets each worker finish only the task it is running.
    ///
    /// Only the first call acts. Later calls wait for that shutdown to
    /// finish joining and then return, except when made from one of this
    /// pool's workers, which return at once.
    pub fn shutdown(&self, mode: ShutdownMode) {
        let current = thread::current().id();
        let on_worker = self.worker_threads.contains(&current);

        if self.shared.shutdown.swap(true, Ordering::AcqRel) {
            // The first caller may be joining this very worker.
            if !on_worker {
                let mut workers = self.workers.lock();
                while !workers.joined {
                    self.joined.wait(&mut workers);
                }
            }
            return;
        }

        info!(pool_id = %self.shared.id, mode = ?mode, "Shutting down worker pool");

        match mode {
            ShutdownMode::Graceful => {
                self.shared.queue.close();
            }
            ShutdownMode::Immediate => {
                let discarded = self.shared.queue.stop();
                let count = discarded.len();
                drop(discarded);
                if count > 0 {
                    self.shared
                        .counters
                        .discarded_tasks
                        .fetch_add(count as u64, Ordering::Relaxed);
                    warn!(pool_id = %self.shared.id, discarded = count, "Discarded queued tasks");
                }
            }
        }

        let handles = std::mem::take(&mut self.workers.lock().handles);
        let worker_count = handles.len();
        for (idx, worker) in handles.into_iter().enumerate() {
            if worker.thread().id() == current {
                warn!(worker_id = idx, "shutdown called from a worker thread; not joining itself");
                continue;
            }
            match worker.join() {
                Ok(()) => debug!(worker_id = idx, "Worker joined successfully"),
                Err(_) => warn!(worker_id = idx, "Worker panicked"),
            }
        }

        self.workers.lock().joined = true;
        self.joined.notify_all();

        info!(
            pool_id = %self.shared.id,
            worker_count = worker_count,
            "Worker pool shut down complete"
        );
    }

    /// True once `shutdown` has been called.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shared.shutdown.load(Ordering::Acquire)
    }

    /// Identifier stamped on this pool's logs and failures.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    /// Number of worker threads.
    #[must_use]
    pub const fn worker_count(&self) -> usize {
        self.config.worker_count
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &WorkerPoolConfig {
        &self.config
    }

    /// Current state of each worker, indexed by worker id.
    #[must_use]
    pub fn worker_states(&self) -> Vec<WorkerState> {
        self.states.snapshot()
    }

    /// Get current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let mut stats = self
            .shared
            .counters
            .snapshot(self.config.worker_count, self.config.queue_capacity);
        stats.queued_tasks = self.shared.queue.len();
        stats.in_flight_tasks = self.shared.queue.in_flight();
        stats
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("id", &self.shared.id)
            .field("config", &self.config)
            .field("queue", &self.shared.queue)
            .field("shutdown", &self.is_shutdown())
            .finish_non_exhaustive()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Close but don't join: workers finish the queued tasks and exit on
        // their own. Explicit shutdown() is required to wait for them.
        if !self.shared.shutdown.swap(true, Ordering::AcqRel) {
            self.shared.queue.close();
            debug!(pool_id = %self.shared.id, "WorkerPool dropped without explicit shutdown - workers will be detached");
        }
    }
}

/// Everything a worker thread owns.
struct WorkerContext {
    worker_id: usize,
    shared: Arc<Shared>,
    sink: Arc<dyn ErrorSink>,
    states: Arc<WorkerStates>,
}

/// Spawn a worker thread.
fn spawn_worker(ctx: WorkerContext, config: &WorkerPoolConfig) -> std::io::Result<JoinHandle<()>> {
    let mut builder =
        thread::Builder::new().name(format!("{}-{}", config.thread_name_prefix, ctx.worker_id));
    if let Some(stack_size) = config.thread_stack_size {
        builder = builder.stack_size(stack_size);
    }
    builder.spawn(move || run_worker(&ctx))
}

/// Worker loop: Idle (parked in dequeue) → Executing → Idle … → Stopped.
fn run_worker(ctx: &WorkerContext) {
    let worker_id = ctx.worker_id;
    let queue = &ctx.shared.queue;
    let counters = &ctx.shared.counters;
    debug!(worker_id = worker_id, "Worker thread started");

    loop {
        ctx.states.set(worker_id, WorkerState::Idle);
        let Some(queued) = queue.dequeue() else {
            debug!(worker_id = worker_id, "Worker received stop signal, exiting");
            break;
        };

        ctx.states.set(worker_id, WorkerState::Executing);
        let QueuedTask { id: task_id, task } = queued;
        debug!(worker_id = worker_id, task_id = task_id, "Worker executing task");

        let outcome = panic::catch_unwind(AssertUnwindSafe(move || task.execute()))
            .unwrap_or_else(|payload| Err(TaskError::from_panic(payload.as_ref())));

        match outcome {
            Ok(()) => {
                counters.completed_tasks.fetch_add(1, Ordering::Relaxed);
                debug!(worker_id = worker_id, task_id = task_id, "Worker completed task");
            }
            Err(task_error) => {
                counters.failed_tasks.fetch_add(1, Ordering::Relaxed);
                let failure = TaskFailure::new(ctx.shared.id, task_id, worker_id, task_error);
                let sink = &ctx.sink;
                if panic::catch_unwind(AssertUnwindSafe(|| sink.report(failure))).is_err() {
                    error!(worker_id = worker_id, task_id = task_id, "Error sink panicked");
                }
            }
        }

        queue.acknowledge();
    }

    ctx.states.set(worker_id, WorkerState::Stopped);
    debug!(worker_id = worker_id, "Worker thread exiting");
}
