//! # Prometheus Task Pool
//!
//! A bounded task queue drained by a fixed pool of worker threads.
//!
//! Producers hand units of work to the pool; a fixed set of dedicated OS
//! threads pulls them off a shared FIFO and runs them in parallel. The queue
//! has a hard capacity, so producers feel back-pressure instead of growing an
//! unbounded backlog, and it tracks which tasks are still running so a caller
//! can wait until everything it submitted has actually finished.
//!
//! ## Key Features
//!
//! - **Bounded FIFO**: `submit` blocks while the queue is full; arrival order is
//!   preserved across all producers
//! - **Drain tracking**: `await_completion` waits for queued *and* running work,
//!   with deadline variants that report `DrainResult::TimedOut`
//! - **Failure isolation**: a task returning an error or panicking is reported to
//!   an [`ErrorSink`](crate::core::ErrorSink); the worker and the pool carry on
//! - **Explicit shutdown**: graceful (finish queued work) or immediate (finish only
//!   running tasks), broadcast to every worker without sentinel values
//! - **Async bridge**: `submit_async` / `await_completion_async` behind the
//!   `tokio-runtime` feature
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use prometheus_task_pool::config::WorkerPoolConfig;
//! use prometheus_task_pool::core::{DrainResult, ShutdownMode, WorkerPool};
//!
//! let pool = WorkerPool::new(
//!     WorkerPoolConfig::new()
//!         .with_worker_count(4)
//!         .with_queue_capacity(8),
//! )?;
//!
//! for i in 0..20_u64 {
//!     pool.submit(move || {
//!         std::thread::sleep(Duration::from_millis(i % 3));
//!     })?;
//! }
//!
//! assert_eq!(
//!     pool.await_completion_timeout(Duration::from_secs(10)),
//!     DrainResult::Drained
//! );
//! pool.shutdown(ShutdownMode::Graceful);
//! # Ok::<(), prometheus_task_pool::core::PoolError>(())
//! ```
//!
//! For complete examples, see:
//! - `tests/worker_pool_test.rs` - Full integration tests
//! - `demos/cpu_waster.rs` - Ten workers, fifteen sleeping tasks

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Queue, task, sink and worker pool abstractions.
pub mod core;
/// Configuration models for the worker pool.
pub mod config;
/// Builders to construct pools from configuration.
pub mod builders;
/// Shared utilities.
pub mod util;
