//! Error sinks receiving task failures.
//!
//! Workers never propagate a task's error. They package it as a
//! [`TaskFailure`] and hand it to the pool's sink before acknowledging the
//! task, so a caller returning from `await_completion` sees every failure of
//! the work it waited for.

use std::collections::VecDeque;

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use uuid::Uuid;

use super::error::TaskError;
use super::task::TaskId;
use crate::util::clock::now_ms;

/// A captured task failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    /// Pool that ran the task.
    pub pool_id: Uuid,
    /// Task identifier returned by `submit`.
    pub task_id: TaskId,
    /// Worker index that ran the task.
    pub worker_id: usize,
    /// What went wrong.
    pub error: TaskError,
    /// Timestamp milliseconds.
    pub failed_at_ms: u128,
}

impl TaskFailure {
    pub(crate) fn new(pool_id: Uuid, task_id: TaskId, worker_id: usize, error: TaskError) -> Self {
        Self {
            pool_id,
            task_id,
            worker_id,
            error,
            failed_at_ms: now_ms(),
        }
    }
}

/// Destination for task failures.
///
/// Called from worker threads, possibly concurrently.
pub trait ErrorSink: Send + Sync + 'static {
    /// Record one failure.
    fn report(&self, failure: TaskFailure);
}

impl<F> ErrorSink for F
where
    F: Fn(TaskFailure) + Send + Sync + 'static,
{
    fn report(&self, failure: TaskFailure) {
        self(failure);
    }
}

/// Default sink: logs each failure at `error` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSink;

impl ErrorSink for LoggingSink {
    fn report(&self, failure: TaskFailure) {
        tracing::error!(
            pool_id = %failure.pool_id,
            task_id = failure.task_id,
            worker_id = failure.worker_id,
            error = %failure.error,
            "Task execution failed"
        );
    }
}

/// In-memory sink keeping the most recent failures, for tests and dev.
#[derive(Debug)]
pub struct CollectingSink {
    failures: Mutex<VecDeque<TaskFailure>>,
    max_failures: usize,
}

impl CollectingSink {
    /// Create a sink retaining at most `max_failures` entries.
    #[must_use]
    pub fn new(max_failures: usize) -> Self {
        Self {
            failures: Mutex::new(VecDeque::with_capacity(max_failures.min(1024))),
            max_failures,
        }
    }

    /// Snapshot of retained failures, oldest first.
    #[must_use]
    pub fn failures(&self) -> Vec<TaskFailure> {
        self.failures.lock().iter().cloned().collect()
    }

    /// Number of retained failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.lock().len()
    }

    /// True when nothing has been retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }
}

impl ErrorSink for CollectingSink {
    fn report(&self, failure: TaskFailure) {
        let mut failures = self.failures.lock();
        if self.max_failures == 0 {
            return;
        }
        if failures.len() >= self.max_failures {
            failures.pop_front();
        }
        failures.push_back(failure);
    }
}

/// Forwards failures over a crossbeam channel.
///
/// A disconnected receiver falls back to logging.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<TaskFailure>,
}

impl ChannelSink {
    /// Wrap an existing sender.
    #[must_use]
    pub const fn new(tx: Sender<TaskFailure>) -> Self {
        Self { tx }
    }
}

impl ErrorSink for ChannelSink {
    fn report(&self, failure: TaskFailure) {
        if let Err(err) = self.tx.send(failure) {
            LoggingSink.report(err.into_inner());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn failure(task_id: TaskId) -> TaskFailure {
        TaskFailure::new(Uuid::nil(), task_id, 0, TaskError::failed("boom"))
    }

    #[test]
    fn test_collecting_sink_overflow() {
        let sink = CollectingSink::new(2);
        sink.report(failure(1));
        sink.report(failure(2));
        sink.report(failure(3));

        let ids: Vec<_> = sink.failures().iter().map(|f| f.task_id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_collecting_sink_zero_capacity() {
        let sink = CollectingSink::new(0);
        sink.report(failure(1));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_closure_sink() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let sink = move |_failure: TaskFailure| {
            counter.fetch_add(1, Ordering::Relaxed);
        };
        sink.report(failure(1));
        sink.report(failure(2));
        assert_eq!(count.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_channel_sink_forwards() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let sink = ChannelSink::new(tx);
        sink.report(failure(7));
        assert_eq!(rx.recv().unwrap().task_id, 7);
    }

    #[test]
    fn test_channel_sink_disconnected_does_not_panic() {
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(rx);
        ChannelSink::new(tx).report(failure(1));
    }

    #[test]
    fn test_failure_timestamp_set() {
        assert!(failure(1).failed_at_ms > 0);
    }
}
