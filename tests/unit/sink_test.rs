//! Tests for error sinks

use prometheus_task_pool::config::WorkerPoolConfig;
use prometheus_task_pool::core::{
    ChannelSink, ErrorSink, LoggingSink, ShutdownMode, TaskError, TaskFailure, WorkerPool,
};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_channel_sink_receives_pool_failures() {
    let (tx, rx) = crossbeam_channel::unbounded();
    let pool = WorkerPool::with_sink(
        WorkerPoolConfig::new().with_worker_count(2).with_queue_capacity(2),
        Arc::new(ChannelSink::new(tx)),
    )
    .expect("pool");

    let id = pool
        .submit(|| -> Result<(), String> { Err("checksum mismatch".into()) })
        .expect("submit");
    pool.await_completion();

    let failure = rx.recv_timeout(Duration::from_secs(1)).expect("failure");
    assert_eq!(failure.task_id, id);
    assert_eq!(failure.pool_id, pool.id());
    assert_eq!(failure.error, TaskError::Failed("checksum mismatch".into()));
    assert!(failure.worker_id < 2);

    pool.shutdown(ShutdownMode::Graceful);
}

#[test]
fn test_logging_sink_does_not_panic() {
    prometheus_task_pool::util::init_tracing();
    LoggingSink.report(TaskFailure {
        pool_id: uuid::Uuid::nil(),
        task_id: 3,
        worker_id: 1,
        error: TaskError::failed("logged"),
        failed_at_ms: 0,
    });
}
