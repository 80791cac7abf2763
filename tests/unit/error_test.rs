//! Tests for error types

use prometheus_task_pool::core::{AppResult, PoolError, TaskError};

#[test]
fn test_invalid_configuration_error() {
    let err = PoolError::InvalidConfiguration("worker_count must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: worker_count must be greater than 0"
    );
}

#[test]
fn test_pool_shutdown_error() {
    assert_eq!(format!("{}", PoolError::PoolShutdown), "pool has been shut down");
}

#[test]
fn test_queue_full_and_timeout_errors() {
    assert_eq!(format!("{}", PoolError::QueueFull), "task queue is full");
    assert_eq!(format!("{}", PoolError::Timeout), "operation timed out");
}

#[test]
fn test_spawn_error_keeps_source() {
    use std::error::Error;

    let err = PoolError::Spawn(std::io::Error::other("no threads left"));
    assert_eq!(
        format!("{}", err),
        "failed to spawn worker thread: no threads left"
    );
    assert!(err.source().is_some());
}

#[test]
fn test_task_errors() {
    assert_eq!(
        format!("{}", TaskError::failed("bad row 7")),
        "task failed: bad row 7"
    );
    assert_eq!(
        format!("{}", TaskError::Panicked("index out of bounds".into())),
        "task panicked: index out of bounds"
    );
}

#[test]
fn test_app_result_wraps_pool_error() {
    fn start() -> AppResult<()> {
        Err(PoolError::PoolShutdown.into())
    }

    let err = start().unwrap_err();
    assert!(err.downcast_ref::<PoolError>().is_some());
}
