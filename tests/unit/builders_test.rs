//! Tests for builder modules

use prometheus_task_pool::builders::WorkerPoolBuilder;
use prometheus_task_pool::config::WorkerPoolConfig;
use prometheus_task_pool::core::{PoolError, ShutdownMode};

#[test]
fn test_pool_builder_defaults() {
    let builder = WorkerPoolBuilder::new();
    assert_eq!(builder.config(), &WorkerPoolConfig::default());
}

#[test]
fn test_pool_builder_overrides() {
    let builder = WorkerPoolBuilder::from_config(WorkerPoolConfig::new().with_queue_capacity(5))
        .worker_count(2)
        .thread_name_prefix("resize");
    assert_eq!(builder.config().worker_count, 2);
    assert_eq!(builder.config().queue_capacity, 5);
    assert_eq!(builder.config().thread_name_prefix, "resize");
}

#[test]
fn test_pool_builder_rejects_zero_workers() {
    let result = WorkerPoolBuilder::new().worker_count(0).build();
    assert!(matches!(result, Err(PoolError::InvalidConfiguration(_))));
}

#[test]
fn test_pool_builder_rejects_zero_capacity() {
    let result = WorkerPoolBuilder::new().queue_capacity(0).build();
    assert!(matches!(result, Err(PoolError::InvalidConfiguration(_))));
}

#[test]
fn test_pool_builder_builds_running_pool() {
    let pool = WorkerPoolBuilder::new()
        .worker_count(3)
        .queue_capacity(4)
        .build()
        .expect("pool");
    assert_eq!(pool.worker_count(), 3);
    assert_eq!(pool.worker_states().len(), 3);
    pool.shutdown(ShutdownMode::Immediate);
}
