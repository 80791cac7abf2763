//! Tests for configuration validation

use prometheus_task_pool::config::pool::{DEFAULT_QUEUE_CAPACITY, DEFAULT_THREAD_NAME_PREFIX};
use prometheus_task_pool::config::WorkerPoolConfig;

#[test]
fn test_worker_pool_config_defaults() {
    let config = WorkerPoolConfig::default();
    assert!(config.worker_count >= 1);
    assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    assert_eq!(config.thread_name_prefix, DEFAULT_THREAD_NAME_PREFIX);
    assert_eq!(config.thread_stack_size, None);
    assert!(config.validate().is_ok());
}

#[test]
fn test_worker_pool_config_builder_methods() {
    let config = WorkerPoolConfig::new()
        .with_worker_count(3)
        .with_queue_capacity(9)
        .with_thread_name_prefix("encoder")
        .with_thread_stack_size(256 * 1024);
    assert_eq!(config.worker_count, 3);
    assert_eq!(config.queue_capacity, 9);
    assert_eq!(config.thread_name_prefix, "encoder");
    assert_eq!(config.thread_stack_size, Some(256 * 1024));
}

#[test]
fn test_worker_pool_config_invalid_worker_count() {
    let invalid = WorkerPoolConfig::new().with_worker_count(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_worker_pool_config_invalid_queue_capacity() {
    let invalid = WorkerPoolConfig::new().with_queue_capacity(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_worker_pool_config_invalid_stack_size() {
    let invalid = WorkerPoolConfig::new().with_thread_stack_size(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_worker_pool_config_independent_values() {
    let config = WorkerPoolConfig::new()
        .with_worker_count(10)
        .with_queue_capacity(2);
    assert!(config.validate().is_ok());
}

#[test]
fn test_worker_pool_config_from_json() {
    let json = r#"{
        "worker_count": 4,
        "queue_capacity": 32,
        "thread_name_prefix": "ingest"
    }"#;

    let config = WorkerPoolConfig::from_json_str(json).expect("valid config");
    assert_eq!(config.worker_count, 4);
    assert_eq!(config.queue_capacity, 32);
    assert_eq!(config.thread_name_prefix, "ingest");
    assert_eq!(config.thread_stack_size, None);
}

#[test]
fn test_worker_pool_config_from_json_partial() {
    let config = WorkerPoolConfig::from_json_str(r#"{ "queue_capacity": 5 }"#).expect("valid config");
    assert_eq!(config.queue_capacity, 5);
    assert_eq!(config.worker_count, WorkerPoolConfig::default().worker_count);
}

#[test]
fn test_worker_pool_config_from_json_rejects_zero() {
    let err = WorkerPoolConfig::from_json_str(r#"{ "worker_count": 0 }"#).unwrap_err();
    assert_eq!(err, "worker_count must be greater than 0");
}

#[test]
fn test_worker_pool_config_from_json_parse_error() {
    let err = WorkerPoolConfig::from_json_str("{ not json").unwrap_err();
    assert!(err.starts_with("parse error:"));
}
