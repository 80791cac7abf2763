//! Worker pool configuration.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default number of pending tasks the queue holds before `submit` blocks.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Default worker thread name prefix; threads are named `{prefix}-{index}`.
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "task-worker";

/// Environment variable overriding `worker_count`.
pub const ENV_WORKER_COUNT: &str = "TASK_POOL_WORKER_COUNT";
/// Environment variable overriding `queue_capacity`.
pub const ENV_QUEUE_CAPACITY: &str = "TASK_POOL_QUEUE_CAPACITY";
/// Environment variable overriding `thread_name_prefix`.
pub const ENV_THREAD_PREFIX: &str = "TASK_POOL_THREAD_PREFIX";
/// Environment variable overriding `thread_stack_size`.
pub const ENV_THREAD_STACK_SIZE: &str = "TASK_POOL_THREAD_STACK_SIZE";

/// Worker pool configuration.
///
/// Worker count and queue capacity are independent: the first bounds
/// parallelism, the second bounds how much work may wait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerPoolConfig {
    /// Number of worker threads.
    pub worker_count: usize,
    /// Maximum pending tasks before producers block.
    pub queue_capacity: usize,
    /// Prefix for worker thread names.
    pub thread_name_prefix: String,
    /// Stack size for worker threads; the platform default when unset.
    pub thread_stack_size: Option<usize>,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get().max(1),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.into(),
            thread_stack_size: None,
        }
    }
}

impl WorkerPoolConfig {
    /// Configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    #[must_use]
    pub const fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the queue capacity.
    #[must_use]
    pub const fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Set the worker thread name prefix.
    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the worker thread stack size in bytes.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, bytes: usize) -> Self {
        self.thread_stack_size = Some(bytes);
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_count == 0 {
            return Err("worker_count must be greater than 0".into());
        }
        if self.queue_capacity == 0 {
            return Err("queue_capacity must be greater than 0".into());
        }
        if self.thread_stack_size == Some(0) {
            return Err("thread_stack_size must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from the environment, loading `.env` first.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a description of an unparsable variable or invalid result.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = parse_var(&lookup, ENV_WORKER_COUNT)? {
            cfg.worker_count = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_QUEUE_CAPACITY)? {
            cfg.queue_capacity = v;
        }
        if let Some(v) = lookup(ENV_THREAD_PREFIX) {
            cfg.thread_name_prefix = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_THREAD_STACK_SIZE)? {
            cfg.thread_stack_size = Some(v);
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, String>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| format!("{key}={raw:?}: {e}"))
        })
        .transpose()
}
