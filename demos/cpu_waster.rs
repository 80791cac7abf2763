//! Ten workers, fifteen sleepy tasks.
//!
//! Five tasks wait in the queue until a worker frees up. Run with:
//!
//! ```text
//! RUST_LOG=info cargo run --example cpu_waster
//! ```

use std::thread;
use std::time::Duration;

use prometheus_task_pool::core::{AppResult, ShutdownMode};
use prometheus_task_pool::util::init_tracing;
use prometheus_task_pool::builders::WorkerPoolBuilder;

const WORKERS: usize = 10;

fn cpu_waster(i: usize) {
    let current = thread::current();
    let name = current.name().unwrap_or("unnamed");
    tracing::info!(task = i, worker = name, "task started");
    thread::sleep(Duration::from_millis(500));
    tracing::info!(task = i, worker = name, "task completed");
}

fn main() -> AppResult<()> {
    init_tracing();

    let pool = WorkerPoolBuilder::new()
        .worker_count(WORKERS)
        .queue_capacity(WORKERS)
        .thread_name_prefix("waster")
        .build()?;

    for i in 0..WORKERS + 5 {
        pool.submit(move || cpu_waster(i))?;
    }
    tracing::info!("all tasks submitted");

    pool.await_completion();
    tracing::info!(stats = ?pool.stats(), "all tasks completed");

    pool.shutdown(ShutdownMode::Graceful);
    Ok(())
}
