//! Bounded FIFO with in-flight accounting.
//!
//! The queue is the only mutable state shared between producers and workers.
//! Every mutation happens under a single `parking_lot::Mutex`, and the three
//! suspension points (full, empty, not drained) each park on their own
//! `parking_lot::Condvar`. Nothing polls.
//!
//! An item counts as *in flight* from the moment `dequeue` hands it out until
//! the matching `acknowledge`. The increment happens inside the same critical
//! section that removes the item, so `await_drain` can never observe an empty
//! sequence with a task that has been taken but not yet counted.
//!
//! Termination is queue state rather than a sentinel item:
//!
//! - `close` rejects new items; dequeuers keep draining and get `None` once
//!   the sequence is empty.
//! - `stop` additionally discards whatever is still queued and makes every
//!   dequeuer return `None` immediately.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::warn;

use super::error::PoolError;

/// Outcome of waiting for the queue (or pool) to drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainResult {
    /// Nothing queued and nothing in flight.
    Drained,
    /// The deadline passed first.
    TimedOut,
}

impl DrainResult {
    /// True for `Drained`.
    #[must_use]
    pub const fn is_drained(self) -> bool {
        matches!(self, Self::Drained)
    }
}

struct QueueState<T> {
    items: VecDeque<T>,
    in_flight: usize,
    closed: bool,
    stopped: bool,
}

impl<T> QueueState<T> {
    fn is_drained(&self) -> bool {
        self.items.is_empty() && self.in_flight == 0
    }
}

/// Fixed-capacity, thread-safe FIFO shared by producers and workers.
pub struct BoundedTaskQueue<T> {
    capacity: usize,
    state: Mutex<QueueState<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    drained: Condvar,
}

impl<T> BoundedTaskQueue<T> {
    /// Create a queue holding at most `capacity` pending items.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::InvalidConfiguration` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, PoolError> {
        if capacity == 0 {
            return Err(PoolError::InvalidConfiguration(
                "queue_capacity must be greater than 0".into(),
            ));
        }
        Ok(Self {
            capacity,
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity.min(1024)),
                in_flight: 0,
                closed: false,
                stopped: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            drained: Condvar::new(),
        })
    }

    /// Append `item`, blocking while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::PoolShutdown` if the queue is closed, including
    /// when it closes while this call is blocked.
    pub fn enqueue(&self, item: T) -> Result<(), PoolError> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(PoolError::PoolShutdown);
            }
            if state.items.len() < self.capacity {
                break;
            }
            self.not_full.wait(&mut state);
        }
        self.push_locked(&mut state, item);
        Ok(())
    }

    /// Append `item` only if there is room right now.
    ///
    /// # Errors
    ///
    /// `PoolError::QueueFull` when at capacity, `PoolError::PoolShutdown`
    /// when closed.
    pub fn try_enqueue(&self, item: T) -> Result<(), PoolError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(PoolError::PoolShutdown);
        }
        if state.items.len() >= self.capacity {
            return Err(PoolError::QueueFull);
        }
        self.push_locked(&mut state, item);
        Ok(())
    }

    /// Append `item`, blocking at most `timeout` for room.
    ///
    /// A timeout too large to express as a deadline blocks without one.
    ///
    /// # Errors
    ///
    /// `PoolError::Timeout` if no slot frees up in time,
    /// `PoolError::PoolShutdown` when closed.
    pub fn enqueue_timeout(&self, item: T, timeout: Duration) -> Result<(), PoolError> {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.enqueue_until(item, deadline),
            None => self.enqueue(item),
        }
    }

    /// Append `item`, blocking until `deadline` at most for room.
    ///
    /// # Errors
    ///
    /// Same as [`Self::enqueue_timeout`].
    pub fn enqueue_until(&self, item: T, deadline: Instant) -> Result<(), PoolError> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(PoolError::PoolShutdown);
            }
            if state.items.len() < self.capacity {
                break;
            }
            if self.not_full.wait_until(&mut state, deadline).timed_out()
                && state.items.len() >= self.capacity
                && !state.closed
            {
                return Err(PoolError::Timeout);
            }
        }
        self.push_locked(&mut state, item);
        Ok(())
    }

    fn push_locked(&self, state: &mut QueueState<T>, item: T) {
        state.items.push_back(item);
        self.not_empty.notify_one();
    }

    /// Remove the head, blocking while the queue is empty.
    ///
    /// The returned item is counted as in flight until `acknowledge`.
    /// Returns `None` once the queue is stopped, or closed with nothing left.
    pub fn dequeue(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if state.stopped {
                return None;
            }
            if let Some(item) = state.items.pop_front() {
                state.in_flight += 1;
                self.not_full.notify_one();
                return Some(item);
            }
            if state.closed {
                return None;
            }
            self.not_empty.wait(&mut state);
        }
    }

    /// Mark one dequeued item as finished.
    pub fn acknowledge(&self) {
        let mut state = self.state.lock();
        if state.in_flight == 0 {
            warn!("acknowledge called with nothing in flight; ignoring");
            return;
        }
        state.in_flight -= 1;
        if state.is_drained() {
            self.drained.notify_all();
        }
    }

    /// Block until nothing is queued and nothing is in flight.
    pub fn await_drain(&self) {
        let mut state = self.state.lock();
        while !state.is_drained() {
            self.drained.wait(&mut state);
        }
    }

    /// Like `await_drain`, giving up after `timeout`.
    ///
    /// A timeout too large to express as a deadline waits without one.
    pub fn await_drain_timeout(&self, timeout: Duration) -> DrainResult {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.await_drain_until(deadline),
            None => {
                self.await_drain();
                DrainResult::Drained
            }
        }
    }

    /// Like `await_drain`, giving up at `deadline`.
    pub fn await_drain_until(&self, deadline: Instant) -> DrainResult {
        let mut state = self.state.lock();
        while !state.is_drained() {
            if self.drained.wait_until(&mut state, deadline).timed_out() {
                return if state.is_drained() {
                    DrainResult::Drained
                } else {
                    DrainResult::TimedOut
                };
            }
        }
        DrainResult::Drained
    }

    /// Stop accepting items. Queued items are still handed out.
    ///
    /// Returns `false` if the queue was already closed.
    pub fn close(&self) -> bool {
        let mut state = self.state.lock();
        if state.closed {
            return false;
        }
        state.closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
        true
    }

    /// Close the queue, discard pending items, and release every dequeuer.
    ///
    /// In-flight items are unaffected; they still need `acknowledge`.
    /// Returns the discarded items in queue order.
    pub fn stop(&self) -> Vec<T> {
        let mut state = self.state.lock();
        state.closed = true;
        state.stopped = true;
        let discarded: Vec<T> = state.items.drain(..).collect();
        self.not_empty.notify_all();
        self.not_full.notify_all();
        if state.is_drained() {
            self.drained.notify_all();
        }
        discarded
    }

    /// Maximum number of pending items.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of pending items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// True when nothing is pending (items may still be in flight).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    /// Number of dequeued, unacknowledged items.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }

    /// True when nothing is pending and nothing is in flight.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.state.lock().is_drained()
    }

    /// True once `close` or `stop` has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl<T> std::fmt::Debug for BoundedTaskQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BoundedTaskQueue")
            .field("capacity", &self.capacity)
            .field("len", &state.items.len())
            .field("in_flight", &state.in_flight)
            .field("closed", &state.closed)
            .field("stopped", &state.stopped)
            .finish()
    }
}
