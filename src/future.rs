//! Future-like result handles for submitted computations.
//!
//! A [`ResultHandle`] ties a `submit_with_result` call to a one-shot,
//! single-consumer fulfillment slot: a protected optional value plus a
//! condvar. The executing task stores the computation's value, or its
//! captured failure, into the slot *before* the pool's completion guard
//! fires, so a returned `get()` implies the task has also been retired from
//! the active count.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::error::TaskError;

type Fulfillment<T> = Option<Result<T, TaskError>>;

/// One-shot fulfillment slot shared between the wrapping task and the handle.
pub(crate) struct Slot<T> {
    value: Mutex<Fulfillment<T>>,
    ready: Condvar,
}

impl<T> Slot<T> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            value: Mutex::new(None),
            ready: Condvar::new(),
        })
    }

    /// Store the outcome and wake the consumer. Single-producer: called at
    /// most once, by the wrapping task.
    pub(crate) fn fulfill(&self, result: Result<T, TaskError>) {
        let mut value = self.value.lock().expect("fulfillment mutex poisoned");
        debug_assert!(value.is_none(), "fulfillment slot filled twice");
        *value = Some(result);
        drop(value);
        self.ready.notify_all();
    }
}

/// Handle to a computation's eventual value or failure.
///
/// Single-consumer: [`get`](ResultHandle::get) consumes the handle. The
/// non-consuming observers [`wait`](ResultHandle::wait),
/// [`wait_for`](ResultHandle::wait_for) and
/// [`is_ready`](ResultHandle::is_ready) may be called any number of times
/// first.
pub struct ResultHandle<T> {
    slot: Arc<Slot<T>>,
}

impl<T> ResultHandle<T> {
    pub(crate) fn new(slot: Arc<Slot<T>>) -> Self {
        Self { slot }
    }

    /// Block until the computation completes, then return its value or the
    /// failure it raised.
    pub fn get(self) -> Result<T, TaskError> {
        let mut value = self.slot.value.lock().expect("fulfillment mutex poisoned");
        loop {
            if let Some(result) = value.take() {
                return result;
            }
            value = self
                .slot
                .ready
                .wait(value)
                .expect("fulfillment mutex poisoned");
        }
    }

    /// Block until the computation completes, without consuming the result.
    pub fn wait(&self) {
        let mut value = self.slot.value.lock().expect("fulfillment mutex poisoned");
        while value.is_none() {
            value = self
                .slot
                .ready
                .wait(value)
                .expect("fulfillment mutex poisoned");
        }
    }

    /// Bounded wait. Returns `true` if the computation completed within
    /// `timeout`.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut value = self.slot.value.lock().expect("fulfillment mutex poisoned");
        while value.is_none() {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _timeout_result) = self
                .slot
                .ready
                .wait_timeout(value, deadline - now)
                .expect("fulfillment mutex poisoned");
            value = guard;
        }
        true
    }

    /// Non-blocking readiness check.
    pub fn is_ready(&self) -> bool {
        self.slot
            .value
            .lock()
            .expect("fulfillment mutex poisoned")
            .is_some()
    }
}
