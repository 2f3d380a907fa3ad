//! Active-task accounting and quiescence signaling.
//!
//! A single non-negative counter tracks every task that has been submitted
//! but whose completion guard has not yet fired. It is incremented *before*
//! a task becomes visible in any deque and decremented exactly once after
//! the task's invocation completes, on every exit path. `wait_for_zero`
//! blocks callers until the counter reaches zero.
//!
//! # Locking discipline
//!
//! The mutex guards nothing but the condvar handshake. Waiters hold it only
//! around the condition wait; the decrement path locks and immediately
//! unlocks it before signaling, which closes the window where a waiter has
//! checked the counter but not yet parked. The signal itself is sent without
//! holding the lock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};

/// Count of not-yet-completed tasks plus a completion signaling channel.
#[derive(Debug, Default)]
pub struct ActiveTaskCounter {
    count: AtomicUsize,
    lock: Mutex<()>,
    quiescent: Condvar,
}

impl ActiveTaskCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more in-flight task.
    ///
    /// Must happen before the task is published to any deque so that the
    /// counter never under-reports.
    #[inline]
    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::Release);
    }

    /// Retire one task; wakes all waiters when the count hits zero.
    pub fn decrement(&self) {
        let prev = self.count.fetch_sub(1, Ordering::Release);
        debug_assert!(prev > 0, "active task counter underflow");
        if prev == 1 {
            // Pass through the lock so a waiter between its counter check and
            // its park cannot miss this wakeup, then signal lock-free.
            drop(self.lock.lock().expect("completion mutex poisoned"));
            self.quiescent.notify_all();
        }
    }

    /// Current count; pairs with the release increment/decrement.
    #[inline]
    pub fn load(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.load() == 0
    }

    /// Block until the count reaches zero. Handles spurious wakeups.
    ///
    /// Re-entrant across distinct callers. Must not be called from a worker
    /// thread executing a task: the task counts itself as active and would
    /// block its own retirement.
    pub fn wait_for_zero(&self) {
        let mut guard = self.lock.lock().expect("completion mutex poisoned");
        while self.load() != 0 {
            guard = self
                .quiescent
                .wait(guard)
                .expect("completion mutex poisoned");
        }
    }
}

/// Scoped decrement around task invocation.
///
/// Armed before the task runs; the drop runs on every exit path, normal
/// return or panic, and is the sole mechanism that decrements the counter.
/// Lost decrements on task failure are therefore impossible.
pub struct CompletionGuard<'a> {
    counter: &'a ActiveTaskCounter,
}

impl<'a> CompletionGuard<'a> {
    pub fn arm(counter: &'a ActiveTaskCounter) -> Self {
        Self { counter }
    }
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        self.counter.decrement();
    }
}

/// Scoped rollback for a submission in progress.
///
/// `submit` increments the counter before it publishes the task. If the
/// publish never happens (the submitting code unwinds between increment and
/// enqueue), the drop undoes the increment. Publishing code calls
/// [`commit`](SubmitGuard::commit) to disarm the rollback.
pub struct SubmitGuard<'a> {
    counter: &'a ActiveTaskCounter,
    committed: bool,
}

impl<'a> SubmitGuard<'a> {
    pub fn arm(counter: &'a ActiveTaskCounter) -> Self {
        Self {
            counter,
            committed: false,
        }
    }

    /// The task is now owned by a deque; keep the increment.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.counter.decrement();
        }
    }
}
