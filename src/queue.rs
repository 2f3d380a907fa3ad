//! Mutex-guarded work-stealing deque.
//!
//! Each worker owns one deque: the owner pushes and pops at the back (LIFO,
//! recently pushed tasks are hot in cache and near the current position in
//! the computation), thieves remove from the front (FIFO, oldest and most
//! coarse-grained tasks, far from the owner's hot end). One more instance
//! serves as the global overflow store with the same contract.
//!
//! All operations take the internal lock for a bounded critical section; the
//! lock is never held across task execution. Tasks are moved in and moved
//! out, never cloned.

use std::collections::VecDeque;
use std::sync::Mutex;

/// The unit of work: an owned invocable with no input and no return.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Double-ended task container; LIFO for its owner, FIFO for thieves.
///
/// Exactly one thread conceptually owns the back end ([`push_back`],
/// [`try_push_back`], [`try_pop_back`]); any thread may call
/// [`try_steal_front`]. The structure itself does not enforce the ownership
/// convention, the scheduler does.
///
/// [`push_back`]: WorkStealingQueue::push_back
/// [`try_push_back`]: WorkStealingQueue::try_push_back
/// [`try_pop_back`]: WorkStealingQueue::try_pop_back
/// [`try_steal_front`]: WorkStealingQueue::try_steal_front
#[derive(Default)]
pub struct WorkStealingQueue {
    inner: Mutex<VecDeque<Task>>,
}

impl std::fmt::Debug for WorkStealingQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkStealingQueue").finish_non_exhaustive()
    }
}

impl WorkStealingQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
        }
    }

    /// Append a task; always succeeds.
    pub fn push_back(&self, task: Task) {
        self.lock().push_back(task);
    }

    /// Append a task iff the current size is below `cap`.
    ///
    /// On rejection the task is handed back to the caller for re-routing.
    pub fn try_push_back(&self, task: Task, cap: usize) -> Result<(), Task> {
        let mut deque = self.lock();
        if deque.len() >= cap {
            return Err(task);
        }
        deque.push_back(task);
        Ok(())
    }

    /// Remove and return the most recently pushed task.
    pub fn try_pop_back(&self) -> Option<Task> {
        self.lock().pop_back()
    }

    /// Remove and return the oldest task.
    pub fn try_steal_front(&self) -> Option<Task> {
        self.lock().pop_front()
    }

    /// Snapshot of the current size; advisory only.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Snapshot emptiness check; advisory only.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Task>> {
        // The lock is only ever held for queue mutation, never across task
        // execution, so a poisoned mutex means a bug in this module itself.
        self.inner.lock().expect("work-stealing queue mutex poisoned")
    }
}
