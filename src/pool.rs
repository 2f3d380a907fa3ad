//! Work-stealing thread pool.
//!
//! The pool owns N worker threads, N deques (one per worker), and one
//! overflow deque shared by everyone. Submissions land in a randomly chosen
//! worker deque, or in the overflow store when that deque is at capacity.
//! Workers drain their own deque LIFO, steal from peers FIFO, fall back to
//! the overflow store, and otherwise sleep.
//!
//! # Lifecycle
//!
//! Workers start at construction and are joined exactly once, either by an
//! explicit [`shutdown`](ThreadPool::shutdown) or by `Drop`. Shutdown drains:
//! a worker exits its loop only once the stop flag is set *and* no task is
//! in flight, so work submitted before shutdown (including tasks spawned by
//! other tasks near shutdown) always completes.
//!
//! # Correctness invariants
//!
//! - The active count is incremented before a task becomes visible in any
//!   deque and decremented exactly once after its invocation completes.
//! - A task is resident in exactly one deque at a time and is removed before
//!   being invoked.
//! - After the workers join, every counted task has been executed and the
//!   active count is zero.

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::active::{ActiveTaskCounter, SubmitGuard};
use crate::config::PoolOptions;
use crate::error::{ConfigError, SubmitError, TaskError};
use crate::future::{ResultHandle, Slot};
use crate::queue::{Task, WorkStealingQueue};
use crate::rng::SchedRng;
use crate::stats::{StatsCounters, StatsSnapshot};
use crate::worker;

/// State shared between the pool handle and its workers.
#[derive(Debug)]
pub(crate) struct Shared {
    /// One deque per worker, indexed by worker id.
    pub(crate) queues: Vec<WorkStealingQueue>,
    /// Fallback store for submissions that find their target deque full.
    /// Pushed at the back by submitters, drained at the front by workers, so
    /// older overflowed tasks run first.
    pub(crate) overflow: WorkStealingQueue,
    /// Stop flag; published with release, observed with acquire.
    pub(crate) shutdown: AtomicBool,
    pub(crate) active: ActiveTaskCounter,
    pub(crate) stats: StatsCounters,
    /// Immutable after construction.
    pub(crate) options: PoolOptions,
}

impl Shared {
    #[inline]
    pub(crate) fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}

/// Fixed-size pool of worker threads executing short, independent tasks.
///
/// # Example
///
/// ```
/// use taskpool_rs::{PoolOptions, ThreadPool};
///
/// let pool = ThreadPool::new(PoolOptions::default()).unwrap();
/// let handle = pool.submit_with_result(|| 21 * 2).unwrap();
/// assert_eq!(handle.get().unwrap(), 42);
/// ```
#[derive(Debug)]
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Validate `options` and start the workers.
    pub fn new(options: PoolOptions) -> Result<Self, ConfigError> {
        options.validate()?;

        let queues = (0..options.threads)
            .map(|_| WorkStealingQueue::new())
            .collect();
        let shared = Arc::new(Shared {
            queues,
            overflow: WorkStealingQueue::new(),
            shutdown: AtomicBool::new(false),
            active: ActiveTaskCounter::new(),
            stats: StatsCounters::new(),
            options,
        });

        let mut workers = Vec::with_capacity(options.threads);
        for index in 0..options.threads {
            let shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("taskpool-worker-{index}"))
                .spawn(move || worker::run(index, &shared))
                .expect("failed to spawn worker thread");
            workers.push(handle);
        }

        Ok(Self { shared, workers })
    }

    /// Construct with [`PoolOptions::default`].
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::new(PoolOptions::default())
    }

    /// Submit a fire-and-forget task.
    ///
    /// The task runs on some worker thread at some later point. A panic
    /// inside it is isolated at the worker boundary: logged, swallowed, and
    /// without effect on the worker, the pool, or any sibling task.
    ///
    /// # Errors
    ///
    /// [`SubmitError::ShuttingDown`] once the pool has been instructed to
    /// stop; no state is changed for a rejected submission.
    pub fn submit<F>(&self, f: F) -> Result<(), SubmitError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit_task(Box::new(f))
    }

    fn submit_task(&self, task: Task) -> Result<(), SubmitError> {
        if self.shared.shutdown_requested() {
            return Err(SubmitError::ShuttingDown);
        }

        // Count the task before it can become visible anywhere, and arm the
        // rollback in case publication never happens.
        self.shared.active.increment();
        self.shared.stats.record_submitted();
        let guard = SubmitGuard::arm(&self.shared.active);

        let target = self.random_worker();
        let task = match self.shared.queues[target]
            .try_push_back(task, self.shared.options.max_queue_tasks)
        {
            Ok(()) => {
                guard.commit();
                return Ok(());
            }
            Err(task) => task,
        };

        // Target deque at capacity: the overflow store never rejects.
        self.shared.overflow.push_back(task);
        guard.commit();
        Ok(())
    }

    /// Submit a computation and obtain a handle to its eventual result.
    ///
    /// The closure's return value, or the failure it panics with, is stored
    /// into the handle's fulfillment slot before the task retires, so a
    /// returned [`ResultHandle::get`] implies the active count no longer
    /// includes this task.
    pub fn submit_with_result<T, F>(&self, f: F) -> Result<ResultHandle<T>, SubmitError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let slot = Slot::new();
        let task_slot = Arc::clone(&slot);
        self.submit(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(f)).map_err(TaskError::from_panic);
            task_slot.fulfill(result);
        })?;
        Ok(ResultHandle::new(slot))
    }

    /// Block until every previously submitted task has retired.
    ///
    /// Re-entrant across distinct submitters. Must NOT be called from inside
    /// a task running on this pool: the task counts itself as active and
    /// would block its own retirement.
    pub fn wait(&self) {
        self.shared.active.wait_for_zero();
    }

    /// Stop the pool: set the stop flag, drain pending work, join all
    /// workers. Idempotent; only the first call transitions the state.
    ///
    /// Pending tasks are drained, not dropped: workers keep executing until
    /// the active count reaches zero.
    pub fn shutdown(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }

    /// Monotonic counter snapshot.
    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Number of tasks submitted and not yet retired.
    pub fn active_tasks(&self) -> usize {
        self.shared.active.load()
    }

    /// Number of worker threads.
    pub fn thread_count(&self) -> usize {
        self.shared.options.threads
    }

    /// Uniformly random worker index from the submitting thread's own PRNG.
    fn random_worker(&self) -> usize {
        thread_local! {
            static SUBMIT_RNG: RefCell<SchedRng> = RefCell::new(SchedRng::from_entropy());
        }
        let n = self.shared.options.threads;
        SUBMIT_RNG.with(|rng| rng.borrow_mut().next_below(n))
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StealPolicy;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn small_pool(threads: usize) -> ThreadPool {
        ThreadPool::new(PoolOptions {
            threads,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn construction_rejects_invalid_options() {
        let err = ThreadPool::new(PoolOptions {
            threads: 0,
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::ZeroThreads);
    }

    #[test]
    fn submit_and_wait() {
        let pool = small_pool(4);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..100 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        }
        pool.wait();
        assert_eq!(counter.load(Ordering::Relaxed), 100);
        assert_eq!(pool.active_tasks(), 0);
    }

    #[test]
    fn wait_with_no_tasks_returns_immediately() {
        let pool = small_pool(2);
        pool.wait();
    }

    #[test]
    fn single_worker_pool_executes_everything() {
        let pool = small_pool(1);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..1000 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        }
        pool.wait();
        assert_eq!(counter.load(Ordering::Relaxed), 1000);
    }

    #[test]
    fn submit_with_result_round_trip() {
        let pool = small_pool(2);
        let handle = pool.submit_with_result(|| 6 * 7).unwrap();
        assert_eq!(handle.get().unwrap(), 42);
    }

    #[test]
    fn round_robin_policy_executes_everything() {
        let pool = ThreadPool::new(PoolOptions {
            threads: 4,
            steal_policy: StealPolicy::RoundRobin,
            ..Default::default()
        })
        .unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..500 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        }
        pool.wait();
        assert_eq!(counter.load(Ordering::Relaxed), 500);
    }

    #[test]
    fn stats_reflect_submissions_and_executions() {
        let pool = small_pool(3);
        for _ in 0..50 {
            pool.submit(|| {}).unwrap();
        }
        pool.wait();

        let snap = pool.stats();
        assert_eq!(snap.tasks_submitted, 50);
        // Execution counts are bumped before the completion guard fires, so
        // quiescence implies they are all visible.
        assert_eq!(snap.tasks_executed, 50);
        assert!(snap.tasks_stolen <= snap.tasks_executed);
    }

    #[test]
    fn shutdown_is_idempotent() {
        let mut pool = small_pool(2);
        pool.submit(|| {}).unwrap();
        pool.shutdown();
        pool.shutdown();
        assert_eq!(pool.active_tasks(), 0);
    }

    #[test]
    fn handle_outlives_pool() {
        let handle = {
            let pool = small_pool(2);
            let h = pool.submit_with_result(|| "survives").unwrap();
            pool.wait();
            h
        };
        assert_eq!(handle.get().unwrap(), "survives");
    }

    #[test]
    fn overflow_routing_keeps_tasks() {
        let pool = ThreadPool::new(PoolOptions {
            threads: 2,
            max_queue_tasks: 1,
            ..Default::default()
        })
        .unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..200 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                std::thread::sleep(Duration::from_micros(50));
                counter.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        }
        pool.wait();
        assert_eq!(counter.load(Ordering::Relaxed), 200);
    }
}
