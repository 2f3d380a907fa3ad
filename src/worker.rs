//! Per-thread worker loop.
//!
//! # Algorithm
//!
//! ```text
//! Running:
//!   1. local deque, LIFO pop        -> run, stay Running
//!   2. peer steal, up to steal_attempts victims (policy-chosen; a
//!      self-sample counts as a failed steal)
//!                                   -> run, stay Running
//!   3. overflow store, FIFO drain   -> run, stay Running
//!   4. stop flag set AND active == 0 -> Terminated
//!   5. sleep idle_sleep, stay Running
//! ```
//!
//! Peer steal runs before the overflow drain so that a burst of tasks parked
//! on one worker rebalances across the pool before anyone touches the more
//! contended global store. The overflow is drained FIFO to give older
//! overflowed tasks priority.
//!
//! The termination check requires BOTH conditions: a worker must not exit
//! while work is still in flight, including tasks that submit further tasks
//! near shutdown.

use std::panic::{self, AssertUnwindSafe};
use std::thread;

use log::warn;

use crate::active::CompletionGuard;
use crate::config::StealPolicy;
use crate::error::TaskError;
use crate::pool::Shared;
use crate::queue::Task;
use crate::rng::SchedRng;

/// Worker entry point; returns only when the pool shuts down.
pub(crate) fn run(index: usize, shared: &Shared) {
    let mut rng = SchedRng::from_entropy();

    loop {
        if let Some(task) = shared.queues[index].try_pop_back() {
            execute(shared, task);
            continue;
        }

        if steal_round(index, shared, &mut rng) {
            continue;
        }

        if let Some(task) = shared.overflow.try_steal_front() {
            execute(shared, task);
            continue;
        }

        if shared.shutdown_requested() && shared.active.is_zero() {
            break;
        }

        thread::sleep(shared.options.idle_sleep);
    }
}

/// One round of victim sampling. Returns `true` if a stolen task was run.
fn steal_round(index: usize, shared: &Shared, rng: &mut SchedRng) -> bool {
    let n = shared.queues.len();
    for attempt in 1..=shared.options.steal_attempts as usize {
        let victim = next_victim(shared.options.steal_policy, index, attempt, n, rng);
        shared.stats.record_steal_attempt();

        // Never steal from our own deque; a self-sample burns the attempt.
        if victim == index {
            shared.stats.record_failed_steal();
            continue;
        }

        match shared.queues[victim].try_steal_front() {
            Some(task) => {
                shared.stats.record_stolen();
                execute(shared, task);
                return true;
            }
            None => shared.stats.record_failed_steal(),
        }
    }
    false
}

/// Victim index for the given attempt (1-based).
pub(crate) fn next_victim(
    policy: StealPolicy,
    index: usize,
    attempt: usize,
    n: usize,
    rng: &mut SchedRng,
) -> usize {
    match policy {
        StealPolicy::Random => rng.next_below(n),
        StealPolicy::RoundRobin => (index + attempt) % n,
    }
}

/// Invoke one task with the completion guard armed.
///
/// The guard fires on every exit path, so the active count is decremented
/// exactly once whether the task returns or panics. A panic is the task's
/// own failure: it is captured here and must never escape the worker loop.
fn execute(shared: &Shared, task: Task) {
    let _guard = CompletionGuard::arm(&shared.active);
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
        let err = TaskError::from_panic(payload);
        warn!("worker task panicked, continuing: {err}");
    }
    shared.stats.record_executed();
}
