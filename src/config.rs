//! Pool configuration.
//!
//! All knobs are immutable after construction. Defaults are conservative;
//! profile with your workload before tuning.
//!
//! | Knob              | Workload sensitivity                       |
//! |-------------------|--------------------------------------------|
//! | `threads`         | CPU count, task CPU-boundedness            |
//! | `steal_attempts`  | Task fanout pattern, worker count          |
//! | `idle_sleep`      | Submission burstiness vs. idle CPU usage   |
//! | `max_queue_tasks` | Submission burst size, task granularity    |
//! | `steal_policy`    | Worker count, contention tolerance         |

use std::thread;
use std::time::Duration;

use crate::error::ConfigError;

/// How an idle worker picks the victim of a steal attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StealPolicy {
    /// Draw a victim uniformly from all workers using a thread-local PRNG.
    ///
    /// O(1) per attempt and avoids correlated contention. The drawing worker
    /// may sample itself; such an attempt counts as a failed steal.
    Random,
    /// Visit `(self + attempt) % threads`, skipping self.
    ///
    /// Bounded worst-case discovery of a non-empty victim: with
    /// `steal_attempts >= threads - 1` every peer is visited.
    RoundRobin,
}

/// Pool construction options.
///
/// `Default` gives a pool sized to the machine with the documented defaults
/// for every other knob.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolOptions {
    /// Number of worker threads. Must be >= 1.
    ///
    /// Default: hardware parallelism, or 1 if unknown.
    pub threads: usize,

    /// Victim-sampling attempts per idle cycle before falling back to the
    /// overflow queue. Must be >= 1.
    ///
    /// Default: 4.
    pub steal_attempts: u32,

    /// How long a worker sleeps after a fully failed lookup round.
    ///
    /// Shorter = lower wake-up latency, more idle CPU. Default: 1 ms.
    pub idle_sleep: Duration,

    /// Per-worker deque soft cap. A submission that finds its target deque at
    /// or above this size is routed to the overflow queue instead.
    ///
    /// Default: 65 536.
    pub max_queue_tasks: usize,

    /// Victim selection policy for work stealing.
    ///
    /// Default: [`StealPolicy::Random`].
    pub steal_policy: StealPolicy,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            threads: default_thread_count(),
            steal_attempts: 4,
            idle_sleep: Duration::from_millis(1),
            max_queue_tasks: 1 << 16,
            steal_policy: StealPolicy::Random,
        }
    }
}

impl PoolOptions {
    /// Validate the options.
    ///
    /// Called by [`ThreadPool::new`](crate::pool::ThreadPool::new) before any
    /// worker spawns.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        if self.steal_attempts == 0 {
            return Err(ConfigError::ZeroStealAttempts);
        }
        Ok(())
    }
}

/// Hardware parallelism, or 1 if it cannot be queried.
pub fn default_thread_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = PoolOptions::default();
        assert!(opts.threads >= 1);
        assert_eq!(opts.steal_attempts, 4);
        assert_eq!(opts.idle_sleep, Duration::from_millis(1));
        assert_eq!(opts.max_queue_tasks, 65_536);
        assert_eq!(opts.steal_policy, StealPolicy::Random);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn zero_threads_rejected() {
        let opts = PoolOptions {
            threads: 0,
            ..Default::default()
        };
        assert_eq!(opts.validate(), Err(ConfigError::ZeroThreads));
    }

    #[test]
    fn zero_steal_attempts_rejected() {
        let opts = PoolOptions {
            steal_attempts: 0,
            ..Default::default()
        };
        assert_eq!(opts.validate(), Err(ConfigError::ZeroStealAttempts));
    }

    #[test]
    fn default_thread_count_nonzero() {
        assert!(default_thread_count() >= 1);
    }
}
