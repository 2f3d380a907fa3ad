//! Scheduler counters.
//!
//! Five monotonic 64-bit counters updated with relaxed ordering from every
//! worker and submitter. Readers get an eventually-consistent snapshot; no
//! cross-counter invariant is guaranteed (a snapshot may transiently show
//! `submitted > executed + in_flight`).
//!
//! Each counter sits on its own cache line so that a worker hammering
//! `steal_attempts` does not invalidate the line a submitter is bumping
//! `tasks_submitted` on.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;

/// Process-wide monotonic scheduler counters.
#[derive(Debug, Default)]
pub struct StatsCounters {
    tasks_submitted: CachePadded<AtomicU64>,
    tasks_executed: CachePadded<AtomicU64>,
    tasks_stolen: CachePadded<AtomicU64>,
    steal_attempts: CachePadded<AtomicU64>,
    failed_steals: CachePadded<AtomicU64>,
}

impl StatsCounters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_submitted(&self) {
        self.tasks_submitted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_executed(&self) {
        self.tasks_executed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_stolen(&self) {
        self.tasks_stolen.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_steal_attempt(&self) {
        self.steal_attempts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_failed_steal(&self) {
        self.failed_steals.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters. Each load is individually atomic; the snapshot as a
    /// whole is not.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            tasks_submitted: self.tasks_submitted.load(Ordering::Relaxed),
            tasks_executed: self.tasks_executed.load(Ordering::Relaxed),
            tasks_stolen: self.tasks_stolen.load(Ordering::Relaxed),
            steal_attempts: self.steal_attempts.load(Ordering::Relaxed),
            failed_steals: self.failed_steals.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time counter values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Tasks accepted by `submit` (rejected submissions are not counted).
    pub tasks_submitted: u64,
    /// Tasks whose invocation completed, normally or by panic.
    pub tasks_executed: u64,
    /// Tasks obtained from a peer's deque front.
    pub tasks_stolen: u64,
    /// Victim-sampling attempts, including self-samples.
    pub steal_attempts: u64,
    /// Attempts that yielded no task (empty victim or self-sample).
    pub failed_steals: u64,
}
