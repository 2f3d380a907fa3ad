//! Work-stealing task execution engine.
//!
//! # Overview
//!
//! A fixed-size pool of worker threads cooperatively executes short,
//! independent units of work submitted by application code. Each worker owns
//! a deque it drains LIFO; idle workers steal FIFO from peers, then fall
//! back to a global overflow store, then sleep. A process-wide active-task
//! counter provides quiescence detection for [`ThreadPool::wait`] and the
//! drain-then-join shutdown protocol.
//!
//! # Architecture
//!
//! ```text
//!                 ┌────────────────────────────────────────────────────┐
//!                 │                    ThreadPool                      │
//!                 │                                                    │
//!  submit ───────►│ random target ──┬──► deque 0 ◄──► Worker 0         │
//!  submit_with_   │                 ├──► deque 1 ◄──► Worker 1         │
//!  result ───────►│                 └──► deque N ◄──► Worker N         │
//!                 │   (deque full)        ▲   steal FIFO ▲             │
//!                 │        │              └──────────────┘             │
//!                 │        ▼                                           │
//!                 │   overflow store ◄── drained FIFO by idle workers  │
//!                 │                                                    │
//!                 │   ActiveTaskCounter ──► wait() / shutdown drain    │
//!                 │   StatsCounters     ──► stats()                    │
//!                 └────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Pool options, steal policy, defaults, validation |
//! | [`queue`] | Mutex-guarded deque: owner LIFO, thief FIFO, bounded push |
//! | [`pool`] | Pool lifecycle: submit, wait, shutdown, stats |
//! | [`future`] | One-shot result handles for submitted computations |
//! | [`active`] | Active-task counting, completion and submission guards |
//! | [`stats`] | Relaxed monotonic scheduler counters |
//! | [`rng`] | Per-thread PRNG for victim and target selection |
//! | [`parallel`] | Range adapters: `parallel_for`, `parallel_reduce` |
//! | [`error`] | Construction, submission, and task error types |
//!
//! # Correctness Invariants
//!
//! - **Work-conserving**: an accepted submission always executes, even when
//!   it arrives just before shutdown or overflows its target deque.
//! - **Exactly-once accounting**: the active count is incremented before a
//!   task becomes visible and decremented exactly once after its invocation
//!   completes, panics included.
//! - **Panic isolation**: a fire-and-forget task's panic is logged and
//!   swallowed at the worker boundary; a with-result task's panic travels to
//!   the caller through its [`ResultHandle`].
//! - **Non-blocking stealing**: workers only use `try_` operations on other
//!   parties' queues; a slow owner cannot stall a thief.
//!
//! # Usage
//!
//! ```
//! use taskpool_rs::{parallel_reduce, PoolOptions, ThreadPool};
//!
//! let pool = ThreadPool::new(PoolOptions::default()).unwrap();
//!
//! // Fire-and-forget.
//! pool.submit(|| println!("hello from a worker")).unwrap();
//! pool.wait();
//!
//! // Future-like result.
//! let handle = pool.submit_with_result(|| 6 * 7).unwrap();
//! assert_eq!(handle.get().unwrap(), 42);
//!
//! // Chunked range reduction.
//! let sum = parallel_reduce(&pool, 0, 1000, 0u64, |i| i as u64, |a, b| a + b).unwrap();
//! assert_eq!(sum, 499_500);
//! ```

pub mod active;
pub mod config;
pub mod error;
pub mod future;
pub mod parallel;
pub mod pool;
pub mod queue;
pub mod rng;
pub mod stats;

mod worker;

// Core surface
pub use config::{default_thread_count, PoolOptions, StealPolicy};
pub use future::ResultHandle;
pub use pool::ThreadPool;

// Range adapters
pub use parallel::{
    parallel_for, parallel_for_chunked, parallel_map_reduce, parallel_reduce,
    parallel_reduce_chunked, DEFAULT_CHUNK_SIZE,
};

// Supporting types
pub use active::ActiveTaskCounter;
pub use error::{ConfigError, ParallelError, SubmitError, TaskError};
pub use queue::{Task, WorkStealingQueue};
pub use rng::SchedRng;
pub use stats::{StatsCounters, StatsSnapshot};
