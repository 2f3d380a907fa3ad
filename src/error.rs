//! Error types for pool construction, submission, and task execution.
//!
//! Errors are stage-specific to keep diagnostics precise: construction
//! failures, rejected submissions, and task-originated failures are distinct
//! types with distinct lifetimes. All enums are `#[non_exhaustive]` so
//! variants can be added without breaking callers.
//!
//! # Design Notes
//! - The scheduler itself only ever produces [`ConfigError`] and
//!   [`SubmitError`]. Everything that goes wrong *inside* a task is a value
//!   ([`TaskError`]), never a control-flow event at the worker level.
//! - A fire-and-forget task failure is isolated at the worker boundary and
//!   logged; a with-result task failure travels to the caller through its
//!   [`ResultHandle`](crate::future::ResultHandle).

use std::any::Any;
use std::fmt;

/// Errors from pool construction.
///
/// Rejected before any worker thread spawns; a pool that constructs
/// successfully always has running workers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// `threads` was zero; the pool needs at least one worker.
    ZeroThreads,
    /// `steal_attempts` was zero; idle workers must sample at least one victim.
    ZeroStealAttempts,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroThreads => write!(f, "invalid config: threads must be > 0"),
            Self::ZeroStealAttempts => {
                write!(f, "invalid config: steal_attempts must be > 0")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors from task submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubmitError {
    /// The pool has been instructed to stop; no state was changed.
    ShuttingDown,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShuttingDown => write!(f, "pool is shutting down, submission rejected"),
        }
    }
}

impl std::error::Error for SubmitError {}

/// A failure raised inside a submitted task, captured at the worker boundary.
///
/// The panic payload's message is preserved when it is a `&str` or `String`
/// (the payload types `panic!` produces); other payload types get a fixed
/// description. The payload itself is not retained: it may not be `Sync`, and
/// handles must be freely shareable with the caller.
#[derive(Clone, Debug)]
pub struct TaskError {
    message: String,
}

impl TaskError {
    /// Capture a panic payload as returned by `std::panic::catch_unwind`.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "task panicked with a non-string payload".to_owned()
        };
        Self { message }
    }

    /// The captured panic message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task panicked: {}", self.message)
    }
}

impl std::error::Error for TaskError {}

/// Errors from the parallel range adapters.
///
/// Wraps the two ways a chunked run can fail: the pool refused the chunk
/// submissions, or a chunk's user function panicked.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum ParallelError {
    /// The pool rejected a chunk submission.
    ShuttingDown,
    /// A chunk task panicked; carries the captured failure.
    Task(TaskError),
}

impl fmt::Display for ParallelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShuttingDown => write!(f, "pool is shutting down, chunk submission rejected"),
            Self::Task(err) => write!(f, "chunk task failed: {err}"),
        }
    }
}

impl std::error::Error for ParallelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Task(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SubmitError> for ParallelError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::ShuttingDown => Self::ShuttingDown,
        }
    }
}

impl From<TaskError> for ParallelError {
    fn from(err: TaskError) -> Self {
        Self::Task(err)
    }
}
