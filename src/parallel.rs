//! Parallel range adapters built on the public pool API.
//!
//! Both adapters split a half-open index range `[lo, hi)` into
//! `ceil((hi - lo) / chunk)` chunks, submit one task per chunk, and join the
//! resulting handles. Ranges that fit in a single chunk run inline on the
//! calling thread; parallelism is not worth a task's overhead there.
//!
//! The reduction order over chunk partials is unspecified, so the reduce
//! operation must be associative. The map variant is undefined if the
//! per-index function is not data-race free on its shared captures.

use std::ops::Add;
use std::sync::Arc;

use crate::error::ParallelError;
use crate::pool::ThreadPool;

/// Default indices per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Run `f(i)` for every `i` in `[lo, hi)` using the default chunk size.
pub fn parallel_for<F>(pool: &ThreadPool, lo: usize, hi: usize, f: F) -> Result<(), ParallelError>
where
    F: Fn(usize) + Send + Sync + 'static,
{
    parallel_for_chunked(pool, lo, hi, DEFAULT_CHUNK_SIZE, f)
}

/// Run `f(i)` for every `i` in `[lo, hi)`, `chunk` indices per task.
///
/// # Panics
/// Panics if `chunk` is 0.
pub fn parallel_for_chunked<F>(
    pool: &ThreadPool,
    lo: usize,
    hi: usize,
    chunk: usize,
    f: F,
) -> Result<(), ParallelError>
where
    F: Fn(usize) + Send + Sync + 'static,
{
    assert!(chunk > 0, "chunk size must be > 0");
    if lo >= hi {
        return Ok(());
    }

    let len = hi - lo;
    if len <= chunk {
        for i in lo..hi {
            f(i);
        }
        return Ok(());
    }

    let f = Arc::new(f);
    let chunks = len.div_ceil(chunk);
    let mut handles = Vec::with_capacity(chunks);

    for c in 0..chunks {
        let start = lo + c * chunk;
        let end = (start + chunk).min(hi);
        let f = Arc::clone(&f);
        handles.push(pool.submit_with_result(move || {
            for i in start..end {
                f(i);
            }
        })?);
    }

    for handle in handles {
        handle.get()?;
    }
    Ok(())
}

/// Fold `map(i)` over `[lo, hi)` with `reduce`, starting from `init`, using
/// the default chunk size.
pub fn parallel_reduce<T, M, R>(
    pool: &ThreadPool,
    lo: usize,
    hi: usize,
    init: T,
    map: M,
    reduce: R,
) -> Result<T, ParallelError>
where
    T: Clone + Send + 'static,
    M: Fn(usize) -> T + Send + Sync + 'static,
    R: Fn(T, T) -> T + Send + Sync + 'static,
{
    parallel_reduce_chunked(pool, lo, hi, DEFAULT_CHUNK_SIZE, init, map, reduce)
}

/// Fold `map(i)` over `[lo, hi)` with `reduce`, `chunk` indices per task.
///
/// Each chunk folds its partial starting from a clone of `init`; the partials
/// are then folded into `init` once more in an unspecified order. `reduce`
/// must be associative and `init` its identity for the result to be
/// well-defined.
///
/// # Panics
/// Panics if `chunk` is 0.
pub fn parallel_reduce_chunked<T, M, R>(
    pool: &ThreadPool,
    lo: usize,
    hi: usize,
    chunk: usize,
    init: T,
    map: M,
    reduce: R,
) -> Result<T, ParallelError>
where
    T: Clone + Send + 'static,
    M: Fn(usize) -> T + Send + Sync + 'static,
    R: Fn(T, T) -> T + Send + Sync + 'static,
{
    assert!(chunk > 0, "chunk size must be > 0");
    if lo >= hi {
        return Ok(init);
    }

    let len = hi - lo;
    if len <= chunk {
        let mut acc = init;
        for i in lo..hi {
            acc = reduce(acc, map(i));
        }
        return Ok(acc);
    }

    let map = Arc::new(map);
    let reduce = Arc::new(reduce);
    let chunks = len.div_ceil(chunk);
    let mut handles = Vec::with_capacity(chunks);

    for c in 0..chunks {
        let start = lo + c * chunk;
        let end = (start + chunk).min(hi);
        let map = Arc::clone(&map);
        let reduce = Arc::clone(&reduce);
        let seed = init.clone();
        handles.push(pool.submit_with_result(move || {
            let mut partial = seed;
            for i in start..end {
                partial = reduce(partial, map(i));
            }
            partial
        })?);
    }

    let mut acc = init;
    for handle in handles {
        acc = reduce(acc, handle.get()?);
    }
    Ok(acc)
}

/// Sum `map(i)` over `[lo, hi)` starting from `init`.
///
/// Convenience for the common additive reduction.
pub fn parallel_map_reduce<T, M>(
    pool: &ThreadPool,
    lo: usize,
    hi: usize,
    init: T,
    map: M,
) -> Result<T, ParallelError>
where
    T: Clone + Send + Add<Output = T> + 'static,
    M: Fn(usize) -> T + Send + Sync + 'static,
{
    parallel_reduce(pool, lo, hi, init, map, |a, b| a + b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolOptions;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pool() -> ThreadPool {
        ThreadPool::new(PoolOptions {
            threads: 4,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn empty_range_is_a_no_op() {
        let pool = pool();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        parallel_for(&pool, 5, 5, move |_| {
            h.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();
        assert_eq!(hits.load(Ordering::Relaxed), 0);

        let sum = parallel_reduce(&pool, 10, 3, 0usize, |i| i, |a, b| a + b).unwrap();
        assert_eq!(sum, 0);
    }

    #[test]
    fn small_range_runs_inline() {
        let pool = pool();
        // Range smaller than one chunk: no tasks are submitted at all.
        let before = pool.stats().tasks_submitted;
        let sum = parallel_reduce(&pool, 0, 100, 0usize, |i| i, |a, b| a + b).unwrap();
        assert_eq!(sum, 4950);
        assert_eq!(pool.stats().tasks_submitted, before);
    }

    #[test]
    fn chunk_boundaries_cover_the_range() {
        let pool = pool();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        // 10 indices, chunk 3: chunks of 3, 3, 3, 1.
        parallel_for_chunked(&pool, 0, 10, 3, move |_| {
            h.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();
        assert_eq!(hits.load(Ordering::Relaxed), 10);
    }

    #[test]
    fn reduce_matches_sequential() {
        let pool = pool();
        let parallel =
            parallel_reduce_chunked(&pool, 0, 10_000, 64, 0u64, |i| i as u64, |a, b| a + b)
                .unwrap();
        let sequential: u64 = (0..10_000u64).sum();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn map_reduce_sums() {
        let pool = pool();
        let total = parallel_map_reduce(&pool, 0, 5000, 0i64, |i| i as i64).unwrap();
        assert_eq!(total, (0..5000i64).sum::<i64>());
    }

    #[test]
    #[should_panic(expected = "chunk size must be > 0")]
    fn zero_chunk_panics() {
        let pool = pool();
        let _ = parallel_for_chunked(&pool, 0, 10, 0, |_| {});
    }

    #[test]
    fn map_panic_surfaces_as_task_error() {
        let pool = pool();
        let err = parallel_for_chunked(&pool, 0, 4000, 16, |i| {
            if i == 3999 {
                panic!("index blew up");
            }
        })
        .unwrap_err();
        match err {
            ParallelError::Task(task_err) => {
                assert!(task_err.message().contains("index blew up"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // The pool survives a failed chunk.
        pool.wait();
        assert_eq!(
            parallel_reduce(&pool, 0, 10, 0usize, |i| i, |a, b| a + b).unwrap(),
            45
        );
    }
}
