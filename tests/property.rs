//! Property tests: queue behavior against a model, and adapter results
//! against sequential execution.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use taskpool_rs::{
    parallel_for_chunked, parallel_reduce_chunked, PoolOptions, StealPolicy, Task, ThreadPool,
    WorkStealingQueue,
};

#[derive(Clone, Copy, Debug)]
enum QueueOp {
    PushBack,
    TryPushBounded(usize),
    PopBack,
    StealFront,
}

fn queue_op() -> impl Strategy<Value = QueueOp> {
    prop_oneof![
        Just(QueueOp::PushBack),
        (1usize..8).prop_map(QueueOp::TryPushBounded),
        Just(QueueOp::PopBack),
        Just(QueueOp::StealFront),
    ]
}

/// Build a task that appends its id to the shared log when run.
fn tagged(id: usize, log: &Arc<Mutex<Vec<usize>>>) -> Task {
    let log = Arc::clone(log);
    Box::new(move || log.lock().unwrap().push(id))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The queue behaves exactly like a VecDeque under any op sequence:
    /// owner pops see the back, thief steals see the front, bounded pushes
    /// reject at the cap.
    #[test]
    fn queue_matches_model(ops in prop::collection::vec(queue_op(), 1..200)) {
        let q = WorkStealingQueue::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut shadow: VecDeque<usize> = VecDeque::new();
        let mut next_id = 0usize;

        for op in ops {
            match op {
                QueueOp::PushBack => {
                    q.push_back(tagged(next_id, &log));
                    shadow.push_back(next_id);
                    next_id += 1;
                }
                QueueOp::TryPushBounded(cap) => {
                    let accepted = q.try_push_back(tagged(next_id, &log), cap).is_ok();
                    prop_assert_eq!(accepted, shadow.len() < cap);
                    if accepted {
                        shadow.push_back(next_id);
                    }
                    next_id += 1;
                }
                QueueOp::PopBack => {
                    let expected = shadow.pop_back();
                    match q.try_pop_back() {
                        Some(task) => {
                            task();
                            let ran = log.lock().unwrap().pop();
                            prop_assert_eq!(ran, expected);
                        }
                        None => prop_assert!(expected.is_none()),
                    }
                }
                QueueOp::StealFront => {
                    let expected = shadow.pop_front();
                    match q.try_steal_front() {
                        Some(task) => {
                            task();
                            let ran = log.lock().unwrap().pop();
                            prop_assert_eq!(ran, expected);
                        }
                        None => prop_assert!(expected.is_none()),
                    }
                }
            }

            prop_assert_eq!(q.len(), shadow.len());
            prop_assert_eq!(q.is_empty(), shadow.is_empty());
        }
    }
}

proptest! {
    // Each case spins up worker threads; keep the case count low.
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Chunked reduction equals the sequential fold for any range and chunk.
    #[test]
    fn reduce_equals_sequential(
        lo in 0usize..500,
        len in 0usize..1500,
        chunk in 1usize..256,
    ) {
        let pool = ThreadPool::new(PoolOptions {
            threads: 3,
            ..Default::default()
        })
        .unwrap();

        let hi = lo + len;
        let parallel = parallel_reduce_chunked(
            &pool, lo, hi, chunk, 0u64, |i| i as u64, |a, b| a + b,
        )
        .unwrap();
        let sequential: u64 = (lo..hi).map(|i| i as u64).sum();
        prop_assert_eq!(parallel, sequential);
    }

    /// `parallel_for` visits every index exactly once for any range/chunk.
    #[test]
    fn for_visits_each_index_once(
        len in 0usize..1200,
        chunk in 1usize..200,
        round_robin in any::<bool>(),
    ) {
        let pool = ThreadPool::new(PoolOptions {
            threads: 3,
            steal_policy: if round_robin {
                StealPolicy::RoundRobin
            } else {
                StealPolicy::Random
            },
            ..Default::default()
        })
        .unwrap();

        let visits: Arc<Vec<AtomicUsize>> =
            Arc::new((0..len).map(|_| AtomicUsize::new(0)).collect());
        let cells = Arc::clone(&visits);
        parallel_for_chunked(&pool, 0, len, chunk, move |i| {
            cells[i].fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();

        for (i, cell) in visits.iter().enumerate() {
            prop_assert_eq!(cell.load(Ordering::Relaxed), 1, "index {}", i);
        }
    }

    /// Every accepted submission executes exactly once.
    #[test]
    fn all_submissions_retire(k in 0usize..400, threads in 1usize..5) {
        let pool = ThreadPool::new(PoolOptions {
            threads,
            ..Default::default()
        })
        .unwrap();

        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..k {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        }
        pool.wait();
        prop_assert_eq!(counter.load(Ordering::Relaxed), k);
        prop_assert_eq!(pool.active_tasks(), 0);
    }
}
