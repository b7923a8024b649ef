//! Concurrency Tests
//!
//! Many threads and tasks against one collection.

use crate::*;
use lockstep::{CancellationToken, Locker};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;

const THREADS: usize = 8;
const PER_THREAD: usize = 500;

// =============================================================================
// MUTUAL EXCLUSION
// =============================================================================

#[test]
fn test_concurrent_adds_no_lost_updates() {
    init_tracing();
    for kind in all_collection_lockers() {
        let c = Arc::new(concurrent_with(kind, vec![]));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let c = Arc::clone(&c);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..PER_THREAD {
                        c.add((t * PER_THREAD + i) as i64).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let contents = c.to_vec().unwrap();
        assert_eq!(contents.len(), THREADS * PER_THREAD, "locker {}", kind);
        let unique: HashSet<i64> = contents.into_iter().collect();
        assert_eq!(unique.len(), THREADS * PER_THREAD, "locker {}", kind);
    }
}

#[test]
fn test_event_count_matches_mutations() {
    let c = Arc::new(concurrent_with(LockerKind::Mutex, vec![]));
    let events = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&events);
    c.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let c = Arc::clone(&c);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..100 {
                    let v = (t * 100 + i) as i64;
                    c.add(v).unwrap();
                    if i % 2 == 0 {
                        assert!(c.remove(&v).unwrap());
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(c.len().unwrap(), THREADS * 50);
    assert_eq!(events.load(Ordering::SeqCst), THREADS * 150);
}

#[test]
fn test_locker_admits_one_holder() {
    for kind in all_collection_lockers() {
        let locker = Arc::new(Locker::new(kind).unwrap());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let locker = Arc::clone(&locker);
                let inside = Arc::clone(&inside);
                let max_seen = Arc::clone(&max_seen);
                thread::spawn(move || {
                    let token = CancellationToken::new();
                    for _ in 0..200 {
                        let _guard = locker.enter(&token).unwrap();
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1, "locker {}", kind);
        assert!(!locker.is_held());
    }
}

// =============================================================================
// READERS AND WRITERS
// =============================================================================

#[test]
fn test_snapshots_are_prefixes_under_appends() {
    let c = Arc::new(concurrent_with(LockerKind::ReaderWriter, vec![]));
    let barrier = Arc::new(Barrier::new(3));

    let writer = {
        let c = Arc::clone(&c);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for i in 0..2000 {
                c.add(i).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..2)
        .map(|_| {
            let c = Arc::clone(&c);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut last_len = 0;
                for _ in 0..200 {
                    let snapshot = c.copy().unwrap();
                    assert!(snapshot.len() >= last_len);
                    for (i, v) in snapshot.iter().enumerate() {
                        assert_eq!(*v, i as i64);
                    }
                    last_len = snapshot.len();
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }
    assert_eq!(c.len().unwrap(), 2000);
}

#[test]
fn test_enumeration_while_writers_run() {
    let c = Arc::new(concurrent_with(LockerKind::Mutex, (0..100).collect()));
    let stop = Arc::new(AtomicUsize::new(0));

    let writer = {
        let c = Arc::clone(&c);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut n = 100;
            while stop.load(Ordering::SeqCst) == 0 {
                c.add(n).unwrap();
                c.remove_at(0).unwrap();
                n += 1;
            }
        })
    };

    for _ in 0..50 {
        let seen: Vec<i64> = c.iter().collect();
        // The writer appends before it trims, so a snapshot may fall between the two
        assert!(seen.len() == 100 || seen.len() == 101);
        assert!(seen.windows(2).all(|w| w[1] == w[0] + 1));
    }
    stop.store(1, Ordering::SeqCst);
    writer.join().unwrap();
}

// =============================================================================
// ASYNC
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_async_adds_from_many_tasks() {
    let c = Arc::new(concurrent_with(LockerKind::Mutex, vec![]));
    let mut tasks = Vec::new();
    for t in 0..16i64 {
        let c = Arc::clone(&c);
        tasks.push(tokio::spawn(async move {
            let token = CancellationToken::new();
            for i in 0..100 {
                c.add_async(t * 100 + i, &token).await.unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(c.len_async(&CancellationToken::new()).await.unwrap(), 1600);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_sync_and_async_callers_share_the_lock() {
    let c = Arc::new(concurrent_with(LockerKind::ReaderWriter, vec![]));

    let sync_side = {
        let c = Arc::clone(&c);
        tokio::task::spawn_blocking(move || {
            for i in 0..300 {
                c.add(i).unwrap();
            }
        })
    };
    let token = CancellationToken::new();
    for i in 300..600 {
        c.add_async(i, &token).await.unwrap();
    }
    sync_side.await.unwrap();

    let mut all = c.to_vec().unwrap();
    all.sort();
    assert_eq!(all, (0..600).collect::<Vec<i64>>());
}

// =============================================================================
// RANDOM MIXED WORKLOAD
// =============================================================================

#[test]
fn test_random_mixed_workload_keeps_count_consistent() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let c = Arc::new(concurrent_with(LockerKind::ReaderWriter, vec![]));
    let net = Arc::new(std::sync::atomic::AtomicI64::new(0));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let c = Arc::clone(&c);
            let net = Arc::clone(&net);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(t as u64);
                barrier.wait();
                for _ in 0..400 {
                    let v: i64 = rng.gen_range(0..64);
                    match rng.gen_range(0..4) {
                        0 | 1 => {
                            c.add(v).unwrap();
                            net.fetch_add(1, Ordering::SeqCst);
                        }
                        2 => {
                            if c.remove(&v).unwrap() {
                                net.fetch_sub(1, Ordering::SeqCst);
                            }
                        }
                        _ => {
                            let _ = c.contains(&v).unwrap();
                            let _ = c.copy().unwrap();
                        }
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(c.len().unwrap() as i64, net.load(Ordering::SeqCst));
}
