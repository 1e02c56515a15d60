// ==============================================
// RESOURCE CACHE CONCURRENCY TESTS (integration)
// ==============================================
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

use rescache::{CacheBuilder, LoadMode, ResourceCache, ResourceHandle};

type BoxedLoader = Box<dyn Fn(&String) -> Result<String, String> + Send + Sync>;
type TestCache = ResourceCache<String, String, BoxedLoader>;

const MODES: [LoadMode; 2] = [LoadMode::Serialized, LoadMode::PerKey];

/// Loader that counts invocations per key and sleeps to widen race windows.
fn slow_counting_cache(
    mode: LoadMode,
    delay: Duration,
) -> (Arc<TestCache>, Arc<Mutex<HashMap<String, usize>>>) {
    let loads = Arc::new(Mutex::new(HashMap::new()));
    let counter = loads.clone();
    let loader: BoxedLoader = Box::new(move |key: &String| {
        *counter.lock().unwrap().entry(key.clone()).or_insert(0) += 1;
        thread::sleep(delay);
        if key.starts_with("bad") {
            Err(format!("cannot load {key}"))
        } else {
            Ok(format!("value:{key}"))
        }
    });
    let cache = CacheBuilder::new()
        .label("concurrency")
        .load_mode(mode)
        .build(loader);
    (Arc::new(cache), loads)
}

// ==============================================
// Identity Sharing
// ==============================================

mod identity {
    use super::*;

    #[test]
    fn concurrent_gets_share_one_instance() {
        for mode in MODES {
            let (cache, loads) = slow_counting_cache(mode, Duration::from_millis(5));
            let num_threads = 8;
            let start = Arc::new(Barrier::new(num_threads));
            let all_loaded = Arc::new(Barrier::new(num_threads));
            let generations = Arc::new(Mutex::new(Vec::new()));

            let handles: Vec<_> = (0..num_threads)
                .map(|_| {
                    let cache = cache.clone();
                    let start = start.clone();
                    let all_loaded = all_loaded.clone();
                    let generations = generations.clone();
                    thread::spawn(move || {
                        start.wait();
                        let handle = cache.get("shared").unwrap();
                        // every thread holds its handle until all have one
                        all_loaded.wait();
                        generations
                            .lock()
                            .unwrap()
                            .push(ResourceHandle::generation(&handle));
                        assert_eq!(*handle, "value:shared");
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            let generations = generations.lock().unwrap();
            assert_eq!(generations.len(), num_threads);
            assert!(generations.iter().all(|g| *g == generations[0]));
            assert_eq!(loads.lock().unwrap()["shared"], 1, "mode {mode:?}");
            assert!(cache.is_empty());
            cache.check_invariants().unwrap();
        }
    }

    #[test]
    fn handle_clones_cross_threads() {
        let (cache, loads) = slow_counting_cache(LoadMode::Serialized, Duration::ZERO);
        let handle = cache.get("brick").unwrap();

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let clone = handle.clone();
                let cache = cache.clone();
                thread::spawn(move || {
                    let again = cache.get("brick").unwrap();
                    assert!(ResourceHandle::ptr_eq(&clone, &again));
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(ResourceHandle::strong_count(&handle), 1);
        drop(handle);
        assert!(cache.is_empty());
        assert_eq!(loads.lock().unwrap()["brick"], 1);
    }
}

// ==============================================
// Load Scheduling
// ==============================================

mod scheduling {
    use super::*;

    fn in_flight_cache(
        mode: LoadMode,
        rendezvous: Option<Arc<Barrier>>,
    ) -> (Arc<ResourceCache<String, usize, BoxedUsize>>, Arc<AtomicUsize>) {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let max = max_seen.clone();
        let loader: BoxedUsize = Box::new(move |key: &String| {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            max.fetch_max(now, Ordering::SeqCst);
            match &rendezvous {
                Some(barrier) => {
                    barrier.wait();
                },
                None => thread::sleep(Duration::from_millis(10)),
            }
            in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(key.len())
        });
        let cache = CacheBuilder::new().load_mode(mode).build(loader);
        (Arc::new(cache), max_seen)
    }

    type BoxedUsize = Box<dyn Fn(&String) -> Result<usize, ()> + Send + Sync>;

    #[test]
    fn per_key_loads_distinct_keys_concurrently() {
        // both loaders must be running at once to pass the rendezvous
        let rendezvous = Arc::new(Barrier::new(2));
        let (cache, max_seen) = in_flight_cache(LoadMode::PerKey, Some(rendezvous));

        let workers: Vec<_> = ["alpha", "beta"]
            .into_iter()
            .map(|key| {
                let cache = cache.clone();
                thread::spawn(move || {
                    let handle = cache.get(key).unwrap();
                    assert_eq!(*handle, key.len());
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn serialized_mode_never_overlaps_loads() {
        let (cache, max_seen) = in_flight_cache(LoadMode::Serialized, None);
        let num_threads = 6;
        let start = Arc::new(Barrier::new(num_threads));

        let workers: Vec<_> = (0..num_threads)
            .map(|i| {
                let cache = cache.clone();
                let start = start.clone();
                thread::spawn(move || {
                    start.wait();
                    let _handle = cache.get(&format!("key-{i}")).unwrap();
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn per_key_waiters_observe_single_load() {
        let (cache, loads) = slow_counting_cache(LoadMode::PerKey, Duration::from_millis(30));
        let num_threads = 6;
        let start = Arc::new(Barrier::new(num_threads));
        let hold = Arc::new(Barrier::new(num_threads));

        let workers: Vec<_> = (0..num_threads)
            .map(|_| {
                let cache = cache.clone();
                let start = start.clone();
                let hold = hold.clone();
                thread::spawn(move || {
                    start.wait();
                    let handle = cache.get("slow").unwrap();
                    hold.wait();
                    drop(handle);
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(loads.lock().unwrap()["slow"], 1);
        assert!(cache.is_empty());
    }
}

// ==============================================
// Failures
// ==============================================

mod failures {
    use super::*;

    #[test]
    fn concurrent_failures_leave_no_entry() {
        for mode in MODES {
            let (cache, loads) = slow_counting_cache(mode, Duration::from_millis(2));
            let num_threads = 8;
            let start = Arc::new(Barrier::new(num_threads));

            let workers: Vec<_> = (0..num_threads)
                .map(|_| {
                    let cache = cache.clone();
                    let start = start.clone();
                    thread::spawn(move || {
                        start.wait();
                        let err = cache.get("bad-texture").unwrap_err();
                        assert_eq!(err, "cannot load bad-texture");
                    })
                })
                .collect();
            for worker in workers {
                worker.join().unwrap();
            }

            // no cached failure: every caller ran the loader itself
            assert_eq!(loads.lock().unwrap()["bad-texture"], num_threads);
            assert!(cache.is_empty());
            cache.check_invariants().unwrap();
        }
    }

    #[test]
    fn panicking_loader_wakes_waiters() {
        let panicked = Arc::new(AtomicBool::new(false));
        let flag = panicked.clone();
        let entered = Arc::new(Barrier::new(2));
        let gate = entered.clone();
        let loader: BoxedLoader = Box::new(move |key: &String| {
            if !flag.swap(true, Ordering::SeqCst) {
                gate.wait();
                // give the waiter time to block on the pending slot
                thread::sleep(Duration::from_millis(20));
                panic!("loader exploded");
            }
            Ok(key.clone())
        });
        let cache: Arc<TestCache> = Arc::new(
            CacheBuilder::new()
                .load_mode(LoadMode::PerKey)
                .build(loader),
        );

        let first = {
            let cache = cache.clone();
            thread::spawn(move || cache.get("boom").map(|h| (*h).clone()))
        };
        entered.wait();
        let second = {
            let cache = cache.clone();
            thread::spawn(move || cache.get("boom").map(|h| (*h).clone()))
        };

        assert!(first.join().is_err());
        assert_eq!(second.join().unwrap().unwrap(), "boom");
        assert!(cache.is_empty());
        cache.check_invariants().unwrap();
    }
}

// ==============================================
// Release / Reload Races
// ==============================================

mod release_races {
    use super::*;

    #[test]
    fn churn_ends_empty_and_consistent() {
        for mode in MODES {
            let (cache, _loads) = slow_counting_cache(mode, Duration::ZERO);
            let num_threads = 8;
            let iterations = 500;
            let start = Arc::new(Barrier::new(num_threads));

            let workers: Vec<_> = (0..num_threads)
                .map(|thread_id| {
                    let cache = cache.clone();
                    let start = start.clone();
                    thread::spawn(move || {
                        start.wait();
                        for i in 0..iterations {
                            let key = format!("key-{}", (thread_id + i) % 4);
                            let handle = cache.get(&key).unwrap();
                            assert_eq!(*handle, format!("value:{key}"));
                            if i % 7 == 0 {
                                cache.check_invariants().unwrap();
                            }
                        }
                    })
                })
                .collect();
            for worker in workers {
                worker.join().unwrap();
            }

            assert!(cache.is_empty(), "mode {mode:?} left entries behind");
            cache.check_invariants().unwrap();

            #[cfg(feature = "metrics")]
            {
                let snapshot = cache.metrics_snapshot();
                assert_eq!(snapshot.get_calls, (num_threads * iterations) as u64);
                assert_eq!(snapshot.get_hits + snapshot.get_misses, snapshot.get_calls);
                // every issued instance is released exactly once
                assert_eq!(snapshot.loads, snapshot.releases + snapshot.stale_releases);
                assert_eq!(snapshot.live_entries, 0);
            }
        }
    }

    /// A release for a prior instance racing a fresh load of the same key
    /// must never erase the fresh entry.
    #[test]
    fn prior_release_racing_new_load_keeps_new_entry() {
        for mode in MODES {
            let (cache, _loads) = slow_counting_cache(mode, Duration::ZERO);
            let rounds = 200;

            for _ in 0..rounds {
                let old = cache.get("hot").unwrap();
                let barrier = Arc::new(Barrier::new(2));

                let releaser = {
                    let barrier = barrier.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        drop(old);
                    })
                };
                let loader = {
                    let cache = cache.clone();
                    let barrier = barrier.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        cache.get("hot").unwrap()
                    })
                };

                releaser.join().unwrap();
                let fresh = loader.join().unwrap();

                // whichever order they ran in, the surviving handle is reachable
                assert!(cache.contains("hot"));
                let again = cache.get("hot").unwrap();
                assert!(ResourceHandle::ptr_eq(&fresh, &again));
                cache.check_invariants().unwrap();

                drop(again);
                drop(fresh);
                assert!(cache.is_empty());
            }
        }
    }
}
