use std::sync::atomic::{AtomicU64, Ordering};

use crate::metrics::snapshot::CacheMetricsSnapshot;
use crate::metrics::traits::{CacheMetricsRecorder, MetricsReset};

/// Atomic counters shared by a cache and its release callbacks.
///
/// Relaxed ordering: counters may be slightly stale under concurrent reads
/// but are eventually consistent.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    get_calls: AtomicU64,
    get_hits: AtomicU64,
    get_misses: AtomicU64,
    loads: AtomicU64,
    load_failures: AtomicU64,
    load_waits: AtomicU64,
    releases: AtomicU64,
    stale_releases: AtomicU64,
}

impl CacheMetrics {
    /// Copies the counters; `live_entries` is supplied by the cache.
    pub fn snapshot(&self, live_entries: usize) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            get_calls: self.get_calls.load(Ordering::Relaxed),
            get_hits: self.get_hits.load(Ordering::Relaxed),
            get_misses: self.get_misses.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            load_waits: self.load_waits.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            stale_releases: self.stale_releases.load(Ordering::Relaxed),
            live_entries,
        }
    }
}

impl CacheMetricsRecorder for CacheMetrics {
    #[inline]
    fn record_get_call(&self) {
        self.get_calls.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_get_hit(&self) {
        self.get_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_get_miss(&self) {
        self.get_misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_load_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_load_wait(&self) {
        self.load_waits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_release(&self) {
        self.releases.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_stale_release(&self) {
        self.stale_releases.fetch_add(1, Ordering::Relaxed);
    }
}

impl MetricsReset for CacheMetrics {
    fn reset_metrics(&self) {
        for counter in [
            &self.get_calls,
            &self.get_hits,
            &self.get_misses,
            &self.loads,
            &self.load_failures,
            &self.load_waits,
            &self.releases,
            &self.stale_releases,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_snapshots() {
        let metrics = CacheMetrics::default();
        metrics.record_get_call();
        metrics.record_get_miss();
        metrics.record_load();
        metrics.record_get_call();
        metrics.record_get_hit();
        metrics.record_release();

        let snapshot = metrics.snapshot(3);
        assert_eq!(snapshot.get_calls, 2);
        assert_eq!(snapshot.get_hits, 1);
        assert_eq!(snapshot.get_misses, 1);
        assert_eq!(snapshot.loads, 1);
        assert_eq!(snapshot.releases, 1);
        assert_eq!(snapshot.live_entries, 3);
    }

    #[test]
    fn reset_zeroes_every_counter() {
        let metrics = CacheMetrics::default();
        metrics.record_get_call();
        metrics.record_load_failure();
        metrics.record_load_wait();
        metrics.record_stale_release();
        metrics.reset_metrics();
        assert_eq!(metrics.snapshot(0), CacheMetricsSnapshot::default());
    }
}
