//! # Metrics Traits
//!
//! Recording, snapshotting, and export are split into small traits so the
//! cache only ever writes counters, tests and benches read snapshots, and
//! monitoring code publishes them.
//!
//! - [`CacheMetricsRecorder`]: written by the cache on every `get` and release.
//!   Takes `&self`; the cache records from behind shared references and from
//!   release callbacks running on arbitrary threads.
//! - [`MetricsSnapshotProvider`]: point-in-time copy for bench/test.
//! - [`MetricsReset`]: zero counters between bench iterations.
//! - [`MetricsExporter`]: publish a snapshot to a monitoring sink.

/// Counters recorded by a resource cache.
pub trait CacheMetricsRecorder {
    fn record_get_call(&self);
    fn record_get_hit(&self);
    fn record_get_miss(&self);
    fn record_load(&self);
    fn record_load_failure(&self);
    /// A `get` found another thread's load in flight and waited for it.
    fn record_load_wait(&self);
    fn record_release(&self);
    /// A release callback found a newer generation (or a pending load) under
    /// its key and left the entry alone.
    fn record_stale_release(&self);
}

/// Produce a point-in-time snapshot of metrics.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&self);
}

/// Publish a metrics snapshot to a monitoring system.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
