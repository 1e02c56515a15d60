/// Point-in-time copy of a cache's counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub loads: u64,
    pub load_failures: u64,
    pub load_waits: u64, // gets that blocked on another thread's in-flight load

    pub releases: u64,
    pub stale_releases: u64,

    // gauge captured at snapshot time
    pub live_entries: usize,
}

impl CacheMetricsSnapshot {
    /// Fraction of `get` calls answered from a live entry, or `0.0` before any call.
    pub fn hit_rate(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}
