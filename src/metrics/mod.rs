//! Observational counters for [`ResourceCache`](crate::cache::ResourceCache).
//!
//! Enabled by the `metrics` feature (on by default). Counters never affect
//! cache behavior; they are relaxed atomics read through
//! [`CacheMetricsSnapshot`] and published through a [`MetricsExporter`].
//!
//! ```text
//!   ResourceCache::get / release
//!            │ record_*
//!            ▼
//!   ┌──────────────────┐  snapshot()  ┌──────────────────────┐  export()  ┌─────────────────────────┐
//!   │   CacheMetrics   │─────────────►│ CacheMetricsSnapshot │───────────►│ PrometheusTextExporter  │
//!   │  (AtomicU64 x8)  │              │  + live_entries gauge│            │ (any MetricsExporter)   │
//!   └──────────────────┘              └──────────────────────┘            └─────────────────────────┘
//! ```

pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use exporter::PrometheusTextExporter;
pub use metrics_impl::CacheMetrics;
pub use snapshot::CacheMetricsSnapshot;
pub use traits::{CacheMetricsRecorder, MetricsExporter, MetricsReset, MetricsSnapshotProvider};
