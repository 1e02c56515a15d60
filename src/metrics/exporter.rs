use std::io::Write;

use parking_lot::Mutex;

use crate::metrics::snapshot::CacheMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for cache metrics snapshots.
///
/// This exporter writes in the Prometheus text exposition format so it can be
/// scraped by Prometheus or forwarded to an OpenTelemetry collector. Each
/// series carries a `cache="<label>"` label when a cache label is set.
///
/// # Example
///
/// ```
/// use rescache::metrics::{CacheMetricsSnapshot, MetricsExporter, PrometheusTextExporter};
///
/// let exporter = PrometheusTextExporter::new("rescache", Vec::new()).with_cache_label("programs");
/// exporter.export(&CacheMetricsSnapshot { get_calls: 3, ..Default::default() });
///
/// let text = String::from_utf8(exporter.into_inner()).unwrap();
/// assert!(text.contains("rescache_get_calls_total{cache=\"programs\"} 3"));
/// ```
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send> {
    prefix: String,
    cache_label: Option<String>,
    writer: Mutex<W>,
}

impl<W: Write + Send> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            cache_label: None,
            writer: Mutex::new(writer),
        }
    }

    /// Tags every series with `cache="<label>"`.
    pub fn with_cache_label(mut self, label: impl Into<String>) -> Self {
        self.cache_label = Some(label.into());
        self
    }

    /// Consumes the exporter and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_metric(&self, kind: &str, suffix: &str, value: u64) {
        let name = self.metric_name(suffix);
        let labels = match &self.cache_label {
            Some(label) => format!("{{cache=\"{}\"}}", escape_label(label)),
            None => String::new(),
        };
        let mut writer = self.writer.lock();
        let _ = writeln!(writer, "# TYPE {} {}", name, kind);
        let _ = writeln!(writer, "{}{} {}", name, labels, value);
    }

    fn write_counter(&self, suffix: &str, value: u64) {
        self.write_metric("counter", suffix, value);
    }

    fn write_gauge(&self, suffix: &str, value: u64) {
        self.write_metric("gauge", suffix, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

impl<W: Write + Send> MetricsExporter<CacheMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &CacheMetricsSnapshot) {
        self.write_counter("get_calls_total", snapshot.get_calls);
        self.write_counter("get_hits_total", snapshot.get_hits);
        self.write_counter("get_misses_total", snapshot.get_misses);
        self.write_counter("loads_total", snapshot.loads);
        self.write_counter("load_failures_total", snapshot.load_failures);
        self.write_counter("load_waits_total", snapshot.load_waits);
        self.write_counter("releases_total", snapshot.releases);
        self.write_counter("stale_releases_total", snapshot.stale_releases);
        self.write_gauge("live_entries", snapshot.live_entries as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(exporter: PrometheusTextExporter<Vec<u8>>) -> String {
        String::from_utf8(exporter.into_inner()).unwrap()
    }

    #[test]
    fn writes_type_lines_and_values() {
        let exporter = PrometheusTextExporter::new("rc", Vec::new());
        exporter.export(&CacheMetricsSnapshot {
            get_calls: 10,
            get_hits: 7,
            live_entries: 2,
            ..CacheMetricsSnapshot::default()
        });

        let text = render(exporter);
        assert!(text.contains("# TYPE rc_get_calls_total counter\nrc_get_calls_total 10\n"));
        assert!(text.contains("rc_get_hits_total 7\n"));
        assert!(text.contains("# TYPE rc_live_entries gauge\nrc_live_entries 2\n"));
    }

    #[test]
    fn empty_prefix_uses_bare_names() {
        let exporter = PrometheusTextExporter::new("", Vec::new());
        exporter.export(&CacheMetricsSnapshot::default());
        assert!(render(exporter).contains("\nloads_total 0\n"));
    }

    #[test]
    fn cache_label_is_escaped() {
        let exporter = PrometheusTextExporter::new("rc", Vec::new()).with_cache_label("a\"b");
        exporter.export(&CacheMetricsSnapshot::default());
        assert!(render(exporter).contains("rc_releases_total{cache=\"a\\\"b\"} 0"));
    }
}
