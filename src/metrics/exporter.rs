use std::io::Write;
use std::sync::{Mutex, PoisonError};

use crate::metrics::snapshot::PoolMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for pool metrics snapshots.
///
/// Writes the Prometheus text exposition format so the output can be
/// scraped directly or forwarded to an OpenTelemetry collector. Write
/// failures are dropped; metrics never affect pool behavior.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the exporter and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_metric(&self, kind: &str, suffix: &str, value: u64) {
        let name = self.metric_name(suffix);
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(writer, "# TYPE {} {}", name, kind);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send> MetricsExporter<PoolMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &PoolMetricsSnapshot) {
        let counters = [
            ("fetch_calls_total", snapshot.fetch_calls),
            ("fetch_hits_total", snapshot.fetch_hits),
            ("fetch_misses_total", snapshot.fetch_misses),
            ("constructions_total", snapshot.constructions),
            ("construction_failures_total", snapshot.construction_failures),
            ("touch_calls_total", snapshot.touch_calls),
            ("touch_noops_total", snapshot.touch_noops),
            ("stateful_marks_total", snapshot.stateful_marks),
            ("revivals_total", snapshot.revivals),
            ("protected_dequeues_total", snapshot.protected_dequeues),
            ("evictions_total", snapshot.evictions),
            ("stalled_evictions_total", snapshot.stalled_evictions),
            ("removals_total", snapshot.removals),
            ("clears_total", snapshot.clears),
            ("peek_calls_total", snapshot.peek_calls),
            ("peek_found_total", snapshot.peek_found),
        ];
        for (suffix, value) in counters {
            self.write_metric("counter", suffix, value);
        }

        let gauges = [
            ("len", snapshot.len),
            ("protected_len", snapshot.protected_len),
            ("capacity", snapshot.capacity),
            ("protected_capacity", snapshot.protected_capacity),
        ];
        for (suffix, value) in gauges {
            self.write_metric("gauge", suffix, value as u64);
        }
    }
}
