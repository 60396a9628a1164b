use crate::metrics::cell::MetricsCell;
use crate::metrics::traits::{PoolMetricsReadRecorder, PoolMetricsRecorder};

// ---------------------------------------------------------------------------
// PoolMetrics
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct PoolMetrics {
    pub fetch_calls: u64,
    pub fetch_hits: u64,
    pub fetch_misses: u64,
    pub constructions: u64,
    pub construction_failures: u64,
    pub touch_calls: u64,
    pub touch_noops: u64,
    pub stateful_marks: u64,
    pub revivals: u64,
    pub protected_dequeues: u64,
    pub evictions: u64,
    pub stalled_evictions: u64,
    pub removals: u64,
    pub clears: u64,
    pub peek_calls: MetricsCell,
    pub peek_found: MetricsCell,
}

impl PoolMetricsRecorder for PoolMetrics {
    fn record_fetch_hit(&mut self) {
        self.fetch_calls += 1;
        self.fetch_hits += 1;
    }
    fn record_fetch_miss(&mut self) {
        self.fetch_calls += 1;
        self.fetch_misses += 1;
    }
    fn record_construction(&mut self) {
        self.constructions += 1;
    }
    fn record_construction_failure(&mut self) {
        self.construction_failures += 1;
    }
    fn record_touch_call(&mut self) {
        self.touch_calls += 1;
    }
    fn record_touch_noop(&mut self) {
        self.touch_noops += 1;
    }
    fn record_stateful_mark(&mut self) {
        self.stateful_marks += 1;
    }
    fn record_revival(&mut self) {
        self.revivals += 1;
    }
    fn record_protected_dequeue(&mut self) {
        self.protected_dequeues += 1;
    }
    fn record_eviction(&mut self) {
        self.evictions += 1;
    }
    fn record_stalled_eviction(&mut self) {
        self.stalled_evictions += 1;
    }
    fn record_removal(&mut self) {
        self.removals += 1;
    }
    fn record_clear(&mut self) {
        self.clears += 1;
    }
}

impl PoolMetricsReadRecorder for PoolMetrics {
    fn record_peek_call(&self) {
        self.peek_calls.incr();
    }
    fn record_peek_found(&self) {
        self.peek_found.incr();
    }
}
