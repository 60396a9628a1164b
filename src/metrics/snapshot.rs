#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolMetricsSnapshot {
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
    pub stalled_evictions: u64, // passes over capacity where every name was protected

    pub removals: u64,
    pub clears: u64,

    pub peek_calls: u64,
    pub peek_found: u64,

    // gauges captured at snapshot time
    pub len: usize,
    pub protected_len: usize,
    pub capacity: usize,
    pub protected_capacity: usize,
}

impl PoolMetricsSnapshot {
    /// Fraction of fetches served from the pool, `0.0` before any fetch.
    pub fn hit_ratio(&self) -> f64 {
        if self.fetch_calls == 0 {
            return 0.0;
        }
        self.fetch_hits as f64 / self.fetch_calls as f64
    }
}
