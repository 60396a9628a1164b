//! # Metrics Traits
//!
//! Recording, snapshotting, and export are split into separate traits so the
//! pool only ever writes counters, tests and benches only read snapshots, and
//! monitoring backends only publish them.
//!
//! ```text
//!   ┌─────────────────────────────┐
//!   │    PoolMetricsRecorder      │  written by RecencyPool
//!   │  fetch / touch / evict ...  │
//!   └──────────────┬──────────────┘
//!                  │
//!   ┌──────────────┴───────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsExporter<S>           │
//!   │ (bench/test)                 │    │ (production monitoring)      │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```

/// Counters written by the pool on its mutating paths.
pub trait PoolMetricsRecorder {
    fn record_fetch_hit(&mut self);
    fn record_fetch_miss(&mut self);
    fn record_construction(&mut self);
    fn record_construction_failure(&mut self);
    fn record_touch_call(&mut self);
    fn record_touch_noop(&mut self);
    fn record_stateful_mark(&mut self);
    fn record_revival(&mut self);
    fn record_protected_dequeue(&mut self);
    fn record_eviction(&mut self);
    fn record_stalled_eviction(&mut self);
    fn record_removal(&mut self);
    fn record_clear(&mut self);
}

/// Counters written from `&self` paths (interior mutability).
pub trait PoolMetricsReadRecorder {
    fn record_peek_call(&self);
    fn record_peek_found(&self);
}

/// Snapshot provider for bench/testing.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Export/publish metrics to production monitoring backends.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
