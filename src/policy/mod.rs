//! Retention policies for named artifacts.
//!
//! - [`recency_pool`]: LRU eviction with a reserved partition for stateful
//!   entries

pub mod recency_pool;
