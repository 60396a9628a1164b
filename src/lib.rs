//! cardpool: a bounded, recency-ordered pool of expensive-to-build artifacts.
//!
//! Artifacts ("cards") are cached by name and built on demand by a
//! caller-supplied [`ArtifactFactory`](traits::ArtifactFactory). When the pool
//! overflows, the least recently used entry is evicted, except that entries
//! flagged stateful hold a small reserved partition and are skipped until
//! newer stateful entries displace them.
//!
//! Start with [`RecencyPool`](policy::recency_pool::RecencyPool) or
//! [`PoolBuilder`](builder::PoolBuilder).

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;
