pub use crate::builder::{DEFAULT_CAPACITY, PoolBuilder, PoolConfig};
pub use crate::ds::{IntrusiveList, RecencySet, SlotArena, SlotId};
pub use crate::error::{ConfigError, InvariantError};

#[cfg(feature = "metrics")]
pub use crate::metrics::exporter::PrometheusTextExporter;
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::PoolMetricsSnapshot;
#[cfg(feature = "metrics")]
pub use crate::metrics::traits::{MetricsExporter, MetricsSnapshotProvider};
#[cfg(feature = "concurrency")]
pub use crate::policy::recency_pool::ConcurrentRecencyPool;
pub use crate::policy::recency_pool::{
    MIN_CAPACITY, PROTECTED_DIVISOR, RecencyPool, protected_capacity_for,
};
pub use crate::traits::{ArtifactFactory, StatefulSignal};
