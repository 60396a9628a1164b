//! Pool configuration and builder.
//!
//! [`PoolConfig`] carries the single tunable, total capacity, and can be
//! loaded from any serde format when the `serde` feature is enabled.
//! [`PoolBuilder`] turns a configuration plus a factory into a
//! [`RecencyPool`].
//!
//! ## Example
//!
//! ```rust
//! use std::convert::Infallible;
//!
//! use cardpool::builder::{PoolBuilder, PoolConfig};
//!
//! let config = PoolConfig { capacity: 12 };
//! let pool = PoolBuilder::from_config(config)
//!     .build::<String, (), _>(|name: &String, _: ()| Ok::<_, Infallible>(name.len()));
//!
//! assert_eq!(pool.capacity(), 12);
//! assert_eq!(pool.protected_capacity(), 3);
//! ```

use std::fmt::Debug;
use std::hash::Hash;

use crate::error::ConfigError;
use crate::policy::recency_pool::{MIN_CAPACITY, RecencyPool, protected_capacity_for};
use crate::traits::ArtifactFactory;

/// Default total capacity used by [`PoolConfig::default`].
pub const DEFAULT_CAPACITY: usize = 64;

/// Configuration for a [`RecencyPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfig {
    /// Total number of artifacts the pool retains.
    pub capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl PoolConfig {
    /// Rejects capacities below [`MIN_CAPACITY`].
    ///
    /// ```
    /// use cardpool::builder::PoolConfig;
    ///
    /// assert!(PoolConfig { capacity: 4 }.validate().is_ok());
    /// assert!(PoolConfig { capacity: 3 }.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity < MIN_CAPACITY {
            return Err(ConfigError::new(format!(
                "capacity must be at least {MIN_CAPACITY}, got {}",
                self.capacity
            )));
        }
        Ok(())
    }

    /// Capacity the pool will actually run with after clamping.
    pub fn effective_capacity(&self) -> usize {
        self.capacity.max(MIN_CAPACITY)
    }

    /// Size of the stateful reservation for this configuration.
    pub fn protected_capacity(&self) -> usize {
        protected_capacity_for(self.effective_capacity())
    }
}

/// Builder for [`RecencyPool`] instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoolBuilder {
    config: PoolConfig,
}

impl PoolBuilder {
    /// Starts a builder with the given total capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            config: PoolConfig { capacity },
        }
    }

    pub fn from_config(config: PoolConfig) -> Self {
        Self { config }
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Builds a pool, raising capacities below [`MIN_CAPACITY`] to the floor.
    pub fn build<K, P, F>(self, factory: F) -> RecencyPool<K, P, F>
    where
        K: Clone + Eq + Hash + Debug,
        F: ArtifactFactory<K, P>,
    {
        RecencyPool::new(self.config.capacity, factory)
    }

    /// Builds a pool, failing on capacities below [`MIN_CAPACITY`].
    pub fn try_build<K, P, F>(self, factory: F) -> Result<RecencyPool<K, P, F>, ConfigError>
    where
        K: Clone + Eq + Hash + Debug,
        F: ArtifactFactory<K, P>,
    {
        RecencyPool::try_new(self.config.capacity, factory)
    }

    /// Builds a [`ConcurrentRecencyPool`](crate::policy::recency_pool::ConcurrentRecencyPool).
    #[cfg(feature = "concurrency")]
    pub fn build_concurrent<K, P, F>(
        self,
        factory: F,
    ) -> crate::policy::recency_pool::ConcurrentRecencyPool<K, P, F>
    where
        K: Clone + Eq + Hash + Debug,
        F: ArtifactFactory<K, P>,
    {
        crate::policy::recency_pool::ConcurrentRecencyPool::new(self.config.capacity, factory)
    }
}
