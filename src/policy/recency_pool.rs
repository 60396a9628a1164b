//! Recency pool with a reserved partition for stateful entries.
//!
//! Holds expensive-to-construct artifacts ("cards") by name and evicts the
//! least recently used one once capacity is exceeded. A quarter of the
//! capacity is reserved for entries flagged *stateful*: those are skipped by
//! eviction until newer stateful entries push them out of the reservation.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                        RecencyPool<K, P, F> Layout                          │
//! │                                                                             │
//! │   artifacts: FxHashMap<K, Arc<A>>                                           │
//! │   ┌──────────┬────────────┐                                                 │
//! │   │  "deck"  │  Arc<A>    │     ◄── every name in `recency` has an entry    │
//! │   │  "hand"  │  Arc<A>    │                                                 │
//! │   │  "menu"  │  Arc<A>    │                                                 │
//! │   └──────────┴────────────┘                                                 │
//! │                                                                             │
//! │   recency (all live names)          protected (stateful names, ⊆ recency)   │
//! │   oldest ─────────────► newest      oldest ─────────────► newest            │
//! │   [menu] ◄─► [deck] ◄─► [hand]      [deck]                                  │
//! │                                                                             │
//! │   capacity            = max(4, configured)                                  │
//! │   protected_capacity  = max(1, ceil(capacity / 4))                          │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Fetch Flow
//! ──────────
//!
//! ```text
//!   fetch(name, payload):
//!     stored?            → clone Arc, touch(name), evict pass, return it
//!     payload supplied?  → factory.build(name, payload)?, store, touch, evict pass
//!     otherwise          → None, nothing changes
//! ```
//!
//! Touch Flow
//! ──────────
//!
//! ```text
//!   touch(name, stateful):
//!     not stored and no stateful ref → no-op
//!     recency.move_to_newest(name)
//!     if stateful ref:
//!       protected.move_to_newest(name)
//!       not stored → reinsert_existing(name, ref)     (revival, no factory call)
//!     evict pass
//! ```
//!
//! Eviction Pass
//! ─────────────
//!
//! ```text
//!   1. |protected| > protected_capacity → dequeue oldest protected name
//!      (storage and recency untouched; the name just loses protection)
//!   2. |recency| > capacity → scan oldest → newest, evict the first name not
//!      in `protected`; if every name is protected, evict nothing this pass
//! ```
//!
//! At most one dequeue and one eviction happen per pass. Each public call
//! grows the structures by at most one name, so sizes stay within one slot
//! of their capacities.
//!
//! ## Operations
//!
//! | Operation       | Time        | Notes                                    |
//! |-----------------|-------------|------------------------------------------|
//! | `fetch`         | O(capacity) | Hit, construct-on-miss, or `None`        |
//! | `touch`         | O(capacity) | Worst case is the eviction scan          |
//! | `mark_stateful` | O(capacity) | `touch` with a live reference            |
//! | `peek`          | O(1)        | No recency update                        |
//! | `remove`        | O(1)        | Drops the name from all three structures |
//!
//! ## Unprotected Grace Period
//!
//! A name dequeued from `protected` keeps its storage entry and its place in
//! `recency`. If no later call pushes `recency` over capacity it stays cached,
//! unprotected, indefinitely. This is observed behavior carried over as-is;
//! see `dequeued_name_lingers_until_overflow` in the tests.
//!
//! ## Example Usage
//!
//! ```
//! use std::convert::Infallible;
//!
//! use cardpool::policy::recency_pool::RecencyPool;
//!
//! let mut pool = RecencyPool::<&str, u32, _>::new(4, |name: &&str, seed: u32| {
//!     Ok::<_, Infallible>(format!("{name}:{seed}"))
//! });
//!
//! for name in ["a", "b", "c", "d"] {
//!     pool.fetch(&name, Some(1)).unwrap();
//! }
//!
//! // Flag "a" stateful using the live reference the caller already holds
//! let card = pool.fetch(&"a", None).unwrap().unwrap();
//! pool.mark_stateful(&"a", card);
//!
//! // Overflow evicts the oldest unprotected name
//! pool.fetch(&"e", Some(1)).unwrap();
//! assert!(pool.contains(&"a"));
//! assert!(!pool.contains(&"b"));
//! ```
//!
//! ## Thread Safety
//!
//! - [`RecencyPool`]: not thread-safe, single caller at a time
//! - [`ConcurrentRecencyPool`] (feature `concurrency`): one mutex around the
//!   whole pool, so storage and both sets are always updated together

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::builder::PoolConfig;
use crate::ds::RecencySet;
use crate::error::{ConfigError, InvariantError};
use crate::traits::{ArtifactFactory, StatefulSignal};

#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::PoolMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::PoolMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    MetricsSnapshotProvider, PoolMetricsReadRecorder, PoolMetricsRecorder,
};

/// Smallest total capacity a pool will run with.
pub const MIN_CAPACITY: usize = 4;

/// Total capacity is divided by this (rounding up) to size the reservation.
pub const PROTECTED_DIVISOR: usize = 4;

/// Number of stateful slots reserved out of `capacity`.
///
/// ```
/// use cardpool::policy::recency_pool::protected_capacity_for;
///
/// assert_eq!(protected_capacity_for(4), 1);
/// assert_eq!(protected_capacity_for(5), 2);
/// assert_eq!(protected_capacity_for(64), 16);
/// ```
#[inline]
pub fn protected_capacity_for(capacity: usize) -> usize {
    capacity.div_ceil(PROTECTED_DIVISOR).max(1)
}

/// Bounded cache of named artifacts with LRU eviction and a reserved
/// partition for stateful entries.
///
/// # Type Parameters
///
/// - `K`: Name type, must be `Clone + Eq + Hash + Debug`
/// - `P`: Payload handed to the factory on a miss
/// - `F`: The [`ArtifactFactory`]
///
/// # Example
///
/// ```
/// use std::convert::Infallible;
///
/// use cardpool::policy::recency_pool::RecencyPool;
///
/// let mut pool = RecencyPool::<String, usize, _>::new(16, |name: &String, width: usize| {
///     Ok::<_, Infallible>(vec![name.clone(); width])
/// });
///
/// let deck = "deck".to_string();
///
/// // Miss without payload: nothing to build from
/// assert!(pool.fetch(&deck, None).unwrap().is_none());
///
/// // Miss with payload: built once, then served from the pool
/// let built = pool.fetch(&deck, Some(2)).unwrap().unwrap();
/// let again = pool.fetch(&deck, Some(99)).unwrap().unwrap();
/// assert!(std::sync::Arc::ptr_eq(&built, &again));
/// assert_eq!(again.len(), 2);
/// ```
pub struct RecencyPool<K, P, F>
where
    K: Clone + Eq + Hash + fmt::Debug,
    F: ArtifactFactory<K, P>,
{
    factory: F,
    artifacts: FxHashMap<K, Arc<F::Artifact>>,
    /// Every live name, oldest first.
    recency: RecencySet<K>,
    /// Names currently flagged stateful, oldest first.
    protected: RecencySet<K>,
    capacity: usize,
    protected_capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: PoolMetrics,
    _payload: PhantomData<fn(P)>,
}

impl<K, P, F> RecencyPool<K, P, F>
where
    K: Clone + Eq + Hash + fmt::Debug,
    F: ArtifactFactory<K, P>,
{
    /// Creates a pool holding up to `capacity` artifacts.
    ///
    /// Capacities below [`MIN_CAPACITY`] are raised to it. The protected
    /// reservation is `max(1, ceil(capacity / 4))`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::convert::Infallible;
    ///
    /// use cardpool::policy::recency_pool::RecencyPool;
    ///
    /// let pool = RecencyPool::<u32, (), _>::new(1, |n: &u32, _: ()| Ok::<_, Infallible>(*n));
    /// assert_eq!(pool.capacity(), 4);
    /// assert_eq!(pool.protected_capacity(), 1);
    /// ```
    pub fn new(capacity: usize, factory: F) -> Self {
        let capacity = capacity.max(MIN_CAPACITY);
        let protected_capacity = protected_capacity_for(capacity);

        Self {
            factory,
            artifacts: FxHashMap::with_capacity_and_hasher(capacity + 1, Default::default()),
            recency: RecencySet::with_capacity(capacity + 1),
            protected: RecencySet::with_capacity(protected_capacity + 1),
            capacity,
            protected_capacity,
            #[cfg(feature = "metrics")]
            metrics: PoolMetrics::default(),
            _payload: PhantomData,
        }
    }

    /// Creates a pool, rejecting capacities below [`MIN_CAPACITY`] instead
    /// of raising them.
    pub fn try_new(capacity: usize, factory: F) -> Result<Self, ConfigError> {
        PoolConfig { capacity }.validate()?;
        Ok(Self::new(capacity, factory))
    }

    /// Returns the artifact cached under `name`, building it from `payload`
    /// on a miss.
    ///
    /// - Cached: the stored artifact is returned and `name` becomes newest.
    /// - Not cached, `payload` given: the factory builds it, it is stored,
    ///   and `name` becomes newest.
    /// - Not cached, no payload: `Ok(None)`, nothing changes.
    ///
    /// A factory error is returned unchanged and leaves the pool exactly as
    /// it was.
    pub fn fetch(
        &mut self,
        name: &K,
        payload: Option<P>,
    ) -> Result<Option<Arc<F::Artifact>>, F::Error> {
        if let Some(artifact) = self.artifacts.get(name) {
            let artifact = Arc::clone(artifact);
            #[cfg(feature = "metrics")]
            self.metrics.record_fetch_hit();
            self.touch(name, None);
            return Ok(Some(artifact));
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_fetch_miss();

        let Some(payload) = payload else {
            return Ok(None);
        };

        let artifact = self.construct_and_insert(name, payload)?;
        self.touch(name, None);
        Ok(Some(artifact))
    }

    /// Records that `name` was just used.
    ///
    /// With `stateful` set, `name` is also moved to the newest end of the
    /// protected set; if the pool no longer stores `name`, the supplied
    /// reference is reinstated without calling the factory.
    ///
    /// Returns `false` (and changes nothing) when `name` is not stored and no
    /// reference was supplied.
    pub fn touch(&mut self, name: &K, stateful: Option<Arc<F::Artifact>>) -> bool {
        #[cfg(feature = "metrics")]
        self.metrics.record_touch_call();

        let stored = self.artifacts.contains_key(name);
        if !stored && stateful.is_none() {
            #[cfg(feature = "metrics")]
            self.metrics.record_touch_noop();
            trace!(name = ?name, "touch ignored for unknown name");
            return false;
        }

        self.recency.touch(name);

        let is_stateful = stateful.is_some();
        if let Some(artifact) = stateful {
            #[cfg(feature = "metrics")]
            self.metrics.record_stateful_mark();
            self.protected.touch(name);
            if !stored {
                self.reinsert_existing(name, artifact);
            }
        }

        trace!(name = ?name, stateful = is_stateful, "touched");
        self.evict_pass();
        true
    }

    /// Flags `name` as stateful using a live reference held by the caller.
    ///
    /// Equivalent to `touch(name, Some(artifact))`.
    #[inline]
    pub fn mark_stateful(&mut self, name: &K, artifact: Arc<F::Artifact>) {
        self.touch(name, Some(artifact));
    }

    /// Returns the cached artifact without affecting recency.
    pub fn peek(&self, name: &K) -> Option<&F::Artifact> {
        #[cfg(feature = "metrics")]
        self.metrics.record_peek_call();

        let artifact = self.artifacts.get(name)?;

        #[cfg(feature = "metrics")]
        self.metrics.record_peek_found();
        Some(artifact.as_ref())
    }

    /// Drops `name` from storage and both recency sets.
    pub fn remove(&mut self, name: &K) -> Option<Arc<F::Artifact>> {
        self.protected.remove(name);
        self.recency.remove(name);
        let removed = self.artifacts.remove(name);
        if removed.is_some() {
            #[cfg(feature = "metrics")]
            self.metrics.record_removal();
            debug!(name = ?name, "removed artifact");
        }
        removed
    }

    /// Empties the pool.
    pub fn clear(&mut self) {
        self.artifacts.clear();
        self.recency.clear();
        self.protected.clear();
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
    }

    #[inline]
    pub fn contains(&self, name: &K) -> bool {
        self.artifacts.contains_key(name)
    }

    /// Returns `true` if `name` currently holds a protected slot.
    #[inline]
    pub fn is_protected(&self, name: &K) -> bool {
        self.protected.contains(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    #[inline]
    pub fn protected_len(&self) -> usize {
        self.protected.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn protected_capacity(&self) -> usize {
        self.protected_capacity
    }

    /// Live names from least to most recently used.
    pub fn recency_order(&self) -> impl Iterator<Item = &K> + '_ {
        self.recency.iter()
    }

    /// Protected names from least to most recently flagged.
    pub fn protected_order(&self) -> impl Iterator<Item = &K> + '_ {
        self.protected.iter()
    }

    /// Verifies that storage and both recency sets agree.
    ///
    /// Checks:
    /// - every name in `recency` is stored, and the counts match
    /// - every protected name is in `recency`
    /// - neither set is more than one name over its capacity
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.recency.len() != self.artifacts.len() {
            return Err(InvariantError::new(format!(
                "recency set holds {} names but storage holds {}",
                self.recency.len(),
                self.artifacts.len()
            )));
        }
        if let Some(name) = self.recency.iter().find(|n| !self.artifacts.contains_key(*n)) {
            return Err(InvariantError::new(format!(
                "{:?} is in the recency set but not stored",
                name
            )));
        }
        if let Some(name) = self.protected.iter().find(|n| !self.recency.contains(n)) {
            return Err(InvariantError::new(format!(
                "{:?} is protected but not in the recency set",
                name
            )));
        }
        if self.recency.len() > self.capacity + 1 {
            return Err(InvariantError::new(format!(
                "recency set holds {} names, capacity is {}",
                self.recency.len(),
                self.capacity
            )));
        }
        if self.protected.len() > self.protected_capacity + 1 {
            return Err(InvariantError::new(format!(
                "protected set holds {} names, reservation is {}",
                self.protected.len(),
                self.protected_capacity
            )));
        }
        Ok(())
    }

    fn construct_and_insert(
        &mut self,
        name: &K,
        payload: P,
    ) -> Result<Arc<F::Artifact>, F::Error> {
        let artifact = match self.factory.build(name, payload) {
            Ok(artifact) => Arc::new(artifact),
            Err(err) => {
                #[cfg(feature = "metrics")]
                self.metrics.record_construction_failure();
                warn!(name = ?name, "artifact construction failed");
                return Err(err);
            },
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_construction();
        debug!(name = ?name, "constructed artifact");

        self.artifacts.insert(name.clone(), Arc::clone(&artifact));
        Ok(artifact)
    }

    /// Reinstates an evicted name from a reference that outlived eviction.
    fn reinsert_existing(&mut self, name: &K, artifact: Arc<F::Artifact>) {
        #[cfg(feature = "metrics")]
        self.metrics.record_revival();
        debug!(name = ?name, "revived artifact from live reference");
        self.artifacts.insert(name.clone(), artifact);
    }

    fn evict_pass(&mut self) {
        if self.protected.len() > self.protected_capacity
            && let Some(name) = self.protected.pop_oldest()
        {
            #[cfg(feature = "metrics")]
            self.metrics.record_protected_dequeue();
            debug!(name = ?name, "protection revoked");
        }

        if self.recency.len() <= self.capacity {
            return;
        }

        let victim = self
            .recency
            .iter()
            .find(|name| !self.protected.contains(name))
            .cloned();

        match victim {
            Some(name) => {
                self.recency.remove(&name);
                self.artifacts.remove(&name);
                #[cfg(feature = "metrics")]
                self.metrics.record_eviction();
                debug!(name = ?name, "evicted least recently used artifact");
            },
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_stalled_eviction();
                debug!(
                    len = self.recency.len(),
                    capacity = self.capacity,
                    "every entry is protected; eviction deferred"
                );
            },
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, P, F> RecencyPool<K, P, F>
where
    K: Clone + Eq + Hash + fmt::Debug,
    F: ArtifactFactory<K, P>,
{
    pub fn metrics_snapshot(&self) -> PoolMetricsSnapshot {
        PoolMetricsSnapshot {
            fetch_calls: self.metrics.fetch_calls,
            fetch_hits: self.metrics.fetch_hits,
            fetch_misses: self.metrics.fetch_misses,
            constructions: self.metrics.constructions,
            construction_failures: self.metrics.construction_failures,
            touch_calls: self.metrics.touch_calls,
            touch_noops: self.metrics.touch_noops,
            stateful_marks: self.metrics.stateful_marks,
            revivals: self.metrics.revivals,
            protected_dequeues: self.metrics.protected_dequeues,
            evictions: self.metrics.evictions,
            stalled_evictions: self.metrics.stalled_evictions,
            removals: self.metrics.removals,
            clears: self.metrics.clears,
            peek_calls: self.metrics.peek_calls.get(),
            peek_found: self.metrics.peek_found.get(),
            len: self.len(),
            protected_len: self.protected_len(),
            capacity: self.capacity,
            protected_capacity: self.protected_capacity,
        }
    }

    pub fn reset_metrics(&mut self) {
        self.metrics = PoolMetrics::default();
    }
}

#[cfg(feature = "metrics")]
impl<K, P, F> MetricsSnapshotProvider<PoolMetricsSnapshot> for RecencyPool<K, P, F>
where
    K: Clone + Eq + Hash + fmt::Debug,
    F: ArtifactFactory<K, P>,
{
    fn snapshot(&self) -> PoolMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, P, F> StatefulSignal<K, F::Artifact> for RecencyPool<K, P, F>
where
    K: Clone + Eq + Hash + fmt::Debug,
    F: ArtifactFactory<K, P>,
{
    fn signal_stateful(&mut self, name: &K, artifact: Arc<F::Artifact>) {
        self.mark_stateful(name, artifact);
    }
}

impl<K, P, F> fmt::Debug for RecencyPool<K, P, F>
where
    K: Clone + Eq + Hash + fmt::Debug,
    F: ArtifactFactory<K, P>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecencyPool")
            .field("capacity", &self.capacity)
            .field("protected_capacity", &self.protected_capacity)
            .field("len", &self.artifacts.len())
            .field("protected_len", &self.protected.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// ConcurrentRecencyPool
// ---------------------------------------------------------------------------

/// Thread-safe wrapper holding the whole pool behind one mutex.
///
/// Storage and both recency sets change together on every call, so they are
/// guarded as a single unit; no caller can observe one updated without the
/// others. The factory runs while the lock is held and must not call back
/// into the pool.
///
/// # Example
///
/// ```
/// use std::convert::Infallible;
/// use std::sync::Arc;
///
/// use cardpool::policy::recency_pool::ConcurrentRecencyPool;
///
/// let pool = Arc::new(ConcurrentRecencyPool::<u64, u64, _>::new(8, |id: &u64, scale: u64| {
///     Ok::<_, Infallible>(id * scale)
/// }));
///
/// let handles: Vec<_> = (0..4u64)
///     .map(|t| {
///         let pool = Arc::clone(&pool);
///         std::thread::spawn(move || pool.fetch(&t, Some(10)).unwrap())
///     })
///     .collect();
/// for handle in handles {
///     assert!(handle.join().unwrap().is_some());
/// }
/// assert_eq!(pool.len(), 4);
/// ```
#[cfg(feature = "concurrency")]
pub struct ConcurrentRecencyPool<K, P, F>
where
    K: Clone + Eq + Hash + fmt::Debug,
    F: ArtifactFactory<K, P>,
{
    inner: parking_lot::Mutex<RecencyPool<K, P, F>>,
}

#[cfg(feature = "concurrency")]
impl<K, P, F> ConcurrentRecencyPool<K, P, F>
where
    K: Clone + Eq + Hash + fmt::Debug,
    F: ArtifactFactory<K, P>,
{
    /// See [`RecencyPool::new`].
    pub fn new(capacity: usize, factory: F) -> Self {
        Self::from_pool(RecencyPool::new(capacity, factory))
    }

    /// See [`RecencyPool::try_new`].
    pub fn try_new(capacity: usize, factory: F) -> Result<Self, ConfigError> {
        RecencyPool::try_new(capacity, factory).map(Self::from_pool)
    }

    pub fn from_pool(pool: RecencyPool<K, P, F>) -> Self {
        Self {
            inner: parking_lot::Mutex::new(pool),
        }
    }

    pub fn into_inner(self) -> RecencyPool<K, P, F> {
        self.inner.into_inner()
    }

    /// See [`RecencyPool::fetch`].
    pub fn fetch(
        &self,
        name: &K,
        payload: Option<P>,
    ) -> Result<Option<Arc<F::Artifact>>, F::Error> {
        self.inner.lock().fetch(name, payload)
    }

    /// See [`RecencyPool::touch`].
    pub fn touch(&self, name: &K, stateful: Option<Arc<F::Artifact>>) -> bool {
        self.inner.lock().touch(name, stateful)
    }

    /// See [`RecencyPool::mark_stateful`].
    pub fn mark_stateful(&self, name: &K, artifact: Arc<F::Artifact>) {
        self.inner.lock().mark_stateful(name, artifact);
    }

    /// Shared-reference form of [`StatefulSignal::signal_stateful`].
    pub fn signal_stateful(&self, name: &K, artifact: Arc<F::Artifact>) {
        self.mark_stateful(name, artifact);
    }

    /// Returns a clone of the cached artifact without affecting recency.
    pub fn peek(&self, name: &K) -> Option<Arc<F::Artifact>> {
        let pool = self.inner.lock();
        pool.artifacts.get(name).cloned()
    }

    pub fn remove(&self, name: &K) -> Option<Arc<F::Artifact>> {
        self.inner.lock().remove(name)
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn contains(&self, name: &K) -> bool {
        self.inner.lock().contains(name)
    }

    pub fn is_protected(&self, name: &K) -> bool {
        self.inner.lock().is_protected(name)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn protected_len(&self) -> usize {
        self.inner.lock().protected_len()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn protected_capacity(&self) -> usize {
        self.inner.lock().protected_capacity()
    }

    /// Runs `f` with exclusive access to the underlying pool.
    pub fn with_pool<R>(&self, f: impl FnOnce(&mut RecencyPool<K, P, F>) -> R) -> R {
        let mut pool = self.inner.lock();
        f(&mut pool)
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.lock().check_invariants()
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> PoolMetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

#[cfg(feature = "concurrency")]
impl<K, P, F> StatefulSignal<K, F::Artifact> for ConcurrentRecencyPool<K, P, F>
where
    K: Clone + Eq + Hash + fmt::Debug,
    F: ArtifactFactory<K, P>,
{
    fn signal_stateful(&mut self, name: &K, artifact: Arc<F::Artifact>) {
        self.inner.get_mut().mark_stateful(name, artifact);
    }
}

#[cfg(feature = "concurrency")]
impl<K, P, F> fmt::Debug for ConcurrentRecencyPool<K, P, F>
where
    K: Clone + Eq + Hash + fmt::Debug,
    F: ArtifactFactory<K, P>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(pool) => f.debug_tuple("ConcurrentRecencyPool").field(&*pool).finish(),
            None => f.write_str("ConcurrentRecencyPool { <locked> }"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::convert::Infallible;
    use std::rc::Rc;

    type NameFactory = fn(&&'static str, u32) -> Result<String, Infallible>;

    fn build_card(name: &&'static str, payload: u32) -> Result<String, Infallible> {
        Ok(format!("{name}#{payload}"))
    }

    fn pool(capacity: usize) -> RecencyPool<&'static str, u32, NameFactory> {
        RecencyPool::new(capacity, build_card as NameFactory)
    }

    fn insert_all(pool: &mut RecencyPool<&'static str, u32, NameFactory>, names: &[&'static str]) {
        for name in names {
            pool.fetch(name, Some(0)).unwrap();
        }
    }

    fn order(pool: &RecencyPool<&'static str, u32, NameFactory>) -> Vec<&'static str> {
        pool.recency_order().copied().collect()
    }

    fn protected(pool: &RecencyPool<&'static str, u32, NameFactory>) -> Vec<&'static str> {
        pool.protected_order().copied().collect()
    }

    fn card(name: &str) -> Arc<String> {
        Arc::new(format!("{name}#live"))
    }

    // ==============================================
    // Construction
    // ==============================================

    mod construction {
        use super::*;

        #[test]
        fn capacity_below_floor_is_raised() {
            for requested in [0, 1, 3] {
                let pool = pool(requested);
                assert_eq!(pool.capacity(), MIN_CAPACITY);
                assert_eq!(pool.protected_capacity(), 1);
            }
        }

        #[test]
        fn protected_capacity_rounds_up() {
            assert_eq!(pool(4).protected_capacity(), 1);
            assert_eq!(pool(5).protected_capacity(), 2);
            assert_eq!(pool(8).protected_capacity(), 2);
            assert_eq!(pool(9).protected_capacity(), 3);
            assert_eq!(pool(100).protected_capacity(), 25);
        }

        #[test]
        fn try_new_rejects_capacity_below_floor() {
            let err = RecencyPool::<&'static str, u32, NameFactory>::try_new(3, build_card).unwrap_err();
            assert!(err.message().contains("capacity"));

            let ok = RecencyPool::<&'static str, u32, NameFactory>::try_new(4, build_card).unwrap();
            assert_eq!(ok.capacity(), 4);
        }

        #[test]
        fn new_pool_is_empty() {
            let pool = pool(10);
            assert!(pool.is_empty());
            assert_eq!(pool.len(), 0);
            assert_eq!(pool.protected_len(), 0);
            assert!(pool.check_invariants().is_ok());
        }
    }

    // ==============================================
    // Fetch
    // ==============================================

    mod fetch {
        use super::*;

        #[test]
        fn miss_without_payload_is_absent_and_side_effect_free() {
            let mut pool = pool(4);
            insert_all(&mut pool, &["a", "b"]);
            let before = order(&pool);

            assert_eq!(pool.fetch(&"ghost", None).unwrap(), None);
            assert_eq!(order(&pool), before);
            assert!(!pool.contains(&"ghost"));
        }

        #[test]
        fn miss_with_payload_constructs_and_becomes_newest() {
            let mut pool = pool(4);
            insert_all(&mut pool, &["a"]);

            let built = pool.fetch(&"b", Some(7)).unwrap().unwrap();
            assert_eq!(built.as_str(), "b#7");
            assert_eq!(order(&pool), vec!["a", "b"]);
        }

        #[test]
        fn hit_returns_stored_artifact_and_ignores_payload() {
            let mut pool = pool(4);
            let first = pool.fetch(&"a", Some(1)).unwrap().unwrap();
            let second = pool.fetch(&"a", Some(2)).unwrap().unwrap();

            assert!(Arc::ptr_eq(&first, &second));
            assert_eq!(second.as_str(), "a#1");
        }

        #[test]
        fn hit_moves_name_to_newest() {
            let mut pool = pool(4);
            insert_all(&mut pool, &["a", "b", "c"]);

            pool.fetch(&"a", None).unwrap();
            assert_eq!(order(&pool), vec!["b", "c", "a"]);
        }

        #[test]
        fn factory_runs_once_per_residency() {
            let calls = Rc::new(Cell::new(0));
            let counter = Rc::clone(&calls);
            let mut pool = RecencyPool::<&str, u32, _>::new(4, move |name: &&str, n: u32| {
                counter.set(counter.get() + 1);
                Ok::<_, Infallible>(format!("{name}{n}"))
            });

            pool.fetch(&"a", Some(1)).unwrap();
            pool.fetch(&"a", Some(1)).unwrap();
            pool.fetch(&"a", None).unwrap();
            assert_eq!(calls.get(), 1);

            for name in ["b", "c", "d", "e"] {
                pool.fetch(&name, Some(1)).unwrap();
            }
            assert!(!pool.contains(&"a"));

            pool.fetch(&"a", Some(2)).unwrap();
            assert_eq!(calls.get(), 6);
        }

        #[test]
        fn factory_error_propagates_and_leaves_pool_unchanged() {
            let mut pool = RecencyPool::<&str, i32, _>::new(4, |name: &&str, n: i32| {
                if n < 0 {
                    Err(format!("cannot build {name} from {n}"))
                } else {
                    Ok(n)
                }
            });
            pool.fetch(&"a", Some(1)).unwrap();
            pool.fetch(&"b", Some(2)).unwrap();

            let err = pool.fetch(&"bad", Some(-1)).unwrap_err();
            assert_eq!(err, "cannot build bad from -1");

            assert!(!pool.contains(&"bad"));
            assert_eq!(pool.len(), 2);
            assert_eq!(pool.recency_order().copied().collect::<Vec<_>>(), vec!["a", "b"]);
            assert!(pool.check_invariants().is_ok());
        }
    }

    // ==============================================
    // Touch
    // ==============================================

    mod touch {
        use super::*;

        #[test]
        fn unknown_name_without_reference_is_noop() {
            let mut pool = pool(4);
            insert_all(&mut pool, &["a", "b"]);

            assert!(!pool.touch(&"ghost", None));
            assert_eq!(order(&pool), vec!["a", "b"]);
            assert!(protected(&pool).is_empty());
        }

        #[test]
        fn touch_moves_to_newest() {
            let mut pool = pool(4);
            insert_all(&mut pool, &["a", "b", "c"]);

            assert!(pool.touch(&"b", None));
            assert_eq!(order(&pool), vec!["a", "c", "b"]);
        }

        #[test]
        fn touching_newest_twice_is_idempotent() {
            let mut pool = pool(6);
            insert_all(&mut pool, &["a", "b", "x"]);
            pool.mark_stateful(&"a", card("a"));
            pool.touch(&"x", None);
            let recency_before = order(&pool);
            let protected_before = protected(&pool);

            pool.touch(&"x", None);
            pool.touch(&"x", None);

            assert_eq!(order(&pool), recency_before);
            assert_eq!(protected(&pool), protected_before);
        }

        #[test]
        fn stateful_reference_protects_existing_entry_without_replacing_it() {
            let mut pool = pool(4);
            let stored = pool.fetch(&"a", Some(3)).unwrap().unwrap();

            pool.mark_stateful(&"a", card("a"));

            assert!(pool.is_protected(&"a"));
            assert_eq!(pool.peek(&"a"), Some(stored.as_ref()));
        }

        #[test]
        fn stateful_signal_trait_routes_to_mark_stateful() {
            fn signal<S: StatefulSignal<&'static str, String>>(s: &mut S) {
                s.signal_stateful(&"a", card("a"));
            }

            let mut pool = pool(4);
            insert_all(&mut pool, &["a", "b"]);
            signal(&mut pool);

            assert!(pool.is_protected(&"a"));
            assert_eq!(order(&pool), vec!["b", "a"]);
        }
    }

    // ==============================================
    // Eviction
    // ==============================================

    mod eviction {
        use super::*;

        #[test]
        fn oldest_unprotected_is_evicted_first() {
            let mut pool = pool(4);
            insert_all(&mut pool, &["a", "b", "c", "d", "e"]);

            assert!(!pool.contains(&"a"));
            assert_eq!(order(&pool), vec!["b", "c", "d", "e"]);
            assert_eq!(pool.len(), 4);
        }

        #[test]
        fn protected_entry_survives_overflow() {
            let mut pool = pool(4);
            insert_all(&mut pool, &["a", "b", "c", "d"]);
            pool.mark_stateful(&"a", card("a"));

            insert_all(&mut pool, &["e"]);

            assert!(pool.contains(&"a"));
            assert!(!pool.contains(&"b"));
            assert_eq!(order(&pool), vec!["c", "d", "a", "e"]);
        }

        #[test]
        fn marking_stateful_does_not_itself_evict_below_capacity() {
            let mut pool = pool(4);
            insert_all(&mut pool, &["a", "b", "c"]);
            pool.mark_stateful(&"b", card("b"));
            assert_eq!(pool.len(), 3);
        }

        #[test]
        fn protected_overflow_dequeues_oldest_stateful_only() {
            let mut pool = pool(4);
            insert_all(&mut pool, &["a", "b", "c"]);

            pool.mark_stateful(&"a", card("a"));
            pool.mark_stateful(&"b", card("b"));

            // Reservation is 1: "a" loses protection but stays cached.
            assert_eq!(protected(&pool), vec!["b"]);
            assert!(pool.contains(&"a"));
            assert_eq!(order(&pool), vec!["c", "a", "b"]);
        }

        #[test]
        fn dequeued_name_is_evicted_by_later_overflow() {
            let mut pool = pool(4);
            insert_all(&mut pool, &["a", "b", "c", "d"]);
            pool.mark_stateful(&"a", card("a"));
            pool.mark_stateful(&"b", card("b"));
            assert!(!pool.is_protected(&"a"));

            // Order is c, d, a, b with "b" protected; two overflows take c then d.
            insert_all(&mut pool, &["e", "f"]);
            assert!(pool.contains(&"a"));

            insert_all(&mut pool, &["g"]);
            assert!(!pool.contains(&"a"));
            assert!(pool.contains(&"b"));
        }

        #[test]
        fn dequeued_name_lingers_until_overflow() {
            // Observed behavior: a name that lost protection keeps its slot
            // for as long as nothing pushes the pool over capacity.
            let mut pool = pool(8);
            insert_all(&mut pool, &["a", "b"]);
            pool.mark_stateful(&"a", card("a"));
            pool.mark_stateful(&"b", card("b"));
            pool.mark_stateful(&"a", card("a"));

            // Reservation is 2; flagging three names evicts no storage.
            insert_all(&mut pool, &["c"]);
            pool.mark_stateful(&"c", card("c"));
            assert!(!pool.is_protected(&"b"));

            for _ in 0..50 {
                pool.touch(&"c", None);
            }
            assert!(pool.contains(&"b"));
            assert!(pool.check_invariants().is_ok());
        }

        #[test]
        fn at_most_one_eviction_per_pass() {
            let mut pool = pool(4);
            insert_all(&mut pool, &["a", "b", "c", "d"]);

            pool.fetch(&"e", Some(0)).unwrap();
            assert_eq!(pool.len(), 4);
            pool.fetch(&"f", Some(0)).unwrap();
            assert_eq!(pool.len(), 4);
            assert_eq!(order(&pool), vec!["c", "d", "e", "f"]);
        }

        #[test]
        fn protected_name_is_never_evicted_while_protected() {
            let mut pool = pool(4);
            insert_all(&mut pool, &["keep"]);
            pool.mark_stateful(&"keep", card("keep"));

            for i in 0..40u32 {
                let name: &'static str = Box::leak(format!("n{i}").into_boxed_str());
                pool.fetch(&name, Some(i)).unwrap();
                assert!(pool.is_protected(&"keep"));
                assert!(pool.contains(&"keep"));
                assert!(pool.check_invariants().is_ok());
            }
        }
    }

    // ==============================================
    // Revival
    // ==============================================

    mod revival {
        use super::*;

        #[test]
        fn evicted_name_is_revived_from_live_reference() {
            let mut pool = pool(4);
            let held = pool.fetch(&"a", Some(1)).unwrap().unwrap();
            insert_all(&mut pool, &["b", "c", "d", "e"]);
            assert!(!pool.contains(&"a"));

            pool.mark_stateful(&"a", Arc::clone(&held));

            assert!(pool.contains(&"a"));
            assert!(pool.is_protected(&"a"));
            assert_eq!(order(&pool).last(), Some(&"a"));
            assert!(pool.check_invariants().is_ok());

            let served = pool.fetch(&"a", None).unwrap().unwrap();
            assert!(Arc::ptr_eq(&served, &held));
        }

        #[test]
        fn revival_does_not_call_factory() {
            let calls = Rc::new(Cell::new(0));
            let counter = Rc::clone(&calls);
            let mut pool = RecencyPool::<&str, (), _>::new(4, move |name: &&str, _: ()| {
                counter.set(counter.get() + 1);
                Ok::<_, Infallible>(name.to_string())
            });

            pool.mark_stateful(&"never-built", Arc::new("from elsewhere".to_string()));

            assert_eq!(calls.get(), 0);
            assert_eq!(
                pool.peek(&"never-built").map(String::as_str),
                Some("from elsewhere")
            );
        }

        #[test]
        fn revival_into_full_pool_evicts_oldest_unprotected() {
            let mut pool = pool(4);
            insert_all(&mut pool, &["a", "b", "c", "d"]);

            pool.mark_stateful(&"z", card("z"));

            assert_eq!(order(&pool), vec!["b", "c", "d", "z"]);
            assert!(!pool.contains(&"a"));
        }
    }

    // ==============================================
    // Removal and clear
    // ==============================================

    mod removal {
        use super::*;

        #[test]
        fn remove_drops_name_everywhere() {
            let mut pool = pool(4);
            insert_all(&mut pool, &["a", "b"]);
            pool.mark_stateful(&"a", card("a"));

            let removed = pool.remove(&"a").unwrap();
            assert_eq!(removed.as_str(), "a#0");
            assert!(!pool.contains(&"a"));
            assert!(!pool.is_protected(&"a"));
            assert_eq!(order(&pool), vec!["b"]);
            assert!(pool.remove(&"a").is_none());
            assert!(pool.check_invariants().is_ok());
        }

        #[test]
        fn clear_empties_all_structures() {
            let mut pool = pool(4);
            insert_all(&mut pool, &["a", "b", "c"]);
            pool.mark_stateful(&"b", card("b"));

            pool.clear();
            assert!(pool.is_empty());
            assert_eq!(pool.protected_len(), 0);
            assert_eq!(order(&pool), Vec::<&str>::new());
        }
    }

    // ==============================================
    // Peek and debug
    // ==============================================

    #[test]
    fn peek_does_not_touch() {
        let mut pool = pool(4);
        insert_all(&mut pool, &["a", "b"]);

        assert_eq!(pool.peek(&"a").map(String::as_str), Some("a#0"));
        assert_eq!(pool.peek(&"missing"), None);
        assert_eq!(order(&pool), vec!["a", "b"]);
    }

    #[test]
    fn debug_output_summarizes_sizes() {
        let mut pool = pool(4);
        insert_all(&mut pool, &["a"]);
        let text = format!("{pool:?}");
        assert!(text.contains("RecencyPool"));
        assert!(text.contains("capacity: 4"));
        assert!(text.contains("len: 1"));
    }

    #[cfg(feature = "metrics")]
    mod metrics {
        use super::*;

        #[test]
        fn snapshot_tracks_pool_activity() {
            let mut pool = pool(4);
            insert_all(&mut pool, &["a", "b", "c", "d", "e"]);
            pool.fetch(&"e", None).unwrap();
            pool.fetch(&"ghost", None).unwrap();
            pool.touch(&"ghost", None);
            pool.mark_stateful(&"a", card("a"));
            pool.peek(&"b");

            let snap = pool.snapshot();
            assert_eq!(snap.fetch_calls, 7);
            assert_eq!(snap.fetch_hits, 1);
            assert_eq!(snap.fetch_misses, 6);
            assert_eq!(snap.constructions, 5);
            assert_eq!(snap.touch_noops, 1);
            assert_eq!(snap.revivals, 1);
            assert_eq!(snap.stateful_marks, 1);
            assert_eq!(snap.evictions, 2);
            assert_eq!(snap.peek_calls, 1);
            assert_eq!(snap.peek_found, 0);
            assert_eq!(snap.len, 4);
            assert_eq!(snap.protected_len, 1);

            pool.reset_metrics();
            assert_eq!(pool.metrics_snapshot().fetch_calls, 0);
        }
    }
}
