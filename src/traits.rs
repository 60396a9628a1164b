//! # Collaborator Traits
//!
//! The pool depends on two outside parties, each modelled as a trait so the
//! pool can be handed to whichever code paths need it instead of being
//! captured as ambient state.
//!
//! ```text
//!   ┌────────────────────────────┐            ┌────────────────────────────┐
//!   │   ArtifactFactory<K, P>    │            │   StatefulSignal<K, A>     │
//!   │                            │            │                            │
//!   │  build(&K, P) → Result<A>  │            │  signal_stateful(&K, Arc)  │
//!   └─────────────┬──────────────┘            └─────────────▲──────────────┘
//!                 │ called on fetch miss                    │ implemented by
//!                 ▼                                         │
//!   ┌───────────────────────────────────────────────────────┴──────────────┐
//!   │                        RecencyPool<K, P, F>                          │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## ArtifactFactory
//!
//! Invoked synchronously by [`RecencyPool::fetch`] when a name is not cached
//! and a payload was supplied. A failed build is returned to the caller of
//! `fetch` verbatim and leaves the pool unchanged. Implementations must not
//! call back into the pool.
//!
//! Any `FnMut(&K, P) -> Result<A, E>` closure is a factory.
//!
//! ## StatefulSignal
//!
//! The out-of-band channel through which a subsystem holding a live artifact
//! reports that the artifact now carries mutable state. The pool is the only
//! implementor; collaborators take `&mut impl StatefulSignal<K, A>`.
//!
//! [`RecencyPool::fetch`]: crate::policy::recency_pool::RecencyPool::fetch

use std::sync::Arc;

/// Builds the artifact cached under a name.
///
/// # Example
///
/// ```
/// use cardpool::traits::ArtifactFactory;
///
/// struct Upper;
///
/// impl ArtifactFactory<String, &'static str> for Upper {
///     type Artifact = String;
///     type Error = std::convert::Infallible;
///
///     fn build(&mut self, name: &String, payload: &'static str) -> Result<String, Self::Error> {
///         Ok(format!("{}={}", name, payload.to_uppercase()))
///     }
/// }
///
/// let mut factory = Upper;
/// assert_eq!(factory.build(&"k".to_string(), "v").unwrap(), "k=V");
/// ```
pub trait ArtifactFactory<K, P> {
    /// The cached value.
    type Artifact;
    /// Construction failure, surfaced unchanged from `fetch`.
    type Error;

    /// Constructs the artifact for `name` from `payload`.
    fn build(&mut self, name: &K, payload: P) -> Result<Self::Artifact, Self::Error>;
}

impl<K, P, A, E, F> ArtifactFactory<K, P> for F
where
    F: FnMut(&K, P) -> Result<A, E>,
{
    type Artifact = A;
    type Error = E;

    #[inline]
    fn build(&mut self, name: &K, payload: P) -> Result<A, E> {
        self(name, payload)
    }
}

/// Receiver for "this artifact was just interacted with and holds state".
///
/// # Example
///
/// ```
/// use std::convert::Infallible;
/// use std::sync::Arc;
///
/// use cardpool::policy::recency_pool::RecencyPool;
/// use cardpool::traits::StatefulSignal;
///
/// // A collaborator only sees the signal, never the whole pool.
/// fn on_toggle<S: StatefulSignal<String, String>>(signal: &mut S, name: &String, card: Arc<String>) {
///     signal.signal_stateful(name, card);
/// }
///
/// let mut pool = RecencyPool::<String, u32, _>::new(8, |name: &String, n: u32| {
///     Ok::<_, Infallible>(format!("{name}#{n}"))
/// });
/// let name = "deck".to_string();
/// let card = pool.fetch(&name, Some(1)).unwrap().unwrap();
///
/// on_toggle(&mut pool, &name, card);
/// assert!(pool.is_protected(&name));
/// ```
pub trait StatefulSignal<K, A> {
    /// Records `name` as recently used and stateful, reviving it from
    /// `artifact` if the pool no longer holds it.
    fn signal_stateful(&mut self, name: &K, artifact: Arc<A>);
}
