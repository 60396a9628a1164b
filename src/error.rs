//! Error types for the cardpool library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned by strict constructors when pool configuration
//!   is invalid (e.g. capacity below [`MIN_CAPACITY`](crate::policy::recency_pool::MIN_CAPACITY)).
//! - [`InvariantError`]: Returned by
//!   [`RecencyPool::check_invariants`](crate::policy::recency_pool::RecencyPool::check_invariants)
//!   when storage and the recency sets disagree.
//!
//! Artifact construction failures are not represented here. They are the
//! factory's own associated error type and reach the caller of `fetch`
//! unchanged.
//!
//! ## Example Usage
//!
//! ```
//! use cardpool::policy::recency_pool::RecencyPool;
//! use std::convert::Infallible;
//!
//! let factory = |name: &String, body: String| Ok::<_, Infallible>(format!("{name}:{body}"));
//!
//! // Strict constructor rejects capacities below the floor instead of clamping
//! let bad = RecencyPool::<String, String, _>::try_new(2, factory);
//! let err = bad.err().map(|e| e.to_string());
//! assert!(err.is_some_and(|msg| msg.contains("capacity")));
//! ```

use thiserror::Error;

/// Error returned when pool configuration parameters are invalid.
///
/// Carries a human-readable description of which parameter failed
/// validation.
///
/// # Example
///
/// ```
/// use cardpool::builder::PoolConfig;
///
/// let err = PoolConfig { capacity: 1 }.validate().unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Error returned when internal pool invariants are violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct InvariantError {
    message: String,
}

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}
