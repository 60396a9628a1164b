//! Ordered set used as an MRU queue.
//!
//! Insertion order is recency order: [`RecencySet::touch`] inserts a name at
//! the newest end, or moves it there if it is already a member. The pool
//! keeps two of these, one over every live name and one over the names
//! currently flagged stateful.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, SlotId>        order: IntrusiveList<K>
//!   ┌─────────┬─────────┐
//!   │ "alpha" │  id_0   │              head ─► [alpha] ◄──► [beta] ◄──► [gamma] ◄── tail
//!   │ "beta"  │  id_1   │                      oldest                    newest
//!   │ "gamma" │  id_2   │
//!   └─────────┴─────────┘
//! ```
//!
//! ## Behavior
//! - `touch(k)`: move-to-end; removing a non-member first is a no-op
//! - `pop_oldest()`: dequeue from the head
//! - `remove(k)`: delete from both list and index
//!
//! ## Performance
//! - `touch` / `remove` / `pop_oldest` / `contains`: O(1) average
//! - `iter`: O(n), oldest to newest
//!
//! `debug_validate_invariants()` is available in debug/test builds.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::intrusive_list::{IntrusiveList, Iter};
use crate::ds::slot_arena::SlotId;

/// Recency-ordered set of names, oldest first.
#[derive(Debug)]
pub struct RecencySet<K> {
    order: IntrusiveList<K>,
    index: FxHashMap<K, SlotId>,
}

impl<K> RecencySet<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            order: IntrusiveList::new(),
            index: FxHashMap::default(),
        }
    }

    /// Creates an empty set with room for `capacity` names.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            order: IntrusiveList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Marks `key` as the newest member, inserting it if absent.
    ///
    /// Returns `true` if `key` was newly inserted.
    pub fn touch(&mut self, key: &K) -> bool {
        if let Some(&id) = self.index.get(key) {
            self.order.move_to_back(id);
            return false;
        }
        let id = self.order.push_back(key.clone());
        self.index.insert(key.clone(), id);
        true
    }

    /// Removes `key`; returns `true` if it was a member.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(id) => {
                self.order.remove(id);
                true
            },
            None => false,
        }
    }

    /// Removes and returns the oldest member.
    pub fn pop_oldest(&mut self) -> Option<K> {
        let key = self.order.pop_front()?;
        self.index.remove(&key);
        Some(key)
    }

    pub fn oldest(&self) -> Option<&K> {
        self.order.front()
    }

    pub fn newest(&self) -> Option<&K> {
        self.order.back()
    }

    /// Iterates members from oldest to newest.
    pub fn iter(&self) -> Iter<'_, K> {
        self.order.iter()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.index.clear();
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.order.debug_validate_invariants();
        assert_eq!(self.order.len(), self.index.len());
        for (key, &id) in &self.index {
            assert!(self.order.get(id) == Some(key), "index points at wrong node");
        }
    }
}

impl<K> Default for RecencySet<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
