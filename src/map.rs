//! The thread-safe multi-map over the adaptive radix tree.

use std::fmt;
use std::hash::Hash;
use std::ops::Bound;

use parking_lot::RwLock;

use crate::key::Key;
use crate::nodes::operations::{delete, insert, lookup, range};
use crate::nodes::representation::ArtNode;
use crate::set::ValueSet;

/// An ordered, in-memory multi-map from byte-string [`Key`]s to sets of
/// values.
///
/// Each key maps to a deduplicated set of values: a value appears at most
/// once per key but may appear under many keys. Keys are ordered bytewise,
/// and the map supports range queries over that ordering alongside the
/// point operations.
///
/// All methods are safe for concurrent use. A readers-writer lock guards
/// each map instance: queries share the lock, mutations take it
/// exclusively. Keys are copied on insertion and value sets are cloned on
/// the way out, so callers can never alias internal state.
///
/// # Examples
///
/// ```rust
/// use artmap::{Key, MultiMap};
///
/// let map = MultiMap::new();
/// map.add_value(&Key::from_string("alice"), 1);
/// map.add_value(&Key::from_string("bob"), 2);
/// map.add_value(&Key::from_string("bob"), 3);
///
/// assert_eq!(map.number_of_keys(), 2);
/// assert_eq!(map.values_for(&Key::from_string("bob")).len(), 2);
///
/// let in_range = map.values_between_inclusive(
///     &Key::from_string("alice"),
///     &Key::from_string("azzz"),
/// );
/// assert!(in_range.contains(&1));
/// assert!(!in_range.contains(&2));
/// ```
pub struct MultiMap<T> {
    inner: RwLock<TreeState<T>>,
}

#[derive(Clone)]
struct TreeState<T> {
    root: Option<ArtNode<T>>,
    num_keys: usize,
}

impl<T> MultiMap<T> {
    /// Create an empty multi-map.
    pub fn new() -> Self {
        MultiMap {
            inner: RwLock::new(TreeState {
                root: None,
                num_keys: 0,
            }),
        }
    }

    /// Number of keys currently holding at least one value.
    pub fn number_of_keys(&self) -> usize {
        self.inner.read().num_keys
    }

    /// Whether the map holds no keys.
    pub fn is_empty(&self) -> bool {
        self.number_of_keys() == 0
    }

    /// Drop every key and value.
    pub fn clear(&self) {
        let mut state = self.inner.write();
        state.root = None;
        state.num_keys = 0;
    }
}

impl<T: Eq + Hash + Clone> MultiMap<T> {
    /// Add `value` to the set stored under `key`, creating the key if
    /// needed. The key bytes are copied; later mutation of the caller's
    /// key has no effect on the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use artmap::{Key, MultiMap};
    ///
    /// let map = MultiMap::new();
    /// map.add_value(&Key::from_bytes(b"k1"), 1);
    /// map.add_value(&Key::from_bytes(b"k1"), 2);
    /// map.add_value(&Key::from_bytes(b"k1"), 2);
    /// assert_eq!(map.number_of_keys(), 1);
    /// assert_eq!(map.values_for(&Key::from_bytes(b"k1")).len(), 2);
    /// ```
    pub fn add_value(&self, key: &Key, value: T) {
        let mut state = self.inner.write();
        if insert::insert(&mut state.root, key.as_bytes(), value) {
            state.num_keys += 1;
        }
    }

    /// Remove `value` from the set stored under `key`. Removing the last
    /// value removes the key. Absent keys and absent values are no-ops.
    pub fn remove_value(&self, key: &Key, value: &T) {
        let mut state = self.inner.write();
        if delete::remove_value(&mut state.root, key.as_bytes(), value) {
            state.num_keys -= 1;
        }
    }

    /// Remove `key` and every value stored under it. Absent keys are a
    /// no-op.
    pub fn remove_key(&self, key: &Key) {
        let mut state = self.inner.write();
        if delete::remove_key(&mut state.root, key.as_bytes()) {
            state.num_keys -= 1;
        }
    }

    /// Whether `key` currently holds at least one value.
    pub fn contains_key(&self, key: &Key) -> bool {
        let state = self.inner.read();
        state
            .root
            .as_ref()
            .is_some_and(|root| lookup::search(root, key.as_bytes()).is_some())
    }

    /// The values stored under `key`, as a fresh set. The set is empty when
    /// the key is absent; mutating it never affects the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use artmap::{Key, MultiMap};
    ///
    /// let map = MultiMap::new();
    /// map.add_value(&Key::from_u64(7), "seven");
    /// let mut values = map.values_for(&Key::from_u64(7));
    /// values.insert("eight");
    /// // The map is unchanged by mutating the returned set.
    /// assert_eq!(map.values_for(&Key::from_u64(7)).len(), 1);
    /// assert!(map.values_for(&Key::from_u64(8)).is_empty());
    /// ```
    pub fn values_for(&self, key: &Key) -> ValueSet<T> {
        let state = self.inner.read();
        state
            .root
            .as_ref()
            .and_then(|root| lookup::search(root, key.as_bytes()))
            .cloned()
            .unwrap_or_default()
    }

    /// The union of every value set in the map.
    pub fn all_values(&self) -> ValueSet<T> {
        self.collect_range(Bound::Unbounded, Bound::Unbounded)
    }

    /// The union of the value sets of every key `k` with
    /// `from <= k <= to`. Empty when `from > to`. The bounds themselves
    /// need not be present in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use artmap::{Key, MultiMap};
    ///
    /// let map = MultiMap::new();
    /// for (key, value) in [("a", 1), ("b", 2), ("c", 3), ("d", 4)] {
    ///     map.add_value(&Key::from_string(key), value);
    /// }
    /// let values = map.values_between_inclusive(
    ///     &Key::from_string("a"),
    ///     &Key::from_string("c"),
    /// );
    /// assert_eq!(values.len(), 3);
    /// ```
    pub fn values_between_inclusive(&self, from: &Key, to: &Key) -> ValueSet<T> {
        self.collect_range(
            Bound::Included(from.as_bytes()),
            Bound::Included(to.as_bytes()),
        )
    }

    /// The union of the value sets of every key `k` with `from < k < to`.
    pub fn values_between_exclusive(&self, from: &Key, to: &Key) -> ValueSet<T> {
        self.collect_range(
            Bound::Excluded(from.as_bytes()),
            Bound::Excluded(to.as_bytes()),
        )
    }

    /// The union of the value sets of every key `k` with `from <= k`.
    pub fn values_from_inclusive(&self, from: &Key) -> ValueSet<T> {
        self.collect_range(Bound::Included(from.as_bytes()), Bound::Unbounded)
    }

    /// The union of the value sets of every key `k` with `from < k`.
    pub fn values_from_exclusive(&self, from: &Key) -> ValueSet<T> {
        self.collect_range(Bound::Excluded(from.as_bytes()), Bound::Unbounded)
    }

    /// The union of the value sets of every key `k` with `k <= to`.
    pub fn values_to_inclusive(&self, to: &Key) -> ValueSet<T> {
        self.collect_range(Bound::Unbounded, Bound::Included(to.as_bytes()))
    }

    /// The union of the value sets of every key `k` with `k < to`.
    pub fn values_to_exclusive(&self, to: &Key) -> ValueSet<T> {
        self.collect_range(Bound::Unbounded, Bound::Excluded(to.as_bytes()))
    }

    /// Every key currently holding values, as fresh clones.
    pub fn all_keys(&self) -> Vec<Key> {
        let state = self.inner.read();
        range::collect_keys(state.root.as_ref())
    }

    fn collect_range(&self, lower: Bound<&[u8]>, upper: Bound<&[u8]>) -> ValueSet<T> {
        let state = self.inner.read();
        let mut out = ValueSet::new();
        range::collect_values(state.root.as_ref(), lower, upper, &mut out);
        out
    }
}

#[cfg(test)]
impl<T> MultiMap<T> {
    /// Panic if any structural invariant of the underlying tree is broken
    /// or the tracked key count disagrees with the terminals present.
    pub(crate) fn check_invariants(&self) {
        let state = self.inner.read();
        crate::nodes::visitor::check_tree(&state.root, state.num_keys).unwrap();
    }
}

impl<T> Default for MultiMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for MultiMap<T> {
    /// Deep-copy the map under its read lock; the clone shares no state
    /// with the original.
    fn clone(&self) -> Self {
        let state = self.inner.read();
        MultiMap {
            inner: RwLock::new(state.clone()),
        }
    }
}

impl<T> fmt::Debug for MultiMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiMap")
            .field("number_of_keys", &self.number_of_keys())
            .finish_non_exhaustive()
    }
}
