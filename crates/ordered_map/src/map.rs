use std::fmt;
use std::ops::Index;

use crate::compare::{Compare, Natural};
use crate::cursor::{Cursor, Tag};
use crate::error::{Error, Result};
use crate::iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
use crate::tree::{Probe, RawTree};

/// Ordered map with unique keys, backed by a red-black tree.
///
/// - Keys are unique; `insert` never overwrites an existing value.
/// - Ordering comes from `C` (`Natural` uses `K: Ord`).
/// - Nodes live in an arena; a [`Cursor`] addresses one entry and survives
///   mutations that leave that entry in place.
pub struct OrderedMap<K, V, C = Natural> {
    pub(crate) tree: RawTree<K, V>,
    cmp: C,
    pub(crate) tag: Tag,
}

impl<K, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self::with_comparator(Natural)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, Natural)
    }
}

impl<K, V, C> OrderedMap<K, V, C> {
    pub fn with_comparator(cmp: C) -> Self {
        Self::with_capacity_and_comparator(0, cmp)
    }

    pub fn with_capacity_and_comparator(capacity: usize, cmp: C) -> Self {
        Self {
            tree: RawTree::with_capacity(capacity),
            cmp,
            tag: Tag::fresh(),
        }
    }

    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.tree.arena.capacity()
    }

    /// Drops every entry. Entry cursors become stale; `end()` stays valid.
    pub fn clear(&mut self) {
        tracing::trace!(len = self.len(), "clearing map");
        self.tree.clear();
    }

    pub fn shrink_to_fit(&mut self) {
        self.tree.arena.shrink_to_fit();
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Removes the entry under `cursor` and returns it.
    ///
    /// Fails with `InvalidIterator` for the end cursor, a stale cursor, or a
    /// cursor from another map; the map is untouched in that case.
    pub fn erase(&mut self, cursor: Cursor) -> Result<(K, V)> {
        let id = self.resolve_entry(cursor)?;
        Ok(self.tree.remove(id))
    }

    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let id = self.tree.first();
        (!id.is_nil()).then(|| self.tree.remove(id))
    }

    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let id = self.tree.last();
        (!id.is_nil()).then(|| self.tree.remove(id))
    }

    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let id = self.tree.first();
        (!id.is_nil()).then(|| {
            let (k, v) = self.tree.arena.item(id);
            (k, v)
        })
    }

    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let id = self.tree.last();
        (!id.is_nil()).then(|| {
            let (k, v) = self.tree.arena.item(id);
            (k, v)
        })
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.tree)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.tree)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.iter())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.iter())
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut(self.iter_mut())
    }
}

impl<K, V, C: Compare<K>> OrderedMap<K, V, C> {
    /// Cursor at the entry equivalent to `key`, or `end()`.
    pub fn find(&self, key: &K) -> Cursor {
        self.cursor_at(self.tree.find(key, &self.cmp))
    }

    /// 1 if an equivalent key is present, otherwise 0.
    pub fn count(&self, key: &K) -> usize {
        usize::from(self.contains_key(key))
    }

    pub fn contains_key(&self, key: &K) -> bool {
        !self.tree.find(key, &self.cmp).is_nil()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_key_value(key).map(|(_, v)| v)
    }

    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let id = self.tree.find(key, &self.cmp);
        (!id.is_nil()).then(|| {
            let (k, v) = self.tree.arena.item(id);
            (k, v)
        })
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = self.tree.find(key, &self.cmp);
        if id.is_nil() {
            None
        } else {
            Some(&mut self.tree.arena.item_mut(id).1)
        }
    }

    /// Bounds-checked access.
    pub fn at(&self, key: &K) -> Result<&V> {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    pub fn at_mut(&mut self, key: &K) -> Result<&mut V> {
        self.get_mut(key).ok_or(Error::KeyNotFound)
    }

    /// Returns the value for `key`, inserting `V::default()` first if the
    /// key is absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: K, f: F) -> &mut V {
        let id = match self.tree.probe(&key, &self.cmp) {
            Probe::Found(id) => id,
            Probe::Vacant { parent, side } => self.tree.attach(parent, side, key, f()),
        };
        &mut self.tree.arena.item_mut(id).1
    }

    /// Inserts `(key, value)` unless an equivalent key exists.
    ///
    /// Returns a cursor to the entry holding the key and whether the pair
    /// was inserted. An existing value is left as is and `value` is dropped.
    pub fn insert(&mut self, key: K, value: V) -> (Cursor, bool) {
        match self.tree.probe(&key, &self.cmp) {
            Probe::Found(id) => (self.cursor_at(id), false),
            Probe::Vacant { parent, side } => {
                let id = self.tree.attach(parent, side, key, value);
                (self.cursor_at(id), true)
            }
        }
    }

    /// Inserts or overwrites, returning the previous value.
    pub fn insert_or_replace(&mut self, key: K, value: V) -> Option<V> {
        match self.tree.probe(&key, &self.cmp) {
            Probe::Found(id) => Some(std::mem::replace(
                &mut self.tree.arena.item_mut(id).1,
                value,
            )),
            Probe::Vacant { parent, side } => {
                self.tree.attach(parent, side, key, value);
                None
            }
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let id = self.tree.find(key, &self.cmp);
        (!id.is_nil()).then(|| self.tree.remove(id))
    }
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for OrderedMap<K, V, C> {
    fn clone(&self) -> Self {
        tracing::trace!(len = self.len(), "deep-copying map");
        let mut tree = RawTree::with_capacity(self.len());
        self.tree.copy_into(&mut tree);
        Self {
            tree,
            cmp: self.cmp.clone(),
            tag: Tag::fresh(),
        }
    }

    /// Drops the current entries and deep-copies `source`, reusing the
    /// allocation. Entry cursors into `self` are invalidated; `end()` is not.
    fn clone_from(&mut self, source: &Self) {
        tracing::trace!(len = source.len(), "deep-copying map in place");
        source.tree.copy_into(&mut self.tree);
        self.cmp.clone_from(&source.cmp);
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for OrderedMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for OrderedMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for OrderedMap<K, V, C> {}

impl<K, V, C: Compare<K> + Default> FromIterator<(K, V)> for OrderedMap<K, V, C> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_comparator(C::default());
        map.extend(iter);
        map
    }
}

/// Keeps the first value seen for each key.
impl<K, V, C: Compare<K>> Extend<(K, V)> for OrderedMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

/// Read-only indexing; panics like `at` would fail.
impl<K, V, C: Compare<K>> Index<&K> for OrderedMap<K, V, C> {
    type Output = V;

    fn index(&self, key: &K) -> &V {
        match self.at(key) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<K, V, C> IntoIterator for OrderedMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter::new(self.tree)
    }
}

impl<'a, K, V, C> IntoIterator for &'a OrderedMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a mut OrderedMap<K, V, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}
