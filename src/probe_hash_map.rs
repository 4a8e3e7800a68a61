//! ProbeHashMap: the public map, coordinating the entry arena and the probe
//! table.

use crate::config::MapConfig;
use crate::entry_store::{EntryStore, Handle, IntoIter, Iter, IterMut};
use crate::error::{InsertError, KeyNotFound};
use crate::slot_table::{Probe, SlotTable};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::Index;
use hashbrown::hash_map::DefaultHashBuilder;

impl Handle {
    pub fn key<'a, K, V, S>(&self, map: &'a ProbeHashMap<K, V, S>) -> Option<&'a K> {
        map.entries.key(*self)
    }

    pub fn value<'a, K, V, S>(&self, map: &'a ProbeHashMap<K, V, S>) -> Option<&'a V> {
        map.entries.value(*self)
    }

    pub fn value_mut<'a, K, V, S>(&self, map: &'a mut ProbeHashMap<K, V, S>) -> Option<&'a mut V> {
        map.entries.value_mut(*self)
    }
}

/// Insertion-ordered hash map with linear probing over stable handles.
///
/// Keys are unique: [`insert`](Self::insert) rejects a key that is already
/// present, while [`insert_or_replace`](Self::insert_or_replace) and
/// [`get_or_insert_default`](Self::get_or_insert_default) update in place.
/// Iteration yields entries in the order their keys were first inserted.
pub struct ProbeHashMap<K, V, S = DefaultHashBuilder> {
    hasher: S,
    config: MapConfig,
    table: SlotTable,
    entries: EntryStore<K, V>,
}

impl<K, V> ProbeHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_config(config: MapConfig) -> Self {
        Self::with_config_and_hasher(config, Default::default())
    }

    /// Map whose table already fits `n` entries without growing.
    pub fn with_capacity(n: usize) -> Self {
        Self::with_capacity_and_hasher(n, Default::default())
    }
}

impl<K, V, S> Default for ProbeHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> ProbeHashMap<K, V, S> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }

    /// The hashing capability chosen at construction.
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn config(&self) -> MapConfig {
        self.config
    }

    /// Number of cells in the probe table.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.entries.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.entries.iter_mut().map(|(_, v)| v)
    }

    /// Drops every entry and shrinks the table back to the initial capacity.
    pub fn clear(&mut self) {
        self.entries.clear();
        if self.table.capacity() == self.config.initial_capacity() {
            self.table.reset();
        } else {
            self.table = SlotTable::with_capacity(self.config.initial_capacity());
        }
        log::trace!(
            "cleared map, table reset to {} cells",
            self.config.initial_capacity()
        );
    }
}

impl<K, V, S> ProbeHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_config_and_hasher(MapConfig::default(), hasher)
    }

    pub fn with_config_and_hasher(config: MapConfig, hasher: S) -> Self {
        Self {
            hasher,
            config,
            table: SlotTable::with_capacity(config.initial_capacity()),
            entries: EntryStore::new(),
        }
    }

    pub fn with_capacity_and_hasher(n: usize, hasher: S) -> Self {
        Self::with_capacity_config_and_hasher(n, MapConfig::default(), hasher)
    }

    /// Builds a map from `iter`, sizing the table from its lower size bound.
    /// Later pairs overwrite the values of earlier pairs with equal keys.
    pub fn from_iter_with_hasher<I>(iter: I, hasher: S) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::from_iter_with_config_and_hasher(iter, MapConfig::default(), hasher)
    }

    /// Like [`from_iter_with_hasher`](Self::from_iter_with_hasher), sized and
    /// grown according to `config`.
    pub fn from_iter_with_config_and_hasher<I>(iter: I, config: MapConfig, hasher: S) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let iter = iter.into_iter();
        let mut map = Self::with_capacity_config_and_hasher(iter.size_hint().0, config, hasher);
        map.extend(iter);
        map
    }

    /// Map whose table holds `max((n + 1) * load_factor, initial_capacity)`
    /// cells under `config`.
    pub fn with_capacity_config_and_hasher(n: usize, config: MapConfig, hasher: S) -> Self {
        Self {
            hasher,
            config,
            table: SlotTable::with_capacity(config.capacity_for(n)),
            entries: EntryStore::with_capacity(n),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    fn locate<Q>(&self, hash: u64, q: &Q) -> Option<Probe>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.table.probe(hash, |h| {
            self.entries
                .key(h)
                .map(|k| k.borrow() == q)
                .unwrap_or(false)
        })
    }

    fn find_hashed<Q>(&self, hash: u64, q: &Q) -> Option<(usize, Handle)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        match self.locate(hash, q)? {
            Probe::Found { index, handle } => Some((index, handle)),
            Probe::Vacant(_) => None,
        }
    }

    /// Grows the table so that `count` entries satisfy the load invariant,
    /// multiplying the capacity by the load factor as often as needed.
    /// Returns whether the table was rebuilt.
    fn grow_for(&mut self, count: usize) -> bool {
        let needed = self.config.required_cells(count);
        let mut capacity = self.table.capacity();
        if needed <= capacity {
            return false;
        }
        while capacity < needed {
            capacity = capacity
                .checked_mul(self.config.load_factor())
                .expect("capacity overflow");
        }
        self.rebuild(capacity);
        true
    }

    /// Replaces the table with an empty one of `capacity` cells and places
    /// every entry again, in insertion order, by its stored hash.
    fn rebuild(&mut self, capacity: usize) {
        let old = self.table.capacity();
        let mut table = SlotTable::with_capacity(capacity);
        for (handle, hash) in self.entries.hashes() {
            table.place(hash, handle);
        }
        self.table = table;
        log::trace!(
            "rebuilt slot table {} -> {} cells for {} entries",
            old,
            capacity,
            self.entries.len()
        );
    }

    /// Appends a new entry whose key is known to be absent. `vacant` is the
    /// empty cell found while probing; it is only valid if the table does
    /// not grow.
    fn insert_vacant(&mut self, vacant: usize, hash: u64, key: K, value: V) -> Handle {
        let grew = self.grow_for(self.entries.len() + 1);
        let handle = self.entries.append(key, value, hash);
        if grew {
            self.table.place(hash, handle);
        } else {
            self.table.occupy(vacant, handle);
        }
        handle
    }

    /// Inserts a new key. Fails with `DuplicateKey`, leaving the map
    /// untouched, if the key is already present.
    pub fn insert(&mut self, key: K, value: V) -> Result<Handle, InsertError> {
        let hash = self.make_hash(&key);
        match self.locate(hash, &key) {
            Some(Probe::Found { .. }) => Err(InsertError::DuplicateKey),
            Some(Probe::Vacant(index)) => Ok(self.insert_vacant(index, hash, key, value)),
            None => unreachable!("load invariant keeps an empty cell"),
        }
    }

    /// Inserts or overwrites. An existing entry keeps its position and the
    /// previous value is returned.
    pub fn insert_or_replace(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.make_hash(&key);
        match self.locate(hash, &key) {
            Some(Probe::Found { handle, .. }) => Some(core::mem::replace(
                self.entries.live_value_mut(handle),
                value,
            )),
            Some(Probe::Vacant(index)) => {
                self.insert_vacant(index, hash, key, value);
                None
            }
            None => unreachable!("load invariant keeps an empty cell"),
        }
    }

    /// Returns the value for `key`, inserting `default()` first if absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let hash = self.make_hash(&key);
        let handle = match self.locate(hash, &key) {
            Some(Probe::Found { handle, .. }) => handle,
            Some(Probe::Vacant(index)) => self.insert_vacant(index, hash, key, default()),
            None => unreachable!("load invariant keeps an empty cell"),
        };
        self.entries.live_value_mut(handle)
    }

    /// Returns the value for `key`, inserting `V::default()` first if absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    pub fn find<Q>(&self, q: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        self.find_hashed(hash, q).map(|(_, h)| h)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).and_then(|h| self.entries.value(h))
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).and_then(|h| self.entries.entry(h))
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let h = self.find(q)?;
        self.entries.value_mut(h)
    }

    /// Read-only lookup that reports a missing key as an error.
    pub fn at<Q>(&self, q: &Q) -> Result<&V, KeyNotFound>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).ok_or(KeyNotFound)
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    /// Removes `key` and returns the owned pair. A missing key is a no-op.
    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let (index, handle) = self.find_hashed(hash, q)?;
        self.unlink(index, handle)
    }

    /// Removes the entry `handle` refers to. Stale handles return `None`.
    pub fn remove_handle(&mut self, handle: Handle) -> Option<(K, V)> {
        let hash = self.entries.hash(handle)?;
        match self.table.probe(hash, |h| h == handle) {
            Some(Probe::Found { index, .. }) => self.unlink(index, handle),
            _ => None,
        }
    }

    // Unlink from the table first so the repair only sees live handles.
    fn unlink(&mut self, index: usize, handle: Handle) -> Option<(K, V)> {
        let entries = &self.entries;
        self.table.vacate(index, |h| entries.live_hash(h));
        self.entries.remove(handle)
    }

    /// Ensures `additional` more insertions will not rebuild the table.
    pub fn reserve(&mut self, additional: usize) {
        let count = self
            .entries
            .len()
            .checked_add(additional)
            .expect("capacity overflow");
        self.grow_for(count);
    }

    /// Checks the table against the arena: one cell per live entry, no dead
    /// handles, unbroken chains.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let live: Vec<(Handle, u64)> = self.entries.hashes().collect();
        assert_eq!(live.len(), self.len());
        assert!(
            self.table.capacity() >= self.config.required_cells(self.len()),
            "load invariant violated"
        );
        self.table.assert_consistent(&live);
    }

    #[cfg(test)]
    pub(crate) fn cell_of<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        self.find_hashed(hash, q).map(|(i, _)| i)
    }
}

impl<K, V, S> Clone for ProbeHashMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    /// Deep copy: a fresh table sized for the source, filled in the source's
    /// iteration order. Handles from the source do not resolve in the copy.
    fn clone(&self) -> Self {
        let mut copy =
            Self::with_capacity_config_and_hasher(self.len(), self.config, self.hasher.clone());
        copy.fill_from(self);
        copy
    }

    fn clone_from(&mut self, source: &Self) {
        self.clear();
        self.hasher = source.hasher.clone();
        self.config = source.config;
        let capacity = self.config.capacity_for(source.len());
        if capacity != self.table.capacity() {
            self.table = SlotTable::with_capacity(capacity);
        }
        self.fill_from(source);
    }
}

impl<K, V, S> ProbeHashMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher,
{
    // Source keys are unique and hashed by an equivalent hasher, so stored
    // hashes carry over and no key comparison is needed.
    fn fill_from(&mut self, source: &Self) {
        for (handle, hash) in source.entries.hashes() {
            if let Some((k, v)) = source.entries.entry(handle) {
                let h = self.entries.append(k.clone(), v.clone(), hash);
                self.table.place(hash, h);
            }
        }
    }
}

impl<K, V, S> fmt::Debug for ProbeHashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> PartialEq for ProbeHashMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).map(|ov| v == ov).unwrap_or(false))
    }
}

impl<K, V, S> Eq for ProbeHashMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, Q, V, S> Index<&Q> for ProbeHashMap<K, V, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Eq + Hash,
    S: BuildHasher,
{
    type Output = V;

    /// Panics if the key is absent; see [`ProbeHashMap::at`] for a fallible
    /// lookup.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not found in ProbeHashMap")
    }
}

impl<K, V, S> Extend<(K, V)> for ProbeHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for (k, v) in iter {
            self.insert_or_replace(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ProbeHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_iter_with_hasher(iter, S::default())
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for ProbeHashMap<K, V>
where
    K: Eq + Hash,
{
    fn from(arr: [(K, V); N]) -> Self {
        Self::from_iter_with_hasher(arr, DefaultHashBuilder::default())
    }
}

impl<'a, K, V, S> IntoIterator for &'a ProbeHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ProbeHashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for ProbeHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashers::IdentityBuildHasher;

    fn identity_map<V>() -> ProbeHashMap<u32, V, IdentityBuildHasher> {
        ProbeHashMap::with_hasher(IdentityBuildHasher)
    }

    fn keys<V, S>(m: &ProbeHashMap<u32, V, S>) -> Vec<u32> {
        m.keys().copied().collect()
    }

    /// Invariant: with capacity 10, keys 1, 11, 21 chain from cell 1; erasing
    /// the chain head moves both followers back and keeps them findable.
    #[test]
    fn erase_repairs_collision_chain() {
        let mut m = identity_map();
        for k in [1, 11, 21] {
            m.insert(k, k * 10).unwrap();
        }
        assert_eq!(m.capacity(), 10);
        assert_eq!(
            [m.cell_of(&1), m.cell_of(&11), m.cell_of(&21)],
            [Some(1), Some(2), Some(3)]
        );

        assert_eq!(m.remove(&1), Some(10));
        assert_eq!(m.get(&11), Some(&110));
        assert_eq!(m.get(&21), Some(&210));
        assert_eq!(m.cell_of(&11), Some(1));
        assert_eq!(m.cell_of(&21), Some(2));
        m.assert_consistent();
    }

    #[test]
    fn erase_repairs_chain_across_wraparound() {
        let mut m = identity_map();
        for k in [9, 19, 29] {
            m.insert(k, ()).unwrap();
        }
        assert_eq!(m.cell_of(&19), Some(0));
        m.remove(&9);
        assert_eq!(m.cell_of(&19), Some(9));
        assert_eq!(m.cell_of(&29), Some(0));
        assert!(m.contains_key(&19) && m.contains_key(&29));
        m.assert_consistent();
    }

    /// Invariant: growth happens exactly when `(len + 1) * 2 > capacity`,
    /// multiplies capacity by the load factor and keeps handles and order.
    #[test]
    fn resize_on_load_pressure() {
        let mut m = identity_map();
        let handles: Vec<Handle> = (0..5).map(|k| m.insert(k, k).unwrap()).collect();
        assert_eq!(m.capacity(), 10);
        m.insert(5, 5).unwrap();
        assert_eq!(m.capacity(), 20);
        for k in 6..10 {
            m.insert(k, k).unwrap();
        }
        assert_eq!(m.capacity(), 20);
        m.insert(10, 10).unwrap();
        assert_eq!(m.capacity(), 40);

        assert_eq!(keys(&m), (0..=10).collect::<Vec<_>>());
        for (k, h) in handles.into_iter().enumerate() {
            assert_eq!(h.value(&m), Some(&(k as u32)));
        }
        m.assert_consistent();
    }

    #[test]
    fn rebuild_uses_new_home_indices() {
        let mut m = identity_map();
        for k in [1, 11, 21, 31, 41] {
            m.insert(k, ()).unwrap();
        }
        m.insert(51, ()).unwrap();
        assert_eq!(m.capacity(), 20);
        // 1, 21, 41 home to 1; 11, 31, 51 home to 11.
        assert_eq!(m.cell_of(&1), Some(1));
        assert_eq!(m.cell_of(&21), Some(2));
        assert_eq!(m.cell_of(&41), Some(3));
        assert_eq!(m.cell_of(&11), Some(11));
        assert_eq!(m.cell_of(&31), Some(12));
        assert_eq!(m.cell_of(&51), Some(13));
        m.assert_consistent();
    }

    /// Invariant: duplicate inserts are rejected and leave value, order and
    /// length unchanged.
    #[test]
    fn duplicate_insert_rejected() {
        let mut m = identity_map();
        let h = m.insert(3, "first").unwrap();
        m.insert(4, "other").unwrap();
        assert_eq!(m.insert(3, "second"), Err(InsertError::DuplicateKey));
        assert_eq!(m.len(), 2);
        assert_eq!(h.value(&m), Some(&"first"));
        assert_eq!(keys(&m), [3, 4]);
        m.assert_consistent();
    }

    #[test]
    fn insert_or_replace_keeps_position() {
        let mut m = identity_map();
        assert_eq!(m.insert_or_replace(1, 'a'), None);
        assert_eq!(m.insert_or_replace(2, 'b'), None);
        assert_eq!(m.insert_or_replace(1, 'c'), Some('a'));
        assert_eq!(m.iter().collect::<Vec<_>>(), [(&1, &'c'), (&2, &'b')]);
    }

    #[test]
    fn get_or_insert_default_creates_once() {
        let mut m = identity_map::<i32>();
        *m.get_or_insert_default(7) += 2;
        *m.get_or_insert_default(7) += 3;
        assert_eq!(m.len(), 1);
        assert_eq!(m.at(&7), Ok(&5));

        let mut calls = 0;
        m.get_or_insert_with(7, || {
            calls += 1;
            0
        });
        assert_eq!(calls, 0, "default must not run for a present key");
    }

    /// Invariant: `get_or_insert_*` on a missing key that forces a resize
    /// still returns the freshly inserted slot.
    #[test]
    fn get_or_insert_across_resize() {
        let mut m = identity_map::<u32>();
        for k in 0..5 {
            m.insert(k, k).unwrap();
        }
        *m.get_or_insert_default(100) = 42;
        assert_eq!(m.capacity(), 20);
        assert_eq!(m.get(&100), Some(&42));
        m.assert_consistent();
    }

    #[test]
    fn at_reports_missing_key_without_mutating() {
        let m: ProbeHashMap<u32, u32, _> = identity_map();
        assert_eq!(m.at(&1), Err(KeyNotFound));
        assert!(m.is_empty());
    }

    #[test]
    fn remove_handle_and_stale_handles() {
        let mut m = identity_map();
        let a = m.insert(1, 'a').unwrap();
        let b = m.insert(11, 'b').unwrap();
        assert_eq!(m.remove_handle(a), Some((1, 'a')));
        assert_eq!(m.remove_handle(a), None);
        assert_eq!(a.key(&m), None);
        assert_eq!(b.key(&m), Some(&11));
        assert_eq!(m.cell_of(&11), Some(1));
        m.assert_consistent();
    }

    /// Invariant: `clear` empties the map and resets the table to the
    /// initial capacity; the map stays usable.
    #[test]
    fn clear_resets_capacity() {
        let mut m = identity_map();
        for k in 0..30 {
            m.insert(k, k).unwrap();
        }
        assert!(m.capacity() > 10);
        m.clear();
        assert!(m.is_empty());
        assert_eq!(m.capacity(), 10);
        assert!(m.get(&3).is_none());
        m.insert(3, 3).unwrap();
        assert_eq!(keys(&m), [3]);
        m.assert_consistent();
    }

    #[test]
    fn custom_config_drives_growth() {
        let config = MapConfig::new()
            .with_initial_capacity(4)
            .and_then(|c| c.with_load_factor(3))
            .unwrap();
        let mut m: ProbeHashMap<u32, (), _> =
            ProbeHashMap::with_config_and_hasher(config, IdentityBuildHasher);
        m.insert(0, ()).unwrap(); // needs 3 cells
        assert_eq!(m.capacity(), 4);
        m.insert(1, ()).unwrap(); // needs 6 cells
        assert_eq!(m.capacity(), 12);
        m.clear();
        assert_eq!(m.capacity(), 4);
        assert_eq!(m.config(), config);
    }

    /// Invariant: one growth step may multiply capacity more than once when
    /// the initial table is tiny.
    #[test]
    fn reserve_presizes() {
        let mut m = identity_map::<()>();
        m.reserve(100);
        assert_eq!(m.capacity(), 320);
        for k in 0..100 {
            m.insert(k, ()).unwrap();
        }
        assert_eq!(m.capacity(), 320);
        m.assert_consistent();
    }

    /// Invariant: pre-sized construction applies
    /// `max((n + 1) * load_factor, initial_capacity)` under a custom config.
    #[test]
    fn presized_construction_honours_config() {
        let config = MapConfig::new()
            .with_initial_capacity(4)
            .and_then(|c| c.with_load_factor(3))
            .unwrap();
        let mut m: ProbeHashMap<u32, (), _> =
            ProbeHashMap::with_capacity_config_and_hasher(5, config, IdentityBuildHasher);
        assert_eq!(m.capacity(), 18);
        assert_eq!(m.config(), config);
        for k in 0..5 {
            m.insert(k, ()).unwrap();
        }
        assert_eq!(m.capacity(), 18);

        let tiny: ProbeHashMap<u32, (), _> =
            ProbeHashMap::with_capacity_config_and_hasher(0, config, IdentityBuildHasher);
        assert_eq!(tiny.capacity(), 4);

        let built: ProbeHashMap<u32, u32, _> = ProbeHashMap::from_iter_with_config_and_hasher(
            (0..5).map(|k| (k, k)),
            config,
            IdentityBuildHasher,
        );
        assert_eq!(built.capacity(), 18);
        assert_eq!(built.config(), config);
        assert_eq!(keys(&built), [0, 1, 2, 3, 4]);
        built.assert_consistent();
    }

    /// Invariant: extend reserves for the iterator's lower size bound before
    /// inserting, so the table already fits every new entry.
    #[test]
    fn extend_reserves_from_size_hint() {
        let mut m = identity_map();
        m.insert(1000, 0).unwrap();
        let pairs: Vec<(u32, u32)> = (0..100).map(|k| (k, k)).collect();
        let mut expected = identity_map::<u32>();
        expected.reserve(101);
        m.extend(pairs);
        assert_eq!(m.len(), 101);
        assert_eq!(m.capacity(), expected.capacity());
        assert!(m.capacity() >= m.config().required_cells(m.len()));
        assert_eq!(&keys(&m)[..3], &[1000, 0, 1]);
        m.assert_consistent();
    }

    #[test]
    fn clone_from_resizes_to_source() {
        let mut src = identity_map();
        for k in 0..20 {
            src.insert(k, k.to_string()).unwrap();
        }
        src.remove(&4);
        let mut dst = identity_map();
        dst.insert(99, "stale".to_string()).unwrap();
        dst.clone_from(&src);
        assert_eq!(dst.capacity(), 40);
        assert_eq!(keys(&dst), keys(&src));
        assert!(dst.get(&99).is_none());
        assert_eq!(dst, src);
        dst.assert_consistent();
    }

    #[test]
    fn clone_is_sized_and_consistent() {
        let mut src = identity_map();
        for k in [1, 11, 21, 2] {
            src.insert(k, k).unwrap();
        }
        src.remove(&11);
        let copy = src.clone();
        assert_eq!(copy.capacity(), 10);
        assert_eq!(keys(&copy), [1, 21, 2]);
        copy.assert_consistent();
    }

    #[test]
    fn debug_renders_in_order() {
        let mut m = identity_map();
        m.insert(2, "b").unwrap();
        m.insert(1, "a").unwrap();
        assert_eq!(format!("{:?}", m), r#"{2: "b", 1: "a"}"#);
    }

    #[test]
    fn index_panics_on_missing_key() {
        let mut m = identity_map();
        m.insert(1, 10).unwrap();
        assert_eq!(m[&1], 10);
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| m[&2]));
        assert!(res.is_err());
    }
}
