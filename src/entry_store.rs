//! EntryStore: insertion-ordered arena of entries addressed by stable handles.
//!
//! Entries live in a `SlotMap`; a doubly linked list threaded through the
//! nodes records insertion order. Removing a node relinks its neighbours and
//! frees its arena slot without moving any other entry, so every other
//! handle keeps resolving.

use slotmap::{DefaultKey, SecondaryMap, SlotMap};

/// Stable, generational reference to one entry of a map.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    pub(crate) fn new(k: DefaultKey) -> Self {
        Handle(k)
    }
    pub(crate) fn raw_handle(&self) -> DefaultKey {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    hash: u64,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

#[derive(Debug, Clone)]
pub(crate) struct EntryStore<K, V> {
    nodes: SlotMap<DefaultKey, Node<K, V>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl<K, V> EntryStore<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(n),
            head: None,
            tail: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Appends at the tail of the order list.
    pub(crate) fn append(&mut self, key: K, value: V, hash: u64) -> Handle {
        let prev = self.tail;
        let k = self.nodes.insert(Node {
            key,
            value,
            hash,
            prev,
            next: None,
        });
        match prev {
            Some(p) => self.nodes[p].next = Some(k),
            None => self.head = Some(k),
        }
        self.tail = Some(k);
        Handle::new(k)
    }

    pub(crate) fn remove(&mut self, handle: Handle) -> Option<(K, V)> {
        let node = self.nodes.remove(handle.raw_handle())?;
        match node.prev {
            Some(p) => self.nodes[p].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => self.nodes[n].prev = node.prev,
            None => self.tail = node.prev,
        }
        Some((node.key, node.value))
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, handle: Handle) -> bool {
        self.nodes.contains_key(handle.raw_handle())
    }

    pub(crate) fn key(&self, handle: Handle) -> Option<&K> {
        self.nodes.get(handle.raw_handle()).map(|n| &n.key)
    }

    pub(crate) fn value(&self, handle: Handle) -> Option<&V> {
        self.nodes.get(handle.raw_handle()).map(|n| &n.value)
    }

    pub(crate) fn value_mut(&mut self, handle: Handle) -> Option<&mut V> {
        self.nodes
            .get_mut(handle.raw_handle())
            .map(|n| &mut n.value)
    }

    pub(crate) fn entry(&self, handle: Handle) -> Option<(&K, &V)> {
        self.nodes
            .get(handle.raw_handle())
            .map(|n| (&n.key, &n.value))
    }

    pub(crate) fn hash(&self, handle: Handle) -> Option<u64> {
        self.nodes.get(handle.raw_handle()).map(|n| n.hash)
    }

    /// Hash of a handle that is known to be live.
    ///
    /// Panics if the handle is stale.
    pub(crate) fn live_hash(&self, handle: Handle) -> u64 {
        self.nodes[handle.raw_handle()].hash
    }

    /// Value of a handle that is known to be live.
    ///
    /// Panics if the handle is stale.
    pub(crate) fn live_value_mut(&mut self, handle: Handle) -> &mut V {
        &mut self.nodes[handle.raw_handle()].value
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    /// Handles and stored hashes in insertion order.
    pub(crate) fn hashes(&self) -> impl Iterator<Item = (Handle, u64)> + '_ {
        let mut cursor = self.head;
        core::iter::from_fn(move || {
            let k = cursor?;
            let node = &self.nodes[k];
            cursor = node.next;
            Some((Handle::new(k), node.hash))
        })
    }

    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            cursor: self.head,
            remaining: self.nodes.len(),
        }
    }

    /// Mutable walk in insertion order.
    ///
    /// The order links live inside the nodes, so the mutable borrows are
    /// split off the arena up front and handed out as the links are
    /// followed.
    pub(crate) fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let cursor = self.head;
        let mut pending = SecondaryMap::with_capacity(self.nodes.len());
        for (k, node) in self.nodes.iter_mut() {
            pending.insert(k, (&node.key, &mut node.value, node.next));
        }
        IterMut { pending, cursor }
    }
}

impl<K, V> Default for EntryStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> IntoIterator for EntryStore<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            cursor: self.head,
            nodes: self.nodes,
        }
    }
}

/// Iterator over `(&K, &V)` in insertion order.
pub struct Iter<'a, K, V> {
    nodes: &'a SlotMap<DefaultKey, Node<K, V>>,
    cursor: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Iter {
            nodes: self.nodes,
            cursor: self.cursor,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.cursor?;
        let node = self.nodes.get(k)?;
        self.cursor = node.next;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}
impl<'a, K, V> core::iter::FusedIterator for Iter<'a, K, V> {}

/// Iterator over `(&K, &mut V)` in insertion order.
pub struct IterMut<'a, K, V> {
    pending: SecondaryMap<DefaultKey, (&'a K, &'a mut V, Option<DefaultKey>)>,
    cursor: Option<DefaultKey>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.cursor?;
        let (key, value, next) = self.pending.remove(k)?;
        self.cursor = next;
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.pending.len(), Some(self.pending.len()))
    }
}

impl<'a, K, V> ExactSizeIterator for IterMut<'a, K, V> {}
impl<'a, K, V> core::iter::FusedIterator for IterMut<'a, K, V> {}

/// Owning iterator over `(K, V)` in insertion order.
pub struct IntoIter<K, V> {
    nodes: SlotMap<DefaultKey, Node<K, V>>,
    cursor: Option<DefaultKey>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let k = self.cursor?;
        let node = self.nodes.remove(k)?;
        self.cursor = node.next;
        Some((node.key, node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.nodes.len(), Some(self.nodes.len()))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> core::iter::FusedIterator for IntoIter<K, V> {}
