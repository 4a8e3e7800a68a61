//! SlotTable: open-addressing index with linear probing and tombstone-free
//! erase.
//!
//! Each cell is empty or holds the `Handle` of one live entry. A handle sits
//! on its entry's probe chain: every cell from the entry's home index up to
//! (cyclically) the handle's own cell is occupied. Lookups rely on that to
//! stop at the first empty cell, and `vacate` restores it after a removal
//! by pulling later chain members back into the hole.
//!
//! The table never looks at keys. Callers pass match predicates and hash
//! lookups as closures, so probing works on stored hashes and `K: Eq` only
//! runs inside `probe`.

use crate::entry_store::Handle;

/// Outcome of walking a probe chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Probe {
    /// A cell whose handle satisfied the predicate.
    Found { index: usize, handle: Handle },
    /// The first empty cell on the chain.
    Vacant(usize),
}

#[derive(Clone, Debug)]
pub(crate) struct SlotTable {
    cells: Box<[Option<Handle>]>,
}

impl SlotTable {
    /// Empty table with `capacity` cells. `capacity` must be non-zero.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "slot table needs at least one cell");
        Self {
            cells: vec![None; capacity].into_boxed_slice(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub(crate) fn home(&self, hash: u64) -> usize {
        (hash % self.cells.len() as u64) as usize
    }

    #[inline]
    fn next(&self, index: usize) -> usize {
        let n = index + 1;
        if n == self.cells.len() {
            0
        } else {
            n
        }
    }

    /// Walks the chain from `hash`'s home index until `matches` accepts an
    /// occupant or an empty cell ends the chain. Returns `None` only when
    /// the table is completely full and nothing matched.
    pub(crate) fn probe<F>(&self, hash: u64, mut matches: F) -> Option<Probe>
    where
        F: FnMut(Handle) -> bool,
    {
        let mut index = self.home(hash);
        for _ in 0..self.cells.len() {
            match self.cells[index] {
                None => return Some(Probe::Vacant(index)),
                Some(handle) if matches(handle) => return Some(Probe::Found { index, handle }),
                Some(_) => index = self.next(index),
            }
        }
        None
    }

    /// Stores `handle` in an empty cell found by `probe`.
    pub(crate) fn occupy(&mut self, index: usize, handle: Handle) {
        debug_assert!(self.cells[index].is_none(), "occupying a taken cell");
        self.cells[index] = Some(handle);
    }

    /// Puts `handle` in the first empty cell of its chain without comparing
    /// occupants. The caller guarantees the key is not already indexed and
    /// that the load invariant leaves an empty cell.
    pub(crate) fn place(&mut self, hash: u64, handle: Handle) -> usize {
        match self.probe(hash, |_| false) {
            Some(Probe::Vacant(index)) => {
                self.cells[index] = Some(handle);
                index
            }
            _ => panic!("slot table has no vacant cell"),
        }
    }

    /// Empties `index` and repairs the chain that ran through it.
    ///
    /// Scans forward from the hole until the next empty cell. An occupant
    /// whose home lies outside the cyclic range `(hole, current]` would be
    /// cut off from its home by the hole, so it moves into the hole and its
    /// old cell becomes the hole. Returns the cell left empty at the end.
    pub(crate) fn vacate<H>(&mut self, index: usize, mut hash_of: H) -> usize
    where
        H: FnMut(Handle) -> u64,
    {
        let mut hole = index;
        self.cells[hole] = None;
        let mut cur = index;
        for _ in 1..self.cells.len() {
            cur = self.next(cur);
            let Some(handle) = self.cells[cur] else {
                break;
            };
            let home = self.home(hash_of(handle));
            if !reachable_past_hole(hole, cur, home) {
                self.cells[hole] = self.cells[cur].take();
                hole = cur;
            }
        }
        hole
    }

    /// Drops every handle, keeping the capacity.
    pub(crate) fn reset(&mut self) {
        self.cells.fill(None);
    }

    #[cfg(test)]
    pub(crate) fn cells(&self) -> &[Option<Handle>] {
        &self.cells
    }

    /// Checks that `live` (handle, hash) pairs occupy exactly one cell each,
    /// that no cell holds anything else, and that each chain from home to
    /// cell is unbroken.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self, live: &[(Handle, u64)]) {
        use std::collections::HashMap;

        let wanted: HashMap<Handle, u64> = live.iter().copied().collect();
        let mut seen: HashMap<Handle, usize> = HashMap::new();
        for (i, cell) in self.cells.iter().enumerate() {
            if let Some(h) = cell {
                assert!(wanted.contains_key(h), "cell {i} holds a dead handle");
                assert!(seen.insert(*h, i).is_none(), "handle indexed twice");
            }
        }
        assert_eq!(seen.len(), wanted.len(), "live handle missing from table");
        assert!(
            seen.len() < self.cells.len(),
            "table must keep an empty cell"
        );
        for (h, &at) in &seen {
            let mut i = self.home(wanted[h]);
            while i != at {
                assert!(self.cells[i].is_some(), "chain to cell {at} broken at {i}");
                i = self.next(i);
            }
        }
    }
}

/// True when an entry at `cur` with home `home` stays reachable once `hole`
/// (which precedes `cur` on the scan) is empty, i.e. `home` lies in the
/// cyclic range `(hole, cur]`.
#[inline]
fn reachable_past_hole(hole: usize, cur: usize, home: usize) -> bool {
    if hole < cur {
        hole < home && home <= cur
    } else {
        hole < home || home <= cur
    }
}
