//! probe-hashmap: a single-threaded, insertion-ordered hash map using
//! linear probing over stable entry handles.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: an open-addressing map whose iteration order is insertion order
//!   and whose entry references survive unrelated inserts and removals.
//! - Layers:
//!   - EntryStore<K, V>: `SlotMap` arena of `(key, value, hash)` nodes
//!     with an intrusive doubly linked list for order. Hands out
//!     generational `Handle`s.
//!   - SlotTable: boxed slice of `Option<Handle>` cells. Owns probing,
//!     placement and the tombstone-free erase repair. Never sees keys.
//!   - ProbeHashMap<K, V, S>: public API; hashes keys, compares them during
//!     probing, and decides when to rebuild the table.
//!
//! Constraints
//! - Single-threaded; no interior mutability or synchronization.
//! - Before every insertion `capacity >= (len + 1) * load_factor`, so a
//!   probe always meets an empty cell.
//! - Unique keys: `insert` rejects duplicates with
//!   `InsertError::DuplicateKey`; overwriting is explicit via
//!   `insert_or_replace`, `Extend` or `get_or_insert_*`.
//! - No tombstones: `remove` pulls displaced chain members back into the
//!   freed cell until the chain ends.
//!
//! Hasher and rehashing invariants
//! - Each node stores the `u64` hash computed at insertion. Table rebuilds
//!   (growth, clone) place nodes by stored hash; `K: Hash` is only invoked
//!   on the key passed into an operation.
//! - A cloned `S` must hash like the original, as with any `BuildHasher`.
//!
//! Sizing
//! - `MapConfig` carries the initial capacity (default 10) and load factor
//!   (default 2) per instance. Growth multiplies the capacity by the load
//!   factor; `clear` returns to the initial capacity.
//!
//! Notes and non-goals
//! - No multimap semantics, persistence or custom allocators.
//! - `iter_mut` splits the arena into per-entry borrows before walking the
//!   order links, trading a temporary allocation for safe code.
//! - Handles are tied to one map; a clone's handles differ from the
//!   source's.

mod config;
mod entry_store;
mod error;
pub mod hashers;
mod probe_hash_map;
mod probe_hash_map_proptest;
mod slot_table;

// Public surface
pub use config::{MapConfig, DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR};
pub use entry_store::{Handle, IntoIter, Iter, IterMut};
pub use error::{ConfigError, InsertError, KeyNotFound};
pub use hashers::IdentityBuildHasher;
pub use probe_hash_map::ProbeHashMap;
