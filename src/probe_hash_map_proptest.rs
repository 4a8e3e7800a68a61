#![cfg(test)]

// Property tests for ProbeHashMap kept inside the crate so they can check
// the probe table against the arena after every operation.

use crate::config::MapConfig;
use crate::entry_store::Handle;
use crate::error::{InsertError, KeyNotFound};
use crate::hashers::IdentityBuildHasher;
use crate::probe_hash_map::ProbeHashMap;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hasher};

#[derive(Clone, Debug)]
enum Op {
    Insert(u32, i32),
    Replace(u32, i32),
    Upsert(u32, i32),
    Remove(u32),
    RemoveHandle(u32),
    Get(u32),
    Mutate(u32, i32),
    Clear,
    CloneCheck,
}

// Keys are drawn from a narrow range so identity hashing collides and
// chains wrap around the end of small tables.
fn arb_ops(max_key: u32) -> impl Strategy<Value = Vec<Op>> {
    let key = 0..max_key;
    let op = prop_oneof![
        6 => (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::Replace(k, v)),
        2 => (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::Upsert(k, v)),
        4 => key.clone().prop_map(Op::Remove),
        2 => key.clone().prop_map(Op::RemoveHandle),
        3 => key.clone().prop_map(Op::Get),
        2 => (key, any::<i32>()).prop_map(|(k, d)| Op::Mutate(k, d)),
        1 => Just(Op::Clear),
        1 => Just(Op::CloneCheck),
    ];
    proptest::collection::vec(op, 1..120)
}

// Ordered model: a Vec of pairs in first-insertion order.
fn model_pos(model: &[(u32, i32)], k: u32) -> Option<usize> {
    model.iter().position(|&(mk, _)| mk == k)
}

// State machine over ProbeHashMap against an ordered Vec model.
// Invariants checked after every op:
// - the table holds exactly one cell per live entry, on its probe chain;
// - iteration matches the model's insertion order;
// - `len`/`is_empty` parity; stale handles never resolve;
// - tracked handles stay valid across growth and unrelated removals.
fn run<S>(mut sut: ProbeHashMap<u32, i32, S>, ops: Vec<Op>) -> Result<(), TestCaseError>
where
    S: BuildHasher + Clone,
{
    let mut model: Vec<(u32, i32)> = Vec::new();
    let mut live: HashMap<u32, Handle> = HashMap::new();
    let mut stale: Vec<Handle> = Vec::new();

    for op in ops {
        match op {
            Op::Insert(k, v) => {
                let already = model_pos(&model, k).is_some();
                match sut.insert(k, v) {
                    Ok(h) => {
                        prop_assert!(!already, "insert must fail on duplicate");
                        prop_assert!(live.insert(k, h).is_none());
                        model.push((k, v));
                    }
                    Err(InsertError::DuplicateKey) => {
                        prop_assert!(already, "duplicate error only when key exists");
                    }
                }
            }
            Op::Replace(k, v) => {
                let prev = sut.insert_or_replace(k, v);
                match model_pos(&model, k) {
                    Some(i) => {
                        prop_assert_eq!(prev, Some(model[i].1));
                        model[i].1 = v;
                    }
                    None => {
                        prop_assert_eq!(prev, None);
                        model.push((k, v));
                        let h = sut.find(&k).expect("inserted key is findable");
                        live.insert(k, h);
                    }
                }
            }
            Op::Upsert(k, v) => {
                let slot = sut.get_or_insert_with(k, || v);
                *slot = slot.wrapping_add(1);
                match model_pos(&model, k) {
                    Some(i) => model[i].1 = model[i].1.wrapping_add(1),
                    None => {
                        model.push((k, v.wrapping_add(1)));
                        let h = sut.find(&k).expect("inserted key is findable");
                        live.insert(k, h);
                    }
                }
            }
            Op::Remove(k) => {
                let got = sut.remove(&k);
                match model_pos(&model, k) {
                    Some(i) => {
                        let (_, mv) = model.remove(i);
                        prop_assert_eq!(got, Some(mv));
                        stale.push(live.remove(&k).expect("tracked"));
                    }
                    None => prop_assert_eq!(got, None),
                }
                prop_assert!(sut.get(&k).is_none());
            }
            Op::RemoveHandle(k) => {
                if let Some(h) = live.remove(&k) {
                    let i = model_pos(&model, k).expect("tracked key in model");
                    let pair = model.remove(i);
                    prop_assert_eq!(sut.remove_handle(h), Some(pair));
                    stale.push(h);
                }
            }
            Op::Get(k) => {
                let expect = model_pos(&model, k).map(|i| model[i].1);
                prop_assert_eq!(sut.get(&k).copied(), expect);
                prop_assert_eq!(sut.at(&k).ok().copied(), expect);
                if expect.is_none() {
                    prop_assert_eq!(sut.at(&k), Err(KeyNotFound));
                } else {
                    prop_assert_eq!(sut.find(&k), live.get(&k).copied());
                }
            }
            Op::Mutate(k, d) => {
                if let Some(&h) = live.get(&k) {
                    let vr = h.value_mut(&mut sut).expect("live handle should resolve");
                    *vr = vr.wrapping_add(d);
                    let i = model_pos(&model, k).expect("tracked key in model");
                    model[i].1 = model[i].1.wrapping_add(d);
                }
            }
            Op::Clear => {
                sut.clear();
                prop_assert_eq!(sut.capacity(), sut.config().initial_capacity());
                model.clear();
                stale.extend(live.drain().map(|(_, h)| h));
            }
            Op::CloneCheck => {
                let mut copy = sut.clone();
                copy.assert_consistent();
                prop_assert!(copy == sut);
                // Mutating the copy leaves the source alone.
                for v in copy.values_mut() {
                    *v = v.wrapping_add(1);
                }
                copy.insert_or_replace(u32::MAX, 0);
                let source: Vec<(u32, i32)> = sut.iter().map(|(k, v)| (*k, *v)).collect();
                prop_assert_eq!(&source, &model);
            }
        }

        sut.assert_consistent();
        let order: Vec<(u32, i32)> = sut.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(&order, &model);
        for &h in &stale {
            prop_assert!(h.value(&sut).is_none());
        }
        for (k, &h) in &live {
            prop_assert_eq!(h.key(&sut), Some(k));
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }
    Ok(())
}

// Collision variant: every key shares one home cell.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_state_machine_identity(ops in arb_ops(48)) {
        run(ProbeHashMap::with_hasher(IdentityBuildHasher), ops)?;
    }

    #[test]
    fn prop_state_machine_default_hasher(ops in arb_ops(1 << 16)) {
        run(ProbeHashMap::new(), ops)?;
    }

    #[test]
    fn prop_state_machine_with_collisions(ops in arb_ops(32)) {
        run(ProbeHashMap::with_hasher(ConstBuildHasher), ops)?;
    }

    // Tiny tables with a larger growth factor: wraparound on nearly every
    // chain and multi-step growth.
    #[test]
    fn prop_state_machine_tiny_table(ops in arb_ops(24)) {
        let config = MapConfig::new()
            .with_initial_capacity(1)
            .and_then(|c| c.with_load_factor(3))
            .expect("valid config");
        run(ProbeHashMap::with_config_and_hasher(config, IdentityBuildHasher), ops)?;
    }
}
