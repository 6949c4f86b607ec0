#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can check
// bucket placement, which the public API does not expose.

use crate::config::TableConfig;
use crate::hash_table::HashTable;
use core::hash::BuildHasher;
use proptest::prelude::*;
use std::collections::hash_map::RandomState;
use std::collections::{BTreeSet, HashMap};
use std::hash::Hasher;

// Pool-indexed operations so shrinking moves toward earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    PutNull(i32),
    Replace(usize, i32),
    Remove(usize),
    RemoveNull,
    Get(usize),
    Clear,
    Iterate,
    // Remove every entry whose value is odd through a cursor.
    CursorSweep,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=8).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            1 => any::<i32>().prop_map(OpI::PutNull),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Replace(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => Just(OpI::RemoveNull),
            2 => idx.clone().prop_map(OpI::Get),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::CursorSweep),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn arb_config() -> impl Strategy<Value = TableConfig> {
    (1usize..8, prop_oneof![Just(0.5), Just(0.75), Just(1.0), Just(3.0)]).prop_map(|(cap, lf)| {
        TableConfig::new()
            .with_initial_capacity(cap)
            .with_load_factor(lf)
    })
}

// State-machine equivalence against std::collections::HashMap, where the
// model key `None` stands for the absent key.
fn run_state_machine<S: BuildHasher>(
    mut sut: HashTable<String, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Option<String>, i32> = HashMap::new();

    for op in ops {
        let before_cap = sut.capacity();
        match op {
            OpI::Put(i, v) => {
                let k = pool[i].clone();
                let expected = model.insert(Some(k.clone()), v);
                prop_assert_eq!(sut.put(k, v).unwrap(), expected);
            }
            OpI::PutNull(v) => {
                let expected = model.insert(None, v);
                prop_assert_eq!(sut.put_null(v).unwrap(), expected);
            }
            OpI::Replace(i, v) => {
                let k = pool[i].clone();
                let expected = match model.get_mut(&Some(k.clone())) {
                    Some(slot) => Some(core::mem::replace(slot, v)),
                    None => None,
                };
                prop_assert_eq!(sut.replace(k, v).unwrap(), expected);
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                let version = sut.version();
                let expected = model.remove(&Some(k.clone()));
                prop_assert_eq!(sut.remove(k.as_str()).unwrap(), expected);
                if expected.is_none() {
                    prop_assert_eq!(sut.version(), version);
                }
            }
            OpI::RemoveNull => {
                prop_assert_eq!(sut.remove_null().unwrap(), model.remove(&None));
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k.as_str()), model.get(&Some(k.clone())));
                prop_assert_eq!(sut.contains_key(k.as_str()), model.contains_key(&Some(k.clone())));
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
            }
            OpI::Iterate => {
                let s: BTreeSet<(Option<String>, i32)> =
                    sut.iter().map(|(k, v)| (k.cloned(), *v)).collect();
                let m: BTreeSet<(Option<String>, i32)> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(s, m);
                let keys: Vec<Option<String>> = sut.keys().into_iter().map(|k| k.cloned()).collect();
                let mut sorted: Vec<Option<String>> = model.keys().cloned().collect();
                sorted.sort();
                prop_assert_eq!(keys, sorted);
            }
            OpI::CursorSweep => {
                let mut c = sut.cursor();
                let mut visited = 0usize;
                loop {
                    let odd = match c.next(&sut).unwrap() {
                        Some((_, v)) => v % 2 != 0,
                        None => break,
                    };
                    visited += 1;
                    if odd {
                        let (k, v) = c.remove(&mut sut).unwrap();
                        prop_assert_eq!(model.remove(&k), Some(v));
                    }
                }
                prop_assert!(model.values().all(|v| v % 2 == 0));
                prop_assert!(visited >= model.len());
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.capacity() >= before_cap, "capacity never shrinks");
        prop_assert_eq!(sut.iter().count(), sut.len());
        prop_assert_eq!(sut.misplaced(), 0, "entry outside its bucket");
    }
    Ok(())
}

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
        7
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(config in arb_config(), (pool, ops) in arb_scenario()) {
        let sut = HashTable::with_config_and_hasher(config, RandomState::new()).unwrap();
        run_state_machine(sut, &pool, ops)?;
    }

    // Same invariants with every real key colliding into one chain.
    #[test]
    fn prop_state_machine_with_collisions(config in arb_config(), (pool, ops) in arb_scenario()) {
        let sut = HashTable::with_config_and_hasher(config, ConstBuildHasher).unwrap();
        run_state_machine(sut, &pool, ops)?;
    }

    // A resize never changes the observable (key, value) set.
    #[test]
    fn prop_resize_preserves_contents(keys in proptest::collection::btree_set(any::<u32>(), 1..64)) {
        let config = TableConfig::new().with_initial_capacity(2).with_load_factor(0.5);
        let mut t: HashTable<u32, u32> = HashTable::with_config(config).unwrap();
        let mut resizes = 0;
        for &k in &keys {
            let snapshot: BTreeSet<(u32, u32)> = t.iter().map(|(k, v)| (*k.unwrap(), *v)).collect();
            let cap = t.capacity();
            t.put(k, k.wrapping_mul(3)).unwrap();
            if t.capacity() != cap {
                resizes += 1;
                let after: BTreeSet<(u32, u32)> = t
                    .iter()
                    .map(|(k, v)| (*k.unwrap(), *v))
                    .filter(|(kk, _)| *kk != k)
                    .collect();
                prop_assert_eq!(after, snapshot);
            }
        }
        prop_assert_eq!(t.len(), keys.len());
        prop_assert!(keys.len() < 2 || resizes > 0);
        for &k in &keys {
            prop_assert_eq!(t.get(&k), Some(&k.wrapping_mul(3)));
        }
    }
}
