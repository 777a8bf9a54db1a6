// ChainTreeMap property tests through the public API.
//
// Property 1: the map behaves like std's HashMap under random put/remove/get
//  sequences, with the absent key modelled as `None`.
//  - Invariant: get/len/contains agree with the model after every step.
//  - Invariant: capacity is a power of two and len <= capacity * 0.75.
//
// Property 2: heavy collisions.
//  - Model: BTreeMap, since a constant hasher sends every key to one bucket.
//  - Invariant: every inserted key stays retrievable through treeify and
//    resize, and the tree bucket renders in ascending key order.
//
// Property 3: resizes preserve contents.
//  - Operations: insert n keys, then reserve; iteration yields the same
//    multiset of entries before and after.
use chaintree_map::{ChainTreeMap, LOAD_FACTOR};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasherDefault, Hasher};

#[derive(Default)]
struct Constant;
impl Hasher for Constant {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property 1: model equivalence.
proptest! {
    #[test]
    fn prop_matches_std_hashmap(ops in proptest::collection::vec((0u8..=3u8, 0u16..300u16, any::<i64>()), 1..400)) {
        let mut m: ChainTreeMap<u16, i64> = ChainTreeMap::new();
        let mut model: HashMap<Option<u16>, i64> = HashMap::new();

        for (op, k, v) in ops {
            match op {
                0 => prop_assert_eq!(m.put(k, v), model.insert(Some(k), v)),
                1 => prop_assert_eq!(m.remove(&k), model.remove(&Some(k))),
                2 => {
                    // Keys divisible by 37 stand in for the absent key.
                    if k % 37 == 0 {
                        prop_assert_eq!(m.put_absent(v), model.insert(None, v));
                    } else {
                        prop_assert_eq!(m.get(&k), model.get(&Some(k)));
                    }
                }
                _ => {
                    if k % 37 == 0 {
                        prop_assert_eq!(m.remove_absent(), model.remove(&None));
                    } else {
                        prop_assert_eq!(m.contains_key(&k), model.contains_key(&Some(k)));
                    }
                }
            }
            prop_assert_eq!(m.len(), model.len());
            prop_assert!(m.capacity().is_power_of_two());
            prop_assert!(m.len() as f32 <= m.capacity() as f32 * LOAD_FACTOR);
        }

        prop_assert_eq!(m.iter().count(), model.len());
        for (k, v) in m.iter() {
            prop_assert_eq!(model.get(&k.copied()), Some(v));
        }
    }
}

// Property 2: constant hash sends everything to bucket 0.
proptest! {
    #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]
    #[test]
    fn prop_single_bucket_behaves_like_btreemap(
        ops in proptest::collection::vec((any::<bool>(), 0u32..64u32), 1..200)
    ) {
        let mut m: ChainTreeMap<u32, u32, BuildHasherDefault<Constant>> =
            ChainTreeMap::with_hasher(BuildHasherDefault::default());
        let mut model: BTreeMap<u32, u32> = BTreeMap::new();

        for (insert, k) in ops {
            if insert {
                prop_assert_eq!(m.put(k, k + 1), model.insert(k, k + 1));
            } else {
                prop_assert_eq!(m.remove(&k), model.remove(&k));
            }
            prop_assert_eq!(m.len(), model.len());
        }

        for (k, v) in &model {
            prop_assert_eq!(m.get(k), Some(v));
        }

        // Only bucket 0 is occupied, so once it is a tree the map renders
        // in ascending key order.
        let dump = m.debug_info().to_string();
        if dump.contains("[tree]") {
            let keys: Vec<u32> = m.keys().map(|k| *k.unwrap()).collect();
            let expected: Vec<u32> = model.keys().copied().collect();
            prop_assert_eq!(keys, expected);
        }
    }
}

// Property 3: reserve is content-preserving.
proptest! {
    #[test]
    fn prop_reserve_preserves_entries(
        keys in proptest::collection::hash_set("[a-z]{1,6}", 0..150),
        extra in 0usize..2000
    ) {
        let mut m: ChainTreeMap<String, usize> = ChainTreeMap::new();
        for (i, k) in keys.iter().enumerate() {
            m.put(k.clone(), i);
        }
        let mut before: Vec<(String, usize)> =
            m.iter().map(|(k, v)| (k.unwrap().clone(), *v)).collect();
        before.sort();

        let cap = m.capacity();
        m.reserve(extra);
        prop_assert!(m.capacity() >= cap);
        prop_assert!((m.len() + extra) as f32 <= m.capacity() as f32 * LOAD_FACTOR);

        let mut after: Vec<(String, usize)> =
            m.iter().map(|(k, v)| (k.unwrap().clone(), *v)).collect();
        after.sort();
        prop_assert_eq!(before, after);
    }
}
