#![cfg(test)]

// Property tests for ChainTreeMap kept inside the crate so they can inspect
// the bucket array and check tree invariants after every operation.

use crate::bucket_store::{Bucket, MIN_TREEIFY_CAPACITY, TREEIFY_THRESHOLD};
use crate::chaintree_map::ChainTreeMap;
use crate::tree_bucket;
use core::hash::{BuildHasher, BuildHasherDefault, Hash, Hasher};
use proptest::prelude::*;
use std::collections::HashMap;

// Collapses every key onto a handful of hashes so that chains grow long and
// trees form even in small maps.
#[derive(Default)]
struct FewBuckets(u64);
impl Hasher for FewBuckets {
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = self.0.wrapping_add(u64::from(b));
        }
    }
    fn finish(&self) -> u64 {
        (self.0 % 3) * 64
    }
}
type Colliding = BuildHasherDefault<FewBuckets>;

#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    PutAbsent(i32),
    Get(usize),
    Remove(usize),
    RemoveAbsent,
    Iterate,
}

fn arb_ops() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=40).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
            1 => any::<i32>().prop_map(Op::PutAbsent),
            2 => idx.clone().prop_map(Op::Get),
            2 => idx.clone().prop_map(Op::Remove),
            1 => Just(Op::RemoveAbsent),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..200).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn check_structure<S>(m: &ChainTreeMap<String, i32, S>) -> Result<(), TestCaseError> {
    let store = &m.store;
    prop_assert!(store.capacity().is_power_of_two());
    prop_assert!(store.len() <= store.threshold());
    for &b in &store.buckets {
        match b {
            Bucket::Tree(r) => {
                prop_assert!(store.capacity() >= MIN_TREEIFY_CAPACITY);
                if let Err(e) = tree_bucket::check(&store.slots, Some(r)) {
                    return Err(TestCaseError::fail(e));
                }
            }
            Bucket::Chain(h) => {
                let n = crate::chain_bucket::walk(&store.slots, h).count();
                prop_assert!(n < TREEIFY_THRESHOLD || store.capacity() < MIN_TREEIFY_CAPACITY);
            }
            Bucket::Empty => {}
        }
    }
    Ok(())
}

fn run<S: BuildHasher>(
    mut sut: ChainTreeMap<String, i32, S>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Option<String>, i32> = HashMap::new();
    for op in ops {
        match op {
            Op::Put(i, v) => {
                let k = pool[i].clone();
                prop_assert_eq!(sut.put(k.clone(), v), model.insert(Some(k), v));
            }
            Op::PutAbsent(v) => {
                prop_assert_eq!(sut.put_absent(v), model.insert(None, v));
            }
            Op::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k.as_str()), model.get(&Some(k.clone())));
                prop_assert_eq!(sut.get_absent(), model.get(&None));
            }
            Op::Remove(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.remove(k.as_str()), model.remove(&Some(k.clone())));
            }
            Op::RemoveAbsent => {
                prop_assert_eq!(sut.remove_absent(), model.remove(&None));
            }
            Op::Iterate => {
                let mut seen: Vec<(Option<String>, i32)> =
                    sut.iter().map(|(k, v)| (k.cloned(), *v)).collect();
                let mut expected: Vec<(Option<String>, i32)> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                seen.sort();
                expected.sort();
                prop_assert_eq!(seen, expected);
            }
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        check_structure(&sut)?;
    }
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap with
// the absent key modelled as `None`.
// - `put`/`remove` return the same previous values as the model.
// - `get` and `get_absent` agree with the model after every step.
// - `iter` yields each live entry exactly once.
// - Capacity stays a power of two and the load threshold is respected.
// - Tree buckets only exist in tables of at least 64 buckets and satisfy the
//   red-black and ordering invariants.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_state_machine_default_hasher((pool, ops) in arb_ops()) {
        run(ChainTreeMap::new(), &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_colliding_hasher((pool, ops) in arb_ops()) {
        run(ChainTreeMap::with_hasher(Colliding::default()), &pool, ops)?;
    }
}

// Property: the render order of `iter` is bucket order, then chain order or
// ascending key order inside trees; `to_string` follows the same order.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]

    #[test]
    fn prop_display_matches_iter(keys in proptest::collection::vec(any::<u16>(), 0..120)) {
        let mut m: ChainTreeMap<u16, u16, Colliding> = ChainTreeMap::with_hasher(Colliding::default());
        for k in &keys {
            m.put(*k, k.wrapping_mul(3));
        }
        let rendered: Vec<String> = m
            .iter()
            .map(|(k, v)| format!("{}={}", k.copied().unwrap_or_default(), v))
            .collect();
        prop_assert_eq!(m.to_string(), format!("{{{}}}", rendered.join(", ")));

        for &b in &m.store.buckets {
            if let Bucket::Tree(r) = b {
                let mut walk = tree_bucket::InOrder::new(&m.store.slots, r);
                let mut prev: Option<u16> = None;
                while let Some(e) = walk.next(&m.store.slots) {
                    let k = m.store.slots[e].key;
                    prop_assert!(prev < k);
                    prev = k;
                }
            }
        }
    }
}

#[test]
fn colliding_hasher_really_collides() {
    let s = Colliding::default();
    let mut h = s.build_hasher();
    "abc".hash(&mut h);
    assert_eq!(h.finish() % 64, 0);
}
