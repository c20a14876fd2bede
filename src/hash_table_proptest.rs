#![cfg(all(test, feature = "std"))]

// Property tests for the raw table. They live inside the crate so they can
// check the slot layout after every operation.

use std::collections::BTreeSet;
use std::vec::Vec;

use proptest::prelude::*;

use crate::hash_table::HashTable;

// Few distinct hashes so that long runs, wrap-around and displacement all
// show up in small tables.
fn hash_of(key: u16) -> u64 {
    u64::from(key % 37).wrapping_mul(0x9e37_79b9_7f4a_7c15)
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u16),
    Remove(u16),
    Find(u16),
    Retain(u16),
    EraseWalk(u16),
    Reserve(u8),
    Shrink,
    Clear,
}

fn arb_op() -> impl Strategy<Value = Op> {
    let key = 0u16..200;
    prop_oneof![
        6 => key.clone().prop_map(Op::Insert),
        3 => key.clone().prop_map(Op::Remove),
        2 => key.prop_map(Op::Find),
        1 => (2u16..7).prop_map(Op::Retain),
        1 => (2u16..7).prop_map(Op::EraseWalk),
        1 => any::<u8>().prop_map(Op::Reserve),
        1 => Just(Op::Shrink),
        1 => Just(Op::Clear),
    ]
}

fn contents(table: &HashTable<u16>) -> BTreeSet<u16> {
    table.iter().copied().collect()
}

// Property: the table behaves like a set of keys and keeps its layout valid.
// - Every occupied bucket sits exactly `dist - 1` past its ideal bucket.
// - Runs are ordered by displacement and the sentinel is intact.
// - `len` never exceeds capacity and matches the model.
// - Cursor walks with erasure visit every live key once.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_matches_model(ops in proptest::collection::vec(arb_op(), 1..200)) {
        let mut table: HashTable<u16> = HashTable::new();
        let mut model: BTreeSet<u16> = BTreeSet::new();
        let hasher = |&k: &u16| hash_of(k);

        for op in ops {
            match op {
                Op::Insert(k) => {
                    let inserted = match table.entry(hash_of(k), |&v| v == k, hasher) {
                        crate::hash_table::Entry::Vacant(entry) => {
                            entry.insert(k);
                            true
                        }
                        crate::hash_table::Entry::Occupied(_) => false,
                    };
                    prop_assert_eq!(inserted, model.insert(k));
                }
                Op::Remove(k) => {
                    let removed = table.remove(hash_of(k), |&v| v == k);
                    prop_assert_eq!(removed.is_some(), model.remove(&k));
                }
                Op::Find(k) => {
                    prop_assert_eq!(
                        table.find(hash_of(k), |&v| v == k).copied(),
                        model.get(&k).copied()
                    );
                }
                Op::Retain(m) => {
                    table.retain(|v| *v % m != 0);
                    model.retain(|v| *v % m != 0);
                }
                Op::EraseWalk(m) => {
                    let mut seen = Vec::new();
                    let mut cursor = table.begin();
                    while let Some(at) = cursor {
                        let v = *table.get_at(at).unwrap();
                        seen.push(v);
                        cursor = if v % m == 0 {
                            table.erase_at(at).1
                        } else {
                            table.advance(at)
                        };
                    }
                    seen.sort_unstable();
                    let expected: Vec<u16> = model.iter().copied().collect();
                    prop_assert_eq!(seen, expected);
                    model.retain(|v| *v % m != 0);
                }
                Op::Reserve(n) => {
                    table.reserve(usize::from(n), hasher);
                    prop_assert!(table.capacity() >= table.len() + usize::from(n));
                }
                Op::Shrink => {
                    table.shrink_to_fit(hasher);
                    prop_assert!(table.capacity() >= table.len());
                }
                Op::Clear => {
                    table.clear();
                    model.clear();
                }
            }

            table.assert_invariants(hasher);
            prop_assert_eq!(table.len(), model.len());
            prop_assert_eq!(contents(&table), model.clone());
        }
    }
}

// Property: removing any key never lengthens the probe sequence of the keys
// that remain.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_remove_never_lengthens_probes(
        keys in proptest::collection::btree_set(0u16..400, 1..120),
        victim in any::<proptest::sample::Index>(),
    ) {
        let hasher = |&k: &u16| hash_of(k);
        let mut table: HashTable<u16> = HashTable::new();
        for &k in &keys {
            table.entry(hash_of(k), |&v| v == k, hasher).or_insert(k);
        }
        let keys: Vec<u16> = keys.into_iter().collect();
        let victim = keys[victim.index(keys.len())];

        let before: Vec<usize> = keys
            .iter()
            .map(|&k| table.find_cursor(hash_of(k), |&v| v == k).unwrap().bucket())
            .collect();
        let buckets = table.bucket_count();
        let displacement = |bucket: usize, k: u16| {
            bucket.wrapping_sub(hash_of(k) as usize) & (buckets - 1)
        };

        prop_assert_eq!(table.remove(hash_of(victim), |&v| v == victim), Some(victim));
        table.assert_invariants(hasher);

        for (i, &k) in keys.iter().enumerate() {
            if k == victim {
                prop_assert!(table.find(hash_of(k), |&v| v == k).is_none());
                continue;
            }
            let after = table.find_cursor(hash_of(k), |&v| v == k).unwrap().bucket();
            prop_assert!(displacement(after, k) <= displacement(before[i], k));
        }
    }
}

// Property: a failed reservation leaves the table bit-for-bit unchanged and a
// clone is an independent copy with the same layout.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_reserve_failure_and_clone(keys in proptest::collection::vec(0u16..1000, 0..300)) {
        let hasher = |&k: &u16| hash_of(k);
        let mut table: HashTable<u16> = HashTable::new();
        for &k in &keys {
            table.entry(hash_of(k), |&v| v == k, hasher).or_insert(k);
        }

        let order: Vec<u16> = table.iter().copied().collect();
        let buckets = table.bucket_count();
        prop_assert!(table.try_reserve(usize::MAX, hasher).is_err());
        prop_assert_eq!(table.bucket_count(), buckets);
        prop_assert_eq!(table.iter().copied().collect::<Vec<_>>(), order.clone());

        let mut copy = table.try_clone().unwrap();
        prop_assert_eq!(copy.bucket_count(), buckets);
        prop_assert_eq!(copy.iter().copied().collect::<Vec<_>>(), order.clone());
        copy.assert_invariants(hasher);

        copy.clear();
        prop_assert_eq!(table.iter().copied().collect::<Vec<_>>(), order);
    }
}
