//! Property-based tests for insertion, lookup, and ordered scans.

use parking_index::{BPlusIndex, DropRelease, IndexConfig, NaturalOrder};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

fn key_sequence() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(-500i32..500, 0..400)
}

fn build(branching_factor: usize, keys: &[i32]) -> (BPlusIndex<i32, i32>, BTreeMap<i32, i32>) {
    let mut index = BPlusIndex::new(branching_factor).unwrap();
    let mut reference = BTreeMap::new();
    for (position, key) in keys.iter().enumerate() {
        let position = position as i32;
        if index.insert(*key, position).is_ok() {
            reference.insert(*key, position);
        }
    }
    (index, reference)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn every_inserted_key_is_found(t in 2usize..8, keys in key_sequence()) {
        let (index, reference) = build(t, &keys);
        for (key, position) in &reference {
            prop_assert_eq!(index.get(key), Some(position));
        }
        prop_assert_eq!(index.len(), reference.len());
    }

    #[test]
    fn first_insert_wins_on_duplicates(t in 2usize..8, keys in key_sequence()) {
        let (index, _) = build(t, &keys);
        for key in keys.iter().collect::<BTreeSet<_>>() {
            let first = keys.iter().position(|k| k == key).unwrap() as i32;
            prop_assert_eq!(index.get(key), Some(&first));
        }
    }

    #[test]
    fn scan_is_strictly_ascending_and_complete(t in 2usize..8, keys in key_sequence()) {
        let (index, _) = build(t, &keys);
        let scanned: Vec<i32> = index.keys().copied().collect();
        let expected: Vec<i32> = keys.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        prop_assert_eq!(&scanned, &expected);

        let mut reversed: Vec<i32> = index.keys().rev().copied().collect();
        reversed.reverse();
        prop_assert_eq!(reversed, expected);
    }

    #[test]
    fn structure_stays_valid(t in 2usize..8, keys in key_sequence()) {
        let (index, _) = build(t, &keys);
        prop_assert!(index.check_invariants_detailed().is_ok());
        let (leaves, branches) = index.count_nodes_in_tree();
        prop_assert_eq!(leaves, index.leaf_count());
        prop_assert_eq!(branches, index.branch_count());
    }

    #[test]
    fn absent_keys_are_not_found(t in 2usize..8, keys in key_sequence(), probe in -600i32..600) {
        let (index, reference) = build(t, &keys);
        prop_assert_eq!(index.get(&probe), reference.get(&probe));
        prop_assert_eq!(index.contains_key(&probe), reference.contains_key(&probe));
    }

    #[test]
    fn node_limit_failures_leave_tree_intact(limit in 1usize..12, keys in key_sequence()) {
        let config = IndexConfig::new(2).with_node_limit(limit);
        let mut index: BPlusIndex<i32, i32> =
            BPlusIndex::with_config(config, NaturalOrder, DropRelease).unwrap();
        let mut reference = BTreeMap::new();
        for key in keys {
            match index.insert(key, key) {
                Ok(()) => {
                    reference.insert(key, key);
                }
                Err(e) => {
                    prop_assert!(e.is_duplicate_key() || e.is_allocation_failure());
                }
            }
            prop_assert!(index.node_count() <= limit);
        }
        prop_assert!(index.items().map(|(k, v)| (*k, *v)).eq(reference.into_iter()));
        prop_assert!(index.check_invariants());
    }
}
