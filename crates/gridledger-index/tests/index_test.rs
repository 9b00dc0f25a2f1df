//! Ordered index validation tests.
//!
//! Exercises the B+ tree through its public API only:
//! - every inserted key is found, absent keys are not
//! - node occupancy stays within `t-1 ..= 2t-1`
//! - the leaf chain yields exactly the inserted keys in ascending order
//! - duplicate keys are rejected without side effects

use rand::seq::SliceRandom;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::BTreeSet;

use gridledger_common::LedgerError;
use gridledger_index::OrderedIndex;

const DEGREES: [usize; 4] = [2, 3, 4, 8];

fn shuffled_keys(seed: u64, count: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut keys: Vec<u64> = (0..count as u64).map(|k| k * 3 + 1).collect();
    keys.shuffle(&mut rng);
    keys
}

#[test]
fn test_shuffled_inserts_found_for_all_degrees() {
    for (i, &t) in DEGREES.iter().enumerate() {
        let keys = shuffled_keys(i as u64 + 11, 2_000);
        let mut index = OrderedIndex::new(t).unwrap();

        for &k in &keys {
            index.insert(k, k ^ 0xABCD).unwrap();
        }

        assert_eq!(index.len(), keys.len());
        for &k in &keys {
            assert_eq!(index.search(k), Some(&(k ^ 0xABCD)), "t={} key={}", t, k);
        }
        // Keys are 1 mod 3; neighbours were never inserted.
        for &k in keys.iter().take(200) {
            assert!(index.search(k + 1).is_none());
            assert!(index.search(k - 1).is_none());
        }
        index.check_invariants().unwrap();
    }
}

#[test]
fn test_leaf_chain_matches_inserted_set() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut index = OrderedIndex::new(2).unwrap();
    let mut expected = BTreeSet::new();

    while expected.len() < 1_500 {
        let key: u64 = rng.gen_range(0..1_000_000);
        let result = index.insert(key, ());
        if expected.insert(key) {
            assert!(result.is_ok());
        } else {
            assert!(matches!(result, Err(LedgerError::DuplicateKey { .. })));
        }
    }

    let scanned: Vec<u64> = index.keys().collect();
    let expected: Vec<u64> = expected.into_iter().collect();
    assert_eq!(scanned, expected);
    index.check_invariants().unwrap();
}

#[test]
fn test_invariants_hold_after_every_insert() {
    let keys = shuffled_keys(7, 300);
    let mut index = OrderedIndex::new(3).unwrap();

    for &k in &keys {
        index.insert(k, ()).unwrap();
        index.check_invariants().unwrap();
    }
}

#[test]
fn test_reference_example_degree_two() {
    let mut index = OrderedIndex::new(2).unwrap();
    let sequence = [10u64, 20, 5, 6, 12, 30, 7, 17];

    for (i, &k) in sequence.iter().enumerate() {
        index.insert(k, format!("record-{}", k)).unwrap();
        if i < 3 {
            assert_eq!(index.height(), 1);
        }
        if i == 3 {
            assert_eq!(index.height(), 2, "root splits on the fourth insert");
        }
    }

    let scanned: Vec<u64> = index.keys().collect();
    assert_eq!(scanned, vec![5, 6, 7, 10, 12, 17, 20, 30]);
    assert_eq!(index.search(17).map(String::as_str), Some("record-17"));
    index.check_invariants().unwrap();
}

#[test]
fn test_sequential_inserts_stay_shallow() {
    let mut index = OrderedIndex::new(16).unwrap();
    for k in 0..100_000u64 {
        index.insert(k, k).unwrap();
    }

    assert!(index.height() <= 6, "height {}", index.height());
    assert_eq!(index.values().copied().sum::<u64>(), (0..100_000u64).sum::<u64>());
    index.check_invariants().unwrap();
}
