//! Tests for the indexes
//!
//! These tests verify:
//! - Binary search finds every present key and no absent key
//! - Insert positions keep the array sorted
//! - Hash index offsets point at value fields

use std::collections::BTreeMap;

use mapkv::index::{HashIndex, SortedIndex};
use mapkv::record::{binary, text, Record};
use proptest::prelude::*;

// =============================================================================
// Helper Functions
// =============================================================================

fn binary_region(records: &BTreeMap<u16, u32>) -> Vec<u8> {
    records
        .iter()
        .flat_map(|(&key, &value)| binary::encode(&Record { key, value }))
        .collect()
}

// =============================================================================
// SortedIndex Tests
// =============================================================================

#[test]
fn test_search_every_key_in_small_arrays() {
    // Odd and even lengths exercise both halves of every split
    for n in 0..=9u16 {
        let records: BTreeMap<u16, u32> = (0..n).map(|i| (i * 3 + 1, i as u32)).collect();
        let region = binary_region(&records);
        let index = SortedIndex::new(&region).unwrap();

        for key in 0..=30u16 {
            let expected = records.get(&key).copied();
            assert_eq!(index.get(key).unwrap(), expected, "n={} key={}", n, key);
        }
    }
}

#[test]
fn test_insert_position_keeps_order() {
    let records: BTreeMap<u16, u32> = [(10, 1), (20, 2), (30, 3)].into_iter().collect();
    let region = binary_region(&records);
    let index = SortedIndex::new(&region).unwrap();

    assert_eq!(index.search(5), Err(0));
    assert_eq!(index.search(15), Err(1));
    assert_eq!(index.search(25), Err(2));
    assert_eq!(index.search(35), Err(3));
    assert_eq!(index.search(20), Ok(1));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_search_matches_map(records in prop::collection::btree_map(any::<u16>(), any::<u32>(), 0..200)) {
        let region = binary_region(&records);
        let index = SortedIndex::new(&region).unwrap();

        prop_assert_eq!(index.first_unordered(), None);
        for key in 0..=u16::MAX {
            prop_assert_eq!(index.get(key).unwrap(), records.get(&key).copied());
        }
    }
}

// =============================================================================
// HashIndex Tests
// =============================================================================

#[test]
fn test_hash_offsets_point_at_value_fields() {
    let records = [
        Record { key: 1, value: 11 },
        Record { key: 22222, value: 0 },
        Record { key: 333, value: u32::MAX },
    ];
    let region: Vec<u8> = records
        .iter()
        .flat_map(|r| text::encode(r).unwrap())
        .collect();

    let index = HashIndex::build(&region).unwrap();
    assert_eq!(index.len(), 3);

    for record in &records {
        let offset = index.value_offset(record.key).unwrap();
        let field = &region[offset..offset + text::VALUE_WIDTH];
        assert_eq!(text::decode_value(field).unwrap(), record.value);
        assert_eq!(index.get(&region, record.key).unwrap(), Some(record.value));
    }
    assert_eq!(index.value_offset(2), None);
}

#[test]
fn test_hash_build_rejects_garbage() {
    assert!(HashIndex::build(b"not a record\n").is_err());
}
