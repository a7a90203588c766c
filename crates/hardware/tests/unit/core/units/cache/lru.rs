//! # LRU Victim Selection Tests
//!
//! The victim is the way with the strictly smallest stamp; ties go to the
//! lowest way index.

use mesisim_core::core::units::cache::lru::select_victim;
use mesisim_core::core::units::cache::{CacheLine, MesiState};
use proptest::prelude::*;

fn set_with_stamps(stamps: &[u64]) -> Vec<CacheLine> {
    stamps
        .iter()
        .enumerate()
        .map(|(tag, &stamp)| CacheLine::new(tag as u64, MesiState::Shared, stamp))
        .collect()
}

#[test]
fn smallest_stamp_wins() {
    assert_eq!(select_victim(&set_with_stamps(&[5, 3, 9, 4])), 1);
    assert_eq!(select_victim(&set_with_stamps(&[5, 6, 7, 0])), 3);
}

#[test]
fn ties_go_to_lowest_way() {
    assert_eq!(select_victim(&set_with_stamps(&[7, 2, 2, 2])), 1);
    assert_eq!(select_victim(&set_with_stamps(&[0, 0, 0, 0])), 0);
}

#[test]
fn single_way_and_empty_set() {
    assert_eq!(select_victim(&set_with_stamps(&[42])), 0);
    assert_eq!(select_victim(&[]), 0);
}

proptest! {
    #[test]
    fn victim_is_first_minimum(stamps in prop::collection::vec(0u64..16, 1..16)) {
        let ways = set_with_stamps(&stamps);
        let victim = select_victim(&ways);
        let min = *stamps.iter().min().unwrap();

        prop_assert_eq!(stamps[victim], min);
        prop_assert!(stamps[..victim].iter().all(|&s| s > min));
    }
}
