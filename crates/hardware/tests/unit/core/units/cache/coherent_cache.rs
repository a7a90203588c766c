//! # Coherent Cache Tests
//!
//! Structure, lookup and snoop behaviour of a single core's L1-D.

use mesisim_core::common::addr::LineAddr;
use mesisim_core::common::data::BusOp;
use mesisim_core::config::CacheConfig;
use mesisim_core::core::CoherentCache;
use mesisim_core::core::units::cache::MesiState;
use mesisim_core::stats::CoreStats;
use pretty_assertions::assert_eq;

use crate::common::harness;

fn cold_cache() -> CoherentCache {
    CoherentCache::new(CacheConfig::default().geometry().unwrap())
}

#[test]
fn cold_cache_is_empty() {
    let cache = cold_cache();
    assert_eq!(cache.sets().count(), 64);
    assert!(cache.sets().all(|ways| ways.len() == 8));
    assert_eq!(cache.valid_lines(), 0);
    assert_eq!(cache.free_way(17), Some(0));
    assert_eq!(cache.state_of(0x1234), MesiState::Invalid);
    assert_eq!(cache.duplicate_tag(), None);
    assert_eq!(cache.stats, CoreStats::default());
}

#[test]
fn snoop_on_absent_block_is_ignored() {
    let mut cache = cold_cache();
    assert_eq!(cache.snoop(100, BusOp::BusRd), None);
    assert_eq!(cache.snoop(100, BusOp::BusRdX), None);
    assert_eq!(cache.stats, CoreStats::default());
}

#[test]
fn fill_is_found_by_probe() {
    let mut system = harness::system(1);
    let addr = 4096 + 64 * 5 + 12;
    let _ = system.read(0, addr);

    let cache = system.cache(0).unwrap();
    assert_eq!(
        cache.probe(LineAddr { set: 5, tag: 1 }),
        Some((0, MesiState::Exclusive))
    );
    assert_eq!(cache.set_lines(5)[0].last_access, 0);
    assert_eq!(cache.state_of(4096 + 64 * 5), MesiState::Exclusive);
    assert_eq!(cache.state_of(64 * 5), MesiState::Invalid);
    assert_eq!(cache.valid_lines(), 1);
}

#[test]
fn snoops_walk_modified_to_invalid() {
    let mut system = harness::system(1);
    let x = 0x4000;
    let _ = system.write(0, x);
    let mut cache = system.cache(0).unwrap().clone();
    assert_eq!(cache.state_of(x), MesiState::Modified);

    let reply = cache.snoop(x, BusOp::BusRd).unwrap();
    assert!(reply.flush);
    assert_eq!((reply.prev, reply.next), (MesiState::Modified, MesiState::Shared));
    assert_eq!(cache.state_of(x), MesiState::Shared);
    assert_eq!(cache.stats.snoop_responses, 1);
    assert_eq!(cache.stats.flushes, 1);
    assert_eq!(cache.stats.evictions, 0);

    // A Shared holder stays silent on a further BusRd.
    let reply = cache.snoop(x, BusOp::BusRd).unwrap();
    assert!(!reply.responded);
    assert_eq!(cache.stats.snoop_responses, 1);

    let reply = cache.snoop(x, BusOp::BusRdX).unwrap();
    assert!(reply.invalidated && !reply.flush);
    assert_eq!(reply.prev, MesiState::Shared);
    assert_eq!(cache.state_of(x), MesiState::Invalid);
    assert_eq!(cache.stats.snoop_responses, 2);
    assert_eq!(cache.stats.evictions, 1);

    assert_eq!(cache.snoop(x, BusOp::BusRdX), None);
    // Snooping never moves the owner's clock by itself.
    assert_eq!(cache.op_count(), 10);
}

#[test]
fn ways_fill_in_order_then_lru() {
    let mut system = harness::small_system(1, 1, 4);
    for tag in 0..4 {
        let addr = harness::block(&system, 0, tag);
        let _ = system.read(0, addr);
    }

    let cache = system.cache(0).unwrap();
    let tags: Vec<u64> = cache.set_lines(0).iter().map(|l| l.tag).collect();
    let stamps: Vec<u64> = cache.set_lines(0).iter().map(|l| l.last_access).collect();
    assert_eq!(tags, [0, 1, 2, 3]);
    assert_eq!(stamps, [0, 10, 20, 30]);
    assert_eq!(cache.free_way(0), None);
    assert_eq!(cache.victim_way(0), 0);
}
