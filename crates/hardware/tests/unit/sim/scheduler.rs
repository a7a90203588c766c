//! # Scheduler Tests
//!
//! Stack discipline on each core's run queue, one-read-then-one-write
//! rounds, core visiting order and assignment validation.

use mesisim_core::common::error::{ConfigError, ScheduleError, SimError};
use mesisim_core::config::ScheduleConfig;
use mesisim_core::core::units::cache::MesiState::{Modified, Shared};
use mesisim_core::sim::scheduler::Scheduler;
use pretty_assertions::assert_eq;

use crate::common::harness;

fn schedule(entries: &[(usize, &[u32])]) -> ScheduleConfig {
    entries
        .iter()
        .map(|&(core, threads)| (core, threads.to_vec()))
        .collect()
}

#[test]
fn last_thread_in_queue_runs_first() {
    let mut system = harness::system(1);
    let mut workload = harness::workload(&[(1, &[64], &[]), (2, &[128, 192], &[])]);
    let mut sched = Scheduler::new(&schedule(&[(0, &[1, 2])]), 1, &workload).unwrap();

    assert!(sched.step(&mut system, &mut workload).unwrap());
    assert_eq!(workload.thread(2).unwrap().pending_reads(), 1);
    assert_eq!(workload.thread(1).unwrap().pending_reads(), 1);
    assert_eq!(sched.run_queue(0), &[1, 2]);

    assert!(sched.step(&mut system, &mut workload).unwrap());
    assert_eq!(sched.run_queue(0), &[1]);

    assert!(sched.step(&mut system, &mut workload).unwrap());
    assert!(sched.run_queue(0).is_empty());
    assert!(sched.is_drained());
    assert!(workload.is_drained());
    assert_eq!(sched.rounds(), 3);
}

#[test]
fn one_read_then_one_write_per_round() {
    let mut system = harness::system(1);
    let mut workload = harness::workload(&[(5, &[0, 64], &[0])]);
    let mut sched = Scheduler::new(&schedule(&[(0, &[5])]), 1, &workload).unwrap();

    assert!(sched.step(&mut system, &mut workload).unwrap());
    let stats = system.cache(0).unwrap().stats;
    assert_eq!((stats.memory_reads, stats.memory_writes), (1, 1));
    assert_eq!(stats.read_misses, 1);
    assert_eq!(stats.write_hits, 1);
    assert_eq!(system.cache(0).unwrap().state_of(0), Modified);

    assert!(sched.step(&mut system, &mut workload).unwrap());
    assert!(sched.is_drained());
    assert_eq!(system.cache(0).unwrap().stats.memory_reads, 2);
}

#[test]
fn cores_are_visited_in_index_order() {
    let x = 0x2000;
    let mut system = harness::system(2);
    let mut workload = harness::workload(&[(1, &[], &[x]), (2, &[x], &[])]);
    let mut sched = Scheduler::new(&schedule(&[(0, &[1]), (1, &[2])]), 2, &workload).unwrap();

    assert!(sched.step(&mut system, &mut workload).unwrap());
    // Core 0's write lands before core 1's read in the same round.
    assert_eq!(harness::states(&system, x), [Shared, Shared]);
    assert_eq!(system.interconnect().stats().flushes, 1);
}

#[test]
fn rounds_follow_the_longest_queue() {
    let mut system = harness::system(2);
    let mut workload = harness::workload(&[(1, &[0, 64, 128], &[]), (2, &[], &[4096])]);
    let mut sched = Scheduler::new(&schedule(&[(0, &[1]), (1, &[2])]), 2, &workload).unwrap();

    while sched.step(&mut system, &mut workload).unwrap() {}
    assert_eq!(sched.rounds(), 3);
    assert!(!sched.step(&mut system, &mut workload).unwrap());
    assert_eq!(sched.rounds(), 3);
}

#[test]
fn empty_thread_retires_without_accesses() {
    let mut system = harness::system(1);
    let mut workload = harness::workload(&[(1, &[], &[])]);
    let mut sched = Scheduler::new(&schedule(&[(0, &[1])]), 1, &workload).unwrap();

    assert!(sched.step(&mut system, &mut workload).unwrap());
    assert!(sched.is_drained());
    assert_eq!(system.cache(0).unwrap().stats.accesses(), 0);
}

#[test]
fn unassigned_threads_stay_pending() {
    let mut system = harness::system(2);
    let mut workload = harness::workload(&[(1, &[0], &[]), (9, &[64], &[])]);
    let mut sched = Scheduler::new(&schedule(&[(1, &[1])]), 2, &workload).unwrap();

    while sched.step(&mut system, &mut workload).unwrap() {}
    assert!(workload.thread(1).unwrap().is_exhausted());
    assert_eq!(workload.thread(9).unwrap().pending_reads(), 1);
    assert_eq!(system.cache(0).unwrap().stats.accesses(), 0);
    assert_eq!(sched.queued_threads().count(), 0);
}

#[test]
fn unknown_thread_is_a_lookup_error() {
    let workload = harness::workload(&[(1, &[0], &[])]);
    let err = Scheduler::new(&schedule(&[(0, &[1]), (1, &[2])]), 2, &workload).unwrap_err();
    assert!(matches!(
        err,
        SimError::Schedule(ScheduleError::UnknownThread { core: 1, thread: 2 })
    ));
}

#[test]
fn thread_on_two_cores_is_rejected() {
    let workload = harness::workload(&[(1, &[0], &[]), (2, &[0], &[])]);
    let err = Scheduler::new(&schedule(&[(0, &[1, 2]), (3, &[2])]), 4, &workload).unwrap_err();
    assert!(matches!(
        err,
        SimError::Schedule(ScheduleError::DuplicateAssignment {
            thread: 2,
            first: 0,
            second: 3
        })
    ));
}

#[test]
fn core_beyond_system_is_a_config_error() {
    let workload = harness::workload(&[(1, &[0], &[])]);
    let err = Scheduler::new(&schedule(&[(2, &[1])]), 2, &workload).unwrap_err();
    assert!(matches!(
        err,
        SimError::Config(ConfigError::CoreOutOfRange {
            core: 2,
            num_cores: 2
        })
    ));
}

#[test]
fn vanished_thread_is_reported_by_step() {
    let mut system = harness::system(1);
    let workload = harness::workload(&[(1, &[0], &[])]);
    let mut sched = Scheduler::new(&schedule(&[(0, &[1])]), 1, &workload).unwrap();

    let mut other = harness::workload(&[(2, &[0], &[])]);
    assert_eq!(
        sched.step(&mut system, &mut other),
        Err(ScheduleError::UnknownThread { core: 0, thread: 1 })
    );
}

#[test]
fn failed_round_leaves_earlier_cores_untouched() {
    let mut system = harness::system(2);
    let workload = harness::workload(&[(1, &[0], &[64]), (2, &[128], &[])]);
    let mut sched = Scheduler::new(&schedule(&[(0, &[1]), (1, &[2])]), 2, &workload).unwrap();

    // Core 0's thread is still present; core 1's is gone.
    let mut other = harness::workload(&[(1, &[0], &[64])]);
    assert_eq!(
        sched.step(&mut system, &mut other),
        Err(ScheduleError::UnknownThread { core: 1, thread: 2 })
    );
    assert_eq!(system.cache(0).unwrap().stats.accesses(), 0);
    assert_eq!(system.interconnect().traffic(), 0);
    assert_eq!(other.thread(1).unwrap().pending_reads(), 1);
    assert_eq!(sched.rounds(), 0);
    assert_eq!(sched.run_queue(0), &[1]);
}
