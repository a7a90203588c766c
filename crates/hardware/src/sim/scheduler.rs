//! Round-robin interleaving of thread traces across cores.
//!
//! Each core owns a run queue of thread ids taken from the schedule. One
//! round visits the cores in index order; a core with work takes the thread
//! at the *back* of its queue, executes at most one pending read and then at
//! most one pending write of it, and retires the thread once both of its
//! sequences are empty.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::common::error::{ConfigError, ScheduleError, SimError};
use crate::config::ScheduleConfig;
use crate::core::CoreId;
use crate::sim::workload::{ThreadId, Workload};
use crate::soc::System;

/// Per-core run queues plus a round counter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scheduler {
    queues: Vec<Vec<ThreadId>>,
    rounds: u64,
}

impl Scheduler {
    /// Builds run queues from the schedule after checking it against the workload.
    ///
    /// # Arguments
    ///
    /// * `schedule` - Static thread-to-core assignment.
    /// * `num_cores` - Cores in the system.
    /// * `workload` - Loaded thread traces.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::CoreOutOfRange`] if a core index is `>= num_cores`.
    /// * [`ScheduleError::UnknownThread`] if an assigned thread has no trace.
    /// * [`ScheduleError::DuplicateAssignment`] if a thread appears twice.
    pub fn new(
        schedule: &ScheduleConfig,
        num_cores: usize,
        workload: &Workload,
    ) -> Result<Self, SimError> {
        let mut queues = vec![Vec::new(); num_cores];
        let mut owner: HashMap<ThreadId, CoreId> = HashMap::new();

        for (&core, threads) in &schedule.cores {
            if core >= num_cores {
                return Err(ConfigError::CoreOutOfRange { core, num_cores }.into());
            }
            for &thread in threads {
                if !workload.contains(thread) {
                    return Err(ScheduleError::UnknownThread { core, thread }.into());
                }
                if let Some(&first) = owner.get(&thread) {
                    return Err(ScheduleError::DuplicateAssignment {
                        thread,
                        first,
                        second: core,
                    }
                    .into());
                }
                let _ = owner.insert(thread, core);
            }
            queues[core].clone_from(threads);
        }

        Ok(Self { queues, rounds: 0 })
    }

    /// Threads still queued on `core`, front first; the last one runs next.
    pub fn run_queue(&self, core: CoreId) -> &[ThreadId] {
        self.queues.get(core).map(Vec::as_slice).unwrap_or_default()
    }

    /// Iterates over every thread still queued on any core.
    pub fn queued_threads(&self) -> impl Iterator<Item = ThreadId> + '_ {
        self.queues.iter().flatten().copied()
    }

    /// Rounds executed so far.
    pub const fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Returns `true` once every run queue is empty.
    pub fn is_drained(&self) -> bool {
        self.queues.iter().all(Vec::is_empty)
    }

    /// Executes one round.
    ///
    /// # Returns
    ///
    /// `Ok(false)` without doing anything if every queue was already empty,
    /// `Ok(true)` after executing a round.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::UnknownThread`] if a queued thread has disappeared
    /// from `workload` since the scheduler was built. Every core's next thread
    /// is looked up before any access, so a failed round leaves `system`
    /// untouched.
    pub fn step(&mut self, system: &mut System, workload: &mut Workload) -> Result<bool, ScheduleError> {
        if self.is_drained() {
            return Ok(false);
        }

        for (core, queue) in self.queues.iter().enumerate() {
            match queue.last() {
                Some(&thread) if !workload.contains(thread) => {
                    return Err(ScheduleError::UnknownThread { core, thread });
                }
                _ => {}
            }
        }

        for (core, queue) in self.queues.iter_mut().enumerate() {
            let Some(&tid) = queue.last() else {
                continue;
            };
            let thread = workload
                .thread_mut(tid)
                .ok_or(ScheduleError::UnknownThread { core, thread: tid })?;

            if let Some(addr) = thread.next_read() {
                let _ = system.read(core, addr);
            }
            if let Some(addr) = thread.next_write() {
                let _ = system.write(core, addr);
            }
            if thread.is_exhausted() {
                let _ = queue.pop();
                debug!(core, thread = tid, round = self.rounds, "thread retired");
            }
        }

        self.rounds += 1;
        trace!(round = self.rounds, "round complete");
        Ok(true)
    }
}
