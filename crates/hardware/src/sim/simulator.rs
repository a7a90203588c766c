//! Simulator: owns the system, the workload and the scheduler side-by-side.
//!
//! Keeping the three as sibling fields lets a round borrow the caches and the
//! thread traces mutably at the same time without any shared ownership.

use std::collections::BTreeSet;
use std::time::Instant;

use tracing::{info, info_span, warn};

use crate::common::error::SimError;
use crate::config::Config;
use crate::sim::scheduler::Scheduler;
use crate::sim::workload::{ThreadId, Workload};
use crate::soc::System;
use crate::stats::SimStats;

/// Top-level simulator: coherent memory system + thread traces + scheduler.
#[derive(Debug)]
pub struct Simulator {
    system: System,
    workload: Workload,
    scheduler: Scheduler,
    host_seconds: f64,
}

impl Simulator {
    /// Builds a simulator for `workload` under `config`.
    ///
    /// Every check that can fail happens here, before the first access: the
    /// configuration is validated and the schedule is matched against the
    /// workload. Loaded threads that no core runs are reported with a warning
    /// and stay pending.
    pub fn new(config: &Config, workload: Workload) -> Result<Self, SimError> {
        config.validate()?;
        let system = System::new(config)?;
        let scheduler = Scheduler::new(&config.schedule, system.num_cores(), &workload)?;

        let assigned: BTreeSet<ThreadId> = scheduler.queued_threads().collect();
        let unassigned: Vec<ThreadId> = workload
            .threads()
            .map(|t| t.id)
            .filter(|id| !assigned.contains(id))
            .collect();
        if !unassigned.is_empty() {
            warn!(
                count = unassigned.len(),
                threads = ?unassigned,
                "threads are not assigned to any core and will not run"
            );
        }

        Ok(Self {
            system,
            workload,
            scheduler,
            host_seconds: 0.0,
        })
    }

    /// Executes one scheduler round.
    ///
    /// # Returns
    ///
    /// `false` once there is nothing left to run.
    pub fn step(&mut self) -> Result<bool, SimError> {
        Ok(self.scheduler.step(&mut self.system, &mut self.workload)?)
    }

    /// Runs every round until all run queues are empty.
    ///
    /// # Returns
    ///
    /// Statistics of the finished run.
    pub fn run(&mut self) -> Result<SimStats, SimError> {
        let span = info_span!("run", cores = self.system.num_cores(), threads = self.workload.len());
        let _enter = span.enter();
        info!(operations = self.workload.total_operations(), "simulation started");

        let start = Instant::now();
        while self.step()? {}
        self.host_seconds += start.elapsed().as_secs_f64();

        info!(
            rounds = self.scheduler.rounds(),
            traffic = self.system.interconnect().traffic(),
            "simulation finished"
        );
        Ok(self.stats())
    }

    /// Snapshot of the counters so far.
    pub fn stats(&self) -> SimStats {
        SimStats {
            cores: self.system.core_stats(),
            interconnect: *self.system.interconnect_stats(),
            rounds: self.scheduler.rounds(),
            threads: self.workload.len(),
            instructions: self.workload.total_instructions(),
            host_seconds: self.host_seconds,
        }
    }

    /// The coherent memory system.
    pub const fn system(&self) -> &System {
        &self.system
    }

    /// The thread traces, partially consumed while the run is in progress.
    pub const fn workload(&self) -> &Workload {
        &self.workload
    }

    /// The scheduler.
    pub const fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Returns `true` once every run queue is empty.
    pub fn is_finished(&self) -> bool {
        self.scheduler.is_drained()
    }
}
