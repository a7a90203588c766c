//! Static thread-to-core assignment planners.
//!
//! The simulator replays whatever schedule it is given; this module produces
//! one ahead of a run from the loaded traces. Each thread becomes a task with
//! an estimated compute time (its instruction count) and a data set (its read
//! and write addresses). Tasks are handed out longest first.
//!
//! 1. **Greedy:** Each task goes to the core that would finish it earliest,
//!    looking only at compute time.
//! 2. **DMDA:** Like greedy, but a core also pays a fixed fetch cost for every
//!    cache block of the task it does not already hold, so tasks that share
//!    data gravitate to the same core.
//! 3. **Reorder:** Optionally, each core's tasks are then reordered so the one
//!    needing the fewest blocks not yet touched on that core runs next.
//!
//! Ties always go to the lowest core index, then the lowest thread id.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, info};

use crate::common::error::ConfigError;
use crate::config::{Config, ScheduleConfig};
use crate::core::CoreId;
use crate::sim::workload::{ThreadId, ThreadTrace, Workload};

/// Names accepted when parsing an [`Algorithm`].
pub const ALGORITHMS: &[&str] = &["greedy", "dmda"];

/// Estimated cost of fetching one cache block that a core does not hold.
pub const DEFAULT_FETCH_COST: u64 = 400;

/// Assignment heuristic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Earliest finish time on compute alone.
    Greedy,
    /// Earliest finish time including block fetches (data-aware).
    Dmda,
}

impl Algorithm {
    /// Lower-case name, as accepted on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::Dmda => "dmda",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greedy" => Ok(Self::Greedy),
            "dmda" => Ok(Self::Dmda),
            _ => Err(ConfigError::System("algorithm must be one of: greedy, dmda")),
        }
    }
}

/// Parameters of a planning pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanOptions {
    /// Cores to spread the tasks over.
    pub num_cores: usize,
    /// Cache block size used to group addresses.
    pub line_bytes: u64,
    /// Cost of fetching one missing block (DMDA only).
    pub fetch_cost: u64,
    /// Reorder each core's tasks by data reuse after assignment.
    pub reorder: bool,
}

impl PlanOptions {
    /// Options for `num_cores` cores and `line_bytes` blocks with the default fetch cost.
    pub const fn new(num_cores: usize, line_bytes: u64) -> Self {
        Self {
            num_cores,
            line_bytes,
            fetch_cost: DEFAULT_FETCH_COST,
            reorder: false,
        }
    }

    /// Options matching the core count and L1-D line size of `config`.
    pub const fn from_config(config: &Config) -> Self {
        Self::new(config.system.num_cores, config.cache.l1_d.line_bytes as u64)
    }

    /// Block containing `addr`.
    const fn block_of(&self, addr: u64) -> u64 {
        addr - addr % self.line_bytes
    }

    const fn validate(&self) -> Result<(), ConfigError> {
        if self.num_cores == 0 {
            return Err(ConfigError::System("num_cores must be at least 1"));
        }
        if self.line_bytes == 0 {
            return Err(ConfigError::Geometry("line_bytes must be at least 1"));
        }
        Ok(())
    }
}

/// One thread as seen by the planners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    /// Thread id.
    pub id: ThreadId,
    /// Estimated compute time.
    pub compute_time: u64,
    /// Addresses touched, reads first.
    pub data: Vec<u64>,
}

impl Task {
    /// Builds a task from a (not yet consumed) thread trace.
    pub fn from_trace(trace: &ThreadTrace) -> Self {
        Self {
            id: trace.id,
            compute_time: trace.instruction_count,
            data: trace.reads().chain(trace.writes()).collect(),
        }
    }
}

/// Tasks of `workload`, longest compute time first, ties by thread id.
pub fn tasks(workload: &Workload) -> Vec<Task> {
    let mut tasks: Vec<Task> = workload.threads().map(Task::from_trace).collect();
    tasks.sort_by_key(|t| Reverse(t.compute_time));
    tasks
}

/// Result of a planning pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Plan {
    /// Threads per core in execution order; the first entry runs first.
    pub order: Vec<Vec<ThreadId>>,
    /// Estimated finish time of each core.
    pub finish_times: Vec<u64>,
}

impl Plan {
    fn idle(num_cores: usize) -> Self {
        Self {
            order: vec![Vec::new(); num_cores],
            finish_times: vec![0; num_cores],
        }
    }

    fn assign(&mut self, core: CoreId, thread: ThreadId, finish: u64) {
        self.order[core].push(thread);
        self.finish_times[core] = finish;
        debug!(core, thread, finish, "task assigned");
    }

    /// Latest estimated finish time over all cores.
    pub fn makespan(&self) -> u64 {
        self.finish_times.iter().copied().max().unwrap_or(0)
    }

    /// Converts the plan into run queues.
    ///
    /// Run queues are consumed from the back, so each core's list is written
    /// in reverse execution order. Idle cores are left out.
    pub fn to_schedule(&self) -> ScheduleConfig {
        self.order
            .iter()
            .enumerate()
            .filter(|(_, threads)| !threads.is_empty())
            .map(|(core, threads)| (core, threads.iter().rev().copied().collect()))
            .collect()
    }
}

/// Plans an assignment for every thread of `workload`.
///
/// # Errors
///
/// [`ConfigError`] if `options` names zero cores or a zero block size.
pub fn plan(
    algorithm: Algorithm,
    workload: &Workload,
    options: &PlanOptions,
) -> Result<Plan, ConfigError> {
    let plan = plan_tasks(algorithm, &tasks(workload), options)?;
    info!(
        %algorithm,
        cores = options.num_cores,
        threads = workload.len(),
        makespan = plan.makespan(),
        "schedule planned"
    );
    Ok(plan)
}

/// Plans an assignment for `tasks`, handed out in the given order.
///
/// # Errors
///
/// [`ConfigError`] if `options` names zero cores or a zero block size.
pub fn plan_tasks(
    algorithm: Algorithm,
    tasks: &[Task],
    options: &PlanOptions,
) -> Result<Plan, ConfigError> {
    options.validate()?;
    let mut plan = match algorithm {
        Algorithm::Greedy => greedy(tasks, options.num_cores),
        Algorithm::Dmda => dmda(tasks, options),
    };
    if options.reorder {
        let blocks: BTreeMap<ThreadId, BTreeSet<u64>> = tasks
            .iter()
            .map(|t| (t.id, t.data.iter().map(|&a| options.block_of(a)).collect()))
            .collect();
        for order in &mut plan.order {
            *order = reorder(order, &blocks);
        }
    }
    Ok(plan)
}

/// Core with the smallest `(finish, core)` pair.
fn earliest(finishes: impl Iterator<Item = u64>) -> Option<(CoreId, u64)> {
    finishes
        .enumerate()
        .min_by_key(|&(core, finish)| (finish, core))
}

fn greedy(tasks: &[Task], num_cores: usize) -> Plan {
    let mut plan = Plan::idle(num_cores);
    for task in tasks {
        let candidates = plan
            .finish_times
            .iter()
            .map(|&t| t.saturating_add(task.compute_time));
        let Some((core, finish)) = earliest(candidates) else {
            continue;
        };
        plan.assign(core, task.id, finish);
    }
    plan
}

fn dmda(tasks: &[Task], options: &PlanOptions) -> Plan {
    let mut plan = Plan::idle(options.num_cores);
    let mut resident: Vec<BTreeSet<u64>> = vec![BTreeSet::new(); options.num_cores];

    for task in tasks {
        let blocks: BTreeSet<u64> = task.data.iter().map(|&a| options.block_of(a)).collect();
        let candidates = plan.finish_times.iter().zip(&resident).map(|(&t, held)| {
            let missing = blocks.difference(held).count() as u64;
            t.saturating_add(task.compute_time)
                .saturating_add(missing.saturating_mul(options.fetch_cost))
        });
        let Some((core, finish)) = earliest(candidates) else {
            continue;
        };
        resident[core].extend(blocks);
        plan.assign(core, task.id, finish);
    }
    plan
}

/// Orders `threads` so that each next one needs the fewest blocks not yet
/// touched by the ones before it.
fn reorder(threads: &[ThreadId], blocks: &BTreeMap<ThreadId, BTreeSet<u64>>) -> Vec<ThreadId> {
    let empty = BTreeSet::new();
    let mut waiting: BTreeSet<ThreadId> = threads.iter().copied().collect();
    let mut local: BTreeSet<u64> = BTreeSet::new();
    let mut order = Vec::with_capacity(waiting.len());

    while let Some((_, next)) = waiting
        .iter()
        .map(|&t| {
            let needed = blocks.get(&t).unwrap_or(&empty);
            (needed.difference(&local).count(), t)
        })
        .min()
    {
        let _ = waiting.remove(&next);
        local.extend(blocks.get(&next).unwrap_or(&empty));
        order.push(next);
    }
    order
}
