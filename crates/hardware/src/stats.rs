//! Simulation statistics collection and reporting.
//!
//! This module tracks the counters of a coherence run. It provides:
//! 1. **Per-core counters:** Reads, writes, hits/misses, evictions, snoop
//!    responses, flushes and the logical op count.
//! 2. **Interconnect counters:** Total bus traffic and its per-operation breakdown.
//! 3. **Reporting:** A sectioned text report and a serde-serializable snapshot.

use std::fmt::{self, Write};

use serde::Serialize;

use crate::common::data::BusOp;

/// Counters kept by one core's L1 data cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CoreStats {
    /// Local reads serviced.
    pub memory_reads: u64,
    /// Local writes serviced.
    pub memory_writes: u64,
    /// Logical op count; this core's notion of time.
    pub op_count: u64,
    /// Lines evicted locally or invalidated by a peer.
    pub evictions: u64,
    /// Snoops this core answered.
    pub snoop_responses: u64,
    /// Reads that found the block.
    pub read_hits: u64,
    /// Reads that filled a line.
    pub read_misses: u64,
    /// Writes that found the block (including upgrades).
    pub write_hits: u64,
    /// Writes that filled a line.
    pub write_misses: u64,
    /// Write hits on a Shared line.
    pub upgrades: u64,
    /// Flush transactions this core issued.
    pub flushes: u64,
}

impl CoreStats {
    /// Read plus write hits.
    pub const fn hits(&self) -> u64 {
        self.read_hits + self.write_hits
    }

    /// Read plus write misses.
    pub const fn misses(&self) -> u64 {
        self.read_misses + self.write_misses
    }

    /// Total local accesses.
    pub const fn accesses(&self) -> u64 {
        self.memory_reads + self.memory_writes
    }

    /// Misses as a percentage of accesses (0 when idle).
    pub fn miss_rate(&self) -> f64 {
        let total = self.accesses();
        if total == 0 {
            0.0
        } else {
            100.0 * self.misses() as f64 / total as f64
        }
    }
}

/// Counters kept by the shared bus.
///
/// `traffic` always equals the sum of the three per-operation counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct InterconnectStats {
    /// Bus transactions of any kind.
    pub traffic: u64,
    /// BusRd transactions.
    pub bus_reads: u64,
    /// BusRdX transactions.
    pub bus_read_exclusives: u64,
    /// Flush transactions.
    pub flushes: u64,
}

impl InterconnectStats {
    /// Records one transaction of kind `op`.
    pub const fn record(&mut self, op: BusOp) {
        self.traffic += 1;
        match op {
            BusOp::BusRd => self.bus_reads += 1,
            BusOp::BusRdX => self.bus_read_exclusives += 1,
            BusOp::Flush => self.flushes += 1,
        }
    }

    /// Sum of the per-operation counters.
    pub const fn breakdown_total(&self) -> u64 {
        self.bus_reads + self.bus_read_exclusives + self.flushes
    }
}

/// Snapshot of a whole run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SimStats {
    /// One entry per core, in core order.
    pub cores: Vec<CoreStats>,
    /// Bus counters.
    pub interconnect: InterconnectStats,
    /// Scheduler rounds executed.
    pub rounds: u64,
    /// Threads in the workload.
    pub threads: usize,
    /// Sum of the instruction counts of all loaded threads.
    pub instructions: u64,
    /// Wall-clock time spent simulating. Only shown in the text report, so
    /// the JSON snapshot of a run is reproducible.
    #[serde(skip)]
    pub host_seconds: f64,
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"interconnect"`, `"cores"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "interconnect", "cores"];

const RULE: &str = "==========================================================";
const THIN_RULE: &str = "----------------------------------------------------------";

impl SimStats {
    /// Accesses summed over all cores.
    pub fn total_accesses(&self) -> u64 {
        self.cores.iter().map(CoreStats::accesses).sum()
    }

    /// Evictions summed over all cores.
    pub fn total_evictions(&self) -> u64 {
        self.cores.iter().map(|c| c.evictions).sum()
    }

    /// Largest final op count across cores (the makespan in logical ticks).
    pub fn max_op_count(&self) -> u64 {
        self.cores.iter().map(|c| c.op_count).max().unwrap_or(0)
    }

    /// Writes the requested sections to `out`.
    ///
    /// Unknown names are ignored; an empty `sections` writes everything.
    pub fn write_sections(&self, out: &mut impl Write, sections: &[String]) -> fmt::Result {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);

        writeln!(out, "{RULE}")?;
        writeln!(out, "MESI COHERENCE SIMULATION STATISTICS")?;
        writeln!(out, "{RULE}")?;

        if want("summary") {
            writeln!(out, "host_seconds             {:.4} s", self.host_seconds)?;
            writeln!(out, "sim_cores                {}", self.cores.len())?;
            writeln!(out, "sim_rounds               {}", self.rounds)?;
            writeln!(out, "sim_threads              {}", self.threads)?;
            writeln!(out, "sim_insts                {}", self.instructions)?;
            writeln!(out, "sim_accesses             {}", self.total_accesses())?;
            writeln!(out, "sim_evictions            {}", self.total_evictions())?;
            writeln!(out, "sim_max_op_count         {}", self.max_op_count())?;
            writeln!(out, "{THIN_RULE}")?;
        }
        if want("interconnect") {
            let ic = &self.interconnect;
            let share = |n: u64| {
                if ic.traffic == 0 {
                    0.0
                } else {
                    100.0 * n as f64 / ic.traffic as f64
                }
            };
            writeln!(out, "INTERCONNECT")?;
            writeln!(out, "  bus.traffic            {}", ic.traffic)?;
            writeln!(
                out,
                "  bus.BusRd              {} ({:.2}%)",
                ic.bus_reads,
                share(ic.bus_reads)
            )?;
            writeln!(
                out,
                "  bus.BusRdX             {} ({:.2}%)",
                ic.bus_read_exclusives,
                share(ic.bus_read_exclusives)
            )?;
            writeln!(
                out,
                "  bus.Flush              {} ({:.2}%)",
                ic.flushes,
                share(ic.flushes)
            )?;
            writeln!(out, "{THIN_RULE}")?;
        }
        if want("cores") {
            writeln!(out, "CORES")?;
            for (id, core) in self.cores.iter().enumerate() {
                writeln!(
                    out,
                    "  core{id:<2} reads: {:<8} writes: {:<8} ops: {:<10} evictions: {:<8} snoop_responses: {}",
                    core.memory_reads,
                    core.memory_writes,
                    core.op_count,
                    core.evictions,
                    core.snoop_responses
                )?;
                writeln!(
                    out,
                    "         hits: {:<8} misses: {:<8} upgrades: {:<6} flushes: {:<8} miss_rate: {:.2}%",
                    core.hits(),
                    core.misses(),
                    core.upgrades,
                    core.flushes,
                    core.miss_rate()
                )?;
            }
        }
        writeln!(out, "{RULE}")
    }

    /// Renders the requested sections into a `String`.
    pub fn render_sections(&self, sections: &[String]) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_sections(&mut out, sections);
        out
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]. Pass an
    /// empty slice to print all sections (same as `print()`).
    pub fn print_sections(&self, sections: &[String]) {
        print!("{}", self.render_sections(sections));
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
