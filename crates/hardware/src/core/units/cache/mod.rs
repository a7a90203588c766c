//! Private, coherent, set-associative L1 data cache.
//!
//! This module implements the per-core storage structure of the simulator.
//! It provides:
//! 1. **Storage:** A flat `num_sets * ways` array of [`CacheLine`]s, sized once
//!    from the configured geometry and never resized.
//! 2. **Lookup:** Hit detection, free-way search, and LRU victim selection.
//! 3. **Snooping:** The reaction of this cache to a peer's bus transaction.
//!
//! The cache only knows its own lines. Issuing bus transactions and advancing
//! time is the job of the coherence engine in [`crate::soc`].

/// Cache lines and MESI transitions.
pub mod line;

/// LRU victim selection.
pub mod lru;

pub use line::{CacheLine, MesiState, SnoopReply};

use crate::common::addr::{AddressLayout, LineAddr};
use crate::common::data::BusOp;
use crate::config::CacheGeometry;
use crate::stats::CoreStats;

/// One core's L1 data cache plus its counters.
#[derive(Clone, Debug)]
pub struct CoherentCache {
    /// Per-core counters, including the logical op count.
    pub stats: CoreStats,
    lines: Vec<CacheLine>,
    geometry: CacheGeometry,
}

impl CoherentCache {
    /// Creates a cold cache (every line Invalid) with the given geometry.
    ///
    /// # Arguments
    ///
    /// * `geometry` - Validated set/way geometry.
    ///
    /// # Returns
    ///
    /// A new `CoherentCache` with all counters at zero.
    pub fn new(geometry: CacheGeometry) -> Self {
        Self {
            stats: CoreStats::default(),
            lines: vec![CacheLine::default(); geometry.num_lines()],
            geometry,
        }
    }

    /// Returns the geometry this cache was built with.
    #[inline]
    pub const fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// Returns the address split used by this cache.
    #[inline]
    pub const fn layout(&self) -> &AddressLayout {
        &self.geometry.layout
    }

    /// Returns the logical op count (this core's notion of time).
    #[inline]
    pub const fn op_count(&self) -> u64 {
        self.stats.op_count
    }

    /// Advances the logical op count by `ticks`.
    #[inline]
    pub const fn advance(&mut self, ticks: u64) {
        self.stats.op_count += ticks;
    }

    #[inline]
    const fn slot(&self, set: usize, way: usize) -> usize {
        set * self.geometry.ways + way
    }

    /// Returns the ways of `set`, in way order.
    ///
    /// # Panics
    ///
    /// Panics if `set` is not below the configured number of sets.
    pub fn set_lines(&self, set: usize) -> &[CacheLine] {
        let base = self.slot(set, 0);
        &self.lines[base..base + self.geometry.ways]
    }

    /// Iterates over every set, in set order.
    pub fn sets(&self) -> impl Iterator<Item = &[CacheLine]> {
        self.lines.chunks(self.geometry.ways)
    }

    /// Finds the way holding `line` in a non-Invalid state.
    ///
    /// # Returns
    ///
    /// The way index and current state, or `None` on a miss.
    pub fn probe(&self, line: LineAddr) -> Option<(usize, MesiState)> {
        self.set_lines(line.set)
            .iter()
            .position(|l| l.holds(line.tag))
            .map(|way| (way, self.lines[self.slot(line.set, way)].state))
    }

    /// Returns the state of the block containing `addr` (Invalid if absent).
    pub fn state_of(&self, addr: u64) -> MesiState {
        self.probe(self.layout().split(addr))
            .map_or(MesiState::Invalid, |(_, state)| state)
    }

    /// Returns the first Invalid way of `set`, if any.
    pub fn free_way(&self, set: usize) -> Option<usize> {
        self.set_lines(set).iter().position(|l| !l.state.is_valid())
    }

    /// Returns the LRU way of `set`.
    pub fn victim_way(&self, set: usize) -> usize {
        lru::select_victim(self.set_lines(set))
    }

    /// Evicts the line in (`set`, `way`) and charges one eviction.
    ///
    /// # Returns
    ///
    /// The line as it was before eviction.
    pub(crate) fn evict(&mut self, set: usize, way: usize) -> CacheLine {
        let idx = self.slot(set, way);
        let victim = self.lines[idx];
        self.lines[idx].state = MesiState::Invalid;
        self.stats.evictions += 1;
        victim
    }

    /// Installs `line` into `way` of its set with the given state and stamp.
    pub(crate) fn install(&mut self, line: LineAddr, way: usize, state: MesiState, now: u64) {
        let idx = self.slot(line.set, way);
        self.lines[idx] = CacheLine::new(line.tag, state, now);
    }

    /// Refreshes the stamp of (`set`, `way`) and moves it to `state`.
    pub(crate) fn touch(&mut self, set: usize, way: usize, state: MesiState, now: u64) {
        let idx = self.slot(set, way);
        self.lines[idx].state = state;
        self.lines[idx].last_access = now;
    }

    /// Applies a peer's bus transaction to this cache.
    ///
    /// Looks up the block containing `addr`; if this cache holds it in a
    /// non-Invalid state the MESI snoop transition is applied and the
    /// response, eviction, and flush counters are charged.
    ///
    /// # Returns
    ///
    /// The reply, or `None` if this cache does not take part (block absent,
    /// or `op` is a Flush).
    pub fn snoop(&mut self, addr: u64, op: BusOp) -> Option<SnoopReply> {
        let line = self.layout().split(addr);
        let (way, state) = self.probe(line)?;
        let reply = state.on_snoop(op)?;

        let idx = self.slot(line.set, way);
        self.lines[idx].state = reply.next;
        if reply.responded {
            self.stats.snoop_responses += 1;
        }
        if reply.invalidated {
            self.stats.evictions += 1;
        }
        if reply.flush {
            self.stats.flushes += 1;
        }
        Some(reply)
    }

    /// Number of non-Invalid lines.
    pub fn valid_lines(&self) -> usize {
        self.lines.iter().filter(|l| l.state.is_valid()).count()
    }

    /// Finds a set that holds the same tag in two non-Invalid ways.
    ///
    /// A correct cache never has one; used by invariant checks.
    pub fn duplicate_tag(&self) -> Option<LineAddr> {
        self.sets().enumerate().find_map(|(set, ways)| {
            ways.iter().enumerate().find_map(|(way, line)| {
                let dup = line.state.is_valid()
                    && ways[way + 1..].iter().any(|other| other.holds(line.tag));
                dup.then_some(LineAddr { set, tag: line.tag })
            })
        })
    }
}
