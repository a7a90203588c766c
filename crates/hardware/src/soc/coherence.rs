//! MESI coherence engine: local reads and writes.
//!
//! This module implements what a core does when its thread touches memory:
//! 1. **Hit path:** Refresh the line's stamp; a write to a Shared line first
//!    upgrades it with a BusRdX.
//! 2. **Miss path:** Pick a free way or the LRU victim, issue BusRd/BusRdX on
//!    the bus, and install the block in its new state.
//! 3. **Timing:** Advance the core's op count by the hit latency or the miss
//!    penalty. Lines are stamped with the count *before* the advance.

use tracing::{debug, trace};

use crate::common::addr::LineAddr;
use crate::common::data::{AccessType, BusOp};
use crate::core::CoreId;
use crate::core::units::cache::MesiState;
use crate::soc::System;

/// How an access was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessKind {
    /// The block was present.
    Hit,
    /// The block was absent and filled an Invalid way.
    Fill,
    /// The block was absent and replaced the LRU line of a full set.
    Eviction,
}

impl AccessKind {
    /// Returns `true` for [`AccessKind::Hit`].
    pub const fn is_hit(self) -> bool {
        match self {
            Self::Hit => true,
            Self::Fill | Self::Eviction => false,
        }
    }
}

/// Result of one local access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessOutcome {
    /// Hit, fill or eviction.
    pub kind: AccessKind,
    /// Way now holding the block.
    pub way: usize,
    /// State of the block after the access.
    pub state: MesiState,
}

impl System {
    /// Performs `access` for `core` at `addr`.
    ///
    /// # Panics
    ///
    /// Panics if `core` is not below [`System::num_cores`].
    pub fn access(&mut self, core: CoreId, access: AccessType, addr: u64) -> AccessOutcome {
        match access {
            AccessType::Read => self.read(core, addr),
            AccessType::Write => self.write(core, addr),
        }
    }

    /// Services a read of `addr` by `core`.
    ///
    /// A hit leaves the state unchanged and produces no bus traffic. A miss
    /// issues a BusRd and installs the block Shared if any peer held it,
    /// Exclusive otherwise.
    ///
    /// # Panics
    ///
    /// Panics if `core` is not below [`System::num_cores`].
    pub fn read(&mut self, core: CoreId, addr: u64) -> AccessOutcome {
        let hit_latency = self.hit_latency;
        let cache = &mut self.caches[core];
        let line = cache.layout().split(addr);
        let now = cache.op_count();
        cache.stats.memory_reads += 1;

        if let Some((way, state)) = cache.probe(line) {
            debug_assert!(state.on_processor_read().is_none());
            cache.touch(line.set, way, state, now);
            cache.stats.read_hits += 1;
            cache.advance(hit_latency);
            trace!(core, addr, state = %state.letter(), "read hit");
            return AccessOutcome {
                kind: AccessKind::Hit,
                way,
                state,
            };
        }

        cache.stats.read_misses += 1;
        let (way, kind) = self.make_room(core, line);
        let peer_held = self
            .interconnect
            .broadcast(&mut self.caches, core, addr, BusOp::BusRd);
        let state = MesiState::after_bus_read(peer_held);
        self.fill(core, line, way, state, now);
        trace!(core, addr, ?kind, state = %state.letter(), "read miss");
        AccessOutcome { kind, way, state }
    }

    /// Services a write of `addr` by `core`.
    ///
    /// The block always ends Modified. A write to a Shared line, and every
    /// write miss, issues a BusRdX that invalidates all peer copies.
    ///
    /// # Panics
    ///
    /// Panics if `core` is not below [`System::num_cores`].
    pub fn write(&mut self, core: CoreId, addr: u64) -> AccessOutcome {
        let hit_latency = self.hit_latency;
        let cache = &mut self.caches[core];
        let line = cache.layout().split(addr);
        let now = cache.op_count();
        cache.stats.memory_writes += 1;

        if let Some((way, state)) = cache.probe(line) {
            let (next, op) = state.on_processor_write();
            cache.touch(line.set, way, next, now);
            cache.stats.write_hits += 1;
            cache.advance(hit_latency);
            if let Some(op) = op {
                cache.stats.upgrades += 1;
                let _ = self.interconnect.broadcast(&mut self.caches, core, addr, op);
            }
            trace!(core, addr, from = %state.letter(), "write hit");
            return AccessOutcome {
                kind: AccessKind::Hit,
                way,
                state: next,
            };
        }

        cache.stats.write_misses += 1;
        let (way, kind) = self.make_room(core, line);
        let (state, op) = MesiState::Invalid.on_processor_write();
        if let Some(op) = op {
            let _ = self.interconnect.broadcast(&mut self.caches, core, addr, op);
        }
        self.fill(core, line, way, state, now);
        trace!(core, addr, ?kind, "write miss");
        AccessOutcome { kind, way, state }
    }

    /// Chooses the way a missing block will occupy in `core`'s cache.
    ///
    /// Prefers the first Invalid way; otherwise evicts the LRU line (charged
    /// as one eviction whatever its state). A Modified victim is written back
    /// with a Flush when `writeback_dirty_victims` is enabled.
    fn make_room(&mut self, core: CoreId, line: LineAddr) -> (usize, AccessKind) {
        let cache = &mut self.caches[core];
        if let Some(way) = cache.free_way(line.set) {
            return (way, AccessKind::Fill);
        }

        let way = cache.victim_way(line.set);
        let victim = cache.evict(line.set, way);
        let victim_addr = cache.layout().block_base(LineAddr {
            set: line.set,
            tag: victim.tag,
        });
        debug!(
            core,
            set = line.set,
            way,
            victim = victim_addr,
            state = %victim.state.letter(),
            "evict"
        );
        if self.writeback_dirty_victims && victim.state.is_dirty() {
            cache.stats.flushes += 1;
            let _ = self
                .interconnect
                .broadcast(&mut self.caches, core, victim_addr, BusOp::Flush);
            debug!(core, victim = victim_addr, "flush dirty victim");
        }
        (way, AccessKind::Eviction)
    }

    /// Installs a filled block and charges the miss penalty.
    fn fill(&mut self, core: CoreId, line: LineAddr, way: usize, state: MesiState, now: u64) {
        let miss_penalty = self.miss_penalty;
        let cache = &mut self.caches[core];
        cache.install(line, way, state, now);
        cache.advance(miss_penalty);
    }
}
