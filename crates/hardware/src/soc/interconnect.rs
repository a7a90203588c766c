//! Shared snooping bus.
//!
//! This module implements the single bus that keeps the private caches coherent. It provides:
//! 1. **Broadcast:** Ordered, synchronous fan-out of a transaction to every peer cache.
//! 2. **Snoop side effects:** Peer state changes, write-back flushes, and peer op-count charges.
//! 3. **Traffic accounting:** One tick per transaction, with a per-operation breakdown.

use tracing::trace;

use crate::common::data::BusOp;
use crate::core::{CoherentCache, CoreId};
use crate::stats::InterconnectStats;

/// System bus connecting the private L1 data caches.
///
/// The bus owns no caches; they are lent to [`Interconnect::broadcast`] for the
/// duration of one transaction.
#[derive(Clone, Debug, Default)]
pub struct Interconnect {
    /// Op-count ticks charged to a peer that held the snooped block.
    pub snoop_latency: u64,
    stats: InterconnectStats,
}

impl Interconnect {
    /// Creates an idle bus.
    ///
    /// # Arguments
    ///
    /// * `snoop_latency` - Ticks added to a peer's op count when it held the block.
    pub fn new(snoop_latency: u64) -> Self {
        Self {
            snoop_latency,
            stats: InterconnectStats::default(),
        }
    }

    /// Returns the transaction counters.
    pub const fn stats(&self) -> &InterconnectStats {
        &self.stats
    }

    /// Total bus transactions so far.
    pub const fn traffic(&self) -> u64 {
        self.stats.traffic
    }

    /// Issues `op` for the block containing `addr` on behalf of `source`.
    ///
    /// Every other cache is snooped in core order. A peer holding the block
    /// applies its MESI snoop transition, is charged `snoop_latency` ticks,
    /// and, if it held the block Modified, issues a Flush that is recorded as
    /// its own transaction.
    ///
    /// # Arguments
    ///
    /// * `caches` - All caches of the system, indexed by core.
    /// * `source` - Core issuing the transaction; never snooped.
    /// * `addr` - Any byte address inside the block.
    /// * `op` - Transaction kind.
    ///
    /// # Returns
    ///
    /// `true` if at least one peer held the block in a non-Invalid state.
    /// Always `false` for [`BusOp::Flush`].
    pub fn broadcast(
        &mut self,
        caches: &mut [CoherentCache],
        source: CoreId,
        addr: u64,
        op: BusOp,
    ) -> bool {
        let mut shared = false;
        if op != BusOp::Flush {
            for (peer, cache) in caches.iter_mut().enumerate() {
                if peer == source {
                    continue;
                }
                let Some(reply) = cache.snoop(addr, op) else {
                    continue;
                };
                shared = true;
                cache.advance(self.snoop_latency);
                trace!(
                    core = peer,
                    addr,
                    %op,
                    from = %reply.prev.letter(),
                    to = %reply.next.letter(),
                    "snoop"
                );
                if reply.flush {
                    self.stats.record(BusOp::Flush);
                }
            }
        }
        self.stats.record(op);
        shared
    }
}
