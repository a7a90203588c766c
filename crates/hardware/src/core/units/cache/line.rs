//! Cache lines and the MESI state machine.
//!
//! Every transition of the protocol lives here as a total function over
//! [`MesiState`]. The matches are deliberately exhaustive: adding a state or a
//! bus operation fails to compile until each transition has been decided.

use serde::Serialize;

use crate::common::data::BusOp;

/// The MESI state of a cache line.
///
/// <pre>
///   compatible peer states
///     M E S I
///   M ✗ ✗ ✗ ✓
///   E ✗ ✗ ✗ ✓
///   S ✗ ✗ ✓ ✓
///   I ✓ ✓ ✓ ✓
/// </pre>
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum MesiState {
    /// The slot holds nothing; its tag and timestamp are meaningless.
    #[default]
    Invalid,

    /// Clean, and possibly present in other caches.
    Shared,

    /// Clean, and present in no other cache.
    Exclusive,

    /// Dirty, and present in no other cache. Must be flushed before anyone
    /// else may read it.
    Modified,
}

/// How a cache line reacts to a peer's bus transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnoopReply {
    /// State of the line before the snoop.
    pub prev: MesiState,
    /// State of the line after the snoop.
    pub next: MesiState,
    /// Whether the snoop counts as a bus response from this cache.
    pub responded: bool,
    /// Whether the line was invalidated (charged as an eviction).
    pub invalidated: bool,
    /// Whether the holder must issue a Flush transaction.
    pub flush: bool,
}

impl MesiState {
    /// Returns `true` for Shared, Exclusive and Modified.
    #[inline]
    pub const fn is_valid(self) -> bool {
        match self {
            Self::Invalid => false,
            Self::Shared | Self::Exclusive | Self::Modified => true,
        }
    }

    /// Returns `true` if the line holds data newer than memory.
    #[inline]
    pub const fn is_dirty(self) -> bool {
        match self {
            Self::Modified => true,
            Self::Invalid | Self::Shared | Self::Exclusive => false,
        }
    }

    /// Bus transaction a local read needs from this state.
    ///
    /// `None` means the read hits and the state is unchanged.
    pub const fn on_processor_read(self) -> Option<BusOp> {
        match self {
            Self::Invalid => Some(BusOp::BusRd),
            Self::Shared | Self::Exclusive | Self::Modified => None,
        }
    }

    /// State installed by a read fill, given whether any peer held the block.
    pub const fn after_bus_read(peer_held: bool) -> Self {
        if peer_held {
            Self::Shared
        } else {
            Self::Exclusive
        }
    }

    /// Next state and bus transaction for a local write from this state.
    pub const fn on_processor_write(self) -> (Self, Option<BusOp>) {
        match self {
            Self::Invalid | Self::Shared => (Self::Modified, Some(BusOp::BusRdX)),
            Self::Exclusive | Self::Modified => (Self::Modified, None),
        }
    }

    /// Reaction of a line in this state to a peer's transaction on its block.
    ///
    /// Returns `None` when the line takes no part in the transaction: it is
    /// Invalid, or the transaction is a Flush.
    pub const fn on_snoop(self, op: BusOp) -> Option<SnoopReply> {
        match (self, op) {
            (Self::Invalid, BusOp::BusRd | BusOp::BusRdX | BusOp::Flush)
            | (Self::Shared | Self::Exclusive | Self::Modified, BusOp::Flush) => None,
            (Self::Shared, BusOp::BusRd) => Some(SnoopReply {
                prev: self,
                next: Self::Shared,
                responded: false,
                invalidated: false,
                flush: false,
            }),
            (Self::Exclusive, BusOp::BusRd) => Some(SnoopReply {
                prev: self,
                next: Self::Shared,
                responded: true,
                invalidated: false,
                flush: false,
            }),
            (Self::Modified, BusOp::BusRd) => Some(SnoopReply {
                prev: self,
                next: Self::Shared,
                responded: true,
                invalidated: false,
                flush: true,
            }),
            (Self::Shared | Self::Exclusive, BusOp::BusRdX) => Some(SnoopReply {
                prev: self,
                next: Self::Invalid,
                responded: true,
                invalidated: true,
                flush: false,
            }),
            (Self::Modified, BusOp::BusRdX) => Some(SnoopReply {
                prev: self,
                next: Self::Invalid,
                responded: true,
                invalidated: true,
                flush: true,
            }),
        }
    }

    /// Single-letter name used in logs and reports.
    pub const fn letter(self) -> char {
        match self {
            Self::Invalid => 'I',
            Self::Shared => 'S',
            Self::Exclusive => 'E',
            Self::Modified => 'M',
        }
    }
}

/// One way of one set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheLine {
    /// Upper address bits of the block held in this slot.
    pub tag: u64,
    /// Coherence state.
    pub state: MesiState,
    /// Owner's op count at the last touch; the LRU key.
    pub last_access: u64,
}

impl CacheLine {
    /// Creates a line with the given contents.
    pub const fn new(tag: u64, state: MesiState, last_access: u64) -> Self {
        Self {
            tag,
            state,
            last_access,
        }
    }

    /// Returns `true` if this slot holds `tag` in a non-Invalid state.
    #[inline]
    pub const fn holds(&self, tag: u64) -> bool {
        self.state.is_valid() && self.tag == tag
    }
}
