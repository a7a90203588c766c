//! Least Recently Used (LRU) victim selection.
//!
//! Each line carries the owning core's op count at its last touch, so the
//! least recently used line of a full set is simply the one with the smallest
//! stamp. Equal stamps resolve to the lowest way index, which makes the choice
//! deterministic for a given access history.
//!
//! # Performance
//!
//! - `select_victim()`: O(W) where W is the associativity.
//! - No per-set bookkeeping beyond the stamp already stored in each line.

use super::line::CacheLine;

/// Returns the way index to evict from a full set.
///
/// # Arguments
///
/// * `ways` - All lines of one set, in way order.
///
/// # Returns
///
/// The index of the line with the strictly smallest `last_access`, the first
/// such index on ties, or `0` for an empty slice.
pub fn select_victim(ways: &[CacheLine]) -> usize {
    ways.iter()
        .enumerate()
        .min_by_key(|(_, line)| line.last_access)
        .map_or(0, |(way, _)| way)
}
