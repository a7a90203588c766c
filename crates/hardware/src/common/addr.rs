//! Address decomposition.
//!
//! Every access address is split into three fields for a given cache geometry:
//! 1. **Block offset:** the low `log2(line_bytes)` bits, ignored by the caches.
//! 2. **Set index:** the next `log2(num_sets)` bits, selecting the set.
//! 3. **Tag:** the remaining upper bits of the 64-bit address.
//!
//! All cores share the same geometry, so a single [`AddressLayout`] is valid for
//! every cache in a [`System`](crate::soc::System).

/// Bit-level split of a 64-bit address for one cache geometry.
///
/// Both the line size and the set count must be powers of two; this is checked
/// when the layout is built from a validated
/// [`CacheGeometry`](crate::config::CacheGeometry).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressLayout {
    offset_bits: u32,
    index_bits: u32,
}

/// Set index and tag of an address under a particular [`AddressLayout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LineAddr {
    /// Set the block maps to.
    pub set: usize,
    /// Upper address bits identifying the block within its set.
    pub tag: u64,
}

impl AddressLayout {
    /// Creates a layout for the given line size and set count.
    ///
    /// # Arguments
    ///
    /// * `line_bytes` - Cache line size in bytes (power of two).
    /// * `num_sets` - Number of sets per cache (power of two).
    ///
    /// # Returns
    ///
    /// The layout, or `None` if either argument is zero or not a power of two.
    pub const fn new(line_bytes: usize, num_sets: usize) -> Option<Self> {
        if !line_bytes.is_power_of_two() || !num_sets.is_power_of_two() {
            return None;
        }
        Some(Self {
            offset_bits: line_bytes.trailing_zeros(),
            index_bits: num_sets.trailing_zeros(),
        })
    }

    /// Number of block-offset bits.
    #[inline]
    pub const fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Number of set-index bits.
    #[inline]
    pub const fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// Number of tag bits (whatever is left of the 64-bit address).
    #[inline]
    pub const fn tag_bits(&self) -> u32 {
        u64::BITS - self.index_bits - self.offset_bits
    }

    /// Returns the set index for `addr`.
    #[inline]
    pub const fn set_index(&self, addr: u64) -> usize {
        let mask = (1u64 << self.index_bits) - 1;
        ((addr >> self.offset_bits) & mask) as usize
    }

    /// Returns the tag for `addr`.
    #[inline]
    pub const fn tag(&self, addr: u64) -> u64 {
        let shift = self.offset_bits + self.index_bits;
        if shift >= u64::BITS { 0 } else { addr >> shift }
    }

    /// Splits `addr` into its set index and tag.
    #[inline]
    pub const fn split(&self, addr: u64) -> LineAddr {
        LineAddr {
            set: self.set_index(addr),
            tag: self.tag(addr),
        }
    }

    /// Rebuilds the base address of the block identified by `line`.
    ///
    /// The block offset bits of the result are zero. Used when a victim line has
    /// to be named on the bus (only its tag and set are stored).
    #[inline]
    pub const fn block_base(&self, line: LineAddr) -> u64 {
        let shift = self.offset_bits + self.index_bits;
        let tag = if shift >= u64::BITS { 0 } else { line.tag << shift };
        tag | ((line.set as u64) << self.offset_bits)
    }
}
