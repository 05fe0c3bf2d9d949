//! Address Decomposition.
//!
//! Physical byte addresses are sliced into three fields for cache lookup:
//!
//! ```text
//!  63            5+I  5+I-1        5  4     2  1  0
//! +----------------+----------------+--------+-----+
//! |      tag       |   set index    | offset | --- |
//! +----------------+----------------+--------+-----+
//! ```
//!
//! where `I` is the configured number of index bits. The two lowest bits are
//! ignored: every access is a whole 32-bit word.

use super::constants::{LINE_BYTES, LINE_SHIFT, LINE_WORDS};

/// The fields of a physical address as seen by a set-associative cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddrFields {
    /// Address bits above the set index.
    pub tag: u64,
    /// Index of the set within the cache.
    pub set: usize,
    /// Word offset within the line.
    pub offset: usize,
}

impl AddrFields {
    /// Splits `addr` for a cache with `2^index_bits` sets.
    #[inline]
    pub fn split(addr: u64, index_bits: u32) -> Self {
        let set_mask = (1u64 << index_bits) - 1;
        Self {
            tag: addr >> (LINE_SHIFT + index_bits),
            set: ((addr >> LINE_SHIFT) & set_mask) as usize,
            offset: ((addr >> 2) as usize) & (LINE_WORDS - 1),
        }
    }

    /// Rebuilds the base address of the line identified by `tag` and `set`.
    #[inline]
    pub fn join(tag: u64, set: usize, index_bits: u32) -> u64 {
        (tag << (LINE_SHIFT + index_bits)) | ((set as u64) << LINE_SHIFT)
    }
}

/// Rounds `addr` down to the start of its cache line.
#[inline]
pub fn line_base(addr: u64) -> u64 {
    addr & !(LINE_BYTES - 1)
}
