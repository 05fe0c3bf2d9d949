//! Line Payload.
//!
//! The unit of transfer between caches, sibling caches, and backing memory.

use super::constants::LINE_WORDS;

/// One cache line worth of data: eight 32-bit words.
pub type LineData = [u32; LINE_WORDS];
