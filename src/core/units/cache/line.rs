//! Cache Line.
//!
//! A line carries its MESI coherence state, the address tag, the
//! external-origin flag (host-backed vs. device-local memory), and one line
//! of data. Two lines with the same tag but different origin are distinct.

use crate::common::LineData;
use serde::{Deserialize, Serialize};

/// MESI coherence state of a line in one cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoherenceState {
    /// No valid data.
    #[default]
    Invalid,
    /// Clean copy; other caches may hold it too.
    Shared,
    /// Clean copy; no other cache holds it.
    Exclusive,
    /// Only up-to-date copy; backing memory is stale.
    Modified,
}

impl CoherenceState {
    /// Returns `true` for any state other than `Invalid`.
    #[inline]
    pub fn is_valid(self) -> bool {
        self != CoherenceState::Invalid
    }

    /// Returns `true` if a write may proceed without a bus transaction.
    #[inline]
    pub fn is_owned(self) -> bool {
        matches!(self, CoherenceState::Exclusive | CoherenceState::Modified)
    }
}

/// A single way of a cache set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheLine {
    pub state: CoherenceState,
    pub tag: u64,
    pub external: bool,
    pub data: LineData,
}

impl CacheLine {
    /// Returns `true` if this line holds valid data for `tag` in the given
    /// memory space.
    #[inline]
    pub fn matches(&self, tag: u64, external: bool) -> bool {
        self.state.is_valid() && self.tag == tag && self.external == external
    }

    #[inline]
    pub fn invalidate(&mut self) {
        self.state = CoherenceState::Invalid;
    }
}
