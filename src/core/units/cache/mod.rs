//! Coherent L0 cache layer.
//!
//! Every processing core owns one set-associative L0 cache. Sibling caches
//! share one backing memory and keep each other coherent with the MESI
//! protocol. A cache never touches a sibling directly: while servicing its
//! own core it talks to a `CoherenceBus`, and the `CacheController` turns
//! those bus operations into snoops of every other cache.

/// Snoop orchestration across sibling caches.
pub mod controller;

/// Per-core set-associative cache and its MESI state machine.
pub mod l0;

/// Cache line and coherence state.
pub mod line;

/// Fixed-associativity set of lines.
pub mod set;

/// Round-robin victim cursor.
pub mod victim;

pub use controller::CacheController;
pub use l0::L0Cache;
pub use line::{CacheLine, CoherenceState};

use crate::common::LineData;

/// Result of snooping one sibling cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnoopReply {
    /// The sibling does not hold the line.
    Miss,
    /// The sibling held a clean copy.
    Clean,
    /// The sibling held the line Modified; its data is in the buffer.
    Dirty,
}

/// Bus transactions a cache issues on behalf of its own core.
///
/// `addr` is always the base address of the line.
pub trait CoherenceBus {
    /// Fetches a line for reading.
    ///
    /// Returns `true` if a sibling cache supplied the data, `false` if it
    /// came from backing memory (no sibling holds a copy).
    fn read_cache_line(&mut self, addr: u64, external: bool, buffer: &mut LineData) -> bool;

    /// Fetches a line for writing; every sibling copy is invalidated.
    ///
    /// Returns `true` if a sibling cache supplied the data.
    fn read_x_cache_line(&mut self, addr: u64, external: bool, buffer: &mut LineData) -> bool;

    /// Invalidates every sibling copy of a line this cache holds Shared.
    fn upgrade_cache_line(&mut self, addr: u64, external: bool);

    /// Pushes a full line to backing memory.
    fn write_back_cache_line(&mut self, addr: u64, external: bool, data: &LineData);
}

/// Returns `true` if the per-cache states of one line obey MESI: an
/// Exclusive or Modified copy excludes every other valid copy.
pub fn is_coherent(states: &[CoherenceState]) -> bool {
    let valid = states.iter().filter(|s| s.is_valid()).count();
    let owned = states.iter().filter(|s| s.is_owned()).count();
    owned == 0 || valid == 1
}
