//! System-on-Chip Traits.
//!
//! This module defines the interface between the processor's cache layer
//! and whatever stores physical memory behind it. The cache controller only
//! ever moves whole lines, and only on a full miss, a Modified eviction, a
//! write-through, or a flush.

use crate::common::LineData;

/// Backing store for physical memory.
///
/// `addr` is always the base address of a line. `external` selects the
/// host-backed address space instead of device-local memory; the two spaces
/// are independent.
pub trait PhysicalMemory {
    /// Reads one full line.
    fn read_line(&mut self, addr: u64, external: bool) -> LineData;

    /// Writes one full line.
    fn write_line(&mut self, addr: u64, external: bool, data: &LineData);
}
