//! Physical Memory.
//!
//! Two flat word arrays: device-local memory and host-backed memory. Both
//! start at address zero of their own space. Accesses outside a region read
//! as zero and drop writes, the same way an unmapped bus access would.

use crate::common::addr::line_base;
use crate::common::constants::WORD_BYTES;
use crate::common::{LineData, LINE_WORDS};
use crate::soc::traits::PhysicalMemory;
use crate::stats::MemoryStats;

pub struct Memory {
    local: Vec<u32>,
    host: Vec<u32>,
    /// Line traffic counters.
    pub stats: MemoryStats,
}

impl Memory {
    /// Creates zero-filled memories of the given sizes in bytes.
    pub fn new(local_bytes: usize, host_bytes: usize) -> Self {
        Self {
            local: vec![0; local_bytes / WORD_BYTES as usize],
            host: vec![0; host_bytes / WORD_BYTES as usize],
            stats: MemoryStats::default(),
        }
    }

    /// Size of the given address space in bytes.
    pub fn size(&self, external: bool) -> usize {
        self.region(external).len() * WORD_BYTES as usize
    }

    /// Reads a line without touching the statistics.
    pub fn peek_line(&self, addr: u64, external: bool) -> LineData {
        let mut line = [0u32; LINE_WORDS];
        if let Some(start) = self.index(addr, external) {
            line.copy_from_slice(&self.region(external)[start..start + LINE_WORDS]);
        }
        line
    }

    /// Writes a line without touching the statistics.
    pub fn poke_line(&mut self, addr: u64, external: bool, data: &LineData) {
        if let Some(start) = self.index(addr, external) {
            self.region_mut(external)[start..start + LINE_WORDS].copy_from_slice(data);
        }
    }

    /// Reads one word without touching the statistics.
    pub fn peek_word(&self, addr: u64, external: bool) -> u32 {
        self.peek_line(addr, external)[((addr >> 2) as usize) & (LINE_WORDS - 1)]
    }

    /// Loads a block of words at `addr`, for test and scenario setup.
    pub fn load_words(&mut self, addr: u64, external: bool, words: &[u32]) {
        let first = (addr / WORD_BYTES) as usize;
        let region = self.region_mut(external);
        for (i, word) in words.iter().enumerate() {
            if let Some(slot) = region.get_mut(first + i) {
                *slot = *word;
            }
        }
    }

    fn region(&self, external: bool) -> &[u32] {
        if external {
            &self.host
        } else {
            &self.local
        }
    }

    fn region_mut(&mut self, external: bool) -> &mut [u32] {
        if external {
            &mut self.host
        } else {
            &mut self.local
        }
    }

    /// Word index of the line holding `addr`, if it is mapped.
    fn index(&self, addr: u64, external: bool) -> Option<usize> {
        let start = (line_base(addr) / WORD_BYTES) as usize;
        if start + LINE_WORDS <= self.region(external).len() {
            Some(start)
        } else {
            None
        }
    }
}

impl PhysicalMemory for Memory {
    fn read_line(&mut self, addr: u64, external: bool) -> LineData {
        self.stats.line_reads += 1;
        if self.index(addr, external).is_none() {
            self.stats.unmapped += 1;
            log::warn!(
                "[Memory] read of unmapped line {:#x}{}",
                addr,
                if external { " (host)" } else { "" }
            );
        }
        self.peek_line(addr, external)
    }

    fn write_line(&mut self, addr: u64, external: bool, data: &LineData) {
        self.stats.line_writes += 1;
        if self.index(addr, external).is_none() {
            self.stats.unmapped += 1;
            log::warn!(
                "[Memory] write to unmapped line {:#x}{} dropped",
                addr,
                if external { " (host)" } else { "" }
            );
            return;
        }
        self.poke_line(addr, external, data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spaces_are_independent() {
        let mut mem = Memory::new(0x100, 0x100);
        mem.write_line(0x20, false, &[1; LINE_WORDS]);
        assert_eq!(mem.read_line(0x20, true), [0; LINE_WORDS]);
        assert_eq!(mem.read_line(0x20, false), [1; LINE_WORDS]);
    }

    #[test]
    fn test_unmapped_reads_zero() {
        let mut mem = Memory::new(0x40, 0);
        mem.write_line(0x40, false, &[9; LINE_WORDS]);
        assert_eq!(mem.read_line(0x40, false), [0; LINE_WORDS]);
        assert_eq!(mem.stats.unmapped, 2);
    }

    #[test]
    fn test_load_words() {
        let mut mem = Memory::new(0x100, 0);
        mem.load_words(0x24, false, &[0xAA, 0xBB]);
        assert_eq!(mem.peek_word(0x24, false), 0xAA);
        assert_eq!(mem.peek_word(0x28, false), 0xBB);
    }
}
