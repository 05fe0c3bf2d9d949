//! Integration tests for MESI coherence across sibling L0 caches.

use gpgpu_emulator::config::CacheConfig;
use gpgpu_emulator::core::units::cache::{is_coherent, CacheController, CoherenceState};
use gpgpu_emulator::debug::null_sink;
use gpgpu_emulator::soc::Memory;
use std::collections::HashMap;

use CoherenceState::{Exclusive, Invalid, Modified, Shared};

fn create_controller(cores: usize) -> CacheController<Memory> {
    let config = CacheConfig {
        cores,
        index_bits: 2,
        ways: 2,
        prefetch_queue: 2,
    };
    CacheController::new(&config, Memory::new(0x10000, 0x10000), null_sink())
}

/// Tests the snoop hand-off of a Modified line to a reading sibling.
#[test]
fn test_modified_line_handoff() {
    let mut caches = create_controller(2);

    caches.write(0, 0x0, 0xA1B2, false, false);
    assert_eq!(caches.check_coherence(0x0, false), vec![Modified, Invalid]);

    assert_eq!(caches.read(1, 0x0, false), Some(0xA1B2));

    assert_eq!(caches.check_coherence(0x0, false), vec![Shared, Shared]);
    assert_eq!(caches.memory().peek_word(0x0, false), 0xA1B2);
    assert_eq!(caches.cache(1).stats.sibling_fills, 1);
    assert_eq!(caches.cache(0).stats.snoop_supplies, 1);
}

/// Tests that a clean Exclusive copy is downgraded without touching memory.
#[test]
fn test_exclusive_downgraded_on_read() {
    let mut caches = create_controller(2);
    caches.memory_mut().load_words(0x20, false, &[1, 2, 3]);

    assert_eq!(caches.read(0, 0x24, false), Some(2));
    assert_eq!(caches.cache(0).state(0x20, false), Exclusive);

    assert_eq!(caches.read(1, 0x28, false), Some(3));

    assert_eq!(caches.check_coherence(0x20, false), vec![Shared, Shared]);
    assert_eq!(caches.memory().stats.line_reads, 1);
    assert_eq!(caches.memory().stats.line_writes, 0);
}

/// Tests that a write miss invalidates every sharer and one copy is made.
#[test]
fn test_read_x_invalidates_sharers() {
    let mut caches = create_controller(3);
    caches.memory_mut().load_words(0x40, false, &[4, 5]);
    caches.read(0, 0x40, false);
    caches.read(1, 0x40, false);
    let supplied0 = caches.cache(0).stats.snoop_supplies;
    let supplied1 = caches.cache(1).stats.snoop_supplies;

    caches.write(2, 0x44, 6, false, false);

    assert_eq!(
        caches.check_coherence(0x40, false),
        vec![Invalid, Invalid, Modified]
    );
    assert_eq!(caches.read(2, 0x40, false), Some(4));
    assert_eq!(caches.read(2, 0x44, false), Some(6));

    // Ascending core order: core 0 answers first, core 1 is only invalidated.
    assert_eq!(caches.cache(0).stats.snoop_supplies, supplied0 + 1);
    assert_eq!(caches.cache(1).stats.snoop_supplies, supplied1);
    assert_eq!(caches.cache(0).stats.invalidations, 1);
    assert_eq!(caches.cache(1).stats.invalidations, 1);
}

/// Tests that a write miss takes a Modified line from its owner.
#[test]
fn test_read_x_steals_modified_line() {
    let mut caches = create_controller(2);

    caches.write(0, 0x60, 1, false, false);
    caches.write(1, 0x64, 2, false, false);

    assert_eq!(caches.check_coherence(0x60, false), vec![Invalid, Modified]);
    assert_eq!(caches.read(1, 0x60, false), Some(1));
    assert_eq!(caches.read(1, 0x64, false), Some(2));
    assert_eq!(caches.memory().stats.line_writes, 0);
}

/// Tests that writing a Shared line upgrades it without a refill.
#[test]
fn test_shared_write_upgrade() {
    let mut caches = create_controller(2);
    caches.read(0, 0x80, false);
    caches.read(1, 0x80, false);
    let reads = caches.memory().stats.line_reads;

    caches.write(0, 0x80, 77, false, false);

    assert_eq!(caches.check_coherence(0x80, false), vec![Modified, Invalid]);
    assert_eq!(caches.cache(0).stats.upgrades, 1);
    assert_eq!(caches.cache(0).stats.write_hits, 1);
    assert_eq!(caches.memory().stats.line_reads, reads);

    assert_eq!(caches.read(1, 0x80, false), Some(77));
    assert_eq!(caches.check_coherence(0x80, false), vec![Shared, Shared]);
}

/// Tests that the lowest-numbered sibling holding the line supplies it.
#[test]
fn test_first_responder_supplies() {
    let mut caches = create_controller(4);
    caches.read(1, 0x0, false);
    caches.read(3, 0x0, false);

    // Core 1 answers core 3 and core 0; core 0 then answers core 2.
    caches.read(0, 0x0, false);
    caches.read(2, 0x0, false);

    assert_eq!(caches.cache(1).stats.snoop_supplies, 2);
    assert_eq!(caches.cache(0).stats.snoop_supplies, 1);
    assert_eq!(caches.cache(3).stats.snoop_supplies, 0);
    assert_eq!(caches.cache(3).stats.snoop_hits, 2);
    assert_eq!(caches.check_coherence(0x0, false), vec![Shared; 4]);
}

/// Tests that a snoop freeing a way is used before the victim cursor.
#[test]
fn test_invalid_way_preferred_over_victim() {
    let config = CacheConfig {
        cores: 2,
        index_bits: 0,
        ways: 2,
        prefetch_queue: 1,
    };
    let mut caches = CacheController::new(&config, Memory::new(0x1000, 0x1000), null_sink());

    caches.read(0, 0x00, false);
    caches.read(0, 0x20, false);
    caches.write(1, 0x00, 1, false, false);
    assert_eq!(caches.cache(0).state(0x00, false), Invalid);

    caches.read(0, 0x40, false);

    assert!(caches.cache(0).contains(0x20, false));
    assert!(caches.cache(0).contains(0x40, false));
    assert_eq!(caches.cache(0).stats.evictions, 0);
    assert_eq!(caches.cache(0).victim_cursor(), 0);
}

/// Tests that local and host copies of one address are tracked separately.
#[test]
fn test_coherence_per_memory_space() {
    let mut caches = create_controller(2);

    caches.write(0, 0x100, 1, false, false);
    caches.write(1, 0x100, 2, true, false);

    assert_eq!(caches.check_coherence(0x100, false), vec![Modified, Invalid]);
    assert_eq!(caches.check_coherence(0x100, true), vec![Invalid, Modified]);
}

/// Tests coherent DMA reads of a Modified line.
#[test]
fn test_dma_read_line() {
    let mut caches = create_controller(2);
    caches.write(1, 0x204, 0xCAFE, false, false);

    let line = caches.dma_read_line(0x210, false);

    assert_eq!(line, [0, 0xCAFE, 0, 0, 0, 0, 0, 0]);
    assert_eq!(caches.cache(1).state(0x200, false), Shared);
    assert_eq!(caches.memory().peek_word(0x204, false), 0xCAFE);
    assert!(caches.is_coherent(0x200, false));
}

/// Tests that a DMA read of an uncached line comes from memory.
#[test]
fn test_dma_read_uncached() {
    let mut caches = create_controller(2);
    caches.memory_mut().load_words(0x300, true, &[9; 8]);

    assert_eq!(caches.dma_read_line(0x300, true), [9; 8]);
    assert_eq!(caches.check_coherence(0x300, true), vec![Invalid, Invalid]);
}

/// Tests that DMA writes invalidate every cached copy.
#[test]
fn test_dma_write_line() {
    let mut caches = create_controller(3);
    caches.read(0, 0x400, false);
    caches.read(1, 0x400, false);
    caches.write(2, 0x420, 5, false, false);

    caches.dma_write_line(0x400, false, &[1, 2, 3, 4, 5, 6, 7, 8]);
    caches.dma_write_line(0x420, false, &[0; 8]);

    assert_eq!(
        caches.check_coherence(0x400, false),
        vec![Invalid, Invalid, Invalid]
    );
    assert_eq!(caches.cache(2).state(0x420, false), Invalid);
    assert_eq!(caches.read(2, 0x41C, false), Some(8));
    assert_eq!(caches.read(1, 0x420, false), Some(0));
}

/// Tests that a DMA write invalidates holders without counting a supply.
#[test]
fn test_dma_write_counts_invalidations_only() {
    let mut caches = create_controller(3);
    caches.read(0, 0x400, false);
    caches.read(1, 0x400, false);
    caches.write(2, 0x420, 5, false, false);

    let supplies: Vec<u64> = (0..3).map(|c| caches.cache(c).stats.snoop_supplies).collect();
    let invalidations: Vec<u64> = (0..3).map(|c| caches.cache(c).stats.invalidations).collect();

    caches.dma_write_line(0x400, false, &[1; 8]);
    caches.dma_write_line(0x420, false, &[2; 8]);

    for core in 0..3 {
        let stats = &caches.cache(core).stats;
        assert_eq!(stats.snoop_supplies, supplies[core], "core {}", core);
        assert_eq!(stats.invalidations, invalidations[core] + 1, "core {}", core);
    }
    assert_eq!(caches.memory().peek_word(0x420, false), 2);
}

/// Tests prefetch queueing, deduplication and draining on tick.
#[test]
fn test_prefetch_queue() {
    let mut caches = create_controller(2);

    assert!(caches.prefetch(0, 0x500, false));
    assert!(caches.prefetch(0, 0x51C, false));
    assert_eq!(caches.pending_prefetches(), 1);

    assert!(caches.prefetch(1, 0x500, false));
    assert_eq!(caches.pending_prefetches(), 2);
    assert!(!caches.prefetch(0, 0x600, false));

    caches.tick();

    assert_eq!(caches.pending_prefetches(), 0);
    assert_eq!(caches.check_coherence(0x500, false), vec![Shared, Shared]);
    assert_eq!(caches.cache(0).stats.prefetches, 1);
}

/// Tests that prefetching a cached line is accepted and not queued.
#[test]
fn test_prefetch_cached_line() {
    let mut caches = create_controller(1);
    caches.read(0, 0x700, false);

    assert!(caches.prefetch(0, 0x704, false));
    assert_eq!(caches.pending_prefetches(), 0);
}

/// Tests that a prefetch pulls a Modified sibling line down to Shared.
#[test]
fn test_prefetch_snoops_owner() {
    let mut caches = create_controller(2);
    caches.write(0, 0x800, 11, false, false);

    caches.prefetch(1, 0x800, false);
    caches.tick();

    assert_eq!(caches.check_coherence(0x800, false), vec![Shared, Shared]);
    assert_eq!(caches.memory().peek_word(0x800, false), 11);
    assert_eq!(caches.read(1, 0x800, false), Some(11));
}

/// Tests that reset drops queued prefetches.
#[test]
fn test_reset_drops_prefetches() {
    let mut caches = create_controller(2);
    caches.prefetch(0, 0x900, false);

    caches.set_reset(true);
    caches.set_reset(false);
    caches.tick();

    assert_eq!(caches.pending_prefetches(), 0);
    assert!(!caches.cache(0).contains(0x900, false));
}

/// Tests that flush_all makes memory current for every core.
#[test]
fn test_flush_all() {
    let mut caches = create_controller(3);
    caches.write(0, 0x0, 1, false, false);
    caches.write(1, 0x20, 2, false, false);
    caches.write(2, 0x40, 3, true, false);

    caches.flush_all();

    assert_eq!(caches.memory().peek_word(0x0, false), 1);
    assert_eq!(caches.memory().peek_word(0x20, false), 2);
    assert_eq!(caches.memory().peek_word(0x40, true), 3);
    for core in 0..3 {
        assert_eq!(caches.cache(core).occupancy(), 0);
    }
}

/// Tests the ownership predicate over per-cache states.
#[test]
fn test_is_coherent_predicate() {
    assert!(is_coherent(&[Invalid, Invalid]));
    assert!(is_coherent(&[Shared, Shared, Invalid]));
    assert!(is_coherent(&[Modified, Invalid, Invalid]));
    assert!(is_coherent(&[Invalid, Exclusive]));
    assert!(!is_coherent(&[Modified, Shared]));
    assert!(!is_coherent(&[Exclusive, Exclusive]));
    assert!(!is_coherent(&[Shared, Invalid, Modified]));
}

/// Tests single ownership and read-your-writes over a long mixed workload.
#[test]
fn test_mixed_workload_stays_coherent() {
    let mut caches = create_controller(4);
    let mut shadow: HashMap<u64, u32> = HashMap::new();
    let mut seed: u64 = 0x2545_F491_4F6C_DD1D;

    // Twelve lines competing for four sets of two ways on every core.
    let lines: Vec<u64> = (0..12).map(|i| i * 0x20).collect();

    for step in 0..4000u32 {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;

        let core = (seed % 4) as usize;
        let line = lines[((seed >> 8) % lines.len() as u64) as usize];
        let addr = line + ((seed >> 16) % 8) * 4;

        match (seed >> 24) % 6 {
            0 | 1 => {
                let expected = shadow.get(&addr).copied().unwrap_or(0);
                assert_eq!(caches.read(core, addr, false), Some(expected), "step {}", step);
            }
            2 | 3 => {
                caches.write(core, addr, step, false, false);
                shadow.insert(addr, step);
            }
            4 => {
                caches.write(core, addr, step, false, true);
                shadow.insert(addr, step);
            }
            _ => {
                caches.prefetch(core, addr, false);
                caches.tick();
            }
        }

        for &l in &lines {
            assert!(
                caches.is_coherent(l, false),
                "step {}: line {:#x} {:?}",
                step,
                l,
                caches.check_coherence(l, false)
            );
        }
    }

    caches.flush_all();
    for (addr, value) in shadow {
        assert_eq!(caches.memory().peek_word(addr, false), value);
    }
}
