//! Cache Controller.
//!
//! Owns one L0 cache per core plus the backing memory, and implements the
//! `CoherenceBus` seen by each cache. Snoops are broadcast to siblings in
//! ascending core order, identical on every call. The first sibling that
//! supplies data wins and every later sibling is snooped with no buffer, so
//! exactly one copy operation happens per miss.
//!
//! The controller also services coherent DMA line transfers and a bounded,
//! deduplicating prefetch queue that drains on `tick`.

use super::l0::L0Cache;
use super::line::CoherenceState;
use super::{is_coherent, CoherenceBus, SnoopReply};
use crate::common::addr::line_base;
use crate::common::{LineData, LINE_WORDS};
use crate::config::CacheConfig;
use crate::debug::DebugSink;
use crate::soc::traits::PhysicalMemory;
use crate::stats::CacheStats;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PrefetchRequest {
    core: usize,
    line: u64,
    external: bool,
}

/// Bus view for one requesting cache: every other cache plus memory.
struct SiblingBus<'a, M: PhysicalMemory> {
    /// Caches with a lower core index than the requester.
    before: &'a mut [L0Cache],
    /// Caches with a higher core index than the requester.
    after: &'a mut [L0Cache],
    memory: &'a mut M,
}

impl<M: PhysicalMemory> CoherenceBus for SiblingBus<'_, M> {
    fn read_cache_line(&mut self, addr: u64, external: bool, buffer: &mut LineData) -> bool {
        let mut answered = false;
        let mut dirty = false;

        for cache in self.before.iter_mut().chain(self.after.iter_mut()) {
            let slot = if answered { None } else { Some(&mut *buffer) };
            match cache.snoop_bus_read(addr, external, slot) {
                SnoopReply::Miss => {}
                SnoopReply::Clean => answered = true,
                SnoopReply::Dirty => {
                    answered = true;
                    dirty = true;
                }
            }
        }

        if dirty {
            // Modified -> Shared: memory must be current again.
            self.memory.write_line(addr, external, buffer);
        } else if !answered {
            *buffer = self.memory.read_line(addr, external);
        }
        answered
    }

    fn read_x_cache_line(&mut self, addr: u64, external: bool, buffer: &mut LineData) -> bool {
        let mut answered = false;

        for cache in self.before.iter_mut().chain(self.after.iter_mut()) {
            let slot = if answered { None } else { Some(&mut *buffer) };
            if cache.snoop_bus_read_x(addr, external, slot) != SnoopReply::Miss {
                answered = true;
            }
        }

        if !answered {
            *buffer = self.memory.read_line(addr, external);
        }
        answered
    }

    fn upgrade_cache_line(&mut self, addr: u64, external: bool) {
        for cache in self.before.iter_mut().chain(self.after.iter_mut()) {
            cache.snoop_bus_upgrade(addr, external);
        }
    }

    fn write_back_cache_line(&mut self, addr: u64, external: bool, data: &LineData) {
        self.memory.write_line(addr, external, data);
    }
}

/// Routing and snoop-broadcast facade over the sibling L0 caches.
pub struct CacheController<M: PhysicalMemory> {
    caches: Box<[L0Cache]>,
    memory: M,
    prefetch_queue: VecDeque<PrefetchRequest>,
    prefetch_capacity: usize,
    in_reset: bool,
}

impl<M: PhysicalMemory> CacheController<M> {
    /// Builds one empty L0 cache per configured core over `memory`.
    pub fn new(config: &CacheConfig, memory: M, sink: Arc<dyn DebugSink>) -> Self {
        let caches = (0..config.cores)
            .map(|core| L0Cache::new(core, config.index_bits, config.ways, sink.clone()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        log::debug!(
            "[L0] {} caches: {} sets x {} ways ({} bytes each)",
            config.cores,
            config.sets(),
            config.ways,
            config.size_bytes()
        );
        Self {
            caches,
            memory,
            prefetch_queue: VecDeque::with_capacity(config.prefetch_queue),
            prefetch_capacity: config.prefetch_queue,
            in_reset: false,
        }
    }

    pub fn cores(&self) -> usize {
        self.caches.len()
    }

    pub fn cache(&self, core: usize) -> &L0Cache {
        &self.caches[core]
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    pub fn in_reset(&self) -> bool {
        self.in_reset
    }

    /// Reads a word through `core`'s cache.
    ///
    /// Returns `None` while the reset line is held; the caller retries.
    pub fn read(&mut self, core: usize, addr: u64, external: bool) -> Option<u32> {
        if self.in_reset {
            return None;
        }
        Some(self.with_bus(core, |cache, bus| cache.read(addr, external, bus)))
    }

    /// Writes a word through `core`'s cache.
    ///
    /// Returns `false` while the reset line is held; the caller retries.
    pub fn write(
        &mut self,
        core: usize,
        addr: u64,
        value: u32,
        external: bool,
        write_through: bool,
    ) -> bool {
        if self.in_reset {
            return false;
        }
        self.with_bus(core, |cache, bus| {
            cache.write(addr, value, external, write_through, bus)
        });
        true
    }

    /// Queues a prefetch of the line holding `addr` into `core`'s cache.
    ///
    /// Requests for lines already cached or already queued are dropped and
    /// reported as accepted. Returns `false` if the queue is full or the
    /// reset line is held.
    pub fn prefetch(&mut self, core: usize, addr: u64, external: bool) -> bool {
        if self.in_reset {
            return false;
        }
        self.check_core(core);
        if self.caches[core].contains(addr, external) {
            return true;
        }

        let request = PrefetchRequest {
            core,
            line: line_base(addr),
            external,
        };
        if self.prefetch_queue.contains(&request) {
            return true;
        }
        if self.prefetch_queue.len() >= self.prefetch_capacity {
            return false;
        }
        self.prefetch_queue.push_back(request);
        true
    }

    pub fn pending_prefetches(&self) -> usize {
        self.prefetch_queue.len()
    }

    /// Advances one clock: services every queued prefetch in arrival order.
    pub fn tick(&mut self) {
        while let Some(request) = self.prefetch_queue.pop_front() {
            self.with_bus(request.core, |cache, bus| {
                cache.prefetch(request.line, request.external, bus)
            });
        }
    }

    /// Writes back and invalidates every line in `core`'s cache.
    pub fn flush(&mut self, core: usize) {
        self.with_bus(core, |cache, bus| cache.flush(bus));
    }

    pub fn flush_all(&mut self) {
        for core in 0..self.caches.len() {
            self.flush(core);
        }
    }

    /// Coherent line read on behalf of a DMA engine.
    ///
    /// A Modified holder supplies the data, is flushed to memory, and drops
    /// to Shared. Otherwise the line comes from memory.
    pub fn dma_read_line(&mut self, addr: u64, external: bool) -> LineData {
        let mut data = [0u32; LINE_WORDS];
        let mut bus = SiblingBus {
            before: &mut self.caches[..],
            after: &mut [],
            memory: &mut self.memory,
        };
        bus.read_cache_line(line_base(addr), external, &mut data);
        data
    }

    /// Coherent full-line write on behalf of a DMA engine.
    ///
    /// Every cached copy is invalidated before memory is written.
    pub fn dma_write_line(&mut self, addr: u64, external: bool, data: &LineData) {
        let base = line_base(addr);
        for cache in self.caches.iter_mut() {
            cache.snoop_invalidate(base, external);
        }
        self.memory.write_line(base, external, data);
    }

    /// Applies the reset line. While asserted every cache is held Invalid,
    /// the prefetch queue is empty, and accesses are refused.
    pub fn set_reset(&mut self, asserted: bool) {
        if asserted {
            for cache in self.caches.iter_mut() {
                cache.reset();
            }
            self.prefetch_queue.clear();
        }
        self.in_reset = asserted;
    }

    /// Per-core coherence states of the line holding `addr`.
    pub fn check_coherence(&self, addr: u64, external: bool) -> Vec<CoherenceState> {
        self.caches
            .iter()
            .map(|cache| cache.state(addr, external))
            .collect()
    }

    /// Returns `true` if no two caches disagree about ownership of the line.
    pub fn is_coherent(&self, addr: u64, external: bool) -> bool {
        is_coherent(&self.check_coherence(addr, external))
    }

    pub fn stats(&self) -> Vec<CacheStats> {
        self.caches.iter().map(|c| c.stats.clone()).collect()
    }

    /// Runs `f` on `core`'s cache with a bus over its siblings.
    fn with_bus<R>(
        &mut self,
        core: usize,
        f: impl FnOnce(&mut L0Cache, &mut dyn CoherenceBus) -> R,
    ) -> R {
        self.check_core(core);
        let (before, rest) = self.caches.split_at_mut(core);
        let (cache, after) = rest.split_at_mut(1);
        let mut bus = SiblingBus {
            before,
            after,
            memory: &mut self.memory,
        };
        f(&mut cache[0], &mut bus)
    }

    fn check_core(&self, core: usize) {
        assert!(
            core < self.caches.len(),
            "core index {} out of range ({} cores)",
            core,
            self.caches.len()
        );
    }
}
