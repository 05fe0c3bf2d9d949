//! L0 Cache.
//!
//! A per-core set-associative cache with `2^index_bits` sets. Lines follow
//! the MESI protocol:
//!
//! * **Read miss:** fill through `read_cache_line`; Shared if a sibling
//!   supplied the data, Exclusive otherwise.
//! * **Write:** Modified and Exclusive lines are written in place (Exclusive
//!   silently becomes Modified). A Shared line first issues
//!   `upgrade_cache_line`. A miss fills through `read_x_cache_line`.
//! * **Write-through:** the line is pushed to memory right away and left
//!   Exclusive, since memory is current again.
//! * **Eviction:** an Invalid way if one exists, else the rolling cursor.
//!   Only Modified victims are written back.
//!
//! Snoops from siblings arrive through the `snoop_bus_*` entry points, which
//! only the `CacheController` calls.

use super::line::{CacheLine, CoherenceState};
use super::set::CacheSet;
use super::victim::VictimCursor;
use super::{CoherenceBus, SnoopReply};
use crate::common::addr::AddrFields;
use crate::common::{LineData, LINE_WORDS};
use crate::debug::{CacheEventKind, DebugEvent, DebugSink};
use crate::stats::CacheStats;
use std::sync::Arc;

pub struct L0Cache {
    core: usize,
    index_bits: u32,
    sets: Box<[CacheSet]>,
    victim: VictimCursor,
    /// Access and coherence counters.
    pub stats: CacheStats,
    sink: Arc<dyn DebugSink>,
}

impl L0Cache {
    /// Creates an empty cache for `core`.
    ///
    /// # Arguments
    ///
    /// * `core` - Index of the owning core (used in debug events).
    /// * `index_bits` - Number of set-index bits; the cache has `2^index_bits` sets.
    /// * `ways` - Associativity of every set.
    /// * `sink` - Debug observer.
    pub fn new(core: usize, index_bits: u32, ways: usize, sink: Arc<dyn DebugSink>) -> Self {
        let sets = (0..1usize << index_bits)
            .map(|_| CacheSet::new(ways))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            core,
            index_bits,
            sets,
            victim: VictimCursor::new(ways),
            stats: CacheStats::default(),
            sink,
        }
    }

    pub fn core(&self) -> usize {
        self.core
    }

    pub fn num_sets(&self) -> usize {
        self.sets.len()
    }

    pub fn ways(&self) -> usize {
        self.sets[0].ways()
    }

    /// Way the next full-set eviction will pick.
    pub fn victim_cursor(&self) -> usize {
        self.victim.position()
    }

    /// Locates the line holding `addr` in the given memory space.
    pub fn lookup(&self, addr: u64, external: bool) -> Option<&CacheLine> {
        let f = self.split(addr);
        let set = &self.sets[f.set];
        set.find(f.tag, external).map(|way| set.line(way))
    }

    /// Coherence state of the line holding `addr`; `Invalid` on a miss.
    pub fn state(&self, addr: u64, external: bool) -> CoherenceState {
        self.lookup(addr, external)
            .map_or(CoherenceState::Invalid, |line| line.state)
    }

    pub fn contains(&self, addr: u64, external: bool) -> bool {
        self.lookup(addr, external).is_some()
    }

    /// Number of valid lines currently held.
    pub fn occupancy(&self) -> usize {
        self.sets
            .iter()
            .map(|s| s.iter().filter(|l| l.state.is_valid()).count())
            .sum()
    }

    /// Reads the word at `addr`, filling the line on a miss.
    pub fn read(&mut self, addr: u64, external: bool, bus: &mut dyn CoherenceBus) -> u32 {
        let f = self.split(addr);
        if let Some(way) = self.sets[f.set].find(f.tag, external) {
            self.stats.read_hits += 1;
            self.emit(addr, external, CacheEventKind::ReadHit);
            return self.sets[f.set].line(way).data[f.offset];
        }

        self.stats.read_misses += 1;
        self.emit(addr, external, CacheEventKind::ReadMiss);
        let way = self.fill(&f, external, false, bus);
        self.sets[f.set].line(way).data[f.offset]
    }

    /// Writes `value` to the word at `addr`, gaining ownership first.
    pub fn write(
        &mut self,
        addr: u64,
        value: u32,
        external: bool,
        write_through: bool,
        bus: &mut dyn CoherenceBus,
    ) {
        let f = self.split(addr);
        let base = AddrFields::join(f.tag, f.set, self.index_bits);

        let way = match self.sets[f.set].find(f.tag, external) {
            Some(way) => {
                let state = self.sets[f.set].line(way).state;
                self.stats.write_hits += 1;
                self.emit(addr, external, CacheEventKind::WriteHit(state));
                if state == CoherenceState::Shared {
                    bus.upgrade_cache_line(base, external);
                    self.stats.upgrades += 1;
                }
                way
            }
            None => {
                self.stats.write_misses += 1;
                self.emit(addr, external, CacheEventKind::WriteMiss);
                self.fill(&f, external, true, bus)
            }
        };

        let line = self.sets[f.set].line_mut(way);
        line.data[f.offset] = value;
        line.state = CoherenceState::Modified;

        if write_through {
            line.state = CoherenceState::Exclusive;
            let data = line.data;
            bus.write_back_cache_line(base, external, &data);
            self.stats.write_backs += 1;
        }
    }

    /// Fills the line holding `addr` without returning data.
    ///
    /// Returns `false` if the line was already present.
    pub fn prefetch(&mut self, addr: u64, external: bool, bus: &mut dyn CoherenceBus) -> bool {
        let f = self.split(addr);
        if self.sets[f.set].find(f.tag, external).is_some() {
            return false;
        }
        self.stats.prefetches += 1;
        self.emit(addr, external, CacheEventKind::Prefetch);
        self.fill(&f, external, false, bus);
        true
    }

    /// Writes back every Modified line and invalidates the whole cache.
    pub fn flush(&mut self, bus: &mut dyn CoherenceBus) {
        let index_bits = self.index_bits;
        let mut written = 0;
        for (set_idx, set) in self.sets.iter_mut().enumerate() {
            for line in set.iter_mut() {
                if line.state == CoherenceState::Modified {
                    let base = AddrFields::join(line.tag, set_idx, index_bits);
                    bus.write_back_cache_line(base, line.external, &line.data);
                    written += 1;
                }
                line.invalidate();
            }
        }
        self.stats.write_backs += written;
        self.emit(0, false, CacheEventKind::Flush);
    }

    /// Forces every line Invalid and zeroes the victim cursor.
    ///
    /// Modified data is discarded.
    pub fn reset(&mut self) {
        for set in self.sets.iter_mut() {
            set.clear();
        }
        self.victim.reset();
    }

    /// Snoop for a sibling's read miss.
    ///
    /// If `buffer` is `Some`, the line data is copied into it. The line ends
    /// up Shared; a Modified line reports `Dirty` so the controller can flush
    /// it to memory.
    pub fn snoop_bus_read(
        &mut self,
        addr: u64,
        external: bool,
        buffer: Option<&mut LineData>,
    ) -> SnoopReply {
        let f = self.split(addr);
        let Some(way) = self.sets[f.set].find(f.tag, external) else {
            return SnoopReply::Miss;
        };

        let line = self.sets[f.set].line_mut(way);
        let from = line.state;
        debug_assert!(
            buffer.is_some() || from != CoherenceState::Modified,
            "L0.{}: line {:#x} is Modified but another cache already supplied it",
            self.core,
            addr
        );
        let supplied = match buffer {
            Some(buf) => {
                *buf = line.data;
                true
            }
            None => false,
        };
        line.state = CoherenceState::Shared;

        self.stats.snoop_hits += 1;
        if supplied {
            self.stats.snoop_supplies += 1;
        }
        if from == CoherenceState::Modified {
            self.stats.write_backs += 1;
        }
        self.emit(
            addr,
            external,
            CacheEventKind::Snooped {
                from,
                to: CoherenceState::Shared,
            },
        );

        if from == CoherenceState::Modified {
            SnoopReply::Dirty
        } else {
            SnoopReply::Clean
        }
    }

    /// Snoop for a sibling's write miss.
    ///
    /// If `buffer` is `Some`, the line data is copied into it. The line is
    /// invalidated either way.
    pub fn snoop_bus_read_x(
        &mut self,
        addr: u64,
        external: bool,
        buffer: Option<&mut LineData>,
    ) -> SnoopReply {
        let f = self.split(addr);
        let Some(way) = self.sets[f.set].find(f.tag, external) else {
            return SnoopReply::Miss;
        };

        let line = self.sets[f.set].line_mut(way);
        let from = line.state;
        debug_assert!(
            buffer.is_some() || from != CoherenceState::Modified,
            "L0.{}: line {:#x} is Modified but another cache already supplied it",
            self.core,
            addr
        );
        let supplied = match buffer {
            Some(buf) => {
                *buf = line.data;
                true
            }
            None => false,
        };
        line.invalidate();

        self.stats.snoop_hits += 1;
        self.stats.invalidations += 1;
        if supplied {
            self.stats.snoop_supplies += 1;
        }
        self.emit(
            addr,
            external,
            CacheEventKind::Snooped {
                from,
                to: CoherenceState::Invalid,
            },
        );

        if from == CoherenceState::Modified {
            SnoopReply::Dirty
        } else {
            SnoopReply::Clean
        }
    }

    /// Drops our copy because the whole line is about to be overwritten
    /// in memory. Nothing is supplied, so even Modified data is discarded.
    pub fn snoop_invalidate(&mut self, addr: u64, external: bool) -> SnoopReply {
        let f = self.split(addr);
        let Some(way) = self.sets[f.set].find(f.tag, external) else {
            return SnoopReply::Miss;
        };

        let line = self.sets[f.set].line_mut(way);
        let from = line.state;
        line.invalidate();

        self.stats.snoop_hits += 1;
        self.stats.invalidations += 1;
        self.emit(
            addr,
            external,
            CacheEventKind::Snooped {
                from,
                to: CoherenceState::Invalid,
            },
        );

        if from == CoherenceState::Modified {
            SnoopReply::Dirty
        } else {
            SnoopReply::Clean
        }
    }

    /// Snoop for a sibling promoting its Shared copy; invalidates ours.
    pub fn snoop_bus_upgrade(&mut self, addr: u64, external: bool) -> SnoopReply {
        let f = self.split(addr);
        let Some(way) = self.sets[f.set].find(f.tag, external) else {
            return SnoopReply::Miss;
        };

        let line = self.sets[f.set].line_mut(way);
        let from = line.state;
        debug_assert_eq!(
            from,
            CoherenceState::Shared,
            "L0.{}: upgrade snoop found line {:#x} owned while a sibling holds it Shared",
            self.core,
            addr
        );
        line.invalidate();

        self.stats.snoop_hits += 1;
        self.stats.invalidations += 1;
        self.emit(
            addr,
            external,
            CacheEventKind::Snooped {
                from,
                to: CoherenceState::Invalid,
            },
        );
        SnoopReply::Clean
    }

    /// Brings the line described by `f` into the cache and returns its way.
    ///
    /// With `exclusive` set the line is fetched for ownership and enters
    /// Modified; the caller is about to write it.
    fn fill(
        &mut self,
        f: &AddrFields,
        external: bool,
        exclusive: bool,
        bus: &mut dyn CoherenceBus,
    ) -> usize {
        let way = self.make_room(f.set, bus);
        let base = AddrFields::join(f.tag, f.set, self.index_bits);
        let mut data = [0u32; LINE_WORDS];

        let state = if exclusive {
            if bus.read_x_cache_line(base, external, &mut data) {
                self.stats.sibling_fills += 1;
            }
            CoherenceState::Modified
        } else if bus.read_cache_line(base, external, &mut data) {
            self.stats.sibling_fills += 1;
            CoherenceState::Shared
        } else {
            CoherenceState::Exclusive
        };

        *self.sets[f.set].line_mut(way) = CacheLine {
            state,
            tag: f.tag,
            external,
            data,
        };
        self.emit(base, external, CacheEventKind::Fill(state));
        way
    }

    /// Frees a way in `set`, evicting the cursor's victim if the set is full.
    fn make_room(&mut self, set: usize, bus: &mut dyn CoherenceBus) -> usize {
        if let Some(way) = self.sets[set].find_invalid() {
            return way;
        }

        let way = self.victim.next_victim();
        let victim = *self.sets[set].line(way);
        let base = AddrFields::join(victim.tag, set, self.index_bits);
        let write_back = victim.state == CoherenceState::Modified;
        if write_back {
            bus.write_back_cache_line(base, victim.external, &victim.data);
            self.stats.write_backs += 1;
        }
        self.stats.evictions += 1;
        self.sets[set].line_mut(way).invalidate();
        self.emit(base, victim.external, CacheEventKind::Evict { write_back });
        way
    }

    #[inline]
    fn split(&self, addr: u64) -> AddrFields {
        AddrFields::split(addr, self.index_bits)
    }

    fn emit(&self, addr: u64, external: bool, kind: CacheEventKind) {
        self.sink.event(&DebugEvent::Cache {
            core: self.core,
            addr,
            external,
            kind,
        });
    }
}
