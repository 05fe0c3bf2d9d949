//! Processor.
//!
//! Top-level owner of the concurrency core: the cache controller with its
//! sibling L0 caches, the banked register file, the reset line, and the
//! cycle counter. Everything advances only when `tick` is called.

use crate::common::constants::NUM_CHANNELS;
use crate::config::Config;
use crate::core::units::cache::CacheController;
use crate::core::units::regfile::{RegisterCommand, RegisterFile, RegisterResponse};
use crate::debug::{DebugEvent, DebugSink};
use crate::soc::traits::PhysicalMemory;
use crate::stats::SimStats;
use std::sync::Arc;
use std::time::Instant;

pub struct Processor<M: PhysicalMemory> {
    /// Cache controller (one L0 cache per core, plus backing memory).
    pub caches: CacheController<M>,
    /// Banked register file with its eight access channels.
    pub registers: RegisterFile,
    reset_line: bool,
    cycle: u64,
    started: Instant,
    sink: Arc<dyn DebugSink>,
}

impl<M: PhysicalMemory> Processor<M> {
    /// Builds a processor over `memory` with the reset line released.
    pub fn new(config: &Config, memory: M, sink: Arc<dyn DebugSink>) -> Self {
        Self {
            caches: CacheController::new(&config.cache, memory, sink.clone()),
            registers: RegisterFile::new(sink.clone()),
            reset_line: true,
            cycle: 0,
            started: Instant::now(),
            sink,
        }
    }

    /// Drives the active-low reset line.
    ///
    /// Driving it low clears every cache and the contestation map and keeps
    /// them clear until it is driven high again.
    pub fn set_reset_line(&mut self, level: bool) {
        if level == self.reset_line {
            return;
        }
        self.reset_line = level;
        let asserted = !level;
        self.caches.set_reset(asserted);
        self.registers.set_reset(asserted);
        self.sink.event(&DebugEvent::ResetLine { asserted });
        log::debug!(
            "[Reset] line {} at cycle {}",
            if asserted { "asserted" } else { "released" },
            self.cycle
        );
    }

    /// Pulses reset: assert, then release.
    pub fn reset(&mut self) {
        self.set_reset_line(false);
        self.set_reset_line(true);
    }

    pub fn reset_asserted(&self) -> bool {
        !self.reset_line
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Advances one clock edge.
    ///
    /// Services queued prefetches, applies the register-channel batch, and
    /// returns one response per channel.
    pub fn tick(
        &mut self,
        commands: &[RegisterCommand; NUM_CHANNELS],
    ) -> [RegisterResponse; NUM_CHANNELS] {
        self.caches.tick();
        let responses = self.registers.tick(commands);
        self.cycle += 1;
        responses
    }

    /// Advances one clock edge with every register channel idle.
    pub fn step(&mut self) {
        self.tick(&[RegisterCommand::Reset; NUM_CHANNELS]);
    }

    /// Snapshot of cache and register statistics.
    ///
    /// Backing-memory counters are filled in by the caller when the memory
    /// type tracks them; see `Processor<Memory>::full_stats`.
    pub fn stats(&self) -> SimStats {
        SimStats {
            host_seconds: self.started.elapsed().as_secs_f64(),
            cycles: self.cycle,
            caches: self.caches.stats(),
            memory: Default::default(),
            registers: self.registers.stats.clone(),
        }
    }
}
