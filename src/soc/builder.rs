//! Processor Builder.
//!
//! Wires a `Processor` together from a `Config`: sizes the backing memories,
//! picks the debug sink, and builds the caches and register file.

use crate::config::Config;
use crate::core::Processor;
use crate::debug::{null_sink, DebugSink, LogSink};
use crate::soc::memory::Memory;
use crate::stats::SimStats;
use std::sync::Arc;

impl Processor<Memory> {
    /// Builds a processor with its own backing memory from `config`.
    ///
    /// Events go to the log when `general.trace` is set or the crate is
    /// built with the `always-trace` feature.
    pub fn from_config(config: &Config) -> Self {
        let memory = Memory::new(
            config.memory.local_size_val(),
            config.memory.host_size_val(),
        );

        let sink: Arc<dyn DebugSink> = if config.general.trace || cfg!(feature = "always-trace") {
            Arc::new(LogSink)
        } else {
            null_sink()
        };

        log::debug!(
            "[Builder] local memory {:#x} bytes, host memory {:#x} bytes",
            memory.size(false),
            memory.size(true)
        );

        Processor::new(config, memory, sink)
    }

    /// Statistics including backing-memory traffic.
    pub fn full_stats(&self) -> SimStats {
        let mut stats = self.stats();
        stats.memory = self.caches.memory().stats.clone();
        stats
    }
}
