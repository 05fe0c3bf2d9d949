//! Simulation statistics collection and reporting.
//!
//! Tracks per-core cache behaviour, coherence traffic, backing-memory
//! traffic, and register-file arbitration outcomes.

use serde::Serialize;

/// Counters kept by each L0 cache.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub read_hits: u64,
    pub read_misses: u64,
    pub write_hits: u64,
    pub write_misses: u64,
    pub prefetches: u64,

    /// Fills satisfied by a sibling cache instead of backing memory.
    pub sibling_fills: u64,
    /// Shared lines promoted to Modified through a bus upgrade.
    pub upgrades: u64,
    /// Lines pushed to backing memory (eviction, write-through, flush).
    pub write_backs: u64,
    pub evictions: u64,

    /// Snoops from siblings that found the line here.
    pub snoop_hits: u64,
    /// Snoops for which this cache supplied the line data.
    pub snoop_supplies: u64,
    /// Lines invalidated on behalf of a sibling.
    pub invalidations: u64,
}

impl CacheStats {
    pub fn accesses(&self) -> u64 {
        self.read_hits + self.read_misses + self.write_hits + self.write_misses
    }

    pub fn misses(&self) -> u64 {
        self.read_misses + self.write_misses
    }
}

/// Backing-memory traffic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MemoryStats {
    pub line_reads: u64,
    pub line_writes: u64,
    /// Accesses outside both memory regions.
    pub unmapped: u64,
}

/// Register-file arbitration outcomes, summed over all channels.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RegisterStats {
    pub ticks: u64,
    /// Commands other than the synchronisation no-op.
    pub commands: u64,
    pub granted: u64,
    /// Lock or check refused because of contention.
    pub denied: u64,
    /// Commands stalled on a bank conflict or a held reset line.
    pub stalled: u64,
}

/// Snapshot of all simulation statistics.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SimStats {
    pub host_seconds: f64,
    pub cycles: u64,
    pub caches: Vec<CacheStats>,
    pub memory: MemoryStats,
    pub registers: RegisterStats,
}

impl SimStats {
    /// Serialises the statistics as pretty-printed JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Prints a formatted summary of all simulation statistics.
    pub fn print(&self) {
        let cyc = if self.cycles == 0 { 1 } else { self.cycles };
        let khz = if self.host_seconds > 0.0 {
            (self.cycles as f64 / self.host_seconds) / 1000.0
        } else {
            0.0
        };

        println!("\n==========================================================");
        println!("GPU CORE SIMULATION STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {:.4} s", self.host_seconds);
        println!("sim_cycles               {}", self.cycles);
        println!("sim_freq                 {:.2} kHz", khz);
        println!("----------------------------------------------------------");
        println!("L0 CACHES");

        for (core, c) in self.caches.iter().enumerate() {
            let total = c.accesses();
            let miss_rate = if total > 0 {
                (c.misses() as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            println!(
                "  L0.{:<3} accesses: {:<10} | misses: {:<8} | miss_rate: {:.2}%",
                core,
                total,
                c.misses(),
                miss_rate
            );
            println!(
                "         sibling_fills: {:<5} upgrades: {:<5} write_backs: {:<5} evictions: {}",
                c.sibling_fills, c.upgrades, c.write_backs, c.evictions
            );
            println!(
                "         snoop_hits: {:<8} supplies: {:<5} invalidations: {}",
                c.snoop_hits, c.snoop_supplies, c.invalidations
            );
        }
        println!("----------------------------------------------------------");
        println!("BACKING MEMORY");
        println!("  mem.line_reads         {}", self.memory.line_reads);
        println!("  mem.line_writes        {}", self.memory.line_writes);
        println!("  mem.unmapped           {}", self.memory.unmapped);
        println!("----------------------------------------------------------");
        println!("REGISTER FILE");
        let r = &self.registers;
        let cmds = if r.commands == 0 { 1 } else { r.commands };
        println!("  rf.commands            {}", r.commands);
        println!(
            "  rf.granted             {} ({:.2}%)",
            r.granted,
            (r.granted as f64 / cmds as f64) * 100.0
        );
        println!(
            "  rf.denied              {} ({:.2}%)",
            r.denied,
            (r.denied as f64 / cmds as f64) * 100.0
        );
        println!(
            "  rf.stalled             {} ({:.2}%)",
            r.stalled,
            (r.stalled as f64 / cmds as f64) * 100.0
        );
        println!(
            "  rf.commands_per_cycle  {:.4}",
            r.commands as f64 / cyc as f64
        );
        println!("==========================================================");
    }
}
