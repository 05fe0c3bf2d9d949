//! GPGPU Concurrency Core Simulator CLI.
//!
//! Loads a configuration, builds the processor, runs a scenario file against
//! it, and prints statistics.
//!
//! # Usage
//!
//! ```text
//! gpgpu-sim --config configs/default.toml --scenario scenarios/snoop_handoff.toml
//! gpgpu-sim --scenario scenarios/register_locks.toml --json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use gpgpu_emulator::config::Config;
use gpgpu_emulator::core::Processor;
use gpgpu_emulator::sim::load_scenario;
use gpgpu_emulator::soc::Memory;

/// Command-line arguments for the simulator.
#[derive(Parser, Debug)]
#[command(author, version, about = "GPGPU Cache-Coherence and Register Arbitration Simulator")]
struct Args {
    /// Configuration file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<String>,

    /// Scenario file to run.
    #[arg(short, long)]
    scenario: String,

    /// Print statistics as JSON instead of the text report.
    #[arg(long)]
    json: bool,
}

/// Main entry point.
///
/// # Behavior
///
/// 1. **Configuration**: Parses arguments and loads the TOML configuration.
/// 2. **Initialization**: Builds backing memory, caches, and register file.
/// 3. **Scenario**: Loads and runs every step, collecting expectation failures.
/// 4. **Teardown**: Prints statistics and exits non-zero if any step failed.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path).with_context(|| format!("loading config {}", path))?,
        None => Config::default(),
    };
    let scenario = load_scenario(&args.scenario)
        .with_context(|| format!("loading scenario {}", args.scenario))?;

    if !args.json {
        print_config(&config);
    }

    let mut processor = Processor::<Memory>::from_config(&config);
    let report = scenario.run(&mut processor)?;
    let stats = processor.full_stats();

    if args.json {
        println!("{}", stats.to_json());
    } else {
        println!(
            "\n[*] Scenario '{}': {} steps, {} failures",
            report.name,
            report.steps,
            report.failures.len()
        );
        stats.print();
    }

    if !report.passed() {
        for failure in &report.failures {
            eprintln!("[!] {}", failure);
        }
        processor.registers.dump();
        process::exit(1);
    }
    Ok(())
}

fn print_config(config: &Config) {
    println!("Global Configuration");
    println!("--------------------");
    println!("General:");
    println!("  Trace Events:       {}", config.general.trace);
    println!("Cache:");
    println!("  Cores:              {}", config.cache.cores);
    println!(
        "  L0 (per core):      {} sets x {} ways ({} KB)",
        config.cache.sets(),
        config.cache.ways,
        config.cache.size_bytes() / 1024
    );
    println!("  Prefetch Queue:     {}", config.cache.prefetch_queue);
    println!("Memory:");
    println!(
        "  Local:              {} KB",
        config.memory.local_size_val() / 1024
    );
    println!(
        "  Host:               {} KB",
        config.memory.host_size_val() / 1024
    );
    println!("--------------------");
}
