//! GPGPU Concurrency Core Simulator Library.
//!
//! This crate models the concurrency-correctness core of a multi-core SIMT
//! GPU at cycle granularity: per-core L0 data caches kept coherent with the
//! MESI protocol by a snooping cache controller, and a banked register file
//! whose eight access channels are arbitrated through a per-register
//! contestation map.
//!
//! # Architecture
//!
//! * **Caches**: direct-mapped or set-associative L0 caches, 32-byte lines,
//!   round-robin replacement, snoop broadcast in ascending core order.
//! * **Registers**: 4096 registers in 16 banks, 4 ports split into low/high
//!   channels, reader/writer locks checked against start-of-cycle state.
//! * **Reset**: one active-low line that clears caches and locks.
//!
//! # Modules
//!
//! * `common`: Address arithmetic, constants, shared types, and errors.
//! * `config`: Configuration loading and validation.
//! * `core`: Caches, register file, and the processor that owns them.
//! * `debug`: Injected event sinks for tracing.
//! * `sim`: Scenario files and the step runner.
//! * `soc`: Backing memory and processor construction.
//! * `stats`: Performance statistics collection.

/// Shared types, constants, address arithmetic, and error handling.
pub mod common;

/// Configuration system for cache geometry, memory sizes, and tracing.
///
/// Loads and validates TOML configuration files.
pub mod config;

/// Processor core: the coherent L0 cache layer and the arbitrated register
/// file, tied together by the processor's clock and reset line.
pub mod core;

/// Debug event sinks injected into the caches and register file.
pub mod debug;

/// Simulation harness, scenario loader, and step runner.
pub mod sim;

/// Backing memory and processor construction.
pub mod soc;

/// Performance statistics collection and reporting.
///
/// Tracks cycle counts, cache hits and misses, coherence traffic, and
/// register-channel outcomes during simulation.
pub mod stats;
