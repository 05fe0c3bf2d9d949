//! GPU processor core.
//!
//! The concurrency-correctness core of the processor: the coherent L0 cache
//! layer and the arbitrated register file, tied together by `Processor`.

/// Processor top level (caches, registers, reset line, clock).
pub mod processor;

/// Hardware units shared by the processing cores.
pub mod units;

pub use processor::Processor;
