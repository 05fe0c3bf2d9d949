//! System-on-Chip components around the processor core.
//!
//! Backing memory, the memory interface trait, and the builder that wires a
//! processor together from a configuration.

/// Processor construction from configuration.
pub mod builder;

/// Device-local and host-backed physical memory.
pub mod memory;

/// Interfaces to external collaborators.
pub mod traits;

pub use memory::Memory;
pub use traits::PhysicalMemory;
