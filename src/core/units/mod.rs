//! Hardware units.

/// Coherent per-core L0 caches and the cache controller.
pub mod cache;

/// Banked register file and access-channel arbitration.
pub mod regfile;
