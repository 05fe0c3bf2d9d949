//! Common utilities and types used throughout the GPU emulator.
//!
//! This module provides the fundamental types for address decomposition,
//! cache-line payloads, error handling, and architectural constants that are
//! shared by the cache hierarchy and the register file.

/// Address decomposition (tag, set index, word offset).
pub mod addr;

/// Architectural constants (line geometry, register file geometry).
pub mod constants;

/// Cache-line payload type.
pub mod data;

/// Error types for the simulation harness.
pub mod error;

pub use addr::AddrFields;
pub use data::LineData;
pub use error::SimError;

pub use constants::{LINE_BYTES, LINE_SHIFT, LINE_WORDS};
