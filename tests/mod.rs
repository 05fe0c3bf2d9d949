//! Test module organization.
//!
//! This module organizes all integration tests for the GPU core simulator.


/// MESI coherence, DMA and prefetch tests across sibling caches.
mod coherence_tests;

/// Address arithmetic, constants and error tests.
mod common_tests;

/// Configuration loading and validation tests.
mod config_tests;
