//! Architectural constants.
//!
//! Cache-line geometry is fixed at eight 32-bit words. The register file
//! geometry (16 banks of 256 words, 4 ports with a low and a high half each)
//! is likewise fixed by the architecture and not configurable.

/// Bytes per architectural word.
pub const WORD_BYTES: u64 = 4;

/// Words per cache line.
pub const LINE_WORDS: usize = 8;

/// Bytes per cache line.
pub const LINE_BYTES: u64 = LINE_WORDS as u64 * WORD_BYTES;

/// log2 of `LINE_BYTES`; the set index starts at this bit.
pub const LINE_SHIFT: u32 = 5;

/// Largest supported number of set-index bits.
pub const MAX_INDEX_BITS: u32 = 16;

/// Number of physically independent register banks.
pub const NUM_BANKS: usize = 16;

/// Registers held by each bank.
pub const BANK_DEPTH: usize = 256;

/// Total architectural registers (`NUM_BANKS * BANK_DEPTH`).
pub const NUM_REGISTERS: usize = NUM_BANKS * BANK_DEPTH;

/// Logical register-file ports (one per execution unit).
pub const NUM_PORTS: usize = 4;

/// Access channels: every port has a low and a high half.
pub const NUM_CHANNELS: usize = NUM_PORTS * 2;
