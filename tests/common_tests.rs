//! Integration tests for common utilities module.

use gpgpu_emulator::common::addr::line_base;
use gpgpu_emulator::common::constants::*;
use gpgpu_emulator::common::*;

/// Tests the fixed line geometry.
#[test]
fn test_line_geometry() {
    assert_eq!(LINE_WORDS, 8);
    assert_eq!(LINE_BYTES, 32);
    assert_eq!(1u64 << LINE_SHIFT, LINE_BYTES);
    assert_eq!(LINE_BYTES, LINE_WORDS as u64 * WORD_BYTES);
}

/// Tests the fixed register file geometry.
#[test]
fn test_register_geometry() {
    assert_eq!(NUM_REGISTERS, 4096);
    assert_eq!(NUM_BANKS * BANK_DEPTH, NUM_REGISTERS);
    assert_eq!(NUM_CHANNELS, 8);
}

/// Tests address decomposition for a direct-mapped 64-set cache.
#[test]
fn test_addr_split() {
    let f = AddrFields::split(0x0000_1A4C, 6);

    assert_eq!(f.offset, 3);
    assert_eq!(f.set, 0x12);
    assert_eq!(f.tag, 0x3);
}

/// Tests that the word offset ignores the byte-within-word bits.
#[test]
fn test_addr_offset_ignores_low_bits() {
    for addr in 0x104..0x108u64 {
        assert_eq!(AddrFields::split(addr, 4).offset, 1);
    }
}

/// Tests address decomposition with no set-index bits.
#[test]
fn test_addr_split_single_set() {
    let f = AddrFields::split(0x1_0000_0024, 0);

    assert_eq!(f.set, 0);
    assert_eq!(f.offset, 1);
    assert_eq!(f.tag, 0x1_0000_0024 >> 5);
}

/// Tests that joining fields yields the line base address.
#[test]
fn test_addr_join() {
    let addr = 0xDEAD_BEEF;
    let f = AddrFields::split(addr, 7);

    assert_eq!(AddrFields::join(f.tag, f.set, 7), line_base(addr));
    assert_eq!(line_base(0x3F), 0x20);
}

/// Tests error messages.
#[test]
fn test_error_display() {
    let err = SimError::Scenario {
        step: 3,
        reason: "core 9 out of range".into(),
    };
    assert_eq!(err.to_string(), "scenario step 3: core 9 out of range");

    let err = SimError::InvalidConfig("cache.ways must be at least 1".into());
    assert!(err.to_string().starts_with("invalid configuration"));
}
