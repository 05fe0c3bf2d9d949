//! Register Bank Array.
//!
//! 4096 architectural registers spread over 16 single-ported banks of 256
//! words. Register `r` lives in bank `r & 0xF` at row `r >> 4`, so two
//! registers that differ only in bit 0 always sit in different banks. Even
//! banks form the low half of the array, odd banks the high half.

use super::channel::Half;
use crate::common::constants::{BANK_DEPTH, NUM_BANKS, NUM_REGISTERS};

/// One single-ported bank.
#[derive(Clone)]
pub struct RegisterBank {
    words: [u32; BANK_DEPTH],
}

impl Default for RegisterBank {
    fn default() -> Self {
        Self {
            words: [0; BANK_DEPTH],
        }
    }
}

impl RegisterBank {
    #[inline]
    pub fn read(&self, row: usize) -> u32 {
        self.words[row]
    }

    #[inline]
    pub fn write(&mut self, row: usize, val: u32) {
        self.words[row] = val;
    }
}

/// The full bank array.
pub struct BankArray {
    banks: Box<[RegisterBank]>,
}

impl Default for BankArray {
    fn default() -> Self {
        Self::new()
    }
}

impl BankArray {
    /// Creates an array with every register zeroed.
    pub fn new() -> Self {
        Self {
            banks: vec![RegisterBank::default(); NUM_BANKS].into_boxed_slice(),
        }
    }

    /// Bank holding register `reg`.
    #[inline]
    pub fn bank_of(reg: u16) -> usize {
        reg as usize & (NUM_BANKS - 1)
    }

    /// Row of register `reg` within its bank.
    #[inline]
    pub fn row_of(reg: u16) -> usize {
        reg as usize >> NUM_BANKS.trailing_zeros()
    }

    /// Half of the array (and of every port) that serves register `reg`.
    #[inline]
    pub fn half_of(reg: u16) -> Half {
        if reg & 1 == 0 {
            Half::Low
        } else {
            Half::High
        }
    }

    #[inline]
    pub fn read(&self, reg: u16) -> u32 {
        Self::check(reg);
        self.banks[Self::bank_of(reg)].read(Self::row_of(reg))
    }

    #[inline]
    pub fn write(&mut self, reg: u16, val: u32) {
        Self::check(reg);
        self.banks[Self::bank_of(reg)].write(Self::row_of(reg), val);
    }

    #[inline]
    fn check(reg: u16) {
        assert!(
            (reg as usize) < NUM_REGISTERS,
            "register r{} out of range ({} registers)",
            reg,
            NUM_REGISTERS
        );
    }
}
