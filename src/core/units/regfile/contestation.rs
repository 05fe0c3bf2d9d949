//! Register Contestation Map.
//!
//! One state byte per architectural register:
//!
//! | value  | meaning                         |
//! |--------|---------------------------------|
//! | 0      | free                            |
//! | 1      | write-locked (one writer)       |
//! | N >= 2 | N - 1 readers outstanding       |
//! | 255    | 254 readers, saturated          |
//!
//! A register is never write-locked and read-locked at the same time.
//! A saturated register fails `check_read`; locking it again is a counter
//! overflow. Overflow and underflow are protocol violations and panic.

use crate::common::constants::NUM_REGISTERS;

pub const FREE: u8 = 0;
pub const WRITE_LOCKED: u8 = 1;
pub const READ_OVERFLOW: u8 = u8::MAX;

/// Encoding of a single outstanding reader.
const ONE_READER: u8 = 2;

/// Returns `true` if a register in `state` may take another reader.
#[inline]
pub fn readable(state: u8) -> bool {
    state != WRITE_LOCKED && state != READ_OVERFLOW
}

/// Returns `true` if a register in `state` may take a writer.
#[inline]
pub fn writable(state: u8) -> bool {
    state == FREE
}

/// Number of readers encoded by `state`.
#[inline]
pub fn readers(state: u8) -> usize {
    if state >= ONE_READER {
        (state - 1) as usize
    } else {
        0
    }
}

#[derive(Clone)]
pub struct ContestationMap {
    states: Box<[u8]>,
}

impl Default for ContestationMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ContestationMap {
    /// Creates a map with every register free.
    pub fn new() -> Self {
        Self {
            states: vec![FREE; NUM_REGISTERS].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn state(&self, reg: u16) -> u8 {
        self.states[reg as usize]
    }

    #[inline]
    pub fn check_read(&self, reg: u16) -> bool {
        readable(self.state(reg))
    }

    #[inline]
    pub fn check_write(&self, reg: u16) -> bool {
        writable(self.state(reg))
    }

    /// Adds a reader.
    ///
    /// Returns `false` if the register is write-locked.
    ///
    /// # Panics
    ///
    /// If the register is already saturated, i.e. `check_read` is `false`
    /// while readers are outstanding.
    pub fn lock_read(&mut self, reg: u16) -> bool {
        let slot = &mut self.states[reg as usize];
        match *slot {
            WRITE_LOCKED => false,
            FREE => {
                *slot = ONE_READER;
                true
            }
            n => {
                assert!(
                    n != READ_OVERFLOW,
                    "r{}: reader count overflow ({} readers outstanding)",
                    reg,
                    readers(n)
                );
                *slot = n + 1;
                true
            }
        }
    }

    /// Takes the write lock. Returns `false` unless the register is free.
    pub fn lock_write(&mut self, reg: u16) -> bool {
        let slot = &mut self.states[reg as usize];
        if *slot != FREE {
            return false;
        }
        *slot = WRITE_LOCKED;
        true
    }

    /// Releases the writer or one reader.
    ///
    /// # Panics
    ///
    /// If the register is already free.
    pub fn unlock(&mut self, reg: u16) {
        let slot = &mut self.states[reg as usize];
        assert!(*slot != FREE, "r{}: unlock of a free register", reg);
        let next = *slot - 1;
        // 2 -> 1 is the last reader leaving, not a writer arriving.
        *slot = if next == WRITE_LOCKED { FREE } else { next };
    }

    /// Frees every register.
    pub fn clear(&mut self) {
        self.states.fill(FREE);
    }

    /// Number of registers that are not free.
    pub fn locked_count(&self) -> usize {
        self.states.iter().filter(|&&s| s != FREE).count()
    }
}
