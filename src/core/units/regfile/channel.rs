//! Register Access Channels.
//!
//! Four execution units each own one port; every port has a low and a high
//! half so that a unit can move both 32-bit halves of a 64-bit operand in
//! one tick. That gives eight channels, numbered `port * 2 + half`.
//!
//! Routing is static: the low half only reaches even registers (even banks)
//! and the high half only odd registers (odd banks), so the two halves of a
//! port can never collide on a bank.

use crate::common::constants::{NUM_CHANNELS, NUM_PORTS};

/// Half of a port (and of the bank array).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Half {
    Low,
    High,
}

/// Identifies one of the eight access channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelId(u8);

impl ChannelId {
    /// Channel for `half` of `port`.
    ///
    /// # Panics
    ///
    /// If `port` is not below `NUM_PORTS`.
    pub fn new(port: usize, half: Half) -> Self {
        assert!(port < NUM_PORTS, "port {} out of range", port);
        let half_bit = match half {
            Half::Low => 0,
            Half::High => 1,
        };
        Self((port * 2 + half_bit) as u8)
    }

    /// Channel with the given index (`0..NUM_CHANNELS`).
    pub fn from_index(index: usize) -> Self {
        assert!(index < NUM_CHANNELS, "channel {} out of range", index);
        Self(index as u8)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn port(self) -> usize {
        self.0 as usize / 2
    }

    #[inline]
    pub fn half(self) -> Half {
        if self.0 & 1 == 0 {
            Half::Low
        } else {
            Half::High
        }
    }

    /// Iterates over all eight channels in index order.
    pub fn all() -> impl Iterator<Item = ChannelId> {
        (0..NUM_CHANNELS).map(ChannelId::from_index)
    }
}

/// Command issued on one channel for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RegisterCommand {
    /// Nothing to do this tick; keeps the channel in lockstep.
    #[default]
    Reset,
    /// Read a register the caller holds a lock on.
    ReadRegister(u16),
    /// Write a register the caller holds the write lock on.
    WriteRegister(u16, u32),
    CheckRead(u16),
    CheckWrite(u16),
    LockRead(u16),
    LockWrite(u16),
    Unlock(u16),
}

impl RegisterCommand {
    /// Register addressed by the command, if any.
    pub fn register(&self) -> Option<u16> {
        match *self {
            RegisterCommand::Reset => None,
            RegisterCommand::ReadRegister(r)
            | RegisterCommand::WriteRegister(r, _)
            | RegisterCommand::CheckRead(r)
            | RegisterCommand::CheckWrite(r)
            | RegisterCommand::LockRead(r)
            | RegisterCommand::LockWrite(r)
            | RegisterCommand::Unlock(r) => Some(r),
        }
    }

    /// Returns `true` if the command needs its register's bank this tick.
    pub fn uses_bank(&self) -> bool {
        matches!(
            self,
            RegisterCommand::ReadRegister(_) | RegisterCommand::WriteRegister(..)
        )
    }
}

/// Outcome of one channel command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterResponse {
    /// The channel issued `Reset`.
    Idle,
    /// Register contents for `ReadRegister`.
    Value(u32),
    /// Check passed, lock taken, unlock or write done.
    Granted,
    /// Check failed or lock contended; retry on a later tick.
    Denied,
    /// Bank already used this tick, or the reset line is held.
    Stalled,
}

impl RegisterResponse {
    /// Returns `true` for `Value` and `Granted`.
    pub fn is_success(&self) -> bool {
        matches!(self, RegisterResponse::Value(_) | RegisterResponse::Granted)
    }
}
