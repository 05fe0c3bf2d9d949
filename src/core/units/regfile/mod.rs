//! Banked register file and its arbitration layer.
//!
//! Execution units reach the 4096-entry register array through eight
//! channels. Each tick every channel carries exactly one command, and the
//! eight commands are applied as one batch:
//!
//! * Every predicate (checks, lock eligibility, lock-held assertions)
//!   observes the contestation map as it stood at the start of the tick.
//! * Lock and unlock effects are applied in channel order, so a claim made
//!   earlier in the batch still blocks a conflicting claim later in the same
//!   batch. Two writers can never both win.
//! * Register reads return start-of-tick contents; writes land after every
//!   read of the batch has been served.
//! * Each bank serves one access per tick. A second access to a bank in the
//!   same tick stalls, lower channel index first.

/// Register bank storage.
pub mod bank;

/// Channel identifiers, commands and responses.
pub mod channel;

/// Per-register hazard counters.
pub mod contestation;

pub use bank::BankArray;
pub use channel::{ChannelId, Half, RegisterCommand, RegisterResponse};
pub use contestation::ContestationMap;

use crate::common::constants::{NUM_CHANNELS, NUM_REGISTERS};
use crate::debug::{DebugEvent, DebugSink};
use crate::stats::RegisterStats;
use contestation::{readable, writable, FREE, WRITE_LOCKED};
use std::sync::Arc;

pub struct RegisterFile {
    banks: BankArray,
    contestation: ContestationMap,
    in_reset: bool,
    pub stats: RegisterStats,
    sink: Arc<dyn DebugSink>,
}

impl RegisterFile {
    /// Creates a register file with every register zero and free.
    pub fn new(sink: Arc<dyn DebugSink>) -> Self {
        Self {
            banks: BankArray::new(),
            contestation: ContestationMap::new(),
            in_reset: false,
            stats: RegisterStats::default(),
            sink,
        }
    }

    /// Applies one tick's worth of channel commands as a single batch.
    ///
    /// # Panics
    ///
    /// On protocol violations: a register routed to the wrong half, a read
    /// without a lock, a write without the write lock, an unlock of a free
    /// register, or reader-count overflow.
    pub fn tick(
        &mut self,
        commands: &[RegisterCommand; NUM_CHANNELS],
    ) -> [RegisterResponse; NUM_CHANNELS] {
        self.stats.ticks += 1;
        let mut responses = [RegisterResponse::Idle; NUM_CHANNELS];

        if self.in_reset {
            for (response, command) in responses.iter_mut().zip(commands) {
                if *command != RegisterCommand::Reset {
                    *response = RegisterResponse::Stalled;
                }
            }
            self.record(commands, &responses);
            return responses;
        }

        let mut start = [FREE; NUM_CHANNELS];
        for (i, command) in commands.iter().enumerate() {
            if let Some(reg) = command.register() {
                check_route(ChannelId::from_index(i), reg);
                start[i] = self.contestation.state(reg);
            }
        }

        let mut busy_banks: u16 = 0;
        let mut writes: [Option<(u16, u32)>; NUM_CHANNELS] = [None; NUM_CHANNELS];

        for (i, command) in commands.iter().enumerate() {
            responses[i] = match *command {
                RegisterCommand::Reset => RegisterResponse::Idle,
                RegisterCommand::CheckRead(_) => grant(readable(start[i])),
                RegisterCommand::CheckWrite(_) => grant(writable(start[i])),
                RegisterCommand::LockRead(reg) => {
                    grant(start[i] != WRITE_LOCKED && self.contestation.lock_read(reg))
                }
                RegisterCommand::LockWrite(reg) => {
                    grant(writable(start[i]) && self.contestation.lock_write(reg))
                }
                RegisterCommand::Unlock(reg) => {
                    assert!(start[i] != FREE, "ch{}: unlock of free register r{}", i, reg);
                    self.contestation.unlock(reg);
                    RegisterResponse::Granted
                }
                RegisterCommand::ReadRegister(reg) => {
                    assert!(start[i] != FREE, "ch{}: read of r{} without a lock", i, reg);
                    if claim_bank(&mut busy_banks, reg) {
                        RegisterResponse::Value(self.banks.read(reg))
                    } else {
                        RegisterResponse::Stalled
                    }
                }
                RegisterCommand::WriteRegister(reg, val) => {
                    assert!(
                        start[i] == WRITE_LOCKED,
                        "ch{}: write of r{} without the write lock",
                        i,
                        reg
                    );
                    if claim_bank(&mut busy_banks, reg) {
                        writes[i] = Some((reg, val));
                        RegisterResponse::Granted
                    } else {
                        RegisterResponse::Stalled
                    }
                }
            };
        }

        for (reg, val) in writes.into_iter().flatten() {
            self.banks.write(reg, val);
        }

        self.record(commands, &responses);
        responses
    }

    /// Issues a single command on `channel`; every other channel idles.
    pub fn execute(&mut self, channel: ChannelId, command: RegisterCommand) -> RegisterResponse {
        let mut commands = [RegisterCommand::Reset; NUM_CHANNELS];
        commands[channel.index()] = command;
        self.tick(&commands)[channel.index()]
    }

    /// Takes a read lock on `reg` through port 0.
    pub fn lock_read(&mut self, reg: u16) -> bool {
        self.execute(port0(reg), RegisterCommand::LockRead(reg))
            .is_success()
    }

    /// Takes the write lock on `reg` through port 0.
    pub fn lock_write(&mut self, reg: u16) -> bool {
        self.execute(port0(reg), RegisterCommand::LockWrite(reg))
            .is_success()
    }

    /// Releases one lock on `reg` through port 0. `false` means the
    /// command stalled (reset held).
    pub fn unlock(&mut self, reg: u16) -> bool {
        self.execute(port0(reg), RegisterCommand::Unlock(reg))
            .is_success()
    }

    /// Reads `reg` through port 0. `None` means the access stalled.
    pub fn read_register(&mut self, reg: u16) -> Option<u32> {
        match self.execute(port0(reg), RegisterCommand::ReadRegister(reg)) {
            RegisterResponse::Value(val) => Some(val),
            _ => None,
        }
    }

    /// Writes `reg` through port 0. `false` means the access stalled.
    pub fn write_register(&mut self, reg: u16, val: u32) -> bool {
        self.execute(port0(reg), RegisterCommand::WriteRegister(reg, val))
            .is_success()
    }

    pub fn check_read(&self, reg: u16) -> bool {
        self.contestation.check_read(reg)
    }

    pub fn check_write(&self, reg: u16) -> bool {
        self.contestation.check_write(reg)
    }

    /// Raw contestation state of `reg`.
    pub fn contestation(&self, reg: u16) -> u8 {
        self.contestation.state(reg)
    }

    pub fn contestation_map(&self) -> &ContestationMap {
        &self.contestation
    }

    /// Register contents without arbitration, for inspection only.
    pub fn peek(&self, reg: u16) -> u32 {
        self.banks.read(reg)
    }

    /// Applies the reset line. Asserting it frees every register; while it
    /// is held every command except `Reset` stalls.
    pub fn set_reset(&mut self, asserted: bool) {
        if asserted {
            self.contestation.clear();
        }
        self.in_reset = asserted;
    }

    /// Dumps every register that is currently locked to stdout.
    pub fn dump(&self) {
        println!(
            "Register file: {} of {} registers locked",
            self.contestation.locked_count(),
            NUM_REGISTERS
        );
        for reg in 0..NUM_REGISTERS as u16 {
            let state = self.contestation.state(reg);
            if state == FREE {
                continue;
            }
            let lock = if state == WRITE_LOCKED {
                "W".to_string()
            } else {
                format!("R{}", contestation::readers(state))
            };
            println!("  r{:<4} = {:#010x} [{}]", reg, self.banks.read(reg), lock);
        }
    }

    fn record(
        &mut self,
        commands: &[RegisterCommand; NUM_CHANNELS],
        responses: &[RegisterResponse; NUM_CHANNELS],
    ) {
        for (i, (command, response)) in commands.iter().zip(responses).enumerate() {
            if *command == RegisterCommand::Reset {
                continue;
            }
            self.stats.commands += 1;
            match response {
                RegisterResponse::Denied => self.stats.denied += 1,
                RegisterResponse::Stalled => self.stats.stalled += 1,
                _ => self.stats.granted += 1,
            }
            self.sink.event(&DebugEvent::Register {
                channel: ChannelId::from_index(i),
                command: *command,
                response: *response,
            });
        }
    }
}

#[inline]
fn grant(ok: bool) -> RegisterResponse {
    if ok {
        RegisterResponse::Granted
    } else {
        RegisterResponse::Denied
    }
}

/// Marks the bank of `reg` busy; returns `false` if it already was.
#[inline]
fn claim_bank(busy: &mut u16, reg: u16) -> bool {
    let bit = 1u16 << BankArray::bank_of(reg);
    if *busy & bit != 0 {
        return false;
    }
    *busy |= bit;
    true
}

fn check_route(channel: ChannelId, reg: u16) {
    assert!(
        (reg as usize) < NUM_REGISTERS,
        "ch{}: register r{} out of range",
        channel.index(),
        reg
    );
    assert!(
        channel.half() == BankArray::half_of(reg),
        "ch{} ({:?} half) cannot reach r{}",
        channel.index(),
        channel.half(),
        reg
    );
}

/// Port 0 channel serving `reg`.
#[inline]
fn port0(reg: u16) -> ChannelId {
    ChannelId::new(0, BankArray::half_of(reg))
}
