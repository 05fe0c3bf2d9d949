//! Scenario Runner.
//!
//! A scenario is a TOML document that preloads backing memory and then
//! drives the processor step by step: cache reads and writes on named cores,
//! prefetches, flushes, DMA line transfers, register-channel ticks, and
//! reset-line changes. Steps may carry expectations; mismatches are
//! collected in the report instead of aborting the run. After every cache
//! step the touched line is audited for MESI ownership.
//!
//! ```toml
//! name = "snoop hand-off"
//!
//! [[step]]
//! op = "write"
//! core = 0
//! addr = 0
//! value = 0xA1B2
//!
//! [[step]]
//! op = "read"
//! core = 1
//! addr = 0
//! expect = 0xA1B2
//! ```

use crate::common::constants::{NUM_CHANNELS, NUM_REGISTERS};
use crate::common::{SimError, LINE_WORDS};
use crate::core::units::cache::CoherenceState;
use crate::core::units::regfile::{BankArray, ChannelId, RegisterCommand, RegisterResponse};
use crate::core::Processor;
use crate::soc::Memory;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,

    #[serde(default, rename = "preload")]
    pub preloads: Vec<Preload>,

    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

/// Words written to backing memory before the first step.
#[derive(Debug, Clone, Deserialize)]
pub struct Preload {
    pub addr: u64,
    #[serde(default)]
    pub external: bool,
    pub words: Vec<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Read {
        core: usize,
        addr: u64,
        #[serde(default)]
        external: bool,
        #[serde(default)]
        expect: Option<u32>,
    },
    Write {
        core: usize,
        addr: u64,
        value: u32,
        #[serde(default)]
        external: bool,
        #[serde(default)]
        write_through: bool,
    },
    Prefetch {
        core: usize,
        addr: u64,
        #[serde(default)]
        external: bool,
    },
    /// Flushes one core's cache, or every cache when `core` is omitted.
    Flush {
        #[serde(default)]
        core: Option<usize>,
    },
    DmaRead {
        addr: u64,
        #[serde(default)]
        external: bool,
        #[serde(default)]
        expect: Option<Vec<u32>>,
    },
    DmaWrite {
        addr: u64,
        #[serde(default)]
        external: bool,
        data: Vec<u32>,
    },
    ExpectState {
        core: usize,
        addr: u64,
        #[serde(default)]
        external: bool,
        state: CoherenceState,
    },
    /// Checks one word of backing memory (not the caches).
    ExpectMemory {
        addr: u64,
        #[serde(default)]
        external: bool,
        value: u32,
    },
    /// One clock edge with the listed channel commands; others idle.
    Tick {
        #[serde(default)]
        channels: Vec<ChannelStep>,
    },
    Idle {
        cycles: u64,
    },
    ResetLine {
        level: bool,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelStep {
    pub channel: usize,
    pub cmd: CommandKind,
    #[serde(default)]
    pub reg: u16,
    #[serde(default)]
    pub value: u32,
    #[serde(default)]
    pub expect: Option<Outcome>,
    /// Expected data for `read_register`.
    #[serde(default)]
    pub expect_value: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Reset,
    ReadRegister,
    WriteRegister,
    CheckRead,
    CheckWrite,
    LockRead,
    LockWrite,
    Unlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Idle,
    Granted,
    Denied,
    Stalled,
}

impl ChannelStep {
    fn command(&self) -> RegisterCommand {
        match self.cmd {
            CommandKind::Reset => RegisterCommand::Reset,
            CommandKind::ReadRegister => RegisterCommand::ReadRegister(self.reg),
            CommandKind::WriteRegister => RegisterCommand::WriteRegister(self.reg, self.value),
            CommandKind::CheckRead => RegisterCommand::CheckRead(self.reg),
            CommandKind::CheckWrite => RegisterCommand::CheckWrite(self.reg),
            CommandKind::LockRead => RegisterCommand::LockRead(self.reg),
            CommandKind::LockWrite => RegisterCommand::LockWrite(self.reg),
            CommandKind::Unlock => RegisterCommand::Unlock(self.reg),
        }
    }
}

fn outcome_of(response: RegisterResponse) -> Outcome {
    match response {
        RegisterResponse::Idle => Outcome::Idle,
        RegisterResponse::Value(_) | RegisterResponse::Granted => Outcome::Granted,
        RegisterResponse::Denied => Outcome::Denied,
        RegisterResponse::Stalled => Outcome::Stalled,
    }
}

/// Result of running a scenario.
#[derive(Debug, Clone, Default)]
pub struct ScenarioReport {
    pub name: String,
    pub steps: usize,
    pub failures: Vec<String>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Scenario {
    /// Rejects steps that name hardware the processor does not have.
    pub fn validate(&self, cores: usize) -> Result<(), SimError> {
        let bad = |step: usize, reason: String| Err(SimError::Scenario { step, reason });

        for (i, step) in self.steps.iter().enumerate() {
            let core = match step {
                Step::Read { core, .. }
                | Step::Write { core, .. }
                | Step::Prefetch { core, .. }
                | Step::ExpectState { core, .. } => Some(*core),
                Step::Flush { core } => *core,
                _ => None,
            };
            if let Some(core) = core {
                if core >= cores {
                    return bad(i, format!("core {} out of range ({} cores)", core, cores));
                }
            }

            match step {
                Step::DmaWrite { data, .. } if data.len() != LINE_WORDS => {
                    return bad(i, format!("dma_write needs {} words, got {}", LINE_WORDS, data.len()));
                }
                Step::DmaRead {
                    expect: Some(words),
                    ..
                } if words.len() != LINE_WORDS => {
                    return bad(i, format!("dma_read expects {} words, got {}", LINE_WORDS, words.len()));
                }
                Step::Tick { channels } => {
                    let mut used = [false; NUM_CHANNELS];
                    for ch in channels {
                        if ch.channel >= NUM_CHANNELS {
                            return bad(i, format!("channel {} out of range", ch.channel));
                        }
                        if used[ch.channel] {
                            return bad(i, format!("channel {} used twice in one tick", ch.channel));
                        }
                        used[ch.channel] = true;
                        if ch.cmd == CommandKind::Reset {
                            continue;
                        }
                        if ch.reg as usize >= NUM_REGISTERS {
                            return bad(i, format!("register r{} out of range", ch.reg));
                        }
                        if ChannelId::from_index(ch.channel).half() != BankArray::half_of(ch.reg) {
                            return bad(
                                i,
                                format!("channel {} cannot reach register r{}", ch.channel, ch.reg),
                            );
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Runs every step against `processor`.
    pub fn run(&self, processor: &mut Processor<Memory>) -> Result<ScenarioReport, SimError> {
        self.validate(processor.caches.cores())?;

        for preload in &self.preloads {
            processor
                .caches
                .memory_mut()
                .load_words(preload.addr, preload.external, &preload.words);
        }

        let mut report = ScenarioReport {
            name: self.name.clone(),
            ..Default::default()
        };

        for (i, step) in self.steps.iter().enumerate() {
            log::debug!("[Scenario] step {}: {:?}", i, step);
            let touched = run_step(processor, step, i, &mut report.failures);
            if let Some((addr, external)) = touched {
                if !processor.caches.is_coherent(addr, external) {
                    report.failures.push(format!(
                        "step {}: coherence violation on {:#x}: {:?}",
                        i,
                        addr,
                        processor.caches.check_coherence(addr, external)
                    ));
                }
            }
            report.steps += 1;
        }
        Ok(report)
    }
}

/// Executes one step; returns the cache line it touched, if any.
fn run_step(
    processor: &mut Processor<Memory>,
    step: &Step,
    i: usize,
    failures: &mut Vec<String>,
) -> Option<(u64, bool)> {
    match step {
        Step::Read {
            core,
            addr,
            external,
            expect,
        } => {
            let value = processor.caches.read(*core, *addr, *external);
            match (value, expect) {
                (None, _) => failures.push(format!("step {}: read stalled (reset held)", i)),
                (Some(got), Some(want)) if got != *want => failures.push(format!(
                    "step {}: core {} read {:#x} = {:#x}, expected {:#x}",
                    i, core, addr, got, want
                )),
                _ => {}
            }
            Some((*addr, *external))
        }
        Step::Write {
            core,
            addr,
            value,
            external,
            write_through,
        } => {
            if !processor
                .caches
                .write(*core, *addr, *value, *external, *write_through)
            {
                failures.push(format!("step {}: write stalled (reset held)", i));
            }
            Some((*addr, *external))
        }
        Step::Prefetch {
            core,
            addr,
            external,
        } => {
            if !processor.caches.prefetch(*core, *addr, *external) {
                failures.push(format!("step {}: prefetch refused", i));
            }
            None
        }
        Step::Flush { core } => {
            match core {
                Some(core) => processor.caches.flush(*core),
                None => processor.caches.flush_all(),
            }
            None
        }
        Step::DmaRead {
            addr,
            external,
            expect,
        } => {
            let data = processor.caches.dma_read_line(*addr, *external);
            if let Some(want) = expect {
                if data[..] != want[..] {
                    failures.push(format!(
                        "step {}: dma read {:#x} = {:x?}, expected {:x?}",
                        i, addr, data, want
                    ));
                }
            }
            Some((*addr, *external))
        }
        Step::DmaWrite {
            addr,
            external,
            data,
        } => {
            let mut line = [0u32; LINE_WORDS];
            line.copy_from_slice(data);
            processor.caches.dma_write_line(*addr, *external, &line);
            Some((*addr, *external))
        }
        Step::ExpectState {
            core,
            addr,
            external,
            state,
        } => {
            let got = processor.caches.cache(*core).state(*addr, *external);
            if got != *state {
                failures.push(format!(
                    "step {}: core {} line {:#x} is {:?}, expected {:?}",
                    i, core, addr, got, state
                ));
            }
            None
        }
        Step::ExpectMemory {
            addr,
            external,
            value,
        } => {
            let got = processor.caches.memory().peek_word(*addr, *external);
            if got != *value {
                failures.push(format!(
                    "step {}: memory {:#x} = {:#x}, expected {:#x}",
                    i, addr, got, value
                ));
            }
            None
        }
        Step::Tick { channels } => {
            let mut commands = [RegisterCommand::Reset; NUM_CHANNELS];
            for ch in channels {
                commands[ch.channel] = ch.command();
            }
            let responses = processor.tick(&commands);
            for ch in channels {
                let response = responses[ch.channel];
                if let Some(want) = ch.expect {
                    if outcome_of(response) != want {
                        failures.push(format!(
                            "step {}: channel {} {:?} -> {:?}, expected {:?}",
                            i, ch.channel, ch.cmd, response, want
                        ));
                    }
                }
                if let Some(want) = ch.expect_value {
                    if response != RegisterResponse::Value(want) {
                        failures.push(format!(
                            "step {}: channel {} read r{} -> {:?}, expected {:#x}",
                            i, ch.channel, ch.reg, response, want
                        ));
                    }
                }
            }
            None
        }
        Step::Idle { cycles } => {
            for _ in 0..*cycles {
                processor.step();
            }
            None
        }
        Step::ResetLine { level } => {
            processor.set_reset_line(*level);
            None
        }
    }
}
