//! Debug Observer.
//!
//! Components report what they do to an injected `DebugSink`. The default
//! sink discards everything; `LogSink` forwards events to the `log` facade
//! at `trace` level. A sink is handed to each component at construction, so
//! there is no process-wide debug channel to attach to.

use crate::core::units::cache::CoherenceState;
use crate::core::units::regfile::{ChannelId, RegisterCommand, RegisterResponse};
use std::fmt;
use std::sync::Arc;

/// What a cache did in response to a request or snoop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheEventKind {
    ReadHit,
    ReadMiss,
    WriteHit(CoherenceState),
    WriteMiss,
    Prefetch,
    /// Line filled into the cache in the given state.
    Fill(CoherenceState),
    /// Victim removed; `write_back` is set when it was Modified.
    Evict { write_back: bool },
    /// Snoop hit; the line moved from `from` to `to`.
    Snooped {
        from: CoherenceState,
        to: CoherenceState,
    },
    Flush,
}

/// A single observable event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugEvent {
    Cache {
        core: usize,
        addr: u64,
        external: bool,
        kind: CacheEventKind,
    },
    Register {
        channel: ChannelId,
        command: RegisterCommand,
        response: RegisterResponse,
    },
    ResetLine {
        asserted: bool,
    },
}

impl fmt::Display for DebugEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebugEvent::Cache {
                core,
                addr,
                external,
                kind,
            } => write!(
                f,
                "[L0.{}] {:#010x}{} {:?}",
                core,
                addr,
                if *external { " (ext)" } else { "" },
                kind
            ),
            DebugEvent::Register {
                channel,
                command,
                response,
            } => write!(f, "[RF.ch{}] {:?} -> {:?}", channel.index(), command, response),
            DebugEvent::ResetLine { asserted } => write!(
                f,
                "[Reset] line {}",
                if *asserted { "asserted" } else { "released" }
            ),
        }
    }
}

/// Receiver for debug events.
pub trait DebugSink {
    fn event(&self, event: &DebugEvent);
}

/// Sink that drops every event.
pub struct NullSink;

impl DebugSink for NullSink {
    fn event(&self, _event: &DebugEvent) {}
}

/// Sink that writes every event to the log at `trace` level.
pub struct LogSink;

impl DebugSink for LogSink {
    fn event(&self, event: &DebugEvent) {
        log::trace!("{}", event);
    }
}

/// Returns a shared no-op sink.
pub fn null_sink() -> Arc<dyn DebugSink> {
    Arc::new(NullSink)
}
