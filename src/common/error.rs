//! Harness Error Types.
//!
//! Only the outer harness (configuration, scenario files, I/O) reports
//! errors through `SimError`. The cache and register-file core signal
//! contention with plain `bool`/`Option` results and treat protocol
//! violations as fatal panics.

use thiserror::Error;

/// Errors raised while setting up or driving a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// A configuration or scenario file could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A TOML document did not match the expected schema.
    #[error("failed to parse '{path}': {source}")]
    Parse {
        /// Path of the document.
        path: String,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A scenario step cannot be executed against this processor.
    #[error("scenario step {step}: {reason}")]
    Scenario {
        /// Zero-based index of the offending step.
        step: usize,
        /// Human-readable reason.
        reason: String,
    },
}
