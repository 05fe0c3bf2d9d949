//! Scenario Loader.
//!
//! Reads scenario files from disk and parses them into `Scenario` values.

use crate::common::SimError;
use crate::sim::scenario::Scenario;
use std::fs;
use std::path::Path;

/// Loads a scenario from a TOML file.
///
/// # Arguments
///
/// * `path` - Path to the scenario file.
///
/// # Returns
///
/// The parsed scenario, or an I/O or parse error naming `path`.
pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario, SimError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let scenario: Scenario = toml::from_str(&content).map_err(|source| SimError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    log::info!(
        "[Loader] {} steps from '{}'",
        scenario.steps.len(),
        path.display()
    );
    Ok(scenario)
}

/// Parses a scenario from an in-memory TOML document.
pub fn parse_scenario(content: &str) -> Result<Scenario, SimError> {
    toml::from_str(content).map_err(|source| SimError::Parse {
        path: "<inline>".to_string(),
        source,
    })
}
