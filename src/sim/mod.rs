//! Simulation harness: scenario files and the runner that drives them.

/// Scenario file loading.
pub mod loader;

/// Scenario description and step runner.
pub mod scenario;

pub use loader::{load_scenario, parse_scenario};
pub use scenario::{Scenario, ScenarioReport, Step};
