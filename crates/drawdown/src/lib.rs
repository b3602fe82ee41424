//! Command-line front end for the drawdown projection engine
//!
//! Loads a `SimulationConfig` from YAML or JSON, runs the Monte Carlo engine or
//! the deterministic projector, and renders a plain-text report.

pub mod config_file;
pub mod format;
pub mod logging;
pub mod report;

pub use config_file::{ConfigFormat, load_config, parse_config};
pub use logging::init_logging;
pub use report::{DeterministicReport, Dollars, MonteCarloReport};
