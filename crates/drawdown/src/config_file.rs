//! Loading a `SimulationConfig` from disk
//!
//! `.json` files are parsed with `serde_json`; anything else is treated as YAML.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use drawdown_core::SimulationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Parse configuration text. Validation is left to the engine.
pub fn parse_config(text: &str, format: ConfigFormat) -> Result<SimulationConfig> {
    match format {
        ConfigFormat::Yaml => {
            serde_saphyr::from_str(text).wrap_err("Failed to parse YAML configuration")
        }
        ConfigFormat::Json => {
            serde_json::from_str(text).wrap_err("Failed to parse JSON configuration")
        }
    }
}

pub fn load_config(path: &Path) -> Result<SimulationConfig> {
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&text, ConfigFormat::from_path(path))
        .wrap_err_with(|| format!("Invalid config file {}", path.display()))
}
