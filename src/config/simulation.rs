use crate::constants::DEFAULT_INITIAL_BALANCE;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Instrument metadata used by the simulated venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    #[serde(default = "default_price_step")]
    pub price_step: f64,
    #[serde(default = "default_volume_step")]
    pub volume_step: f64,
    #[serde(default = "default_volume_step")]
    pub volume_min: f64,
    #[serde(default = "default_volume_max")]
    pub volume_max: f64,
}

fn default_price_step() -> f64 {
    0.01
}

fn default_volume_step() -> f64 {
    0.001
}

fn default_volume_max() -> f64 {
    1_000_000.0
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            price_step: default_price_step(),
            volume_step: default_volume_step(),
            volume_min: default_volume_step(),
            volume_max: default_volume_max(),
        }
    }
}

/// Configuration for the bar-replay simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Starting cash of the simulated account
    #[serde(default = "default_initial_balance")]
    pub initial_balance: f64,

    /// Commission actually charged on every fill (fraction of notional)
    #[serde(default)]
    pub commission_rate: f64,

    /// Fraction of each market order that fills. Below 1.0 exercises the
    /// flatten retry path.
    #[serde(default = "default_fill_ratio")]
    pub fill_ratio: f64,

    #[serde(default)]
    pub instrument: InstrumentConfig,
}

fn default_initial_balance() -> f64 {
    DEFAULT_INITIAL_BALANCE
}

fn default_fill_ratio() -> f64 {
    1.0
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_balance: default_initial_balance(),
            commission_rate: 0.0,
            fill_ratio: default_fill_ratio(),
            instrument: InstrumentConfig::default(),
        }
    }
}

/// Load simulation configuration from a JSON file.
///
/// Resolution order:
/// 1. Explicit path argument
/// 2. TURNGRID_SIMULATION_CONFIG_FILE environment variable
/// 3. Default: "simulation_config.json" in current directory
///
/// If the file doesn't exist or cannot be parsed, returns default configuration.
pub fn load_simulation_config(path: Option<&str>) -> SimulationConfig {
    let config_path = path
        .map(String::from)
        .or_else(|| env::var("TURNGRID_SIMULATION_CONFIG_FILE").ok())
        .unwrap_or_else(|| "simulation_config.json".to_string());

    if !Path::new(&config_path).exists() {
        log::info!(
            "Simulation config not found at '{}', using defaults",
            config_path
        );
        return SimulationConfig::default();
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(mut json) => {
                // Filter out comment keys (those starting with "//")
                if let Some(obj) = json.as_object_mut() {
                    obj.retain(|k, _| !k.starts_with("//"));
                }

                match serde_json::from_value(json) {
                    Ok(config) => {
                        log::info!("Loaded simulation config from '{}'", config_path);
                        config
                    }
                    Err(e) => {
                        log::warn!(
                            "Failed to parse simulation config from '{}': {}. Using defaults.",
                            config_path,
                            e
                        );
                        SimulationConfig::default()
                    }
                }
            }
            Err(e) => {
                log::warn!(
                    "Failed to parse JSON from '{}': {}. Using defaults.",
                    config_path,
                    e
                );
                SimulationConfig::default()
            }
        },
        Err(e) => {
            log::warn!(
                "Failed to read simulation config from '{}': {}. Using defaults.",
                config_path,
                e
            );
            SimulationConfig::default()
        }
    }
}
