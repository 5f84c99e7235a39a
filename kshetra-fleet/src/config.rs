//! Configuration loading for the fleet controller.

use crate::dispatch::Strategy;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration, loaded from TOML.
#[derive(Clone, Debug, Deserialize)]
pub struct FleetConfig {
    #[serde(default)]
    pub events: EventLogConfig,
    #[serde(default)]
    pub modules: ModulesConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// Simulation event log settings.
#[derive(Clone, Debug, Deserialize)]
pub struct EventLogConfig {
    /// Path of the append-only simulation log (default: simulation.log)
    #[serde(default = "default_log_path")]
    pub path: String,
}

/// Action-module host settings.
#[derive(Clone, Debug, Deserialize)]
pub struct ModulesConfig {
    /// Directory scanned for module artifacts at startup; empty disables
    /// loading.
    #[serde(default)]
    pub directory: String,

    /// Module ids honored by ingress invocation requests.
    #[serde(default)]
    pub enabled: Vec<String>,
}

/// Dispatch defaults.
#[derive(Clone, Debug, Deserialize)]
pub struct DispatchConfig {
    /// Strategy used when a dispatch request names none (default: greedy)
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,
}

fn default_log_path() -> String {
    "simulation.log".to_string()
}

fn default_strategy() -> Strategy {
    Strategy::Greedy
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            path: default_log_path(),
        }
    }
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            directory: String::new(),
            enabled: Vec::new(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
        }
    }
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            events: EventLogConfig::default(),
            modules: ModulesConfig::default(),
            dispatch: DispatchConfig::default(),
        }
    }
}

impl FleetConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file: {}", e)))?;
        let config: FleetConfig =
            toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        Ok(config)
    }
}
