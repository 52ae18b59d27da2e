//! Configuration loading

use std::fs;

use serde::{Deserialize, Serialize};

use crate::shared::errors::AppError;

/// Optimizer endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub endpoint: String,
    pub timeout_ms: u64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000".to_string(),
            timeout_ms: 30000,
        }
    }
}

/// Default simulation parameters, overridable per run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationDefaults {
    pub from_token: String,
    pub to_token: String,
    pub max_slippage: f64,
    pub step_delay_ms: u64,
    pub amount: f64,
    pub runs: u32,
}

impl Default for SimulationDefaults {
    fn default() -> Self {
        Self {
            from_token: "ETH".to_string(),
            to_token: "BTC".to_string(),
            max_slippage: 0.5,
            step_delay_ms: 250,
            amount: 100.0,
            runs: 10,
        }
    }
}

/// Benchmark configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub optimizer: OptimizerConfig,
    pub simulation: SimulationDefaults,
}

/// Загрузчик конфигурации
pub struct ConfigLoader;

impl ConfigLoader {
    /// Загрузить конфигурацию из файла Config.toml
    pub fn load_config() -> Result<BenchConfig, AppError> {
        Self::load_from("Config.toml")
    }

    pub fn load_from(path: &str) -> Result<BenchConfig, AppError> {
        let config_content = fs::read_to_string(path)
            .map_err(|e| AppError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: BenchConfig = toml::from_str(&config_content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }
}
