/**
* filename : config
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::TradingError;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const TESTNET_BASE_URL: &str = "https://testnet.binancefuture.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub exchange: ExchangeConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub base_url: String,
    pub recv_window_ms: u64,
    pub timeout_ms: u64,
    /// Fabricate fills locally instead of calling the exchange
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
}

impl Config {
    /// Load configuration from a file, falling back to defaults when it is absent
    pub fn load_from(config_path: &Path) -> Result<Self, TradingError> {
        let mut cfg = if config_path.exists() {
            let mut file = File::open(config_path)
                .map_err(|e| TradingError::ConfigError(format!("Failed to open config file: {}", e)))?;

            let mut contents = String::new();
            file.read_to_string(&mut contents)
                .map_err(|e| TradingError::ConfigError(format!("Failed to read config file: {}", e)))?;

            serde_json::from_str::<Config>(&contents)
                .map_err(|e| TradingError::ConfigError(format!("Failed to parse config file: {}", e)))?
        } else {
            Config::default()
        };

        // environment overrides
        cfg.apply_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Apply environment variable overrides for sensitive/runtime fields
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = var("BINANCE_API_KEY") { self.exchange.api_key = Some(v); }
        if let Some(v) = var("BINANCE_API_SECRET") { self.exchange.api_secret = Some(v); }
        if let Some(v) = var("BINANCE_BASE_URL") { self.exchange.base_url = v; }
        if let Some(v) = var("LOG_FILE") { self.logging.file_path = Some(v); }
        if let Some(v) = var("DRY_RUN") {
            let lower = v.to_lowercase();
            if ["1", "true", "yes"].contains(&lower.as_str()) { self.exchange.dry_run = true; }
            if ["0", "false", "no"].contains(&lower.as_str()) { self.exchange.dry_run = false; }
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3030,
        }
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        ExchangeConfig {
            api_key: None,
            api_secret: None,
            base_url: TESTNET_BASE_URL.to_string(),
            recv_window_ms: 5000,
            timeout_ms: 10_000,
            dry_run: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file_path: Some("logs/trading_bot.log".to_string()),
        }
    }
}
