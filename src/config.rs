//! Configuration loading.
//!
//! Reads `config.toml` into strongly-typed structs, and loads the trading
//! set (a JSON array of instrument keys) from the setting file it points at.
//! Both are read once at startup; any failure here is fatal.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use tracing::info;

use crate::types::{EngineError, InstrumentKey};

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub engine: EngineConfig,
    #[serde(default)]
    pub valuation: ValuationConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub feed: FeedConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    pub name: String,
    /// Path of the JSON array of instrument keys to trade.
    pub setting_path: String,
    /// Price units added to (buy) or subtracted from (sell) the last price.
    #[serde(default = "default_price_offset")]
    pub price_offset: Decimal,
    /// Ticks retained per instrument; 0 keeps everything.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Ingress channel depth.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ValuationConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: 1,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    pub name: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            name: "PAPER".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FeedConfig {
    /// JSON-lines event file. Events are read from stdin when unset.
    pub path: Option<String>,
}

fn default_price_offset() -> Decimal {
    dec!(10)
}

fn default_history_capacity() -> usize {
    64
}

fn default_channel_capacity() -> usize {
    1024
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), EngineError> {
        let engine = &self.engine;
        if engine.price_offset.is_sign_negative() {
            return Err(EngineError::Config(format!(
                "engine.price_offset must not be negative (got {})",
                engine.price_offset
            )));
        }
        if engine.history_capacity != 0 && engine.history_capacity < 3 {
            return Err(EngineError::Config(format!(
                "engine.history_capacity must be 0 (unbounded) or at least 3 (got {})",
                engine.history_capacity
            )));
        }
        if engine.channel_capacity == 0 {
            return Err(EngineError::Config(
                "engine.channel_capacity must be greater than 0".to_string(),
            ));
        }
        if self.valuation.enabled && self.valuation.interval_secs == 0 {
            return Err(EngineError::Config(
                "valuation.interval_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// History ring capacity, `None` when unbounded.
    pub fn history_capacity(&self) -> Option<usize> {
        match self.engine.history_capacity {
            0 => None,
            n => Some(n),
        }
    }
}

/// Load the trading set from a JSON array of `"<symbol>.<exchange>"` strings.
///
/// A missing, unparsable, or empty file is an error: the engine must not
/// start with an ambiguous trading set.
pub fn load_trading_symbols(path: &str) -> Result<HashSet<InstrumentKey>, EngineError> {
    let setting_error = |message: String| EngineError::Setting {
        path: path.to_string(),
        message,
    };

    let json = fs::read_to_string(path).map_err(|e| setting_error(e.to_string()))?;
    let raw: Vec<String> = serde_json::from_str(&json).map_err(|e| setting_error(e.to_string()))?;

    let symbols = raw
        .iter()
        .map(|s| s.parse::<InstrumentKey>())
        .collect::<Result<HashSet<_>, _>>()
        .map_err(|e| setting_error(e.to_string()))?;

    if symbols.is_empty() {
        return Err(setting_error("trading set is empty".to_string()));
    }

    info!(path, count = symbols.len(), "Trading set loaded");
    Ok(symbols)
}
