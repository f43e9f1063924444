//! Configuration management
//!
//! Settings come from a .env file plus the process environment, or from
//! a TOML file with the same keys in lower case. Both paths end in
//! `EngineConfig::validate()`.
//!
//! Created: 2026-10-17

use crate::arbitrage::direction::Threshold;
use crate::arbitrage::estimator::DEFAULT_TRADE_SIZE_BPS;
use crate::arbitrage::recovery::RestartConfig;
use alloy::primitives::Address;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Signing key, never printed
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct PrivateKey(String);

impl PrivateKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PrivateKey(***)")
    }
}

/// One V2 fork: display label plus factory and router addresses
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VenueConfig {
    pub label: String,
    pub factory: Address,
    pub router: Address,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// WebSocket endpoint (log subscriptions need pubsub)
    pub rpc_url: String,
    pub chain_id: u64,
    /// Required only in live mode
    #[serde(default)]
    pub private_key: Option<PrivateKey>,
    pub flash_swap_address: Address,
    /// Token borrowed by the flash swap
    pub base_token: Address,
    pub quote_token: Address,
    pub venue_a: VenueConfig,
    pub venue_b: VenueConfig,
    /// Minimum spread magnitude, percent
    pub diff_threshold: f64,
    pub gas_limit: u64,
    /// Wei (u64, TOML has no u128)
    pub gas_price: u64,
    #[serde(default = "default_trade_size_bps")]
    pub trade_size_bps: u32,
    #[serde(default = "default_true")]
    pub require_profit: bool,
    #[serde(default)]
    pub live_mode: bool,
    #[serde(default = "default_execution_timeout")]
    pub execution_timeout_secs: u64,
    #[serde(default = "default_restart_initial_delay")]
    pub restart_initial_delay_ms: u64,
    #[serde(default = "default_restart_max_delay")]
    pub restart_max_delay_ms: u64,
    #[serde(default = "default_restart_max_failures")]
    pub restart_max_failures: u32,
    #[serde(default = "default_circuit_cooldown")]
    pub circuit_cooldown_secs: u64,
}

fn default_trade_size_bps() -> u32 { DEFAULT_TRADE_SIZE_BPS }
fn default_true() -> bool { true }
fn default_execution_timeout() -> u64 { 120 }
fn default_restart_initial_delay() -> u64 { 1_000 }
fn default_restart_max_delay() -> u64 { 60_000 }
fn default_restart_max_failures() -> u32 { 5 }
fn default_circuit_cooldown() -> u64 { 300 }

impl EngineConfig {
    /// Build from environment-style keys (`RPC_URL`, `DIFF_THRESHOLD`, ...)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).with_context(|| format!("{} not set", key));

        Ok(Self {
            rpc_url: get("RPC_URL")?,
            chain_id: parse(&lookup, "CHAIN_ID")?,
            private_key: lookup("PRIVATE_KEY")
                .filter(|k| !k.trim().is_empty())
                .map(PrivateKey::new),
            flash_swap_address: parse(&lookup, "FLASH_SWAP_ADDRESS")?,
            base_token: parse(&lookup, "BASE_TOKEN")?,
            quote_token: parse(&lookup, "QUOTE_TOKEN")?,
            venue_a: VenueConfig {
                label: get("VENUE_A_LABEL")?,
                factory: parse(&lookup, "VENUE_A_FACTORY")?,
                router: parse(&lookup, "VENUE_A_ROUTER")?,
            },
            venue_b: VenueConfig {
                label: get("VENUE_B_LABEL")?,
                factory: parse(&lookup, "VENUE_B_FACTORY")?,
                router: parse(&lookup, "VENUE_B_ROUTER")?,
            },
            diff_threshold: parse(&lookup, "DIFF_THRESHOLD")?,
            gas_limit: parse(&lookup, "GAS_LIMIT")?,
            gas_price: parse(&lookup, "GAS_PRICE")?,
            trade_size_bps: parse_or(&lookup, "TRADE_SIZE_BPS", default_trade_size_bps())?,
            require_profit: parse_or(&lookup, "REQUIRE_PROFIT", true)?,
            live_mode: parse_or(&lookup, "LIVE_MODE", false)?,
            execution_timeout_secs: parse_or(&lookup, "EXECUTION_TIMEOUT_SECS", default_execution_timeout())?,
            restart_initial_delay_ms: parse_or(&lookup, "RESTART_INITIAL_DELAY_MS", default_restart_initial_delay())?,
            restart_max_delay_ms: parse_or(&lookup, "RESTART_MAX_DELAY_MS", default_restart_max_delay())?,
            restart_max_failures: parse_or(&lookup, "RESTART_MAX_FAILURES", default_restart_max_failures())?,
            circuit_cooldown_secs: parse_or(&lookup, "CIRCUIT_COOLDOWN_SECS", default_circuit_cooldown())?,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn validate(&self) -> Result<()> {
        self.threshold()?;
        if self.gas_limit == 0 {
            bail!("GAS_LIMIT must be greater than zero");
        }
        // the sizing quote cannot target the whole reserve
        if !(1..=9_999).contains(&self.trade_size_bps) {
            bail!("TRADE_SIZE_BPS must be within 1..=9999, got {}", self.trade_size_bps);
        }
        if self.base_token == self.quote_token {
            bail!("BASE_TOKEN and QUOTE_TOKEN are the same address");
        }
        if self.live_mode && self.private_key.is_none() {
            bail!("LIVE_MODE requires PRIVATE_KEY");
        }
        Ok(())
    }

    pub fn threshold(&self) -> Result<Threshold> {
        Threshold::new(self.diff_threshold).context("invalid DIFF_THRESHOLD")
    }

    pub fn execution_timeout(&self) -> Duration {
        Duration::from_secs(self.execution_timeout_secs)
    }

    pub fn restart_config(&self) -> RestartConfig {
        RestartConfig {
            initial_delay: Duration::from_millis(self.restart_initial_delay_ms),
            max_delay: Duration::from_millis(self.restart_max_delay_ms),
            max_consecutive_failures: self.restart_max_failures,
            circuit_cooldown: Duration::from_secs(self.circuit_cooldown_secs),
            ..RestartConfig::default()
        }
    }
}

fn parse<T, F>(lookup: &F, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).with_context(|| format!("{} not set", key))?;
    raw.trim()
        .parse()
        .with_context(|| format!("invalid {}: {}", key, raw))
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {}: {}", key, raw)),
        _ => Ok(default),
    }
}

/// Load a dotenv file (missing file is fine), then read the environment
pub fn load_config_from_file(path: &str) -> Result<EngineConfig> {
    match dotenv::from_filename(path) {
        Ok(_) => info!("Loaded environment from {}", path),
        Err(_) => info!("No env file at {}, using process environment", path),
    }
    let config = EngineConfig::from_env()?;
    config.validate()?;
    Ok(config)
}

pub fn load_config_toml<P: AsRef<Path>>(path: P) -> Result<EngineConfig> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
    let config: EngineConfig =
        toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;
    config.validate()?;
    Ok(config)
}
