//! Cross-venue flash swap arbitrage engine
//!
//! Watches one token pair on two Uniswap V2 forks, compares their prices
//! on every Swap event, and hands sized opportunities to an on-chain
//! flash swap contract. At most one execution is in flight.
//!
//! Created: 2026-10-17

pub mod arbitrage;
pub mod config;
pub mod contracts;
pub mod error;
pub mod monitor;
pub mod pool;
pub mod types;
pub mod venue;

#[cfg(test)]
mod testkit;

// Re-export commonly used types
pub use config::{load_config_from_file, load_config_toml, EngineConfig};
pub use error::ArbError;
pub use monitor::Monitor;
pub use types::{Direction, PoolReserves, Token, TokenPair, TradePlan, VenueId};
