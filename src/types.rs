// Core data structures shared across the pipeline

use crate::pool::calculator::u256_to_f64;
use alloy::primitives::utils::format_units;
use alloy::primitives::{Address, B256, I256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ERC20 token identity (resolved once at startup)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub decimals: u8,
    pub symbol: String,
}

impl Token {
    pub fn new(address: Address, decimals: u8, symbol: impl Into<String>) -> Self {
        Self {
            address,
            decimals,
            symbol: symbol.into(),
        }
    }

    /// Human-readable amount for logs, falls back to raw units
    pub fn format(&self, amount: U256) -> String {
        format_units(amount, self.decimals).unwrap_or_else(|_| amount.to_string())
    }
}

/// The monitored pair. Base is the token borrowed by the flash swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub base: Token,
    pub quote: Token,
}

impl TokenPair {
    pub fn new(base: Token, quote: Token) -> Self {
        Self { base, quote }
    }

    pub fn symbol(&self) -> String {
        format!("{}/{}", self.base.symbol, self.quote.symbol)
    }

    /// V2 pairs store the lower address as token0
    pub fn base_is_token0(&self) -> bool {
        self.base.address < self.quote.address
    }

    /// Router path selling base for quote
    pub fn base_to_quote(&self) -> [Address; 2] {
        [self.base.address, self.quote.address]
    }

    /// Router path selling quote for base
    pub fn quote_to_base(&self) -> [Address; 2] {
        [self.quote.address, self.base.address]
    }
}

/// One of the two monitored venues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VenueId {
    A,
    B,
}

impl VenueId {
    pub fn counterpart(&self) -> VenueId {
        match self {
            VenueId::A => VenueId::B,
            VenueId::B => VenueId::A,
        }
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VenueId::A => write!(f, "A"),
            VenueId::B => write!(f, "B"),
        }
    }
}

/// Reserve snapshot of the pair pool on one venue, oriented to base/quote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolReserves {
    pub venue: VenueId,
    pub base: U256,
    pub quote: U256,
}

impl PoolReserves {
    /// Orient raw (reserve0, reserve1) using the pair's token ordering
    pub fn from_raw(venue: VenueId, pair: &TokenPair, reserve0: U256, reserve1: U256) -> Self {
        let (base, quote) = if pair.base_is_token0() {
            (reserve0, reserve1)
        } else {
            (reserve1, reserve0)
        };
        Self { venue, base, quote }
    }
}

/// Quote-per-base price on one venue, decimal-adjusted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceQuote {
    pub venue: VenueId,
    pub price: f64,
}

/// Signed percentage divergence of venue A over venue B (2 dp)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadResult {
    pub percent: f64,
}

/// Where to acquire the base token cheaply and where to offload it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Direction {
    pub buy: VenueId,
    pub sell: VenueId,
}

impl Direction {
    pub fn new(buy: VenueId, sell: VenueId) -> Self {
        Self { buy, sell }
    }
}

/// Sized opportunity for one pipeline run.
///
/// `input_amount` base is sold on the sell venue for `intermediate_amount`
/// quote, which buys back `expected_amount_out` base on the buy venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradePlan {
    pub input_amount: U256,
    pub intermediate_amount: U256,
    pub expected_amount_out: U256,
    pub buy_venue: VenueId,
    pub sell_venue: VenueId,
}

impl TradePlan {
    /// Flag handed to the flash swap contract: true when the first
    /// base -> quote swap runs on venue A
    pub fn starts_on_venue_a(&self) -> bool {
        self.sell_venue == VenueId::A
    }

    /// Expected base gained (negative = loss), before gas
    pub fn net_profit(&self) -> I256 {
        I256::from_raw(self.expected_amount_out).saturating_sub(I256::from_raw(self.input_amount))
    }

    pub fn is_profitable(&self) -> bool {
        self.expected_amount_out > self.input_amount
    }

    /// Output over input as a ratio, for logs
    pub fn return_ratio(&self) -> f64 {
        let input = u256_to_f64(self.input_amount);
        if input == 0.0 {
            return 0.0;
        }
        u256_to_f64(self.expected_amount_out) / input
    }
}

/// Observable result of a successful flash swap call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub submitted_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}
