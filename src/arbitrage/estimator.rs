//! Profitability Estimator
//!
//! Sizes a trade against the sell venue's liquidity and quotes the two
//! legs with the venues' own routers:
//!
//! 1. sell base for quote on the sell venue
//! 2. buy base back with that quote on the buy venue
//!
//! The input is derived from a target quote output (a slice of the sell
//! pool's quote reserve) via `getAmountsIn`, then the legs are re-quoted
//! forward with `getAmountsOut`. The plan records the forward chain, so
//! quoting `input_amount` again yields `expected_amount_out` exactly.
//!
//! Created: 2026-10-17

use crate::error::ArbError;
use crate::pool::calculator::{price_impact, scale_bps};
use crate::pool::reader::read_reserves;
use crate::types::{Direction, TokenPair, TradePlan};
use crate::venue::{Venue, VenuePair};
use alloy::primitives::{Address, U256};
use tracing::{debug, info};

/// Share of the sell pool's quote reserve targeted by default (1%)
pub const DEFAULT_TRADE_SIZE_BPS: u32 = 100;

#[derive(Debug, Clone)]
pub struct ProfitabilityEstimator {
    trade_size_bps: u32,
}

impl Default for ProfitabilityEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_TRADE_SIZE_BPS)
    }
}

impl ProfitabilityEstimator {
    pub fn new(trade_size_bps: u32) -> Self {
        Self { trade_size_bps }
    }

    /// Size and quote a trade in `direction`
    pub async fn estimate(
        &self,
        direction: Direction,
        venues: &VenuePair,
        pair: &TokenPair,
    ) -> Result<TradePlan, ArbError> {
        let sell = venues.get(direction.sell);
        let sell_reserves = read_reserves(sell, pair).await?;

        let target = scale_bps(sell_reserves.quote, self.trade_size_bps);
        if target.is_zero() {
            return Err(ArbError::Estimation(format!(
                "{} {} reserve too small to size a trade",
                sell.label, pair.quote.symbol
            )));
        }

        let sizing = quote(sell, Leg::In(target), &pair.base_to_quote()).await?;
        let input_amount = sizing[0];
        if input_amount.is_zero() {
            return Err(ArbError::Estimation("sized a zero input".into()));
        }

        let plan = self.quote_chain(input_amount, direction, venues, pair).await?;

        let impact = price_impact(input_amount, sell_reserves.base, sell_reserves.quote);
        info!(
            "🎯 Estimate {}: sell {} {} on {} -> {} {} -> {} {} on {} (net {}, impact {:.3}%)",
            pair.symbol(),
            pair.base.format(plan.input_amount),
            pair.base.symbol,
            sell.label,
            pair.quote.format(plan.intermediate_amount),
            pair.quote.symbol,
            pair.base.format(plan.expected_amount_out),
            pair.base.symbol,
            venues.label(direction.buy),
            plan.net_profit(),
            impact
        );
        Ok(plan)
    }

    /// Forward-quote both legs for a given base input
    pub async fn quote_chain(
        &self,
        input_amount: U256,
        direction: Direction,
        venues: &VenuePair,
        pair: &TokenPair,
    ) -> Result<TradePlan, ArbError> {
        if input_amount.is_zero() {
            return Err(ArbError::Estimation("zero input amount".into()));
        }

        let sell = venues.get(direction.sell);
        let buy = venues.get(direction.buy);

        let first = quote(sell, Leg::Out(input_amount), &pair.base_to_quote()).await?;
        let intermediate_amount = first[1];
        let second = quote(buy, Leg::Out(intermediate_amount), &pair.quote_to_base()).await?;
        let expected_amount_out = second[1];

        debug!(
            "Chain {} -> {} -> {} (sell {}, buy {})",
            input_amount, intermediate_amount, expected_amount_out, sell.label, buy.label
        );

        Ok(TradePlan {
            input_amount,
            intermediate_amount,
            expected_amount_out,
            buy_venue: direction.buy,
            sell_venue: direction.sell,
        })
    }
}

enum Leg {
    /// exact input, `getAmountsOut`
    Out(U256),
    /// exact output, `getAmountsIn`
    In(U256),
}

/// One router call, checked to return `[in, out]` for a two-hop path
async fn quote(venue: &Venue, leg: Leg, path: &[Address; 2]) -> Result<[U256; 2], ArbError> {
    let (call, result) = match leg {
        Leg::Out(amount) => ("getAmountsOut", venue.client().get_amounts_out(amount, path).await),
        Leg::In(amount) => ("getAmountsIn", venue.client().get_amounts_in(amount, path).await),
    };
    let amounts =
        result.map_err(|e| ArbError::Estimation(format!("{} {}: {:#}", venue.label, call, e)))?;

    match amounts.as_slice() {
        [amount_in, amount_out] => Ok([*amount_in, *amount_out]),
        other => Err(ArbError::Estimation(format!(
            "{} {} returned {} amounts, expected 2",
            venue.label,
            call,
            other.len()
        ))),
    }
}
