//! Spread Calculator
//!
//! Prices are quote-per-base on each venue, decimal-adjusted. The spread
//! is venue A's divergence over venue B in percent, rounded to two
//! decimals so the threshold comparison matches what gets logged.
//!
//! Created: 2026-10-17

use crate::error::ArbError;
use crate::pool::calculator::u256_to_f64;
use crate::types::{PoolReserves, PriceQuote, SpreadResult, TokenPair};

impl PriceQuote {
    /// Quote-per-base price from oriented reserves. `label` names the
    /// venue in errors.
    pub fn from_reserves(
        reserves: &PoolReserves,
        pair: &TokenPair,
        label: &str,
    ) -> Result<Self, ArbError> {
        for (reserve, token) in [(reserves.base, &pair.base), (reserves.quote, &pair.quote)] {
            if reserve.is_zero() {
                return Err(ArbError::degenerate(label, format!("zero {} reserve", token.symbol)));
            }
        }

        let base = u256_to_f64(reserves.base) / 10f64.powi(pair.base.decimals as i32);
        let quote = u256_to_f64(reserves.quote) / 10f64.powi(pair.quote.decimals as i32);

        Ok(Self {
            venue: reserves.venue,
            price: quote / base,
        })
    }
}

/// ((a - b) / b) * 100, rounded to 2 dp. `reference` labels venue B.
pub fn compute_spread(
    quote_a: &PriceQuote,
    quote_b: &PriceQuote,
    reference: &str,
) -> Result<SpreadResult, ArbError> {
    if quote_b.price == 0.0 {
        return Err(ArbError::degenerate(reference, "zero price, spread undefined"));
    }

    let raw = (quote_a.price - quote_b.price) / quote_b.price * 100.0;
    if !raw.is_finite() {
        return Err(ArbError::degenerate(
            reference,
            format!("non-finite spread ({} vs {})", quote_a.price, quote_b.price),
        ));
    }

    Ok(SpreadResult {
        percent: round_2dp(raw),
    })
}

fn round_2dp(value: f64) -> f64 {
    // avoid printing -0.00 for tiny negative spreads
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
