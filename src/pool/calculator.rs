//! Constant Product Math
//!
//! Uniswap V2 router arithmetic (x * y = k, 0.3% fee) over raw reserves.
//! Mirrors `UniswapV2Library.getAmountOut` / `getAmountIn` exactly so
//! offline quotes agree with on-chain router quotes to the wei.
//!
//! Created: 2026-10-17

use alloy::primitives::U256;

/// Fee numerator/denominator used by Uniswap V2 and SushiSwap (0.3%)
const FEE_NUMERATOR: u64 = 997;
const FEE_DENOMINATOR: u64 = 1000;

/// Calculate amount out for a given input.
///
/// Formula: amount_out = (amount_in * 997 * reserve_out) / (reserve_in * 1000 + amount_in * 997)
pub fn get_amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Option<U256> {
    if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
        return None;
    }

    let amount_in_with_fee = amount_in * U256::from(FEE_NUMERATOR);
    let numerator = amount_in_with_fee * reserve_out;
    let denominator = reserve_in * U256::from(FEE_DENOMINATOR) + amount_in_with_fee;

    Some(numerator / denominator)
}

/// Calculate amount in required to receive `amount_out`.
/// None when the pool cannot pay out that much (router reverts).
///
/// Formula: amount_in = (reserve_in * amount_out * 1000) / ((reserve_out - amount_out) * 997) + 1
pub fn get_amount_in(amount_out: U256, reserve_in: U256, reserve_out: U256) -> Option<U256> {
    if amount_out.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
        return None;
    }
    if amount_out >= reserve_out {
        return None;
    }

    let numerator = reserve_in * amount_out * U256::from(FEE_DENOMINATOR);
    let denominator = (reserve_out - amount_out) * U256::from(FEE_NUMERATOR);

    Some(numerator / denominator + U256::from(1))
}

/// Price impact of a trade as a percentage of the spot price
pub fn price_impact(amount_in: U256, reserve_in: U256, reserve_out: U256) -> f64 {
    let Some(amount_out) = get_amount_out(amount_in, reserve_in, reserve_out) else {
        return 100.0;
    };
    if amount_out.is_zero() {
        return 100.0;
    }

    let spot_price = u256_to_f64(reserve_out) / u256_to_f64(reserve_in);
    let execution_price = u256_to_f64(amount_out) / u256_to_f64(amount_in);

    ((spot_price - execution_price) / spot_price) * 100.0
}

/// Lossy conversion for price/ratio maths. V2 reserves are uint112 so the
/// u128 path covers them; larger values go through the decimal string.
pub fn u256_to_f64(value: U256) -> f64 {
    match u128::try_from(value) {
        Ok(v) => v as f64,
        Err(_) => value.to_string().parse().unwrap_or(f64::MAX),
    }
}

/// Scale a reserve by basis points (1 bps = 0.01%)
pub fn scale_bps(value: U256, bps: u32) -> U256 {
    value * U256::from(bps) / U256::from(10_000u64)
}
