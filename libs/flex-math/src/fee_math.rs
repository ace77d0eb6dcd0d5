//! Q64.64 fee growth accounting.
//!
//! Growth accumulators are allowed to wrap around u128; every consumer takes
//! differences with `wrapping_sub`, which stays correct across a wrap.

use crate::full_math::mul_div;
use flex_types::{MathError, TickInfo, Q64};
use soroban_sdk::Env;

/// Growth per unit of liquidity produced by `fee_amount` (Q64.64)
pub fn fee_growth_delta_x64(
    env: &Env,
    fee_amount: u128,
    liquidity: u128,
) -> Result<u128, MathError> {
    mul_div(env, fee_amount, Q64, liquidity)
}

/// Tokens earned by `liquidity` over a Q64.64 growth delta (rounds down)
pub fn fees_for_growth(
    env: &Env,
    liquidity: u128,
    growth_delta_x64: u128,
) -> Result<u128, MathError> {
    mul_div(env, liquidity, growth_delta_x64, Q64)
}

/// Fees a position has accrued since its last checkpoint
pub fn pending_fees(
    env: &Env,
    liquidity: u128,
    fee_growth_inside_x64: u128,
    fee_growth_inside_last_x64: u128,
) -> Result<u128, MathError> {
    fees_for_growth(
        env,
        liquidity,
        fee_growth_inside_x64.wrapping_sub(fee_growth_inside_last_x64),
    )
}

/// Fee growth inside [tick_lower, tick_upper) for both tokens
pub fn get_fee_growth_inside(
    lower: &TickInfo,
    upper: &TickInfo,
    tick_lower: i32,
    tick_upper: i32,
    tick_current: i32,
    fee_growth_global_0_x64: u128,
    fee_growth_global_1_x64: u128,
) -> (u128, u128) {
    let (below_0, below_1) = if tick_current >= tick_lower {
        (lower.fee_growth_outside_0_x64, lower.fee_growth_outside_1_x64)
    } else {
        (
            fee_growth_global_0_x64.wrapping_sub(lower.fee_growth_outside_0_x64),
            fee_growth_global_1_x64.wrapping_sub(lower.fee_growth_outside_1_x64),
        )
    };

    let (above_0, above_1) = if tick_current < tick_upper {
        (upper.fee_growth_outside_0_x64, upper.fee_growth_outside_1_x64)
    } else {
        (
            fee_growth_global_0_x64.wrapping_sub(upper.fee_growth_outside_0_x64),
            fee_growth_global_1_x64.wrapping_sub(upper.fee_growth_outside_1_x64),
        )
    };

    (
        fee_growth_global_0_x64
            .wrapping_sub(below_0)
            .wrapping_sub(above_0),
        fee_growth_global_1_x64
            .wrapping_sub(below_1)
            .wrapping_sub(above_1),
    )
}
