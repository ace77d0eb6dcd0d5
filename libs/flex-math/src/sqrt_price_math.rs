use crate::full_math::{div_u256, mul_div, mul_div_rounding_up, mul_div_u256, to_u128};
use flex_types::{MathError, Q96, WAD};
use soroban_sdk::{Env, U256};

fn sort_ratios(a: u128, b: u128) -> (u128, u128) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

/// Calculate amount0 delta for a price move from sqrt_ratio_a to sqrt_ratio_b
/// delta_x = L * (sqrt_pb - sqrt_pa) / (sqrt_pa * sqrt_pb)
pub fn get_amount0_delta(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u128, MathError> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sort_ratios(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if sqrt_ratio_lower == 0 {
        return Err(MathError::PriceOutOfBounds);
    }
    if liquidity == 0 || sqrt_ratio_lower == sqrt_ratio_upper {
        return Ok(0);
    }

    // L * (upper - lower) * 2^96 / upper, then / lower. Each stage keeps the
    // requested rounding direction, so the composition is exact.
    let spread = U256::from_u128(env, liquidity)
        .mul(&U256::from_u128(env, sqrt_ratio_upper - sqrt_ratio_lower));
    let scaled = mul_div_u256(env, &spread, Q96, sqrt_ratio_upper, round_up)?;
    to_u128(&div_u256(env, &scaled, sqrt_ratio_lower, round_up)?)
}

/// Calculate amount1 delta for a price move from sqrt_ratio_a to sqrt_ratio_b
/// delta_y = L * (sqrt_pb - sqrt_pa)
pub fn get_amount1_delta(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u128, MathError> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sort_ratios(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if round_up {
        mul_div_rounding_up(env, liquidity, sqrt_ratio_upper - sqrt_ratio_lower, Q96)
    } else {
        mul_div(env, liquidity, sqrt_ratio_upper - sqrt_ratio_lower, Q96)
    }
}

/// Get next sqrt price after adding an input amount of token0 or token1
pub fn get_next_sqrt_price_from_input(
    env: &Env,
    sqrt_price_x96: u128,
    liquidity: u128,
    amount_in: u128,
    zero_for_one: bool,
) -> Result<u128, MathError> {
    if sqrt_price_x96 == 0 {
        return Err(MathError::PriceOutOfBounds);
    }
    if liquidity == 0 {
        return Err(MathError::DivisionByZero);
    }

    if zero_for_one {
        get_next_sqrt_price_from_amount0_rounding_up(env, sqrt_price_x96, liquidity, amount_in)
    } else {
        get_next_sqrt_price_from_amount1_rounding_down(env, sqrt_price_x96, liquidity, amount_in)
    }
}

/// sqrt_price_next = L * 2^96 / (L * 2^96 / sqrt_price + amount)
///
/// The inner quotient is floored, which can only push the result up. That
/// keeps the price on the side of the pool.
fn get_next_sqrt_price_from_amount0_rounding_up(
    env: &Env,
    sqrt_price_x96: u128,
    liquidity: u128,
    amount: u128,
) -> Result<u128, MathError> {
    if amount == 0 {
        return Ok(sqrt_price_x96);
    }

    let numerator = U256::from_u128(env, liquidity).mul(&U256::from_u128(env, Q96));
    let denominator = numerator
        .div(&U256::from_u128(env, sqrt_price_x96))
        .add(&U256::from_u128(env, amount));

    let result = numerator.div(&denominator);
    let result = if numerator.rem_euclid(&denominator) > U256::from_u32(env, 0) {
        result.add(&U256::from_u32(env, 1))
    } else {
        result
    };
    to_u128(&result)
}

/// sqrt_price_next = sqrt_price + amount * 2^96 / L
fn get_next_sqrt_price_from_amount1_rounding_down(
    env: &Env,
    sqrt_price_x96: u128,
    liquidity: u128,
    amount: u128,
) -> Result<u128, MathError> {
    let quotient = mul_div(env, amount, Q96, liquidity)?;
    sqrt_price_x96
        .checked_add(quotient)
        .ok_or(MathError::Overflow)
}

/// Scale a sqrt price by a WAD factor, e.g. sqrt(0.7) * 1e18
pub fn scale_sqrt_price(
    env: &Env,
    sqrt_price_x96: u128,
    factor_wad: u128,
    round_up: bool,
) -> Result<u128, MathError> {
    if round_up {
        mul_div_rounding_up(env, sqrt_price_x96, factor_wad, WAD)
    } else {
        mul_div(env, sqrt_price_x96, factor_wad, WAD)
    }
}

/// Spot price of token0 in token1 applied to an amount: amount * (sqrt_price / 2^96)^2
pub fn quote_at_sqrt_price(
    env: &Env,
    sqrt_price_x96: u128,
    amount: u128,
    zero_for_one: bool,
) -> Result<u128, MathError> {
    if sqrt_price_x96 == 0 {
        return Err(MathError::PriceOutOfBounds);
    }
    if zero_for_one {
        let partial = mul_div(env, amount, sqrt_price_x96, Q96)?;
        mul_div(env, partial, sqrt_price_x96, Q96)
    } else {
        let partial = mul_div(env, amount, Q96, sqrt_price_x96)?;
        mul_div(env, partial, Q96, sqrt_price_x96)
    }
}
