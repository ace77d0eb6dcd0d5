use crate::full_math::{mul_div, mul_div_rounding_up};
use crate::sqrt_price_math::{get_amount0_delta, get_amount1_delta, get_next_sqrt_price_from_input};
use flex_types::{MathError, SwapStepResult, FEE_DENOMINATOR};
use soroban_sdk::Env;

/// Compute the result of swapping an exact input within a single tick range
///
/// # Arguments
/// * `sqrt_ratio_current_x96` - Current sqrt price
/// * `sqrt_ratio_target_x96` - Target sqrt price (next tick boundary or price limit)
/// * `liquidity` - Available liquidity in this range
/// * `amount_remaining` - Input still to be swapped, fee included
/// * `fee_pips` - Fee in hundredths of a bip (e.g., 3000 = 0.3%)
pub fn compute_swap_step(
    env: &Env,
    sqrt_ratio_current_x96: u128,
    sqrt_ratio_target_x96: u128,
    liquidity: u128,
    amount_remaining: u128,
    fee_pips: u32,
) -> Result<SwapStepResult, MathError> {
    if fee_pips >= FEE_DENOMINATOR {
        return Err(MathError::Overflow);
    }
    let zero_for_one = sqrt_ratio_current_x96 >= sqrt_ratio_target_x96;
    let fee_complement = (FEE_DENOMINATOR - fee_pips) as u128;

    let amount_remaining_less_fee =
        mul_div(env, amount_remaining, fee_complement, FEE_DENOMINATOR as u128)?;

    // Input needed to reach the target
    let amount_in_to_target = if zero_for_one {
        get_amount0_delta(env, sqrt_ratio_target_x96, sqrt_ratio_current_x96, liquidity, true)?
    } else {
        get_amount1_delta(env, sqrt_ratio_current_x96, sqrt_ratio_target_x96, liquidity, true)?
    };

    let sqrt_ratio_next_x96 = if amount_remaining_less_fee >= amount_in_to_target {
        sqrt_ratio_target_x96
    } else {
        get_next_sqrt_price_from_input(
            env,
            sqrt_ratio_current_x96,
            liquidity,
            amount_remaining_less_fee,
            zero_for_one,
        )?
    };

    let max = sqrt_ratio_target_x96 == sqrt_ratio_next_x96;

    let (amount_in, amount_out) = if zero_for_one {
        let amount_in = if max {
            amount_in_to_target
        } else {
            get_amount0_delta(env, sqrt_ratio_next_x96, sqrt_ratio_current_x96, liquidity, true)?
        };
        let amount_out =
            get_amount1_delta(env, sqrt_ratio_next_x96, sqrt_ratio_current_x96, liquidity, false)?;
        (amount_in, amount_out)
    } else {
        let amount_in = if max {
            amount_in_to_target
        } else {
            get_amount1_delta(env, sqrt_ratio_current_x96, sqrt_ratio_next_x96, liquidity, true)?
        };
        let amount_out =
            get_amount0_delta(env, sqrt_ratio_current_x96, sqrt_ratio_next_x96, liquidity, false)?;
        (amount_in, amount_out)
    };

    let fee_amount = if max {
        mul_div_rounding_up(env, amount_in, fee_pips as u128, fee_complement)?
    } else {
        // Target not reached: whatever was not consumed is the fee
        amount_remaining
            .checked_sub(amount_in)
            .ok_or(MathError::Overflow)?
    };

    Ok(SwapStepResult {
        sqrt_price_next_x96: sqrt_ratio_next_x96,
        amount_in,
        amount_out,
        fee_amount,
    })
}
