//! Harvest, swap, re-range and re-mint.
//!
//! All steps run inside one contract invocation; any error rolls the whole
//! sequence back, including the harvest.

use crate::accounting::idle_balances;
use crate::error::{to_i128, to_u128, VaultError};
use crate::events;
use crate::pool;
use crate::position::{amounts_for_liquidity, amounts_to_liquidity, compute_range};
use crate::storage::{clear_range, get_range, set_range, VaultConfig, SWAP_DEADLINE_SECS};
use flex_math::quote_at_sqrt_price;
use flex_types::{
    ExactInputSingleParams, PriceRange, BPS_DENOMINATOR, MAX_SQRT_RATIO, MIN_SQRT_RATIO,
};
use soroban_fixed_point_math::FixedPoint;
use soroban_sdk::{log, token, Address, Env};

/// Close the open position, if any, and collect principal and fees into the vault
///
/// # Returns
/// (amount0, amount1) - Tokens collected
pub fn harvest(env: &Env, config: &VaultConfig) -> Result<(u128, u128), VaultError> {
    let Some(range) = get_range(env) else {
        return Ok((0, 0));
    };

    let vault = env.current_contract_address();
    let info = pool::get_position(
        env,
        &config.pool,
        &vault,
        range.tick_lower,
        range.tick_upper,
    )?;

    // Burning checkpoints fees into tokens owed
    if info.liquidity > 0 {
        pool::burn(
            env,
            &config.pool,
            &vault,
            range.tick_lower,
            range.tick_upper,
            info.liquidity,
        )?;
    }

    let (amount0, amount1) = pool::collect(
        env,
        &config.pool,
        &vault,
        &vault,
        range.tick_lower,
        range.tick_upper,
        u128::MAX,
        u128::MAX,
    )?;

    clear_range(env);
    events::harvested(env, &range, amount0, amount1);

    Ok((amount0, amount1))
}

/// Open a position in a fresh range at the current pool price with the most
/// liquidity the idle balances fund.
///
/// The idle balances are paid to the pool up front; the pool keeps what the
/// liquidity needs and refunds the rest.
pub fn open_position(env: &Env, config: &VaultConfig) -> Result<(PriceRange, u128), VaultError> {
    let vault = env.current_contract_address();
    let state = pool::get_state(env, &config.pool)?;
    let range = compute_range(env, state.sqrt_price_x96, &config.band, config.tick_spacing)?;

    let (idle0, idle1) = idle_balances(env, config)?;
    let liquidity = amounts_to_liquidity(
        env,
        idle0,
        idle1,
        &range,
        state.sqrt_price_x96,
        config.min_liquidity,
    )?;
    if liquidity == 0 {
        return Err(VaultError::InsufficientLiquidity);
    }

    if idle0 > 0 {
        token::Client::new(env, &config.token0).transfer(&vault, &config.pool, &to_i128(idle0)?);
    }
    if idle1 > 0 {
        token::Client::new(env, &config.token1).transfer(&vault, &config.pool, &to_i128(idle1)?);
    }

    let (amount0, amount1) = pool::mint(
        env,
        &config.pool,
        &vault,
        range.tick_lower,
        range.tick_upper,
        liquidity,
    )?;
    log!(env, "position opened", liquidity, amount0, amount1);

    set_range(env, &range);
    Ok((range, liquidity))
}

/// Swap `swap_bps` of the input token left over after sizing a position at
/// the current price.
///
/// # Returns
/// (amount_in, amount_out) - Zero when there is nothing to swap
pub fn rebalance_swap(
    env: &Env,
    config: &VaultConfig,
    swap_bps: u32,
    zero_for_one: bool,
) -> Result<(i128, i128), VaultError> {
    let state = pool::get_state(env, &config.pool)?;
    let range = compute_range(env, state.sqrt_price_x96, &config.band, config.tick_spacing)?;

    let (idle0, idle1) = idle_balances(env, config)?;
    let liquidity = amounts_to_liquidity(env, idle0, idle1, &range, state.sqrt_price_x96, 0)?;
    let (needed0, needed1) =
        amounts_for_liquidity(env, liquidity, &range, state.sqrt_price_x96, true)?;

    let leftover = if zero_for_one {
        idle0.saturating_sub(needed0)
    } else {
        idle1.saturating_sub(needed1)
    };

    let amount_in = to_i128(leftover)?
        .fixed_mul_floor(swap_bps as i128, BPS_DENOMINATOR as i128)
        .ok_or(VaultError::Overflow)?;
    if amount_in == 0 {
        return Ok((0, 0));
    }

    let quote = quote_at_sqrt_price(env, state.sqrt_price_x96, to_u128(amount_in)?, zero_for_one)?;
    let amount_out_minimum = to_i128(quote)?
        .fixed_mul_floor(
            (BPS_DENOMINATOR - config.max_slippage_bps) as i128,
            BPS_DENOMINATOR as i128,
        )
        .ok_or(VaultError::Overflow)?;

    let (token_in, token_out) = if zero_for_one {
        (config.token0.clone(), config.token1.clone())
    } else {
        (config.token1.clone(), config.token0.clone())
    };

    let vault = env.current_contract_address();
    token::Client::new(env, &token_in).transfer(&vault, &config.router, &amount_in);

    // The minimum is enforced here rather than by the router so a shortfall
    // reports as SlippageExceeded
    let params = ExactInputSingleParams {
        token_in,
        token_out,
        fee: config.fee,
        recipient: vault,
        deadline: env.ledger().timestamp() + SWAP_DEADLINE_SECS,
        amount_in,
        amount_out_minimum: 0,
        sqrt_price_limit_x96: if zero_for_one {
            MIN_SQRT_RATIO + 1
        } else {
            MAX_SQRT_RATIO - 1
        },
    };
    let amount_out = pool::exact_input_single(env, &config.router, &params)?;

    if amount_out < amount_out_minimum {
        return Err(VaultError::SlippageExceeded);
    }

    events::swapped(env, zero_for_one, amount_in, amount_out);
    Ok((amount_in, amount_out))
}

/// Harvest, swap, recompute the range and re-mint
///
/// # Returns
/// Liquidity of the new position
pub fn run(
    env: &Env,
    config: &VaultConfig,
    caller: Option<Address>,
    swap_bps: u32,
    zero_for_one: bool,
) -> Result<u128, VaultError> {
    if swap_bps > BPS_DENOMINATOR {
        return Err(VaultError::InvalidBasisPoints);
    }

    harvest(env, config)?;
    rebalance_swap(env, config, swap_bps, zero_for_one)?;
    let (range, liquidity) = open_position(env, config)?;

    events::rebalanced(env, caller, &range, liquidity);
    Ok(liquidity)
}
