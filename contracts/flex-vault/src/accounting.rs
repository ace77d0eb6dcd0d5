//! Read-only valuation of everything the vault controls.

use crate::error::{to_i128, to_u128, VaultError};
use crate::pool;
use crate::position::amounts_for_liquidity;
use crate::storage::{get_range, VaultConfig};
use flex_math::{get_fee_growth_inside, pending_fees};
use soroban_sdk::{token, Env};

/// Principal and fee parts of the open position
struct PositionValue {
    principal0: u128,
    principal1: u128,
    fees0: u128,
    fees1: u128,
}

/// Token balances sitting in the vault contract
pub fn idle_balances(env: &Env, config: &VaultConfig) -> Result<(u128, u128), VaultError> {
    let vault = env.current_contract_address();
    let balance0 = token::Client::new(env, &config.token0).balance(&vault);
    let balance1 = token::Client::new(env, &config.token1).balance(&vault);
    Ok((to_u128(balance0)?, to_u128(balance1)?))
}

fn position_value(env: &Env, config: &VaultConfig) -> Result<Option<PositionValue>, VaultError> {
    let Some(range) = get_range(env) else {
        return Ok(None);
    };

    let vault = env.current_contract_address();
    let state = pool::get_state(env, &config.pool)?;
    let info = pool::get_position(
        env,
        &config.pool,
        &vault,
        range.tick_lower,
        range.tick_upper,
    )?;

    let (principal0, principal1) =
        amounts_for_liquidity(env, info.liquidity, &range, state.sqrt_price_x96, false)?;

    let lower = pool::get_tick(env, &config.pool, range.tick_lower)?;
    let upper = pool::get_tick(env, &config.pool, range.tick_upper)?;
    let (inside0, inside1) = get_fee_growth_inside(
        &lower,
        &upper,
        range.tick_lower,
        range.tick_upper,
        state.tick,
        state.fee_growth_global_0_x64,
        state.fee_growth_global_1_x64,
    );

    let pending0 = pending_fees(
        env,
        info.liquidity,
        inside0,
        info.fee_growth_inside_0_last_x64,
    )?;
    let pending1 = pending_fees(
        env,
        info.liquidity,
        inside1,
        info.fee_growth_inside_1_last_x64,
    )?;

    Ok(Some(PositionValue {
        principal0,
        principal1,
        fees0: info
            .tokens_owed_0
            .checked_add(pending0)
            .ok_or(VaultError::Overflow)?,
        fees1: info
            .tokens_owed_1
            .checked_add(pending1)
            .ok_or(VaultError::Overflow)?,
    }))
}

/// Principal of the open position at the current pool price, rounded down
pub fn get_position_amounts(env: &Env, config: &VaultConfig) -> Result<(i128, i128), VaultError> {
    match position_value(env, config)? {
        Some(value) => Ok((to_i128(value.principal0)?, to_i128(value.principal1)?)),
        None => Ok((0, 0)),
    }
}

/// Tokens owed plus fees accrued since the position's last checkpoint
pub fn get_fees_earned(env: &Env, config: &VaultConfig) -> Result<(i128, i128), VaultError> {
    match position_value(env, config)? {
        Some(value) => Ok((to_i128(value.fees0)?, to_i128(value.fees1)?)),
        None => Ok((0, 0)),
    }
}

/// Idle balances plus principal plus fees
pub fn get_underlying_balances(
    env: &Env,
    config: &VaultConfig,
) -> Result<(i128, i128), VaultError> {
    let (mut amount0, mut amount1) = idle_balances(env, config)?;

    if let Some(value) = position_value(env, config)? {
        amount0 = amount0
            .checked_add(value.principal0)
            .and_then(|a| a.checked_add(value.fees0))
            .ok_or(VaultError::Overflow)?;
        amount1 = amount1
            .checked_add(value.principal1)
            .and_then(|a| a.checked_add(value.fees1))
            .ok_or(VaultError::Overflow)?;
    }

    Ok((to_i128(amount0)?, to_i128(amount1)?))
}
