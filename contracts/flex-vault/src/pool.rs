//! Calls into the external pool and swap router.
//!
//! Every call goes through `try_invoke_contract` so a rejection on the other
//! side surfaces as `ExternalCallFailed` instead of trapping the vault.

use crate::error::VaultError;
use flex_types::{ExactInputSingleParams, PoolState, PositionInfo, TickInfo};
use soroban_sdk::{log, Address, Env, IntoVal, Symbol, TryFromVal, Val, Vec};

fn invoke<T>(env: &Env, contract: &Address, func: &str, args: Vec<Val>) -> Result<T, VaultError>
where
    T: TryFromVal<Env, Val>,
{
    let func = Symbol::new(env, func);
    match env.try_invoke_contract::<T, soroban_sdk::Error>(contract, &func, args) {
        Ok(Ok(value)) => Ok(value),
        _ => {
            log!(env, "external call failed", func);
            Err(VaultError::ExternalCallFailed)
        }
    }
}

// === Pool views ===

pub fn token0(env: &Env, pool: &Address) -> Result<Address, VaultError> {
    invoke(env, pool, "token0", ().into_val(env))
}

pub fn token1(env: &Env, pool: &Address) -> Result<Address, VaultError> {
    invoke(env, pool, "token1", ().into_val(env))
}

pub fn fee(env: &Env, pool: &Address) -> Result<u32, VaultError> {
    invoke(env, pool, "fee", ().into_val(env))
}

pub fn tick_spacing(env: &Env, pool: &Address) -> Result<i32, VaultError> {
    invoke(env, pool, "tick_spacing", ().into_val(env))
}

pub fn get_state(env: &Env, pool: &Address) -> Result<PoolState, VaultError> {
    invoke(env, pool, "get_state", ().into_val(env))
}

pub fn get_tick(env: &Env, pool: &Address, tick: i32) -> Result<TickInfo, VaultError> {
    invoke(env, pool, "get_tick", (tick,).into_val(env))
}

pub fn get_position(
    env: &Env,
    pool: &Address,
    owner: &Address,
    tick_lower: i32,
    tick_upper: i32,
) -> Result<PositionInfo, VaultError> {
    invoke(
        env,
        pool,
        "get_position",
        (owner, tick_lower, tick_upper).into_val(env),
    )
}

// === Pool mutations ===

/// Add liquidity. The token maxima must already be transferred to the pool.
pub fn mint(
    env: &Env,
    pool: &Address,
    recipient: &Address,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
) -> Result<(u128, u128), VaultError> {
    invoke(
        env,
        pool,
        "mint",
        (recipient, tick_lower, tick_upper, liquidity).into_val(env),
    )
}

pub fn burn(
    env: &Env,
    pool: &Address,
    owner: &Address,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
) -> Result<(u128, u128), VaultError> {
    invoke(
        env,
        pool,
        "burn",
        (owner, tick_lower, tick_upper, liquidity).into_val(env),
    )
}

pub fn collect(
    env: &Env,
    pool: &Address,
    owner: &Address,
    recipient: &Address,
    tick_lower: i32,
    tick_upper: i32,
    amount0_max: u128,
    amount1_max: u128,
) -> Result<(u128, u128), VaultError> {
    invoke(
        env,
        pool,
        "collect",
        (owner, recipient, tick_lower, tick_upper, amount0_max, amount1_max).into_val(env),
    )
}

// === Router ===

/// Single-hop exact input swap. The input must already be transferred to the router.
pub fn exact_input_single(
    env: &Env,
    router: &Address,
    params: &ExactInputSingleParams,
) -> Result<i128, VaultError> {
    invoke(env, router, "exact_input_single", (params.clone(),).into_val(env))
}
