//! Pay-first settlement.
//!
//! Callers transfer tokens to the pool before invoking it. Whatever the token
//! contracts report above the tracked reserves is the caller's payment; the
//! pool keeps what it is owed and refunds the rest.

use crate::storage::{get_reserves, set_reserves};
use flex_types::PoolConfig;
use soroban_sdk::{token, Address, Env};

/// Tokens held by the pool that no reserve accounts for
pub fn unaccounted(env: &Env, config: &PoolConfig) -> (i128, i128) {
    let reserves = get_reserves(env);
    let this = env.current_contract_address();
    let balance0 = token::Client::new(env, &config.token0).balance(&this);
    let balance1 = token::Client::new(env, &config.token1).balance(&this);
    (balance0 - reserves.reserve0, balance1 - reserves.reserve1)
}

/// Claim `owed0`/`owed1` from the caller's up-front payment and refund the surplus
pub fn settle_payment(env: &Env, config: &PoolConfig, owed0: i128, owed1: i128, refund_to: &Address) {
    let (paid0, paid1) = unaccounted(env, config);
    if paid0 < owed0 || paid1 < owed1 {
        panic!("Insufficient payment");
    }

    let mut reserves = get_reserves(env);
    reserves.reserve0 += owed0;
    reserves.reserve1 += owed1;
    set_reserves(env, &reserves);

    let this = env.current_contract_address();
    if paid0 > owed0 {
        token::Client::new(env, &config.token0).transfer(&this, refund_to, &(paid0 - owed0));
    }
    if paid1 > owed1 {
        token::Client::new(env, &config.token1).transfer(&this, refund_to, &(paid1 - owed1));
    }
}

/// Send tokens out of the reserves
pub fn pay_out(env: &Env, config: &PoolConfig, to: &Address, amount0: i128, amount1: i128) {
    let mut reserves = get_reserves(env);
    if amount0 > reserves.reserve0 || amount1 > reserves.reserve1 {
        panic!("Insufficient reserves");
    }
    reserves.reserve0 -= amount0;
    reserves.reserve1 -= amount1;
    set_reserves(env, &reserves);

    let this = env.current_contract_address();
    if amount0 > 0 {
        token::Client::new(env, &config.token0).transfer(&this, to, &amount0);
    }
    if amount1 > 0 {
        token::Client::new(env, &config.token1).transfer(&this, to, &amount1);
    }
}

pub fn to_i128(amount: u128) -> i128 {
    i128::try_from(amount).unwrap_or_else(|_| panic!("Amount overflow"))
}
