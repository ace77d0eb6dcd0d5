#![no_std]

//! Simulated concentrated-liquidity pool with a built-in single-hop router.
//!
//! Mirrors the external pool and router interfaces the vault consumes, with
//! pay-first settlement in place of swap and mint callbacks.

mod liquidity;
mod payment;
mod storage;
mod swap;
mod tick;

use flex_types::{
    max_liquidity_per_tick, ExactInputSingleParams, MathError, PoolConfig, PoolState,
    PositionInfo, PositionKey, Reserves, TickInfo,
};
use soroban_sdk::{contract, contractimpl, panic_with_error, Address, Env};
use storage::{
    get_config, get_position, get_reserves, get_state, get_tick, is_initialized, is_locked,
    set_config, set_locked, set_state,
};

/// Unwrap a math result, aborting the invocation with the math error code
pub(crate) fn math<T>(env: &Env, result: Result<T, MathError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic_with_error!(env, err),
    }
}

fn require_unlocked(env: &Env) {
    if is_locked(env) {
        panic!("Pool locked");
    }
}

fn check_deadline(env: &Env, deadline: u64) {
    if env.ledger().timestamp() > deadline {
        panic!("Transaction expired");
    }
}

#[contract]
pub struct SimPool;

#[contractimpl]
impl SimPool {
    /// Initialize the pool at a starting price
    pub fn initialize(
        env: Env,
        admin: Address,
        token0: Address,
        token1: Address,
        fee: u32,
        tick_spacing: i32,
        sqrt_price_x96: u128,
    ) {
        if is_initialized(&env) {
            panic!("Already initialized");
        }
        if token0 >= token1 {
            panic!("token0 must be less than token1");
        }
        if tick_spacing <= 0 || fee >= flex_types::FEE_DENOMINATOR {
            panic!("Invalid fee configuration");
        }

        let tick = math(&env, flex_math::get_tick_at_sqrt_ratio(&env, sqrt_price_x96));

        let config = PoolConfig {
            admin,
            token0,
            token1,
            fee,
            tick_spacing,
            max_liquidity_per_tick: max_liquidity_per_tick(tick_spacing),
        };
        set_config(&env, &config);
        set_state(&env, &PoolState::new(sqrt_price_x96, tick));
    }

    /// Swap an exact input amount that was transferred to the pool beforehand
    ///
    /// # Returns
    /// (amount0, amount1) - Negative values are amounts paid out
    pub fn swap(
        env: Env,
        recipient: Address,
        zero_for_one: bool,
        amount_in: i128,
        sqrt_price_limit_x96: u128,
    ) -> (i128, i128) {
        require_unlocked(&env);
        swap::execute_swap(&env, recipient, zero_for_one, amount_in, sqrt_price_limit_x96)
    }

    /// Router facade: single-hop exact input swap
    pub fn exact_input_single(env: Env, params: ExactInputSingleParams) -> i128 {
        require_unlocked(&env);
        check_deadline(&env, params.deadline);

        let config = get_config(&env);
        if params.fee != config.fee {
            panic!("Pool not found");
        }
        let zero_for_one = if params.token_in == config.token0 && params.token_out == config.token1
        {
            true
        } else if params.token_in == config.token1 && params.token_out == config.token0 {
            false
        } else {
            panic!("Pool not found");
        };

        let (amount0, amount1) = swap::execute_swap(
            &env,
            params.recipient,
            zero_for_one,
            params.amount_in,
            params.sqrt_price_limit_x96,
        );

        let amount_out = if zero_for_one { -amount1 } else { -amount0 };
        if amount_out < params.amount_out_minimum {
            panic!("Insufficient output amount");
        }

        amount_out
    }

    /// Add liquidity to a position. The maximum token amounts must already
    /// sit in the pool; the surplus is refunded to the recipient.
    ///
    /// # Returns
    /// (amount0, amount1) - Token amounts deposited
    pub fn mint(
        env: Env,
        recipient: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
    ) -> (u128, u128) {
        require_unlocked(&env);
        recipient.require_auth();
        liquidity::mint(&env, recipient, tick_lower, tick_upper, amount)
    }

    /// Remove liquidity from a position and credit it to tokens owed
    ///
    /// # Returns
    /// (amount0, amount1) - Token amounts released
    pub fn burn(
        env: Env,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
    ) -> (u128, u128) {
        require_unlocked(&env);
        owner.require_auth();
        liquidity::burn(&env, owner, tick_lower, tick_upper, amount)
    }

    /// Collect tokens owed to a position
    ///
    /// # Returns
    /// (amount0, amount1) - Amounts transferred to the recipient
    pub fn collect(
        env: Env,
        owner: Address,
        recipient: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount0_requested: u128,
        amount1_requested: u128,
    ) -> (u128, u128) {
        require_unlocked(&env);
        owner.require_auth();
        liquidity::collect(
            &env,
            owner,
            recipient,
            tick_lower,
            tick_upper,
            amount0_requested,
            amount1_requested,
        )
    }

    /// Admin switch that makes every mutation fail
    pub fn set_locked(env: Env, locked: bool) {
        get_config(&env).admin.require_auth();
        set_locked(&env, locked);
    }

    // === View Functions ===

    pub fn get_state(env: Env) -> PoolState {
        get_state(&env)
    }

    pub fn get_config(env: Env) -> PoolConfig {
        get_config(&env)
    }

    pub fn get_tick(env: Env, tick: i32) -> TickInfo {
        get_tick(&env, tick)
    }

    pub fn get_position(
        env: Env,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
    ) -> PositionInfo {
        let key = PositionKey {
            owner,
            tick_lower,
            tick_upper,
        };
        get_position(&env, &key)
    }

    pub fn reserves(env: Env) -> Reserves {
        get_reserves(&env)
    }

    pub fn sqrt_price_x96(env: Env) -> u128 {
        get_state(&env).sqrt_price_x96
    }

    pub fn tick(env: Env) -> i32 {
        get_state(&env).tick
    }

    pub fn liquidity(env: Env) -> u128 {
        get_state(&env).liquidity
    }

    pub fn token0(env: Env) -> Address {
        get_config(&env).token0
    }

    pub fn token1(env: Env) -> Address {
        get_config(&env).token1
    }

    pub fn fee(env: Env) -> u32 {
        get_config(&env).fee
    }

    pub fn tick_spacing(env: Env) -> i32 {
        get_config(&env).tick_spacing
    }
}
