use crate::math;
use crate::payment::{pay_out, settle_payment, to_i128};
use crate::storage::{get_config, get_position, get_state, set_position, set_state};
use crate::tick::{clear as clear_tick, flip_tick, get_fee_growth_inside, update as update_tick};
use flex_math::{add_delta, get_amounts_for_liquidity, get_sqrt_ratio_at_tick, pending_fees};
use flex_types::{PoolConfig, PoolState, PositionKey, MAX_TICK, MIN_TICK};
use soroban_sdk::{Address, Env, Symbol};

/// Mint (add) liquidity to a position, paid up front
///
/// # Returns
/// (amount0, amount1) - Token amounts the position took, rounded up
pub fn mint(
    env: &Env,
    recipient: Address,
    tick_lower: i32,
    tick_upper: i32,
    amount: u128,
) -> (u128, u128) {
    if amount == 0 {
        panic!("Amount must be non-zero");
    }
    let liquidity_delta =
        i128::try_from(amount).unwrap_or_else(|_| panic!("Liquidity overflow"));

    let config = get_config(env);
    let mut state = get_state(env);

    let (amount0, amount1) = modify_position(
        env,
        &config,
        &mut state,
        &recipient,
        tick_lower,
        tick_upper,
        liquidity_delta,
    );

    settle_payment(env, &config, to_i128(amount0), to_i128(amount1), &recipient);

    env.events().publish(
        (Symbol::new(env, "mint"),),
        (recipient, tick_lower, tick_upper, amount, amount0, amount1),
    );

    (amount0, amount1)
}

/// Burn (remove) liquidity from a position.
/// The released amounts are credited to tokens owed, not transferred.
pub fn burn(
    env: &Env,
    owner: Address,
    tick_lower: i32,
    tick_upper: i32,
    amount: u128,
) -> (u128, u128) {
    let liquidity_delta =
        i128::try_from(amount).unwrap_or_else(|_| panic!("Liquidity overflow"));

    let config = get_config(env);
    let mut state = get_state(env);

    let (amount0, amount1) = modify_position(
        env,
        &config,
        &mut state,
        &owner,
        tick_lower,
        tick_upper,
        -liquidity_delta,
    );

    let key = PositionKey {
        owner: owner.clone(),
        tick_lower,
        tick_upper,
    };
    if amount0 > 0 || amount1 > 0 {
        let mut position = get_position(env, &key);
        position.tokens_owed_0 = math(env, add_delta(position.tokens_owed_0, to_i128(amount0)));
        position.tokens_owed_1 = math(env, add_delta(position.tokens_owed_1, to_i128(amount1)));
        set_position(env, &key, &position);
    }

    env.events().publish(
        (Symbol::new(env, "burn"),),
        (owner, tick_lower, tick_upper, amount, amount0, amount1),
    );

    (amount0, amount1)
}

/// Collect tokens owed to a position (burned principal and fees)
pub fn collect(
    env: &Env,
    owner: Address,
    recipient: Address,
    tick_lower: i32,
    tick_upper: i32,
    amount0_requested: u128,
    amount1_requested: u128,
) -> (u128, u128) {
    let config = get_config(env);

    let key = PositionKey {
        owner: owner.clone(),
        tick_lower,
        tick_upper,
    };
    let mut position = get_position(env, &key);

    let amount0 = amount0_requested.min(position.tokens_owed_0);
    let amount1 = amount1_requested.min(position.tokens_owed_1);

    position.tokens_owed_0 -= amount0;
    position.tokens_owed_1 -= amount1;
    set_position(env, &key, &position);

    pay_out(env, &config, &recipient, to_i128(amount0), to_i128(amount1));

    env.events().publish(
        (Symbol::new(env, "collect"),),
        (owner, recipient, tick_lower, tick_upper, amount0, amount1),
    );

    (amount0, amount1)
}

/// Apply a liquidity change to ticks, position and in-range liquidity.
/// Returns the token amounts the change is worth: rounded up when adding,
/// rounded down when removing.
fn modify_position(
    env: &Env,
    config: &PoolConfig,
    state: &mut PoolState,
    owner: &Address,
    tick_lower: i32,
    tick_upper: i32,
    liquidity_delta: i128,
) -> (u128, u128) {
    validate_ticks(tick_lower, tick_upper, config.tick_spacing);

    let mut flipped_lower = false;
    let mut flipped_upper = false;

    if liquidity_delta != 0 {
        flipped_lower = update_tick(
            env,
            tick_lower,
            state.tick,
            liquidity_delta,
            state.fee_growth_global_0_x64,
            state.fee_growth_global_1_x64,
            false,
            config.max_liquidity_per_tick,
        );
        flipped_upper = update_tick(
            env,
            tick_upper,
            state.tick,
            liquidity_delta,
            state.fee_growth_global_0_x64,
            state.fee_growth_global_1_x64,
            true,
            config.max_liquidity_per_tick,
        );

        if flipped_lower {
            flip_tick(env, tick_lower, config.tick_spacing);
        }
        if flipped_upper {
            flip_tick(env, tick_upper, config.tick_spacing);
        }
    }

    let (fee_growth_inside_0, fee_growth_inside_1) = get_fee_growth_inside(
        env,
        tick_lower,
        tick_upper,
        state.tick,
        state.fee_growth_global_0_x64,
        state.fee_growth_global_1_x64,
    );

    let key = PositionKey {
        owner: owner.clone(),
        tick_lower,
        tick_upper,
    };
    update_position(env, &key, liquidity_delta, fee_growth_inside_0, fee_growth_inside_1);

    if liquidity_delta < 0 {
        if flipped_lower {
            clear_tick(env, tick_lower);
        }
        if flipped_upper {
            clear_tick(env, tick_upper);
        }
    }

    if liquidity_delta == 0 {
        return (0, 0);
    }

    if state.tick >= tick_lower && state.tick < tick_upper {
        state.liquidity = math(env, add_delta(state.liquidity, liquidity_delta));
        set_state(env, state);
    }

    let sqrt_ratio_lower = math(env, get_sqrt_ratio_at_tick(env, tick_lower));
    let sqrt_ratio_upper = math(env, get_sqrt_ratio_at_tick(env, tick_upper));

    math(
        env,
        get_amounts_for_liquidity(
            env,
            state.sqrt_price_x96,
            sqrt_ratio_lower,
            sqrt_ratio_upper,
            liquidity_delta.unsigned_abs(),
            liquidity_delta > 0,
        ),
    )
}

/// Checkpoint accrued fees into tokens owed, then apply the liquidity change
fn update_position(
    env: &Env,
    key: &PositionKey,
    liquidity_delta: i128,
    fee_growth_inside_0_x64: u128,
    fee_growth_inside_1_x64: u128,
) {
    let mut position = get_position(env, key);

    if liquidity_delta == 0 && position.liquidity == 0 {
        panic!("No liquidity to poke");
    }

    if position.liquidity > 0 {
        let fees_0 = math(
            env,
            pending_fees(
                env,
                position.liquidity,
                fee_growth_inside_0_x64,
                position.fee_growth_inside_0_last_x64,
            ),
        );
        let fees_1 = math(
            env,
            pending_fees(
                env,
                position.liquidity,
                fee_growth_inside_1_x64,
                position.fee_growth_inside_1_last_x64,
            ),
        );
        position.tokens_owed_0 = position.tokens_owed_0.saturating_add(fees_0);
        position.tokens_owed_1 = position.tokens_owed_1.saturating_add(fees_1);
    }

    position.liquidity = math(env, add_delta(position.liquidity, liquidity_delta));
    position.fee_growth_inside_0_last_x64 = fee_growth_inside_0_x64;
    position.fee_growth_inside_1_last_x64 = fee_growth_inside_1_x64;

    set_position(env, key, &position);
}

fn validate_ticks(tick_lower: i32, tick_upper: i32, tick_spacing: i32) {
    if tick_lower >= tick_upper {
        panic!("tick_lower must be less than tick_upper");
    }
    if tick_lower < MIN_TICK {
        panic!("tick_lower too low");
    }
    if tick_upper > MAX_TICK {
        panic!("tick_upper too high");
    }
    if tick_lower % tick_spacing != 0 || tick_upper % tick_spacing != 0 {
        panic!("Tick not on spacing");
    }
}
