use crate::math;
use crate::payment::{pay_out, settle_payment, to_i128};
use crate::storage::{get_config, get_state, set_state, MAX_TICK_CROSSINGS_PER_SWAP};
use crate::tick::{cross, next_initialized_tick_within_one_word};
use flex_math::{
    add_delta, compute_swap_step, fee_growth_delta_x64, get_sqrt_ratio_at_tick,
    get_tick_at_sqrt_ratio,
};
use flex_types::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};
use soroban_sdk::{Address, Env, Symbol};

/// Execute an exact-input swap paid up front.
///
/// Stops early at the price limit or after `MAX_TICK_CROSSINGS_PER_SWAP`
/// initialized ticks; unused input is refunded to the recipient.
///
/// # Returns
/// (amount0, amount1) - positive is paid into the pool, negative paid out
pub fn execute_swap(
    env: &Env,
    recipient: Address,
    zero_for_one: bool,
    amount_in: i128,
    sqrt_price_limit_x96: u128,
) -> (i128, i128) {
    if amount_in <= 0 {
        panic!("Amount must be positive");
    }

    let config = get_config(env);
    let mut state = get_state(env);

    let sqrt_price_limit = if sqrt_price_limit_x96 == 0 {
        if zero_for_one {
            MIN_SQRT_RATIO + 1
        } else {
            MAX_SQRT_RATIO - 1
        }
    } else {
        sqrt_price_limit_x96
    };

    let limit_valid = if zero_for_one {
        sqrt_price_limit < state.sqrt_price_x96 && sqrt_price_limit > MIN_SQRT_RATIO
    } else {
        sqrt_price_limit > state.sqrt_price_x96 && sqrt_price_limit < MAX_SQRT_RATIO
    };
    if !limit_valid {
        panic!("Invalid price limit");
    }

    let mut amount_remaining = amount_in as u128;
    let mut amount_out: u128 = 0;
    let mut sqrt_price_x96 = state.sqrt_price_x96;
    let mut tick = state.tick;
    let mut liquidity = state.liquidity;
    let mut fee_growth_global_x64 = if zero_for_one {
        state.fee_growth_global_0_x64
    } else {
        state.fee_growth_global_1_x64
    };
    let mut tick_crossings: u32 = 0;

    while amount_remaining != 0
        && sqrt_price_x96 != sqrt_price_limit
        && tick_crossings < MAX_TICK_CROSSINGS_PER_SWAP
    {
        let sqrt_price_start_x96 = sqrt_price_x96;

        let (tick_next, initialized) =
            next_initialized_tick_within_one_word(env, tick, config.tick_spacing, zero_for_one);
        let tick_next = tick_next.clamp(MIN_TICK, MAX_TICK);
        let sqrt_price_next_x96 = math(env, get_sqrt_ratio_at_tick(env, tick_next));

        let sqrt_ratio_target_x96 = if zero_for_one {
            sqrt_price_next_x96.max(sqrt_price_limit)
        } else {
            sqrt_price_next_x96.min(sqrt_price_limit)
        };

        let step = math(
            env,
            compute_swap_step(
                env,
                sqrt_price_x96,
                sqrt_ratio_target_x96,
                liquidity,
                amount_remaining,
                config.fee,
            ),
        );

        amount_remaining -= step.amount_in + step.fee_amount;
        amount_out += step.amount_out;

        if liquidity > 0 {
            let delta = math(env, fee_growth_delta_x64(env, step.fee_amount, liquidity));
            fee_growth_global_x64 = fee_growth_global_x64.wrapping_add(delta);
        }

        sqrt_price_x96 = step.sqrt_price_next_x96;

        if sqrt_price_x96 == sqrt_price_next_x96 {
            if initialized {
                let (growth_0, growth_1) = if zero_for_one {
                    (fee_growth_global_x64, state.fee_growth_global_1_x64)
                } else {
                    (state.fee_growth_global_0_x64, fee_growth_global_x64)
                };
                let liquidity_net = cross(env, tick_next, growth_0, growth_1);

                // Moving left, a lower tick takes liquidity away
                let liquidity_net = if zero_for_one {
                    -liquidity_net
                } else {
                    liquidity_net
                };
                liquidity = math(env, add_delta(liquidity, liquidity_net));
                tick_crossings += 1;
            }

            tick = if zero_for_one { tick_next - 1 } else { tick_next };
        } else if sqrt_price_x96 != sqrt_price_start_x96 {
            tick = math(env, get_tick_at_sqrt_ratio(env, sqrt_price_x96));
        }
    }

    state.sqrt_price_x96 = sqrt_price_x96;
    state.tick = tick;
    state.liquidity = liquidity;
    if zero_for_one {
        state.fee_growth_global_0_x64 = fee_growth_global_x64;
    } else {
        state.fee_growth_global_1_x64 = fee_growth_global_x64;
    }
    set_state(env, &state);

    let consumed = to_i128(amount_in as u128 - amount_remaining);
    let amount_out = to_i128(amount_out);

    let (amount0, amount1) = if zero_for_one {
        settle_payment(env, &config, consumed, 0, &recipient);
        pay_out(env, &config, &recipient, 0, amount_out);
        (consumed, -amount_out)
    } else {
        settle_payment(env, &config, 0, consumed, &recipient);
        pay_out(env, &config, &recipient, amount_out, 0);
        (-amount_out, consumed)
    };

    env.events().publish(
        (Symbol::new(env, "swap"),),
        (recipient, amount0, amount1, state.sqrt_price_x96, state.tick),
    );

    (amount0, amount1)
}
