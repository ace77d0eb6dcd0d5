use crate::math;
use crate::storage::{get_tick, get_tick_bitmap_word, remove_tick, set_tick, set_tick_bitmap_word};
use flex_math::add_delta;
use soroban_sdk::Env;

/// Update a tick with liquidity delta
/// Returns true if the tick was flipped (initialized or uninitialized)
#[allow(clippy::too_many_arguments)]
pub fn update(
    env: &Env,
    tick: i32,
    tick_current: i32,
    liquidity_delta: i128,
    fee_growth_global_0_x64: u128,
    fee_growth_global_1_x64: u128,
    upper: bool,
    max_liquidity: u128,
) -> bool {
    let mut info = get_tick(env, tick);

    let liquidity_gross_before = info.liquidity_gross;
    let liquidity_gross_after = math(env, add_delta(liquidity_gross_before, liquidity_delta));

    if liquidity_gross_after > max_liquidity {
        panic!("Liquidity exceeds tick maximum");
    }

    let flipped = (liquidity_gross_after == 0) != (liquidity_gross_before == 0);

    if liquidity_gross_before == 0 {
        // By convention all growth before a tick is initialized happened below it
        if tick <= tick_current {
            info.fee_growth_outside_0_x64 = fee_growth_global_0_x64;
            info.fee_growth_outside_1_x64 = fee_growth_global_1_x64;
        }
        info.initialized = true;
    }

    info.liquidity_gross = liquidity_gross_after;

    // Lower ticks add liquidity when crossed left to right, upper ticks remove it
    info.liquidity_net = if upper {
        info.liquidity_net - liquidity_delta
    } else {
        info.liquidity_net + liquidity_delta
    };

    set_tick(env, tick, &info);

    flipped
}

/// Drop a tick that no longer backs any position
pub fn clear(env: &Env, tick: i32) {
    remove_tick(env, tick);
}

/// Cross a tick during a swap
/// Returns the tick's liquidity_net
pub fn cross(
    env: &Env,
    tick: i32,
    fee_growth_global_0_x64: u128,
    fee_growth_global_1_x64: u128,
) -> i128 {
    let mut info = get_tick(env, tick);

    info.fee_growth_outside_0_x64 =
        fee_growth_global_0_x64.wrapping_sub(info.fee_growth_outside_0_x64);
    info.fee_growth_outside_1_x64 =
        fee_growth_global_1_x64.wrapping_sub(info.fee_growth_outside_1_x64);

    set_tick(env, tick, &info);

    info.liquidity_net
}

/// Get fee growth inside a tick range from stored tick data
pub fn get_fee_growth_inside(
    env: &Env,
    tick_lower: i32,
    tick_upper: i32,
    tick_current: i32,
    fee_growth_global_0_x64: u128,
    fee_growth_global_1_x64: u128,
) -> (u128, u128) {
    flex_math::get_fee_growth_inside(
        &get_tick(env, tick_lower),
        &get_tick(env, tick_upper),
        tick_lower,
        tick_upper,
        tick_current,
        fee_growth_global_0_x64,
        fee_growth_global_1_x64,
    )
}

// === Tick Bitmap Operations ===
// One u128 word covers 128 compressed ticks

/// Tick index divided by spacing, rounded toward negative infinity
fn compress(tick: i32, tick_spacing: i32) -> i32 {
    tick.div_euclid(tick_spacing)
}

/// Flip a tick in the bitmap
pub fn flip_tick(env: &Env, tick: i32, tick_spacing: i32) {
    if tick % tick_spacing != 0 {
        panic!("Tick not on spacing");
    }

    let compressed = compress(tick, tick_spacing);
    let word_pos = compressed >> 7;
    let bit_pos = compressed.rem_euclid(128) as u32;

    let word = get_tick_bitmap_word(env, word_pos);
    set_tick_bitmap_word(env, word_pos, word ^ (1u128 << bit_pos));
}

/// Find the next initialized tick within one word
/// Returns (tick, initialized)
pub fn next_initialized_tick_within_one_word(
    env: &Env,
    tick: i32,
    tick_spacing: i32,
    lte: bool,
) -> (i32, bool) {
    let compressed = compress(tick, tick_spacing);

    if lte {
        let word_pos = compressed >> 7;
        let bit_pos = compressed.rem_euclid(128) as u32;

        // Bits at or below the current position
        let mask = if bit_pos == 127 {
            u128::MAX
        } else {
            (1u128 << (bit_pos + 1)) - 1
        };
        let masked = get_tick_bitmap_word(env, word_pos) & mask;

        let initialized = masked != 0;
        let next = if initialized {
            let msb = 127 - masked.leading_zeros() as i32;
            (compressed - (bit_pos as i32 - msb)) * tick_spacing
        } else {
            (compressed - bit_pos as i32) * tick_spacing
        };

        (next, initialized)
    } else {
        let compressed = compressed + 1;
        let word_pos = compressed >> 7;
        let bit_pos = compressed.rem_euclid(128) as u32;

        // Bits at or above the current position
        let mask = !((1u128 << bit_pos) - 1);
        let masked = get_tick_bitmap_word(env, word_pos) & mask;

        let initialized = masked != 0;
        let next = if initialized {
            let lsb = masked.trailing_zeros() as i32;
            (compressed + (lsb - bit_pos as i32)) * tick_spacing
        } else {
            (compressed + (127 - bit_pos as i32)) * tick_spacing
        };

        (next, initialized)
    }
}
