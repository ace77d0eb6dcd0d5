use flex_types::{PriceRange, RangeBand};
use soroban_sdk::{Address, Env, Symbol};

pub fn initialized(env: &Env, owner: &Address, pool: &Address, band: &RangeBand) {
    env.events().publish(
        (Symbol::new(env, "initialized"),),
        (owner.clone(), pool.clone(), band.clone()),
    );
}

pub fn minted(env: &Env, caller: &Address, amount0: i128, amount1: i128, liquidity: u128) {
    env.events().publish(
        (Symbol::new(env, "minted"),),
        (caller.clone(), amount0, amount1, liquidity),
    );
}

pub fn harvested(env: &Env, range: &PriceRange, amount0: u128, amount1: u128) {
    env.events().publish(
        (Symbol::new(env, "harvested"),),
        (range.tick_lower, range.tick_upper, amount0, amount1),
    );
}

pub fn swapped(env: &Env, zero_for_one: bool, amount_in: i128, amount_out: i128) {
    env.events().publish(
        (Symbol::new(env, "swapped"),),
        (zero_for_one, amount_in, amount_out),
    );
}

pub fn rebalanced(env: &Env, caller: Option<Address>, range: &PriceRange, liquidity: u128) {
    env.events().publish(
        (Symbol::new(env, "rebalanced"),),
        (caller, range.tick_lower, range.tick_upper, liquidity),
    );
}

pub fn burned(env: &Env, recipient: &Address, amount0: i128, amount1: i128) {
    env.events().publish(
        (Symbol::new(env, "burned"),),
        (recipient.clone(), amount0, amount1),
    );
}

pub fn slippage_set(env: &Env, max_slippage_bps: u32) {
    env.events()
        .publish((Symbol::new(env, "slippage_set"),), max_slippage_bps);
}
