//! Range placement and amount/liquidity conversion for the vault's position.

use crate::error::VaultError;
use flex_math::{
    get_amounts_for_liquidity, get_liquidity_for_amounts, get_sqrt_ratio_at_tick,
    get_tick_at_sqrt_ratio, max_usable_tick, min_usable_tick, scale_sqrt_price, snap_tick_down,
    snap_tick_up,
};
use flex_types::{PositionKey, PriceRange, RangeBand, MAX_SQRT_RATIO, MIN_SQRT_RATIO};
use soroban_sdk::{Address, Env};

/// Place a band around `reference_sqrt_price_x96` and snap it outward to the
/// tick spacing.
///
/// The lower bound is the greatest spaced tick at or below
/// `ref * sqrt_lower_wad`, the upper bound the least spaced tick at or above
/// `ref * sqrt_upper_wad`, so the realized range is never narrower than the
/// band. Both are clamped to the usable tick range.
pub fn compute_range(
    env: &Env,
    reference_sqrt_price_x96: u128,
    band: &RangeBand,
    tick_spacing: i32,
) -> Result<PriceRange, VaultError> {
    if reference_sqrt_price_x96 < MIN_SQRT_RATIO || reference_sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(VaultError::PriceOutOfBounds);
    }
    if !band.is_valid() {
        return Err(VaultError::InvalidConfig);
    }

    let min_tick = min_usable_tick(tick_spacing)?;
    let max_tick = max_usable_tick(tick_spacing)?;

    let raw_lower = scale_sqrt_price(env, reference_sqrt_price_x96, band.sqrt_lower_wad, false)?;
    let tick_lower = if raw_lower < MIN_SQRT_RATIO {
        min_tick
    } else {
        let tick = get_tick_at_sqrt_ratio(env, raw_lower)?;
        snap_tick_down(tick, tick_spacing)?.max(min_tick)
    };

    // Past the top of the price domain the scaled bound cannot be represented
    let tick_upper = match scale_sqrt_price(env, reference_sqrt_price_x96, band.sqrt_upper_wad, true)
    {
        Ok(raw_upper) if raw_upper < MAX_SQRT_RATIO => {
            let mut tick = get_tick_at_sqrt_ratio(env, raw_upper)?;
            if get_sqrt_ratio_at_tick(env, tick)? < raw_upper {
                tick += 1;
            }
            snap_tick_up(tick, tick_spacing)?.min(max_tick)
        }
        Ok(_) | Err(flex_types::MathError::Overflow) => max_tick,
        Err(err) => return Err(err.into()),
    };

    if tick_lower >= tick_upper {
        return Err(VaultError::PriceOutOfBounds);
    }

    Ok(PriceRange {
        tick_lower,
        tick_upper,
        sqrt_ratio_lower_x96: get_sqrt_ratio_at_tick(env, tick_lower)?,
        sqrt_ratio_upper_x96: get_sqrt_ratio_at_tick(env, tick_upper)?,
    })
}

/// Key of the vault's position in `range` on the pool
pub fn position_id(vault: &Address, range: &PriceRange) -> PositionKey {
    PositionKey {
        owner: vault.clone(),
        tick_lower: range.tick_lower,
        tick_upper: range.tick_upper,
    }
}

/// Largest liquidity the amounts can fund in `range` at `sqrt_price_x96`.
/// Below `min_liquidity` the answer is 0.
pub fn amounts_to_liquidity(
    env: &Env,
    amount0: u128,
    amount1: u128,
    range: &PriceRange,
    sqrt_price_x96: u128,
    min_liquidity: u128,
) -> Result<u128, VaultError> {
    let liquidity = get_liquidity_for_amounts(
        env,
        sqrt_price_x96,
        range.sqrt_ratio_lower_x96,
        range.sqrt_ratio_upper_x96,
        amount0,
        amount1,
    )?;

    if liquidity < min_liquidity {
        return Ok(0);
    }
    Ok(liquidity)
}

/// Token amounts `liquidity` is worth in `range` at `sqrt_price_x96`
pub fn amounts_for_liquidity(
    env: &Env,
    liquidity: u128,
    range: &PriceRange,
    sqrt_price_x96: u128,
    round_up: bool,
) -> Result<(u128, u128), VaultError> {
    Ok(get_amounts_for_liquidity(
        env,
        sqrt_price_x96,
        range.sqrt_ratio_lower_x96,
        range.sqrt_ratio_upper_x96,
        liquidity,
        round_up,
    )?)
}
