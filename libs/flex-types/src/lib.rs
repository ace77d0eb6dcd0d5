#![no_std]

mod error;
mod pool;
mod position;
mod range;
mod tick;

pub use error::*;
pub use pool::*;
pub use position::*;
pub use range::*;
pub use tick::*;

/// Q96 constant (2^96) for sqrt price fixed-point math
pub const Q96: u128 = 1 << 96;

/// Q64 constant (2^64) for fee growth fixed-point math
pub const Q64: u128 = 1 << 64;

/// 1e18 fixed-point scale used by range band factors
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// sqrt(0.70) in WAD, lower edge of the default range band
pub const SQRT_70_PERCENT: u128 = 836_660_026_534_075_547;

/// sqrt(1.30) in WAD, upper edge of the default range band
pub const SQRT_130_PERCENT: u128 = 1_140_175_425_099_137_979;

/// Minimum tick index
/// Limited by u128 representation (originally -887272 for uint160)
pub const MIN_TICK: i32 = -443636;

/// Maximum tick index
/// Limited by u128 representation (originally 887272 for uint160)
pub const MAX_TICK: i32 = 443636;

/// Minimum sqrt price (at MIN_TICK)
/// sqrt(1.0001^-443636) * 2^96
pub const MIN_SQRT_RATIO: u128 = 18446743374134;

/// Maximum sqrt price (at MAX_TICK)
/// sqrt(1.0001^443636) * 2^96, bounded by u128::MAX
pub const MAX_SQRT_RATIO: u128 = 340275971719517849884101479065584693834;

/// Fee denominator: fees are expressed in hundredths of a basis point
pub const FEE_DENOMINATOR: u32 = 1_000_000;

/// Basis point denominator
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Calculate maximum liquidity per tick for a given tick spacing
pub fn max_liquidity_per_tick(tick_spacing: i32) -> u128 {
    let min_tick = (MIN_TICK / tick_spacing) * tick_spacing;
    let max_tick = (MAX_TICK / tick_spacing) * tick_spacing;
    let num_ticks = ((max_tick - min_tick) / tick_spacing) as u128 + 1;
    u128::MAX / num_ticks
}
