use flex_types::{MathError, MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};
use soroban_sdk::{Env, U256};

// sqrt(1.0001^-(2^i)) in Q128, i = 0..18
const SQRT_RATIO_FACTORS: [u128; 19] = [
    0xfffcb933bd6fad37aa2d162d1a594001,
    0xfff97272373d413259a46990580e213a,
    0xfff2e50f5f656932ef12357cf3c7fdcc,
    0xffe5caca7e10e4e61c3624eaa0941cd0,
    0xffcb9843d60f6159c9db58835c926644,
    0xff973b41fa98c081472e6896dfb254c0,
    0xff2ea16466c96a3843ec78b326b52861,
    0xfe5dee046a99a2a811c461f1969c3053,
    0xfcbe86c7900a88aedcffc83b479aa3a4,
    0xf987a7253ac413176f2b074cf7815e54,
    0xf3392b0822b70005940c7a398e4b70f3,
    0xe7159475a2c29b7443b29c7fa6e889d9,
    0xd097f3bdfd2022b8845ad8f792aa5825,
    0xa9f746462d870fdf8a65dc1f90e061e5,
    0x70d869a156d2a1b890bb3df62baf32f7,
    0x31be135f97d08fd981231505542fcfa6,
    0x9aa508b5b7a84e1c677de54f3e99bc9,
    0x5d6af8dedb81196699c329225ee604,
    0x2216e584f5fa1ea926041bedfe98,
];

fn q128(env: &Env) -> U256 {
    U256::from_u128(env, 1u128 << 64).mul(&U256::from_u128(env, 1u128 << 64))
}

/// Calculate sqrt(1.0001^tick) * 2^96
pub fn get_sqrt_ratio_at_tick(env: &Env, tick: i32) -> Result<u128, MathError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(MathError::TickOutOfBounds);
    }

    let abs_tick = tick.unsigned_abs();
    let q128 = q128(env);

    // Accumulate the ratio for -|tick| in Q128
    let mut ratio = q128.clone();
    for (bit, factor) in SQRT_RATIO_FACTORS.iter().enumerate() {
        if abs_tick & (1 << bit) != 0 {
            ratio = ratio.mul(&U256::from_u128(env, *factor)).div(&q128);
        }
    }

    if tick > 0 {
        ratio = u256_max(env, &q128).div(&ratio);
    }

    // Q128 -> Q96
    let result = ratio.div(&U256::from_u128(env, 1u128 << 32));
    let result = result.to_u128().unwrap_or(u128::MAX);
    Ok(result.clamp(MIN_SQRT_RATIO, MAX_SQRT_RATIO))
}

/// Greatest tick whose sqrt ratio is <= the given sqrt price
pub fn get_tick_at_sqrt_ratio(env: &Env, sqrt_price_x96: u128) -> Result<i32, MathError> {
    if !(MIN_SQRT_RATIO..MAX_SQRT_RATIO).contains(&sqrt_price_x96) {
        return Err(MathError::PriceOutOfBounds);
    }

    let mut low = MIN_TICK;
    let mut high = MAX_TICK;

    while low < high {
        let mid = low + (high - low + 1) / 2;
        if get_sqrt_ratio_at_tick(env, mid)? <= sqrt_price_x96 {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    Ok(low)
}

fn u256_max(env: &Env, q128: &U256) -> U256 {
    let high = U256::from_u128(env, u128::MAX);
    high.mul(q128).add(&U256::from_u128(env, u128::MAX))
}

/// Round a tick down to the nearest multiple of the spacing
pub fn snap_tick_down(tick: i32, tick_spacing: i32) -> Result<i32, MathError> {
    if tick_spacing <= 0 {
        return Err(MathError::InvalidTickSpacing);
    }
    Ok(tick - tick.rem_euclid(tick_spacing))
}

/// Round a tick up to the nearest multiple of the spacing
pub fn snap_tick_up(tick: i32, tick_spacing: i32) -> Result<i32, MathError> {
    if tick_spacing <= 0 {
        return Err(MathError::InvalidTickSpacing);
    }
    let remainder = tick.rem_euclid(tick_spacing);
    if remainder == 0 {
        Ok(tick)
    } else {
        Ok(tick + (tick_spacing - remainder))
    }
}

/// Lowest tick a position can use for this spacing
pub fn min_usable_tick(tick_spacing: i32) -> Result<i32, MathError> {
    snap_tick_up(MIN_TICK, tick_spacing)
}

/// Highest tick a position can use for this spacing
pub fn max_usable_tick(tick_spacing: i32) -> Result<i32, MathError> {
    snap_tick_down(MAX_TICK, tick_spacing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flex_types::Q96;
    use soroban_sdk::Env;

    fn abs_diff(a: u128, b: u128) -> u128 {
        if a > b {
            a - b
        } else {
            b - a
        }
    }

    #[test]
    fn test_get_sqrt_ratio_at_tick_zero() {
        let env = Env::default();
        let sqrt_price = get_sqrt_ratio_at_tick(&env, 0).unwrap();
        assert!(abs_diff(sqrt_price, Q96) <= 1, "tick 0 should give 2^96");
    }

    #[test]
    fn test_get_sqrt_ratio_at_tick_monotonic() {
        let env = Env::default();
        let mut prev = get_sqrt_ratio_at_tick(&env, -10000).unwrap();
        for tick in (-9900..=10000).step_by(100) {
            let sqrt = get_sqrt_ratio_at_tick(&env, tick).unwrap();
            assert!(sqrt > prev, "sqrt_price should be monotonically increasing");
            prev = sqrt;
        }
    }

    #[test]
    fn test_get_sqrt_ratio_at_tick_symmetric() {
        let env = Env::default();
        let up = U256::from_u128(&env, get_sqrt_ratio_at_tick(&env, 100).unwrap());
        let down = U256::from_u128(&env, get_sqrt_ratio_at_tick(&env, -100).unwrap());
        let product = up.mul(&down).div(&U256::from_u128(&env, Q96));
        let product = product.to_u128().unwrap();
        assert!(abs_diff(product, Q96) < Q96 / 1_000_000);
    }

    #[test]
    fn test_known_tick_values() {
        let env = Env::default();
        // 1.0001^6932 ~= 2.0000, so the sqrt ratio is ~sqrt(2) * 2^96
        let sqrt_6932 = get_sqrt_ratio_at_tick(&env, 6932).unwrap();
        let expected = Q96 / 1_000_000 * 1_414_213;
        assert!(abs_diff(sqrt_6932, expected) < expected / 10_000);
    }

    #[test]
    fn test_tick_bounds() {
        let env = Env::default();
        let min_sqrt = get_sqrt_ratio_at_tick(&env, MIN_TICK).unwrap();
        assert!(min_sqrt >= MIN_SQRT_RATIO && min_sqrt < Q96 / 1000);
        let max_sqrt = get_sqrt_ratio_at_tick(&env, MAX_TICK).unwrap();
        assert!(max_sqrt <= MAX_SQRT_RATIO && max_sqrt > Q96 * 1000);
    }

    #[test]
    fn test_get_sqrt_ratio_out_of_bounds() {
        let env = Env::default();
        assert_eq!(
            get_sqrt_ratio_at_tick(&env, MIN_TICK - 1),
            Err(MathError::TickOutOfBounds)
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(&env, MAX_TICK + 1),
            Err(MathError::TickOutOfBounds)
        );
    }

    #[test]
    fn test_get_tick_at_sqrt_ratio_roundtrip() {
        let env = Env::default();
        env.cost_estimate().budget().reset_unlimited();
        for tick in [-100000, -82380, -10000, -100, 0, 100, 10000, 100000] {
            let sqrt_price = get_sqrt_ratio_at_tick(&env, tick).unwrap();
            assert_eq!(get_tick_at_sqrt_ratio(&env, sqrt_price), Ok(tick));
            // One below the exact ratio belongs to the previous tick
            assert_eq!(get_tick_at_sqrt_ratio(&env, sqrt_price - 1), Ok(tick - 1));
        }
    }

    #[test]
    fn test_get_tick_at_sqrt_ratio_bounds() {
        let env = Env::default();
        assert_eq!(get_tick_at_sqrt_ratio(&env, MIN_SQRT_RATIO), Ok(MIN_TICK));
        assert_eq!(
            get_tick_at_sqrt_ratio(&env, MIN_SQRT_RATIO - 1),
            Err(MathError::PriceOutOfBounds)
        );
        // MAX_SQRT_RATIO is exclusive
        assert_eq!(
            get_tick_at_sqrt_ratio(&env, MAX_SQRT_RATIO),
            Err(MathError::PriceOutOfBounds)
        );
    }

    #[test]
    fn test_snap_tick() {
        assert_eq!(snap_tick_down(125, 60), Ok(120));
        assert_eq!(snap_tick_down(-125, 60), Ok(-180));
        assert_eq!(snap_tick_down(-120, 60), Ok(-120));
        assert_eq!(snap_tick_up(125, 60), Ok(180));
        assert_eq!(snap_tick_up(-125, 60), Ok(-120));
        assert_eq!(snap_tick_up(120, 60), Ok(120));
        assert_eq!(snap_tick_up(1, 0), Err(MathError::InvalidTickSpacing));
        assert_eq!(snap_tick_down(1, -60), Err(MathError::InvalidTickSpacing));
    }

    #[test]
    fn test_usable_ticks_are_inside_bounds() {
        let min = min_usable_tick(60).unwrap();
        let max = max_usable_tick(60).unwrap();
        assert!(min >= MIN_TICK && min % 60 == 0);
        assert!(max <= MAX_TICK && max % 60 == 0);
        assert_eq!(min, -max);
    }
}
