use flex_types::MathError;
use soroban_sdk::{Env, U256};

/// Multiply and divide with 256-bit intermediate precision (rounds down)
/// Returns (a * b) / denominator
pub fn mul_div(env: &Env, a: u128, b: u128, denominator: u128) -> Result<u128, MathError> {
    let result = mul_div_u256(env, &U256::from_u128(env, a), b, denominator, false)?;
    to_u128(&result)
}

/// Multiply and divide with 256-bit intermediate precision (rounds up)
/// Returns ceil((a * b) / denominator)
pub fn mul_div_rounding_up(
    env: &Env,
    a: u128,
    b: u128,
    denominator: u128,
) -> Result<u128, MathError> {
    let result = mul_div_u256(env, &U256::from_u128(env, a), b, denominator, true)?;
    to_u128(&result)
}

/// (a * b) / denominator for a 256-bit `a`.
///
/// `a` is split into `q * denominator + r` so that neither `q * b` nor
/// `r * b` needs more than 256 bits. Fails with `Overflow` when `a / denominator`
/// does not fit in a u128, which bounds the result well above anything a
/// caller converts back to u128.
pub fn mul_div_u256(
    env: &Env,
    a: &U256,
    b: u128,
    denominator: u128,
    round_up: bool,
) -> Result<U256, MathError> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }
    let zero = U256::from_u32(env, 0);
    if b == 0 || *a == zero {
        return Ok(zero);
    }

    let denom_256 = U256::from_u128(env, denominator);
    let b_256 = U256::from_u128(env, b);

    let quotient = to_u128(&a.div(&denom_256))?;
    let high = U256::from_u128(env, quotient).mul(&b_256);

    let low_numerator = a.rem_euclid(&denom_256).mul(&b_256);
    let low = low_numerator.div(&denom_256);

    let mut result = high.add(&low);
    if round_up && low_numerator.rem_euclid(&denom_256) > zero {
        result = result.add(&U256::from_u32(env, 1));
    }
    Ok(result)
}

/// Divide a 256-bit value by a u128, rounding as requested
pub fn div_u256(
    env: &Env,
    numerator: &U256,
    denominator: u128,
    round_up: bool,
) -> Result<U256, MathError> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }
    let denom_256 = U256::from_u128(env, denominator);
    let result = numerator.div(&denom_256);
    if round_up && numerator.rem_euclid(&denom_256) > U256::from_u32(env, 0) {
        Ok(result.add(&U256::from_u32(env, 1)))
    } else {
        Ok(result)
    }
}

/// Convert U256 to u128, failing on overflow
pub fn to_u128(value: &U256) -> Result<u128, MathError> {
    value.to_u128().ok_or(MathError::Overflow)
}
