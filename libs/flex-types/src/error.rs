use soroban_sdk::contracterror;

/// Failures raised by the fixed-point math library.
///
/// Codes start at 100 so they never collide with contract error codes that
/// wrap them.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum MathError {
    Overflow = 100,
    DivisionByZero = 101,
    TickOutOfBounds = 102,
    PriceOutOfBounds = 103,
    InvalidTickSpacing = 104,
    LiquidityUnderflow = 105,
}
