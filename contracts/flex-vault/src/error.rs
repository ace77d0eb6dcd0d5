use flex_types::MathError;
use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum VaultError {
    Unauthorized = 1,
    InsufficientLiquidity = 2,
    SlippageExceeded = 3,
    ExternalCallFailed = 4,
    Overflow = 5,
    DivisionByZero = 6,
    AlreadyInitialized = 7,
    NotInitialized = 8,
    InvalidAmount = 9,
    InvalidBasisPoints = 10,
    InvalidConfig = 11,
    TickOutOfBounds = 12,
    PriceOutOfBounds = 13,
}

impl From<MathError> for VaultError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::Overflow => VaultError::Overflow,
            MathError::DivisionByZero => VaultError::DivisionByZero,
            MathError::TickOutOfBounds => VaultError::TickOutOfBounds,
            MathError::PriceOutOfBounds => VaultError::PriceOutOfBounds,
            MathError::InvalidTickSpacing => VaultError::InvalidConfig,
            MathError::LiquidityUnderflow => VaultError::InsufficientLiquidity,
        }
    }
}

/// Token amounts are i128 on the token interface and u128 in pool math
pub fn to_u128(amount: i128) -> Result<u128, VaultError> {
    u128::try_from(amount).map_err(|_| VaultError::InvalidAmount)
}

pub fn to_i128(amount: u128) -> Result<i128, VaultError> {
    i128::try_from(amount).map_err(|_| VaultError::Overflow)
}
