use soroban_sdk::contracttype;

use crate::{SQRT_130_PERCENT, SQRT_70_PERCENT, WAD};

/// A tick-aligned price interval with its sqrt ratio bounds cached
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PriceRange {
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub sqrt_ratio_lower_x96: u128,
    pub sqrt_ratio_upper_x96: u128,
}

/// Multiplicative band around a reference sqrt price, both factors in WAD
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RangeBand {
    pub sqrt_lower_wad: u128,
    pub sqrt_upper_wad: u128,
}

impl RangeBand {
    /// The 70% / 130% price band
    pub fn standard() -> Self {
        Self {
            sqrt_lower_wad: SQRT_70_PERCENT,
            sqrt_upper_wad: SQRT_130_PERCENT,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.sqrt_lower_wad > 0 && self.sqrt_lower_wad < WAD && self.sqrt_upper_wad > WAD
    }
}
