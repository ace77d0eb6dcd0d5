use soroban_sdk::{contracttype, Address};

/// Current pool state - stored in Instance storage for frequent access
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolState {
    /// Current sqrt(price) as Q64.96
    pub sqrt_price_x96: u128,
    /// Current tick index
    pub tick: i32,
    /// Total liquidity currently in range
    pub liquidity: u128,
    /// Fee growth global for token0 (Q64.64, wrapping)
    pub fee_growth_global_0_x64: u128,
    /// Fee growth global for token1 (Q64.64, wrapping)
    pub fee_growth_global_1_x64: u128,
}

impl PoolState {
    pub fn new(sqrt_price_x96: u128, tick: i32) -> Self {
        Self {
            sqrt_price_x96,
            tick,
            liquidity: 0,
            fee_growth_global_0_x64: 0,
            fee_growth_global_1_x64: 0,
        }
    }
}

/// Pool configuration - immutable after creation
#[contracttype]
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Address allowed to flip the pool lock
    pub admin: Address,
    /// Token0 address (lower address)
    pub token0: Address,
    /// Token1 address (higher address)
    pub token1: Address,
    /// Fee tier in hundredths of bps
    pub fee: u32,
    /// Tick spacing for this pool
    pub tick_spacing: i32,
    /// Maximum liquidity per tick
    pub max_liquidity_per_tick: u128,
}

/// Token balances the pool has accounted for.
///
/// Anything the token contracts report above these figures is an unclaimed
/// payment from the current caller.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Reserves {
    pub reserve0: i128,
    pub reserve1: i128,
}

/// Result of a single swap step (pure computation)
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SwapStepResult {
    /// New sqrt price after this step
    pub sqrt_price_next_x96: u128,
    /// Amount of input token consumed, excluding the fee
    pub amount_in: u128,
    /// Amount of output token produced
    pub amount_out: u128,
    /// Fee amount taken
    pub fee_amount: u128,
}

/// Parameters for a single-hop exact-input swap through the router
#[contracttype]
#[derive(Clone, Debug)]
pub struct ExactInputSingleParams {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: u32,
    pub recipient: Address,
    /// Ledger timestamp after which the swap is rejected
    pub deadline: u64,
    pub amount_in: i128,
    pub amount_out_minimum: i128,
    /// 0 means no limit beyond the global sqrt ratio bounds
    pub sqrt_price_limit_x96: u128,
}
