#![no_std]

//! Single-position auto-compounding vault over a concentrated-liquidity pool.
//!
//! The vault keeps at most one position open, placed in a band around the
//! pool price. Rebalancing closes it, optionally swaps part of the leftover
//! input token, and reopens it around the new price.

mod accounting;
mod error;
mod events;
mod pool;
mod position;
mod rebalance;
mod storage;

pub use error::VaultError;
pub use storage::VaultConfig;

use flex_types::{PositionKey, PriceRange, RangeBand, BPS_DENOMINATOR};
use soroban_sdk::{contract, contractimpl, token, Address, Env};
use storage::{
    get_config, get_range, is_initialized, set_config, DEFAULT_MAX_SLIPPAGE_BPS,
    DEFAULT_MIN_LIQUIDITY,
};

/// The caller must be the owner and must have authorized the call
fn require_owner(config: &VaultConfig, caller: &Address) -> Result<(), VaultError> {
    if *caller != config.owner {
        return Err(VaultError::Unauthorized);
    }
    caller.require_auth();
    Ok(())
}

#[contract]
pub struct Vault;

#[contractimpl]
impl Vault {
    /// Bind the vault to a pool and router.
    ///
    /// Tokens, fee tier and tick spacing are read from the pool.
    pub fn initialize(
        env: Env,
        owner: Address,
        pool: Address,
        router: Address,
        band: RangeBand,
    ) -> Result<(), VaultError> {
        if is_initialized(&env) {
            return Err(VaultError::AlreadyInitialized);
        }
        if !band.is_valid() {
            return Err(VaultError::InvalidConfig);
        }
        owner.require_auth();

        let token0 = pool::token0(&env, &pool)?;
        let token1 = pool::token1(&env, &pool)?;
        let fee = pool::fee(&env, &pool)?;
        let tick_spacing = pool::tick_spacing(&env, &pool)?;
        if tick_spacing <= 0 {
            return Err(VaultError::InvalidConfig);
        }

        let config = VaultConfig {
            owner: owner.clone(),
            pool: pool.clone(),
            router,
            token0,
            token1,
            fee,
            tick_spacing,
            band: band.clone(),
            min_liquidity: DEFAULT_MIN_LIQUIDITY,
            max_slippage_bps: DEFAULT_MAX_SLIPPAGE_BPS,
        };
        set_config(&env, &config);

        events::initialized(&env, &owner, &pool, &band);
        Ok(())
    }

    /// Deposit tokens and (re)open the position with everything the vault holds
    ///
    /// # Returns
    /// Liquidity of the new position
    pub fn mint(env: Env, caller: Address, amount0: i128, amount1: i128) -> Result<u128, VaultError> {
        let config = get_config(&env)?;
        require_owner(&config, &caller)?;
        if amount0 < 0 || amount1 < 0 {
            return Err(VaultError::InvalidAmount);
        }

        let vault = env.current_contract_address();
        if amount0 > 0 {
            token::Client::new(&env, &config.token0).transfer(&caller, &vault, &amount0);
        }
        if amount1 > 0 {
            token::Client::new(&env, &config.token1).transfer(&caller, &vault, &amount1);
        }

        rebalance::harvest(&env, &config)?;
        let (_, liquidity) = rebalance::open_position(&env, &config)?;

        events::minted(&env, &caller, amount0, amount1, liquidity);
        Ok(liquidity)
    }

    /// Owner-only rebalance
    pub fn executive_rebalance(
        env: Env,
        caller: Address,
        swap_bps: u32,
        zero_for_one: bool,
    ) -> Result<u128, VaultError> {
        let config = get_config(&env)?;
        require_owner(&config, &caller)?;
        rebalance::run(&env, &config, Some(caller), swap_bps, zero_for_one)
    }

    /// Permissionless rebalance with the same mechanics as `executive_rebalance`
    pub fn rebalance(env: Env, swap_bps: u32, zero_for_one: bool) -> Result<u128, VaultError> {
        let config = get_config(&env)?;
        rebalance::run(&env, &config, None, swap_bps, zero_for_one)
    }

    /// Close the position and send every token the vault holds to `recipient`
    ///
    /// # Returns
    /// (amount0, amount1) - Amounts transferred
    pub fn burn_all(
        env: Env,
        caller: Address,
        recipient: Address,
    ) -> Result<(i128, i128), VaultError> {
        let config = get_config(&env)?;
        require_owner(&config, &caller)?;

        rebalance::harvest(&env, &config)?;

        let vault = env.current_contract_address();
        let token0 = token::Client::new(&env, &config.token0);
        let token1 = token::Client::new(&env, &config.token1);
        let amount0 = token0.balance(&vault);
        let amount1 = token1.balance(&vault);

        if amount0 > 0 {
            token0.transfer(&vault, &recipient, &amount0);
        }
        if amount1 > 0 {
            token1.transfer(&vault, &recipient, &amount1);
        }

        if amount0 > 0 || amount1 > 0 {
            events::burned(&env, &recipient, amount0, amount1);
        }
        Ok((amount0, amount1))
    }

    /// Set the largest accepted shortfall of a rebalance swap against the spot quote
    pub fn set_max_slippage(
        env: Env,
        caller: Address,
        max_slippage_bps: u32,
    ) -> Result<(), VaultError> {
        let mut config = get_config(&env)?;
        require_owner(&config, &caller)?;
        if max_slippage_bps > BPS_DENOMINATOR {
            return Err(VaultError::InvalidBasisPoints);
        }

        config.max_slippage_bps = max_slippage_bps;
        set_config(&env, &config);

        events::slippage_set(&env, max_slippage_bps);
        Ok(())
    }

    // === View Functions ===

    pub fn get_config(env: Env) -> Result<VaultConfig, VaultError> {
        get_config(&env)
    }

    pub fn pool(env: Env) -> Result<Address, VaultError> {
        Ok(get_config(&env)?.pool)
    }

    pub fn token0(env: Env) -> Result<Address, VaultError> {
        Ok(get_config(&env)?.token0)
    }

    pub fn token1(env: Env) -> Result<Address, VaultError> {
        Ok(get_config(&env)?.token1)
    }

    pub fn owner(env: Env) -> Result<Address, VaultError> {
        Ok(get_config(&env)?.owner)
    }

    pub fn range_band(env: Env) -> Result<RangeBand, VaultError> {
        Ok(get_config(&env)?.band)
    }

    /// Lower band factor, sqrt(0.70) in WAD unless configured otherwise
    pub fn sqrt_70_percent(env: Env) -> Result<u128, VaultError> {
        Ok(get_config(&env)?.band.sqrt_lower_wad)
    }

    /// Upper band factor, sqrt(1.30) in WAD unless configured otherwise
    pub fn sqrt_130_percent(env: Env) -> Result<u128, VaultError> {
        Ok(get_config(&env)?.band.sqrt_upper_wad)
    }

    /// Range of the open position, `None` when nothing is deployed
    pub fn get_range(env: Env) -> Result<Option<PriceRange>, VaultError> {
        get_config(&env)?;
        Ok(get_range(&env))
    }

    pub fn get_position_id(env: Env) -> Result<Option<PositionKey>, VaultError> {
        get_config(&env)?;
        let vault = env.current_contract_address();
        Ok(get_range(&env).map(|range| position::position_id(&vault, &range)))
    }

    /// Pool position key the vault would hold in [tick_lower, tick_upper)
    pub fn position_id(env: Env, tick_lower: i32, tick_upper: i32) -> Result<PositionKey, VaultError> {
        get_config(&env)?;
        Ok(PositionKey {
            owner: env.current_contract_address(),
            tick_lower,
            tick_upper,
        })
    }

    /// Range the vault would open around `sqrt_price_x96`
    pub fn compute_range(env: Env, sqrt_price_x96: u128) -> Result<PriceRange, VaultError> {
        let config = get_config(&env)?;
        position::compute_range(&env, sqrt_price_x96, &config.band, config.tick_spacing)
    }

    /// Idle balances plus position principal, tokens owed and accrued fees
    pub fn get_underlying_balances(env: Env) -> Result<(i128, i128), VaultError> {
        let config = get_config(&env)?;
        accounting::get_underlying_balances(&env, &config)
    }

    pub fn get_position_amounts(env: Env) -> Result<(i128, i128), VaultError> {
        let config = get_config(&env)?;
        accounting::get_position_amounts(&env, &config)
    }

    pub fn get_fees_earned(env: Env) -> Result<(i128, i128), VaultError> {
        let config = get_config(&env)?;
        accounting::get_fees_earned(&env, &config)
    }
}

#[cfg(test)]
mod test;
