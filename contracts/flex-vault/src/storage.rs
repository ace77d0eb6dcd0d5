use crate::error::VaultError;
use flex_types::{PriceRange, RangeBand};
use soroban_sdk::{contracttype, Address, Env};

/// Positions below this liquidity are not worth opening
pub const DEFAULT_MIN_LIQUIDITY: u128 = 1_000;

/// Largest shortfall against the spot quote a rebalance swap accepts
pub const DEFAULT_MAX_SLIPPAGE_BPS: u32 = 100;

/// Router deadline offset from the current ledger timestamp
pub const SWAP_DEADLINE_SECS: u64 = 300;

/// Storage keys for the vault contract
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Vault configuration (Instance storage)
    Config,
    /// Range of the open position, if any (Instance storage)
    Range,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultConfig {
    pub owner: Address,
    pub pool: Address,
    pub router: Address,
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
    pub tick_spacing: i32,
    pub band: RangeBand,
    pub min_liquidity: u128,
    pub max_slippage_bps: u32,
}

const INSTANCE_TTL_THRESHOLD: u32 = 17280; // ~1 day
const INSTANCE_TTL_EXTEND: u32 = 518400; // ~30 days

pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

// === Config ===

pub fn get_config(env: &Env) -> Result<VaultConfig, VaultError> {
    let config = env
        .storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(VaultError::NotInitialized)?;
    extend_instance_ttl(env);
    Ok(config)
}

pub fn set_config(env: &Env, config: &VaultConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    extend_instance_ttl(env);
}

// === Range ===

pub fn get_range(env: &Env) -> Option<PriceRange> {
    env.storage().instance().get(&DataKey::Range)
}

pub fn set_range(env: &Env, range: &PriceRange) {
    env.storage().instance().set(&DataKey::Range, range);
}

pub fn clear_range(env: &Env) {
    env.storage().instance().remove(&DataKey::Range);
}
