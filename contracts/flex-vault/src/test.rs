#![cfg(test)]
extern crate std;

use crate::{Vault, VaultClient, VaultError};
use flex_math::scale_sqrt_price;
use flex_sim_pool::{SimPool, SimPoolClient};
use flex_types::{PositionKey, RangeBand, SQRT_130_PERCENT, SQRT_70_PERCENT, WAD};
use soroban_sdk::testutils::Address as _;
use soroban_sdk::token::{Client as TokenClient, StellarAssetClient};
use soroban_sdk::{Address, Env};

/// sqrt(DEPOSIT1 / DEPOSIT0) in Q64.96, about tick -82360
const INITIAL_SQRT_PRICE_X96: u128 = 1_289_844_219_501_026_637_643_553_244;

const DEPOSIT0: i128 = 37_729_812_250_598_454_861_277;
const DEPOSIT1: i128 = 10_000_000_000_000_000_000;
const USER_SWAP: i128 = 10_000_000_000_000_000_000;

/// Deep background liquidity so user swaps barely move the price
const BACKGROUND_LIQUIDITY: u128 = 10_000_000_000_000_000_000_000_000;
const BACKGROUND_FUNDING: i128 = 1_000_000_000_000_000_000_000_000_000;
const BACKGROUND_TICK_LOWER: i32 = -88_380;
const BACKGROUND_TICK_UPPER: i32 = -76_380;

struct Fixture<'a> {
    env: Env,
    owner: Address,
    pool: SimPoolClient<'a>,
    vault: VaultClient<'a>,
    token0: Address,
    token1: Address,
}

impl<'a> Fixture<'a> {
    fn new() -> Self {
        let env = Env::default();
        env.mock_all_auths();
        env.cost_estimate().budget().reset_unlimited();

        let admin = Address::generate(&env);
        let a = env.register_stellar_asset_contract_v2(admin.clone()).address();
        let b = env.register_stellar_asset_contract_v2(admin.clone()).address();
        let (token0, token1) = if a < b { (a, b) } else { (b, a) };

        let pool = SimPoolClient::new(&env, &env.register(SimPool, ()));
        pool.initialize(&admin, &token0, &token1, &3000u32, &60i32, &INITIAL_SQRT_PRICE_X96);

        let vault = VaultClient::new(&env, &env.register(Vault, ()));
        let owner = Address::generate(&env);

        let fixture = Fixture {
            env,
            owner,
            pool,
            vault,
            token0,
            token1,
        };

        let lp = Address::generate(&fixture.env);
        fixture.fund(&lp, BACKGROUND_FUNDING, BACKGROUND_FUNDING);
        fixture.pay_pool(&lp, BACKGROUND_FUNDING, BACKGROUND_FUNDING);
        fixture.pool.mint(
            &lp,
            &BACKGROUND_TICK_LOWER,
            &BACKGROUND_TICK_UPPER,
            &BACKGROUND_LIQUIDITY,
        );

        fixture.fund(&fixture.owner, DEPOSIT0, DEPOSIT1);
        fixture
    }

    /// Fixture with the vault bound to the pool, which also serves as router
    fn initialized() -> Self {
        let fixture = Self::new();
        fixture.vault.initialize(
            &fixture.owner,
            &fixture.pool.address,
            &fixture.pool.address,
            &RangeBand::standard(),
        );
        fixture
    }

    fn fund(&self, to: &Address, amount0: i128, amount1: i128) {
        StellarAssetClient::new(&self.env, &self.token0).mint(to, &amount0);
        StellarAssetClient::new(&self.env, &self.token1).mint(to, &amount1);
    }

    fn pay_pool(&self, from: &Address, amount0: i128, amount1: i128) {
        if amount0 > 0 {
            TokenClient::new(&self.env, &self.token0).transfer(from, &self.pool.address, &amount0);
        }
        if amount1 > 0 {
            TokenClient::new(&self.env, &self.token1).transfer(from, &self.pool.address, &amount1);
        }
    }

    fn balances(&self, who: &Address) -> (i128, i128) {
        (
            TokenClient::new(&self.env, &self.token0).balance(who),
            TokenClient::new(&self.env, &self.token1).balance(who),
        )
    }

    fn deposit(&self) -> u128 {
        self.vault.mint(&self.owner, &DEPOSIT0, &DEPOSIT1)
    }

    /// Another user sells token1 for token0, paying the output to `recipient`
    fn user_buys_token0(&self, recipient: &Address) {
        let user = Address::generate(&self.env);
        self.fund(&user, 0, USER_SWAP);
        self.pay_pool(&user, 0, USER_SWAP);
        self.pool.swap(recipient, &false, &USER_SWAP, &0);
    }
}

fn assert_close(actual: i128, expected: i128, tolerance: i128) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{} not within {} of {}",
        actual,
        tolerance,
        expected
    );
}

fn assert_close_below(actual: i128, expected: i128, tolerance: i128) {
    assert!(actual <= expected, "{} > {}", actual, expected);
    assert!(expected - actual <= tolerance, "{} too far below {}", actual, expected);
}

// === Initialization ===

#[test]
fn test_initialize_reads_pool_config() {
    let f = Fixture::initialized();

    assert_eq!(f.vault.token0(), f.token0);
    assert_eq!(f.vault.token1(), f.token1);
    assert_eq!(f.vault.pool(), f.pool.address);
    assert_eq!(f.vault.owner(), f.owner);
    assert_eq!(f.vault.range_band(), RangeBand::standard());
    assert_eq!(f.vault.sqrt_70_percent(), SQRT_70_PERCENT);
    assert_eq!(f.vault.sqrt_130_percent(), SQRT_130_PERCENT);

    let config = f.vault.get_config();
    assert_eq!(config.fee, 3000);
    assert_eq!(config.tick_spacing, 60);
    assert_eq!(config.router, f.pool.address);
    assert_eq!(config.max_slippage_bps, 100);

    assert_eq!(f.vault.get_range(), None);
    assert_eq!(f.vault.get_position_id(), None);
    assert_eq!(f.vault.get_underlying_balances(), (0, 0));
}

#[test]
fn test_initialize_twice_fails() {
    let f = Fixture::initialized();
    let result = f.vault.try_initialize(
        &f.owner,
        &f.pool.address,
        &f.pool.address,
        &RangeBand::standard(),
    );
    assert_eq!(result, Err(Ok(VaultError::AlreadyInitialized)));
}

#[test]
fn test_initialize_requires_owner_auth() {
    let f = Fixture::initialized();
    assert!(f.env.auths().iter().any(|(addr, _)| *addr == f.owner));
}

#[test]
fn test_initialize_without_owner_auth_fails() {
    let f = Fixture::new();
    f.env.set_auths(&[]);

    let result = f.vault.try_initialize(
        &f.owner,
        &f.pool.address,
        &f.pool.address,
        &RangeBand::standard(),
    );
    assert!(result.is_err());
    assert_eq!(f.vault.try_owner(), Err(Ok(VaultError::NotInitialized)));
}

#[test]
fn test_initialize_rejects_invalid_band() {
    let f = Fixture::new();
    let band = RangeBand {
        sqrt_lower_wad: WAD,
        sqrt_upper_wad: SQRT_130_PERCENT,
    };
    let result = f
        .vault
        .try_initialize(&f.owner, &f.pool.address, &f.pool.address, &band);
    assert_eq!(result, Err(Ok(VaultError::InvalidConfig)));
}

#[test]
fn test_operations_before_initialize_fail() {
    let f = Fixture::new();

    assert_eq!(
        f.vault.try_mint(&f.owner, &DEPOSIT0, &DEPOSIT1),
        Err(Ok(VaultError::NotInitialized))
    );
    assert_eq!(
        f.vault.try_rebalance(&0, &true),
        Err(Ok(VaultError::NotInitialized))
    );
    assert_eq!(
        f.vault.try_burn_all(&f.owner, &f.owner),
        Err(Ok(VaultError::NotInitialized))
    );
    assert_eq!(
        f.vault.try_get_underlying_balances(),
        Err(Ok(VaultError::NotInitialized))
    );
    assert_eq!(f.vault.try_get_range(), Err(Ok(VaultError::NotInitialized)));
}

// === Mint ===

#[test]
fn test_mint_underlying_matches_deposit() {
    let f = Fixture::initialized();
    let liquidity = f.deposit();
    assert!(liquidity > 0);

    let range = f.vault.get_range().unwrap();
    assert!(range.tick_lower < f.pool.tick() && f.pool.tick() < range.tick_upper);
    assert_eq!(range.tick_lower % 60, 0);
    assert_eq!(range.tick_upper % 60, 0);

    let key = f.vault.get_position_id().unwrap();
    assert_eq!(key, f.vault.position_id(&range.tick_lower, &range.tick_upper));
    assert_eq!(
        key,
        PositionKey {
            owner: f.vault.address.clone(),
            tick_lower: range.tick_lower,
            tick_upper: range.tick_upper,
        }
    );

    let position = f
        .pool
        .get_position(&f.vault.address, &range.tick_lower, &range.tick_upper);
    assert_eq!(position.liquidity, liquidity);

    // Principal is valued rounded down, the pool charged rounded up
    let (underlying0, underlying1) = f.vault.get_underlying_balances();
    assert_close_below(underlying0, DEPOSIT0, 2);
    assert_close_below(underlying1, DEPOSIT1, 2);

    assert_eq!(f.balances(&f.owner), (0, 0));
    assert_eq!(f.vault.get_fees_earned(), (0, 0));
}

#[test]
fn test_mint_rejects_non_owner() {
    let f = Fixture::initialized();
    let stranger = Address::generate(&f.env);
    f.fund(&stranger, DEPOSIT0, DEPOSIT1);

    assert_eq!(
        f.vault.try_mint(&stranger, &DEPOSIT0, &DEPOSIT1),
        Err(Ok(VaultError::Unauthorized))
    );
    assert_eq!(f.balances(&stranger), (DEPOSIT0, DEPOSIT1));
    assert_eq!(f.vault.get_range(), None);
    assert_eq!(f.vault.get_underlying_balances(), (0, 0));
}

#[test]
fn test_mint_rejects_negative_amounts() {
    let f = Fixture::initialized();
    assert_eq!(
        f.vault.try_mint(&f.owner, &-1, &DEPOSIT1),
        Err(Ok(VaultError::InvalidAmount))
    );
}

#[test]
fn test_mint_dust_is_insufficient_liquidity() {
    let f = Fixture::initialized();
    assert_eq!(
        f.vault.try_mint(&f.owner, &10, &10),
        Err(Ok(VaultError::InsufficientLiquidity))
    );
    // Rolled back, including the deposit transfer
    assert_eq!(f.balances(&f.owner), (DEPOSIT0, DEPOSIT1));
    assert_eq!(f.vault.get_range(), None);
}

#[test]
fn test_second_mint_keeps_a_single_position() {
    let f = Fixture::initialized();
    let first = f
        .vault
        .mint(&f.owner, &(DEPOSIT0 / 2), &(DEPOSIT1 / 2));
    let second = f
        .vault
        .mint(&f.owner, &(DEPOSIT0 - DEPOSIT0 / 2), &(DEPOSIT1 - DEPOSIT1 / 2));
    assert!(second > first);

    let range = f.vault.get_range().unwrap();
    let position = f
        .pool
        .get_position(&f.vault.address, &range.tick_lower, &range.tick_upper);
    assert_eq!(position.liquidity, second);

    // The pool carries no liquidity for the vault beyond the open position
    assert_eq!(
        f.pool.liquidity(),
        BACKGROUND_LIQUIDITY + second
    );

    let (underlying0, underlying1) = f.vault.get_underlying_balances();
    assert_close_below(underlying0, DEPOSIT0, 4);
    assert_close_below(underlying1, DEPOSIT1, 4);
}

// === Burn ===

#[test]
fn test_burn_all_returns_everything() {
    let f = Fixture::initialized();
    f.deposit();

    let (amount0, amount1) = f.vault.burn_all(&f.owner, &f.owner);
    assert_close_below(amount0, DEPOSIT0, 2);
    assert_close_below(amount1, DEPOSIT1, 2);
    assert_eq!(f.balances(&f.owner), (amount0, amount1));

    assert_eq!(f.vault.get_underlying_balances(), (0, 0));
    assert_eq!(f.vault.get_range(), None);
    assert_eq!(f.pool.liquidity(), BACKGROUND_LIQUIDITY);
}

#[test]
fn test_burn_all_twice_is_a_no_op() {
    let f = Fixture::initialized();
    f.deposit();

    f.vault.burn_all(&f.owner, &f.owner);
    let before = f.balances(&f.owner);
    assert_eq!(f.vault.burn_all(&f.owner, &f.owner), (0, 0));
    assert_eq!(f.balances(&f.owner), before);
}

#[test]
fn test_burn_all_on_empty_vault() {
    let f = Fixture::initialized();
    assert_eq!(f.vault.burn_all(&f.owner, &f.owner), (0, 0));
}

#[test]
fn test_burn_all_rejects_non_owner() {
    let f = Fixture::initialized();
    f.deposit();
    let stranger = Address::generate(&f.env);

    assert_eq!(
        f.vault.try_burn_all(&stranger, &stranger),
        Err(Ok(VaultError::Unauthorized))
    );
    assert_eq!(f.balances(&stranger), (0, 0));
    assert!(f.vault.get_range().is_some());
}

// === Rebalance ===

#[test]
fn test_rebalance_without_swap_keeps_value() {
    let f = Fixture::initialized();
    f.deposit();
    let before = f.vault.get_underlying_balances();
    let range_before = f.vault.get_range().unwrap();

    let liquidity = f.vault.rebalance(&0, &true);
    assert!(liquidity > 0);

    let (after0, after1) = f.vault.get_underlying_balances();
    assert_close_below(after0, before.0, 2);
    assert_close_below(after1, before.1, 2);
    assert_eq!(f.vault.get_range().unwrap(), range_before);
}

#[test]
fn test_executive_rebalance_swaps_leftover_token0() {
    let f = Fixture::initialized();
    f.deposit();
    let (before0, before1) = f.vault.get_underlying_balances();

    f.vault.executive_rebalance(&f.owner, &5000, &true);

    let (after0, after1) = f.vault.get_underlying_balances();
    assert!(after0 < before0);
    assert!(after1 > before1);

    // Never more than half of the token0 balance goes through the router
    assert!(before0 - after0 <= before0 / 2);
}

#[test]
fn test_executive_rebalance_rejects_non_owner() {
    let f = Fixture::initialized();
    f.deposit();
    let range = f.vault.get_range();
    let stranger = Address::generate(&f.env);

    assert_eq!(
        f.vault.try_executive_rebalance(&stranger, &5000, &true),
        Err(Ok(VaultError::Unauthorized))
    );
    assert_eq!(f.vault.get_range(), range);
}

#[test]
fn test_rebalance_rejects_invalid_bps() {
    let f = Fixture::initialized();
    f.deposit();
    assert_eq!(
        f.vault.try_rebalance(&10_001, &true),
        Err(Ok(VaultError::InvalidBasisPoints))
    );
    assert_eq!(
        f.vault.try_executive_rebalance(&f.owner, &10_001, &false),
        Err(Ok(VaultError::InvalidBasisPoints))
    );
}

#[test]
fn test_rebalance_follows_price() {
    let f = Fixture::initialized();
    f.deposit();
    let range_before = f.vault.get_range().unwrap();

    // Push the price well above the current range
    let trader = Address::generate(&f.env);
    let push = 40_000_000_000_000_000_000_000i128;
    f.fund(&trader, 0, push);
    f.pay_pool(&trader, 0, push);
    f.pool.swap(&trader, &false, &push, &0);
    assert!(f.pool.tick() > range_before.tick_upper);

    f.vault.rebalance(&5000, &false);
    let range_after = f.vault.get_range().unwrap();
    assert!(range_after.tick_lower > range_before.tick_lower);
    assert!(range_after.tick_lower < f.pool.tick() && f.pool.tick() < range_after.tick_upper);
}

#[test]
fn test_rebalance_slippage_exceeded() {
    let f = Fixture::initialized();
    f.deposit();
    let range = f.vault.get_range();
    let underlying = f.vault.get_underlying_balances();

    // Zero tolerance cannot absorb the pool fee
    f.vault.set_max_slippage(&f.owner, &0);
    assert_eq!(
        f.vault.try_executive_rebalance(&f.owner, &5000, &true),
        Err(Ok(VaultError::SlippageExceeded))
    );
    assert_eq!(f.vault.get_range(), range);
    assert_eq!(f.vault.get_underlying_balances(), underlying);
}

#[test]
fn test_locked_pool_surfaces_external_call_failure() {
    let f = Fixture::initialized();
    f.deposit();
    let range = f.vault.get_range();

    f.pool.set_locked(&true);
    assert_eq!(
        f.vault.try_executive_rebalance(&f.owner, &5000, &true),
        Err(Ok(VaultError::ExternalCallFailed))
    );
    assert_eq!(
        f.vault.try_burn_all(&f.owner, &f.owner),
        Err(Ok(VaultError::ExternalCallFailed))
    );
    assert_eq!(f.vault.get_range(), range);
    assert_eq!(f.balances(&f.owner), (0, 0));

    f.pool.set_locked(&false);
    let (amount0, amount1) = f.vault.burn_all(&f.owner, &f.owner);
    assert!(amount0 > 0 && amount1 > 0);
}

// === Configuration ===

#[test]
fn test_set_max_slippage() {
    let f = Fixture::initialized();
    let stranger = Address::generate(&f.env);

    assert_eq!(
        f.vault.try_set_max_slippage(&stranger, &50),
        Err(Ok(VaultError::Unauthorized))
    );
    assert_eq!(
        f.vault.try_set_max_slippage(&f.owner, &10_001),
        Err(Ok(VaultError::InvalidBasisPoints))
    );

    f.vault.set_max_slippage(&f.owner, &50);
    assert_eq!(f.vault.get_config().max_slippage_bps, 50);
}

// === Accounting ===

#[test]
fn test_fees_accrue_to_the_position() {
    let f = Fixture::initialized();
    f.deposit();
    let recipient = Address::generate(&f.env);

    f.user_buys_token0(&recipient);

    // Token1 was the input, so only token1 fees
    let (fees0, fees1) = f.vault.get_fees_earned();
    assert_eq!(fees0, 0);
    assert!(fees1 > 0);

    let (idle0, idle1) = f.balances(&f.vault.address);
    let (principal0, principal1) = f.vault.get_position_amounts();
    assert_eq!(
        f.vault.get_underlying_balances(),
        (idle0 + principal0 + fees0, idle1 + principal1 + fees1)
    );

    // Harvesting realizes exactly what was reported
    let reported = f.vault.get_underlying_balances();
    let (out0, out1) = f.vault.burn_all(&f.owner, &f.owner);
    assert_eq!((out0, out1), reported);
}

#[test]
fn test_compute_range_view_brackets_price() {
    let f = Fixture::initialized();
    let sqrt_price = f.pool.sqrt_price_x96();
    let range = f.vault.compute_range(&sqrt_price);

    let raw_lower = scale_sqrt_price(&f.env, sqrt_price, SQRT_70_PERCENT, false).unwrap();
    let raw_upper = scale_sqrt_price(&f.env, sqrt_price, SQRT_130_PERCENT, true).unwrap();
    assert!(range.sqrt_ratio_lower_x96 <= raw_lower);
    assert!(range.sqrt_ratio_upper_x96 >= raw_upper);

    // ln(1.3 / 0.7) / ln(1.0001) is about 6191 ticks, widened by at most two spacings
    assert!(range.tick_upper - range.tick_lower <= 6_191 + 2 * 60 + 2);

    assert_eq!(
        f.vault.try_compute_range(&0),
        Err(Ok(VaultError::PriceOutOfBounds))
    );
}

// === Scenario ===

#[test]
fn test_deposit_rebalance_swaps_withdraw_scenario() {
    let f = Fixture::initialized();

    assert_close(f.deposit() as i128, 3_710_480_276_463_250_620_911, 1_000_000_000_000_000);
    let liquidity = f.vault.executive_rebalance(&f.owner, &5000, &true);
    assert_close(liquidity as i128, 4_158_996_310_619_277_907_202, 1_000_000_000_000_000);

    for _ in 0..3 {
        f.user_buys_token0(&f.owner);
    }

    let liquidity = f.vault.rebalance(&5000, &true);
    assert_close(liquidity as i128, 4_213_670_944_914_742_908_466, 1_000_000_000_000_000);
    f.vault.burn_all(&f.owner, &f.owner);

    assert_eq!(f.vault.get_underlying_balances(), (0, 0));

    // Three user swaps' token0 output plus what the vault returns, about
    // 3.853x the token0 and 1.137x the token1 deposited
    let (final0, final1) = f.balances(&f.owner);
    assert_close(final0, 145_383_512_473_112_812_087_377, 145_383_512_473_112_812);
    assert_close(final1, 11_368_160_129_602_287_771, 11_368_160_129_602);
}
