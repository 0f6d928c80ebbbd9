#![cfg(test)]

use super::*;
use soroban_sdk::{
    testutils::Address as _,
    token::{StellarAssetClient, TokenClient},
    Address, Env,
};

// -------------------------------------------------------------------
// Helpers
// -------------------------------------------------------------------

fn create_token<'a>(env: &'a Env, admin: &Address) -> (Address, StellarAssetClient<'a>) {
    let contract = env.register_stellar_asset_contract_v2(admin.clone());
    let client = StellarAssetClient::new(env, &contract.address());
    (contract.address(), client)
}

struct Setup<'a> {
    client: DirectStrategyClient<'a>,
    strategy: Address,
    admin: Address,
    pool: Address,
    token_addr: Address,
    token_sac: StellarAssetClient<'a>,
}

fn setup(env: &Env) -> Setup<'_> {
    let admin = Address::generate(env);
    let pool = Address::generate(env);
    let token_admin = Address::generate(env);
    let (token_addr, token_sac) = create_token(env, &token_admin);

    let strategy = env.register(DirectStrategy, ());
    let client = DirectStrategyClient::new(env, &strategy);

    env.mock_all_auths();
    client.init(&admin, &pool, &token_addr);

    Setup {
        client,
        strategy,
        admin,
        pool,
        token_addr,
        token_sac,
    }
}

/// Simulate the pool pushing `amount` in and placing it.
fn place(s: &Setup, position: u64, amount: i128) -> i128 {
    s.token_sac.mint(&s.strategy, &amount);
    s.client.place_funds(&position, &amount)
}

fn tc<'a>(env: &'a Env, token: &Address) -> TokenClient<'a> {
    TokenClient::new(env, token)
}

// -------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------

#[test]
fn test_init_rejects_reinit() {
    let env = Env::default();
    let s = setup(&env);

    let result = s.client.try_init(&s.admin, &s.pool, &s.token_addr);
    assert_eq!(result, Err(Ok(Error::AlreadyInitialized)));
}

#[test]
fn test_place_funds_issues_receipt_one_to_one() {
    let env = Env::default();
    let s = setup(&env);

    assert_eq!(place(&s, 1, 1_000), 1_000);
    assert_eq!(place(&s, 1, 500), 500);
    assert_eq!(s.client.current_value(&1u64), 1_500);
    assert_eq!(s.client.current_value(&2u64), 0);
}

#[test]
fn test_withdraw_all_pays_rate_to_pool() {
    let env = Env::default();
    let s = setup(&env);
    let token = tc(&env, &s.token_addr);

    s.client.set_rate(&s.admin, &1_000);
    place(&s, 7, 3_000);
    // Surplus for the 10% return.
    s.token_sac.mint(&s.strategy, &300);

    assert_eq!(s.client.current_value(&7u64), 3_300);
    assert_eq!(s.client.withdraw_all(&7u64), 3_300);
    assert_eq!(token.balance(&s.pool), 3_300);
    assert_eq!(s.client.current_value(&7u64), 0);
}

#[test]
fn test_withdraw_all_empty_position_returns_zero() {
    let env = Env::default();
    let s = setup(&env);

    assert_eq!(s.client.withdraw_all(&42u64), 0);
}

#[test]
fn test_negative_rate_returns_less_than_principal() {
    let env = Env::default();
    let s = setup(&env);
    let token = tc(&env, &s.token_addr);

    s.client.set_rate(&s.admin, &-500);
    place(&s, 1, 2_000);

    assert_eq!(s.client.withdraw_all(&1u64), 1_900);
    assert_eq!(token.balance(&s.pool), 1_900);
}

#[test]
fn test_positions_are_isolated() {
    let env = Env::default();
    let s = setup(&env);

    place(&s, 1, 1_000);
    place(&s, 2, 4_000);

    assert_eq!(s.client.withdraw_all(&1u64), 1_000);
    assert_eq!(s.client.current_value(&2u64), 4_000);
}

#[test]
fn test_rejecting_placements() {
    let env = Env::default();
    let s = setup(&env);

    s.client.set_accepting(&s.admin, &false);
    s.token_sac.mint(&s.strategy, &100);
    assert_eq!(
        s.client.try_place_funds(&1u64, &100),
        Err(Ok(Error::DepositsRejected))
    );

    s.client.set_accepting(&s.admin, &true);
    assert_eq!(s.client.place_funds(&1u64, &100), 100);
}

#[test]
fn test_withdraw_without_reserves_fails() {
    let env = Env::default();
    let s = setup(&env);

    s.client.set_rate(&s.admin, &5_000);
    place(&s, 1, 1_000);

    assert_eq!(
        s.client.try_withdraw_all(&1u64),
        Err(Ok(Error::InsufficientReserves))
    );
    // Nothing moved, position intact.
    assert_eq!(s.client.current_value(&1u64), 1_500);
}

#[test]
fn test_invalid_inputs_rejected() {
    let env = Env::default();
    let s = setup(&env);

    assert_eq!(
        s.client.try_place_funds(&1u64, &0),
        Err(Ok(Error::InvalidAmount))
    );
    assert_eq!(
        s.client.try_set_rate(&s.admin, &-10_001),
        Err(Ok(Error::InvalidRate))
    );
}

#[test]
fn test_admin_only_setters() {
    let env = Env::default();
    let s = setup(&env);
    let outsider = Address::generate(&env);

    assert_eq!(
        s.client.try_set_rate(&outsider, &100),
        Err(Ok(Error::NotAuthorized))
    );
    assert_eq!(
        s.client.try_set_accepting(&outsider, &false),
        Err(Ok(Error::NotAuthorized))
    );
}

#[test]
fn test_underlying_asset_and_config() {
    let env = Env::default();
    let s = setup(&env);

    assert_eq!(s.client.underlying_asset(), s.token_addr);
    let config = s.client.get_config();
    assert_eq!(config.pool, s.pool);
    assert_eq!(config.rate_bps, 0);
    assert!(config.accepting);
}
