//! Yieldcade Share Vault Adapter
//!
//! Standardized share vault behind the `YieldSource` capability. Every
//! placement mints shares against the vault's managed assets; yield accrues
//! to all share holders whenever assets are donated to the vault (strategy
//! harvests, sponsor top-ups). Positions are share balances keyed by the
//! position id the prize pool issues.
//!
//! ## Share math
//! Both sides carry a virtual offset (`VIRTUAL_SHARES`, `VIRTUAL_ASSETS`):
//! - mint: `shares = amount * (total_shares + VS) / (assets_before + VA)`
//! - redeem: `assets = shares * (total_assets + VA) / (total_shares + VS)`
//!
//! Both round down, so rounding always stays inside the vault. The offset
//! makes a direct donation into a near-empty vault accrue mostly to the
//! virtual shares, so it cannot inflate the share price against a later
//! placement. A placement whose shares are worth less than
//! `amount - MAX_PLACEMENT_LOSS` right after minting is rejected.
//!
//! ## Invariant
//! `total_shares == sum(position shares)`. Managed assets are the vault's
//! token balance; the pool pushes tokens in before calling `place_funds`.
#![no_std]
#![allow(unexpected_cfgs)]

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, token::TokenClient,
    Address, Env,
};

pub const PERSISTENT_BUMP_LEDGERS: u32 = 518_400;

/// Shares minted per unit of asset in an empty vault.
pub const VIRTUAL_SHARES: i128 = 1_000_000;
pub const VIRTUAL_ASSETS: i128 = 1;

/// Rounding dust a placement may lose on entry.
pub const MAX_PLACEMENT_LOSS: i128 = 1;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    NotAuthorized = 3,
    InvalidAmount = 4,
    ZeroShares = 5,
    Overflow = 6,
    PlacementLoss = 7,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    // --- instance() ---
    Admin,
    Pool,
    Asset,
    TotalShares,
    // --- persistent() ---
    Shares(u64),
}

/// Snapshot returned by `vault_state`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultState {
    pub total_assets: i128,
    pub total_shares: i128,
}

#[contractevent]
pub struct SharesMinted {
    #[topic]
    pub position: u64,
    pub assets: i128,
    pub shares: i128,
}

#[contractevent]
pub struct SharesRedeemed {
    #[topic]
    pub position: u64,
    pub shares: i128,
    pub assets: i128,
}

#[contract]
pub struct ShareVault;

#[contractimpl]
impl ShareVault {
    /// Bind the vault to the prize pool it serves and its underlying asset.
    pub fn init(env: Env, admin: Address, pool: Address, asset: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Pool) {
            return Err(Error::AlreadyInitialized);
        }
        admin.require_auth();

        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Pool, &pool);
        env.storage().instance().set(&DataKey::Asset, &asset);
        env.storage().instance().set(&DataKey::TotalShares, &0i128);
        Ok(())
    }

    /// Mint shares for `amount` of assets the pool already pushed in.
    pub fn place_funds(env: Env, position: u64, amount: i128) -> Result<i128, Error> {
        require_pool(&env)?;
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let total_shares = get_total_shares(&env);
        let assets_before = total_assets(&env)
            .checked_sub(amount)
            .ok_or(Error::Overflow)?;
        // The tokens must already be in the vault.
        if assets_before < 0 {
            return Err(Error::InvalidAmount);
        }

        let shares = convert_to_shares(amount, assets_before, total_shares)?;
        if shares == 0 {
            return Err(Error::ZeroShares);
        }

        let new_total = total_shares.checked_add(shares).ok_or(Error::Overflow)?;
        let placed_value = convert_to_assets(shares, total_assets(&env), new_total)?;
        if placed_value < amount - MAX_PLACEMENT_LOSS {
            return Err(Error::PlacementLoss);
        }

        let position_shares = get_shares(&env, position)
            .checked_add(shares)
            .ok_or(Error::Overflow)?;
        set_shares(&env, position, position_shares);
        env.storage().instance().set(&DataKey::TotalShares, &new_total);

        SharesMinted {
            position,
            assets: amount,
            shares,
        }
        .publish(&env);
        Ok(shares)
    }

    /// Burn every share of `position` and send the assets to the pool.
    pub fn withdraw_all(env: Env, position: u64) -> Result<i128, Error> {
        let pool = require_pool(&env)?;

        let shares = get_shares(&env, position);
        if shares == 0 {
            return Ok(0);
        }
        let total_shares = get_total_shares(&env);
        let assets = convert_to_assets(shares, total_assets(&env), total_shares)?;

        env.storage().persistent().remove(&DataKey::Shares(position));
        let remaining = total_shares.checked_sub(shares).ok_or(Error::Overflow)?;
        env.storage().instance().set(&DataKey::TotalShares, &remaining);

        if assets > 0 {
            TokenClient::new(&env, &get_asset(&env)).transfer(
                &env.current_contract_address(),
                &pool,
                &assets,
            );
        }

        SharesRedeemed {
            position,
            shares,
            assets,
        }
        .publish(&env);
        Ok(assets)
    }

    pub fn current_value(env: Env, position: u64) -> Result<i128, Error> {
        require_initialized(&env)?;
        convert_to_assets(
            get_shares(&env, position),
            total_assets(&env),
            get_total_shares(&env),
        )
    }

    pub fn underlying_asset(env: Env) -> Result<Address, Error> {
        require_initialized(&env)?;
        Ok(get_asset(&env))
    }

    /// Share balance of a position.
    pub fn shares_of(env: Env, position: u64) -> i128 {
        get_shares(&env, position)
    }

    pub fn vault_state(env: Env) -> Result<VaultState, Error> {
        require_initialized(&env)?;
        Ok(VaultState {
            total_assets: total_assets(&env),
            total_shares: get_total_shares(&env),
        })
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn convert_to_shares(assets: i128, total_assets: i128, total_shares: i128) -> Result<i128, Error> {
    let shares_side = total_shares
        .checked_add(VIRTUAL_SHARES)
        .ok_or(Error::Overflow)?;
    let assets_side = total_assets
        .checked_add(VIRTUAL_ASSETS)
        .ok_or(Error::Overflow)?;
    assets
        .checked_mul(shares_side)
        .and_then(|v| v.checked_div(assets_side))
        .ok_or(Error::Overflow)
}

fn convert_to_assets(shares: i128, total_assets: i128, total_shares: i128) -> Result<i128, Error> {
    if shares == 0 {
        return Ok(0);
    }
    let assets_side = total_assets
        .checked_add(VIRTUAL_ASSETS)
        .ok_or(Error::Overflow)?;
    let shares_side = total_shares
        .checked_add(VIRTUAL_SHARES)
        .ok_or(Error::Overflow)?;
    shares
        .checked_mul(assets_side)
        .and_then(|v| v.checked_div(shares_side))
        .ok_or(Error::Overflow)
}

fn require_initialized(env: &Env) -> Result<(), Error> {
    if !env.storage().instance().has(&DataKey::Pool) {
        return Err(Error::NotInitialized);
    }
    Ok(())
}

fn require_pool(env: &Env) -> Result<Address, Error> {
    let pool: Address = env
        .storage()
        .instance()
        .get(&DataKey::Pool)
        .ok_or(Error::NotInitialized)?;
    pool.require_auth();
    Ok(pool)
}

fn get_asset(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&DataKey::Asset)
        .expect("ShareVault: asset not set")
}

fn total_assets(env: &Env) -> i128 {
    TokenClient::new(env, &get_asset(env)).balance(&env.current_contract_address())
}

fn get_total_shares(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::TotalShares)
        .unwrap_or(0)
}

fn get_shares(env: &Env, position: u64) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Shares(position))
        .unwrap_or(0)
}

fn set_shares(env: &Env, position: u64, shares: i128) {
    let key = DataKey::Shares(position);
    env.storage().persistent().set(&key, &shares);
    env.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);
}
