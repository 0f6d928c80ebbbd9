//! Yieldcade Direct Strategy Adapter
//!
//! Deterministic yield source behind the `YieldSource` capability. Funds
//! placed by the prize pool are held per position and paid back at a fixed
//! rate set by the strategy admin:
//!
//! `redeemed = principal * (10_000 + rate_bps) / 10_000`
//!
//! A positive rate models a performing strategy (the admin pre-funds the
//! surplus), zero a flat one and a negative rate an underperforming one.
//! The admin can also stop accepting placements to model a facility that
//! rejects deposits.
//!
//! ## Storage Strategy
//! - `instance()`: Admin, Pool, Token, RateBps, Accepting.
//! - `persistent()`: per-position principal, bumped on every write.
#![no_std]
#![allow(unexpected_cfgs)]

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, token::TokenClient,
    Address, Env,
};

use yieldcade_shared::BASIS_POINTS_DIVISOR;

pub const PERSISTENT_BUMP_LEDGERS: u32 = 518_400;

/// A rate below this would return a negative amount.
const MIN_RATE_BPS: i128 = -(BASIS_POINTS_DIVISOR as i128);

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    NotAuthorized = 3,
    InvalidAmount = 4,
    InvalidRate = 5,
    DepositsRejected = 6,
    InsufficientReserves = 7,
    Overflow = 8,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Pool,
    Token,
    RateBps,
    Accepting,
    Position(u64),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StrategyConfig {
    pub admin: Address,
    pub pool: Address,
    pub token: Address,
    pub rate_bps: i128,
    pub accepting: bool,
}

#[contractevent]
pub struct FundsPlaced {
    #[topic]
    pub position: u64,
    pub amount: i128,
}

#[contractevent]
pub struct FundsRedeemed {
    #[topic]
    pub position: u64,
    pub principal: i128,
    pub redeemed: i128,
}

#[contractevent]
pub struct RateChanged {
    pub rate_bps: i128,
}

#[contractevent]
pub struct AcceptingChanged {
    pub accepting: bool,
}

#[contract]
pub struct DirectStrategy;

#[contractimpl]
impl DirectStrategy {
    /// Bind the strategy to the prize pool it serves and the token it holds.
    pub fn init(env: Env, admin: Address, pool: Address, token: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(Error::AlreadyInitialized);
        }
        admin.require_auth();

        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Pool, &pool);
        env.storage().instance().set(&DataKey::Token, &token);
        env.storage().instance().set(&DataKey::RateBps, &0i128);
        env.storage().instance().set(&DataKey::Accepting, &true);
        Ok(())
    }

    /// Set the return rate applied at redemption. Admin only.
    pub fn set_rate(env: Env, admin: Address, rate_bps: i128) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        if rate_bps < MIN_RATE_BPS {
            return Err(Error::InvalidRate);
        }
        env.storage().instance().set(&DataKey::RateBps, &rate_bps);
        RateChanged { rate_bps }.publish(&env);
        Ok(())
    }

    /// Toggle whether new placements are accepted. Admin only.
    pub fn set_accepting(env: Env, admin: Address, accepting: bool) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        env.storage().instance().set(&DataKey::Accepting, &accepting);
        AcceptingChanged { accepting }.publish(&env);
        Ok(())
    }

    /// Credit `amount`, already pushed in by the pool, to `position`.
    /// The receipt is issued 1:1 with principal.
    pub fn place_funds(env: Env, position: u64, amount: i128) -> Result<i128, Error> {
        require_pool(&env)?;
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        if !is_accepting(&env) {
            return Err(Error::DepositsRejected);
        }

        let principal = get_principal(&env, position)
            .checked_add(amount)
            .ok_or(Error::Overflow)?;
        set_principal(&env, position, principal);

        FundsPlaced { position, amount }.publish(&env);
        Ok(amount)
    }

    /// Pay the position's principal plus the configured return to the pool.
    pub fn withdraw_all(env: Env, position: u64) -> Result<i128, Error> {
        let pool = require_pool(&env)?;

        let principal = get_principal(&env, position);
        if principal == 0 {
            return Ok(0);
        }
        let redeemed = redeem_value(principal, get_rate(&env))?;

        // Clear the position before paying out.
        env.storage().persistent().remove(&DataKey::Position(position));

        let token = TokenClient::new(&env, &get_token(&env));
        if token.balance(&env.current_contract_address()) < redeemed {
            return Err(Error::InsufficientReserves);
        }
        if redeemed > 0 {
            token.transfer(&env.current_contract_address(), &pool, &redeemed);
        }

        FundsRedeemed {
            position,
            principal,
            redeemed,
        }
        .publish(&env);
        Ok(redeemed)
    }

    pub fn current_value(env: Env, position: u64) -> Result<i128, Error> {
        require_initialized(&env)?;
        redeem_value(get_principal(&env, position), get_rate(&env))
    }

    pub fn underlying_asset(env: Env) -> Result<Address, Error> {
        require_initialized(&env)?;
        Ok(get_token(&env))
    }

    pub fn get_config(env: Env) -> Result<StrategyConfig, Error> {
        require_initialized(&env)?;
        Ok(StrategyConfig {
            admin: env
                .storage()
                .instance()
                .get(&DataKey::Admin)
                .ok_or(Error::NotInitialized)?,
            pool: env
                .storage()
                .instance()
                .get(&DataKey::Pool)
                .ok_or(Error::NotInitialized)?,
            token: get_token(&env),
            rate_bps: get_rate(&env),
            accepting: is_accepting(&env),
        })
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn redeem_value(principal: i128, rate_bps: i128) -> Result<i128, Error> {
    principal
        .checked_mul(
            (BASIS_POINTS_DIVISOR as i128)
                .checked_add(rate_bps)
                .ok_or(Error::Overflow)?,
        )
        .and_then(|v| v.checked_div(BASIS_POINTS_DIVISOR as i128))
        .ok_or(Error::Overflow)
}

fn require_initialized(env: &Env) -> Result<(), Error> {
    if !env.storage().instance().has(&DataKey::Admin) {
        return Err(Error::NotInitialized);
    }
    Ok(())
}

fn require_admin(env: &Env, caller: &Address) -> Result<(), Error> {
    let admin: Address = env
        .storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(Error::NotInitialized)?;
    caller.require_auth();
    if caller != &admin {
        return Err(Error::NotAuthorized);
    }
    Ok(())
}

/// Only the bound prize pool may move funds in or out.
fn require_pool(env: &Env) -> Result<Address, Error> {
    let pool: Address = env
        .storage()
        .instance()
        .get(&DataKey::Pool)
        .ok_or(Error::NotInitialized)?;
    pool.require_auth();
    Ok(pool)
}

fn get_token(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&DataKey::Token)
        .expect("DirectStrategy: token not set")
}

fn get_rate(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::RateBps)
        .unwrap_or(0)
}

fn is_accepting(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Accepting)
        .unwrap_or(false)
}

fn get_principal(env: &Env, position: u64) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Position(position))
        .unwrap_or(0)
}

fn set_principal(env: &Env, position: u64, principal: i128) {
    let key = DataKey::Position(position);
    env.storage().persistent().set(&key, &principal);
    env.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);
}

#[cfg(test)]
mod test;
