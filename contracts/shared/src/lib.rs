//! Shared utilities and data structures for Yieldcade contracts.
//!
//! Holds the basis-point fee math used by the prize pool and the
//! `YieldSource` capability every yield adapter exposes.
#![no_std]
#![allow(unexpected_cfgs)]

use soroban_sdk::{contractclient, Address, Env};

/// Error codes for the fee helpers. Never crosses a contract boundary;
/// callers map it onto their own contract error.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Error {
    InvalidAmount = 1,
    InvalidRate = 2,
    Overflow = 3,
}

/// Constant for basis points divisor.
pub const BASIS_POINTS_DIVISOR: u32 = 10_000;

/// Protocol performance fee taken from every round's yield (20%).
pub const PERFORMANCE_FEE_BPS: u32 = 2_000;

/// Upper bound for a game's deposit fee (10%).
pub const MAX_DEPOSIT_FEE_BPS: u32 = 1_000;

/// Helper to calculate fee based on amount and basis points.
///
/// Integer division truncates, so the fee never exceeds the exact value.
pub fn calculate_fee(amount: i128, fee_bps: u32) -> Result<i128, Error> {
    if amount < 0 {
        return Err(Error::InvalidAmount);
    }
    if fee_bps > BASIS_POINTS_DIVISOR {
        return Err(Error::InvalidRate);
    }
    amount
        .checked_mul(fee_bps as i128)
        .and_then(|v| v.checked_div(BASIS_POINTS_DIVISOR as i128))
        .ok_or(Error::Overflow)
}

/// Result of splitting a round's yield between protocol, operator and winners.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct YieldSplit {
    pub performance_fee: i128,
    pub dev_fee: i128,
    pub prize: i128,
}

/// Split `yield_amount` in the fixed order: performance fee first, then the
/// operator's dev fee on what remains, the rest is prize.
///
/// `performance_fee + dev_fee + prize == yield_amount` always holds; each
/// truncation leaves the remainder in the prize.
pub fn split_yield(yield_amount: i128, dev_fee_bps: u32) -> Result<YieldSplit, Error> {
    let performance_fee = calculate_fee(yield_amount, PERFORMANCE_FEE_BPS)?;
    let after_performance = yield_amount
        .checked_sub(performance_fee)
        .ok_or(Error::Overflow)?;
    let dev_fee = calculate_fee(after_performance, dev_fee_bps)?;
    let prize = after_performance
        .checked_sub(dev_fee)
        .ok_or(Error::Overflow)?;
    Ok(YieldSplit {
        performance_fee,
        dev_fee,
        prize,
    })
}

/// Capability exposed by every yield adapter.
///
/// The prize pool pushes tokens to the adapter before `place_funds`; the
/// adapter credits them to `position` and answers with the claim it issued.
/// Positions are issued by the pool, one per round.
#[contractclient(name = "YieldSourceClient")]
pub trait YieldSource {
    /// Credit `amount` already transferred in to `position`; returns the claim.
    fn place_funds(env: Env, position: u64, amount: i128) -> i128;

    /// Redeem the whole claim of `position` back to the pool.
    fn withdraw_all(env: Env, position: u64) -> i128;

    /// Redeemable value of `position`. Informational only.
    fn current_value(env: Env, position: u64) -> i128;

    fn underlying_asset(env: Env) -> Address;
}
