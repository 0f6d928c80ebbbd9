//! Games, rounds and deposits.

use soroban_sdk::{xdr::ToXdr, Address, Bytes, BytesN, Env, String};
use yieldcade_shared::{calculate_fee, BASIS_POINTS_DIVISOR, MAX_DEPOSIT_FEE_BPS};

use crate::error::Error;
use crate::events::{Deposited, GameCreated, RoundCreated};
use crate::phase::require_phase;
use crate::storage;
use crate::types::{DepositRecord, Game, Phase, Round};

pub const MAX_NAME_LEN: u32 = 64;

/// `sha256(xdr(owner) || xdr(name))`: one id per (owner, name) pair.
pub fn derive_game_id(env: &Env, owner: &Address, name: &String) -> BytesN<32> {
    let mut preimage = Bytes::new(env);
    preimage.append(&owner.clone().to_xdr(env));
    preimage.append(&name.clone().to_xdr(env));
    env.crypto().sha256(&preimage).into()
}

/// Only the game's owner may run its rounds.
pub fn require_owner(game: &Game, caller: &Address) -> Result<(), Error> {
    caller.require_auth();
    if caller != &game.owner {
        return Err(Error::NotAuthorized);
    }
    Ok(())
}

pub fn create_game(
    env: &Env,
    owner: &Address,
    name: &String,
    dev_fee_bps: u32,
    deposit_fee_bps: u32,
    treasury: &Address,
    asset: &Address,
) -> Result<BytesN<32>, Error> {
    if dev_fee_bps > BASIS_POINTS_DIVISOR || deposit_fee_bps > MAX_DEPOSIT_FEE_BPS {
        return Err(Error::InvalidFeeConfig);
    }
    // Addresses cannot be null here; the pool itself is the unusable value.
    let this = env.current_contract_address();
    if treasury == &this || asset == &this {
        return Err(Error::InvalidAddress);
    }
    if name.len() == 0 || name.len() > MAX_NAME_LEN {
        return Err(Error::InvalidName);
    }

    let game_id = derive_game_id(env, owner, name);
    if storage::has_game(env, &game_id) {
        return Err(Error::GameAlreadyExists);
    }

    let game = Game {
        id: game_id.clone(),
        owner: owner.clone(),
        name: name.clone(),
        dev_fee_bps,
        deposit_fee_bps,
        treasury: treasury.clone(),
        asset: asset.clone(),
        round_count: 0,
    };
    storage::save_game(env, &game);

    GameCreated {
        game_id: game_id.clone(),
        owner: owner.clone(),
        name: name.clone(),
        dev_fee_bps,
        deposit_fee_bps,
        asset: asset.clone(),
    }
    .publish(env);

    Ok(game_id)
}

pub fn create_round(
    env: &Env,
    operator: &Address,
    game_id: &BytesN<32>,
    start_time: u64,
    end_time: u64,
    lock_duration: u64,
) -> Result<u64, Error> {
    let mut game = storage::load_game(env, game_id)?;
    require_owner(&game, operator)?;

    let now = env.ledger().timestamp();
    if start_time < now || end_time <= start_time {
        return Err(Error::InvalidRoundTimes);
    }

    let round_id = game.round_count;
    game.round_count = round_id.checked_add(1).ok_or(Error::Overflow)?;

    let round = Round {
        game_id: game_id.clone(),
        id: round_id,
        start_time,
        end_time,
        lock_duration,
        total_principal: 0,
        bonus_pool: 0,
        performance_fee: 0,
        dev_fee: 0,
        prize_pool: 0,
        total_win: 0,
        yield_amount: 0,
        redeemed: 0,
        shortfall: 0,
        deployed: false,
        withdrawn: false,
        settled: false,
        distributing: false,
    };
    storage::save_game(env, &game);
    storage::save_round(env, &round);

    RoundCreated {
        game_id: game_id.clone(),
        round_id,
        start_time,
        end_time,
        lock_duration,
    }
    .publish(env);

    Ok(round_id)
}

/// Take `amount` from `depositor` into custody and credit the net principal.
pub fn deposit(
    env: &Env,
    depositor: &Address,
    game_id: &BytesN<32>,
    round_id: u64,
    amount: i128,
) -> Result<(), Error> {
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }
    let game = storage::load_game(env, game_id)?;
    let mut round = storage::load_round(env, game_id, round_id)?;
    require_phase(env, &round, Phase::InProgress)?;

    let fee = calculate_fee(amount, game.deposit_fee_bps).map_err(|_| Error::Overflow)?;
    let net = amount.checked_sub(fee).ok_or(Error::Overflow)?;

    round.total_principal = round
        .total_principal
        .checked_add(net)
        .ok_or(Error::Overflow)?;
    round.bonus_pool = round.bonus_pool.checked_add(fee).ok_or(Error::Overflow)?;

    let mut record = storage::load_deposit(env, game_id, round_id, depositor).unwrap_or(
        DepositRecord {
            principal: 0,
            prize: 0,
            claimed: false,
        },
    );
    record.principal = record.principal.checked_add(net).ok_or(Error::Overflow)?;

    storage::save_round(env, &round);
    storage::save_deposit(env, game_id, round_id, depositor, &record);

    storage::transfer(
        env,
        &game.asset,
        depositor,
        &env.current_contract_address(),
        amount,
    )?;

    Deposited {
        game_id: game_id.clone(),
        round_id,
        depositor: depositor.clone(),
        gross: amount,
        fee,
        net,
    }
    .publish(env);

    Ok(())
}
