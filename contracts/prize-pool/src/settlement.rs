//! Settlement engine: deploy → withdraw → settle → award / finalize.
//!
//! Every step is run by the game owner and checks the previous step's flag.
//! Flags that mark a step done are written before the external call of that
//! step; a failed call rolls the whole invocation back.
//!
//! Yield is always computed from this round's own position record:
//! `redeemed - deployed principal`, floored at zero. The pool's token balance
//! mixes every round on the same asset and is never consulted.

use soroban_sdk::{Address, BytesN, Env};
use yieldcade_shared::{split_yield, YieldSourceClient};

use crate::error::Error;
use crate::events::{FundsDeployed, FundsWithdrawn, PrizeAwarded, RoundFinalized, RoundSettled};
use crate::ledger::require_owner;
use crate::phase::{current_phase, require_phase};
use crate::storage;
use crate::types::{DeployedPosition, Phase};

/// Move the round's not-yet-deployed funds into its yield adapter.
pub fn deploy(
    env: &Env,
    operator: &Address,
    game_id: &BytesN<32>,
    round_id: u64,
) -> Result<i128, Error> {
    let game = storage::load_game(env, game_id)?;
    require_owner(&game, operator)?;
    let mut round = storage::load_round(env, game_id, round_id)?;

    let phase = current_phase(env, &round);
    if phase != Phase::InProgress && phase != Phase::Locking {
        return Err(Error::WrongPhase);
    }

    let mut position = match storage::load_position(env, game_id, round_id) {
        Some(position) => position,
        None => DeployedPosition {
            adapter: storage::get_yield_source(env, &game.asset)?,
            id: storage::next_position_id(env)?,
            principal: 0,
            claim: 0,
        },
    };

    let pooled = round
        .total_principal
        .checked_add(round.bonus_pool)
        .ok_or(Error::Overflow)?;
    let undeployed = pooled
        .checked_sub(position.principal)
        .ok_or(Error::Overflow)?;
    if undeployed <= 0 {
        return Err(Error::NothingToDeploy);
    }

    position.principal = pooled;
    round.deployed = true;
    storage::save_round(env, &round);
    storage::save_position(env, game_id, round_id, &position);

    storage::transfer(
        env,
        &game.asset,
        &env.current_contract_address(),
        &position.adapter,
        undeployed,
    )?;
    let claim = match YieldSourceClient::new(env, &position.adapter)
        .try_place_funds(&position.id, &undeployed)
    {
        Ok(Ok(claim)) if claim > 0 => claim,
        _ => return Err(Error::StrategyCallFailed),
    };

    position.claim = position.claim.checked_add(claim).ok_or(Error::Overflow)?;
    storage::save_position(env, game_id, round_id, &position);

    FundsDeployed {
        game_id: game_id.clone(),
        round_id,
        amount: undeployed,
        claim,
        deployed_principal: position.principal,
    }
    .publish(env);

    Ok(claim)
}

/// Redeem the round's whole claim once the lock window is over.
pub fn withdraw(
    env: &Env,
    operator: &Address,
    game_id: &BytesN<32>,
    round_id: u64,
) -> Result<i128, Error> {
    let game = storage::load_game(env, game_id)?;
    require_owner(&game, operator)?;
    let mut round = storage::load_round(env, game_id, round_id)?;
    require_phase(env, &round, Phase::ChoosingWinners)?;

    if round.withdrawn {
        return Err(Error::AlreadyWithdrawn);
    }
    let mut position = storage::load_position(env, game_id, round_id)
        .filter(|position| position.claim > 0)
        .ok_or(Error::FundsNotDeployed)?;

    round.withdrawn = true;
    position.claim = 0;
    storage::save_round(env, &round);
    storage::save_position(env, game_id, round_id, &position);

    let redeemed = match YieldSourceClient::new(env, &position.adapter)
        .try_withdraw_all(&position.id)
    {
        Ok(Ok(redeemed)) if redeemed >= 0 => redeemed,
        _ => return Err(Error::StrategyCallFailed),
    };

    round.redeemed = redeemed;
    round.shortfall = if position.principal > redeemed {
        position.principal - redeemed
    } else {
        0
    };
    storage::save_round(env, &round);

    FundsWithdrawn {
        game_id: game_id.clone(),
        round_id,
        redeemed,
        yield_amount: realized_yield(redeemed, position.principal),
    }
    .publish(env);

    Ok(redeemed)
}

/// Split the realized yield and pay the protocol and operator fees.
/// Returns the round's prize pool.
pub fn settle(
    env: &Env,
    operator: &Address,
    game_id: &BytesN<32>,
    round_id: u64,
) -> Result<i128, Error> {
    let game = storage::load_game(env, game_id)?;
    require_owner(&game, operator)?;
    let mut round = storage::load_round(env, game_id, round_id)?;
    require_phase(env, &round, Phase::ChoosingWinners)?;

    if round.settled {
        return Err(Error::AlreadySettled);
    }

    let deployed_principal = storage::load_position(env, game_id, round_id)
        .map(|position| position.principal)
        .unwrap_or(0);
    // A round that never deployed has nothing to withdraw and no yield.
    if deployed_principal > 0 && !round.withdrawn {
        return Err(Error::NotWithdrawn);
    }

    // Undeployed funds never left custody, so realized value minus
    // (principal + bonus pool) reduces to redeemed minus deployed principal.
    let yield_amount = realized_yield(round.redeemed, deployed_principal);
    let split = split_yield(yield_amount, game.dev_fee_bps).map_err(|_| Error::Overflow)?;
    let prize_pool = split
        .prize
        .checked_add(round.bonus_pool)
        .ok_or(Error::Overflow)?;

    round.settled = true;
    round.yield_amount = yield_amount;
    round.performance_fee = split.performance_fee;
    round.dev_fee = split.dev_fee;
    round.prize_pool = prize_pool;
    round.total_win = prize_pool;
    storage::save_round(env, &round);

    let this = env.current_contract_address();
    if split.performance_fee > 0 {
        let protocol_treasury = storage::get_protocol_treasury(env)?;
        storage::transfer(
            env,
            &game.asset,
            &this,
            &protocol_treasury,
            split.performance_fee,
        )?;
    }
    if split.dev_fee > 0 {
        storage::transfer(env, &game.asset, &this, &game.treasury, split.dev_fee)?;
    }

    RoundSettled {
        game_id: game_id.clone(),
        round_id,
        yield_amount,
        performance_fee: split.performance_fee,
        dev_fee: split.dev_fee,
        prize_pool,
    }
    .publish(env);

    Ok(prize_pool)
}

/// Credit `amount` of the remaining prize pool to a participant.
pub fn award(
    env: &Env,
    operator: &Address,
    game_id: &BytesN<32>,
    round_id: u64,
    winner: &Address,
    amount: i128,
) -> Result<(), Error> {
    let game = storage::load_game(env, game_id)?;
    require_owner(&game, operator)?;
    let mut round = storage::load_round(env, game_id, round_id)?;
    require_phase(env, &round, Phase::ChoosingWinners)?;

    if !round.settled {
        return Err(Error::NotSettled);
    }
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }
    if amount > round.total_win {
        return Err(Error::AwardExceedsPrizePool);
    }
    let mut record = storage::load_deposit(env, game_id, round_id, winner)
        .filter(|record| record.principal > 0)
        .ok_or(Error::NotParticipant)?;

    record.prize = record.prize.checked_add(amount).ok_or(Error::Overflow)?;
    round.total_win = round
        .total_win
        .checked_sub(amount)
        .ok_or(Error::Overflow)?;
    if round.total_win == 0 {
        round.distributing = true;
    }
    storage::save_round(env, &round);
    storage::save_deposit(env, game_id, round_id, winner, &record);

    PrizeAwarded {
        game_id: game_id.clone(),
        round_id,
        winner: winner.clone(),
        amount,
        remaining: round.total_win,
    }
    .publish(env);

    Ok(())
}

/// Open claims without allocating the rest of the prize pool.
/// The unallocated remainder stays in custody.
pub fn finalize(
    env: &Env,
    operator: &Address,
    game_id: &BytesN<32>,
    round_id: u64,
) -> Result<(), Error> {
    let game = storage::load_game(env, game_id)?;
    require_owner(&game, operator)?;
    let mut round = storage::load_round(env, game_id, round_id)?;
    require_phase(env, &round, Phase::ChoosingWinners)?;

    if !round.settled {
        return Err(Error::NotSettled);
    }

    round.distributing = true;
    storage::save_round(env, &round);

    RoundFinalized {
        game_id: game_id.clone(),
        round_id,
        unallocated: round.total_win,
    }
    .publish(env);

    Ok(())
}

/// Adapter value of a round's live position, zero once withdrawn.
pub fn position_value(env: &Env, game_id: &BytesN<32>, round_id: u64) -> Result<i128, Error> {
    storage::load_round(env, game_id, round_id)?;
    let position = match storage::load_position(env, game_id, round_id) {
        Some(position) if position.claim > 0 => position,
        _ => return Ok(0),
    };
    match YieldSourceClient::new(env, &position.adapter).try_current_value(&position.id) {
        Ok(Ok(value)) => Ok(value),
        _ => Err(Error::StrategyCallFailed),
    }
}

fn realized_yield(redeemed: i128, deployed_principal: i128) -> i128 {
    if redeemed > deployed_principal {
        redeemed - deployed_principal
    } else {
        0
    }
}
