use soroban_sdk::{Address, BytesN, Env};

use crate::error::Error;
use crate::events::Claimed;
use crate::phase::require_phase;
use crate::storage;
use crate::types::Phase;

/// Pay `principal + prize` to `depositor`, at most once per round.
pub fn claim(
    env: &Env,
    depositor: &Address,
    game_id: &BytesN<32>,
    round_id: u64,
) -> Result<i128, Error> {
    let game = storage::load_game(env, game_id)?;
    let round = storage::load_round(env, game_id, round_id)?;
    require_phase(env, &round, Phase::DistributingRewards)?;

    let mut record = storage::load_deposit(env, game_id, round_id, depositor)
        .ok_or(Error::DepositNotFound)?;
    if record.principal <= 0 {
        return Err(Error::NoPrincipal);
    }
    if record.claimed {
        return Err(Error::AlreadyClaimed);
    }

    let payout = record
        .principal
        .checked_add(record.prize)
        .ok_or(Error::Overflow)?;

    // Mark claimed before the token leaves custody.
    record.claimed = true;
    storage::save_deposit(env, game_id, round_id, depositor, &record);

    storage::transfer(
        env,
        &game.asset,
        &env.current_contract_address(),
        depositor,
        payout,
    )?;

    Claimed {
        game_id: game_id.clone(),
        round_id,
        depositor: depositor.clone(),
        amount: payout,
    }
    .publish(env);

    Ok(payout)
}
