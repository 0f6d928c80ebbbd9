//! Storage accessors, config guards and the transfer primitive.

use soroban_sdk::{token::TokenClient, Address, BytesN, Env, IntoVal, Val};

use crate::error::Error;
use crate::types::{DataKey, DeployedPosition, DepositRecord, Game, Round};

/// Persistent storage TTL in ledgers (~30 days at 5 s/ledger).
/// Bumped on every write so round records never expire mid-settlement.
pub const PERSISTENT_BUMP_LEDGERS: u32 = 518_400;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

pub fn require_initialized(env: &Env) -> Result<(), Error> {
    if !env.storage().instance().has(&DataKey::Admin) {
        return Err(Error::NotInitialized);
    }
    Ok(())
}

/// Verify that `caller` is the stored admin and has signed the invocation.
pub fn require_admin(env: &Env, caller: &Address) -> Result<(), Error> {
    let admin = get_admin(env)?;
    caller.require_auth();
    if caller != &admin {
        return Err(Error::NotAuthorized);
    }
    Ok(())
}

pub fn require_not_paused(env: &Env) -> Result<(), Error> {
    if is_paused(env) {
        return Err(Error::ContractPaused);
    }
    Ok(())
}

pub fn is_paused(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Paused)
        .unwrap_or(false)
}

pub fn get_admin(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(Error::NotInitialized)
}

pub fn get_protocol_treasury(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::ProtocolTreasury)
        .ok_or(Error::NotInitialized)
}

pub fn get_yield_source(env: &Env, asset: &Address) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::YieldSource(asset.clone()))
        .ok_or(Error::YieldSourceNotSet)
}

/// Hand out the next adapter position id.
pub fn next_position_id(env: &Env) -> Result<u64, Error> {
    let id: u64 = env
        .storage()
        .instance()
        .get(&DataKey::NextPositionId)
        .unwrap_or(0);
    let next = id.checked_add(1).ok_or(Error::Overflow)?;
    env.storage().instance().set(&DataKey::NextPositionId, &next);
    Ok(id)
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

pub fn has_game(env: &Env, game_id: &BytesN<32>) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Game(game_id.clone()))
}

pub fn load_game(env: &Env, game_id: &BytesN<32>) -> Result<Game, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Game(game_id.clone()))
        .ok_or(Error::GameNotFound)
}

pub fn save_game(env: &Env, game: &Game) {
    set_persistent(env, &DataKey::Game(game.id.clone()), game);
}

pub fn load_round(env: &Env, game_id: &BytesN<32>, round_id: u64) -> Result<Round, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Round(game_id.clone(), round_id))
        .ok_or(Error::RoundNotFound)
}

pub fn save_round(env: &Env, round: &Round) {
    set_persistent(env, &DataKey::Round(round.game_id.clone(), round.id), round);
}

pub fn load_deposit(
    env: &Env,
    game_id: &BytesN<32>,
    round_id: u64,
    depositor: &Address,
) -> Option<DepositRecord> {
    env.storage()
        .persistent()
        .get(&DataKey::Deposit(game_id.clone(), round_id, depositor.clone()))
}

pub fn save_deposit(
    env: &Env,
    game_id: &BytesN<32>,
    round_id: u64,
    depositor: &Address,
    record: &DepositRecord,
) {
    set_persistent(
        env,
        &DataKey::Deposit(game_id.clone(), round_id, depositor.clone()),
        record,
    );
}

pub fn load_position(env: &Env, game_id: &BytesN<32>, round_id: u64) -> Option<DeployedPosition> {
    env.storage()
        .persistent()
        .get(&DataKey::Position(game_id.clone(), round_id))
}

pub fn save_position(env: &Env, game_id: &BytesN<32>, round_id: u64, position: &DeployedPosition) {
    set_persistent(env, &DataKey::Position(game_id.clone(), round_id), position);
}

/// Write a value to persistent storage and extend its TTL in one step.
fn set_persistent<V: IntoVal<Env, Val>>(env: &Env, key: &DataKey, value: &V) {
    env.storage().persistent().set(key, value);
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);
}

// ---------------------------------------------------------------------------
// Guards and transfers
// ---------------------------------------------------------------------------

/// Run `f` holding the contract-wide single-flight lock.
///
/// Custody is shared by every game and round, so the lock covers the whole
/// contract rather than one round. On error the host rolls the invocation
/// back, lock write included.
pub fn non_reentrant<T>(env: &Env, f: impl FnOnce() -> Result<T, Error>) -> Result<T, Error> {
    if env
        .storage()
        .instance()
        .get(&DataKey::Locked)
        .unwrap_or(false)
    {
        return Err(Error::Reentrant);
    }
    env.storage().instance().set(&DataKey::Locked, &true);
    let result = f();
    env.storage().instance().remove(&DataKey::Locked);
    result
}

/// Move `amount` of `asset`; any token failure surfaces as `TransferFailed`.
pub fn transfer(
    env: &Env,
    asset: &Address,
    from: &Address,
    to: &Address,
    amount: i128,
) -> Result<(), Error> {
    match TokenClient::new(env, asset).try_transfer(from, to, &amount) {
        Ok(Ok(_)) => Ok(()),
        _ => Err(Error::TransferFailed),
    }
}
