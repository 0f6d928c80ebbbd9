//! Yieldcade Prize Pool Contract
//!
//! No-loss prize rounds. Depositors put principal into time-boxed rounds;
//! the game operator deploys the pooled principal into a yield adapter for
//! the lock window, withdraws it, and the realized yield (never principal)
//! funds a prize pool awarded to chosen depositors. Every depositor claims
//! back at least their full net principal.
//!
//! ## Round lifecycle
//! `NotStarted → InProgress → Locking → ChoosingWinners → DistributingRewards`
//!
//! 1. `deposit` while InProgress.
//! 2. `deploy` while InProgress or Locking; repeatable, moves only the delta.
//! 3. `withdraw`, `settle`, then `award` / `finalize` while ChoosingWinners.
//! 4. `claim` while DistributingRewards.
//!
//! ## Yield split
//! `performance_fee = yield * 20%` to the protocol treasury, `dev_fee` =
//! game rate of the rest to the game treasury, the remainder plus the
//! deposit-fee bonus pool is the prize pool.
//!
//! ## Storage Strategy
//! - `instance()`: Admin, ProtocolTreasury, Paused, Locked, NextPositionId
//!   and the per-asset yield-source registry.
//! - `persistent()`: Game, Round, Deposit and Position tables, each entry
//!   bumped on every write.
//!
//! ## Invariant
//! For every round: `total_principal + bonus_pool` is held either in pool
//! custody or in the round's adapter position. Custody is shared between
//! rounds on the same asset, so all accounting is per round; the pool's
//! token balance is never used to infer a round's yield.
#![no_std]
#![allow(unexpected_cfgs)]

use soroban_sdk::{contract, contractimpl, Address, BytesN, Env, String};
use yieldcade_shared::YieldSourceClient;

mod claim;
mod error;
mod events;
mod ledger;
mod phase;
mod settlement;
mod storage;
mod types;

pub use error::{Error, ErrorKind};
pub use ledger::MAX_NAME_LEN;
pub use storage::PERSISTENT_BUMP_LEDGERS;
pub use types::{DataKey, DeployedPosition, DepositRecord, Game, Phase, PoolConfig, Round};

use events::{Initialized, PauseChanged, ProtocolTreasurySet, YieldSourceSet};
use storage::{non_reentrant, require_admin, require_initialized, require_not_paused};

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct PrizePool;

#[contractimpl]
impl PrizePool {
    // -----------------------------------------------------------------------
    // admin
    // -----------------------------------------------------------------------

    /// Initialize the pool. May only be called once.
    ///
    /// `protocol_treasury` receives the performance fee of every round.
    pub fn init(env: Env, admin: Address, protocol_treasury: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(Error::AlreadyInitialized);
        }
        admin.require_auth();

        if protocol_treasury == env.current_contract_address() {
            return Err(Error::InvalidAddress);
        }

        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage()
            .instance()
            .set(&DataKey::ProtocolTreasury, &protocol_treasury);
        env.storage().instance().set(&DataKey::Paused, &false);
        env.storage().instance().set(&DataKey::NextPositionId, &0u64);
        env.storage()
            .instance()
            .extend_ttl(PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);

        Initialized {
            admin,
            protocol_treasury,
        }
        .publish(&env);

        Ok(())
    }

    pub fn pause(env: Env, admin: Address) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        if storage::is_paused(&env) {
            return Err(Error::AlreadyPaused);
        }

        env.storage().instance().set(&DataKey::Paused, &true);
        PauseChanged {
            paused: true,
            admin,
        }
        .publish(&env);
        Ok(())
    }

    pub fn unpause(env: Env, admin: Address) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        if !storage::is_paused(&env) {
            return Err(Error::NotPaused);
        }

        env.storage().instance().set(&DataKey::Paused, &false);
        PauseChanged {
            paused: false,
            admin,
        }
        .publish(&env);
        Ok(())
    }

    /// Register the adapter that deploys funds of `asset`. Admin only.
    ///
    /// The adapter must report `asset` as its underlying asset. Rounds that
    /// already deployed keep the adapter they deployed into.
    pub fn set_yield_source(
        env: Env,
        admin: Address,
        asset: Address,
        adapter: Address,
    ) -> Result<(), Error> {
        require_admin(&env, &admin)?;

        let served = match YieldSourceClient::new(&env, &adapter).try_underlying_asset() {
            Ok(Ok(served)) => served,
            _ => return Err(Error::StrategyCallFailed),
        };
        if served != asset {
            return Err(Error::AssetMismatch);
        }

        env.storage()
            .instance()
            .set(&DataKey::YieldSource(asset.clone()), &adapter);
        env.storage()
            .instance()
            .extend_ttl(PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);

        YieldSourceSet { asset, adapter }.publish(&env);
        Ok(())
    }

    pub fn set_protocol_treasury(env: Env, admin: Address, treasury: Address) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        if treasury == env.current_contract_address() {
            return Err(Error::InvalidAddress);
        }

        env.storage()
            .instance()
            .set(&DataKey::ProtocolTreasury, &treasury);
        ProtocolTreasurySet { treasury }.publish(&env);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // games and rounds
    // -----------------------------------------------------------------------

    /// Register a game owned by `owner`. The id is derived from
    /// `(owner, name)`, so an owner cannot reuse a name.
    ///
    /// `dev_fee_bps` is capped at 10000 and `deposit_fee_bps` at 1000.
    pub fn create_game(
        env: Env,
        owner: Address,
        name: String,
        dev_fee_bps: u32,
        deposit_fee_bps: u32,
        treasury: Address,
        asset: Address,
    ) -> Result<BytesN<32>, Error> {
        require_initialized(&env)?;
        require_not_paused(&env)?;
        non_reentrant(&env, || {
            owner.require_auth();
            ledger::create_game(
                &env,
                &owner,
                &name,
                dev_fee_bps,
                deposit_fee_bps,
                &treasury,
                &asset,
            )
        })
    }

    /// Open a new round of `game_id`. Game owner only. Returns the round id.
    pub fn create_round(
        env: Env,
        operator: Address,
        game_id: BytesN<32>,
        start_time: u64,
        end_time: u64,
        lock_duration: u64,
    ) -> Result<u64, Error> {
        require_initialized(&env)?;
        require_not_paused(&env)?;
        non_reentrant(&env, || {
            ledger::create_round(&env, &operator, &game_id, start_time, end_time, lock_duration)
        })
    }

    /// Deposit `amount` of the game's asset into a round that is InProgress.
    ///
    /// With a deposit fee configured, the fee goes to the round's bonus pool
    /// and only the net amount is credited as principal.
    pub fn deposit(
        env: Env,
        depositor: Address,
        game_id: BytesN<32>,
        round_id: u64,
        amount: i128,
    ) -> Result<(), Error> {
        require_initialized(&env)?;
        require_not_paused(&env)?;
        depositor.require_auth();
        non_reentrant(&env, || {
            ledger::deposit(&env, &depositor, &game_id, round_id, amount)
        })
    }

    // -----------------------------------------------------------------------
    // settlement
    // -----------------------------------------------------------------------

    /// Send the round's undeployed funds to the yield adapter. Returns the
    /// claim issued for this delta.
    pub fn deploy(
        env: Env,
        operator: Address,
        game_id: BytesN<32>,
        round_id: u64,
    ) -> Result<i128, Error> {
        require_initialized(&env)?;
        require_not_paused(&env)?;
        non_reentrant(&env, || settlement::deploy(&env, &operator, &game_id, round_id))
    }

    /// Redeem the round's position. Returns the assets received.
    pub fn withdraw(
        env: Env,
        operator: Address,
        game_id: BytesN<32>,
        round_id: u64,
    ) -> Result<i128, Error> {
        require_initialized(&env)?;
        require_not_paused(&env)?;
        non_reentrant(&env, || settlement::withdraw(&env, &operator, &game_id, round_id))
    }

    /// Compute the yield, pay protocol and dev fees, fix the prize pool.
    /// Returns the prize pool.
    pub fn settle(
        env: Env,
        operator: Address,
        game_id: BytesN<32>,
        round_id: u64,
    ) -> Result<i128, Error> {
        require_initialized(&env)?;
        require_not_paused(&env)?;
        non_reentrant(&env, || settlement::settle(&env, &operator, &game_id, round_id))
    }

    /// Award `amount` of the prize pool to `winner`. When the pool is
    /// exhausted the round moves to DistributingRewards.
    pub fn award(
        env: Env,
        operator: Address,
        game_id: BytesN<32>,
        round_id: u64,
        winner: Address,
        amount: i128,
    ) -> Result<(), Error> {
        require_initialized(&env)?;
        require_not_paused(&env)?;
        non_reentrant(&env, || {
            settlement::award(&env, &operator, &game_id, round_id, &winner, amount)
        })
    }

    /// Move a settled round to DistributingRewards, leaving any unawarded
    /// prize unallocated.
    pub fn finalize(
        env: Env,
        operator: Address,
        game_id: BytesN<32>,
        round_id: u64,
    ) -> Result<(), Error> {
        require_initialized(&env)?;
        require_not_paused(&env)?;
        non_reentrant(&env, || settlement::finalize(&env, &operator, &game_id, round_id))
    }

    // -----------------------------------------------------------------------
    // claim
    // -----------------------------------------------------------------------

    /// Pay the depositor's principal plus awarded prize. Once per round.
    pub fn claim(
        env: Env,
        depositor: Address,
        game_id: BytesN<32>,
        round_id: u64,
    ) -> Result<i128, Error> {
        require_initialized(&env)?;
        require_not_paused(&env)?;
        depositor.require_auth();
        non_reentrant(&env, || claim::claim(&env, &depositor, &game_id, round_id))
    }

    // -----------------------------------------------------------------------
    // queries
    // -----------------------------------------------------------------------

    pub fn get_game(env: Env, game_id: BytesN<32>) -> Result<Game, Error> {
        storage::load_game(&env, &game_id)
    }

    pub fn get_round(env: Env, game_id: BytesN<32>, round_id: u64) -> Result<Round, Error> {
        storage::load_round(&env, &game_id, round_id)
    }

    pub fn get_deposit(
        env: Env,
        game_id: BytesN<32>,
        round_id: u64,
        depositor: Address,
    ) -> Result<DepositRecord, Error> {
        storage::load_deposit(&env, &game_id, round_id, &depositor).ok_or(Error::DepositNotFound)
    }

    pub fn get_position(
        env: Env,
        game_id: BytesN<32>,
        round_id: u64,
    ) -> Result<DeployedPosition, Error> {
        storage::load_position(&env, &game_id, round_id).ok_or(Error::FundsNotDeployed)
    }

    /// Phase of the round at the current ledger timestamp.
    pub fn get_phase(env: Env, game_id: BytesN<32>, round_id: u64) -> Result<Phase, Error> {
        let round = storage::load_round(&env, &game_id, round_id)?;
        Ok(phase::current_phase(&env, &round))
    }

    /// Phase the round would be in at `timestamp`.
    pub fn compute_phase(
        env: Env,
        game_id: BytesN<32>,
        round_id: u64,
        timestamp: u64,
    ) -> Result<Phase, Error> {
        let round = storage::load_round(&env, &game_id, round_id)?;
        Ok(phase::phase_at(&round, timestamp))
    }

    /// Current adapter value of the round's position. Informational only;
    /// settlement uses redeemed amounts.
    pub fn position_value(env: Env, game_id: BytesN<32>, round_id: u64) -> Result<i128, Error> {
        settlement::position_value(&env, &game_id, round_id)
    }

    /// Id a game of `owner` named `name` has or would get.
    pub fn game_id(env: Env, owner: Address, name: String) -> BytesN<32> {
        ledger::derive_game_id(&env, &owner, &name)
    }

    pub fn get_yield_source(env: Env, asset: Address) -> Result<Address, Error> {
        storage::get_yield_source(&env, &asset)
    }

    pub fn get_config(env: Env) -> Result<PoolConfig, Error> {
        require_initialized(&env)?;
        Ok(PoolConfig {
            admin: storage::get_admin(&env)?,
            protocol_treasury: storage::get_protocol_treasury(&env)?,
            paused: storage::is_paused(&env),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
