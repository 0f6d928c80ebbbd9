//! Round state machine.
//!
//! The phase is never cached: it is recomputed from the round's timestamps
//! on every access. The only stored phase information is the sticky
//! `distributing` flag, set by the last award or by `finalize`.

use soroban_sdk::Env;

use crate::error::Error;
use crate::types::{Phase, Round};

/// Phase of `round` at `now`.
pub fn phase_at(round: &Round, now: u64) -> Phase {
    if round.distributing {
        return Phase::DistributingRewards;
    }
    if now < round.start_time {
        Phase::NotStarted
    } else if now <= round.end_time {
        Phase::InProgress
    } else if now <= round.end_time.saturating_add(round.lock_duration) {
        Phase::Locking
    } else {
        Phase::ChoosingWinners
    }
}

pub fn current_phase(env: &Env, round: &Round) -> Phase {
    phase_at(round, env.ledger().timestamp())
}

pub fn require_phase(env: &Env, round: &Round, required: Phase) -> Result<(), Error> {
    if current_phase(env, round) != required {
        return Err(Error::WrongPhase);
    }
    Ok(())
}
