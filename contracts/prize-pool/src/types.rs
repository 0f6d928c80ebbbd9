use soroban_sdk::{contracttype, Address, BytesN, String};

/// Discriminants for all storage keys.
///
/// Instance keys: pool config and the yield-source registry.
/// Persistent keys: the games, rounds, deposits and deployed positions
/// tables, each entry with its own TTL.
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    // --- instance() ---
    Admin,
    ProtocolTreasury,
    Paused,
    /// Single-flight flag held while a state-changing operation runs.
    Locked,
    NextPositionId,
    /// Adapter serving an asset.
    YieldSource(Address),
    // --- persistent() ---
    Game(BytesN<32>),
    /// (game_id, round_id)
    Round(BytesN<32>, u64),
    /// (game_id, round_id, depositor)
    Deposit(BytesN<32>, u64, Address),
    /// (game_id, round_id)
    Position(BytesN<32>, u64),
}

/// Lifecycle phase of a round. Ordered; only `DistributingRewards` is stored.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Phase {
    NotStarted = 0,
    InProgress = 1,
    Locking = 2,
    ChoosingWinners = 3,
    DistributingRewards = 4,
}

/// A named configuration owned by one operator.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Game {
    pub id: BytesN<32>,
    pub owner: Address,
    pub name: String,
    /// Operator cut of post-performance-fee yield, basis points.
    pub dev_fee_bps: u32,
    /// Cut of every deposit routed to the bonus prize pool, basis points.
    pub deposit_fee_bps: u32,
    pub treasury: Address,
    pub asset: Address,
    /// Id the next round will receive.
    pub round_count: u64,
}

/// One epoch of a game. Kept forever as the audit record of its settlement.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Round {
    pub game_id: BytesN<32>,
    pub id: u64,
    pub start_time: u64,
    pub end_time: u64,
    /// Seconds after `end_time` during which funds stay deployed.
    pub lock_duration: u64,
    /// Net principal owed back to depositors.
    pub total_principal: i128,
    /// Deposit fees collected; joins the prize pool untouched by yield fees.
    pub bonus_pool: i128,
    pub performance_fee: i128,
    pub dev_fee: i128,
    /// Prize pool fixed at settlement.
    pub prize_pool: i128,
    /// Part of `prize_pool` not yet awarded.
    pub total_win: i128,
    pub yield_amount: i128,
    /// Assets the adapter returned on withdraw.
    pub redeemed: i128,
    /// Deployed principal the adapter failed to return.
    pub shortfall: i128,
    pub deployed: bool,
    pub withdrawn: bool,
    pub settled: bool,
    /// Sticky: once set the round is in `DistributingRewards` for good.
    pub distributing: bool,
}

/// A depositor's stake in one round.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositRecord {
    pub principal: i128,
    /// Awarded prize, paid together with principal on claim.
    pub prize: i128,
    pub claimed: bool,
}

/// What a round has placed with its yield adapter.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeployedPosition {
    /// Adapter chosen at first deploy; later deploys and the withdraw reuse it.
    pub adapter: Address,
    /// Position key on the adapter side.
    pub id: u64,
    pub principal: i128,
    /// Receipt or shares held; cleared on withdraw.
    pub claim: i128,
}

/// Snapshot of the pool configuration returned by `get_config`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolConfig {
    pub admin: Address,
    pub protocol_treasury: Address,
    pub paused: bool,
}
