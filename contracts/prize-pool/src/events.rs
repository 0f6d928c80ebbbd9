use soroban_sdk::{contractevent, Address, BytesN, String};

#[contractevent]
pub struct Initialized {
    pub admin: Address,
    pub protocol_treasury: Address,
}

#[contractevent]
pub struct PauseChanged {
    pub paused: bool,
    pub admin: Address,
}

#[contractevent]
pub struct YieldSourceSet {
    #[topic]
    pub asset: Address,
    pub adapter: Address,
}

#[contractevent]
pub struct ProtocolTreasurySet {
    pub treasury: Address,
}

#[contractevent]
pub struct GameCreated {
    #[topic]
    pub game_id: BytesN<32>,
    #[topic]
    pub owner: Address,
    pub name: String,
    pub dev_fee_bps: u32,
    pub deposit_fee_bps: u32,
    pub asset: Address,
}

#[contractevent]
pub struct RoundCreated {
    #[topic]
    pub game_id: BytesN<32>,
    #[topic]
    pub round_id: u64,
    pub start_time: u64,
    pub end_time: u64,
    pub lock_duration: u64,
}

#[contractevent]
pub struct Deposited {
    #[topic]
    pub game_id: BytesN<32>,
    #[topic]
    pub round_id: u64,
    #[topic]
    pub depositor: Address,
    pub gross: i128,
    pub fee: i128,
    pub net: i128,
}

#[contractevent]
pub struct FundsDeployed {
    #[topic]
    pub game_id: BytesN<32>,
    #[topic]
    pub round_id: u64,
    pub amount: i128,
    pub claim: i128,
    pub deployed_principal: i128,
}

#[contractevent]
pub struct FundsWithdrawn {
    #[topic]
    pub game_id: BytesN<32>,
    #[topic]
    pub round_id: u64,
    pub redeemed: i128,
    pub yield_amount: i128,
}

#[contractevent]
pub struct RoundSettled {
    #[topic]
    pub game_id: BytesN<32>,
    #[topic]
    pub round_id: u64,
    pub yield_amount: i128,
    pub performance_fee: i128,
    pub dev_fee: i128,
    pub prize_pool: i128,
}

#[contractevent]
pub struct PrizeAwarded {
    #[topic]
    pub game_id: BytesN<32>,
    #[topic]
    pub round_id: u64,
    #[topic]
    pub winner: Address,
    pub amount: i128,
    pub remaining: i128,
}

#[contractevent]
pub struct RoundFinalized {
    #[topic]
    pub game_id: BytesN<32>,
    #[topic]
    pub round_id: u64,
    pub unallocated: i128,
}

#[contractevent]
pub struct Claimed {
    #[topic]
    pub game_id: BytesN<32>,
    #[topic]
    pub round_id: u64,
    #[topic]
    pub depositor: Address,
    pub amount: i128,
}
