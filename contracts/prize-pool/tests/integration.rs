use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{StellarAssetClient, TokenClient},
    Address, Env, String,
};

use yieldcade_prize_pool::{Error, Phase, PrizePool, PrizePoolClient};
use yieldcade_share_vault::{ShareVault, ShareVaultClient, VIRTUAL_SHARES};

const START: u64 = 10;
const END: u64 = 100;
const LOCK: u64 = 50;

fn create_token<'a>(env: &'a Env, token_admin: &Address) -> (Address, StellarAssetClient<'a>) {
    let token_contract = env.register_stellar_asset_contract_v2(token_admin.clone());
    let token_client = StellarAssetClient::new(env, &token_contract.address());
    (token_contract.address(), token_client)
}

#[test]
fn test_share_vault_round_end_to_end() {
    let env = Env::default();

    let admin = Address::generate(&env);
    let operator = Address::generate(&env);
    let protocol_treasury = Address::generate(&env);
    let game_treasury = Address::generate(&env);
    let token_admin = Address::generate(&env);
    let alice = Address::generate(&env);
    let bob = Address::generate(&env);

    let (token_addr, token_sac) = create_token(&env, &token_admin);
    let token = TokenClient::new(&env, &token_addr);

    let pool_id = env.register(PrizePool, ());
    let pool = PrizePoolClient::new(&env, &pool_id);
    let vault_id = env.register(ShareVault, ());
    let vault = ShareVaultClient::new(&env, &vault_id);

    env.mock_all_auths();
    pool.init(&admin, &protocol_treasury);
    vault.init(&admin, &pool_id, &token_addr);
    pool.set_yield_source(&admin, &token_addr, &vault_id);

    let game_id = pool.create_game(
        &operator,
        &String::from_str(&env, "weekly-draw"),
        &500u32,
        &0u32,
        &game_treasury,
        &token_addr,
    );
    let round_id = pool.create_round(&operator, &game_id, &START, &END, &LOCK);

    token_sac.mint(&alice, &2_000i128);
    token_sac.mint(&bob, &2_000i128);

    env.ledger().set_timestamp(START);
    pool.deposit(&alice, &game_id, &round_id, &2_000i128);
    pool.deposit(&bob, &game_id, &round_id, &2_000i128);
    assert_eq!(pool.deploy(&operator, &game_id, &round_id), 4_000 * VIRTUAL_SHARES);
    assert_eq!(vault.vault_state().total_shares, 4_000 * VIRTUAL_SHARES);

    // Vault earns 500 while the round is locked; one unit stays with the
    // virtual shares.
    env.ledger().set_timestamp(END + 1);
    token_sac.mint(&vault_id, &500i128);
    assert_eq!(pool.position_value(&game_id, &round_id), 4_499);

    env.ledger().set_timestamp(END + LOCK + 1);
    assert_eq!(pool.withdraw(&operator, &game_id, &round_id), 4_499);
    // 499 yield: 99 protocol, 20 operator, 380 prize.
    assert_eq!(pool.settle(&operator, &game_id, &round_id), 380);
    assert_eq!(token.balance(&protocol_treasury), 99);
    assert_eq!(token.balance(&game_treasury), 20);

    pool.award(&operator, &game_id, &round_id, &alice, &300i128);
    pool.award(&operator, &game_id, &round_id, &bob, &80i128);
    assert_eq!(pool.get_phase(&game_id, &round_id), Phase::DistributingRewards);

    assert_eq!(pool.claim(&alice, &game_id, &round_id), 2_300);
    assert_eq!(pool.claim(&bob, &game_id, &round_id), 2_080);
    assert_eq!(token.balance(&pool_id), 0);
    assert_eq!(vault.vault_state().total_shares, 0);
}

#[test]
fn test_late_round_does_not_share_earlier_vault_gains() {
    let env = Env::default();

    let admin = Address::generate(&env);
    let operator = Address::generate(&env);
    let protocol_treasury = Address::generate(&env);
    let game_treasury = Address::generate(&env);
    let token_admin = Address::generate(&env);
    let early = Address::generate(&env);
    let late = Address::generate(&env);

    let (token_addr, token_sac) = create_token(&env, &token_admin);

    let pool_id = env.register(PrizePool, ());
    let pool = PrizePoolClient::new(&env, &pool_id);
    let vault_id = env.register(ShareVault, ());
    let vault = ShareVaultClient::new(&env, &vault_id);

    env.mock_all_auths();
    pool.init(&admin, &protocol_treasury);
    vault.init(&admin, &pool_id, &token_addr);
    pool.set_yield_source(&admin, &token_addr, &vault_id);

    let game_id = pool.create_game(
        &operator,
        &String::from_str(&env, "daily"),
        &0u32,
        &0u32,
        &game_treasury,
        &token_addr,
    );
    let first = pool.create_round(&operator, &game_id, &START, &END, &LOCK);
    let second = pool.create_round(&operator, &game_id, &START, &(END * 10), &LOCK);

    token_sac.mint(&early, &4_000i128);
    token_sac.mint(&late, &900i128);

    env.ledger().set_timestamp(START);
    pool.deposit(&early, &game_id, &first, &4_000i128);
    pool.deploy(&operator, &game_id, &first);
    token_sac.mint(&vault_id, &500i128);

    // Enters at the higher share price.
    pool.deposit(&late, &game_id, &second, &900i128);
    pool.deploy(&operator, &game_id, &second);
    let second_position = pool.get_position(&game_id, &second);
    assert_eq!(vault.shares_of(&second_position.id), 800_022_217);
    assert_eq!(pool.position_value(&game_id, &second), 899);

    env.ledger().set_timestamp(END + LOCK + 1);
    assert_eq!(pool.get_phase(&game_id, &second), Phase::InProgress);
    assert_eq!(pool.withdraw(&operator, &game_id, &first), 4_499);
    assert_eq!(pool.settle(&operator, &game_id, &first), 400);
    assert_eq!(pool.get_round(&game_id, &first).yield_amount, 499);

    assert_eq!(pool.position_value(&game_id, &second), 900);
}

struct VaultSetup<'a> {
    pool: PrizePoolClient<'a>,
    pool_id: Address,
    vault_id: Address,
    operator: Address,
    token: TokenClient<'a>,
    token_sac: StellarAssetClient<'a>,
    game_id: soroban_sdk::BytesN<32>,
}

fn vault_game(env: &Env) -> VaultSetup<'_> {
    let admin = Address::generate(env);
    let operator = Address::generate(env);
    let token_admin = Address::generate(env);

    let (token_addr, token_sac) = create_token(env, &token_admin);
    let token = TokenClient::new(env, &token_addr);

    let pool_id = env.register(PrizePool, ());
    let pool = PrizePoolClient::new(env, &pool_id);
    let vault_id = env.register(ShareVault, ());
    let vault = ShareVaultClient::new(env, &vault_id);

    env.mock_all_auths();
    pool.init(&admin, &Address::generate(env));
    vault.init(&admin, &pool_id, &token_addr);
    pool.set_yield_source(&admin, &token_addr, &vault_id);

    let game_id = pool.create_game(
        &operator,
        &String::from_str(env, "vault-draw"),
        &0u32,
        &0u32,
        &Address::generate(env),
        &token_addr,
    );

    VaultSetup {
        pool,
        pool_id,
        vault_id,
        operator,
        token,
        token_sac,
        game_id,
    }
}

#[test]
fn test_donation_to_vault_does_not_drain_later_round() {
    let env = Env::default();
    let s = vault_game(&env);
    let first = s.pool.create_round(&s.operator, &s.game_id, &START, &END, &LOCK);
    let second = s.pool.create_round(&s.operator, &s.game_id, &START, &END, &LOCK);
    let small = Address::generate(&env);
    let large = Address::generate(&env);
    s.token_sac.mint(&small, &1i128);
    s.token_sac.mint(&large, &1_500_000i128);

    env.ledger().set_timestamp(START);
    s.pool.deposit(&small, &s.game_id, &first, &1i128);
    s.pool.deploy(&s.operator, &s.game_id, &first);

    // Tokens sent straight to the vault, outside any placement.
    s.token_sac.mint(&s.vault_id, &1_000_000i128);

    s.pool.deposit(&large, &s.game_id, &second, &1_500_000i128);
    s.pool.deploy(&s.operator, &s.game_id, &second);

    env.ledger().set_timestamp(END + LOCK + 1);
    assert_eq!(s.pool.withdraw(&s.operator, &s.game_id, &second), 1_499_999);
    let round = s.pool.get_round(&s.game_id, &second);
    // Rounding dust only.
    assert_eq!(round.shortfall, 1);

    // The earlier round gets part of the donation, never the later principal.
    assert_eq!(s.pool.withdraw(&s.operator, &s.game_id, &first), 500_001);
}

#[test]
fn test_lossy_placement_fails_deploy_and_keeps_custody() {
    let env = Env::default();
    let s = vault_game(&env);
    let first = s.pool.create_round(&s.operator, &s.game_id, &START, &END, &LOCK);
    let second = s.pool.create_round(&s.operator, &s.game_id, &START, &END, &LOCK);
    let small = Address::generate(&env);
    let user = Address::generate(&env);
    s.token_sac.mint(&small, &1i128);
    s.token_sac.mint(&user, &999i128);

    env.ledger().set_timestamp(START);
    s.pool.deposit(&small, &s.game_id, &first, &1i128);
    s.pool.deploy(&s.operator, &s.game_id, &first);
    s.token_sac.mint(&s.vault_id, &10_000_000i128);

    s.pool.deposit(&user, &s.game_id, &second, &999i128);
    assert_eq!(
        s.pool.try_deploy(&s.operator, &s.game_id, &second),
        Err(Ok(Error::StrategyCallFailed))
    );
    assert!(!s.pool.get_round(&s.game_id, &second).deployed);
    assert_eq!(s.token.balance(&s.pool_id), 999);
}
