//! Liquidity Ledger Integration Tests
//!
//! Drives complete add/withdraw flows through the in-memory store and checks
//! the persisted pool, provider records, events and module balances.

use config::{ConstantValues, ProtocolVersion};
use ledger::{
    AddOutcome, AddReceipt, BlockContext, FixedGasManager, Keeper, LiquidityError,
    LiquidityLedger, MemoryKeeper, ModuleName, Ports, RecordingEvents, WithdrawOutcome,
};
use types::{
    AddLiquidityIntent, Address, Amount, Asset, Chain, LedgerEvent, LiquidityProvider,
    PendingLiquidityType, Pool, PoolStatus, TxId, ValidationError, WithdrawIntent, ONE,
};

const BTC_MAX_GAS: Amount = 75_000;
const BNB_MAX_GAS: Amount = 37_500;

struct Harness {
    ledger: LiquidityLedger,
    keeper: MemoryKeeper,
    events: RecordingEvents,
    gas: FixedGasManager,
}

impl Harness {
    fn new(ledger: LiquidityLedger) -> Self {
        let gas = FixedGasManager::new()
            .with_max_gas(Chain::new("BTC").unwrap(), BTC_MAX_GAS)
            .with_max_gas(Chain::new("BNB").unwrap(), BNB_MAX_GAS);
        Self {
            ledger,
            keeper: MemoryKeeper::new(),
            events: RecordingEvents::new(),
            gas,
        }
    }

    fn current() -> Self {
        Self::new(LiquidityLedger::default())
    }

    fn add(&mut self, height: u64, intent: &AddLiquidityIntent) -> Result<AddReceipt, LiquidityError> {
        let mut ports = Ports::new(&mut self.keeper, &mut self.events, &self.gas);
        self.ledger
            .add_liquidity(&mut ports, BlockContext::new(height), intent)
    }

    fn withdraw(
        &mut self,
        height: u64,
        intent: &WithdrawIntent,
    ) -> Result<WithdrawOutcome, LiquidityError> {
        let mut ports = Ports::new(&mut self.keeper, &mut self.events, &self.gas);
        self.ledger
            .withdraw_liquidity(&mut ports, BlockContext::new(height), intent)
    }

    fn pool(&self, asset: &Asset) -> Pool {
        self.keeper.get_pool(asset).unwrap().unwrap()
    }

    fn provider(&self, asset: &Asset, address: &str) -> Option<LiquidityProvider> {
        self.keeper
            .get_liquidity_provider(asset, &Address::new(address))
            .unwrap()
    }
}

fn btc() -> Asset {
    "BTC.BTC".parse().unwrap()
}

fn busd() -> Asset {
    "BNB.BUSD-BD1".parse().unwrap()
}

fn deposit(asset: Asset, rune: Amount, amount: Amount, who: &str, tx: &str) -> AddLiquidityIntent {
    AddLiquidityIntent::new(
        asset,
        rune,
        amount,
        Address::new(format!("thor1{who}")),
        Address::new(format!("ext1{who}")),
        TxId::new(tx),
    )
}

fn withdrawal(asset: Asset, who: &str, basis_points: u64) -> WithdrawIntent {
    WithdrawIntent::new(
        asset,
        Address::new(format!("thor1{who}")),
        basis_points,
        TxId::new("0UT"),
    )
}

/// Available BTC pool whose only provider `thor1lp` owns every unit
fn seeded_btc_pool(h: &mut Harness, rune: Amount, asset: Amount, units: Amount) {
    let mut pool = Pool::new(btc());
    pool.balance_rune = rune;
    pool.balance_asset = asset;
    pool.lp_units = units;
    pool.status = PoolStatus::Available;
    h.keeper.set_pool(&pool).unwrap();

    let mut lp = LiquidityProvider::new(btc(), Address::new("thor1lp"), Address::new("ext1lp"));
    lp.units = units;
    lp.rune_deposit_value = 100 * ONE;
    lp.asset_deposit_value = 100 * ONE;
    h.keeper.set_liquidity_provider(&lp).unwrap();
}

#[test]
fn test_round_trip_returns_pool_to_empty() {
    let mut h = Harness::current();

    let first = h.add(1, &deposit(busd(), 100 * ONE, 100 * ONE, "lp", "A1")).unwrap();
    assert_eq!(first.principal.liquidity_units(), 100 * ONE);
    assert_eq!(h.pool(&busd()).pool_units(), 100 * ONE);
    // non-gas assets start in the configured default status
    assert_eq!(h.pool(&busd()).status, PoolStatus::Staged);

    let second = h.add(2, &deposit(busd(), 100 * ONE, 100 * ONE, "lp", "A2")).unwrap();
    assert_eq!(second.principal.liquidity_units(), 100 * ONE);
    assert_eq!(h.pool(&busd()).pool_units(), 200 * ONE);

    let out = h.withdraw(3, &withdrawal(busd(), "lp", 10_000)).unwrap();
    assert_eq!(out.rune, 200 * ONE);
    assert_eq!(out.asset, 200 * ONE);
    assert_eq!(out.units_burned, 200 * ONE);
    assert_eq!(out.gas_asset, 0);

    let pool = h.pool(&busd());
    assert_eq!(pool.balance_rune, 0);
    assert_eq!(pool.balance_asset, 0);
    assert_eq!(pool.lp_units, 0);
    assert!(h.provider(&busd(), "thor1lp").is_none());
    assert_eq!(h.events.of_type("withdraw").len(), 1);
}

#[test]
fn test_slip_adjusted_fixture() {
    let mut h = Harness::new(LiquidityLedger::new(ProtocolVersion::V84));
    let mut pool = Pool::new(btc());
    pool.balance_rune = 500 * ONE;
    pool.balance_asset = 500 * ONE;
    pool.lp_units = 500 * ONE;
    pool.status = PoolStatus::Available;
    h.keeper.set_pool(&pool).unwrap();

    let receipt = h.add(10, &deposit(btc(), 345 * ONE, 234 * ONE, "new", "F1")).unwrap();
    assert_eq!(receipt.principal.liquidity_units(), 26_359_469_067);

    let pool = h.pool(&btc());
    assert_eq!(pool.lp_units, 76_359_469_067);
    assert_eq!(pool.balance_rune, 845 * ONE);
    assert_eq!(pool.balance_asset, 734 * ONE);
    assert_eq!(h.provider(&btc(), "thor1new").unwrap().units, 26_359_469_067);
}

#[test]
fn test_first_deposit_enables_gas_asset_pool() {
    let mut h = Harness::current();
    h.add(5, &deposit(btc(), 100 * ONE, 100 * ONE, "lp", "S1")).unwrap();

    let pool = h.pool(&btc());
    assert_eq!(pool.status, PoolStatus::Available);
    assert_eq!(pool.status_since, 5);

    let pool_events = h.events.of_type("pool");
    assert_eq!(pool_events.len(), 1);
    assert!(matches!(
        pool_events[0],
        LedgerEvent::PoolStatus(e) if e.status == PoolStatus::Available
    ));
    let lp = h.provider(&btc(), "thor1lp").unwrap();
    assert_eq!(lp.rune_deposit_value, 100 * ONE);
    assert_eq!(lp.asset_deposit_value, 100 * ONE);
    assert_eq!(lp.last_add_height, 5);
}

#[test]
fn test_gas_withheld_on_final_withdrawal() {
    let mut h = Harness::current();
    h.add(1, &deposit(btc(), 100 * ONE, 100 * ONE, "lp", "G1")).unwrap();

    let out = h.withdraw(2, &withdrawal(btc(), "lp", 10_000)).unwrap();
    assert_eq!(out.rune, 100 * ONE);
    assert_eq!(out.gas_asset, BTC_MAX_GAS);
    assert_eq!(out.asset, 100 * ONE - BTC_MAX_GAS);

    let pool = h.pool(&btc());
    assert_eq!(pool.balance_asset, BTC_MAX_GAS);
    assert_eq!(pool.balance_rune, 0);
    assert_eq!(pool.status, PoolStatus::Staged);
}

#[test]
fn test_partial_withdrawal_keeps_gas() {
    let mut h = Harness::current();
    h.add(1, &deposit(btc(), 100 * ONE, 100 * ONE, "lp", "G1")).unwrap();

    let out = h.withdraw(2, &withdrawal(btc(), "lp", 5_000)).unwrap();
    assert_eq!(out.rune, 50 * ONE);
    assert_eq!(out.asset, 50 * ONE);
    assert_eq!(out.gas_asset, 0);
    assert_eq!(h.provider(&btc(), "thor1lp").unwrap().units, 50 * ONE);
    assert_eq!(h.pool(&btc()).status, PoolStatus::Available);
}

#[test]
fn test_bnb_gas_doubled_when_rune_lives_on_bnb() {
    let bnb: Asset = "BNB.BNB".parse().unwrap();
    let ledger = LiquidityLedger::default().with_rune_asset("BNB.RUNE-B1A".parse().unwrap());
    let mut h = Harness::new(ledger);
    h.add(1, &deposit(bnb.clone(), 100 * ONE, 100 * ONE, "lp", "B1")).unwrap();

    let out = h.withdraw(2, &withdrawal(bnb.clone(), "lp", 10_000)).unwrap();
    assert_eq!(out.gas_asset, 2 * BNB_MAX_GAS);
    assert_eq!(out.asset, 100 * ONE - 2 * BNB_MAX_GAS);
}

#[test]
fn test_bnb_gas_single_with_native_rune() {
    let bnb: Asset = "BNB.BNB".parse().unwrap();
    let mut h = Harness::current();
    h.add(1, &deposit(bnb.clone(), 100 * ONE, 100 * ONE, "lp", "B1")).unwrap();

    let out = h.withdraw(2, &withdrawal(bnb, "lp", 10_000)).unwrap();
    assert_eq!(out.gas_asset, BNB_MAX_GAS);
}

#[test]
fn test_imp_loss_protection_paid_from_reserve() {
    let mut h = Harness::current();
    seeded_btc_pool(&mut h, 200 * ONE, 50 * ONE, 100 * ONE);
    h.keeper.fund_module(ModuleName::Reserve, 1_000 * ONE);

    let out = h.withdraw(1_440_000, &withdrawal(btc(), "lp", 10_000)).unwrap();
    assert_eq!(out.protection_rune, 100 * ONE);
    assert_eq!(out.rune, 300 * ONE);
    assert_eq!(out.asset, 50 * ONE - BTC_MAX_GAS);
    assert_eq!(out.units_burned, 100 * ONE);

    assert_eq!(h.keeper.module_balance(ModuleName::Reserve), 900 * ONE);
    assert_eq!(h.keeper.module_balance(ModuleName::Asgard), 100 * ONE);
    let pool = h.pool(&btc());
    assert_eq!(pool.balance_rune, 0);
    assert_eq!(pool.lp_units, 0);

    let withdraws = h.events.of_type("withdraw");
    assert!(matches!(
        withdraws[0],
        LedgerEvent::Withdraw(e) if e.imp_loss_protection == 100 * ONE
    ));
}

#[test]
fn test_imp_loss_protection_scales_with_age_and_fraction() {
    let mut h = Harness::current();
    seeded_btc_pool(&mut h, 200 * ONE, 50 * ONE, 100 * ONE);
    h.keeper.fund_module(ModuleName::Reserve, 1_000 * ONE);

    // half vested, half withdrawn
    let out = h.withdraw(720_000, &withdrawal(btc(), "lp", 5_000)).unwrap();
    assert_eq!(out.protection_rune, 25 * ONE);
    assert_eq!(h.keeper.module_balance(ModuleName::Asgard), 25 * ONE);
}

#[test]
fn test_imp_loss_protection_disabled_by_mimir() {
    let mut h = Harness::current();
    seeded_btc_pool(&mut h, 200 * ONE, 50 * ONE, 100 * ONE);
    h.keeper.set_mimir("ILP-DISABLED-BTC.BTC", 1);

    let out = h.withdraw(1_440_000, &withdrawal(btc(), "lp", 10_000)).unwrap();
    assert_eq!(out.protection_rune, 0);
    assert_eq!(out.rune, 200 * ONE);
}

#[test]
fn test_v1_protection_covers_claimed_units() {
    let mut h = Harness::new(LiquidityLedger::new(ProtocolVersion::V1));
    seeded_btc_pool(&mut h, 200 * ONE, 50 * ONE, 100 * ONE);
    h.keeper.fund_module(ModuleName::Reserve, 1_000 * ONE);

    let out = h.withdraw(1_440_000, &withdrawal(btc(), "lp", 10_000)).unwrap();
    assert_eq!(out.protection_rune, 200 * ONE);
    assert_eq!(out.rune, 400 * ONE);
    assert_eq!(out.asset, 50 * ONE - BTC_MAX_GAS);
    // own units plus the slip-adjusted protection units
    assert_eq!(out.units_burned, 125 * ONE);
    assert_eq!(h.keeper.module_balance(ModuleName::Reserve), 800 * ONE);
    assert_eq!(h.pool(&btc()).lp_units, 0);
}

#[test]
fn test_v1_partial_withdrawal_keeps_protection_units() {
    let mut h = Harness::new(LiquidityLedger::new(ProtocolVersion::V1));
    seeded_btc_pool(&mut h, 200 * ONE, 50 * ONE, 100 * ONE);
    h.keeper.fund_module(ModuleName::Reserve, 1_000 * ONE);

    let out = h.withdraw(1_440_000, &withdrawal(btc(), "lp", 5_000)).unwrap();
    assert_eq!(out.protection_rune, 300 * ONE);
    assert_eq!(out.rune, 250 * ONE);
    assert_eq!(out.asset, 25 * ONE);
    assert_eq!(out.units_burned, 65 * ONE);

    let pool = h.pool(&btc());
    assert_eq!(pool.lp_units, 65 * ONE);
    assert_eq!(pool.balance_rune, 250 * ONE);
    assert_eq!(pool.balance_asset, 25 * ONE);

    let lp = h.provider(&btc(), "thor1lp").unwrap();
    assert_eq!(lp.units, 65 * ONE);
    // 35 burned units priced against the pool left behind
    assert_eq!(lp.rune_deposit_value, 0);
    assert_eq!(lp.asset_deposit_value, 8_653_846_154);
}

#[test]
fn test_v1_withdrawal_pays_parked_rune() {
    let mut h = Harness::new(LiquidityLedger::new(ProtocolVersion::V1));
    seeded_btc_pool(&mut h, 200 * ONE, 50 * ONE, 100 * ONE);
    h.keeper.set_mimir("FullImpLossProtectionBlocks", 0);
    let mut lp = h.provider(&btc(), "thor1lp").unwrap();
    lp.pending_rune = 5 * ONE;
    lp.pending_tx_id = TxId::new("P1");
    h.keeper.set_liquidity_provider(&lp).unwrap();
    let mut pool = h.pool(&btc());
    pool.pending_inbound_rune = 5 * ONE;
    h.keeper.set_pool(&pool).unwrap();

    let out = h.withdraw(1, &withdrawal(btc(), "lp", 5_000)).unwrap();
    assert_eq!(out.protection_rune, 0);
    assert_eq!(out.rune, 100 * ONE);
    assert_eq!(out.refunded_pending_rune, 5 * ONE);
    assert_eq!(h.pool(&btc()).pending_inbound_rune, 0);

    let lp = h.provider(&btc(), "thor1lp").unwrap();
    assert_eq!(lp.units, 50 * ONE);
    assert_eq!(lp.pending_rune, 0);
    assert!(lp.pending_tx_id.is_empty());
    assert_eq!(lp.rune_deposit_value, 0);
    assert_eq!(lp.asset_deposit_value, 75 * ONE);
}

#[test]
fn test_reserve_transfer_failure_leaves_store_untouched() {
    let mut h = Harness::current();
    seeded_btc_pool(&mut h, 200 * ONE, 50 * ONE, 100 * ONE);
    h.keeper.fail_transfers(true);
    let pool_before = h.pool(&btc());
    let lp_before = h.provider(&btc(), "thor1lp");

    let err = h
        .withdraw(1_440_000, &withdrawal(btc(), "lp", 10_000))
        .unwrap_err();
    assert!(matches!(err, LiquidityError::ExternalTransfer { .. }));
    assert_eq!(h.pool(&btc()), pool_before);
    assert_eq!(h.provider(&btc(), "thor1lp"), lp_before);
    assert!(h.events.events.is_empty());
}

#[test]
fn test_underfunded_reserve_fails_withdrawal() {
    let mut h = Harness::current();
    seeded_btc_pool(&mut h, 200 * ONE, 50 * ONE, 100 * ONE);
    h.keeper.fund_module(ModuleName::Reserve, ONE);

    let err = h
        .withdraw(1_440_000, &withdrawal(btc(), "lp", 10_000))
        .unwrap_err();
    assert!(matches!(err, LiquidityError::ExternalTransfer { .. }));
    assert_eq!(h.pool(&btc()).balance_rune, 200 * ONE);
}

#[test]
fn test_provider_write_failure_rolls_back_add() {
    let mut h = Harness::current();
    h.keeper.fail_provider_writes(true);

    let err = h
        .add(1, &deposit(btc(), 100 * ONE, 100 * ONE, "lp", "W1"))
        .unwrap_err();
    assert!(matches!(err, LiquidityError::Store(_)));
    assert_eq!(h.keeper.get_pool(&btc()).unwrap(), None);
    assert!(h.events.events.is_empty());
}

#[test]
fn test_provider_write_failure_rolls_back_withdrawal() {
    let mut h = Harness::current();
    seeded_btc_pool(&mut h, 200 * ONE, 50 * ONE, 100 * ONE);
    h.keeper.fund_module(ModuleName::Reserve, 1_000 * ONE);
    let pool_before = h.pool(&btc());
    let lp_before = h.provider(&btc(), "thor1lp");
    h.keeper.fail_provider_writes(true);

    let err = h
        .withdraw(1_440_000, &withdrawal(btc(), "lp", 10_000))
        .unwrap_err();
    assert!(matches!(err, LiquidityError::Store(_)));
    assert_eq!(h.pool(&btc()), pool_before);
    assert_eq!(h.provider(&btc(), "thor1lp"), lp_before);
    assert_eq!(h.keeper.module_balance(ModuleName::Reserve), 1_000 * ONE);
    assert_eq!(h.keeper.module_balance(ModuleName::Asgard), 0);
    assert!(h.events.events.is_empty());
}

#[test]
fn test_lockup_blocks_early_withdrawal() {
    let constants = ConstantValues {
        liquidity_lockup_blocks: 100,
        ..ConstantValues::for_version(ProtocolVersion::CURRENT)
    };
    let mut h = Harness::new(LiquidityLedger::default().with_constants(constants));
    h.add(10, &deposit(btc(), 100 * ONE, 100 * ONE, "lp", "L1")).unwrap();

    let err = h.withdraw(50, &withdrawal(btc(), "lp", 10_000)).unwrap_err();
    assert!(matches!(
        err,
        LiquidityError::WithinLockupPeriod { unlock_height: 110 }
    ));
    assert!(h.withdraw(110, &withdrawal(btc(), "lp", 10_000)).is_ok());
}

#[test]
fn test_asset_address_cannot_change() {
    let mut h = Harness::current();
    h.add(1, &deposit(btc(), 100 * ONE, 100 * ONE, "lp", "M1")).unwrap();

    let hijack = AddLiquidityIntent::new(
        btc(),
        10 * ONE,
        10 * ONE,
        Address::new("thor1lp"),
        Address::new("ext1attacker"),
        TxId::new("M2"),
    );
    let err = h.add(2, &hijack).unwrap_err();
    assert!(matches!(err, LiquidityError::AddressMismatch));
    assert_eq!(h.provider(&btc(), "thor1lp").unwrap().units, 100 * ONE);
}

#[test]
fn test_pending_leg_staged_then_committed() {
    let mut h = Harness::current();
    h.add(1, &deposit(btc(), 100 * ONE, 100 * ONE, "lp", "P0")).unwrap();

    let rune_leg = deposit(btc(), 10 * ONE, 0, "two", "RUNE1");
    assert!(rune_leg.stage);
    let staged = h.add(2, &rune_leg).unwrap();
    assert_eq!(
        staged.principal,
        AddOutcome::Staged {
            pending_rune: 10 * ONE,
            pending_asset: 0
        }
    );
    assert_eq!(h.pool(&btc()).pending_inbound_rune, 10 * ONE);
    assert_eq!(h.pool(&btc()).balance_rune, 100 * ONE);
    assert_eq!(h.events.of_type("pending_liquidity").len(), 1);

    let asset_leg = deposit(btc(), 0, 10 * ONE, "two", "ASSET1");
    let committed = h.add(3, &asset_leg).unwrap();
    assert_eq!(committed.principal.liquidity_units(), 10 * ONE);

    let pool = h.pool(&btc());
    assert_eq!(pool.pending_inbound_rune, 0);
    assert_eq!(pool.balance_rune, 110 * ONE);
    assert_eq!(pool.balance_asset, 110 * ONE);
    let lp = h.provider(&btc(), "thor1two").unwrap();
    assert!(!lp.has_pending());
    assert!(lp.pending_tx_id.is_empty());

    let adds = h.events.of_type("add_liquidity");
    assert!(matches!(
        adds.last().unwrap(),
        LedgerEvent::AddLiquidity(e)
            if e.rune_tx_id == TxId::new("RUNE1") && e.asset_tx_id == TxId::new("ASSET1")
    ));
}

#[test]
fn test_repeated_staging_counts_each_delta_once() {
    let mut h = Harness::current();
    h.add(1, &deposit(btc(), 100 * ONE, 100 * ONE, "lp", "P0")).unwrap();

    let rune_leg = deposit(btc(), 10 * ONE, 0, "two", "RUNE1");
    h.add(2, &rune_leg).unwrap();
    h.add(3, &rune_leg).unwrap();

    let lp = h.provider(&btc(), "thor1two").unwrap();
    assert_eq!(lp.pending_rune, 20 * ONE);
    assert_eq!(h.pool(&btc()).pending_inbound_rune, lp.pending_rune);
}

#[test]
fn test_withdraw_cancels_stuck_pending_leg() {
    let mut h = Harness::current();
    h.add(1, &deposit(btc(), 100 * ONE, 100 * ONE, "lp", "P0")).unwrap();
    h.add(2, &deposit(btc(), 10 * ONE, 0, "two", "RUNE1")).unwrap();

    let out = h.withdraw(3, &withdrawal(btc(), "two", 10_000)).unwrap();
    assert!(out.pending_cancel);
    assert_eq!(out.rune, 10 * ONE);
    assert_eq!(out.asset, 0);
    assert!(h.provider(&btc(), "thor1two").is_none());
    assert_eq!(h.pool(&btc()).pending_inbound_rune, 0);

    let pending = h.events.of_type("pending_liquidity");
    assert!(matches!(
        pending.last().unwrap(),
        LedgerEvent::PendingLiquidity(e) if e.pending_type == PendingLiquidityType::Withdraw
    ));
}

#[test]
fn test_single_sided_add_rejected_on_staged_pool() {
    let mut h = Harness::current();
    h.add(1, &deposit(busd(), 100 * ONE, 100 * ONE, "lp", "S1")).unwrap();

    let rune_only = AddLiquidityIntent::new(
        busd(),
        10 * ONE,
        0,
        Address::new("thor1solo"),
        Address::empty(),
        TxId::new("S2"),
    );
    let err = h.add(2, &rune_only).unwrap_err();
    assert!(matches!(err, LiquidityError::AsymmetricAddToStagedPool));
}

#[test]
fn test_single_sided_full_withdrawal_rejected() {
    let mut h = Harness::current();
    let mut pool = Pool::new(btc());
    pool.balance_rune = 100 * ONE;
    pool.balance_asset = 100 * ONE;
    pool.lp_units = 100 * ONE;
    pool.status = PoolStatus::Available;
    h.keeper.set_pool(&pool).unwrap();
    let mut lp = LiquidityProvider::new(btc(), Address::new("thor1solo"), Address::empty());
    lp.units = 100 * ONE;
    lp.rune_deposit_value = 100 * ONE;
    lp.asset_deposit_value = 100 * ONE;
    h.keeper.set_liquidity_provider(&lp).unwrap();

    let err = h.withdraw(10, &withdrawal(btc(), "solo", 10_000)).unwrap_err();
    assert!(matches!(err, LiquidityError::Invalid100PercentSingleSidedWithdraw));
    assert_eq!(h.pool(&btc()), pool);
}

#[test]
fn test_suspended_pool_rejects_both_operations() {
    let mut h = Harness::current();
    h.add(1, &deposit(btc(), 100 * ONE, 100 * ONE, "lp", "X1")).unwrap();
    let mut pool = h.pool(&btc());
    pool.status = PoolStatus::Suspended;
    h.keeper.set_pool(&pool).unwrap();

    let err = h.add(2, &deposit(btc(), ONE, ONE, "lp", "X2")).unwrap_err();
    assert!(matches!(err, LiquidityError::PoolStatusInvalid { .. }));
    let err = h.withdraw(2, &withdrawal(btc(), "lp", 10_000)).unwrap_err();
    assert!(matches!(err, LiquidityError::PoolStatusInvalid { .. }));
}

#[test]
fn test_withdraw_errors() {
    let mut h = Harness::current();
    let err = h.withdraw(1, &withdrawal(btc(), "lp", 10_000)).unwrap_err();
    assert!(matches!(err, LiquidityError::PoolNotFound(_)));

    h.add(1, &deposit(btc(), 100 * ONE, 100 * ONE, "lp", "E1")).unwrap();
    let err = h.withdraw(2, &withdrawal(btc(), "nobody", 10_000)).unwrap_err();
    assert!(matches!(err, LiquidityError::NoLiquidityUnitsLeft));

    let err = h.withdraw(2, &withdrawal(btc(), "lp", 0)).unwrap_err();
    assert!(matches!(err, LiquidityError::Validation(_)));
}

#[test]
fn test_liquidity_cap_from_mimir() {
    let mut h = Harness::current();
    h.add(1, &deposit(btc(), 100 * ONE, 100 * ONE, "lp", "C1")).unwrap();
    h.keeper.set_mimir("MaximumLiquidityRune", (150 * ONE) as i64);

    let err = h.add(2, &deposit(btc(), 60 * ONE, 60 * ONE, "lp", "C2")).unwrap_err();
    assert!(matches!(err, LiquidityError::RuneOverLimit { .. }));
    assert!(h.add(2, &deposit(btc(), 50 * ONE, 50 * ONE, "lp", "C3")).is_ok());
}

#[test]
fn test_affiliate_receives_share() {
    let mut h = Harness::current();
    h.add(1, &deposit(btc(), 100 * ONE, 100 * ONE, "lp", "F0")).unwrap();

    let intent = deposit(btc(), 100 * ONE, 100 * ONE, "two", "F1")
        .with_affiliate(Address::new("thor1aff"), 1_000);
    let receipt = h.add(2, &intent).unwrap();
    assert_eq!(receipt.principal.liquidity_units(), 90 * ONE);
    assert_eq!(
        receipt.affiliate.as_ref().map(AddOutcome::liquidity_units),
        Some(10 * ONE)
    );

    let affiliate = h.provider(&btc(), "thor1aff").unwrap();
    assert_eq!(affiliate.units, 10 * ONE);
    assert!(affiliate.asset_address.is_empty());
    assert_eq!(h.pool(&btc()).balance_rune, 200 * ONE);
}

#[test]
fn test_affiliate_failure_keeps_principal() {
    let mut h = Harness::current();
    h.add(1, &deposit(btc(), 100 * ONE, 100 * ONE, "lp", "F0")).unwrap();
    // the affiliate has a parked leg bound to an asset address
    h.add(2, &deposit(btc(), 5 * ONE, 0, "aff", "F1")).unwrap();

    let intent = deposit(btc(), 100 * ONE, 100 * ONE, "two", "F2")
        .with_affiliate(Address::new("thor1aff"), 1_000);
    let receipt = h.add(3, &intent).unwrap();
    assert_eq!(receipt.principal.liquidity_units(), 90 * ONE);
    assert!(receipt.affiliate.is_none());
    assert_eq!(h.provider(&btc(), "thor1two").unwrap().units, 90 * ONE);
    assert_eq!(h.provider(&btc(), "thor1aff").unwrap().units, 0);
}

#[test]
fn test_full_share_affiliate_rejected() {
    let mut h = Harness::current();
    h.add(1, &deposit(btc(), 100 * ONE, 100 * ONE, "lp", "F0")).unwrap();
    let pool_before = h.pool(&btc());

    let intent = deposit(btc(), 100 * ONE, 100 * ONE, "two", "F3")
        .with_affiliate(Address::new("thor1aff"), 10_000);
    let err = h.add(2, &intent).unwrap_err();
    assert!(matches!(
        err,
        LiquidityError::Validation(ValidationError::ZeroAmounts)
    ));
    assert_eq!(h.pool(&btc()), pool_before);
    assert!(h.provider(&btc(), "thor1two").is_none());
    assert!(h.provider(&btc(), "thor1aff").is_none());
}

#[test]
fn test_ragnarok_retains_drained_provider() {
    let mut h = Harness::current();
    h.add(1, &deposit(busd(), 100 * ONE, 100 * ONE, "lp", "R1")).unwrap();
    h.keeper.set_ragnarok(true);

    h.withdraw(2, &withdrawal(busd(), "lp", 10_000)).unwrap();
    let lp = h.provider(&busd(), "thor1lp").unwrap();
    assert_eq!(lp.units, 0);
    assert_eq!(lp.last_withdraw_height, 2);
}

#[test]
fn test_event_failures_do_not_fail_operations() {
    let mut h = Harness::current();
    h.events = RecordingEvents::failing();

    let receipt = h.add(1, &deposit(btc(), 100 * ONE, 100 * ONE, "lp", "V1")).unwrap();
    assert_eq!(receipt.principal.liquidity_units(), 100 * ONE);
    assert_eq!(h.pool(&btc()).lp_units, 100 * ONE);
}

#[test]
fn test_synth_units_follow_supply() {
    let mut h = Harness::current();
    let mut pool = Pool::new(btc());
    pool.balance_rune = 100 * ONE;
    pool.balance_asset = 100 * ONE;
    pool.lp_units = 100 * ONE;
    pool.status = PoolStatus::Available;
    h.keeper.set_pool(&pool).unwrap();
    h.keeper.set_total_supply(btc().synthetic_asset(), 50 * ONE);

    let receipt = h.add(1, &deposit(btc(), 10 * ONE, 10 * ONE, "two", "Y1")).unwrap();
    assert_eq!(receipt.principal.liquidity_units(), 10 * ONE);

    let pool = h.pool(&btc());
    assert_eq!(pool.lp_units, 110 * ONE);
    assert_eq!(pool.synth_units, 3_235_294_117);
}

#[test]
fn test_full_withdrawal_returns_parked_leg() {
    let mut h = Harness::current();
    h.add(1, &deposit(busd(), 100 * ONE, 100 * ONE, "lp", "Q1")).unwrap();
    let mut lp = h.provider(&busd(), "thor1lp").unwrap();
    let mut pool = h.pool(&busd());
    lp.pending_asset = 3 * ONE;
    lp.pending_tx_id = TxId::new("Q2");
    pool.pending_inbound_asset = 3 * ONE;
    h.keeper.set_liquidity_provider(&lp).unwrap();
    h.keeper.set_pool(&pool).unwrap();

    let out = h.withdraw(2, &withdrawal(busd(), "lp", 10_000)).unwrap();
    assert!(!out.pending_cancel);
    assert_eq!(out.refunded_pending_asset, 3 * ONE);
    assert_eq!(h.pool(&busd()).pending_inbound_asset, 0);
    assert!(h.provider(&busd(), "thor1lp").is_none());
}
