//! Withdraw-liquidity pipeline

use crate::error::LiquidityError;
use crate::ledger::{ensure_mutable, BlockContext, LiquidityLedger};
use crate::pending::PendingDepositStager;
use crate::ports::{GasManager, Keeper};
use crate::write_set::WriteSet;
use amm::fixed_point::add;
use amm::{
    round_to_decimals, safe_sub, ImpermanentLossProtector, PoolUnitCalculator, SynthUnitTracker,
    WithdrawFormula, WithdrawSide,
};
use config::{ilp_disabled_key, ConstantName};
use tracing::{debug, info, warn};
use types::{
    Amount, Coin, LiquidityProvider, PendingLiquidityEvent, PendingLiquidityType, Pool,
    PoolStatus, PoolStatusEvent, TxId, WithdrawEvent, WithdrawIntent, MAX_WITHDRAW_BASIS_POINTS,
};

/// Amounts the caller must pay out for a withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WithdrawOutcome {
    pub rune: Amount,
    /// Asset payout, rounded to the pool's decimals, gas already withheld
    pub asset: Amount,
    /// RUNE granted from the reserve as impermanent-loss protection
    pub protection_rune: Amount,
    pub units_burned: Amount,
    /// Asset withheld in the pool to fund the final outbound
    pub gas_asset: Amount,
    /// Nothing was redeemed; a parked deposit leg was returned
    pub pending_cancel: bool,
    /// Parked legs returned alongside a full withdrawal, paid on top of
    /// `rune` and `asset`
    pub refunded_pending_rune: Amount,
    pub refunded_pending_asset: Amount,
}

/// Protection granted for one withdrawal
#[derive(Debug, Clone, Copy, Default)]
struct Protection {
    rune: Amount,
    extra_units: Amount,
}

impl LiquidityLedger {
    pub(crate) fn plan_withdraw<K: Keeper, G: GasManager>(
        &self,
        keeper: &K,
        gas: &G,
        block: BlockContext,
        intent: &WithdrawIntent,
    ) -> Result<(WriteSet, WithdrawOutcome), LiquidityError> {
        let formulas = self.formulas();
        let mut pool = keeper
            .get_pool(&intent.asset)?
            .ok_or_else(|| LiquidityError::PoolNotFound(intent.asset.clone()))?;
        ensure_mutable(&pool)?;
        let synth_supply = if formulas.synth_units {
            let supply = keeper.total_supply(&pool.asset.synthetic_asset())?;
            pool = SynthUnitTracker::calc_units(&pool, supply)?;
            Some(supply)
        } else {
            None
        };

        let mut provider = keeper
            .get_liquidity_provider(&pool.asset, &intent.withdraw_address)?
            .ok_or(LiquidityError::NoLiquidityUnitsLeft)?;
        if provider.units == 0 {
            if provider.has_pending() {
                return Ok(self.plan_pending_cancel(pool, provider, intent));
            }
            return Err(LiquidityError::NoLiquidityUnitsLeft);
        }

        let lockup = self.constants().liquidity_lockup_blocks.max(0) as u64;
        let unlock_height = provider.last_add_height.saturating_add(lockup);
        if block.height < unlock_height {
            return Err(LiquidityError::WithinLockupPeriod { unlock_height });
        }

        let original_units = provider.units;
        let mut pool_rune = pool.balance_rune;
        let pool_asset = pool.balance_asset;
        info!(
            pool_units = pool.pool_units(),
            rune = pool_rune,
            asset = pool_asset,
            provider_units = original_units,
            "pool before withdraw"
        );

        let side = match &intent.withdrawal_asset {
            Some(asset) if asset.is_rune() => WithdrawSide::Rune,
            Some(_) => WithdrawSide::Asset,
            None if provider.asset_address.is_empty() => WithdrawSide::Rune,
            None if provider.rune_address.is_empty() => WithdrawSide::Asset,
            None => WithdrawSide::Both,
        };

        let mut member_units = original_units;
        if formulas.withdraw == WithdrawFormula::V84
            && pool.is_available()
            && provider.rune_deposit_value == 0
            && provider.asset_deposit_value == 0
        {
            let pool_units = pool.pool_units();
            provider.rune_deposit_value =
                formulas.share.share(provider.units, pool_units, pool.balance_rune)?;
            provider.asset_deposit_value =
                formulas.share.share(provider.units, pool_units, pool.balance_asset)?;
        }
        let protection = self.imp_loss_protection(keeper, &pool, &provider, intent, block)?;
        if protection.rune > 0 {
            pool_rune = add(pool_rune, protection.rune)?;
            member_units = add(member_units, protection.extra_units)?;
            pool.lp_units = add(pool.lp_units, protection.extra_units)?;
        }

        let shares = PoolUnitCalculator::calculate_withdraw(
            formulas.withdraw,
            pool.pool_units(),
            pool_rune,
            pool_asset,
            original_units,
            protection.extra_units,
            intent.basis_points,
            side,
        )?;
        if PoolUnitCalculator::drains_one_side(shares.rune, shares.asset, pool_rune, pool_asset) {
            return Err(LiquidityError::Invalid100PercentSingleSidedWithdraw);
        }
        let mut asset_out = round_to_decimals(shares.asset, pool.effective_decimals());

        let mut gas_asset = 0;
        if add(safe_sub(pool.pool_units(), member_units), shares.units_remaining)? == 0 {
            let chain = &pool.asset.chain;
            let max_gas = gas
                .get_max_gas(chain)
                .map_err(|source| LiquidityError::GasUnavailable {
                    chain: chain.clone(),
                    source,
                })?;
            if chain.is_bnb() && pool.asset.is_gas_asset() && !self.rune_asset().chain.is_thorchain()
            {
                // RUNE and BNB both leave on the BNB chain
                let remaining = safe_sub(asset_out, max_gas.amount.saturating_mul(2));
                gas_asset = asset_out - remaining;
                asset_out = remaining;
            } else if pool.asset.is_gas_asset() {
                gas_asset = max_gas.amount.min(asset_out);
                asset_out -= gas_asset;
            }
            debug!(gas_asset, "gas withheld from final withdrawal");
        }

        pool.lp_units = safe_sub(pool.lp_units, safe_sub(member_units, shares.units_remaining));
        pool.balance_rune = safe_sub(pool_rune, shares.rune);
        pool.balance_asset = safe_sub(pool_asset, asset_out);

        provider.last_withdraw_height = block.height;
        match formulas.withdraw {
            WithdrawFormula::V1 => {
                // cost basis shrinks by what the burned units are now worth
                let burned = safe_sub(original_units, shares.units_remaining);
                provider.rune_deposit_value = safe_sub(
                    provider.rune_deposit_value,
                    formulas.share.share(burned, pool.lp_units, pool.balance_rune)?,
                );
                provider.asset_deposit_value = safe_sub(
                    provider.asset_deposit_value,
                    formulas.share.share(burned, pool.lp_units, pool.balance_asset)?,
                );
            }
            WithdrawFormula::V84 => {
                if shares.units_remaining >= original_units {
                    return Err(LiquidityError::UnitsIncreased {
                        before: original_units,
                        after: shares.units_remaining,
                    });
                }
                let max_bps = Amount::from(MAX_WITHDRAW_BASIS_POINTS);
                let bps = Amount::from(intent.basis_points);
                provider.rune_deposit_value = safe_sub(
                    provider.rune_deposit_value,
                    formulas.share.share(bps, max_bps, provider.rune_deposit_value)?,
                );
                provider.asset_deposit_value = safe_sub(
                    provider.asset_deposit_value,
                    formulas.share.share(bps, max_bps, provider.asset_deposit_value)?,
                );
            }
        }
        provider.units = shares.units_remaining;

        let (mut refunded_rune, mut refunded_asset) = (0, 0);
        if formulas.withdraw == WithdrawFormula::V1 && provider.pending_rune > 0 {
            // parked RUNE always rides out with the withdrawal
            refunded_rune = provider.pending_rune;
            pool.pending_inbound_rune = safe_sub(pool.pending_inbound_rune, refunded_rune);
            provider.pending_rune = 0;
            if !provider.has_pending() {
                provider.pending_tx_id = TxId::blank();
            }
            info!(rune = refunded_rune, "parked rune returned with withdrawal");
        }
        if provider.units == 0 && provider.has_pending() {
            let (rune, asset) = PendingDepositStager::release(&mut pool, &mut provider);
            refunded_rune = add(refunded_rune, rune)?;
            refunded_asset = round_to_decimals(asset, pool.effective_decimals());
            info!(rune, asset, "parked deposit returned with full withdrawal");
        }

        let mut events = Vec::new();
        if pool.balance_rune == 0 || pool.balance_asset == 0 {
            pool.set_status(PoolStatus::Staged, block.height);
            events.push(PoolStatusEvent {
                pool: pool.asset.clone(),
                status: PoolStatus::Staged,
            });
        }
        if let Some(supply) = synth_supply {
            pool = SynthUnitTracker::calc_units(&pool, supply)?;
        }
        info!(
            pool_units = pool.pool_units(),
            rune = pool.balance_rune,
            asset = pool.balance_asset,
            "pool after withdraw"
        );

        let outcome = WithdrawOutcome {
            rune: shares.rune,
            asset: asset_out,
            protection_rune: protection.rune,
            units_burned: match formulas.withdraw {
                WithdrawFormula::V1 => safe_sub(member_units, shares.units_remaining),
                WithdrawFormula::V84 => safe_sub(original_units, shares.units_remaining),
            },
            gas_asset,
            pending_cancel: false,
            refunded_pending_rune: refunded_rune,
            refunded_pending_asset: refunded_asset,
        };

        let mut writes = WriteSet::new(pool);
        for event in events {
            writes.emit(event);
        }
        writes.emit(WithdrawEvent {
            pool: intent.asset.clone(),
            provider_units: outcome.units_burned,
            basis_points: intent.basis_points,
            tx_id: intent.tx_id.clone(),
            emit_rune: outcome.rune,
            emit_asset: outcome.asset,
            imp_loss_protection: outcome.protection_rune,
        });
        if protection.rune > 0 {
            writes.reserve_transfer = Some(Coin::new(self.rune_asset().clone(), protection.rune));
        }
        self.retire_or_keep(keeper, &mut writes, provider);
        Ok((writes, outcome))
    }

    /// Protection owed on this withdrawal and the units minted to pay it
    ///
    /// V1 measures the loss on the claimed units and ages the position from
    /// the last add only. V84 measures it on the whole position, restarts the
    /// clock on a pool status change, pays only in available pools and
    /// honours the per-pool ILP-DISABLED switch.
    ///
    /// The extra units are minted with the version's deposit unit formula:
    /// slip-adjusted before V88, depth-weighted from V88 on. Depth-weighted
    /// minting ignores the prior pool units, so the extra units track the
    /// reserve RUNE only while the pool keeps its seeding ratio.
    fn imp_loss_protection<K: Keeper>(
        &self,
        keeper: &K,
        pool: &Pool,
        provider: &LiquidityProvider,
        intent: &WithdrawIntent,
        block: BlockContext,
    ) -> Result<Protection, LiquidityError> {
        let full_protection = self.mimir_or(keeper, ConstantName::FullImpLossProtectionBlocks);
        if full_protection <= 0 {
            return Ok(Protection::default());
        }
        let min_age = self.constants().min_imp_loss_protection_age;
        let share = self.formulas().share;

        let loss = match self.formulas().withdraw {
            WithdrawFormula::V1 => {
                let age = block.height as i64 - provider.last_add_height as i64;
                let protection_bps =
                    ImpermanentLossProtector::protection_basis_points(age, min_age, full_protection);
                ImpermanentLossProtector::calc_claimed_imp_loss(
                    share,
                    provider,
                    pool,
                    intent.basis_points,
                    protection_bps,
                )?
            }
            WithdrawFormula::V84 => {
                let disabled_key = ilp_disabled_key(&pool.asset);
                let disabled = match keeper.get_mimir(&disabled_key) {
                    Ok(value) => value.unwrap_or(0) > 0,
                    Err(err) => {
                        warn!(error = %err, key = %disabled_key, "fail to get ILP-DISABLED mimir");
                        false
                    }
                };
                if !pool.is_available() || disabled {
                    return Ok(Protection::default());
                }
                let age = ImpermanentLossProtector::position_age(
                    block.height,
                    provider.last_add_height,
                    pool.status_since,
                );
                let protection_bps =
                    ImpermanentLossProtector::protection_basis_points(age, min_age, full_protection);
                ImpermanentLossProtector::calc_imp_loss(
                    share,
                    provider,
                    pool,
                    intent.basis_points,
                    protection_bps,
                )?
            }
        };
        info!(
            deposit_value = loss.deposit_value,
            redeem_value = loss.redeem_value,
            protection = loss.protection_rune,
            "imp loss calculation"
        );
        if loss.protection_rune == 0 {
            return Ok(Protection::default());
        }

        let minted = PoolUnitCalculator::calculate_pool_units(
            self.formulas().units,
            pool.pool_units(),
            pool.balance_rune,
            pool.balance_asset,
            loss.protection_rune,
            0,
        )?;
        info!(
            extra_units = minted.liquidity_units,
            extra_rune = loss.protection_rune,
            "liquidity provider granted imp loss protection"
        );
        Ok(Protection {
            rune: loss.protection_rune,
            extra_units: minted.liquidity_units,
        })
    }

    /// Return a parked leg to a provider that never committed any units
    fn plan_pending_cancel(
        &self,
        mut pool: Pool,
        mut provider: LiquidityProvider,
        intent: &WithdrawIntent,
    ) -> (WriteSet, WithdrawOutcome) {
        let (rune, asset) = PendingDepositStager::release(&mut pool, &mut provider);
        let asset = round_to_decimals(asset, pool.effective_decimals());
        info!(rune, asset, "pending liquidity cancelled");

        let (rune_tx_id, asset_tx_id) = if rune > 0 {
            (intent.tx_id.clone(), TxId::blank())
        } else {
            (TxId::blank(), intent.tx_id.clone())
        };
        let mut writes = WriteSet::new(pool);
        writes.emit(PendingLiquidityEvent {
            pool: intent.asset.clone(),
            pending_type: PendingLiquidityType::Withdraw,
            rune_address: provider.rune_address.clone(),
            rune_amount: rune,
            asset_address: provider.asset_address.clone(),
            asset_amount: asset,
            rune_tx_id,
            asset_tx_id,
        });
        writes.remove_provider(provider);
        let outcome = WithdrawOutcome {
            rune,
            asset,
            pending_cancel: true,
            ..WithdrawOutcome::default()
        };
        (writes, outcome)
    }

    /// Keep the provider record unless it is fully drained
    fn retire_or_keep<K: Keeper>(
        &self,
        keeper: &K,
        writes: &mut WriteSet,
        provider: LiquidityProvider,
    ) {
        if keeper.ragnarok_in_progress() || !provider.is_drained() {
            writes.set_provider(provider);
        } else {
            writes.remove_provider(provider);
        }
    }
}
