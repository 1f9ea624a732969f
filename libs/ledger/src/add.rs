//! Add-liquidity pipeline

use crate::error::LiquidityError;
use crate::ledger::{ensure_mutable, BlockContext, LiquidityLedger};
use crate::pending::{PendingDepositStager, StageDecision};
use crate::ports::Keeper;
use crate::write_set::WriteSet;
use amm::fixed_point::add;
use amm::{PoolUnitCalculator, SynthUnitTracker};
use tracing::{debug, info};
use types::{
    AddLiquidityEvent, AddLiquidityIntent, Address, Amount, LiquidityProvider, Pool, PoolStatus,
    PoolStatusEvent,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// A lone leg was parked on the provider record
    Staged {
        pending_rune: Amount,
        pending_asset: Amount,
    },
    Committed {
        liquidity_units: Amount,
        /// Committed amounts, parked legs included
        rune: Amount,
        asset: Amount,
        /// Provider's units after the deposit
        provider_units: Amount,
    },
}

impl AddOutcome {
    pub fn is_staged(&self) -> bool {
        matches!(self, Self::Staged { .. })
    }

    pub fn liquidity_units(&self) -> Amount {
        match self {
            Self::Staged { .. } => 0,
            Self::Committed {
                liquidity_units, ..
            } => *liquidity_units,
        }
    }
}

impl LiquidityLedger {
    /// Plan one deposit leg against the current store contents
    pub(crate) fn plan_add<K: Keeper>(
        &self,
        keeper: &K,
        block: BlockContext,
        intent: &AddLiquidityIntent,
    ) -> Result<(WriteSet, AddOutcome), LiquidityError> {
        let formulas = self.formulas();
        let (mut pool, created) = match keeper.get_pool(&intent.asset)? {
            Some(pool) => (pool, false),
            None => {
                info!(creator = %intent.rune_address, "pool doesn't exist yet, creating a new one");
                (Pool::new(intent.asset.clone()), true)
            }
        };
        ensure_mutable(&pool)?;
        let single_sided = intent.rune_address.is_empty() || intent.asset_address.is_empty();
        if !created && pool.status == PoolStatus::Staged && single_sided {
            return Err(LiquidityError::AsymmetricAddToStagedPool);
        }
        if pool.decimals == 0 {
            if let Some(decimals) = intent.asset_decimals {
                pool.decimals = decimals;
            }
        }

        let synth_supply = if formulas.synth_units {
            let supply = keeper.total_supply(&pool.asset.synthetic_asset())?;
            pool = SynthUnitTracker::calc_units(&pool, supply)?;
            Some(supply)
        } else {
            None
        };

        let original_units = pool.pool_units();
        if original_units == 0 {
            let status = if pool.asset.is_gas_asset() {
                PoolStatus::Available
            } else {
                self.constants().default_pool_status
            };
            pool.set_status(status, block.height);
        }

        let lookup = if intent.rune_address.is_empty() {
            &intent.asset_address
        } else {
            &intent.rune_address
        };
        let mut provider = keeper
            .get_liquidity_provider(&pool.asset, lookup)?
            .unwrap_or_else(|| {
                LiquidityProvider::new(pool.asset.clone(), Address::empty(), Address::empty())
            });
        provider.last_add_height = block.height;
        PendingDepositStager::bind_addresses(
            formulas.address_binding,
            &mut provider,
            &intent.rune_address,
            &intent.asset_address,
        )?;

        let decision = PendingDepositStager::apply(
            &mut pool,
            &mut provider,
            intent.rune_amount,
            intent.asset_amount,
            &intent.tx_id,
            intent.stage,
        )?;

        let (rune, asset, rune_tx_id, asset_tx_id) = match decision {
            StageDecision::Staged(event) => {
                let outcome = AddOutcome::Staged {
                    pending_rune: provider.pending_rune,
                    pending_asset: provider.pending_asset,
                };
                let mut writes = WriteSet::new(pool);
                writes.set_provider(provider);
                writes.emit(event);
                return Ok((writes, outcome));
            }
            StageDecision::Commit {
                rune,
                asset,
                rune_tx_id,
                asset_tx_id,
            } => (rune, asset, rune_tx_id, asset_tx_id),
        };

        info!(
            rune = pool.balance_rune,
            asset = pool.balance_asset,
            lp_units = pool.lp_units,
            synth_units = pool.synth_units,
            "pre add liquidity"
        );
        let units = PoolUnitCalculator::calculate_pool_units(
            formulas.units,
            original_units,
            pool.balance_rune,
            pool.balance_asset,
            rune,
            asset,
        )?;
        pool.lp_units = add(pool.lp_units, units.liquidity_units)?;
        pool.balance_rune = add(pool.balance_rune, rune)?;
        pool.balance_asset = add(pool.balance_asset, asset)?;
        if pool.balance_rune == 0 || pool.balance_asset == 0 {
            return Err(LiquidityError::ZeroBalanceAfterAdd);
        }
        if let Some(supply) = synth_supply {
            pool = SynthUnitTracker::calc_units(&pool, supply)?;
        }
        info!(
            rune = pool.balance_rune,
            asset = pool.balance_asset,
            lp_units = pool.lp_units,
            synth_units = pool.synth_units,
            liquidity_units = units.liquidity_units,
            "post add liquidity"
        );

        let mut writes = WriteSet::new(pool.clone());
        if original_units == 0 && pool.pool_units() != 0 {
            writes.emit(PoolStatusEvent {
                pool: pool.asset.clone(),
                status: pool.status,
            });
        }

        provider.units = add(provider.units, units.liquidity_units)?;
        if pool.is_available() {
            let share = formulas.share;
            let pool_units = pool.pool_units();
            if provider.rune_deposit_value == 0 && provider.asset_deposit_value == 0 {
                provider.rune_deposit_value = share.share(provider.units, pool_units, pool.balance_rune)?;
                provider.asset_deposit_value =
                    share.share(provider.units, pool_units, pool.balance_asset)?;
            } else {
                provider.rune_deposit_value = add(
                    provider.rune_deposit_value,
                    share.share(units.liquidity_units, pool_units, pool.balance_rune)?,
                )?;
                provider.asset_deposit_value = add(
                    provider.asset_deposit_value,
                    share.share(units.liquidity_units, pool_units, pool.balance_asset)?,
                )?;
            }
            debug!(
                rune_deposit_value = provider.rune_deposit_value,
                asset_deposit_value = provider.asset_deposit_value,
                "cost basis updated"
            );
        }

        writes.emit(AddLiquidityEvent {
            pool: pool.asset.clone(),
            provider_units: units.liquidity_units,
            rune_address: provider.rune_address.clone(),
            rune_amount: rune,
            asset_amount: asset,
            rune_tx_id,
            asset_tx_id,
            asset_address: provider.asset_address.clone(),
        });
        let outcome = AddOutcome::Committed {
            liquidity_units: units.liquidity_units,
            rune,
            asset,
            provider_units: provider.units,
        };
        writes.set_provider(provider);
        Ok((writes, outcome))
    }
}
