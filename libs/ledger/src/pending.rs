//! Pending deposit staging
//!
//! A dual-chain deposit arrives as two transactions. The first leg is parked
//! on the provider record and counted in the pool's pending inbound totals;
//! the second leg folds the parked amount in and commits both together.

use crate::error::LiquidityError;
use amm::AddressBinding;
use tracing::debug;
use types::{
    Address, Amount, LiquidityProvider, PendingLiquidityEvent, PendingLiquidityType, Pool, TxId,
};

/// Where a provider sits in the staging state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingState {
    NoPending,
    AwaitingCounterpart,
}

impl PendingState {
    pub fn of(provider: &LiquidityProvider) -> Self {
        if provider.has_pending() {
            Self::AwaitingCounterpart
        } else {
            Self::NoPending
        }
    }
}

/// Outcome of running a deposit through the stager
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageDecision {
    /// One leg parked; nothing to mint yet
    Staged(PendingLiquidityEvent),
    /// Both legs present; mint units for these totals
    Commit {
        rune: Amount,
        asset: Amount,
        rune_tx_id: TxId,
        asset_tx_id: TxId,
    },
}

pub struct PendingDepositStager;

impl PendingDepositStager {
    /// Reconcile the deposit's addresses with the provider record
    pub fn bind_addresses(
        binding: AddressBinding,
        provider: &mut LiquidityProvider,
        rune_address: &Address,
        asset_address: &Address,
    ) -> Result<(), LiquidityError> {
        match binding {
            AddressBinding::Strict => {
                if provider.units == 0 {
                    if provider.pending_tx_id.is_empty() {
                        if provider.rune_address.is_empty() {
                            provider.rune_address = rune_address.clone();
                        }
                        if provider.asset_address.is_empty() {
                            provider.asset_address = asset_address.clone();
                        }
                    }
                    if rune_address != &provider.rune_address
                        || asset_address != &provider.asset_address
                    {
                        return Err(LiquidityError::AddressMismatch);
                    }
                }
            }
            AddressBinding::Adopt => {
                if provider.rune_address.is_empty() {
                    provider.rune_address = rune_address.clone();
                }
                if provider.asset_address.is_empty() {
                    provider.asset_address = asset_address.clone();
                }
            }
        }

        if !asset_address.is_empty() && asset_address != &provider.asset_address {
            return Err(LiquidityError::AddressMismatch);
        }
        Ok(())
    }

    /// Stage or commit a deposit of `add_rune`/`add_asset`
    ///
    /// Staging adds only this call's amounts to the pool counters; a commit
    /// releases everything the provider had parked.
    pub fn apply(
        pool: &mut Pool,
        provider: &mut LiquidityProvider,
        add_rune: Amount,
        add_asset: Amount,
        tx_id: &TxId,
        stage: bool,
    ) -> Result<StageDecision, LiquidityError> {
        let parked_tx = if provider.pending_tx_id.is_empty() {
            tx_id.clone()
        } else {
            provider.pending_tx_id.clone()
        };
        let (rune_tx_id, asset_tx_id) = if add_rune == 0 {
            (parked_tx, tx_id.clone())
        } else {
            (tx_id.clone(), parked_tx)
        };

        let total_rune = amm::fixed_point::add(provider.pending_rune, add_rune)?;
        let total_asset = amm::fixed_point::add(provider.pending_asset, add_asset)?;

        if stage && total_asset == 0 {
            pool.pending_inbound_rune = amm::fixed_point::add(pool.pending_inbound_rune, add_rune)?;
            provider.pending_rune = total_rune;
            provider.pending_tx_id = tx_id.clone();
            debug!(pool = %pool.asset, rune = add_rune, pending = total_rune, "rune leg staged");
            return Ok(StageDecision::Staged(PendingLiquidityEvent {
                pool: pool.asset.clone(),
                pending_type: PendingLiquidityType::Add,
                rune_address: provider.rune_address.clone(),
                rune_amount: add_rune,
                asset_address: provider.asset_address.clone(),
                asset_amount: 0,
                rune_tx_id: tx_id.clone(),
                asset_tx_id: TxId::blank(),
            }));
        }

        if stage && total_rune == 0 {
            pool.pending_inbound_asset =
                amm::fixed_point::add(pool.pending_inbound_asset, add_asset)?;
            provider.pending_asset = total_asset;
            provider.pending_tx_id = tx_id.clone();
            debug!(pool = %pool.asset, asset = add_asset, pending = total_asset, "asset leg staged");
            return Ok(StageDecision::Staged(PendingLiquidityEvent {
                pool: pool.asset.clone(),
                pending_type: PendingLiquidityType::Add,
                rune_address: provider.rune_address.clone(),
                rune_amount: 0,
                asset_address: provider.asset_address.clone(),
                asset_amount: add_asset,
                rune_tx_id: TxId::blank(),
                asset_tx_id: tx_id.clone(),
            }));
        }

        Self::release(pool, provider);
        Ok(StageDecision::Commit {
            rune: total_rune,
            asset: total_asset,
            rune_tx_id,
            asset_tx_id,
        })
    }

    /// Drop the provider's parked amounts from the pool counters and clear them
    pub fn release(pool: &mut Pool, provider: &mut LiquidityProvider) -> (Amount, Amount) {
        let released = (provider.pending_rune, provider.pending_asset);
        pool.pending_inbound_rune = amm::safe_sub(pool.pending_inbound_rune, provider.pending_rune);
        pool.pending_inbound_asset =
            amm::safe_sub(pool.pending_inbound_asset, provider.pending_asset);
        provider.pending_rune = 0;
        provider.pending_asset = 0;
        provider.pending_tx_id = TxId::blank();
        released
    }
}
