//! Add and withdraw liquidity intents
//!
//! Intents are inputs only; they are never persisted. `validate` performs the
//! stateless checks, everything that needs pool state lives in the ledger.

use crate::asset::{Address, Asset, TxId};
use crate::errors::ValidationError;
use crate::{Amount, MAX_WITHDRAW_BASIS_POINTS};
use serde::{Deserialize, Serialize};

/// Affiliate share carved out of a deposit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affiliate {
    pub address: Address,
    pub basis_points: u64,
}

/// Request to deposit one or both legs into a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquidityIntent {
    pub asset: Asset,
    pub rune_amount: Amount,
    pub asset_amount: Amount,
    pub rune_address: Address,
    pub asset_address: Address,
    pub tx_id: TxId,
    /// Precision of the inbound asset coin, when the observer reported it
    pub asset_decimals: Option<u8>,
    pub affiliate: Option<Affiliate>,
    /// One leg arrived while the other side names an address: wait for it
    pub stage: bool,
}

impl AddLiquidityIntent {
    pub fn new(
        asset: Asset,
        rune_amount: Amount,
        asset_amount: Amount,
        rune_address: Address,
        asset_address: Address,
        tx_id: TxId,
    ) -> Self {
        let stage = (asset_amount == 0 && !asset_address.is_empty())
            || (rune_amount == 0 && !rune_address.is_empty());
        Self {
            asset,
            rune_amount,
            asset_amount,
            rune_address,
            asset_address,
            tx_id,
            asset_decimals: None,
            affiliate: None,
            stage,
        }
    }

    pub fn with_affiliate(mut self, address: Address, basis_points: u64) -> Self {
        self.affiliate = Some(Affiliate {
            address,
            basis_points,
        });
        self
    }

    pub fn with_asset_decimals(mut self, decimals: u8) -> Self {
        self.asset_decimals = Some(decimals);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_pool_asset(&self.asset)?;
        if self.tx_id.is_empty() {
            return Err(ValidationError::EmptyTxId);
        }
        if self.rune_address.is_empty() && self.asset_address.is_empty() {
            return Err(ValidationError::EmptyAddresses);
        }
        if self.rune_amount == 0 && self.asset_amount == 0 {
            return Err(ValidationError::ZeroAmounts);
        }
        if let Some(affiliate) = &self.affiliate {
            if affiliate.basis_points > MAX_WITHDRAW_BASIS_POINTS {
                return Err(ValidationError::InvalidAffiliateBasisPoints {
                    value: affiliate.basis_points,
                });
            }
            if affiliate.address.is_empty() {
                return Err(ValidationError::EmptyAffiliateAddress);
            }
        }
        Ok(())
    }
}

/// Request to redeem a fraction of a provider's units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawIntent {
    pub asset: Asset,
    pub withdraw_address: Address,
    /// Fraction of the position, 1..=10000
    pub basis_points: u64,
    /// Single-sided override: RUNE or the pool asset
    pub withdrawal_asset: Option<Asset>,
    pub tx_id: TxId,
}

impl WithdrawIntent {
    pub fn new(asset: Asset, withdraw_address: Address, basis_points: u64, tx_id: TxId) -> Self {
        Self {
            asset,
            withdraw_address,
            basis_points,
            withdrawal_asset: None,
            tx_id,
        }
    }

    pub fn with_withdrawal_asset(mut self, asset: Asset) -> Self {
        self.withdrawal_asset = Some(asset);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_pool_asset(&self.asset)?;
        if self.tx_id.is_empty() {
            return Err(ValidationError::EmptyTxId);
        }
        if self.withdraw_address.is_empty() {
            return Err(ValidationError::EmptyWithdrawAddress);
        }
        if self.basis_points == 0 || self.basis_points > MAX_WITHDRAW_BASIS_POINTS {
            return Err(ValidationError::InvalidBasisPoints {
                value: self.basis_points,
            });
        }
        if let Some(withdrawal_asset) = &self.withdrawal_asset {
            if !withdrawal_asset.is_rune() && withdrawal_asset != &self.asset {
                return Err(ValidationError::InvalidWithdrawalAsset {
                    asset: withdrawal_asset.to_string(),
                    pool: self.asset.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn validate_pool_asset(asset: &Asset) -> Result<(), ValidationError> {
    if asset.is_rune() {
        return Err(ValidationError::RuneIsNotPoolable);
    }
    if asset.is_synthetic() {
        return Err(ValidationError::SyntheticIsNotPoolable {
            asset: asset.to_string(),
        });
    }
    Ok(())
}
