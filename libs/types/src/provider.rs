//! Liquidity provider position in a single pool

use crate::asset::{Address, Asset, TxId};
use crate::Amount;
use serde::{Deserialize, Serialize};

/// One provider's stake in one pool, keyed by (asset, address)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityProvider {
    pub asset: Asset,
    pub rune_address: Address,
    pub asset_address: Address,
    pub units: Amount,
    pub pending_rune: Amount,
    pub pending_asset: Amount,
    pub pending_tx_id: TxId,
    /// Cost basis in RUNE, used by impermanent-loss protection
    pub rune_deposit_value: Amount,
    /// Cost basis in the pool asset
    pub asset_deposit_value: Amount,
    pub last_add_height: u64,
    pub last_withdraw_height: u64,
}

impl LiquidityProvider {
    /// A zero-valued record for a first deposit attempt
    pub fn new(asset: Asset, rune_address: Address, asset_address: Address) -> Self {
        Self {
            asset,
            rune_address,
            asset_address,
            units: 0,
            pending_rune: 0,
            pending_asset: 0,
            pending_tx_id: TxId::blank(),
            rune_deposit_value: 0,
            asset_deposit_value: 0,
            last_add_height: 0,
            last_withdraw_height: 0,
        }
    }

    /// Identifying address: the RUNE address when present, else the asset one
    pub fn address(&self) -> &Address {
        if self.rune_address.is_empty() {
            &self.asset_address
        } else {
            &self.rune_address
        }
    }

    /// Store key, `<asset>/<address>`
    pub fn key(&self) -> String {
        format!("{}/{}", self.asset, self.address())
    }

    pub fn has_pending(&self) -> bool {
        self.pending_rune > 0 || self.pending_asset > 0
    }

    /// Nothing left: no units and nothing staged
    pub fn is_drained(&self) -> bool {
        self.units == 0 && !self.has_pending()
    }

    /// Only one of the two addresses is known
    pub fn is_asymmetric(&self) -> bool {
        self.rune_address.is_empty() != self.asset_address.is_empty()
    }
}
