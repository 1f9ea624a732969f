//! Domain events emitted by the liquidity ledger

use crate::asset::{Address, Asset, TxId};
use crate::pool::PoolStatus;
use crate::Amount;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquidityEvent {
    pub pool: Asset,
    pub provider_units: Amount,
    pub rune_address: Address,
    pub rune_amount: Amount,
    pub asset_amount: Amount,
    pub rune_tx_id: TxId,
    pub asset_tx_id: TxId,
    pub asset_address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawEvent {
    pub pool: Asset,
    /// Units burned
    pub provider_units: Amount,
    pub basis_points: u64,
    pub tx_id: TxId,
    pub emit_rune: Amount,
    pub emit_asset: Amount,
    pub imp_loss_protection: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingLiquidityType {
    Add,
    Withdraw,
}

/// A leg was staged, or a staged deposit was handed back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingLiquidityEvent {
    pub pool: Asset,
    pub pending_type: PendingLiquidityType,
    pub rune_address: Address,
    pub rune_amount: Amount,
    pub asset_address: Address,
    pub asset_amount: Amount,
    pub rune_tx_id: TxId,
    pub asset_tx_id: TxId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatusEvent {
    pub pool: Asset,
    pub status: PoolStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    AddLiquidity(AddLiquidityEvent),
    Withdraw(WithdrawEvent),
    PendingLiquidity(PendingLiquidityEvent),
    PoolStatus(PoolStatusEvent),
}

impl LedgerEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::AddLiquidity(_) => "add_liquidity",
            Self::Withdraw(_) => "withdraw",
            Self::PendingLiquidity(_) => "pending_liquidity",
            Self::PoolStatus(_) => "pool",
        }
    }

    pub fn pool(&self) -> &Asset {
        match self {
            Self::AddLiquidity(e) => &e.pool,
            Self::Withdraw(e) => &e.pool,
            Self::PendingLiquidity(e) => &e.pool,
            Self::PoolStatus(e) => &e.pool,
        }
    }
}

impl From<AddLiquidityEvent> for LedgerEvent {
    fn from(event: AddLiquidityEvent) -> Self {
        Self::AddLiquidity(event)
    }
}

impl From<WithdrawEvent> for LedgerEvent {
    fn from(event: WithdrawEvent) -> Self {
        Self::Withdraw(event)
    }
}

impl From<PendingLiquidityEvent> for LedgerEvent {
    fn from(event: PendingLiquidityEvent) -> Self {
        Self::PendingLiquidity(event)
    }
}

impl From<PoolStatusEvent> for LedgerEvent {
    fn from(event: PoolStatusEvent) -> Self {
        Self::PoolStatus(event)
    }
}
