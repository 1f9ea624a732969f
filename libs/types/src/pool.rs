//! Per-asset liquidity pool snapshot

use crate::asset::Asset;
use crate::{Amount, NATIVE_DECIMALS};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trading status of a pool
///
/// `Staged` is the bootstrap state: the pool accepts symmetric deposits but
/// does not trade and grants no impermanent-loss protection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolStatus {
    Available,
    Staged,
    Suspended,
}

impl PoolStatus {
    /// Parse a status name; unknown names map to `Suspended`
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "available" => Self::Available,
            "staged" | "bootstrap" => Self::Staged,
            _ => Self::Suspended,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Staged => "Staged",
            Self::Suspended => "Suspended",
        }
    }
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Liquidity pool for one asset paired against RUNE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub asset: Asset,
    pub balance_rune: Amount,
    pub balance_asset: Amount,
    /// Units held by liquidity providers
    pub lp_units: Amount,
    /// Units attributed to outstanding synthetic supply, derived
    pub synth_units: Amount,
    pub pending_inbound_rune: Amount,
    pub pending_inbound_asset: Amount,
    pub status: PoolStatus,
    /// Height of the last status change
    pub status_since: u64,
    /// External chain precision; zero until the first deposit reports it
    pub decimals: u8,
}

impl Pool {
    /// A brand new, empty pool
    pub fn new(asset: Asset) -> Self {
        Self {
            asset,
            balance_rune: 0,
            balance_asset: 0,
            lp_units: 0,
            synth_units: 0,
            pending_inbound_rune: 0,
            pending_inbound_asset: 0,
            status: PoolStatus::Staged,
            status_since: 0,
            decimals: 0,
        }
    }

    /// Total ownership units: liquidity providers plus synthetic holders
    pub fn pool_units(&self) -> Amount {
        self.lp_units.saturating_add(self.synth_units)
    }

    pub fn is_available(&self) -> bool {
        self.status == PoolStatus::Available
    }

    pub fn is_suspended(&self) -> bool {
        self.status == PoolStatus::Suspended
    }

    /// True when no units and no depth have ever been committed
    pub fn is_empty(&self) -> bool {
        self.lp_units == 0 && self.balance_rune == 0 && self.balance_asset == 0
    }

    /// Decimals used when rounding asset payouts
    pub fn effective_decimals(&self) -> u8 {
        if self.decimals == 0 {
            NATIVE_DECIMALS
        } else {
            self.decimals
        }
    }

    /// Change status, stamping the height; no-op when unchanged
    pub fn set_status(&mut self, status: PoolStatus, height: u64) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status;
        self.status_since = height;
        true
    }
}
