//! Ports to the host ledger
//!
//! The ledger core owns no state. Every operation receives these ports from
//! its caller, reads whole snapshots through them and writes whole snapshots
//! back once the operation has fully succeeded.

use std::fmt;
use thiserror::Error;
use types::{Address, Amount, Asset, Chain, Coin, LedgerEvent, LiquidityProvider, Pool};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PortError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("insufficient funds in module {module}: need {needed}, have {available}")]
    InsufficientFunds {
        module: ModuleName,
        needed: Amount,
        available: Amount,
    },
}

/// Module accounts that custody protocol funds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModuleName {
    /// Protocol reserve that funds impermanent-loss protection
    Reserve,
    /// Custody of pooled RUNE
    Asgard,
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reserve => f.write_str("reserve"),
            Self::Asgard => f.write_str("asgard"),
        }
    }
}

/// Key-value store of the replicated ledger
pub trait Keeper {
    fn get_pool(&self, asset: &Asset) -> Result<Option<Pool>, PortError>;

    fn set_pool(&mut self, pool: &Pool) -> Result<(), PortError>;

    /// Drop a pool record; only used to undo a failed first write
    fn remove_pool(&mut self, asset: &Asset) -> Result<(), PortError>;

    /// Every pool, in any order
    fn pools(&self) -> Result<Vec<Pool>, PortError>;

    fn get_liquidity_provider(
        &self,
        asset: &Asset,
        address: &Address,
    ) -> Result<Option<LiquidityProvider>, PortError>;

    fn set_liquidity_provider(&mut self, provider: &LiquidityProvider) -> Result<(), PortError>;

    fn remove_liquidity_provider(&mut self, provider: &LiquidityProvider) -> Result<(), PortError>;

    /// Runtime override for `key`, `None` when unset
    fn get_mimir(&self, key: &str) -> Result<Option<i64>, PortError>;

    /// Outstanding supply of a (synthetic) asset
    fn total_supply(&self, asset: &Asset) -> Result<Amount, PortError>;

    /// Network-wide unwind in progress
    fn ragnarok_in_progress(&self) -> bool;

    fn send_from_module_to_module(
        &mut self,
        from: ModuleName,
        to: ModuleName,
        coin: &Coin,
    ) -> Result<(), PortError>;
}

pub trait EventManager {
    fn emit_event(&mut self, event: LedgerEvent) -> Result<(), PortError>;
}

pub trait GasManager {
    /// Largest gas fee an outbound on `chain` may cost
    fn get_max_gas(&self, chain: &Chain) -> Result<Coin, PortError>;
}
