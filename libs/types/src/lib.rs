//! # Confluence Domain Types
//!
//! Shared type system for the liquidity-pool accounting engine.
//!
//! ## Design Philosophy
//!
//! - **No Precision Loss**: every amount is an 8-decimal fixed-point `u128`
//! - **Value Semantics**: `Pool` and `LiquidityProvider` are plain snapshots,
//!   read whole and written whole by the ledger
//! - **Type Safety**: chain, asset, address and tx id are distinct newtypes
//! - **Clear Boundaries**: intents are validated here, statelessly, before the
//!   ledger ever touches a pool
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{AddLiquidityIntent, Address, Asset, TxId, ONE};
//!
//! let asset: Asset = "BTC.BTC".parse().unwrap();
//! let intent = AddLiquidityIntent::new(
//!     asset,
//!     100 * ONE,
//!     0,
//!     Address::new("thor1provider"),
//!     Address::new("bc1provider"),
//!     TxId::new("A1B2C3"),
//! );
//!
//! // a lone RUNE leg that names an asset address waits for its counterpart
//! assert!(intent.stage);
//! ```

pub mod asset;
pub mod errors;
pub mod events;
pub mod intent;
pub mod pool;
pub mod provider;

pub use asset::{Address, Asset, Chain, Coin, TxId};
pub use errors::ValidationError;
pub use events::{
    AddLiquidityEvent, LedgerEvent, PendingLiquidityEvent, PendingLiquidityType, PoolStatusEvent,
    WithdrawEvent,
};
pub use intent::{AddLiquidityIntent, Affiliate, WithdrawIntent};
pub use pool::{Pool, PoolStatus};
pub use provider::LiquidityProvider;

/// Unsigned fixed-point amount with 8 implied decimals
pub type Amount = u128;

/// One whole unit of any asset (10^8)
pub const ONE: Amount = 100_000_000;

/// Decimal places of the internal fixed-point representation
pub const NATIVE_DECIMALS: u8 = 8;

/// Upper bound of a withdrawal fraction expressed in basis points
pub const MAX_WITHDRAW_BASIS_POINTS: u64 = 10_000;
