//! # Confluence AMM Library - Liquidity Accounting Mathematics
//!
//! ## Purpose
//!
//! Pure, deterministic math behind liquidity provision in a RUNE-paired
//! pool: minting ownership units for deposits, pricing withdrawals,
//! impermanent-loss protection and synthetic-asset unit co-accounting.
//! Every function is a pure computation over plain values; nothing here
//! reads or writes state.
//!
//! ## Integration Points
//!
//! - **Input Sources**: pool and provider snapshots from the ledger store
//! - **Output Destinations**: the liquidity ledger's add and withdraw pipelines
//! - **Versioning**: [`FormulaSet::for_version`] picks the formula variants in
//!   force at a protocol version so historical blocks replay exactly
//! - **Precision**: 8-decimal `u128` amounts, 512-bit intermediates, a single
//!   truncation per formula
//! - **Validation**: overflow and division by zero are errors, never panics

pub mod error;
pub mod fixed_point;
pub mod formula;
pub mod protection;
pub mod synth;
pub mod units;

pub use error::{MathError, MathResult};
pub use fixed_point::{get_safe_share, get_share, round_to_decimals, safe_sub, ShareMode, U512};
pub use formula::{AddressBinding, FormulaSet};
pub use protection::{ImpLoss, ImpermanentLossProtector, MIN_PROTECTION_AGE};
pub use synth::SynthUnitTracker;
pub use units::{
    PoolUnitCalculator, PoolUnits, UnitFormula, WithdrawFormula, WithdrawShares, WithdrawSide,
};
