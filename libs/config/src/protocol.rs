//! Versioned protocol constants
//!
//! Every node must evaluate a block with the constants that were in force
//! when the block was produced. Constants are therefore looked up by
//! [`ProtocolVersion`]; the most recent table at or below the requested
//! version wins. Mimir keys allow governance to override a constant at
//! runtime; those are resolved by the ledger through its store port.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use types::{Asset, PoolStatus};

/// Ordered protocol version; selects formula variants and constant tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolVersion(pub u32);

impl ProtocolVersion {
    pub const V1: Self = Self(1);
    /// Address binding rules for staged deposits
    pub const V79: Self = Self(79);
    /// Position-wide loss protection, synthetic units, capped shares
    pub const V84: Self = Self(84);
    /// Depth-weighted unit minting
    pub const V88: Self = Self(88);
    pub const CURRENT: Self = Self::V88;

    pub fn at_least(&self, other: Self) -> bool {
        *self >= other
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Names of the constants this engine reads; the string form is the mimir key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConstantName {
    LiquidityLockUpBlocks,
    FullImpLossProtectionBlocks,
    MinImpLossProtectionAge,
    DefaultPoolStatus,
    NativeTransactionFee,
    MaximumLiquidityRune,
}

impl ConstantName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LiquidityLockUpBlocks => "LiquidityLockUpBlocks",
            Self::FullImpLossProtectionBlocks => "FullImpLossProtectionBlocks",
            Self::MinImpLossProtectionAge => "MinImpLossProtectionAge",
            Self::DefaultPoolStatus => "DefaultPoolStatus",
            Self::NativeTransactionFee => "NativeTransactionFee",
            Self::MaximumLiquidityRune => "MaximumLiquidityRune",
        }
    }
}

impl fmt::Display for ConstantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mimir key that switches impermanent-loss protection off for one pool
pub fn ilp_disabled_key(asset: &Asset) -> String {
    format!("ILP-DISABLED-{asset}")
}

/// Constant values in force for a protocol version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantValues {
    /// Blocks after an add during which the provider cannot withdraw
    pub liquidity_lockup_blocks: i64,
    /// Position age at which protection reaches 100%
    pub full_imp_loss_protection_blocks: i64,
    /// Minimum position age before any protection is granted
    pub min_imp_loss_protection_age: i64,
    pub default_pool_status: PoolStatus,
    pub native_transaction_fee: i64,
    /// Network-wide RUNE cap across pools; zero or less means no cap
    pub maximum_liquidity_rune: i64,
}

impl ConstantValues {
    /// Table for the latest version at or below `version`
    pub fn for_version(version: ProtocolVersion) -> Self {
        CONSTANT_TABLE
            .range(..=version)
            .next_back()
            .map(|(_, values)| values.clone())
            .unwrap_or_else(genesis_constants)
    }

    /// Integer value of a constant; `DefaultPoolStatus` has none
    pub fn get_int(&self, name: ConstantName) -> Option<i64> {
        match name {
            ConstantName::LiquidityLockUpBlocks => Some(self.liquidity_lockup_blocks),
            ConstantName::FullImpLossProtectionBlocks => Some(self.full_imp_loss_protection_blocks),
            ConstantName::MinImpLossProtectionAge => Some(self.min_imp_loss_protection_age),
            ConstantName::NativeTransactionFee => Some(self.native_transaction_fee),
            ConstantName::MaximumLiquidityRune => Some(self.maximum_liquidity_rune),
            ConstantName::DefaultPoolStatus => None,
        }
    }
}

impl Default for ConstantValues {
    fn default() -> Self {
        Self::for_version(ProtocolVersion::CURRENT)
    }
}

fn genesis_constants() -> ConstantValues {
    ConstantValues {
        liquidity_lockup_blocks: 0,
        full_imp_loss_protection_blocks: 1_440_000,
        min_imp_loss_protection_age: 17_280,
        default_pool_status: PoolStatus::Staged,
        native_transaction_fee: 2_000_000,
        maximum_liquidity_rune: 0,
    }
}

static CONSTANT_TABLE: Lazy<BTreeMap<ProtocolVersion, ConstantValues>> = Lazy::new(|| {
    let mut table = BTreeMap::new();
    table.insert(ProtocolVersion::V1, genesis_constants());
    table
});
