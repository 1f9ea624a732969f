//! Stateless validation errors for identifiers and liquidity intents

use thiserror::Error;

/// Errors raised while parsing identifiers or validating an intent
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Chain identifier is malformed
    #[error("invalid chain '{input}': {reason}")]
    InvalidChain { input: String, reason: &'static str },

    /// Asset string could not be parsed
    #[error("invalid asset '{input}'")]
    InvalidAsset { input: String },

    /// RUNE is on every pool and never has one of its own
    #[error("RUNE cannot be used as a pool asset")]
    RuneIsNotPoolable,

    /// Synthetic assets share their layer-1 pool
    #[error("synthetic asset {asset} cannot be used as a pool asset")]
    SyntheticIsNotPoolable { asset: String },

    /// Inbound transaction hash missing
    #[error("request tx hash is empty")]
    EmptyTxId,

    /// Neither rune nor asset address supplied
    #[error("rune address and asset address cannot both be empty")]
    EmptyAddresses,

    /// Add intent with nothing to add
    #[error("rune and asset amounts cannot both be zero")]
    ZeroAmounts,

    /// Withdraw intent without a withdraw address
    #[error("empty withdraw address")]
    EmptyWithdrawAddress,

    /// Withdraw fraction outside 1..=10000
    #[error("withdraw basis points {value} is invalid")]
    InvalidBasisPoints { value: u64 },

    /// Affiliate fraction outside 0..=10000
    #[error("affiliate basis points {value} is invalid")]
    InvalidAffiliateBasisPoints { value: u64 },

    /// Affiliate without an address
    #[error("affiliate address cannot be empty")]
    EmptyAffiliateAddress,

    /// Single-sided withdrawal asset is neither RUNE nor the pool asset
    #[error("withdrawal asset {asset} is not part of pool {pool}")]
    InvalidWithdrawalAsset { asset: String, pool: String },
}
